use miette::Diagnostic;
use thiserror::Error;

/// Result type for typed node construction
pub type TypeResult<T> = Result<T, TypeError>;

/// User-facing semantic errors raised while building typed nodes.
///
/// These describe problems in the translated program, not in the compiler. The
/// construction that raised one fails; sibling constructs are unaffected.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// `max`/`min` over values whose kinds or precisions differ.
    #[error("Cannot determine final dtype of '{func}' call with arguments of different types ({types})")]
    #[diagnostic(
        code(tessera::inhomogeneous_extremum),
        help("Please cast arguments to the desired dtype")
    )]
    InhomogeneousExtremum {
        /// `max` or `min`
        func: String,
        /// Every offending `dtype(precision)` pair, comma separated
        types: String,
    },

    /// A list literal whose elements disagree on kind, precision, rank or order.
    #[error("Can't create an inhomogeneous list ({types})")]
    #[diagnostic(
        code(tessera::inhomogeneous_list),
        help("Use a tuple for heterogeneous values, or cast the elements to a common dtype")
    )]
    InhomogeneousList { types: String },

    /// `tuple(x)` where the length of `x` is not a compile-time constant.
    #[error("Can't unpack {expr} into a tuple")]
    #[diagnostic(
        code(tessera::unknown_length),
        help("Unpacking requires a length known at compile time")
    )]
    UnknownLength { expr: String },

    /// Non-constant index into a tuple whose elements have different types.
    #[error("Can't index inhomogeneous tuple {tuple} with non-constant index {index}")]
    #[diagnostic(code(tessera::dynamic_tuple_index))]
    DynamicTupleIndex { tuple: String, index: String },

    #[error("output_unit can be `stdout` or `stderr`, found `{file}`")]
    #[diagnostic(code(tessera::print_target))]
    UnsupportedPrintTarget { file: String },

    /// An operand whose kind the builtin cannot accept.
    #[error("Invalid argument for '{func}': {found}")]
    #[diagnostic(code(tessera::invalid_operand))]
    InvalidOperand { func: String, found: String },

    /// An untyped (syntactic) node reached a construction that needs types.
    #[error("Expecting an argument of valid type for '{func}', found untyped {found}")]
    #[diagnostic(code(tessera::untyped_operand))]
    UntypedOperand { func: String, found: String },

    #[error("Wrong number of arguments to '{func}': expected {expected}, found {found}")]
    #[diagnostic(code(tessera::arity))]
    WrongNumberOfArguments {
        func: String,
        /// Human readable arity, e.g. `1 to 3` or `at least 2`
        expected: String,
        found: usize,
    },

    #[error("range() arg 3 must not be zero")]
    #[diagnostic(code(tessera::zero_step))]
    ZeroRangeStep,

    #[error("Object {expr} has no length")]
    #[diagnostic(code(tessera::scalar_length))]
    LengthOfScalar { expr: String },
}

impl TypeError {
    /// Shorthand for [`TypeError::WrongNumberOfArguments`].
    pub fn arity(func: &str, expected: impl Into<String>, found: usize) -> Self {
        TypeError::WrongNumberOfArguments {
            func: func.to_string(),
            expected: expected.into(),
            found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    #[test]
    fn extremum_message_names_types() {
        let err = TypeError::InhomogeneousExtremum {
            func: "max".to_string(),
            types: "int(8), float(8)".to_string(),
        };
        expect![[r#"Cannot determine final dtype of 'max' call with arguments of different types (int(8), float(8))"#]]
            .assert_eq(&err.to_string());
    }

    #[test]
    fn arity_helper() {
        let err = TypeError::arity("zip", "at least 2", 1);
        assert_eq!(
            err.to_string(),
            "Wrong number of arguments to 'zip': expected at least 2, found 1"
        );
    }
}
