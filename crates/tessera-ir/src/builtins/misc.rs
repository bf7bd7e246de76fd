//! `print`, `type` and `lambda`.

use std::fmt;

use tessera_types::{DataType, TypeError, TypeResult};

use super::{Built, BuiltinCall, BuiltinKind};
use crate::expr::Expr;
use crate::signature::TypeSignature;

/// Output unit of a `print` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrintTarget {
    Stdout,
    Stderr,
}

impl fmt::Display for PrintTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrintTarget::Stdout => write!(f, "stdout"),
            PrintTarget::Stderr => write!(f, "stderr"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintNode {
    pub expr: Expr,
    pub file: PrintTarget,
}

/// `print(expr, file=...)` where `file` names the output unit.
pub fn print(expr: Expr, file: &str) -> TypeResult<Built> {
    let file = match file {
        "stdout" => PrintTarget::Stdout,
        "stderr" => PrintTarget::Stderr,
        other => {
            return Err(TypeError::UnsupportedPrintTarget {
                file: other.to_string(),
            })
        }
    };
    let node = PrintNode { expr, file };
    Ok(Built::Constructed(BuiltinCall::expr(
        BuiltinKind::Print(node),
        TypeSignature::void(),
    )))
}

/// `type(x)`. The node carries the kind and precision of `x`.
pub fn python_type(obj: Expr) -> TypeResult<Built> {
    if matches!(obj, Expr::Symbol(_)) {
        return Err(TypeError::UntypedOperand {
            func: "type".to_string(),
            found: obj.to_string(),
        });
    }
    let sig = obj.signature();
    let signature = TypeSignature::scalar(sig.dtype, sig.precision);
    Ok(Built::Constructed(BuiltinCall::expr(BuiltinKind::Type(obj), signature)))
}

impl BuiltinCall {
    /// What the source language prints for a `type(x)` node, `None` for other nodes.
    ///
    /// Default precisions print the builtin class name; explicit ones print the numpy
    /// scalar name with the width in bits, and arrays the ndarray class.
    pub fn print_string(&self) -> Option<String> {
        let BuiltinKind::Type(obj) = &self.kind else {
            return None;
        };
        let dtype = &self.signature.dtype;
        let precision = self.signature.precision;
        if precision.is_default() {
            return Some(format!("<class '{}'>", dtype));
        }
        let width = if *dtype == DataType::Complex { 16 } else { 8 };
        let bits = precision.value() as i32 * width;
        if obj.rank() > 0 {
            Some(format!("<class 'numpy.ndarray' ({}{})>", dtype, bits))
        } else {
            Some(format!("<class 'numpy.{}{}'>", dtype, bits))
        }
    }
}

/// `lambda x, y: expr`
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaNode {
    pub variables: Vec<String>,
    pub expr: Expr,
}

impl LambdaNode {
    /// Applies the lambda by substituting each argument for its variable.
    ///
    /// Panics if the number of arguments differs from the number of variables.
    pub fn call(&self, args: &[Expr]) -> Expr {
        assert_eq!(
            args.len(),
            self.variables.len(),
            "lambda takes {} arguments",
            self.variables.len()
        );
        let bindings: Vec<(&str, &Expr)> = self
            .variables
            .iter()
            .map(String::as_str)
            .zip(args)
            .collect();
        self.expr.substitute(&bindings)
    }
}

pub fn lambda(variables: Vec<String>, expr: Expr) -> Expr {
    let node = LambdaNode { variables, expr };
    BuiltinCall::expr(BuiltinKind::Lambda(node), TypeSignature::untyped())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::Operator;
    use crate::variable::Variable;
    use expect_test::expect;
    use tessera_types::{Order, Precision};

    fn type_string(obj: Expr) -> String {
        let e = python_type(obj).unwrap().into_expr();
        e.as_builtin().unwrap().print_string().unwrap()
    }

    #[test]
    fn print_targets() {
        let built = print(Expr::symbol("x"), "stderr").unwrap();
        assert_eq!(built.into_expr().to_string(), "print(x, file=stderr)");
        let err = print(Expr::symbol("x"), "log.txt").unwrap_err();
        expect![[r#"output_unit can be `stdout` or `stderr`, found `log.txt`"#]].assert_eq(&err.to_string());
    }

    #[test]
    fn type_strings() {
        assert_eq!(type_string(Expr::float(1.0)), "<class 'float'>");
        let x = Variable::scalar("x", DataType::Float).with_precision(Precision::new(4));
        assert_eq!(type_string(Expr::Variable(x)), "<class 'numpy.float32'>");
        let z = Variable::scalar("z", DataType::Complex).with_precision(Precision::new(8));
        assert_eq!(type_string(Expr::Variable(z)), "<class 'numpy.complex128'>");
        let a = Variable::array("a", DataType::Integer, 2, Order::C).with_precision(Precision::new(8));
        assert_eq!(type_string(Expr::Variable(a)), "<class 'numpy.ndarray' (int64)>");
    }

    #[test]
    fn type_needs_typed_operand() {
        assert!(python_type(Expr::symbol("x")).is_err());
    }

    #[test]
    fn lambda_application() {
        let body = Operator::mul(Expr::symbol("x"), Operator::add(Expr::symbol("y"), Expr::int(1)));
        let f = lambda(vec!["x".into(), "y".into()], body);
        let BuiltinKind::Lambda(node) = &f.as_builtin().unwrap().kind else {
            panic!("not a lambda");
        };
        let applied = node.call(&[Expr::symbol("a"), Expr::int(2)]);
        assert_eq!(applied.to_string(), "a * (2 + 1)");
        assert_eq!(f.to_string(), "lambda x, y: x * (y + 1)");
    }

    #[test]
    #[should_panic(expected = "lambda takes 2 arguments")]
    fn lambda_arity_is_checked() {
        let f = LambdaNode {
            variables: vec!["x".into(), "y".into()],
            expr: Expr::symbol("x"),
        };
        f.call(&[Expr::int(1)]);
    }
}
