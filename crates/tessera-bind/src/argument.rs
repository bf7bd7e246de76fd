// src/argument.rs
//! Argument and result wrappers carrying the extra C-side parameters of arrays.

use tessera_ir::{FunctionDefArgument, FunctionDefResult, TemporaryAllocator, Variable};
use tessera_types::DataType;

/// One logical argument of a bound function.
///
/// An argument of rank `r` is passed as the data followed by `r` shape and `r` stride
/// integers, all of them read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct BindCFunctionDefArgument {
    var: Variable,
    original_arg_var: Variable,
    shape: Vec<Variable>,
    strides: Vec<Variable>,
    inout: bool,
}

impl BindCFunctionDefArgument {
    /// Allocates `{var.name}_shape_{i}` and `{var.name}_stride_{i}` (1-indexed) for every
    /// dimension of `original_arg_var`.
    pub fn new(
        var: Variable,
        scope: &mut impl TemporaryAllocator,
        original_arg_var: Variable,
        inout: bool,
    ) -> Self {
        let rank = original_arg_var.rank();
        let shape = (1..=rank)
            .map(|i| {
                scope
                    .new_temporary(DataType::Integer, &format!("{}_shape_{}", var.name, i))
                    .constant()
            })
            .collect();
        let strides = (1..=rank)
            .map(|i| {
                scope
                    .new_temporary(DataType::Integer, &format!("{}_stride_{}", var.name, i))
                    .constant()
            })
            .collect();
        BindCFunctionDefArgument {
            var,
            original_arg_var,
            shape,
            strides,
            inout,
        }
    }

    /// The C-side variable: the value itself, or an opaque handle for arrays.
    pub fn var(&self) -> &Variable {
        &self.var
    }

    pub fn original_function_argument_variable(&self) -> &Variable {
        &self.original_arg_var
    }

    pub fn shape(&self) -> &[Variable] {
        &self.shape
    }

    pub fn strides(&self) -> &[Variable] {
        &self.strides
    }

    pub fn inout(&self) -> bool {
        self.inout
    }

    pub fn rank(&self) -> usize {
        self.original_arg_var.rank()
    }

    /// `[data, shape_1..shape_r, stride_1..stride_r]`
    pub fn get_all_function_def_arguments(&self) -> Vec<FunctionDefArgument> {
        let mut data = FunctionDefArgument::new(self.var.clone());
        data.inout = self.inout;
        std::iter::once(data)
            .chain(self.shape.iter().cloned().map(FunctionDefArgument::new))
            .chain(self.strides.iter().cloned().map(FunctionDefArgument::new))
            .collect()
    }

    /// Whether each flattened argument is written through. Only the data can be.
    pub fn inout_flags(&self) -> Vec<bool> {
        std::iter::once(self.inout)
            .chain(std::iter::repeat(false).take(2 * self.rank()))
            .collect()
    }
}

/// One logical result of a bound function, returned with its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct BindCFunctionDefResult {
    var: Variable,
    original_res_var: Variable,
    shape: Vec<Variable>,
}

impl BindCFunctionDefResult {
    /// Allocates `{original.name}_shape_{i}` (1-indexed) for every dimension of the
    /// original result.
    pub fn new(
        var: Variable,
        original_res_var: Variable,
        scope: &mut impl TemporaryAllocator,
    ) -> Self {
        let shape = (1..=original_res_var.rank())
            .map(|i| {
                scope.new_temporary(
                    DataType::Integer,
                    &format!("{}_shape_{}", original_res_var.name, i),
                )
            })
            .collect();
        BindCFunctionDefResult {
            var,
            original_res_var,
            shape,
        }
    }

    pub fn var(&self) -> &Variable {
        &self.var
    }

    pub fn original_function_result_variable(&self) -> &Variable {
        &self.original_res_var
    }

    pub fn shape(&self) -> &[Variable] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.original_res_var.rank()
    }

    /// `[data, shape_1..shape_r]`
    pub fn get_all_function_def_results(&self) -> Vec<FunctionDefResult> {
        std::iter::once(self.var.clone())
            .chain(self.shape.iter().cloned())
            .map(FunctionDefResult::new)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_ir::Scope;
    use tessera_types::Order;

    #[test]
    fn array_argument_flattens() {
        let mut scope = Scope::new();
        let original = Variable::array("x", DataType::Float, 3, Order::F);
        let handle = Variable::scalar("x", DataType::BindCPointer);
        let arg = BindCFunctionDefArgument::new(handle, &mut scope, original, true);

        let names: Vec<_> = arg
            .get_all_function_def_arguments()
            .iter()
            .map(|a| a.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["x", "x_shape_1", "x_shape_2", "x_shape_3", "x_stride_1", "x_stride_2", "x_stride_3"]
        );
        assert_eq!(arg.inout_flags(), vec![true, false, false, false, false, false, false]);
        assert!(arg.shape().iter().chain(arg.strides()).all(|v| v.is_const));
    }

    #[test]
    fn scalar_argument_is_alone() {
        let mut scope = Scope::new();
        let n = Variable::scalar("n", DataType::Integer);
        let arg = BindCFunctionDefArgument::new(n.clone(), &mut scope, n, false);
        assert_eq!(arg.get_all_function_def_arguments().len(), 1);
        assert_eq!(arg.inout_flags(), vec![false]);
    }

    #[test]
    fn result_shape_names_follow_original() {
        let mut scope = Scope::new();
        let original = Variable::array("out", DataType::Integer, 2, Order::C);
        let handle = Variable::scalar("bind_c_out", DataType::BindCPointer);
        let res = BindCFunctionDefResult::new(handle, original, &mut scope);
        let names: Vec<_> = res
            .get_all_function_def_results()
            .iter()
            .map(|r| r.var.name.clone())
            .collect();
        assert_eq!(names, vec!["bind_c_out", "out_shape_1", "out_shape_2"]);
    }
}
