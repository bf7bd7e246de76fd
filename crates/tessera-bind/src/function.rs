//! Functions in the C calling convention.

use rustc_hash::FxHashSet;
use tessera_ir::{FunctionDefArgument, FunctionDefResult, FunctionId};

use crate::argument::{BindCFunctionDefArgument, BindCFunctionDefResult};
use crate::pointer::WrapperStmt;

/// A function callable from C that forwards to a function of the translated program.
///
/// Preconditions (checked on construction):
///  - `name` is lower case (Fortran names are case-insensitive, C names are not).
///  - every wrapper has one shape (and, for arguments, one stride) variable per dimension.
///  - the flattened parameter and result names are pairwise distinct.
#[derive(Debug, Clone, PartialEq)]
pub struct BindCFunctionDef {
    name: String,
    arguments: Vec<BindCFunctionDefArgument>,
    results: Vec<BindCFunctionDefResult>,
    body: Vec<WrapperStmt>,
    original_function: Option<FunctionId>,
}

impl BindCFunctionDef {
    pub fn new(
        name: impl Into<String>,
        arguments: Vec<BindCFunctionDefArgument>,
        results: Vec<BindCFunctionDefResult>,
        body: Vec<WrapperStmt>,
        original_function: Option<FunctionId>,
    ) -> Self {
        let name = name.into();
        assert_eq!(name, name.to_lowercase(), "bound function name `{}` must be lower case", name);
        for arg in &arguments {
            assert_eq!(arg.shape().len(), arg.rank(), "shape variables of `{}`", arg.var().name);
            assert_eq!(arg.strides().len(), arg.rank(), "stride variables of `{}`", arg.var().name);
        }
        for res in &results {
            assert_eq!(res.shape().len(), res.rank(), "shape variables of `{}`", res.var().name);
        }

        let def = BindCFunctionDef {
            name,
            arguments,
            results,
            body,
            original_function,
        };
        let mut seen = FxHashSet::default();
        for var_name in def
            .arguments()
            .iter()
            .map(|a| a.var.name.to_lowercase())
            .chain(def.results().iter().map(|r| r.var.name.to_lowercase()))
        {
            assert!(seen.insert(var_name.clone()), "`{}` appears twice in `{}`", var_name, def.name);
        }
        def
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every C parameter, shapes and strides included.
    pub fn arguments(&self) -> Vec<FunctionDefArgument> {
        self.arguments
            .iter()
            .flat_map(BindCFunctionDefArgument::get_all_function_def_arguments)
            .collect()
    }

    /// Every C result, shapes included.
    pub fn results(&self) -> Vec<FunctionDefResult> {
        self.results
            .iter()
            .flat_map(BindCFunctionDefResult::get_all_function_def_results)
            .collect()
    }

    /// One wrapper per argument of the original function.
    pub fn bind_c_arguments(&self) -> &[BindCFunctionDefArgument] {
        &self.arguments
    }

    pub fn bind_c_results(&self) -> &[BindCFunctionDefResult] {
        &self.results
    }

    pub fn body(&self) -> &[WrapperStmt] {
        &self.body
    }

    /// The wrapped function. `None` for synthesized accessors of module variables.
    pub fn original_function(&self) -> Option<FunctionId> {
        self.original_function
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_ir::{Scope, Variable};
    use tessera_types::{DataType, Order};

    fn array_arg(scope: &mut Scope, name: &str) -> BindCFunctionDefArgument {
        let original = Variable::array(name, DataType::Float, 1, Order::C);
        BindCFunctionDefArgument::new(
            Variable::scalar(name, DataType::BindCPointer),
            scope,
            original,
            false,
        )
    }

    #[test]
    #[should_panic(expected = "must be lower case")]
    fn upper_case_name_is_rejected() {
        BindCFunctionDef::new("Bind_c_F", vec![], vec![], vec![], None);
    }

    #[test]
    #[should_panic(expected = "appears twice")]
    fn duplicate_flattened_names_are_rejected() {
        // two scopes hand out the same shape names
        let a = array_arg(&mut Scope::new(), "x");
        let b = array_arg(&mut Scope::new(), "x");
        BindCFunctionDef::new("bind_c_f", vec![a, b], vec![], vec![], Some(FunctionId(0)));
    }

    #[test]
    fn flattening() {
        let mut scope = Scope::new();
        let a = array_arg(&mut scope, "x");
        let n = Variable::scalar("n", DataType::Integer);
        let b = BindCFunctionDefArgument::new(n.clone(), &mut scope, n, false);
        let def = BindCFunctionDef::new("bind_c_f", vec![a, b], vec![], vec![], Some(FunctionId(3)));
        assert_eq!(def.arguments().len(), 4);
        assert_eq!(def.bind_c_arguments().len(), 2);
        assert_eq!(def.original_function(), Some(FunctionId(3)));
    }
}
