//! Statements of a binding wrapper body.

use tessera_ir::{Expr, FunctionId, Variable};
use tessera_types::DataType;

/// `result = c_loc(arg)`: the address of `arg` as an opaque handle.
#[derive(Debug, Clone, PartialEq)]
pub struct CLocFunc {
    arg: Variable,
    result: Variable,
}

impl CLocFunc {
    /// Panics unless `result` is an opaque handle.
    pub fn new(arg: Variable, result: Variable) -> Self {
        assert_eq!(
            *result.dtype(),
            DataType::BindCPointer,
            "c_loc result `{}` must be an opaque pointer",
            result.name
        );
        CLocFunc { arg, result }
    }

    pub fn arg(&self) -> &Variable {
        &self.arg
    }

    pub fn result(&self) -> &Variable {
        &self.result
    }
}

/// `call c_f_pointer(c_pointer, f_array, shape)`: views the memory behind a handle as an
/// array of the given shape.
#[derive(Debug, Clone, PartialEq)]
pub struct CFPointer {
    c_pointer: Variable,
    f_array: Variable,
    shape: Vec<Expr>,
}

impl CFPointer {
    /// Panics if `shape` does not have one entry per dimension of `f_array`.
    pub fn new(c_pointer: Variable, f_array: Variable, shape: Vec<Expr>) -> Self {
        assert_eq!(
            shape.len(),
            f_array.rank(),
            "c_f_pointer shape for `{}` must have one entry per dimension",
            f_array.name
        );
        CFPointer {
            c_pointer,
            f_array,
            shape,
        }
    }

    pub fn c_pointer(&self) -> &Variable {
        &self.c_pointer
    }

    pub fn f_array(&self) -> &Variable {
        &self.f_array
    }

    pub fn shape(&self) -> &[Expr] {
        &self.shape
    }
}

/// One statement of the body of a [`BindCFunctionDef`](crate::BindCFunctionDef).
#[derive(Debug, Clone, PartialEq)]
pub enum WrapperStmt {
    Reinterpret(CFPointer),
    AddressOf(CLocFunc),
    Assign { lhs: Variable, rhs: Expr },
    /// `lhs = object%attribute`
    GetAttribute {
        lhs: Variable,
        object: Variable,
        attribute: Variable,
    },
    /// `object%attribute = value`
    SetAttribute {
        object: Variable,
        attribute: Variable,
        value: Expr,
    },
    /// Call of the wrapped function, storing its results in `results`.
    Call {
        function: FunctionId,
        args: Vec<Expr>,
        results: Vec<Variable>,
    },
}
