//! Fortran-to-C binding layer.
//!
//! Turns fully typed function and module definitions into their C calling convention:
//! arrays travel as opaque handles with explicit shape and stride parameters, and every
//! bound node keeps the arena id of the definition it came from. Class instances cross
//! the boundary as opaque handles too.

pub mod argument;
pub mod error;
pub mod function;
pub mod module;
pub mod ndarray;
pub mod pointer;
pub mod wrapper;

pub use argument::{BindCFunctionDefArgument, BindCFunctionDefResult};
pub use error::{BindError, BindResult};
pub use function::BindCFunctionDef;
pub use module::{BindCArrayVariable, BindCClassDef, BindCClassProperty, BindCModule, BindCVariable};
pub use ndarray::{array_type_check, numpy_type_for, scalar_type_check, NumpyType};
pub use pointer::{CFPointer, CLocFunc, WrapperStmt};
pub use wrapper::CBindingWrapper;
