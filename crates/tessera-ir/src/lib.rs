//! Typed intermediate representation.
//!
//! The base IR ([`Expr`], [`Literal`], [`Variable`], operators, indexing, definitions)
//! and the typed builtin-operation layer in [`builtins`]. Node signatures are computed
//! when a node is built and never change afterwards.

pub mod builtins;
pub mod defs;
pub mod expr;
pub mod indexing;
pub mod literal;
pub mod operators;
pub mod scope;
pub mod signature;
pub mod stage;
pub mod variable;

pub use builtins::{builtin_datatype, Built, BuiltinCall, BuiltinFunction, BuiltinKind};
pub use defs::{ClassDef, ClassId, DefArena, FunctionDef, FunctionDefArgument, FunctionDefResult, FunctionId, Module, ModuleId};
pub use expr::{Expr, Index, IndexedElement, Slice};
pub use indexing::{index_all, index_expr};
pub use literal::Literal;
pub use operators::{Operator, OperatorKind};
pub use scope::{Scope, TemporaryAllocator};
pub use signature::{Shape, TypeSignature};
pub use stage::Stage;
pub use variable::{MemoryHandling, Variable};

pub use tessera_types::{ClassType, DataType, Order, Precision, TypeError, TypeResult};
