//! Type vocabulary for the Tessera IR.
//!
//! This crate holds the pieces of a type signature that do not depend on expressions:
//! element kinds, precisions, memory orders and container classes, plus the diagnostic
//! enum shared by every typed-node constructor.

pub mod datatypes;
pub mod error;

pub use datatypes::{ClassType, DataType, Order, Precision};
pub use error::{TypeError, TypeResult};
