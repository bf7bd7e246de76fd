use miette::Diagnostic;
use thiserror::Error;

pub type BindResult<T> = Result<T, BindError>;

/// Reasons a definition can't be exposed through the C binding.
///
/// The module factory turns these into removed functions or skipped variables, so they
/// are reported rather than fatal.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("Can't expose `{name}` of type {dtype}({precision}) to C")]
    #[diagnostic(
        code(tessera::bind::unsupported_dtype),
        help("Only bool, int, float and complex values with a standard kind can cross the C boundary")
    )]
    UnsupportedDtype {
        name: String,
        dtype: String,
        precision: i8,
    },

    #[error("Function `{function}` can't be called from C: {reason}")]
    #[diagnostic(code(tessera::bind::unsupported_signature))]
    UnsupportedSignature { function: String, reason: String },
}
