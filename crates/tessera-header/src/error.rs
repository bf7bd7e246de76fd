use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

pub type HeaderResult<T> = Result<T, HeaderError>;

/// Errors raised while reading `#$ header` annotations.
///
/// Spans are byte offsets into the text handed to [`crate::parse_headers`] (or
/// [`crate::parse_header`] for a single line).
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("Lexer error: {message}")]
    #[diagnostic(code(tessera::header::lexer))]
    Lexer {
        #[label("here")]
        span: SourceSpan,
        message: String,
    },

    #[error("Parser error: {message}")]
    #[diagnostic(code(tessera::header::parser))]
    Parser {
        #[label("here")]
        span: SourceSpan,
        message: String,
    },

    #[error("Unknown type `{name}`")]
    #[diagnostic(
        code(tessera::header::unknown_type),
        help("Use a builtin type name or declare a template with `#$ header template`")
    )]
    UnknownType {
        #[label("not a type or template")]
        span: SourceSpan,
        name: String,
    },

    #[error("`{dtype}` has no kind {kind}")]
    #[diagnostic(code(tessera::header::invalid_kind))]
    InvalidKind {
        #[label("invalid kind")]
        span: SourceSpan,
        dtype: String,
        kind: i64,
    },

    #[error("A union type can't describe a single variable")]
    #[diagnostic(
        code(tessera::header::union_variable),
        help("Declare one alternative, or use a template in a function header")
    )]
    UnionVariable {
        #[label("union")]
        span: SourceSpan,
    },

    #[error("Template `{name}` is declared twice")]
    #[diagnostic(code(tessera::header::duplicate_template))]
    DuplicateTemplate {
        #[label("second declaration")]
        span: SourceSpan,
        name: String,
    },
}
