//! Reader for `#$ header` annotations.
//!
//! A header line declares the types of a variable or a function, or a template, a
//! meta-variable or an interface:
//!
//! ```text
//! #$ header variable n int
//! #$ header function f(float64[:,:](order=F), int) results(float)
//! #$ header template T(int|float)
//! #$ header metavar module_name = 'mod'
//! #$ header interface g = g_int | g_float
//! #$ header macro _f(x) := f(x, x.shape)
//! ```
//!
//! `variable x :: int` is accepted as a spelling of `variable x int`.
//!
//! Annotations lower to typed [`tessera_ir::Variable`]s and function headers to
//! [`tessera_ir::FunctionDef`]s.

pub mod ast;
pub mod error;
pub mod headers;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use error::{HeaderError, HeaderResult};
pub use headers::Headers;
pub use miette::SourceSpan;

use lexer::lex_from;
use parser::Parser;

/// Parses a single header statement. The `#$ header` prefix is optional.
pub fn parse_header(input: &str) -> HeaderResult<HeaderStmt> {
    parse_line(input, 0)
}

/// Parses every `#$ header` line of `source`. Other lines, including other `#$`
/// directives such as `#$ omp parallel`, are skipped. Spans are offsets into `source`.
pub fn parse_headers(source: &str) -> HeaderResult<Headers> {
    let mut headers = Headers::new();
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        let Some(directive) = line.trim_start().strip_prefix("#$") else {
            continue;
        };
        if !is_header_directive(directive) {
            log::trace!("skipping directive `{}`", line.trim());
            continue;
        }
        headers.push(parse_line(line, start)?)?;
    }
    Ok(headers)
}

/// `header` is the first word after `#$`.
fn is_header_directive(directive: &str) -> bool {
    let word = directive
        .trim_start()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .next();
    word == Some("header")
}

fn parse_line(line: &str, offset: usize) -> HeaderResult<HeaderStmt> {
    let tokens = lex_from(line, offset)?;
    let eof = offset + line.trim_end().len();
    let stmt = Parser::new(&tokens, eof).parse_statement()?;
    log::trace!("parsed header `{}`", stmt.name());
    Ok(stmt)
}
