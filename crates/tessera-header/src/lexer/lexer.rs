use super::token::*;
use crate::{HeaderError, HeaderResult};
use logos::Logos;
use miette::SourceSpan;

/// Lexes the input string into a vector of tokens.
pub fn lex(input: &str) -> HeaderResult<Vec<Token<'_>>> {
    lex_from(input, 0)
}

/// Lexes `input`, which starts at byte `offset` of a larger source.
pub fn lex_from(input: &str, offset: usize) -> HeaderResult<Vec<Token<'_>>> {
    let mut lexer = TokenKind::lexer(input);
    let mut tokens = Vec::new();

    while let Some(kind) = lexer.next() {
        let range = lexer.span();
        let lexeme = &input[range.clone()];
        let span = SourceSpan::new((offset + range.start).into(), range.len());

        match kind {
            TokenKind::Error => {
                return Err(HeaderError::Lexer {
                    span,
                    message: format!("Unrecognized token: '{}'", lexeme),
                });
            }
            _ => {
                tokens.push(Token { kind, lexeme, span });
            }
        }
    }

    Ok(tokens)
}
