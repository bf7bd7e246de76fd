pub mod lexer;
pub mod token;

pub use lexer::*;
pub use token::*;

#[cfg(test)]
mod tests {
    use crate::lexer::{lex, TokenKind};

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lex_function_header() {
        assert_eq!(
            kinds("#$ header function f(float64[:,:](order=F)) results(int)"),
            vec![
                TokenKind::Directive,
                TokenKind::Header,
                TokenKind::Function,
                TokenKind::Name,
                TokenKind::LParen,
                TokenKind::Name,
                TokenKind::LBracket,
                TokenKind::Colon,
                TokenKind::Comma,
                TokenKind::Colon,
                TokenKind::RBracket,
                TokenKind::LParen,
                TokenKind::Order,
                TokenKind::Eq,
                TokenKind::Name,
                TokenKind::RParen,
                TokenKind::RParen,
                TokenKind::Results,
                TokenKind::LParen,
                TokenKind::Name,
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_lex_literals() {
        assert_eq!(
            kinds("metavar x = 'abc' 3 -2 1.5 2.0e3 True"),
            vec![
                TokenKind::Metavar,
                TokenKind::Name,
                TokenKind::Eq,
                TokenKind::String,
                TokenKind::Int,
                TokenKind::Int,
                TokenKind::Float,
                TokenKind::Float,
                TokenKind::True,
            ]
        );
    }

    #[test]
    fn test_lex_macro_punctuation() {
        assert_eq!(
            kinds("macro _f(x) := f(x.shape[0]) variable n :: int"),
            vec![
                TokenKind::Macro,
                TokenKind::Name,
                TokenKind::LParen,
                TokenKind::Name,
                TokenKind::RParen,
                TokenKind::Define,
                TokenKind::Name,
                TokenKind::LParen,
                TokenKind::Name,
                TokenKind::Dot,
                TokenKind::Name,
                TokenKind::LBracket,
                TokenKind::Int,
                TokenKind::RBracket,
                TokenKind::RParen,
                TokenKind::Variable,
                TokenKind::Name,
                TokenKind::DoubleColon,
                TokenKind::Name,
            ]
        );
    }

    #[test]
    fn test_keyword_prefix_is_a_name() {
        assert_eq!(kinds("kinds constant"), vec![TokenKind::Name, TokenKind::Name]);
    }

    #[test]
    fn test_lex_invalid_token() {
        let err = lex("variable x int ?").unwrap_err();
        assert!(err.to_string().contains("Unrecognized token: '?'"));
    }

    #[test]
    fn test_lex_empty_input() {
        assert!(lex("").unwrap().is_empty());
    }
}
