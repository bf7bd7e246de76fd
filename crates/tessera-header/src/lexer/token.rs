use logos::Logos;
use miette::SourceSpan;

/// A token spans from `start` to `end` within the original source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub span: SourceSpan,
}

/// Tokens of the header language.
///
/// Keywords are only reserved where the grammar expects them; the parser accepts any
/// keyword in a name position.
#[derive(Debug, Logos, PartialEq, Eq, Clone, Copy)]
pub enum TokenKind {
    #[token("#$")]
    Directive,

    // Keywords
    #[token("header")]
    Header,
    #[token("variable")]
    Variable,
    #[token("function")]
    Function,
    #[token("method")]
    Method,
    #[token("static")]
    Static,
    #[token("results")]
    Results,
    #[token("template")]
    Template,
    #[token("metavar")]
    Metavar,
    #[token("interface")]
    Interface,
    #[token("macro")]
    Macro,
    #[token("const")]
    Const,
    #[token("kind")]
    Kind,
    #[token("order")]
    Order,
    #[token("True")]
    True,
    #[token("False")]
    False,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("::")]
    DoubleColon,
    #[token(":=")]
    Define,
    #[token(".")]
    Dot,
    #[token("|")]
    Pipe,
    #[token("=")]
    Eq,
    #[token("*")]
    Star,

    #[regex(r"-?[0-9]+")]
    Int,
    #[regex(r"-?[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?")]
    Float,
    #[regex(r#"'[^']*'|"[^"]*""#)]
    String,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Name,

    // Whitespace (to be skipped)
    #[regex(r"[ \t\n\r]+", logos::skip)]
    Whitespace,

    // Catch-all for anything unexpected
    #[error]
    Error,
}

impl TokenKind {
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Header
                | TokenKind::Variable
                | TokenKind::Function
                | TokenKind::Method
                | TokenKind::Static
                | TokenKind::Results
                | TokenKind::Template
                | TokenKind::Metavar
                | TokenKind::Interface
                | TokenKind::Macro
                | TokenKind::Const
                | TokenKind::Kind
                | TokenKind::Order
        )
    }
}
