use crate::ast::*;
use crate::lexer::{Token, TokenKind};
use crate::{HeaderError, HeaderResult};
use miette::SourceSpan;
use tessera_ir::Literal;
use tessera_types::{Order, Precision};

/// Hand-rolled recursive-descent parser over the tokens of one header line.
pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    /// Byte offset just past the line, for errors at end of input.
    eof: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token<'a>], eof: usize) -> Self {
        Self { tokens, pos: 0, eof }
    }

    /// Peek at the current token without consuming it.
    fn peek(&self) -> Option<&'a Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn peek_second_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos + 1).map(|t| t.kind)
    }

    /// Consume and return the current token.
    fn next(&mut self) -> Option<&'a Token<'a>> {
        let tokens = self.tokens;
        let tok = tokens.get(self.pos);
        self.pos += 1;
        tok
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eof_span(&self) -> SourceSpan {
        SourceSpan::new(self.eof.into(), 0usize)
    }

    fn error(&self, span: SourceSpan, message: impl Into<String>) -> HeaderError {
        HeaderError::Parser {
            span,
            message: message.into(),
        }
    }

    /// Expect the next token to be of a specific kind.
    fn expect(&mut self, expected: TokenKind) -> HeaderResult<&'a Token<'a>> {
        match self.next() {
            Some(t) if t.kind == expected => Ok(t),
            Some(t) => Err(self.error(
                t.span,
                format!("Expected {:?}, found {:?}", expected, t.kind),
            )),
            None => Err(self.error(
                self.eof_span(),
                format!("Unexpected end of input; expected {:?}", expected),
            )),
        }
    }

    /// A name. Keywords are names wherever the grammar expects one.
    fn expect_name(&mut self) -> HeaderResult<&'a Token<'a>> {
        match self.next() {
            Some(t) if t.kind == TokenKind::Name || t.kind.is_keyword() => Ok(t),
            Some(t) => Err(self.error(t.span, format!("Expected a name, found {:?}", t.kind))),
            None => Err(self.error(self.eof_span(), "Unexpected end of input; expected a name")),
        }
    }

    fn start_offset(&self) -> usize {
        self.peek().map(|t| t.span.offset()).unwrap_or(self.eof)
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: usize) -> SourceSpan {
        let end = self
            .pos
            .checked_sub(1)
            .and_then(|last| self.tokens.get(last))
            .map(|t| t.span.offset() + t.span.len())
            .unwrap_or(start);
        SourceSpan::new(start.into(), end.saturating_sub(start))
    }

    //--------------------------------------------------------------------------
    // Statements
    //--------------------------------------------------------------------------

    /// Parses one statement, with or without the `#$ header` prefix, and requires the
    /// whole line to be consumed.
    pub fn parse_statement(&mut self) -> HeaderResult<HeaderStmt> {
        if self.eat(TokenKind::Directive) {
            self.expect(TokenKind::Header)?;
        }
        let stmt = match self.peek_kind() {
            Some(TokenKind::Variable) => self.parse_variable()?,
            Some(TokenKind::Template) => HeaderStmt::Template(self.parse_template()?),
            Some(TokenKind::Metavar) => HeaderStmt::Metavar(self.parse_metavar()?),
            Some(TokenKind::Interface) => HeaderStmt::Interface(self.parse_interface()?),
            Some(TokenKind::Macro) => HeaderStmt::Macro(self.parse_macro()?),
            Some(_) => HeaderStmt::Function(self.parse_function()?),
            None => return Err(self.error(self.eof_span(), "Empty header")),
        };
        match self.peek() {
            Some(t) => Err(self.error(t.span, format!("Unexpected {:?} after header", t.kind))),
            None => Ok(stmt),
        }
    }

    /// `variable NAME [::] type`
    fn parse_variable(&mut self) -> HeaderResult<HeaderStmt> {
        self.expect(TokenKind::Variable)?;
        let name = self.expect_name()?.lexeme.to_string();
        self.eat(TokenKind::DoubleColon);
        let annotation = self.parse_type()?;
        Ok(HeaderStmt::Variable { name, annotation })
    }

    /// `[function|method] [static] NAME ( [types] ) [results ( types )]`
    fn parse_function(&mut self) -> HeaderResult<FunctionHeader> {
        let start = self.start_offset();
        let kind = if self.eat(TokenKind::Method) {
            FunctionKind::Method
        } else {
            self.eat(TokenKind::Function);
            FunctionKind::Function
        };
        // `static(...)` is a function called static
        let is_static =
            self.peek_second_kind() != Some(TokenKind::LParen) && self.eat(TokenKind::Static);
        let name = self.expect_name()?.lexeme.to_string();

        self.expect(TokenKind::LParen)?;
        let arguments = if self.peek_kind() == Some(TokenKind::RParen) {
            Vec::new()
        } else {
            self.parse_type_list()?
        };
        self.expect(TokenKind::RParen)?;

        let results = if self.eat(TokenKind::Results) {
            self.expect(TokenKind::LParen)?;
            let results = self.parse_type_list()?;
            self.expect(TokenKind::RParen)?;
            results
        } else {
            Vec::new()
        };

        Ok(FunctionHeader {
            kind,
            is_static,
            name,
            arguments,
            results,
            span: self.span_from(start),
        })
    }

    /// `template NAME ( type )`
    fn parse_template(&mut self) -> HeaderResult<Template> {
        let start = self.start_offset();
        self.expect(TokenKind::Template)?;
        let name = self.expect_name()?.lexeme.to_string();
        self.expect(TokenKind::LParen)?;
        let types = self.parse_type()?;
        self.expect(TokenKind::RParen)?;
        Ok(Template {
            name,
            types,
            span: self.span_from(start),
        })
    }

    /// `metavar NAME = value`
    fn parse_metavar(&mut self) -> HeaderResult<MetaVariable> {
        self.expect(TokenKind::Metavar)?;
        let name = self.expect_name()?.lexeme.to_string();
        self.expect(TokenKind::Eq)?;
        let value = self.parse_literal()?;
        Ok(MetaVariable { name, value })
    }

    /// A string, number or boolean constant.
    fn parse_literal(&mut self) -> HeaderResult<Literal> {
        let tok = match self.next() {
            Some(t) => t,
            None => {
                return Err(self.error(self.eof_span(), "Unexpected end of input; expected a value"))
            }
        };
        let value = match tok.kind {
            TokenKind::String => Literal::String(tok.lexeme[1..tok.lexeme.len() - 1].to_string()),
            TokenKind::Int => tok
                .lexeme
                .parse()
                .map(Literal::int)
                .map_err(|_| self.error(tok.span, format!("Integer out of range: {}", tok.lexeme)))?,
            TokenKind::Float => tok
                .lexeme
                .parse()
                .map(Literal::float)
                .map_err(|_| self.error(tok.span, format!("Invalid number: {}", tok.lexeme)))?,
            TokenKind::True => Literal::Bool(true),
            TokenKind::False => Literal::Bool(false),
            other => {
                return Err(self.error(tok.span, format!("Expected a value, found {:?}", other)))
            }
        };
        Ok(value)
    }

    /// `interface NAME = NAME (| NAME)*`
    fn parse_interface(&mut self) -> HeaderResult<InterfaceHeader> {
        self.expect(TokenKind::Interface)?;
        let name = self.expect_name()?.lexeme.to_string();
        self.expect(TokenKind::Eq)?;
        let mut functions = vec![self.expect_name()?.lexeme.to_string()];
        while self.eat(TokenKind::Pipe) {
            functions.push(self.expect_name()?.lexeme.to_string());
        }
        Ok(InterfaceHeader { name, functions })
    }

    //--------------------------------------------------------------------------
    // Macros
    //--------------------------------------------------------------------------

    /// `macro [(NAME, ...),] NAME(.NAME)* [( args )] := NAME [( values )]`
    fn parse_macro(&mut self) -> HeaderResult<MacroHeader> {
        let start = self.start_offset();
        self.expect(TokenKind::Macro)?;

        let mut results = Vec::new();
        if self.eat(TokenKind::LParen) {
            results = self.parse_name_list()?;
            self.expect(TokenKind::RParen)?;
            self.expect(TokenKind::Comma)?;
        }

        let mut name = self.expect_name()?.lexeme.to_string();
        let mut arguments = Vec::new();
        while self.eat(TokenKind::Dot) {
            let part = self.expect_name()?.lexeme.to_string();
            let owner = std::mem::replace(&mut name, part);
            arguments.push(MacroArgument::Name {
                name: owner,
                default: None,
            });
        }
        if self.eat(TokenKind::LParen) {
            if self.peek_kind() != Some(TokenKind::RParen) {
                arguments.push(self.parse_macro_argument()?);
                while self.eat(TokenKind::Comma) {
                    arguments.push(self.parse_macro_argument()?);
                }
            }
            self.expect(TokenKind::RParen)?;
        }

        self.expect(TokenKind::Define)?;
        let master = self.expect_name()?.lexeme.to_string();
        let mut master_arguments = Vec::new();
        if self.eat(TokenKind::LParen) {
            if self.peek_kind() != Some(TokenKind::RParen) {
                master_arguments.push(self.parse_macro_value()?);
                while self.eat(TokenKind::Comma) {
                    master_arguments.push(self.parse_macro_value()?);
                }
            }
            self.expect(TokenKind::RParen)?;
        }

        if arguments.is_empty() && master_arguments.is_empty() && results.is_empty() {
            return Ok(MacroHeader::Variable { name, master });
        }
        Ok(MacroHeader::Function {
            name,
            arguments,
            master,
            master_arguments,
            results,
            span: self.span_from(start),
        })
    }

    fn parse_name_list(&mut self) -> HeaderResult<Vec<String>> {
        let mut names = vec![self.expect_name()?.lexeme.to_string()];
        while self.eat(TokenKind::Comma) {
            names.push(self.expect_name()?.lexeme.to_string());
        }
        Ok(names)
    }

    /// `NAME [= value]` or `( NAME, ... )`
    fn parse_macro_argument(&mut self) -> HeaderResult<MacroArgument> {
        if self.eat(TokenKind::LParen) {
            let names = self.parse_name_list()?;
            self.expect(TokenKind::RParen)?;
            return Ok(MacroArgument::Tuple(names));
        }
        let name = self.expect_name()?.lexeme.to_string();
        let default = if self.eat(TokenKind::Eq) {
            Some(self.parse_macro_value()?)
        } else {
            None
        };
        Ok(MacroArgument::Name { name, default })
    }

    /// `NAME`, `NAME.ATTR`, `NAME.ATTR[INT]` or a constant.
    fn parse_macro_value(&mut self) -> HeaderResult<MacroValue> {
        let is_name = self
            .peek()
            .map_or(false, |t| t.kind == TokenKind::Name || t.kind.is_keyword());
        if !is_name {
            return self.parse_literal().map(MacroValue::Literal);
        }
        let name = self.expect_name()?.lexeme.to_string();
        if !self.eat(TokenKind::Dot) {
            return Ok(MacroValue::Name(name));
        }
        let attribute = self.expect_name()?.lexeme.to_string();
        let index = if self.eat(TokenKind::LBracket) {
            let tok = self.expect(TokenKind::Int)?;
            let index = tok
                .lexeme
                .parse()
                .map_err(|_| self.error(tok.span, format!("Integer out of range: {}", tok.lexeme)))?;
            self.expect(TokenKind::RBracket)?;
            Some(index)
        } else {
            None
        };
        Ok(MacroValue::Attribute {
            name,
            attribute,
            index,
        })
    }

    //--------------------------------------------------------------------------
    // Types
    //--------------------------------------------------------------------------

    fn parse_type_list(&mut self) -> HeaderResult<Vec<TypeAnnotation>> {
        let mut types = vec![self.parse_type()?];
        while self.eat(TokenKind::Comma) {
            types.push(self.parse_type()?);
        }
        Ok(types)
    }

    /// `[const] atom (| atom)*`
    pub fn parse_type(&mut self) -> HeaderResult<TypeAnnotation> {
        let start = self.start_offset();
        let is_const = self.eat(TokenKind::Const);
        let mut alternatives = vec![self.parse_atom()?];
        while self.eat(TokenKind::Pipe) {
            alternatives.push(self.parse_atom()?);
        }
        Ok(TypeAnnotation {
            is_const,
            alternatives,
            span: self.span_from(start),
        })
    }

    /// `DTYPE [(kind=INT)] [[:(,:)*]] [(order=C|F)]`
    fn parse_atom(&mut self) -> HeaderResult<TypeAtom> {
        let start = self.start_offset();
        let tok = match self.next() {
            Some(t) if matches!(t.kind, TokenKind::Name | TokenKind::Star) => t,
            Some(t) => return Err(self.error(t.span, format!("Expected a type, found {:?}", t.kind))),
            None => return Err(self.error(self.eof_span(), "Unexpected end of input; expected a type")),
        };
        let mut base = BaseType::builtin(tok.lexeme)
            .unwrap_or_else(|| BaseType::Named(tok.lexeme.to_string()));

        if self.peek_kind() == Some(TokenKind::LParen) && self.peek_second_kind() == Some(TokenKind::Kind) {
            base = self.parse_kind(tok.lexeme, base)?;
        }

        let mut rank = 0;
        if self.eat(TokenKind::LBracket) {
            self.expect(TokenKind::Colon)?;
            rank = 1;
            while self.eat(TokenKind::Comma) {
                self.expect(TokenKind::Colon)?;
                rank += 1;
            }
            self.expect(TokenKind::RBracket)?;
        }

        let mut order = None;
        if self.peek_kind() == Some(TokenKind::LParen) && self.peek_second_kind() == Some(TokenKind::Order) {
            self.expect(TokenKind::LParen)?;
            self.expect(TokenKind::Order)?;
            self.expect(TokenKind::Eq)?;
            let flag = self.expect(TokenKind::Name)?;
            order = Some(match flag.lexeme {
                "C" => Order::C,
                "F" => Order::F,
                other => {
                    return Err(self.error(flag.span, format!("Expected order C or F, found '{}'", other)))
                }
            });
            self.expect(TokenKind::RParen)?;
        }

        Ok(TypeAtom {
            base,
            rank,
            order,
            span: self.span_from(start),
        })
    }

    /// `(kind=INT)` after a type name without an explicit width.
    fn parse_kind(&mut self, type_name: &str, base: BaseType) -> HeaderResult<BaseType> {
        self.expect(TokenKind::LParen)?;
        self.expect(TokenKind::Kind)?;
        self.expect(TokenKind::Eq)?;
        let tok = self.expect(TokenKind::Int)?;
        self.expect(TokenKind::RParen)?;

        let invalid = |kind: i64| HeaderError::InvalidKind {
            span: tok.span,
            dtype: type_name.to_string(),
            kind,
        };
        let kind: i64 = tok
            .lexeme
            .parse()
            .map_err(|_| self.error(tok.span, format!("Integer out of range: {}", tok.lexeme)))?;
        match base {
            BaseType::Builtin { dtype, precision }
                if precision.is_default() && valid_kinds(&dtype).iter().any(|&k| i64::from(k) == kind) =>
            {
                Ok(BaseType::Builtin {
                    dtype,
                    precision: Precision::new(kind as i8),
                })
            }
            _ => Err(invalid(kind)),
        }
    }
}
