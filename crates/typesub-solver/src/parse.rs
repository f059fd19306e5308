//! Parser for annotation source text.
//!
//! Accepts the subset of Python expression syntax that appears in type
//! annotations:
//!
//! ```text
//! expr     := term ('|' term)*
//! term     := '~' IDENT
//!           | 'None' | 'True' | 'False' | '-'? INT | STRING | BYTES | '...'
//!           | '[' (expr (',' expr)* ','?)? ']'
//!           | '(' ')' | '(' expr ')'
//!           | dotted ('[' expr (',' expr)* ','? ']')*
//!           | dotted '(' typevar-args ')'          (TypeVar only)
//! dotted   := IDENT ('.' IDENT)*
//! ```

use crate::error::TypeExprError;
use crate::expr::TypeExpr;
use std::str::FromStr;
use typesub_common::limits::{MAX_TYPE_EXPR_DEPTH, MAX_TYPE_EXPR_LEN};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    Bytes(String),
    Int(i64),
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Dot,
    Pipe,
    Tilde,
    Equals,
    Minus,
    Ellipsis,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("`{name}`"),
            Token::Str(_) => "string literal".to_string(),
            Token::Bytes(_) => "bytes literal".to_string(),
            Token::Int(value) => format!("`{value}`"),
            Token::LBracket => "`[`".to_string(),
            Token::RBracket => "`]`".to_string(),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::Dot => "`.`".to_string(),
            Token::Pipe => "`|`".to_string(),
            Token::Tilde => "`~`".to_string(),
            Token::Equals => "`=`".to_string(),
            Token::Minus => "`-`".to_string(),
            Token::Ellipsis => "`...`".to_string(),
        }
    }
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer { src, pos: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn tokenize(mut self) -> Result<Vec<(Token, usize)>, TypeExprError> {
        let mut tokens = Vec::new();
        while let Some(ch) = self.peek_char() {
            let start = self.pos;
            if ch.is_whitespace() {
                self.bump();
                continue;
            }
            let token = match ch {
                '[' => self.single(Token::LBracket),
                ']' => self.single(Token::RBracket),
                '(' => self.single(Token::LParen),
                ')' => self.single(Token::RParen),
                ',' => self.single(Token::Comma),
                '|' => self.single(Token::Pipe),
                '~' => self.single(Token::Tilde),
                '=' => self.single(Token::Equals),
                '-' => self.single(Token::Minus),
                '.' => {
                    if self.src[self.pos..].starts_with("...") {
                        self.pos += 3;
                        Token::Ellipsis
                    } else {
                        self.single(Token::Dot)
                    }
                }
                '\'' | '"' => Token::Str(self.string()?),
                'b' | 'B' if matches!(self.src[self.pos + 1..].chars().next(), Some('\'' | '"')) => {
                    self.bump();
                    Token::Bytes(self.string()?)
                }
                c if c.is_ascii_digit() => self.int()?,
                c if c.is_alphabetic() || c == '_' => self.ident(),
                other => {
                    return Err(TypeExprError::parse(
                        start,
                        format!("unexpected character `{other}`"),
                    ));
                }
            };
            tokens.push((token, start));
        }
        Ok(tokens)
    }

    fn single(&mut self, token: Token) -> Token {
        self.bump();
        token
    }

    fn ident(&mut self) -> Token {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_alphanumeric() || ch == '_' {
                self.bump();
            } else {
                break;
            }
        }
        Token::Ident(self.src[start..self.pos].to_string())
    }

    fn int(&mut self) -> Result<Token, TypeExprError> {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() || ch == '_' {
                self.bump();
            } else {
                break;
            }
        }
        let digits: String = self.src[start..self.pos]
            .chars()
            .filter(|c| *c != '_')
            .collect();
        digits
            .parse::<i64>()
            .map(Token::Int)
            .map_err(|_| TypeExprError::parse(start, "integer literal out of range"))
    }

    fn string(&mut self) -> Result<String, TypeExprError> {
        let start = self.pos;
        let Some(quote) = self.bump() else {
            return Err(TypeExprError::parse(start, "expected string literal"));
        };
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(TypeExprError::parse(start, "unterminated string literal")),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(other) => out.push(other),
                    None => {
                        return Err(TypeExprError::parse(start, "unterminated string literal"));
                    }
                },
                Some(ch) if ch == quote => return Ok(out),
                Some(ch) => out.push(ch),
            }
        }
    }
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    cursor: usize,
    end: usize,
    depth: u32,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|(token, _)| token)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.cursor)
            .map(|(_, pos)| *pos)
            .unwrap_or(self.end)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).map(|(token, _)| token.clone());
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), TypeExprError> {
        if self.eat(expected) {
            return Ok(());
        }
        Err(self.unexpected(&format!("expected {}", expected.describe())))
    }

    fn unexpected(&self, context: &str) -> TypeExprError {
        let found = self
            .peek()
            .map(Token::describe)
            .unwrap_or_else(|| "end of input".to_string());
        TypeExprError::parse(self.position(), format!("{context}, found {found}"))
    }

    fn parse_expr(&mut self) -> Result<TypeExpr, TypeExprError> {
        self.depth += 1;
        if self.depth > MAX_TYPE_EXPR_DEPTH {
            return Err(TypeExprError::parse(
                self.position(),
                "expression nested too deeply",
            ));
        }
        let mut expr = self.parse_term()?;
        while self.eat(&Token::Pipe) {
            let right = self.parse_term()?;
            expr = TypeExpr::Or(Box::new(expr), Box::new(right));
        }
        self.depth -= 1;
        Ok(expr)
    }

    fn parse_term(&mut self) -> Result<TypeExpr, TypeExprError> {
        let position = self.position();
        let Some(token) = self.next() else {
            return Err(TypeExprError::parse(position, "unexpected end of input"));
        };
        match token {
            Token::Tilde => match self.next() {
                Some(Token::Ident(name)) => Ok(TypeExpr::TypeVar { name, bound: None }),
                _ => Err(TypeExprError::parse(position, "expected type variable name after `~`")),
            },
            Token::Ellipsis => Ok(TypeExpr::Ellipsis),
            Token::Int(value) => Ok(TypeExpr::Int(value)),
            Token::Minus => match self.next() {
                Some(Token::Int(value)) => Ok(TypeExpr::Int(-value)),
                _ => Err(TypeExprError::parse(position, "expected integer after `-`")),
            },
            Token::Str(text) => Ok(TypeExpr::Str(text)),
            Token::Bytes(text) => Ok(TypeExpr::Bytes(text)),
            Token::LBracket => {
                let items = self.parse_list(&Token::RBracket)?;
                Ok(TypeExpr::List(items))
            }
            Token::LParen => {
                if self.eat(&Token::RParen) {
                    return Ok(TypeExpr::EmptyTuple);
                }
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(first) => self.parse_named(first, position),
            other => Err(TypeExprError::parse(
                position,
                format!("expected a type expression, found {}", other.describe()),
            )),
        }
    }

    fn parse_named(&mut self, first: String, position: usize) -> Result<TypeExpr, TypeExprError> {
        match first.as_str() {
            "None" => return Ok(TypeExpr::None),
            "True" => return Ok(TypeExpr::Bool(true)),
            "False" => return Ok(TypeExpr::Bool(false)),
            _ => {}
        }

        let mut name = first;
        while self.eat(&Token::Dot) {
            match self.next() {
                Some(Token::Ident(part)) => {
                    name.push('.');
                    name.push_str(&part);
                }
                _ => return Err(TypeExprError::parse(position, "expected name after `.`")),
            }
        }

        if self.peek() == Some(&Token::LParen) {
            if name == "TypeVar" || name == "typing.TypeVar" {
                self.cursor += 1;
                return self.parse_type_var_call(position);
            }
            return Err(TypeExprError::parse(
                self.position(),
                format!("call expressions other than TypeVar(...) are not supported (`{name}(`)"),
            ));
        }

        let mut expr = TypeExpr::Name(name);
        while self.eat(&Token::LBracket) {
            let args = self.parse_list(&Token::RBracket)?;
            if args.is_empty() {
                return Err(TypeExprError::parse(position, "empty subscript"));
            }
            expr = TypeExpr::Subscript {
                base: Box::new(expr),
                args,
            };
        }
        Ok(expr)
    }

    /// Comma separated expressions up to `close`; trailing comma allowed.
    fn parse_list(&mut self, close: &Token) -> Result<Vec<TypeExpr>, TypeExprError> {
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.parse_expr()?);
            if self.eat(close) {
                return Ok(items);
            }
            if !self.eat(&Token::Comma) {
                return Err(self.unexpected(&format!("expected `,` or {}", close.describe())));
            }
        }
    }

    fn parse_type_var_call(&mut self, position: usize) -> Result<TypeExpr, TypeExprError> {
        let name = match self.next() {
            Some(Token::Str(name)) => name,
            _ => {
                return Err(TypeExprError::parse(
                    position,
                    "TypeVar(...) requires a string name as its first argument",
                ));
            }
        };

        let mut bound = None;
        let mut constraints = Vec::new();
        while self.eat(&Token::Comma) {
            if self.peek() == Some(&Token::RParen) {
                break;
            }
            let keyword = match (self.peek(), self.tokens.get(self.cursor + 1)) {
                (Some(Token::Ident(keyword)), Some((Token::Equals, _))) => Some(keyword.clone()),
                _ => None,
            };
            match keyword {
                Some(keyword) => {
                    self.cursor += 2;
                    let value = self.parse_expr()?;
                    match keyword.as_str() {
                        "bound" => bound = Some(value),
                        "covariant" | "contravariant" | "infer_variance" | "default" => {}
                        other => {
                            return Err(TypeExprError::parse(
                                position,
                                format!("unsupported TypeVar keyword `{other}`"),
                            ));
                        }
                    }
                }
                None => constraints.push(self.parse_expr()?),
            }
        }
        self.expect(&Token::RParen)?;

        // A constrained variable ranges over its constraints; their union
        // serves as the bound for subtype purposes.
        if !constraints.is_empty() {
            if bound.is_some() {
                return Err(TypeExprError::parse(
                    position,
                    "TypeVar cannot be both constrained and bounded",
                ));
            }
            bound = TypeExpr::union_of(constraints);
        }

        Ok(TypeExpr::TypeVar {
            name,
            bound: bound.map(Box::new),
        })
    }
}

/// Parse annotation source text into a [`TypeExpr`].
pub fn parse_type_expr(src: &str) -> Result<TypeExpr, TypeExprError> {
    if src.len() > MAX_TYPE_EXPR_LEN {
        return Err(TypeExprError::parse(
            MAX_TYPE_EXPR_LEN,
            format!("annotation longer than {MAX_TYPE_EXPR_LEN} bytes"),
        ));
    }
    let tokens = Lexer::new(src).tokenize()?;
    let mut parser = Parser {
        tokens,
        cursor: 0,
        end: src.len(),
        depth: 0,
    };
    let expr = parser.parse_expr()?;
    if parser.peek().is_some() {
        return Err(parser.unexpected("expected end of input"));
    }
    Ok(expr)
}

impl FromStr for TypeExpr {
    type Err = TypeExprError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        parse_type_expr(src)
    }
}

#[cfg(test)]
#[path = "../tests/parse_tests.rs"]
mod tests;
