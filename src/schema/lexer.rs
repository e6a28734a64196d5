//! Schema lexer
//!
//! Turns schema text into tokens carrying their 1-based line and column.
//! Whitespace, `// line` comments and `/* block */` comments are skipped.
//! Keywords are not distinguished here: `table`, `union` and friends come
//! out as identifiers and the parser decides by position.

use super::errors::{SchemaError, SchemaResult};
use super::types::Location;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Number(u64),
    Str(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LAngle,
    RAngle,
    Comma,
    Colon,
    Semicolon,
    Eof,
}

impl TokenKind {
    /// Human-readable token description for error messages
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier '{}'", name),
            TokenKind::Number(n) => format!("number {}", n),
            TokenKind::Str(s) => format!("string \"{}\"", s),
            TokenKind::LParen => "'('".into(),
            TokenKind::RParen => "')'".into(),
            TokenKind::LBracket => "'['".into(),
            TokenKind::RBracket => "']'".into(),
            TokenKind::LBrace => "'{'".into(),
            TokenKind::RBrace => "'}'".into(),
            TokenKind::LAngle => "'<'".into(),
            TokenKind::RAngle => "'>'".into(),
            TokenKind::Comma => "','".into(),
            TokenKind::Colon => "':'".into(),
            TokenKind::Semicolon => "';'".into(),
            TokenKind::Eof => "end of input".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: Location,
}

pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenizes the whole input; the last token is always `Eof`
    pub fn tokenize(mut self) -> SchemaResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        if c == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) -> SchemaResult<()> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_ascii_whitespace() => {
                    self.bump();
                }
                (Some(b'/'), Some(b'/')) => {
                    while let Some(c) = self.peek() {
                        if c == b'\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                (Some(b'/'), Some(b'*')) => {
                    let start = self.location();
                    self.bump();
                    self.bump();
                    loop {
                        match (self.peek(), self.peek_at(1)) {
                            (Some(b'*'), Some(b'/')) => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            (Some(_), _) => {
                                self.bump();
                            }
                            (None, _) => {
                                return Err(SchemaError::parse(start, "unterminated block comment"));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> SchemaResult<Token> {
        self.skip_trivia()?;
        let location = self.location();
        let c = match self.peek() {
            Some(c) => c,
            None => {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    location,
                })
            }
        };

        let kind = match c {
            b'(' => self.punct(TokenKind::LParen),
            b')' => self.punct(TokenKind::RParen),
            b'[' => self.punct(TokenKind::LBracket),
            b']' => self.punct(TokenKind::RBracket),
            b'{' => self.punct(TokenKind::LBrace),
            b'}' => self.punct(TokenKind::RBrace),
            b'<' => self.punct(TokenKind::LAngle),
            b'>' => self.punct(TokenKind::RAngle),
            b',' => self.punct(TokenKind::Comma),
            b':' => self.punct(TokenKind::Colon),
            b';' => self.punct(TokenKind::Semicolon),
            b'"' => self.string(location)?,
            b'0'..=b'9' => self.number(location)?,
            c if c == b'_' || c.is_ascii_alphabetic() => self.ident(),
            other => {
                return Err(SchemaError::parse(
                    location,
                    format!("unexpected character '{}'", char::from(other).escape_default()),
                ))
            }
        };
        Ok(Token { kind, location })
    }

    fn punct(&mut self, kind: TokenKind) -> TokenKind {
        self.bump();
        kind
    }

    fn ident(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == b'_' || c.is_ascii_alphanumeric() {
                self.bump();
            } else {
                break;
            }
        }
        // Identifier bytes are ASCII, so this slice is valid UTF-8
        TokenKind::Ident(String::from_utf8_lossy(&self.input[start..self.pos]).into_owned())
    }

    fn number(&mut self, location: Location) -> SchemaResult<TokenKind> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.bump();
        }
        let text = String::from_utf8_lossy(&self.input[start..self.pos]);
        text.parse::<u64>()
            .map(TokenKind::Number)
            .map_err(|_| SchemaError::parse(location, format!("number {} is too large", text)))
    }

    fn string(&mut self, location: Location) -> SchemaResult<TokenKind> {
        self.bump();
        let mut bytes = Vec::new();
        loop {
            match self.bump() {
                Some(b'"') => break,
                Some(b'\\') => match self.bump() {
                    Some(b'n') => bytes.push(b'\n'),
                    Some(b't') => bytes.push(b'\t'),
                    Some(b'r') => bytes.push(b'\r'),
                    Some(c @ (b'"' | b'\\')) => bytes.push(c),
                    _ => return Err(SchemaError::parse(location, "invalid escape in string")),
                },
                Some(b'\n') | None => {
                    return Err(SchemaError::parse(location, "unterminated string"));
                }
                Some(c) => bytes.push(c),
            }
        }
        String::from_utf8(bytes)
            .map(TokenKind::Str)
            .map_err(|_| SchemaError::parse(location, "string is not valid UTF-8"))
    }
}
