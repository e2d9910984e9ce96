//! Tokenizer for server response lines.

#![allow(clippy::missing_errors_doc)]

mod token;

pub use token::Token;

use crate::{Error, Result};

/// Lexer over one complete response (line plus any inline literals).
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Returns the current position in the input.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the remaining input.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    /// Returns true if at end of input.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Peeks at the current byte without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Peeks at the byte at offset from current position.
    #[must_use]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    /// Advances by one byte and returns it.
    pub fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Skips n bytes.
    pub fn skip(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Reads the next token.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        let Some(byte) = self.peek() else {
            return Ok(Token::Eof);
        };

        match byte {
            b'\r' => {
                if self.peek_at(1) == Some(b'\n') {
                    self.skip(2);
                    Ok(Token::Crlf)
                } else {
                    Err(self.error("Expected LF after CR"))
                }
            }
            b' ' => self.single(Token::Space),
            b'(' => self.single(Token::LParen),
            b')' => self.single(Token::RParen),
            b'[' => self.single(Token::LBracket),
            b']' => self.single(Token::RBracket),
            b'*' => self.single(Token::Asterisk),
            b'+' => self.single(Token::Plus),
            b'"' => self.read_quoted_string(),
            b'{' => self.read_literal(),
            b'0'..=b'9' => self.read_number_or_atom(),
            _ if is_atom_char(byte) => self.read_atom(),
            _ => Err(self.error(&format!("Unexpected character: {byte:#04x}"))),
        }
    }

    fn single(&mut self, token: Token<'a>) -> Result<Token<'a>> {
        self.advance();
        Ok(token)
    }

    fn read_quoted_string(&mut self) -> Result<Token<'a>> {
        self.advance();
        let mut result = Vec::new();

        loop {
            match self.advance() {
                Some(b'"') => break,
                Some(b'\\') => match self.advance() {
                    Some(c @ (b'"' | b'\\')) => result.push(c),
                    Some(c) => return Err(self.error(&format!("Invalid escape: \\{c}"))),
                    None => return Err(self.error("Unexpected EOF in quoted string")),
                },
                Some(c) => result.push(c),
                None => return Err(self.error("Unexpected EOF in quoted string")),
            }
        }

        String::from_utf8(result)
            .map(Token::QuotedString)
            .map_err(|_| self.error("Invalid UTF-8 in quoted string"))
    }

    /// Reads `{n}` CRLF followed by n bytes of literal data.
    fn read_literal(&mut self) -> Result<Token<'a>> {
        self.advance();
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit() || b == b'+') {
            self.advance();
        }
        let size = std::str::from_utf8(&self.input[start..self.pos])
            .ok()
            .map(|s| s.trim_end_matches('+'))
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| self.error("Invalid literal size"))?;

        if self.advance() != Some(b'}') {
            return Err(self.error("Expected } after literal size"));
        }
        if self.peek() == Some(b'\r') && self.peek_at(1) == Some(b'\n') {
            self.skip(2);
        } else {
            return Err(self.error("Expected CRLF after literal size"));
        }
        if self.pos + size > self.input.len() {
            return Err(self.error("Incomplete literal data"));
        }

        let data = self.input[self.pos..self.pos + size].to_vec();
        self.skip(size);
        Ok(Token::Literal(data))
    }

    /// Digits-only runs are numbers; `1:3,5` style sets stay atoms.
    fn read_number_or_atom(&mut self) -> Result<Token<'a>> {
        let start = self.pos;
        while self.peek().is_some_and(is_atom_char) {
            self.advance();
        }
        let s = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error("Invalid UTF-8 in atom"))?;

        if s.bytes().all(|b| b.is_ascii_digit()) {
            s.parse()
                .map(Token::Number)
                .map_err(|_| self.error("Number too large"))
        } else {
            Ok(Token::Atom(s))
        }
    }

    fn read_atom(&mut self) -> Result<Token<'a>> {
        let start = self.pos;
        while self.peek().is_some_and(is_atom_char) {
            self.advance();
        }
        let s = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error("Invalid UTF-8 in atom"))?;

        if s.eq_ignore_ascii_case("NIL") {
            Ok(Token::Nil)
        } else {
            Ok(Token::Atom(s))
        }
    }

    /// Creates a parse error at the current position.
    #[must_use]
    pub fn error(&self, message: &str) -> Error {
        Error::Parse {
            position: self.pos,
            message: message.to_string(),
        }
    }

    /// Expects and consumes a token of the same kind.
    #[allow(clippy::needless_pass_by_value)]
    pub fn expect(&mut self, expected: Token<'_>) -> Result<()> {
        let token = self.next_token()?;
        if std::mem::discriminant(&token) == std::mem::discriminant(&expected) {
            Ok(())
        } else {
            Err(self.error(&format!("Expected {expected:?}, got {token:?}")))
        }
    }

    /// Expects and consumes a space.
    pub fn expect_space(&mut self) -> Result<()> {
        self.expect(Token::Space)
    }

    /// Reads an astring (atom or string).
    pub fn read_astring(&mut self) -> Result<String> {
        match self.next_token()? {
            Token::Atom(s) => Ok(s.to_string()),
            Token::Number(n) => Ok(n.to_string()),
            Token::QuotedString(s) => Ok(s),
            Token::Literal(data) => {
                String::from_utf8(data).map_err(|_| self.error("Invalid UTF-8 in literal"))
            }
            token => Err(self.error(&format!("Expected astring, got {token:?}"))),
        }
    }

    /// Reads an nstring (NIL or string).
    pub fn read_nstring(&mut self) -> Result<Option<String>> {
        match self.next_token()? {
            Token::Nil => Ok(None),
            Token::QuotedString(s) => Ok(Some(s)),
            Token::Literal(data) => String::from_utf8(data)
                .map(Some)
                .map_err(|_| self.error("Invalid UTF-8 in literal")),
            token => Err(self.error(&format!("Expected nstring, got {token:?}"))),
        }
    }

    /// Reads a number.
    pub fn read_number(&mut self) -> Result<u64> {
        match self.next_token()? {
            Token::Number(n) => Ok(n),
            token => Err(self.error(&format!("Expected number, got {token:?}"))),
        }
    }

    /// Reads a number that must fit in 32 bits.
    pub fn read_u32(&mut self) -> Result<u32> {
        let n = self.read_number()?;
        u32::try_from(n).map_err(|_| self.error(&format!("Number out of range: {n}")))
    }

    /// Reads an atom.
    pub fn read_atom_string(&mut self) -> Result<&'a str> {
        match self.next_token()? {
            Token::Atom(s) => Ok(s),
            token => Err(self.error(&format!("Expected atom, got {token:?}"))),
        }
    }
}

/// Returns true if the byte may appear in an atom.
///
/// `\` is accepted so that flags like `\Seen` lex as one token.
#[must_use]
pub const fn is_atom_char(b: u8) -> bool {
    matches!(b,
        0x21 | 0x23..=0x24 | 0x26..=0x27 |
        0x2B..=0x5A |
        0x5C |
        0x5E..=0x7A |
        0x7C |
        0x7E
    )
}
