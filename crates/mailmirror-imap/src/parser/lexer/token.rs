//! Lexer tokens.

/// Token types produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Atom (unquoted string without special characters).
    Atom(&'a str),
    /// Quoted string.
    QuotedString(String),
    /// Literal string with size prefix `{n}`.
    Literal(Vec<u8>),
    /// Number. Wide enough for mod-sequences.
    Number(u64),
    /// Opening parenthesis.
    LParen,
    /// Closing parenthesis.
    RParen,
    /// Opening bracket.
    LBracket,
    /// Closing bracket.
    RBracket,
    /// Space character.
    Space,
    /// Asterisk.
    Asterisk,
    /// Plus (continuation response prefix).
    Plus,
    /// NIL.
    Nil,
    /// CRLF line ending.
    Crlf,
    /// End of input.
    Eof,
}
