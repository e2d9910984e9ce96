//! Sans-I/O parser for server responses.
//!
//! - **Lexer**: splits raw bytes into atoms, strings, literals and numbers.
//! - **Response parser**: builds [`Response`] values from tokens.
//!
//! # Example
//!
//! ```
//! use mailmirror_imap::parser::{Response, ResponseParser, UntaggedResponse};
//!
//! let response = ResponseParser::parse(b"* 42 EXISTS\r\n").unwrap();
//! assert_eq!(response, Response::Untagged(UntaggedResponse::Exists(42)));
//! ```

pub mod lexer;
pub mod response;

pub use lexer::{Lexer, Token};
pub use response::{
    Address, Envelope, FetchItem, ListValue, Response, ResponseParser, StatusItem,
    UntaggedResponse,
};
