//! Server response parser.

#![allow(clippy::missing_errors_doc)]

mod fetch;
mod helpers;
mod types;

pub use types::{Address, Envelope, FetchItem, ListValue, StatusItem, UntaggedResponse};

use crate::parser::lexer::{Lexer, Token};
use crate::types::{ResponseCode, SeqNum, Status, Tag};
use crate::{Error, Result};

use helpers::{
    parse_capability_data, parse_flag_list, parse_response_code, parse_search_response,
    parse_status_response, read_text_until_crlf, read_uid_set,
};

/// A parsed server response.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Tagged response (command completion).
    Tagged {
        /// The command tag.
        tag: Tag,
        /// Response status.
        status: Status,
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// Untagged response (server data).
    Untagged(UntaggedResponse),
    /// Continuation request.
    Continuation {
        /// Optional text.
        text: Option<String>,
    },
}

/// Response parser.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses a complete response (line plus inline literals).
    pub fn parse(input: &[u8]) -> Result<Response> {
        let mut lexer = Lexer::new(input);

        match lexer.next_token()? {
            Token::Asterisk => Self::parse_untagged(&mut lexer),
            Token::Plus => Ok(Self::parse_continuation(&mut lexer)),
            Token::Atom(tag) => Self::parse_tagged(&mut lexer, tag),
            token => Err(Error::Parse {
                position: 0,
                message: format!("Expected *, +, or tag, got {token:?}"),
            }),
        }
    }

    fn parse_tagged(lexer: &mut Lexer<'_>, tag: &str) -> Result<Response> {
        lexer.expect_space()?;
        let status = Self::parse_status(lexer)?;
        let (code, text) = Self::parse_resp_text(lexer)?;

        Ok(Response::Tagged {
            tag: Tag::new(tag),
            status,
            code,
            text,
        })
    }

    fn parse_untagged(lexer: &mut Lexer<'_>) -> Result<Response> {
        lexer.expect_space()?;

        let untagged = match lexer.next_token()? {
            Token::Atom(s) => Self::parse_keyword_data(lexer, s)?,
            Token::Number(n) => Self::parse_message_data(lexer, n)?,
            token => {
                return Err(lexer.error(&format!("Unexpected token in untagged response: {token:?}")));
            }
        };
        Ok(Response::Untagged(untagged))
    }

    fn parse_keyword_data(lexer: &mut Lexer<'_>, keyword: &str) -> Result<UntaggedResponse> {
        let response = match keyword.to_uppercase().as_str() {
            "OK" => {
                let (code, text) = Self::parse_resp_text(lexer)?;
                UntaggedResponse::Ok { code, text }
            }
            "NO" => {
                let (code, text) = Self::parse_resp_text(lexer)?;
                UntaggedResponse::No { code, text }
            }
            "BAD" => {
                let (code, text) = Self::parse_resp_text(lexer)?;
                UntaggedResponse::Bad { code, text }
            }
            "BYE" => {
                let (code, text) = Self::parse_resp_text(lexer)?;
                UntaggedResponse::Bye { code, text }
            }
            "CAPABILITY" => UntaggedResponse::Capability(parse_capability_data(lexer)?),
            "ENABLED" => UntaggedResponse::Enabled(parse_capability_data(lexer)?),
            "FLAGS" => {
                lexer.expect_space()?;
                UntaggedResponse::Flags(parse_flag_list(lexer)?)
            }
            "SEARCH" => UntaggedResponse::Search(parse_search_response(lexer)?),
            "STATUS" => {
                lexer.expect_space()?;
                let (mailbox, items) = parse_status_response(lexer)?;
                UntaggedResponse::Status { mailbox, items }
            }
            "VANISHED" => {
                lexer.expect_space()?;
                let mut earlier = false;
                if lexer.peek() == Some(b'(') {
                    lexer.advance();
                    earlier = lexer.read_atom_string()?.eq_ignore_ascii_case("EARLIER");
                    lexer.expect(Token::RParen)?;
                    lexer.expect_space()?;
                }
                let uids = read_uid_set(lexer)?;
                UntaggedResponse::Vanished { earlier, uids }
            }
            _ => {
                let rest = read_text_until_crlf(lexer);
                UntaggedResponse::Other(format!("{keyword}{rest}"))
            }
        };
        Ok(response)
    }

    fn parse_message_data(lexer: &mut Lexer<'_>, n: u64) -> Result<UntaggedResponse> {
        lexer.expect_space()?;
        let keyword = lexer.read_atom_string()?;
        let count = u32::try_from(n).map_err(|_| lexer.error("Message number out of range"))?;

        let response = match keyword.to_uppercase().as_str() {
            "EXISTS" => UntaggedResponse::Exists(count),
            "RECENT" => UntaggedResponse::Recent(count),
            "EXPUNGE" => UntaggedResponse::Expunge(Self::seq(lexer, count)?),
            "FETCH" => {
                let seq = Self::seq(lexer, count)?;
                lexer.expect_space()?;
                let items = fetch::parse_fetch_response(lexer)?;
                UntaggedResponse::Fetch { seq, items }
            }
            _ => {
                let rest = read_text_until_crlf(lexer);
                UntaggedResponse::Other(format!("{n} {keyword}{rest}"))
            }
        };
        Ok(response)
    }

    fn seq(lexer: &Lexer<'_>, n: u32) -> Result<SeqNum> {
        SeqNum::new(n).ok_or_else(|| lexer.error("Invalid sequence number 0"))
    }

    fn parse_continuation(lexer: &mut Lexer<'_>) -> Response {
        if lexer.peek() == Some(b' ') {
            lexer.advance();
        }
        let text = read_text_until_crlf(lexer);
        Response::Continuation {
            text: if text.is_empty() { None } else { Some(text) },
        }
    }

    fn parse_status(lexer: &mut Lexer<'_>) -> Result<Status> {
        let s = lexer.read_atom_string()?;
        match s.to_uppercase().as_str() {
            "OK" => Ok(Status::Ok),
            "NO" => Ok(Status::No),
            "BAD" => Ok(Status::Bad),
            "PREAUTH" => Ok(Status::PreAuth),
            "BYE" => Ok(Status::Bye),
            _ => Err(lexer.error(&format!("Invalid status: {s}"))),
        }
    }

    /// Parses `[code] text` following a status keyword. Both parts are optional.
    fn parse_resp_text(lexer: &mut Lexer<'_>) -> Result<(Option<ResponseCode>, String)> {
        if lexer.peek() == Some(b' ') {
            lexer.advance();
        }
        let code = if lexer.peek() == Some(b'[') {
            Some(parse_response_code(lexer)?)
        } else {
            None
        };
        if lexer.peek() == Some(b' ') {
            lexer.advance();
        }
        Ok((code, read_text_until_crlf(lexer)))
    }
}
