//! FETCH response parsing.

use crate::Result;
use crate::parser::lexer::{Lexer, Token};
use crate::types::Uid;

use super::helpers::{parse_flag_list, parse_list_value};
use super::types::{Address, Envelope, FetchItem};

/// Parses the parenthesized item list of a FETCH response.
pub fn parse_fetch_response(lexer: &mut Lexer<'_>) -> Result<Vec<FetchItem>> {
    lexer.expect(Token::LParen)?;

    let mut items = Vec::new();
    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Space => {}
            Token::Atom(name) => {
                if let Some(item) = parse_fetch_item(lexer, name)? {
                    items.push(item);
                }
            }
            token => {
                return Err(lexer.error(&format!("Unexpected token in FETCH: {token:?}")));
            }
        }
    }

    Ok(items)
}

fn parse_fetch_item(lexer: &mut Lexer<'_>, name: &str) -> Result<Option<FetchItem>> {
    let upper = name.to_uppercase();
    let item = match upper.as_str() {
        "FLAGS" => {
            lexer.expect_space()?;
            FetchItem::Flags(parse_flag_list(lexer)?)
        }
        "UID" => {
            lexer.expect_space()?;
            let n = lexer.read_u32()?;
            FetchItem::Uid(Uid::new(n).ok_or_else(|| lexer.error("UID cannot be 0"))?)
        }
        "RFC822.SIZE" => {
            lexer.expect_space()?;
            FetchItem::Rfc822Size(lexer.read_u32()?)
        }
        "INTERNALDATE" => {
            lexer.expect_space()?;
            match lexer.read_nstring()? {
                Some(date) => FetchItem::InternalDate(date),
                None => return Ok(None),
            }
        }
        "ENVELOPE" => {
            lexer.expect_space()?;
            FetchItem::Envelope(Box::new(parse_envelope(lexer)?))
        }
        "BODYSTRUCTURE" => {
            lexer.expect_space()?;
            FetchItem::BodyStructure(parse_list_value(lexer)?)
        }
        "BODY" | "BODY.PEEK" | "RFC822" | "RFC822.HEADER" | "RFC822.TEXT" => {
            let (section, origin) = parse_section_and_origin(lexer);
            lexer.expect_space()?;
            // A plain BODY (no section) is the non-extensible body structure.
            if section.is_none() && upper == "BODY" && lexer.peek() == Some(b'(') {
                FetchItem::BodyStructure(parse_list_value(lexer)?)
            } else {
                let data = match lexer.next_token()? {
                    Token::Literal(d) => Some(d),
                    Token::QuotedString(s) => Some(s.into_bytes()),
                    _ => None,
                };
                FetchItem::Body {
                    section,
                    origin,
                    data,
                }
            }
        }
        "MODSEQ" => {
            lexer.expect_space()?;
            lexer.expect(Token::LParen)?;
            let n = lexer.read_number()?;
            lexer.expect(Token::RParen)?;
            FetchItem::ModSeq(n)
        }
        _ => {
            // Unknown item: swallow optional section and its value.
            let _ = parse_section_and_origin(lexer);
            lexer.expect_space()?;
            parse_list_value(lexer)?;
            return Ok(None);
        }
    };
    Ok(Some(item))
}

/// Parses an optional `[section]` and `<origin>` following BODY.
fn parse_section_and_origin(lexer: &mut Lexer<'_>) -> (Option<String>, Option<u32>) {
    let mut section = None;
    let mut origin = None;

    if lexer.peek() == Some(b'[') {
        lexer.advance();
        let mut buf = Vec::new();
        while let Some(b) = lexer.advance() {
            if b == b']' {
                break;
            }
            buf.push(b);
        }
        if !buf.is_empty() {
            section = Some(String::from_utf8_lossy(&buf).into_owned());
        }
    }

    if lexer.peek() == Some(b'<') {
        lexer.advance();
        let mut digits = String::new();
        while let Some(b) = lexer.peek() {
            lexer.advance();
            if b == b'>' {
                break;
            }
            digits.push(char::from(b));
        }
        origin = digits.parse().ok();
    }

    (section, origin)
}

/// Parses an envelope structure.
pub fn parse_envelope(lexer: &mut Lexer<'_>) -> Result<Envelope> {
    lexer.expect(Token::LParen)?;

    let date = lexer.read_nstring()?;
    lexer.expect_space()?;
    let subject = lexer.read_nstring()?;
    lexer.expect_space()?;
    let from = parse_address_list(lexer)?;
    lexer.expect_space()?;
    let sender = parse_address_list(lexer)?;
    lexer.expect_space()?;
    let reply_to = parse_address_list(lexer)?;
    lexer.expect_space()?;
    let to = parse_address_list(lexer)?;
    lexer.expect_space()?;
    let cc = parse_address_list(lexer)?;
    lexer.expect_space()?;
    let bcc = parse_address_list(lexer)?;
    lexer.expect_space()?;
    let in_reply_to = lexer.read_nstring()?;
    lexer.expect_space()?;
    let message_id = lexer.read_nstring()?;

    lexer.expect(Token::RParen)?;

    Ok(Envelope {
        date,
        subject,
        from,
        sender,
        reply_to,
        to,
        cc,
        bcc,
        in_reply_to,
        message_id,
    })
}

fn parse_address_list(lexer: &mut Lexer<'_>) -> Result<Vec<Address>> {
    match lexer.next_token()? {
        Token::Nil => Ok(Vec::new()),
        Token::LParen => {
            let mut addresses = Vec::new();
            loop {
                match lexer.peek() {
                    Some(b')') => {
                        lexer.advance();
                        break;
                    }
                    Some(b'(') => addresses.push(parse_address(lexer)?),
                    Some(b' ') => {
                        lexer.advance();
                    }
                    _ => return Err(lexer.error("Unterminated address list")),
                }
            }
            Ok(addresses)
        }
        token => Err(lexer.error(&format!("Expected address list, got {token:?}"))),
    }
}

fn parse_address(lexer: &mut Lexer<'_>) -> Result<Address> {
    lexer.expect(Token::LParen)?;
    let name = lexer.read_nstring()?;
    lexer.expect_space()?;
    let _adl = lexer.read_nstring()?;
    lexer.expect_space()?;
    let mailbox = lexer.read_nstring()?;
    lexer.expect_space()?;
    let host = lexer.read_nstring()?;
    lexer.expect(Token::RParen)?;

    Ok(Address {
        name,
        mailbox,
        host,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parser::response::types::ListValue;

    fn parse(input: &[u8]) -> Vec<FetchItem> {
        let mut lexer = Lexer::new(input);
        parse_fetch_response(&mut lexer).unwrap()
    }

    #[test]
    fn flags_uid_and_modseq() {
        let items = parse(b"(UID 44 FLAGS (\\Seen $Forwarded) MODSEQ (90000000001))");
        assert_eq!(items[0], FetchItem::Uid(Uid::new(44).unwrap()));
        assert!(matches!(&items[1], FetchItem::Flags(f) if f.is_seen()));
        assert_eq!(items[2], FetchItem::ModSeq(90_000_000_001));
    }

    #[test]
    fn body_section_with_literal_and_origin() {
        let items = parse(b"(UID 7 BODY[]<0> {11}\r\nhello world)");
        assert_eq!(
            items[1],
            FetchItem::Body {
                section: None,
                origin: Some(0),
                data: Some(b"hello world".to_vec()),
            }
        );
    }

    #[test]
    fn header_fields_section() {
        let items = parse(b"(BODY[HEADER.FIELDS (MESSAGE-ID)] {5}\r\nabcde)");
        let FetchItem::Body { section, data, .. } = &items[0] else {
            panic!("expected body");
        };
        assert_eq!(section.as_deref(), Some("HEADER.FIELDS (MESSAGE-ID)"));
        assert_eq!(data.as_deref(), Some(&b"abcde"[..]));
    }

    #[test]
    fn bodystructure_is_kept_raw() {
        let items = parse(
            b"(BODYSTRUCTURE ((\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 10 1)(\"TEXT\" \"HTML\" NIL NIL NIL \"7BIT\" 20 1) \"ALTERNATIVE\"))",
        );
        let FetchItem::BodyStructure(ListValue::List(parts)) = &items[0] else {
            panic!("expected list");
        };
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].as_str(), Some("ALTERNATIVE"));
    }

    #[test]
    fn envelope_from_address() {
        let items = parse(
            b"(ENVELOPE (\"Mon, 1 Jan 2024 10:00:00 +0000\" \"Hi\" ((\"Ann\" NIL \"ann\" \"example.org\")) NIL NIL NIL NIL NIL NIL \"<id@x>\"))",
        );
        let FetchItem::Envelope(env) = &items[0] else {
            panic!("expected envelope");
        };
        assert_eq!(env.from[0].email().as_deref(), Some("ann@example.org"));
        assert_eq!(env.message_id.as_deref(), Some("<id@x>"));
    }

    #[test]
    fn unknown_items_are_skipped() {
        let items = parse(b"(X-GM-LABELS (\\Inbox foo) UID 3)");
        assert_eq!(items, vec![FetchItem::Uid(Uid::new(3).unwrap())]);
    }
}
