//! Parser helper functions.

use crate::parser::lexer::{Lexer, Token};
use crate::types::{
    Capability, Flag, Flags, Mailbox, ResponseCode, Uid, UidValidity, expand_uid_set,
};
use crate::{Error, Result};

use super::types::{ListValue, StatusItem};

/// Parses a bracketed response code.
pub fn parse_response_code(lexer: &mut Lexer<'_>) -> Result<ResponseCode> {
    lexer.expect(Token::LBracket)?;

    let atom = lexer.read_atom_string()?;
    let code = match atom.to_uppercase().as_str() {
        "ALERT" => ResponseCode::Alert,
        "READ-ONLY" => ResponseCode::ReadOnly,
        "READ-WRITE" => ResponseCode::ReadWrite,
        "TRYCREATE" => ResponseCode::TryCreate,
        "NOMODSEQ" => ResponseCode::NoModSeq,
        "CLOSED" => ResponseCode::Closed,
        "UIDNEXT" => {
            lexer.expect_space()?;
            ResponseCode::UidNext(read_uid(lexer)?)
        }
        "UIDVALIDITY" => {
            lexer.expect_space()?;
            ResponseCode::UidValidity(read_uid_validity(lexer)?)
        }
        "HIGHESTMODSEQ" => {
            lexer.expect_space()?;
            ResponseCode::HighestModSeq(lexer.read_number()?)
        }
        "APPENDUID" => {
            lexer.expect_space()?;
            let uidvalidity = read_uid_validity(lexer)?;
            lexer.expect_space()?;
            ResponseCode::AppendUid {
                uidvalidity,
                uid: read_uid(lexer)?,
            }
        }
        "COPYUID" => {
            lexer.expect_space()?;
            let uidvalidity = read_uid_validity(lexer)?;
            lexer.expect_space()?;
            let source_uids = read_uid_set(lexer)?;
            lexer.expect_space()?;
            let dest_uids = read_uid_set(lexer)?;
            ResponseCode::CopyUid {
                uidvalidity,
                source_uids,
                dest_uids,
            }
        }
        "CAPABILITY" => ResponseCode::Capability(parse_capability_data(lexer)?),
        "PERMANENTFLAGS" => {
            lexer.expect_space()?;
            ResponseCode::PermanentFlags(parse_flag_list(lexer)?.into_iter().collect())
        }
        _ => ResponseCode::Unknown(atom.to_string()),
    };

    while lexer.peek() != Some(b']') && !lexer.is_eof() {
        lexer.advance();
    }
    lexer.expect(Token::RBracket)?;

    Ok(code)
}

fn read_uid(lexer: &mut Lexer<'_>) -> Result<Uid> {
    let n = lexer.read_u32()?;
    Uid::new(n).ok_or_else(|| lexer.error("Invalid UID 0"))
}

fn read_uid_validity(lexer: &mut Lexer<'_>) -> Result<UidValidity> {
    let n = lexer.read_u32()?;
    UidValidity::new(n).ok_or_else(|| lexer.error("Invalid UIDVALIDITY 0"))
}

/// Reads a UID set that may lex as a single number or as an atom.
pub fn read_uid_set(lexer: &mut Lexer<'_>) -> Result<Vec<Uid>> {
    let text = match lexer.next_token()? {
        Token::Number(n) => n.to_string(),
        Token::Atom(s) => s.to_string(),
        token => return Err(lexer.error(&format!("Expected UID set, got {token:?}"))),
    };
    expand_uid_set(&text).ok_or_else(|| lexer.error(&format!("Invalid UID set: {text}")))
}

/// Parses space-separated capability atoms.
pub fn parse_capability_data(lexer: &mut Lexer<'_>) -> Result<Vec<Capability>> {
    let mut caps = Vec::new();

    while lexer.peek() == Some(b' ') {
        lexer.advance();
        if let Token::Atom(s) = lexer.next_token()? {
            caps.push(Capability::parse(s));
        }
    }

    Ok(caps)
}

/// Parses a parenthesized flag list.
pub fn parse_flag_list(lexer: &mut Lexer<'_>) -> Result<Flags> {
    lexer.expect(Token::LParen)?;

    let mut flags = Flags::new();
    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Space => {}
            // `\*` lexes as `\` followed by an asterisk
            Token::Atom("\\") if lexer.peek() == Some(b'*') => {
                lexer.advance();
                flags.insert(Flag::MayCreate);
            }
            Token::Atom(s) => flags.insert(Flag::parse(s)),
            token => {
                return Err(lexer.error(&format!("Unexpected token in flag list: {token:?}")));
            }
        }
    }

    Ok(flags)
}

/// Parses SEARCH results, ignoring a trailing `(MODSEQ n)`.
pub fn parse_search_response(lexer: &mut Lexer<'_>) -> Result<Vec<u32>> {
    let mut nums = Vec::new();

    while lexer.peek() == Some(b' ') {
        lexer.advance();
        match lexer.next_token()? {
            Token::Number(n) => {
                if let Ok(n) = u32::try_from(n) {
                    nums.push(n);
                }
            }
            Token::LParen => {
                skip_list_tail(lexer)?;
            }
            _ => {}
        }
    }

    Ok(nums)
}

/// Parses a STATUS response body.
pub fn parse_status_response(lexer: &mut Lexer<'_>) -> Result<(Mailbox, Vec<StatusItem>)> {
    let mailbox_name = lexer.read_astring()?;
    lexer.expect_space()?;
    lexer.expect(Token::LParen)?;

    let mut items = Vec::new();
    loop {
        match lexer.next_token()? {
            Token::RParen | Token::Eof => break,
            Token::Atom(name) => {
                lexer.expect_space()?;
                let value = lexer.read_number()?;
                let small = u32::try_from(value).unwrap_or(u32::MAX);
                let item = match name.to_uppercase().as_str() {
                    "MESSAGES" => Some(StatusItem::Messages(small)),
                    "RECENT" => Some(StatusItem::Recent(small)),
                    "UIDNEXT" => Uid::new(small).map(StatusItem::UidNext),
                    "UIDVALIDITY" => UidValidity::new(small).map(StatusItem::UidValidity),
                    "UNSEEN" => Some(StatusItem::Unseen(small)),
                    "HIGHESTMODSEQ" => Some(StatusItem::HighestModSeq(value)),
                    _ => None,
                };
                items.extend(item);
            }
            _ => {}
        }
    }

    Ok((Mailbox::new(mailbox_name), items))
}

/// Parses one generic value: NIL, number, string or nested list.
pub fn parse_list_value(lexer: &mut Lexer<'_>) -> Result<ListValue> {
    match lexer.next_token()? {
        Token::Nil => Ok(ListValue::Nil),
        Token::Number(n) => Ok(ListValue::Number(n)),
        Token::Atom(s) => Ok(ListValue::String(s.to_string())),
        Token::QuotedString(s) => Ok(ListValue::String(s)),
        Token::Literal(data) => Ok(ListValue::String(
            String::from_utf8_lossy(&data).into_owned(),
        )),
        Token::LParen => {
            let mut items = Vec::new();
            loop {
                match lexer.peek() {
                    Some(b')') => {
                        lexer.advance();
                        break;
                    }
                    Some(b' ') => {
                        lexer.advance();
                    }
                    Some(_) => items.push(parse_list_value(lexer)?),
                    None => return Err(lexer.error("Unterminated list")),
                }
            }
            Ok(ListValue::List(items))
        }
        token => Err(lexer.error(&format!("Unexpected token in list: {token:?}"))),
    }
}

/// Consumes tokens up to and including the `)` closing an open list.
fn skip_list_tail(lexer: &mut Lexer<'_>) -> Result<()> {
    let mut depth = 1usize;
    while depth > 0 {
        match lexer.next_token()? {
            Token::LParen => depth += 1,
            Token::RParen => depth -= 1,
            Token::Eof => {
                return Err(Error::Parse {
                    position: lexer.position(),
                    message: "Unterminated list".to_string(),
                });
            }
            _ => {}
        }
    }
    Ok(())
}

/// Reads text until CRLF.
pub fn read_text_until_crlf(lexer: &mut Lexer<'_>) -> String {
    let remaining = lexer.remaining();
    let end = remaining
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(remaining.len());

    lexer.skip(end);
    if lexer.peek() == Some(b'\r') {
        lexer.skip(2);
    }

    String::from_utf8_lossy(&remaining[..end]).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn permanent_flags_with_wildcard() {
        let mut lexer = Lexer::new(b"[PERMANENTFLAGS (\\Seen \\Deleted \\*)]");
        let code = parse_response_code(&mut lexer).unwrap();
        let ResponseCode::PermanentFlags(flags) = code else {
            panic!("expected PERMANENTFLAGS");
        };
        assert!(flags.contains(&Flag::MayCreate));
        assert!(flags.contains(&Flag::Deleted));
    }

    #[test]
    fn append_uid_code() {
        let mut lexer = Lexer::new(b"[APPENDUID 38505 3955]");
        assert_eq!(
            parse_response_code(&mut lexer).unwrap(),
            ResponseCode::AppendUid {
                uidvalidity: UidValidity::new(38505).unwrap(),
                uid: Uid::new(3955).unwrap(),
            }
        );
    }

    #[test]
    fn copy_uid_code() {
        let mut lexer = Lexer::new(b"[COPYUID 38505 304,319:320 3956:3958]");
        let code = parse_response_code(&mut lexer).unwrap();
        let map = code.copy_mapping().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map[&Uid::new(319).unwrap()], Uid::new(3957).unwrap());
    }

    #[test]
    fn highest_mod_seq_is_64_bit() {
        let mut lexer = Lexer::new(b"[HIGHESTMODSEQ 90000000001]");
        assert_eq!(
            parse_response_code(&mut lexer).unwrap(),
            ResponseCode::HighestModSeq(90_000_000_001)
        );
    }

    #[test]
    fn unknown_code_is_skipped() {
        let mut lexer = Lexer::new(b"[X-GM-THING 1 2 3] rest");
        assert_eq!(
            parse_response_code(&mut lexer).unwrap(),
            ResponseCode::Unknown("X-GM-THING".into())
        );
    }

    #[test]
    fn search_with_modseq_suffix() {
        let mut lexer = Lexer::new(b" 2 5 9 (MODSEQ 917162500)");
        assert_eq!(parse_search_response(&mut lexer).unwrap(), vec![2, 5, 9]);
    }

    #[test]
    fn nested_list_value() {
        let mut lexer = Lexer::new(b"(\"TEXT\" \"PLAIN\" (\"CHARSET\" \"utf-8\") NIL 42)");
        let value = parse_list_value(&mut lexer).unwrap();
        let items = value.as_list().unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[2].as_list().unwrap()[1].as_str(), Some("utf-8"));
        assert!(items[3].is_nil());
        assert_eq!(items[4].as_number(), Some(42));
    }
}
