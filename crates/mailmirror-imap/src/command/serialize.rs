//! Command serialization helpers.

use crate::types::{Flag, Mailbox};

use super::types::{FetchAttribute, SearchCriteria, StoreAction};

/// Writes an astring (atom or quoted string).
pub fn write_astring(buf: &mut Vec<u8>, s: &str) {
    if s.is_empty() || s.bytes().any(needs_quoting) {
        buf.push(b'"');
        for b in s.bytes() {
            if b == b'"' || b == b'\\' {
                buf.push(b'\\');
            }
            buf.push(b);
        }
        buf.push(b'"');
    } else {
        buf.extend_from_slice(s.as_bytes());
    }
}

/// Writes a mailbox name.
pub fn write_mailbox(buf: &mut Vec<u8>, mailbox: &Mailbox) {
    write_astring(buf, mailbox.as_str());
}

const fn needs_quoting(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'"' | b'\\' | b'(' | b')' | b'{' | b'%' | b'*' | b']'
    ) || b < 0x20
        || b == 0x7F
}

/// Writes a parenthesized, space-separated flag list.
pub fn write_flag_list(buf: &mut Vec<u8>, flags: &[Flag]) {
    buf.push(b'(');
    for (i, flag) in flags.iter().enumerate() {
        if i > 0 {
            buf.push(b' ');
        }
        buf.extend_from_slice(flag.as_str().as_bytes());
    }
    buf.push(b')');
}

/// Writes FETCH attributes, parenthesized when more than one.
pub fn write_fetch_attributes(buf: &mut Vec<u8>, attrs: &[FetchAttribute]) {
    if let [single] = attrs {
        write_fetch_attribute(buf, single);
        return;
    }
    buf.push(b'(');
    for (i, attr) in attrs.iter().enumerate() {
        if i > 0 {
            buf.push(b' ');
        }
        write_fetch_attribute(buf, attr);
    }
    buf.push(b')');
}

fn write_fetch_attribute(buf: &mut Vec<u8>, attr: &FetchAttribute) {
    match attr {
        FetchAttribute::Flags => buf.extend_from_slice(b"FLAGS"),
        FetchAttribute::InternalDate => buf.extend_from_slice(b"INTERNALDATE"),
        FetchAttribute::Rfc822Size => buf.extend_from_slice(b"RFC822.SIZE"),
        FetchAttribute::Envelope => buf.extend_from_slice(b"ENVELOPE"),
        FetchAttribute::BodyStructure => buf.extend_from_slice(b"BODYSTRUCTURE"),
        FetchAttribute::Uid => buf.extend_from_slice(b"UID"),
        FetchAttribute::ModSeq => buf.extend_from_slice(b"MODSEQ"),
        FetchAttribute::Body {
            section,
            peek,
            partial,
        } => {
            let open: &[u8] = if *peek { b"BODY.PEEK[" } else { b"BODY[" };
            buf.extend_from_slice(open);
            if let Some(s) = section {
                buf.extend_from_slice(s.as_bytes());
            }
            buf.push(b']');
            if let Some((start, len)) = partial {
                buf.extend_from_slice(format!("<{start}.{len}>").as_bytes());
            }
        }
    }
}

/// Writes a STORE action.
pub fn write_store_action(buf: &mut Vec<u8>, action: &StoreAction, silent: bool) {
    let (prefix, flags) = match action {
        StoreAction::AddFlags(f) => (b"+FLAGS".as_slice(), f),
        StoreAction::RemoveFlags(f) => (b"-FLAGS".as_slice(), f),
    };
    buf.extend_from_slice(prefix);
    if silent {
        buf.extend_from_slice(b".SILENT");
    }
    buf.push(b' ');
    write_flag_list(buf, flags);
}

/// Writes SEARCH criteria.
pub fn write_search_criteria(buf: &mut Vec<u8>, criteria: &SearchCriteria) {
    match criteria {
        SearchCriteria::All => buf.extend_from_slice(b"ALL"),
        SearchCriteria::LastMessage => buf.extend_from_slice(b"*:*"),
        SearchCriteria::SequenceSet(set) => buf.extend_from_slice(set.to_string().as_bytes()),
        SearchCriteria::UidSet(set) => {
            buf.extend_from_slice(b"UID ");
            buf.extend_from_slice(set.to_string().as_bytes());
        }
        SearchCriteria::Flag(flag) => write_flag_criterion(buf, flag, true),
        SearchCriteria::NotFlag(flag) => write_flag_criterion(buf, flag, false),
        SearchCriteria::Subject(s) => {
            buf.extend_from_slice(b"SUBJECT ");
            write_astring(buf, s);
        }
        SearchCriteria::From(s) => {
            buf.extend_from_slice(b"FROM ");
            write_astring(buf, s);
        }
        SearchCriteria::Text(s) => {
            buf.extend_from_slice(b"TEXT ");
            write_astring(buf, s);
        }
        SearchCriteria::Since(date) => {
            buf.extend_from_slice(format!("SINCE {}", date.format("%d-%b-%Y")).as_bytes());
        }
        SearchCriteria::Header(name, value) => {
            buf.extend_from_slice(b"HEADER ");
            write_astring(buf, name);
            buf.push(b' ');
            write_astring(buf, value);
        }
        SearchCriteria::And(criteria) => {
            for (i, c) in criteria.iter().enumerate() {
                if i > 0 {
                    buf.push(b' ');
                }
                write_search_criteria(buf, c);
            }
        }
        SearchCriteria::Or(a, b) => {
            buf.extend_from_slice(b"OR ");
            write_search_criteria(buf, a);
            buf.push(b' ');
            write_search_criteria(buf, b);
        }
    }
}

fn write_flag_criterion(buf: &mut Vec<u8>, flag: &Flag, present: bool) {
    let keyword: &str = match (flag, present) {
        (Flag::Seen, true) => "SEEN",
        (Flag::Seen, false) => "UNSEEN",
        (Flag::Deleted, true) => "DELETED",
        (Flag::Deleted, false) => "NOT DELETED",
        (Flag::Answered, true) => "ANSWERED",
        (Flag::Answered, false) => "UNANSWERED",
        (Flag::Flagged, true) => "FLAGGED",
        (Flag::Flagged, false) => "UNFLAGGED",
        (Flag::Draft, true) => "DRAFT",
        (Flag::Draft, false) => "UNDRAFT",
        (Flag::Recent, true) => "RECENT",
        (Flag::Recent, false) => "NOT RECENT",
        (other, true) => {
            buf.extend_from_slice(b"KEYWORD ");
            buf.extend_from_slice(other.as_str().as_bytes());
            return;
        }
        (other, false) => {
            buf.extend_from_slice(b"UNKEYWORD ");
            buf.extend_from_slice(other.as_str().as_bytes());
            return;
        }
    };
    buf.extend_from_slice(keyword.as_bytes());
}
