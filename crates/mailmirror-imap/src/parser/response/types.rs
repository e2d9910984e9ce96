//! Response data types.

use crate::types::{Capability, Flags, Mailbox, ResponseCode, SeqNum, Uid, UidValidity};

/// FETCH response item.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchItem {
    /// Message flags.
    Flags(Flags),
    /// Internal date as sent by the server.
    InternalDate(String),
    /// RFC822 size.
    Rfc822Size(u32),
    /// Envelope.
    Envelope(Box<Envelope>),
    /// UID.
    Uid(Uid),
    /// BODY section.
    Body {
        /// Section specifier.
        section: Option<String>,
        /// Origin offset.
        origin: Option<u32>,
        /// Body data.
        data: Option<Vec<u8>>,
    },
    /// BODYSTRUCTURE as a raw nested list, decoded by [`crate::mime`].
    BodyStructure(ListValue),
    /// MODSEQ (CONDSTORE).
    ModSeq(u64),
}

/// Generic parenthesized-list value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListValue {
    /// NIL.
    Nil,
    /// Atom, quoted string or literal.
    String(String),
    /// Number.
    Number(u64),
    /// Nested list.
    List(Vec<Self>),
}

impl ListValue {
    /// Returns the string content, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the list items, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the number, also accepting digit strings.
    #[must_use]
    pub fn as_number(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Returns true for NIL.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }
}

/// Message envelope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Envelope {
    /// Date header.
    pub date: Option<String>,
    /// Subject header.
    pub subject: Option<String>,
    /// From addresses.
    pub from: Vec<Address>,
    /// Sender addresses.
    pub sender: Vec<Address>,
    /// Reply-To addresses.
    pub reply_to: Vec<Address>,
    /// To addresses.
    pub to: Vec<Address>,
    /// Cc addresses.
    pub cc: Vec<Address>,
    /// Bcc addresses.
    pub bcc: Vec<Address>,
    /// In-Reply-To header.
    pub in_reply_to: Option<String>,
    /// Message-ID header.
    pub message_id: Option<String>,
}

/// Email address from an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Display name.
    pub name: Option<String>,
    /// Mailbox name (local part).
    pub mailbox: Option<String>,
    /// Host name (domain part).
    pub host: Option<String>,
}

impl Address {
    /// Returns the full email address.
    #[must_use]
    pub fn email(&self) -> Option<String> {
        match (&self.mailbox, &self.host) {
            (Some(m), Some(h)) => Some(format!("{m}@{h}")),
            _ => None,
        }
    }
}

/// STATUS response item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusItem {
    /// Number of messages.
    Messages(u32),
    /// Number of recent messages.
    Recent(u32),
    /// Next UID.
    UidNext(Uid),
    /// UIDVALIDITY value.
    UidValidity(UidValidity),
    /// Number of unseen messages.
    Unseen(u32),
    /// Highest mod-sequence.
    HighestModSeq(u64),
}

/// Untagged response data.
#[derive(Debug, Clone, PartialEq)]
pub enum UntaggedResponse {
    /// OK response with optional code.
    Ok {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// NO response.
    No {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// BAD response.
    Bad {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// BYE response.
    Bye {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// CAPABILITY response.
    Capability(Vec<Capability>),
    /// ENABLED response (RFC 5161).
    Enabled(Vec<Capability>),
    /// FLAGS response.
    Flags(Flags),
    /// EXISTS response (message count).
    Exists(u32),
    /// RECENT response.
    Recent(u32),
    /// EXPUNGE response.
    Expunge(SeqNum),
    /// VANISHED response (RFC 7162).
    Vanished {
        /// `(EARLIER)`: reported at selection time, not a live deletion.
        earlier: bool,
        /// Vanished UIDs.
        uids: Vec<Uid>,
    },
    /// FETCH response.
    Fetch {
        /// Message sequence number.
        seq: SeqNum,
        /// Fetched items.
        items: Vec<FetchItem>,
    },
    /// SEARCH response (numbers are UIDs for UID SEARCH).
    Search(Vec<u32>),
    /// STATUS response.
    Status {
        /// Mailbox name.
        mailbox: Mailbox,
        /// Status items.
        items: Vec<StatusItem>,
    },
    /// Any response this client does not interpret.
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_value_accessors() {
        let value = ListValue::List(vec![
            ListValue::String("TEXT".into()),
            ListValue::Number(12),
            ListValue::Nil,
        ]);
        let items = value.as_list().unwrap_or_default();
        assert_eq!(items[0].as_str(), Some("TEXT"));
        assert_eq!(items[1].as_number(), Some(12));
        assert!(items[2].is_nil());
        assert_eq!(ListValue::String("34".into()).as_number(), Some(34));
    }

    #[test]
    fn address_email() {
        let addr = Address {
            name: Some("Ann".into()),
            mailbox: Some("ann".into()),
            host: Some("example.org".into()),
        };
        assert_eq!(addr.email().as_deref(), Some("ann@example.org"));
        let partial = Address {
            host: None,
            ..addr
        };
        assert!(partial.email().is_none());
    }
}
