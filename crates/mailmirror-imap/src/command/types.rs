//! Command-related type definitions.

use chrono::NaiveDate;

use crate::qresync::QresyncParams;
use crate::types::{Flag, SequenceSet, UidSet};

/// STATUS attributes to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAttribute {
    /// Number of messages.
    Messages,
    /// Number of recent messages.
    Recent,
    /// Next UID.
    UidNext,
    /// UIDVALIDITY.
    UidValidity,
}

impl StatusAttribute {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Messages => "MESSAGES",
            Self::Recent => "RECENT",
            Self::UidNext => "UIDNEXT",
            Self::UidValidity => "UIDVALIDITY",
        }
    }
}

/// Extension parameters on SELECT/EXAMINE.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectModifier {
    /// Plain select.
    #[default]
    None,
    /// `(CONDSTORE)`.
    CondStore,
    /// `(QRESYNC (...))`.
    QResync(QresyncParams),
}

/// Individual FETCH attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchAttribute {
    /// Message flags.
    Flags,
    /// Internal date.
    InternalDate,
    /// RFC822 size.
    Rfc822Size,
    /// Envelope structure.
    Envelope,
    /// Body structure.
    BodyStructure,
    /// UID.
    Uid,
    /// Body section.
    Body {
        /// Section specifier.
        section: Option<String>,
        /// Peek (don't set \Seen).
        peek: bool,
        /// Partial fetch `<start.len>`.
        partial: Option<(u32, u32)>,
    },
    /// MODSEQ.
    ModSeq,
}

/// STORE action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreAction {
    /// `+FLAGS`.
    AddFlags(Vec<Flag>),
    /// `-FLAGS`.
    RemoveFlags(Vec<Flag>),
}

/// SEARCH criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriteria {
    /// All messages.
    All,
    /// The last message in the folder (`*:*`).
    LastMessage,
    /// Sequence number set.
    SequenceSet(SequenceSet),
    /// UID set.
    UidSet(UidSet),
    /// Messages carrying the flag.
    Flag(Flag),
    /// Messages lacking the flag.
    NotFlag(Flag),
    /// Subject contains text.
    Subject(String),
    /// From contains text.
    From(String),
    /// Text in header or body.
    Text(String),
    /// Internal date on or after the day.
    Since(NaiveDate),
    /// Header field contains value.
    Header(String, String),
    /// AND of criteria.
    And(Vec<Self>),
    /// OR of criteria.
    Or(Box<Self>, Box<Self>),
}

impl SearchCriteria {
    /// Builds an AND of criteria, collapsing the trivial cases.
    #[must_use]
    pub fn all_of(mut criteria: Vec<Self>) -> Self {
        match criteria.len() {
            0 => Self::All,
            1 => criteria.remove(0),
            _ => Self::And(criteria),
        }
    }
}
