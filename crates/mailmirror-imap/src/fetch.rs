//! Windowed fetch profiles and fetched-message assembly.
//!
//! Large UID sets are split into fixed-size windows so that one request
//! never asks the server for more than a bounded number of rows. Each
//! window is a single `UID FETCH`; the rows that come back (including
//! unsolicited ones) are assembled into [`FetchedMessage`] values.

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::command::FetchAttribute;
use crate::mime::{self, MimePart};
use crate::parser::{Envelope, FetchItem};
use crate::types::{Flags, SeqNum, Uid};

/// Default number of UIDs per fetch window.
pub const DEFAULT_WINDOW_SIZE: usize = 100;

/// Parts of a message a caller can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchPart {
    /// Flags only.
    Flags,
    /// Envelope, internal date and size.
    Envelope,
    /// Body structure, decoded into a [`MimePart`] tree.
    Structure,
    /// Whole message, truncated to the configured download limit.
    BodySane,
    /// Whole message.
    Body,
}

/// Ordered set of [`FetchPart`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchProfile {
    parts: Vec<FetchPart>,
}

impl FetchProfile {
    /// Creates an empty profile (UID only).
    #[must_use]
    pub const fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Adds a part.
    #[must_use]
    pub fn with(mut self, part: FetchPart) -> Self {
        if !self.parts.contains(&part) {
            self.parts.push(part);
        }
        self
    }

    /// Returns true if the part was requested.
    #[must_use]
    pub fn contains(&self, part: FetchPart) -> bool {
        self.parts.contains(&part)
    }

    /// Maps the profile to FETCH attributes. `UID` always comes first.
    ///
    /// `max_download_size` of zero means no partial limit for
    /// [`FetchPart::BodySane`].
    #[must_use]
    pub fn attributes(&self, max_download_size: u32) -> Vec<FetchAttribute> {
        let mut attrs = vec![FetchAttribute::Uid];
        for part in &self.parts {
            match part {
                FetchPart::Flags => attrs.push(FetchAttribute::Flags),
                FetchPart::Envelope => {
                    attrs.push(FetchAttribute::Envelope);
                    attrs.push(FetchAttribute::InternalDate);
                    attrs.push(FetchAttribute::Rfc822Size);
                }
                FetchPart::Structure => attrs.push(FetchAttribute::BodyStructure),
                FetchPart::BodySane => attrs.push(FetchAttribute::Body {
                    section: None,
                    peek: true,
                    partial: (max_download_size > 0).then_some((0, max_download_size)),
                }),
                FetchPart::Body => attrs.push(FetchAttribute::Body {
                    section: None,
                    peek: true,
                    partial: None,
                }),
            }
        }
        attrs.dedup();
        attrs
    }
}

/// Splits `items` into consecutive windows of at most `size` elements.
///
/// A zero size is treated as one.
#[must_use]
pub fn fetch_windows<T>(items: &[T], size: usize) -> Vec<&[T]> {
    items.chunks(size.max(1)).collect()
}

/// A message row assembled from one FETCH response.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedMessage {
    /// Sequence number at the time of the fetch.
    pub seq: SeqNum,
    /// UID, when the row carried one.
    pub uid: Option<Uid>,
    /// Flags, empty when not requested.
    pub flags: Flags,
    /// Server internal date.
    pub internal_date: Option<DateTime<FixedOffset>>,
    /// RFC822 size.
    pub size: Option<u32>,
    /// Envelope.
    pub envelope: Option<Envelope>,
    /// Decoded body structure; `None` when absent or unsupported.
    pub body: Option<MimePart>,
    /// Raw message bytes from `BODY[]`.
    pub content: Option<Vec<u8>>,
    /// Origin octet when `BODY[]` came back as `BODY[]<origin>`.
    pub content_origin: Option<u32>,
    /// MODSEQ of the row.
    pub mod_seq: Option<u64>,
}

impl FetchedMessage {
    /// Builds a message from a FETCH row.
    ///
    /// An undecodable body structure leaves `body` empty; the rest of the
    /// row is kept.
    #[must_use]
    pub fn from_items(seq: SeqNum, items: Vec<FetchItem>) -> Self {
        let mut msg = Self {
            seq,
            uid: None,
            flags: Flags::new(),
            internal_date: None,
            size: None,
            envelope: None,
            body: None,
            content: None,
            content_origin: None,
            mod_seq: None,
        };
        for item in items {
            match item {
                FetchItem::Uid(uid) => msg.uid = Some(uid),
                FetchItem::Flags(flags) => msg.flags = flags,
                FetchItem::InternalDate(date) => msg.internal_date = parse_internal_date(&date),
                FetchItem::Rfc822Size(size) => msg.size = Some(size),
                FetchItem::Envelope(envelope) => msg.envelope = Some(*envelope),
                FetchItem::ModSeq(modseq) => msg.mod_seq = Some(modseq),
                FetchItem::Body {
                    section: None,
                    origin,
                    data,
                } => {
                    msg.content = data;
                    msg.content_origin = origin;
                }
                FetchItem::Body { .. } => {}
                FetchItem::BodyStructure(structure) => match mime::decode(&structure) {
                    Ok(part) => msg.body = Some(part),
                    Err(e) => debug!(seq = seq.get(), error = %e, "Skipping body structure"),
                },
            }
        }
        msg
    }

    /// True when `content` holds only part of the message: it was fetched
    /// with an origin or is shorter than the RFC822 size.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        let Some(content) = &self.content else {
            return false;
        };
        self.content_origin.is_some()
            || self
                .size
                .is_some_and(|size| content.len() < size as usize)
    }

    /// Message-ID from the envelope.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.envelope.as_ref()?.message_id.as_deref()
    }

    /// Sender addresses from the envelope.
    #[must_use]
    pub fn from_addresses(&self) -> Vec<String> {
        self.envelope
            .as_ref()
            .map(|env| env.from.iter().filter_map(crate::parser::Address::email).collect())
            .unwrap_or_default()
    }
}

/// Parses an INTERNALDATE such as `17-Jul-1996 02:44:25 -0700`.
#[must_use]
pub fn parse_internal_date(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(s.trim(), "%d-%b-%Y %H:%M:%S %z").ok()
}
