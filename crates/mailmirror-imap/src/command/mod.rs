//! Command builder.
//!
//! Commands are plain values serialized against a tag. Every serialized
//! command ends with CRLF; `APPEND` ends with the literal announcement and
//! the message bytes follow after the server's continuation.

mod serialize;
mod tag_generator;
mod types;

use crate::types::{Flag, Mailbox, OpenMode, UidSet};

pub use tag_generator::TagGenerator;
pub use types::{FetchAttribute, SearchCriteria, SelectModifier, StatusAttribute, StoreAction};

use serialize::{
    write_fetch_attributes, write_flag_list, write_mailbox, write_search_criteria,
    write_store_action,
};

/// A command understood by the folder session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// NOOP, used as a liveness check.
    Noop,
    /// ENABLE (RFC 5161).
    Enable {
        /// Extensions to enable.
        capabilities: Vec<String>,
    },
    /// SELECT or EXAMINE, depending on the open mode.
    Select {
        /// Folder to open.
        mailbox: Mailbox,
        /// Requested open mode.
        mode: OpenMode,
        /// CONDSTORE/QRESYNC parameters.
        modifier: SelectModifier,
    },
    /// STATUS.
    Status {
        /// Folder to query.
        mailbox: Mailbox,
        /// Requested items.
        items: Vec<StatusAttribute>,
    },
    /// CREATE.
    Create {
        /// Folder to create.
        mailbox: Mailbox,
    },
    /// APPEND header; the literal follows the continuation.
    Append {
        /// Target folder.
        mailbox: Mailbox,
        /// Flags to store with the message.
        flags: Vec<Flag>,
        /// Literal size in bytes.
        size: usize,
    },
    /// EXPUNGE.
    Expunge,
    /// UID SEARCH.
    UidSearch {
        /// Search criteria.
        criteria: SearchCriteria,
    },
    /// UID FETCH.
    UidFetch {
        /// UIDs to fetch.
        uids: UidSet,
        /// Requested attributes.
        items: Vec<FetchAttribute>,
        /// `CHANGEDSINCE` modifier (CONDSTORE).
        changed_since: Option<u64>,
    },
    /// UID STORE.
    UidStore {
        /// Target UIDs.
        uids: UidSet,
        /// Flag change.
        action: StoreAction,
        /// Suppress untagged FETCH echoes.
        silent: bool,
    },
    /// UID COPY.
    UidCopy {
        /// Source UIDs.
        uids: UidSet,
        /// Destination folder.
        mailbox: Mailbox,
    },
}

impl Command {
    /// Short verb used in logs.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Noop => "NOOP",
            Self::Enable { .. } => "ENABLE",
            Self::Select {
                mode: OpenMode::ReadWrite,
                ..
            } => "SELECT",
            Self::Select { .. } => "EXAMINE",
            Self::Status { .. } => "STATUS",
            Self::Create { .. } => "CREATE",
            Self::Append { .. } => "APPEND",
            Self::Expunge => "EXPUNGE",
            Self::UidSearch { .. } => "UID SEARCH",
            Self::UidFetch { .. } => "UID FETCH",
            Self::UidStore { .. } => "UID STORE",
            Self::UidCopy { .. } => "UID COPY",
        }
    }

    /// Serializes the command with the given tag.
    #[must_use]
    pub fn serialize(&self, tag: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(tag.as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(self.verb().as_bytes());

        match self {
            Self::Noop | Self::Expunge => {}
            Self::Enable { capabilities } => {
                for cap in capabilities {
                    buf.push(b' ');
                    buf.extend_from_slice(cap.as_bytes());
                }
            }
            Self::Select {
                mailbox, modifier, ..
            } => {
                buf.push(b' ');
                write_mailbox(&mut buf, mailbox);
                match modifier {
                    SelectModifier::None => {}
                    SelectModifier::CondStore => buf.extend_from_slice(b" (CONDSTORE)"),
                    SelectModifier::QResync(params) => {
                        buf.push(b' ');
                        buf.extend_from_slice(params.serialize().as_bytes());
                    }
                }
            }
            Self::Status { mailbox, items } => {
                buf.push(b' ');
                write_mailbox(&mut buf, mailbox);
                buf.extend_from_slice(b" (");
                let names: Vec<&str> = items.iter().map(|item| item.as_str()).collect();
                buf.extend_from_slice(names.join(" ").as_bytes());
                buf.push(b')');
            }
            Self::Create { mailbox } => {
                buf.push(b' ');
                write_mailbox(&mut buf, mailbox);
            }
            Self::Append {
                mailbox,
                flags,
                size,
            } => {
                buf.push(b' ');
                write_mailbox(&mut buf, mailbox);
                buf.push(b' ');
                write_flag_list(&mut buf, flags);
                buf.extend_from_slice(format!(" {{{size}}}").as_bytes());
            }
            Self::UidSearch { criteria } => {
                buf.push(b' ');
                write_search_criteria(&mut buf, criteria);
            }
            Self::UidFetch {
                uids,
                items,
                changed_since,
            } => {
                buf.push(b' ');
                buf.extend_from_slice(uids.to_string().as_bytes());
                buf.push(b' ');
                write_fetch_attributes(&mut buf, items);
                if let Some(modseq) = changed_since {
                    buf.extend_from_slice(format!(" (CHANGEDSINCE {modseq})").as_bytes());
                }
            }
            Self::UidStore {
                uids,
                action,
                silent,
            } => {
                buf.push(b' ');
                buf.extend_from_slice(uids.to_string().as_bytes());
                buf.push(b' ');
                write_store_action(&mut buf, action, *silent);
            }
            Self::UidCopy { uids, mailbox } => {
                buf.push(b' ');
                buf.extend_from_slice(uids.to_string().as_bytes());
                buf.push(b' ');
                write_mailbox(&mut buf, mailbox);
            }
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }
}
