//! Core IMAP types.
//!
//! Identifiers, flags and sets shared by the parser, the command
//! serializer and the folder session.

mod capability;
mod flags;
mod identifiers;
mod mailbox;
mod response_code;
mod sequence;

pub use capability::{Capability, Status};
pub use flags::{Flag, Flags};
pub use identifiers::{SeqNum, Tag, Uid, UidValidity};
pub use mailbox::{Mailbox, OpenMode};
pub use response_code::ResponseCode;
pub use sequence::{SequenceSet, UidSet, expand_uid_set};
