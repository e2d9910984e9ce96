//! Bracketed response codes.

use std::collections::HashMap;

use super::{Capability, Flag, Uid, UidValidity};

/// Response code carried in `[...]` by status responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    /// ALERT: Human-readable message that must be shown to the user.
    Alert,
    /// CAPABILITY list.
    Capability(Vec<Capability>),
    /// PERMANENTFLAGS: Flags that can be changed permanently.
    PermanentFlags(Vec<Flag>),
    /// READ-ONLY: Mailbox selected as read-only.
    ReadOnly,
    /// READ-WRITE: Mailbox selected as read-write.
    ReadWrite,
    /// TRYCREATE: Mailbox doesn't exist, but can be created.
    TryCreate,
    /// UIDNEXT: Next UID to be assigned.
    UidNext(Uid),
    /// UIDVALIDITY: Unique identifier validity value.
    UidValidity(UidValidity),
    /// APPENDUID (RFC 4315).
    AppendUid {
        /// UIDVALIDITY of the mailbox.
        uidvalidity: UidValidity,
        /// UID of the appended message.
        uid: Uid,
    },
    /// COPYUID (RFC 4315).
    CopyUid {
        /// UIDVALIDITY of the destination mailbox.
        uidvalidity: UidValidity,
        /// Source UIDs.
        source_uids: Vec<Uid>,
        /// Destination UIDs, positionally paired with `source_uids`.
        dest_uids: Vec<Uid>,
    },
    /// HIGHESTMODSEQ (RFC 7162).
    HighestModSeq(u64),
    /// NOMODSEQ: the mailbox has no mod-sequences.
    NoModSeq,
    /// CLOSED: the previous mailbox was closed by a new SELECT (RFC 7162).
    Closed,
    /// Unknown response code.
    Unknown(String),
}

impl ResponseCode {
    /// Returns the source to destination UID mapping of a COPYUID code.
    #[must_use]
    pub fn copy_mapping(&self) -> Option<HashMap<Uid, Uid>> {
        match self {
            Self::CopyUid {
                source_uids,
                dest_uids,
                ..
            } if source_uids.len() == dest_uids.len() => Some(
                source_uids
                    .iter()
                    .copied()
                    .zip(dest_uids.iter().copied())
                    .collect(),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn uid(n: u32) -> Uid {
        Uid::new(n).unwrap()
    }

    #[test]
    fn copy_mapping_pairs_positionally() {
        let code = ResponseCode::CopyUid {
            uidvalidity: UidValidity::new(888).unwrap(),
            source_uids: vec![uid(1), uid(2)],
            dest_uids: vec![uid(101), uid(102)],
        };
        let map = code.copy_mapping().unwrap();
        assert_eq!(map[&uid(1)], uid(101));
        assert_eq!(map[&uid(2)], uid(102));
    }

    #[test]
    fn copy_mapping_rejects_mismatched_lengths() {
        let code = ResponseCode::CopyUid {
            uidvalidity: UidValidity::new(1).unwrap(),
            source_uids: vec![uid(1), uid(2)],
            dest_uids: vec![uid(101)],
        };
        assert!(code.copy_mapping().is_none());
        assert!(ResponseCode::ReadOnly.copy_mapping().is_none());
    }
}
