//! CONDSTORE and QRESYNC support (RFC 7162).
//!
//! A [`ResyncCheckpoint`] captured after a sync is handed back to
//! [`FolderSession::select`](crate::FolderSession::select). When the server
//! accepts it, the expunged UIDs (`VANISHED (EARLIER)`) and the messages
//! changed since the checkpoint arrive inline with the selection and are
//! returned as a [`ResyncBootstrap`].

use std::num::NonZeroU64;

use crate::fetch::FetchedMessage;
use crate::types::{Uid, UidSet, UidValidity};

/// Modification sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModSeq(NonZeroU64);

impl ModSeq {
    /// Creates a `ModSeq`, returning `None` for zero.
    #[must_use]
    pub fn from_u64(value: u64) -> Option<Self> {
        NonZeroU64::new(value).map(Self)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for ModSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cached folder state submitted to the server to request a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResyncCheckpoint {
    /// UIDVALIDITY the cache was built under.
    pub uid_validity: UidValidity,
    /// HIGHESTMODSEQ observed at the end of the last sync.
    pub mod_seq: ModSeq,
}

impl ResyncCheckpoint {
    /// Creates a checkpoint.
    #[must_use]
    pub const fn new(uid_validity: UidValidity, mod_seq: ModSeq) -> Self {
        Self {
            uid_validity,
            mod_seq,
        }
    }

    /// True when the server's current UIDVALIDITY still matches.
    #[must_use]
    pub fn is_valid_for(&self, current: Option<UidValidity>) -> bool {
        current == Some(self.uid_validity)
    }
}

/// Parameters of the `QRESYNC` select modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QresyncParams {
    /// Last known UIDVALIDITY.
    pub uid_validity: UidValidity,
    /// Last known HIGHESTMODSEQ.
    pub mod_seq: ModSeq,
    /// UIDs the client knows about, narrowing the VANISHED report.
    pub known_uids: Option<UidSet>,
}

impl QresyncParams {
    /// Creates parameters without a known-UID set.
    #[must_use]
    pub const fn new(uid_validity: UidValidity, mod_seq: ModSeq) -> Self {
        Self {
            uid_validity,
            mod_seq,
            known_uids: None,
        }
    }

    /// Restricts the VANISHED report to the given UIDs.
    #[must_use]
    pub fn with_known_uids(mut self, uids: UidSet) -> Self {
        self.known_uids = Some(uids);
        self
    }

    /// Serializes as `(QRESYNC (uidvalidity modseq [known-uids]))`.
    #[must_use]
    pub fn serialize(&self) -> String {
        match &self.known_uids {
            Some(uids) => format!(
                "(QRESYNC ({} {} {uids}))",
                self.uid_validity, self.mod_seq
            ),
            None => format!("(QRESYNC ({} {}))", self.uid_validity, self.mod_seq),
        }
    }
}

impl From<ResyncCheckpoint> for QresyncParams {
    fn from(checkpoint: ResyncCheckpoint) -> Self {
        Self::new(checkpoint.uid_validity, checkpoint.mod_seq)
    }
}

/// Diff delivered inline with a resumed selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResyncBootstrap {
    /// UIDs expunged since the checkpoint.
    pub vanished: Vec<Uid>,
    /// Messages whose flags changed or that arrived since the checkpoint.
    pub changed: Vec<FetchedMessage>,
}

impl ResyncBootstrap {
    /// True when the server reported nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vanished.is_empty() && self.changed.is_empty()
    }
}
