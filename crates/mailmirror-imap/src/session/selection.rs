//! Folder metadata tracked while a folder is selected.

use std::collections::HashMap;

use tracing::debug;

use crate::parser::{FetchItem, UntaggedResponse};
use crate::qresync::ModSeq;
use crate::types::{Flag, OpenMode, ResponseCode, Uid, UidValidity};

/// State of the selected folder.
///
/// Every untagged response read by the session passes through
/// [`apply_untagged`](Self::apply_untagged), whatever command is in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSelection {
    mode: Option<OpenMode>,
    uid_validity: Option<UidValidity>,
    highest_mod_seq: Option<ModSeq>,
    message_count: Option<u32>,
    uid_next: Option<Uid>,
    can_create_keywords: bool,
    permanent_flags: Vec<Flag>,
    seq_to_uid: HashMap<u32, Uid>,
}

impl FolderSelection {
    /// Granted open mode; `None` when nothing is selected.
    #[must_use]
    pub const fn mode(&self) -> Option<OpenMode> {
        self.mode
    }

    /// UIDVALIDITY of the selection.
    #[must_use]
    pub const fn uid_validity(&self) -> Option<UidValidity> {
        self.uid_validity
    }

    /// HIGHESTMODSEQ watermark.
    #[must_use]
    pub const fn highest_mod_seq(&self) -> Option<ModSeq> {
        self.highest_mod_seq
    }

    /// Message count; `None` until the server reported EXISTS.
    #[must_use]
    pub const fn message_count(&self) -> Option<u32> {
        self.message_count
    }

    /// Predicted next UID.
    #[must_use]
    pub const fn uid_next(&self) -> Option<Uid> {
        self.uid_next
    }

    /// True when `\*` is among the permanent flags.
    #[must_use]
    pub const fn can_create_keywords(&self) -> bool {
        self.can_create_keywords
    }

    /// Flags the server stores permanently.
    #[must_use]
    pub fn permanent_flags(&self) -> &[Flag] {
        &self.permanent_flags
    }

    /// UID cached for a sequence number.
    #[must_use]
    pub fn uid_for_sequence(&self, seq: u32) -> Option<Uid> {
        self.seq_to_uid.get(&seq).copied()
    }

    /// Forgets everything. Used on close and on connection loss.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Records the outcome of a successful SELECT/EXAMINE.
    pub(crate) fn complete(&mut self, requested: OpenMode, granted: Option<OpenMode>) {
        self.mode = Some(granted.unwrap_or(requested));
    }

    pub(crate) fn set_highest_mod_seq(&mut self, modseq: u64) {
        if let Some(m) = ModSeq::from_u64(modseq) {
            self.highest_mod_seq = Some(m);
        }
    }

    /// Applies unsolicited folder information from one untagged response.
    pub fn apply_untagged(&mut self, response: &UntaggedResponse) {
        match response {
            UntaggedResponse::Exists(n) => {
                debug!(count = n, "EXISTS");
                self.message_count = Some(*n);
            }
            UntaggedResponse::Expunge(_) => self.decrement(1),
            UntaggedResponse::Vanished {
                earlier: false,
                uids,
            } => self.decrement(uids.len()),
            UntaggedResponse::Ok {
                code: Some(code), ..
            } => self.apply_code(code),
            UntaggedResponse::Fetch { seq, items } => {
                for item in items {
                    if let FetchItem::Uid(uid) = item {
                        self.seq_to_uid.insert(seq.get(), *uid);
                    }
                }
            }
            _ => {}
        }
    }

    /// Applies a response code carried by an untagged OK or a tagged reply.
    pub(crate) fn apply_code(&mut self, code: &ResponseCode) {
        match code {
            ResponseCode::UidNext(uid) => {
                debug!(uid_next = uid.get(), "UIDNEXT");
                self.uid_next = Some(*uid);
            }
            ResponseCode::UidValidity(v) => self.uid_validity = Some(*v),
            ResponseCode::HighestModSeq(m) => self.set_highest_mod_seq(*m),
            ResponseCode::NoModSeq => self.highest_mod_seq = None,
            ResponseCode::PermanentFlags(flags) => {
                self.can_create_keywords = flags.contains(&Flag::MayCreate);
                self.permanent_flags.clone_from(flags);
            }
            _ => {}
        }
    }

    fn decrement(&mut self, by: usize) {
        if let Some(count) = self.message_count.as_mut() {
            let by = u32::try_from(by).unwrap_or(u32::MAX);
            *count = count.saturating_sub(by);
            debug!(count = *count, "Message count after expunge");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::SeqNum;

    fn expunge(seq: u32) -> UntaggedResponse {
        UntaggedResponse::Expunge(SeqNum::new(seq).unwrap())
    }

    #[test]
    fn expunge_decrements() {
        let mut sel = FolderSelection::default();
        sel.apply_untagged(&UntaggedResponse::Exists(42));
        sel.apply_untagged(&expunge(7));
        assert_eq!(sel.message_count(), Some(41));
    }

    #[test]
    fn expunge_never_goes_negative() {
        let mut sel = FolderSelection::default();
        sel.apply_untagged(&UntaggedResponse::Exists(0));
        sel.apply_untagged(&expunge(1));
        assert_eq!(sel.message_count(), Some(0));
    }

    #[test]
    fn expunge_with_unknown_count_stays_unknown() {
        let mut sel = FolderSelection::default();
        sel.apply_untagged(&expunge(1));
        assert_eq!(sel.message_count(), None);
    }

    #[test]
    fn live_vanished_decrements_earlier_does_not() {
        let mut sel = FolderSelection::default();
        sel.apply_untagged(&UntaggedResponse::Exists(10));
        let uids: Vec<Uid> = [3, 4, 5].iter().map(|&n| Uid::new(n).unwrap()).collect();
        sel.apply_untagged(&UntaggedResponse::Vanished {
            earlier: true,
            uids: uids.clone(),
        });
        assert_eq!(sel.message_count(), Some(10));
        sel.apply_untagged(&UntaggedResponse::Vanished {
            earlier: false,
            uids,
        });
        assert_eq!(sel.message_count(), Some(7));
    }

    #[test]
    fn uidnext_and_fetch_uid_cache() {
        let mut sel = FolderSelection::default();
        sel.apply_untagged(&UntaggedResponse::Ok {
            code: Some(ResponseCode::UidNext(Uid::new(4392).unwrap())),
            text: String::new(),
        });
        sel.apply_untagged(&UntaggedResponse::Fetch {
            seq: SeqNum::new(12).unwrap(),
            items: vec![FetchItem::Uid(Uid::new(4100).unwrap())],
        });
        assert_eq!(sel.uid_next(), Uid::new(4392));
        assert_eq!(sel.uid_for_sequence(12), Uid::new(4100));
        assert_eq!(sel.uid_for_sequence(13), None);
    }

    #[test]
    fn permanent_flags_with_wildcard() {
        let mut sel = FolderSelection::default();
        sel.apply_code(&ResponseCode::PermanentFlags(vec![Flag::Seen, Flag::MayCreate]));
        assert!(sel.can_create_keywords());
        sel.apply_code(&ResponseCode::PermanentFlags(vec![Flag::Seen]));
        assert!(!sel.can_create_keywords());
    }

    #[test]
    fn reset_clears_everything() {
        let mut sel = FolderSelection::default();
        sel.apply_untagged(&UntaggedResponse::Exists(3));
        sel.complete(OpenMode::ReadWrite, Some(OpenMode::ReadOnly));
        assert_eq!(sel.mode(), Some(OpenMode::ReadOnly));
        sel.reset();
        assert_eq!(sel, FolderSelection::default());
    }
}
