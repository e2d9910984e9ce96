//! Message views shared by the decision engine, the store and the
//! coordinator.

use chrono::{DateTime, FixedOffset};
use mailmirror_imap::{FetchedMessage, Flag, Flags, Uid};
use serde::{Deserialize, Serialize};

/// How much of a message has been downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadState {
    /// Nothing beyond the UID.
    #[default]
    NotDownloaded,
    /// Headers and a truncated body.
    Partial,
    /// The whole message.
    Full,
}

impl DownloadState {
    /// All states, for exhaustive checks.
    pub const ALL: [Self; 3] = [Self::NotDownloaded, Self::Partial, Self::Full];

    /// True for partial or full downloads.
    #[must_use]
    pub const fn is_downloaded(self) -> bool {
        !matches!(self, Self::NotDownloaded)
    }
}

/// A message as reported by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteMessage {
    /// UID as text; numeric for IMAP folders.
    pub uid: String,
    /// Server flags.
    pub flags: Flags,
    /// Download markers carried with the message.
    pub download: DownloadState,
    /// Internal date.
    pub internal_date: Option<DateTime<FixedOffset>>,
    /// Sender addresses.
    pub from: Vec<String>,
}

impl RemoteMessage {
    /// Creates a message with no flags.
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            flags: Flags::new(),
            download: DownloadState::NotDownloaded,
            internal_date: None,
            from: Vec::new(),
        }
    }

    /// Builds a view of a fetched row; `None` when the row had no UID.
    #[must_use]
    pub fn from_fetched(message: &FetchedMessage) -> Option<Self> {
        let uid = message.uid?;
        Some(Self {
            uid: uid.to_string(),
            flags: message.flags.clone(),
            download: match &message.content {
                None => DownloadState::NotDownloaded,
                Some(_) if message.is_partial() => DownloadState::Partial,
                Some(_) => DownloadState::Full,
            },
            internal_date: message.internal_date,
            from: message.from_addresses(),
        })
    }

    /// Sets a flag.
    #[must_use]
    pub fn with_flag(mut self, flag: Flag) -> Self {
        self.flags.insert(flag);
        self
    }

    /// Sets the download marker.
    #[must_use]
    pub const fn with_download(mut self, download: DownloadState) -> Self {
        self.download = download;
        self
    }

    /// UID as a number, when it is one.
    #[must_use]
    pub fn numeric_uid(&self) -> Option<Uid> {
        self.uid.parse().ok().and_then(Uid::new)
    }

    /// True when the server marked the message `\Deleted`.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.flags.is_deleted()
    }
}

/// A message in the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalMessage {
    /// UID as text.
    pub uid: String,
    /// Local flags, names as sent on the wire.
    pub flags: Vec<String>,
    /// Download state.
    pub download: DownloadState,
    /// Internal date.
    pub internal_date: Option<DateTime<FixedOffset>>,
    /// Sender addresses.
    pub from: Vec<String>,
}

impl LocalMessage {
    /// Materializes a remote message, copying its download markers.
    #[must_use]
    pub fn from_remote(remote: &RemoteMessage) -> Self {
        Self {
            uid: remote.uid.clone(),
            flags: remote.flags.iter().map(|flag| flag.as_str().to_string()).collect(),
            download: remote.download,
            internal_date: remote.internal_date,
            from: remote.from.clone(),
        }
    }

    /// True when `flag` is set.
    #[must_use]
    pub fn has_flag(&self, flag: &Flag) -> bool {
        self.flags.iter().any(|f| f.eq_ignore_ascii_case(flag.as_str()))
    }

    /// Sets or clears `flag`; returns true on change.
    pub fn set_flag(&mut self, flag: &Flag, value: bool) -> bool {
        match (self.has_flag(flag), value) {
            (false, true) => {
                self.flags.push(flag.as_str().to_string());
                true
            }
            (true, false) => {
                self.flags.retain(|f| !f.eq_ignore_ascii_case(flag.as_str()));
                true
            }
            _ => false,
        }
    }

    /// True when deleted locally.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.has_flag(&Flag::Deleted)
    }

    /// True when read.
    #[must_use]
    pub fn is_seen(&self) -> bool {
        self.has_flag(&Flag::Seen)
    }

    /// UID as a number, when it is one.
    #[must_use]
    pub fn numeric_uid(&self) -> Option<u32> {
        self.uid.parse().ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mailmirror_imap::SeqNum;
    use mailmirror_imap::parser::FetchItem;

    use super::*;

    #[test]
    fn fetched_row_without_uid_is_skipped() {
        let row = FetchedMessage::from_items(SeqNum::new(1).unwrap(), vec![]);
        assert!(RemoteMessage::from_fetched(&row).is_none());
    }

    #[test]
    fn fetched_row_keeps_flags() {
        let row = FetchedMessage::from_items(
            SeqNum::new(3).unwrap(),
            vec![
                FetchItem::Uid(Uid::new(77).unwrap()),
                FetchItem::Flags(Flags::from_vec(vec![Flag::Seen])),
            ],
        );
        let remote = RemoteMessage::from_fetched(&row).unwrap();
        assert_eq!(remote.uid, "77");
        assert_eq!(remote.numeric_uid(), Uid::new(77));
        assert!(remote.flags.is_seen());
        assert_eq!(remote.download, DownloadState::NotDownloaded);
    }

    #[test]
    fn truncated_body_is_partial() {
        let row = FetchedMessage::from_items(
            SeqNum::new(4).unwrap(),
            vec![
                FetchItem::Uid(Uid::new(90).unwrap()),
                FetchItem::Rfc822Size(100_000),
                FetchItem::Body {
                    section: None,
                    origin: Some(0),
                    data: Some(vec![b'a'; 32]),
                },
            ],
        );
        assert_eq!(
            RemoteMessage::from_fetched(&row).unwrap().download,
            DownloadState::Partial
        );
    }

    #[test]
    fn whole_body_is_full() {
        let row = FetchedMessage::from_items(
            SeqNum::new(4).unwrap(),
            vec![
                FetchItem::Uid(Uid::new(91).unwrap()),
                FetchItem::Rfc822Size(5),
                FetchItem::Body {
                    section: None,
                    origin: None,
                    data: Some(b"hello".to_vec()),
                },
            ],
        );
        assert_eq!(
            RemoteMessage::from_fetched(&row).unwrap().download,
            DownloadState::Full
        );
    }

    #[test]
    fn local_flags() {
        let remote = RemoteMessage::new("5").with_flag(Flag::Seen);
        let mut local = LocalMessage::from_remote(&remote);
        assert!(local.is_seen());
        assert!(local.set_flag(&Flag::Deleted, true));
        assert!(!local.set_flag(&Flag::Deleted, true));
        assert!(local.is_deleted());
        assert!(local.set_flag(&Flag::Seen, false));
        assert!(!local.is_seen());
    }

    #[test]
    fn non_numeric_uid() {
        assert_eq!(RemoteMessage::new("abc").numeric_uid(), None);
        assert_eq!(RemoteMessage::new("0").numeric_uid(), None);
    }
}
