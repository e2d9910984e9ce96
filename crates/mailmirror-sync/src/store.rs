//! Local mailbox store contract and an in-memory implementation.

use std::collections::HashMap;

use mailmirror_imap::Flag;
use tracing::debug;

use crate::account::FolderClass;
use crate::model::{DownloadState, LocalMessage, RemoteMessage};
use crate::{Error, Result};

/// Flags mirrored from the server onto local copies.
const SYNCED_FLAGS: [Flag; 4] = [Flag::Seen, Flag::Answered, Flag::Flagged, Flag::Deleted];

/// Durable per-folder message store.
pub trait LocalMailStore {
    /// Remote name of the folder this store mirrors.
    fn folder_name(&self) -> &str;

    /// Looks up a message by UID.
    ///
    /// # Errors
    ///
    /// [`Error::Store`] if the store cannot be read.
    fn message(&self, uid: &str) -> Result<Option<LocalMessage>>;

    /// Stores a message, replacing any copy with the same UID.
    ///
    /// # Errors
    ///
    /// [`Error::Store`] if the write fails.
    fn append(&mut self, message: LocalMessage) -> Result<()>;

    /// Updates the download state of a stored message.
    ///
    /// # Errors
    ///
    /// [`Error::Store`] if the message is missing or the write fails.
    fn set_download_state(&mut self, uid: &str, state: DownloadState) -> Result<()>;

    /// Mirrors the server's flags onto the local copy. Returns true when
    /// anything changed.
    ///
    /// # Errors
    ///
    /// [`Error::Store`] if the write fails.
    fn apply_remote_flags(&mut self, remote: &RemoteMessage) -> Result<bool>;

    /// Removes messages by UID and returns how many were present.
    ///
    /// # Errors
    ///
    /// [`Error::Store`] if the write fails.
    fn delete_uids(&mut self, uids: &[String]) -> Result<usize>;

    /// Stored push state, if any.
    fn push_state(&self) -> Option<String>;

    /// Persists a new push state.
    ///
    /// # Errors
    ///
    /// [`Error::Store`] if the write fails.
    fn set_push_state(&mut self, state: String) -> Result<()>;

    /// Number of messages the folder keeps synced.
    fn visible_limit(&self) -> u32;

    /// Number of stored messages not marked deleted.
    fn message_count(&self) -> u32;

    /// Highest UID already notified about.
    fn last_uid(&self) -> Option<u32>;

    /// Records the highest UID notified about.
    ///
    /// # Errors
    ///
    /// [`Error::Store`] if the write fails.
    fn set_last_uid(&mut self, uid: u32) -> Result<()>;

    /// Smallest numeric UID stored.
    fn smallest_uid(&self) -> Option<u32>;

    /// Display class of the folder.
    fn display_class(&self) -> FolderClass;

    /// Notify class of the folder.
    fn notify_class(&self) -> FolderClass;
}

/// In-memory [`LocalMailStore`].
///
/// # Example
///
/// ```
/// use mailmirror_sync::store::{LocalMailStore, MemoryStore};
///
/// let store = MemoryStore::new("INBOX").with_visible_limit(25);
/// assert_eq!(store.folder_name(), "INBOX");
/// assert_eq!(store.visible_limit(), 25);
/// assert_eq!(store.message_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore {
    folder: String,
    messages: HashMap<String, LocalMessage>,
    push_state: Option<String>,
    visible_limit: u32,
    last_uid: Option<u32>,
    display_class: FolderClass,
    notify_class: FolderClass,
}

impl MemoryStore {
    /// Default number of synced messages.
    pub const DEFAULT_VISIBLE_LIMIT: u32 = 25;

    /// Creates an empty store for `folder`.
    #[must_use]
    pub fn new(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            messages: HashMap::new(),
            push_state: None,
            visible_limit: Self::DEFAULT_VISIBLE_LIMIT,
            last_uid: None,
            display_class: FolderClass::NoClass,
            notify_class: FolderClass::NoClass,
        }
    }

    /// Sets the visible limit.
    #[must_use]
    pub const fn with_visible_limit(mut self, limit: u32) -> Self {
        self.visible_limit = limit;
        self
    }

    /// Sets display and notify classes.
    #[must_use]
    pub const fn with_classes(mut self, display: FolderClass, notify: FolderClass) -> Self {
        self.display_class = display;
        self.notify_class = notify;
        self
    }

    /// Sets the last notified UID.
    #[must_use]
    pub const fn with_last_uid(mut self, uid: u32) -> Self {
        self.last_uid = Some(uid);
        self
    }

    /// Seeds a stored message.
    #[must_use]
    pub fn with_message(mut self, message: LocalMessage) -> Self {
        self.messages.insert(message.uid.clone(), message);
        self
    }

    /// Seeds the push state.
    #[must_use]
    pub fn with_push_state(mut self, state: impl Into<String>) -> Self {
        self.push_state = Some(state.into());
        self
    }

    /// All stored UIDs, ascending where numeric.
    #[must_use]
    pub fn uids(&self) -> Vec<String> {
        let mut uids: Vec<String> = self.messages.keys().cloned().collect();
        uids.sort_by_key(|uid| (uid.parse::<u32>().unwrap_or(u32::MAX), uid.clone()));
        uids
    }

    fn message_mut(&mut self, uid: &str) -> Result<&mut LocalMessage> {
        self.messages
            .get_mut(uid)
            .ok_or_else(|| Error::Store(format!("no message with UID {uid} in {}", self.folder)))
    }
}

impl LocalMailStore for MemoryStore {
    fn folder_name(&self) -> &str {
        &self.folder
    }

    fn message(&self, uid: &str) -> Result<Option<LocalMessage>> {
        Ok(self.messages.get(uid).cloned())
    }

    fn append(&mut self, message: LocalMessage) -> Result<()> {
        debug!(folder = %self.folder, uid = %message.uid, "Storing message");
        self.messages.insert(message.uid.clone(), message);
        Ok(())
    }

    fn set_download_state(&mut self, uid: &str, state: DownloadState) -> Result<()> {
        self.message_mut(uid)?.download = state;
        Ok(())
    }

    fn apply_remote_flags(&mut self, remote: &RemoteMessage) -> Result<bool> {
        let Some(local) = self.messages.get_mut(&remote.uid) else {
            return Ok(false);
        };
        let mut changed = false;
        for flag in &SYNCED_FLAGS {
            changed |= local.set_flag(flag, remote.flags.contains(flag));
        }
        Ok(changed)
    }

    fn delete_uids(&mut self, uids: &[String]) -> Result<usize> {
        let removed = uids
            .iter()
            .filter(|uid| self.messages.remove(uid.as_str()).is_some())
            .count();
        debug!(folder = %self.folder, removed, "Removed local messages");
        Ok(removed)
    }

    fn push_state(&self) -> Option<String> {
        self.push_state.clone()
    }

    fn set_push_state(&mut self, state: String) -> Result<()> {
        self.push_state = Some(state);
        Ok(())
    }

    fn visible_limit(&self) -> u32 {
        self.visible_limit
    }

    fn message_count(&self) -> u32 {
        let count = self.messages.values().filter(|m| !m.is_deleted()).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn last_uid(&self) -> Option<u32> {
        self.last_uid
    }

    fn set_last_uid(&mut self, uid: u32) -> Result<()> {
        self.last_uid = Some(uid);
        Ok(())
    }

    fn smallest_uid(&self) -> Option<u32> {
        self.messages.values().filter_map(LocalMessage::numeric_uid).min()
    }

    fn display_class(&self) -> FolderClass {
        self.display_class
    }

    fn notify_class(&self) -> FolderClass {
        self.notify_class
    }
}
