//! Remote folder seam used by the coordinator.

use chrono::NaiveDate;
use mailmirror_imap::{ConnectionPool, FetchProfile, FetchedMessage, FolderSession, Uid};

use crate::Result;

/// The selected remote folder, as seen by the resync coordinator.
pub trait RemoteFolder {
    /// Folder name.
    fn name(&self) -> &str;

    /// Message count reported by the last selection, if known.
    fn remote_count(&self) -> Option<u32>;

    /// True when the folder exists on the server.
    fn folder_exists(&mut self) -> impl Future<Output = Result<bool>>;

    /// Creates the folder; false when the server refused.
    fn create_folder(&mut self) -> impl Future<Output = Result<bool>>;

    /// UIDs of non-deleted messages in the sequence range, newest first.
    fn list_range(
        &mut self,
        start: u32,
        end: u32,
        earliest: Option<NaiveDate>,
    ) -> impl Future<Output = Result<Vec<Uid>>>;

    /// Fetches messages by UID.
    fn fetch_messages(
        &mut self,
        uids: &[Uid],
        profile: &FetchProfile,
    ) -> impl Future<Output = Result<Vec<FetchedMessage>>>;
}

impl<P: ConnectionPool> RemoteFolder for FolderSession<P> {
    fn name(&self) -> &str {
        self.mailbox().as_str()
    }

    fn remote_count(&self) -> Option<u32> {
        self.message_count()
    }

    async fn folder_exists(&mut self) -> Result<bool> {
        let name = self.mailbox().as_str().to_string();
        Ok(self.exists(&name).await?)
    }

    async fn create_folder(&mut self) -> Result<bool> {
        let name = self.mailbox().as_str().to_string();
        Ok(self.create(&name).await?)
    }

    async fn list_range(
        &mut self,
        start: u32,
        end: u32,
        earliest: Option<NaiveDate>,
    ) -> Result<Vec<Uid>> {
        Ok(self.messages_in_range(start, end, earliest, false).await?)
    }

    async fn fetch_messages(
        &mut self,
        uids: &[Uid],
        profile: &FetchProfile,
    ) -> Result<Vec<FetchedMessage>> {
        Ok(self.fetch(uids, profile).await?)
    }
}
