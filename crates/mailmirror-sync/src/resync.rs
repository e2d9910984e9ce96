//! Incremental resync from a QRESYNC bootstrap.
//!
//! After a resumed selection the server has already told us which UIDs
//! vanished and which messages changed since the checkpoint. The
//! coordinator applies the deletions, runs every changed message through
//! the decision engine, and tops the local window up with older messages
//! when the new arrivals leave it short of the visible limit.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use mailmirror_imap::{FetchProfile, ResyncBootstrap, Uid, new_push_state};
use tracing::{debug, info, trace, warn};

use crate::Result;
use crate::account::AccountSettings;
use crate::contacts::ContactDirectory;
use crate::decision::{self, SyncDecision};
use crate::listener::SyncListener;
use crate::model::{DownloadState, LocalMessage, RemoteMessage};
use crate::notify::{NotifyFolder, should_notify};
use crate::remote::RemoteFolder;
use crate::store::LocalMailStore;

/// Result of applying a bootstrap diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResyncOutcome {
    /// UIDs queued for download: new messages, then backfill.
    pub to_download: Vec<Uid>,
    /// Local copies whose flags changed.
    pub flag_updates: usize,
    /// Local messages once the new ones are stored.
    pub local_count: u32,
    /// Older messages queued to fill the visible limit.
    pub backfill: usize,
    /// Local messages removed.
    pub deleted: usize,
}

/// Sequence range of older messages needed to fill the visible limit.
///
/// `remote` messages exist on the server and the newest `new_local` of them
/// are, or will be, stored locally. Returns `None` when the window is
/// already full or there is nothing older to fetch.
///
/// # Example
///
/// ```
/// use mailmirror_sync::resync::backfill_range;
///
/// assert_eq!(backfill_range(60, 45, 50), Some(11..=15));
/// assert_eq!(backfill_range(60, 50, 50), None);
/// ```
#[must_use]
pub fn backfill_range(remote: u32, new_local: u32, limit: u32) -> Option<RangeInclusive<u32>> {
    let missing = limit.checked_sub(new_local).filter(|&n| n > 0)?;
    let end = remote.checked_sub(new_local).filter(|&n| n > 0)?;
    let start = end.saturating_sub(missing - 1).max(1);
    Some(start..=end)
}

/// Drives an incremental resync for one account.
pub struct ResyncCoordinator<'a, L: ?Sized> {
    account: &'a AccountSettings,
    listener: &'a L,
}

impl<'a, L> ResyncCoordinator<'a, L>
where
    L: SyncListener + ?Sized,
{
    /// Creates a coordinator reporting to `listener`.
    pub const fn new(account: &'a AccountSettings, listener: &'a L) -> Self {
        Self { account, listener }
    }

    /// Applies `bootstrap` to `store` and works out what to download.
    ///
    /// `expunged` holds UIDs the client already knows were removed
    /// remotely; they are merged with the server's vanished set.
    ///
    /// # Errors
    ///
    /// Store errors, and session errors from the backfill search.
    pub async fn continue_sync<R, S>(
        &self,
        remote: &mut R,
        store: &mut S,
        bootstrap: &ResyncBootstrap,
        expunged: &[String],
    ) -> Result<ResyncOutcome>
    where
        R: RemoteFolder,
        S: LocalMailStore + ?Sized,
    {
        let folder = store.folder_name().to_string();
        let mut outcome = ResyncOutcome::default();

        if self.account.sync_remote_deletions {
            let merged: BTreeSet<String> = expunged
                .iter()
                .cloned()
                .chain(bootstrap.vanished.iter().map(ToString::to_string))
                .collect();
            let merged: Vec<String> = merged.into_iter().collect();
            outcome.deleted = store.delete_uids(&merged)?;
            debug!(
                folder = %folder,
                vanished = merged.len(),
                removed = outcome.deleted,
                "Applied deletions"
            );
        }

        self.listener.headers_started(&folder);
        self.apply_changes(store, bootstrap, &mut outcome)?;

        let new_count = u32::try_from(outcome.to_download.len()).unwrap_or(u32::MAX);
        outcome.local_count = store.message_count().saturating_add(new_count);
        let remote_count = remote.remote_count().unwrap_or(0);
        let limit = store.visible_limit();
        if remote_count >= limit && remote_count >= outcome.local_count {
            self.backfill(remote, &folder, remote_count, limit, &mut outcome)
                .await?;
        }

        let queued = outcome.to_download.len();
        self.listener.headers_finished(&folder, queued, queued);
        info!(
            folder = %folder,
            queued,
            backfill = outcome.backfill,
            flag_updates = outcome.flag_updates,
            "Resync diff applied"
        );
        Ok(outcome)
    }

    fn apply_changes<S>(
        &self,
        store: &mut S,
        bootstrap: &ResyncBootstrap,
        outcome: &mut ResyncOutcome,
    ) -> Result<()>
    where
        S: LocalMailStore + ?Sized,
    {
        let folder = store.folder_name().to_string();
        let smallest = store.smallest_uid().unwrap_or(1);
        let total = bootstrap.changed.len();
        let mut flag_syncs = Vec::new();
        let mut done = 0;

        for fetched in &bootstrap.changed {
            let Some(message) = RemoteMessage::from_fetched(fetched) else {
                trace!(folder = %folder, seq = %fetched.seq, "Changed row without UID");
                continue;
            };
            match decision::evaluate(store, self.listener, &message)? {
                SyncDecision::NewUnsynced => outcome.to_download.extend(message.numeric_uid()),
                SyncDecision::FlagSyncOnly => flag_syncs.push(message),
                SyncDecision::Promoted | SyncDecision::Ignore => {}
            }
        }

        for message in flag_syncs {
            if message.numeric_uid().is_some_and(|uid| uid.get() < smallest) {
                trace!(folder = %folder, uid = %message.uid, "Stale flag update skipped");
                continue;
            }
            if store.apply_remote_flags(&message)? {
                outcome.flag_updates += 1;
            }
            done += 1;
            self.listener.progress(&folder, done, total);
        }
        debug!(
            folder = %folder,
            changed = total,
            new = outcome.to_download.len(),
            flag_updates = outcome.flag_updates,
            "Classified changed messages"
        );
        Ok(())
    }

    async fn backfill<R>(
        &self,
        remote: &mut R,
        folder: &str,
        remote_count: u32,
        limit: u32,
        outcome: &mut ResyncOutcome,
    ) -> Result<()>
    where
        R: RemoteFolder,
    {
        let Some(range) = backfill_range(remote_count, outcome.local_count, limit) else {
            debug!(folder, remote_count, local = outcome.local_count, "No backfill needed");
            return Ok(());
        };
        let older = remote
            .list_range(*range.start(), *range.end(), self.account.earliest_poll_date)
            .await?;
        debug!(folder, start = range.start(), end = range.end(), found = older.len(), "Backfill");

        let total = older.len();
        for (i, uid) in older.into_iter().enumerate() {
            self.listener.headers_progress(folder, i + 1, total);
            outcome.to_download.push(uid);
        }
        outcome.backfill = total;
        Ok(())
    }

    /// Downloads the queued messages and stores them.
    ///
    /// A message already stored without a body keeps its local copy; only
    /// its flags and download state are updated.
    ///
    /// Returns the UIDs that passed the notification gate. The folder's
    /// last notified UID and push state advance to the newest UID stored.
    ///
    /// # Errors
    ///
    /// Session and store errors.
    pub async fn download_queued<R, S, C>(
        &self,
        remote: &mut R,
        store: &mut S,
        outcome: &ResyncOutcome,
        profile: &FetchProfile,
        contacts: &C,
    ) -> Result<Vec<String>>
    where
        R: RemoteFolder,
        S: LocalMailStore + ?Sized,
        C: ContactDirectory + ?Sized,
    {
        let folder = NotifyFolder::from_store(store);
        let mut notified = Vec::new();
        if outcome.to_download.is_empty() {
            self.listener.finished(&folder.name, count(store), 0);
            return Ok(notified);
        }

        let fetched = remote.fetch_messages(&outcome.to_download, profile).await?;
        let mut newest: Option<Uid> = None;
        for row in &fetched {
            let Some(mut message) = RemoteMessage::from_fetched(row) else {
                continue;
            };
            if message.download == DownloadState::NotDownloaded {
                message.download = DownloadState::Partial;
            }
            if store.message(&message.uid)?.is_some() {
                store.apply_remote_flags(&message)?;
                store.set_download_state(&message.uid, message.download)?;
            } else {
                store.append(LocalMessage::from_remote(&message))?;
            }
            if should_notify(self.account, &folder, &message, contacts) {
                self.listener.new_message(&folder.name, &message.uid);
                notified.push(message.uid.clone());
            }
            newest = newest.max(message.numeric_uid());
        }

        if let Some(uid) = newest {
            if folder.last_uid.is_none_or(|last| uid.get() > last) {
                store.set_last_uid(uid.get())?;
            }
            if let Some(state) = new_push_state(store.push_state().as_deref(), uid) {
                store.set_push_state(state)?;
            }
        }

        info!(
            folder = %folder.name,
            fetched = fetched.len(),
            notified = notified.len(),
            "Downloaded queued messages"
        );
        self.listener.finished(&folder.name, count(store), notified.len());
        Ok(notified)
    }

    /// Makes sure a required special folder exists remotely.
    ///
    /// Trash, sent and drafts are created on demand. When that fails the
    /// folder's sync is reported finished with nothing done and `false` is
    /// returned. Other folders always pass.
    ///
    /// # Errors
    ///
    /// Session errors other than a refused CREATE.
    pub async fn verify_special_folder<R>(&self, remote: &mut R) -> Result<bool>
    where
        R: RemoteFolder,
    {
        let name = remote.name().to_string();
        if !self.account.folders.is_required(&name) {
            return Ok(true);
        }
        if remote.folder_exists().await? {
            return Ok(true);
        }
        if remote.create_folder().await? {
            info!(folder = %name, "Created special folder");
            return Ok(true);
        }
        warn!(folder = %name, "Special folder missing and could not be created");
        self.listener.finished(&name, 0, 0);
        Ok(false)
    }
}

fn count<S: LocalMailStore + ?Sized>(store: &S) -> usize {
    usize::try_from(store.message_count()).unwrap_or(usize::MAX)
}
