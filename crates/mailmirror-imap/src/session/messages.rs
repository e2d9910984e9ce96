//! Message transfer and mutation on a selected folder.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use super::FolderSession;
use crate::command::{Command, FetchAttribute, SearchCriteria, StoreAction};
use crate::connection::{ConnectionPool, normalize_crlf};
use crate::fetch::{FetchProfile, FetchedMessage, fetch_windows};
use crate::parser::UntaggedResponse;
use crate::qresync::ModSeq;
use crate::types::{Flag, Mailbox, ResponseCode, Uid, UidSet};
use crate::{Error, Result};

/// A message to upload with APPEND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendMessage {
    /// Raw RFC 5322 bytes; line endings are normalized on upload.
    pub content: Vec<u8>,
    /// Local flags. Only storable ones are sent.
    pub flags: Vec<Flag>,
}

impl AppendMessage {
    /// Creates a message with no flags.
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            flags: Vec::new(),
        }
    }

    /// Adds flags.
    #[must_use]
    pub fn with_flags(mut self, flags: impl IntoIterator<Item = Flag>) -> Self {
        self.flags.extend(flags);
        self
    }
}

impl<P: ConnectionPool> FolderSession<P> {
    /// Fetches `uids` in windows of [`SessionConfig::window_size`](crate::SessionConfig).
    ///
    /// Only rows for requested UIDs are returned; other rows still update
    /// the sequence cache.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] when the folder is not open. An I/O failure
    /// aborts the remaining windows.
    pub async fn fetch(&mut self, uids: &[Uid], profile: &FetchProfile) -> Result<Vec<FetchedMessage>> {
        let items = profile.attributes(self.config.max_download_size);
        self.fetch_windowed(uids, &items, None).await
    }

    /// Fetches flags of `uids` changed after `since` (CONDSTORE).
    ///
    /// # Errors
    ///
    /// As for [`fetch`](Self::fetch).
    pub async fn fetch_changed_flags(
        &mut self,
        uids: &[Uid],
        since: ModSeq,
    ) -> Result<Vec<FetchedMessage>> {
        let items = [FetchAttribute::Uid, FetchAttribute::Flags];
        self.fetch_windowed(uids, &items, Some(since.get())).await
    }

    async fn fetch_windowed(
        &mut self,
        uids: &[Uid],
        items: &[FetchAttribute],
        changed_since: Option<u64>,
    ) -> Result<Vec<FetchedMessage>> {
        self.require_open()?;
        let windows = fetch_windows(uids, self.config.window_size);
        let mut messages = Vec::with_capacity(uids.len());
        for (i, window) in windows.iter().enumerate() {
            let Some(set) = UidSet::from_uids(window) else {
                continue;
            };
            let command = Command::UidFetch {
                uids: set,
                items: items.to_vec(),
                changed_since,
            };
            let completion = self.run(&command, None).await?;
            let wanted: HashSet<Uid> = window.iter().copied().collect();
            for response in completion.untagged {
                let UntaggedResponse::Fetch { seq, items: row } = response else {
                    continue;
                };
                let message = FetchedMessage::from_items(seq, row);
                if message.uid.is_some_and(|uid| wanted.contains(&uid)) {
                    messages.push(message);
                } else {
                    trace!(seq = seq.get(), "Unsolicited FETCH row");
                }
            }
            debug!(
                window = i + 1,
                windows = windows.len(),
                fetched = messages.len(),
                "Fetch window complete"
            );
        }
        Ok(messages)
    }

    /// Uploads messages, returning the UID assigned to each.
    ///
    /// The UID comes from `APPENDUID` when offered, otherwise from a
    /// `Message-ID` search, which may find nothing.
    ///
    /// # Errors
    ///
    /// An I/O failure aborts the remaining messages. A negative reply
    /// propagates.
    pub async fn append(&mut self, messages: &[AppendMessage]) -> Result<Vec<Option<Uid>>> {
        self.ensure_writable().await?;
        let mut uids = Vec::with_capacity(messages.len());
        for message in messages {
            let content = normalize_crlf(&message.content);
            let command = Command::Append {
                mailbox: self.mailbox.clone(),
                flags: self.storable(&message.flags),
                size: content.len(),
            };
            let completion = self.run(&command, Some(content.as_slice())).await?;
            let uid = match completion.code {
                Some(ResponseCode::AppendUid { uid, .. }) => Some(uid),
                _ => match message_id_header(&content) {
                    Some(id) => {
                        debug!(message_id = %id, "No APPENDUID, searching by Message-ID");
                        self.uid_by_message_id(&id).await?
                    }
                    None => None,
                },
            };
            uids.push(uid);
        }
        Ok(uids)
    }

    async fn uid_by_message_id(&mut self, message_id: &str) -> Result<Option<Uid>> {
        let command = Command::UidSearch {
            criteria: SearchCriteria::Header("MESSAGE-ID".into(), message_id.into()),
        };
        match self.run(&command, None).await {
            Ok(completion) => Ok(completion.search_results().into_iter().find_map(Uid::new)),
            Err(Error::No(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Copies `uids` to `destination`, creating it when missing.
    ///
    /// Returns the source to destination mapping when the server reports
    /// `COPYUID`, otherwise an empty map.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] when the folder is not open; I/O failures and
    /// negative replies to the copy.
    pub async fn copy(&mut self, uids: &[Uid], destination: &str) -> Result<HashMap<Uid, Uid>> {
        self.require_open()?;
        let Some(set) = UidSet::from_uids(uids) else {
            return Ok(HashMap::new());
        };
        if !self.exists(destination).await? {
            debug!(destination, "Creating copy destination");
            self.create(destination).await?;
        }
        let completion = self
            .run(
                &Command::UidCopy {
                    uids: set,
                    mailbox: Mailbox::new(destination),
                },
                None,
            )
            .await?;
        Ok(completion
            .code
            .as_ref()
            .and_then(ResponseCode::copy_mapping)
            .unwrap_or_default())
    }

    /// Copies `uids` to `destination`, then marks them `\Deleted` here.
    ///
    /// # Errors
    ///
    /// As for [`copy`](Self::copy) and [`set_flags`](Self::set_flags).
    pub async fn move_messages(
        &mut self,
        uids: &[Uid],
        destination: &str,
    ) -> Result<HashMap<Uid, Uid>> {
        let mapping = self.copy(uids, destination).await?;
        self.set_flags(uids, &[Flag::Deleted], true).await?;
        Ok(mapping)
    }

    /// Deletes `uids`, moving them to `trash` unless this folder is the trash.
    ///
    /// # Errors
    ///
    /// [`Error::Protocol`] when the trash folder is missing and could not
    /// be created. Other failures as for [`move_messages`](Self::move_messages).
    pub async fn delete(&mut self, uids: &[Uid], trash: Option<&str>) -> Result<()> {
        let trash = match trash {
            Some(name) if !self.mailbox.same_as(name) => name,
            _ => return self.set_flags(uids, &[Flag::Deleted], true).await,
        };
        if !self.exists(trash).await? && !self.create(trash).await? && !self.exists(trash).await? {
            return Err(Error::Protocol(format!(
                "trash folder {trash} does not exist and could not be created"
            )));
        }
        self.move_messages(uids, trash).await?;
        Ok(())
    }

    /// Adds or removes flags on `uids`.
    ///
    /// Opens the folder read-write when needed. Flags the folder cannot
    /// store are dropped.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] when the server grants only read-only access.
    pub async fn set_flags(&mut self, uids: &[Uid], flags: &[Flag], value: bool) -> Result<()> {
        self.ensure_writable().await?;
        match UidSet::from_uids(uids) {
            Some(set) => self.store(set, flags, value).await,
            None => Ok(()),
        }
    }

    /// Adds or removes flags on every message.
    ///
    /// # Errors
    ///
    /// As for [`set_flags`](Self::set_flags).
    pub async fn set_flags_all(&mut self, flags: &[Flag], value: bool) -> Result<()> {
        self.ensure_writable().await?;
        self.store(UidSet::All, flags, value).await
    }

    async fn store(&mut self, uids: UidSet, flags: &[Flag], value: bool) -> Result<()> {
        let flags = self.storable(flags);
        if flags.is_empty() {
            return Ok(());
        }
        let action = if value {
            StoreAction::AddFlags(flags)
        } else {
            StoreAction::RemoveFlags(flags)
        };
        self.run(
            &Command::UidStore {
                uids,
                action,
                silent: true,
            },
            None,
        )
        .await?;
        Ok(())
    }

    /// Permanently removes messages marked `\Deleted`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] when the folder cannot be opened read-write.
    pub async fn expunge(&mut self) -> Result<()> {
        self.ensure_writable().await?;
        self.run(&Command::Expunge, None).await?;
        Ok(())
    }

    /// Expunges with QRESYNC enabled, returning the UIDs reported as
    /// `VANISHED`.
    ///
    /// # Errors
    ///
    /// As for [`expunge`](Self::expunge).
    pub async fn expunge_using_qresync(&mut self) -> Result<Vec<Uid>> {
        self.ensure_writable().await?;
        let completion = self.run(&Command::Expunge, None).await?;
        let vanished: Vec<Uid> = completion
            .untagged
            .into_iter()
            .filter_map(|response| match response {
                UntaggedResponse::Vanished { uids, .. } => Some(uids),
                _ => None,
            })
            .flatten()
            .collect();
        debug!(
            vanished = vanished.len(),
            highest_mod_seq = self.selection.highest_mod_seq().map(ModSeq::get),
            "Expunged"
        );
        Ok(vanished)
    }

    fn storable(&self, flags: &[Flag]) -> Vec<Flag> {
        let forwarded = self.forwarded_allowed();
        flags
            .iter()
            .filter(|flag| flag.is_storable(forwarded))
            .cloned()
            .collect()
    }
}

/// Value of the first `Message-ID` header, unfolded and trimmed.
fn message_id_header(content: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(content);
    let mut lines = text.split("\r\n").take_while(|line| !line.is_empty()).peekable();
    while let Some(line) = lines.next() {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if !name.eq_ignore_ascii_case("message-id") {
            continue;
        }
        let mut value = value.trim().to_string();
        while let Some(cont) = lines.next_if(|l| l.starts_with([' ', '\t'])) {
            value.push_str(cont.trim());
        }
        return (!value.is_empty()).then_some(value);
    }
    None
}
