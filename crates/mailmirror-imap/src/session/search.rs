//! Server-side searches on a selected folder.

use chrono::NaiveDate;
use tracing::debug;

use super::FolderSession;
use crate::command::{Command, SearchCriteria};
use crate::connection::ConnectionPool;
use crate::types::{Flag, SequenceSet, Uid};
use crate::{Error, Result};

/// Builds the criteria for a remote search.
///
/// A query matches subject or sender, or the whole text when `full_text`
/// is set. Required flags must be present and forbidden flags absent.
///
/// # Example
///
/// ```
/// use mailmirror_imap::command::SearchCriteria;
/// use mailmirror_imap::session::build_search_criteria;
/// use mailmirror_imap::types::Flag;
///
/// let criteria = build_search_criteria(Some("invoice"), &[], &[Flag::Deleted], false);
/// assert_eq!(
///     criteria,
///     SearchCriteria::And(vec![
///         SearchCriteria::Or(
///             Box::new(SearchCriteria::Subject("invoice".into())),
///             Box::new(SearchCriteria::From("invoice".into())),
///         ),
///         SearchCriteria::NotFlag(Flag::Deleted),
///     ])
/// );
/// ```
#[must_use]
pub fn build_search_criteria(
    query: Option<&str>,
    required: &[Flag],
    forbidden: &[Flag],
    full_text: bool,
) -> SearchCriteria {
    let mut parts = Vec::with_capacity(1 + required.len() + forbidden.len());
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        parts.push(if full_text {
            SearchCriteria::Text(query.to_string())
        } else {
            SearchCriteria::Or(
                Box::new(SearchCriteria::Subject(query.to_string())),
                Box::new(SearchCriteria::From(query.to_string())),
            )
        });
    }
    parts.extend(required.iter().cloned().map(SearchCriteria::Flag));
    parts.extend(forbidden.iter().cloned().map(SearchCriteria::NotFlag));
    SearchCriteria::all_of(parts)
}

impl<P: ConnectionPool> FolderSession<P> {
    /// Searches the folder, returning matching UIDs in server order.
    ///
    /// Opens the folder read-only when closed. If the returned future is
    /// dropped before completion, the connection is closed rather than
    /// pooled on the next [`close`](Self::close).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] when remote search is disabled.
    pub async fn search(
        &mut self,
        query: Option<&str>,
        required: &[Flag],
        forbidden: &[Flag],
    ) -> Result<Vec<Uid>> {
        if !self.config.allow_remote_search {
            return Err(Error::InvalidState("remote search is disabled".into()));
        }
        self.ensure_open().await?;
        let criteria =
            build_search_criteria(query, required, forbidden, self.config.remote_search_full_text);
        self.in_search = true;
        let result = self.uid_search(criteria).await;
        self.in_search = false;
        result
    }

    /// UIDs of messages in the sequence range `start..=end`, newest first.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] when `start < 1`, `end < start` or the folder
    /// is not open.
    pub async fn messages_in_range(
        &mut self,
        start: u32,
        end: u32,
        earliest: Option<NaiveDate>,
        include_deleted: bool,
    ) -> Result<Vec<Uid>> {
        self.require_open()?;
        let range = SequenceSet::range(start, end)
            .filter(|_| end >= start)
            .ok_or_else(|| Error::InvalidState(format!("invalid message range {start}:{end}")))?;
        let mut parts = vec![SearchCriteria::SequenceSet(range)];
        parts.extend(earliest.map(SearchCriteria::Since));
        if !include_deleted {
            parts.push(SearchCriteria::NotFlag(Flag::Deleted));
        }
        let mut uids = self.uid_search(SearchCriteria::all_of(parts)).await?;
        uids.sort_unstable_by(|a, b| b.cmp(a));
        Ok(uids)
    }

    /// True when any non-deleted message exists below sequence number
    /// `oldest_index`.
    ///
    /// Older messages are checked window by window, newest window first.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] when the folder is not open.
    pub async fn are_more_messages_available(
        &mut self,
        oldest_index: u32,
        earliest: Option<NaiveDate>,
    ) -> Result<bool> {
        self.require_open()?;
        let window = self.config.more_messages_window.max(1);
        let mut end = oldest_index.saturating_sub(1);
        while end > 0 {
            let start = end.saturating_sub(window) + 1;
            if !self.messages_in_range(start, end, earliest, false).await?.is_empty() {
                debug!(start, end, "Older messages available");
                return Ok(true);
            }
            end = end.saturating_sub(window);
        }
        Ok(false)
    }

    /// Highest UID in the folder; `None` when empty or refused.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] when the folder is not open.
    pub async fn highest_uid(&mut self) -> Result<Option<Uid>> {
        self.require_open()?;
        match self.uid_search(SearchCriteria::LastMessage).await {
            Ok(uids) => Ok(uids.into_iter().max()),
            Err(Error::No(text)) => {
                debug!(reply = %text, "Highest UID search refused");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Unseen, non-deleted messages.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] when the folder is not open.
    pub async fn unread_count(&mut self) -> Result<usize> {
        self.count(&[], &[Flag::Seen, Flag::Deleted]).await
    }

    /// Flagged, non-deleted messages.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] when the folder is not open.
    pub async fn flagged_count(&mut self) -> Result<usize> {
        self.count(&[Flag::Flagged], &[Flag::Deleted]).await
    }

    async fn count(&mut self, required: &[Flag], forbidden: &[Flag]) -> Result<usize> {
        self.require_open()?;
        let criteria = build_search_criteria(None, required, forbidden, false);
        Ok(self.uid_search(criteria).await?.len())
    }

    async fn uid_search(&mut self, criteria: SearchCriteria) -> Result<Vec<Uid>> {
        let completion = self.run(&Command::UidSearch { criteria }, None).await?;
        Ok(completion
            .search_results()
            .into_iter()
            .filter_map(Uid::new)
            .collect())
    }
}
