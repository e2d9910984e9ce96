//! Folder session: one remote folder bound to at most one connection.
//!
//! A [`FolderSession`] draws a connection from a shared
//! [`ConnectionPool`], selects its folder and runs commands on it one at a
//! time. Every untagged response read along the way is applied to the
//! [`FolderSelection`] before the command that was in flight sees it.
//!
//! Any I/O failure closes the bound connection and resets the selection;
//! reopening is up to the caller.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mailmirror_imap::{FolderSession, OpenMode, QueuePool, SessionConfig};
//!
//! let pool = Arc::new(QueuePool::new([connection]));
//! let mut inbox = FolderSession::new(pool, "INBOX", SessionConfig::new());
//! let bootstrap = inbox.select(OpenMode::ReadOnly, checkpoint).await?;
//! println!("{:?} messages", inbox.message_count());
//! inbox.close().await;
//! ```

mod exchange;
mod messages;
mod search;
mod selection;
mod slot;

use std::sync::Arc;

use tracing::{debug, info, warn};

pub use exchange::Completion;
pub use messages::AppendMessage;
pub use search::build_search_criteria;
pub use selection::FolderSelection;
pub use slot::ConnectionSlot;

use crate::command::{Command, SelectModifier, StatusAttribute};
use crate::connection::{ConnectionPool, SessionConfig};
use crate::fetch::FetchedMessage;
use crate::parser::UntaggedResponse;
use crate::qresync::{ModSeq, ResyncBootstrap, ResyncCheckpoint};
use crate::types::{Flag, Mailbox, OpenMode, ResponseCode, Uid, UidValidity};
use crate::{Error, Result};

use exchange::exchange;

/// Protocol session for a single remote folder.
pub struct FolderSession<P: ConnectionPool> {
    pool: Arc<P>,
    mailbox: Mailbox,
    config: SessionConfig,
    slot: ConnectionSlot<P::Stream>,
    selection: FolderSelection,
    in_search: bool,
}

impl<P: ConnectionPool> std::fmt::Debug for FolderSession<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderSession")
            .field("mailbox", &self.mailbox)
            .field("bound", &self.slot.is_bound())
            .field("selection", &self.selection)
            .field("in_search", &self.in_search)
            .finish_non_exhaustive()
    }
}

impl<P: ConnectionPool> FolderSession<P> {
    /// Creates a closed session for `name`.
    pub fn new(pool: Arc<P>, name: impl Into<String>, config: SessionConfig) -> Self {
        Self {
            pool,
            mailbox: Mailbox::new(name),
            config,
            slot: ConnectionSlot::Unbound,
            selection: FolderSelection::default(),
            in_search: false,
        }
    }

    /// Folder name.
    #[must_use]
    pub const fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// True while a connection is bound and the folder is selected.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.slot.is_bound() && self.selection.mode().is_some()
    }

    /// Granted open mode.
    #[must_use]
    pub const fn mode(&self) -> Option<OpenMode> {
        self.selection.mode()
    }

    /// Current message count; `None` when closed.
    #[must_use]
    pub const fn message_count(&self) -> Option<u32> {
        self.selection.message_count()
    }

    /// UIDVALIDITY of the current selection.
    #[must_use]
    pub const fn uid_validity(&self) -> Option<UidValidity> {
        self.selection.uid_validity()
    }

    /// HIGHESTMODSEQ of the current selection.
    #[must_use]
    pub const fn highest_mod_seq(&self) -> Option<ModSeq> {
        self.selection.highest_mod_seq()
    }

    /// UIDNEXT hint of the current selection.
    #[must_use]
    pub const fn uid_next(&self) -> Option<Uid> {
        self.selection.uid_next()
    }

    /// True when the folder accepts new keywords.
    #[must_use]
    pub const fn can_create_keywords(&self) -> bool {
        self.selection.can_create_keywords()
    }

    /// UID cached for a sequence number of this selection.
    #[must_use]
    pub fn uid_for_sequence(&self, seq: u32) -> Option<Uid> {
        self.selection.uid_for_sequence(seq)
    }

    /// Full selection state.
    #[must_use]
    pub const fn selection(&self) -> &FolderSelection {
        &self.selection
    }

    /// True while a remote search is in flight.
    #[must_use]
    pub const fn in_search(&self) -> bool {
        self.in_search
    }

    /// Selects the folder in `mode`.
    ///
    /// Re-selecting in the mode already granted only sends a NOOP; if that
    /// loses the connection a fresh selection follows. Otherwise the bound
    /// connection goes back to the pool, a new one is acquired and the
    /// strongest supported variant is used: QRESYNC with `checkpoint`, then
    /// CONDSTORE, then plain.
    ///
    /// Returns the inline diff when the server resumed from `checkpoint`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] when the server did not report a message
    /// count. I/O and negative replies propagate.
    pub async fn select(
        &mut self,
        mode: OpenMode,
        checkpoint: Option<ResyncCheckpoint>,
    ) -> Result<Option<ResyncBootstrap>> {
        if self.is_open() && self.selection.mode() == Some(mode) {
            match self.run(&Command::Noop, None).await {
                Ok(_) => return Ok(None),
                Err(e) if e.closes_connection() => {
                    debug!(mailbox = %self.mailbox, error = %e, "Liveness check failed, reselecting");
                }
                Err(e) => return Err(e),
            }
        }

        self.unbind().await;
        self.selection.reset();
        let conn = self.pool.acquire().await?;
        self.slot.bind(conn);

        let modifier = self.negotiate(checkpoint).await?;
        let resumed = matches!(modifier, SelectModifier::QResync(_));
        let command = Command::Select {
            mailbox: self.mailbox.clone(),
            mode,
            modifier,
        };
        let completion = match self.run(&command, None).await {
            Ok(completion) => completion,
            Err(e) => {
                self.selection.reset();
                return Err(e);
            }
        };

        let granted = match completion.code {
            Some(ResponseCode::ReadOnly) => Some(OpenMode::ReadOnly),
            Some(ResponseCode::ReadWrite) => Some(OpenMode::ReadWrite),
            _ => None,
        };
        self.selection.complete(mode, granted);
        if self.selection.message_count().is_none() {
            self.selection.reset();
            return Err(Error::InvalidState(format!(
                "no message count after selecting {}",
                self.mailbox
            )));
        }
        info!(
            mailbox = %self.mailbox,
            mode = ?self.selection.mode(),
            count = self.selection.message_count(),
            uid_validity = self.selection.uid_validity().map(UidValidity::get),
            highest_mod_seq = self.selection.highest_mod_seq().map(ModSeq::get),
            "Folder selected"
        );

        let Some(checkpoint) = checkpoint.filter(|_| resumed) else {
            return Ok(None);
        };
        if !checkpoint.is_valid_for(self.selection.uid_validity()) {
            warn!(
                mailbox = %self.mailbox,
                cached = checkpoint.uid_validity.get(),
                current = self.selection.uid_validity().map(UidValidity::get),
                "UIDVALIDITY changed, checkpoint discarded"
            );
            return Ok(None);
        }
        Ok(Some(bootstrap_from(completion.untagged)))
    }

    /// Releases the folder.
    ///
    /// The connection returns to the pool, unless a search was interrupted
    /// on it, in which case it is closed.
    pub async fn close(&mut self) {
        self.selection.reset();
        self.unbind().await;
    }

    /// Checks whether another folder exists, via `STATUS (UIDVALIDITY)`.
    ///
    /// # Errors
    ///
    /// I/O failures and replies other than OK/NO.
    pub async fn exists(&mut self, name: &str) -> Result<bool> {
        let command = Command::Status {
            mailbox: Mailbox::new(name),
            items: vec![StatusAttribute::UidValidity],
        };
        absorb_no(self.run_anywhere(&command).await, name, "STATUS")
    }

    /// Creates another folder. `false` when the server refused.
    ///
    /// # Errors
    ///
    /// I/O failures and replies other than OK/NO.
    pub async fn create(&mut self, name: &str) -> Result<bool> {
        let command = Command::Create {
            mailbox: Mailbox::new(name),
        };
        absorb_no(self.run_anywhere(&command).await, name, "CREATE")
    }

    async fn negotiate(&mut self, checkpoint: Option<ResyncCheckpoint>) -> Result<SelectModifier> {
        let conn = self.slot.get_mut()?;
        let qresync = self.config.use_qresync && conn.supports_qresync();
        let condstore = self.config.use_condstore && conn.supports_condstore();
        let enabled = conn.qresync_enabled();

        if qresync && !enabled {
            self.run(
                &Command::Enable {
                    capabilities: vec!["QRESYNC".into()],
                },
                None,
            )
            .await?;
            self.slot.get_mut()?.set_qresync_enabled();
        }

        Ok(match checkpoint {
            Some(checkpoint) if qresync => SelectModifier::QResync(checkpoint.into()),
            _ if qresync || condstore => SelectModifier::CondStore,
            _ => SelectModifier::None,
        })
    }

    /// Runs a command on the bound connection.
    async fn run(&mut self, command: &Command, literal: Option<&[u8]>) -> Result<Completion> {
        let conn = self.slot.get_mut()?;
        let result = exchange(conn, &mut self.selection, command, literal).await;
        match result {
            Err(e) if e.closes_connection() => {
                self.discard(&e).await;
                Err(e)
            }
            other => other,
        }
    }

    /// Runs a command on the bound connection, or on a borrowed one when
    /// the folder is closed.
    async fn run_anywhere(&mut self, command: &Command) -> Result<Completion> {
        if self.slot.is_bound() {
            return self.run(command, None).await;
        }
        let mut conn = self.pool.acquire().await?;
        let result = exchange(&mut conn, &mut FolderSelection::default(), command, None).await;
        match &result {
            Err(e) if e.closes_connection() => conn.close().await,
            _ => self.pool.release(conn),
        }
        result
    }

    async fn unbind(&mut self) {
        let interrupted = std::mem::take(&mut self.in_search);
        if let Some(conn) = self.slot.take() {
            if interrupted {
                warn!(mailbox = %self.mailbox, "Closing connection left mid-search");
                conn.close().await;
            } else {
                self.pool.release(conn);
            }
        }
    }

    async fn discard(&mut self, cause: &Error) {
        warn!(mailbox = %self.mailbox, error = %cause, "Discarding failed connection");
        self.selection.reset();
        self.in_search = false;
        if let Some(conn) = self.slot.take() {
            conn.close().await;
        }
    }

    /// Fails unless the folder is selected.
    fn require_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(Error::InvalidState(format!("folder {} is not open", self.mailbox)))
        }
    }

    /// Selects read-only when nothing is selected yet.
    async fn ensure_open(&mut self) -> Result<()> {
        if !self.is_open() {
            self.select(OpenMode::ReadOnly, None).await?;
        }
        Ok(())
    }

    /// Selects read-write unless already granted.
    async fn ensure_writable(&mut self) -> Result<()> {
        if self.is_open() && self.selection.mode() == Some(OpenMode::ReadWrite) {
            return Ok(());
        }
        self.select(OpenMode::ReadWrite, None).await?;
        if self.selection.mode() == Some(OpenMode::ReadWrite) {
            Ok(())
        } else {
            Err(Error::InvalidState(format!(
                "folder {} was opened read-only",
                self.mailbox
            )))
        }
    }

    /// Whether `$Forwarded` may be sent to this folder.
    fn forwarded_allowed(&self) -> bool {
        self.selection.can_create_keywords()
            || self.selection.permanent_flags().contains(&Flag::Forwarded)
    }
}

fn absorb_no(result: Result<Completion>, name: &str, verb: &str) -> Result<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(Error::No(text)) => {
            debug!(mailbox = name, verb, reply = %text, "Negative reply");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

fn bootstrap_from(untagged: Vec<UntaggedResponse>) -> ResyncBootstrap {
    let mut bootstrap = ResyncBootstrap::default();
    for response in untagged {
        match response {
            UntaggedResponse::Vanished { earlier: true, uids } => bootstrap.vanished.extend(uids),
            UntaggedResponse::Fetch { seq, items } => {
                bootstrap.changed.push(FetchedMessage::from_items(seq, items));
            }
            _ => {}
        }
    }
    debug!(
        vanished = bootstrap.vanished.len(),
        changed = bootstrap.changed.len(),
        "Resync bootstrap"
    );
    bootstrap
}
