//! # mailmirror-sync
//!
//! Reconciliation half of the mailmirror synchronization core.
//!
//! This crate provides:
//! - **Incremental resync**: applies a QRESYNC bootstrap to the local store
//!   and backfills older messages up to the folder's visible limit
//! - **Download decisions**: classifies each remote message against its
//!   local copy
//! - **Notification gate**: ordered checks deciding whether new mail is
//!   announced
//! - **Account settings**: JSON-loadable notification and folder policy
//! - **Collaborators**: local store, listener and contact directory traits
//!   with in-memory implementations
//!
//! ## Example
//!
//! ```ignore
//! use mailmirror_sync::{
//!     AccountSettings, ContactBook, LoggingListener, MemoryStore, ResyncCoordinator,
//! };
//!
//! let account = AccountSettings::from_json(&settings_json)?;
//! let mut store = MemoryStore::new("INBOX");
//! let coordinator = ResyncCoordinator::new(&account, &LoggingListener);
//!
//! if let Some(bootstrap) = inbox.select(OpenMode::ReadOnly, Some(checkpoint)).await? {
//!     let outcome = coordinator.continue_sync(&mut inbox, &mut store, &bootstrap, &[]).await?;
//!     let notified = coordinator
//!         .download_queued(&mut inbox, &mut store, &outcome, &profile, &ContactBook::new())
//!         .await?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod contacts;
pub mod decision;
mod error;
pub mod listener;
pub mod model;
pub mod notify;
pub mod remote;
pub mod resync;
pub mod store;

pub use account::{
    AccountSettings, FolderClass, FolderMode, SpecialFolders, StoreKind, ValidationError,
    ValidationResult, validate_settings,
};
pub use contacts::{Contact, ContactBook, ContactDirectory};
pub use decision::{SyncDecision, classify, evaluate};
pub use error::{Error, Result};
pub use listener::{CollectingListener, LoggingListener, NoopListener, SyncEvent, SyncListener};
pub use model::{DownloadState, LocalMessage, RemoteMessage};
pub use notify::{NotifyBlock, NotifyFolder, check_notification, should_notify};
pub use remote::RemoteFolder;
pub use resync::{ResyncCoordinator, ResyncOutcome, backfill_range};
pub use store::{LocalMailStore, MemoryStore};
