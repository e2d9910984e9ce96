//! # mailmirror-imap
//!
//! Protocol half of the mailmirror synchronization core: a folder session
//! that selects a remote IMAP folder, negotiates CONDSTORE/QRESYNC, runs
//! commands and keeps folder metadata current from every untagged
//! response.
//!
//! ## Features
//!
//! - **Folder sessions**: one connection per folder, drawn from a shared
//!   [`ConnectionPool`] and returned on close
//! - **Incremental resync**: QRESYNC selection returns the expunged UIDs
//!   and changed messages inline as a [`ResyncBootstrap`]
//! - **Windowed fetch**: UID sets split into fixed-size `UID FETCH` windows
//! - **Mutations**: APPEND with literal streaming, COPY/MOVE/delete-to-trash,
//!   flag STORE, EXPUNGE
//! - **Sans-I/O parser**: protocol parsing separated from network I/O
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use mailmirror_imap::{
//!     Connection, FetchPart, FetchProfile, FolderSession, OpenMode, QueuePool, SessionConfig,
//! };
//!
//! // `stream` is an authenticated AsyncRead + AsyncWrite transport.
//! let pool = Arc::new(QueuePool::new([Connection::new(stream, capabilities)]));
//! let mut inbox = FolderSession::new(pool, "INBOX", SessionConfig::new());
//!
//! inbox.select(OpenMode::ReadOnly, None).await?;
//! let newest = inbox.highest_uid().await?;
//! let profile = FetchProfile::new().with(FetchPart::Flags).with(FetchPart::Envelope);
//! let messages = inbox.fetch(&newest.into_iter().collect::<Vec<_>>(), &profile).await?;
//! inbox.close().await;
//! ```
//!
//! ## Modules
//!
//! - [`command`]: command values and their wire form
//! - [`connection`]: framed transport, connections, pool and configuration
//! - [`fetch`]: fetch profiles, windows and fetched rows
//! - [`mime`]: body structure decoding
//! - [`parser`]: sans-I/O response parser
//! - [`push_state`]: persisted UID watermark
//! - [`qresync`]: CONDSTORE/QRESYNC types
//! - [`session`]: the folder session
//! - [`types`]: identifiers, flags, sets and response codes

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod fetch;
pub mod mime;
pub mod parser;
pub mod push_state;
pub mod qresync;
pub mod session;
pub mod types;

pub use command::{Command, FetchAttribute, SearchCriteria, StoreAction, TagGenerator};
pub use connection::{Connection, ConnectionPool, FramedStream, QueuePool, SessionConfig};
pub use error::{Error, ErrorKind, Result};
pub use fetch::{FetchPart, FetchProfile, FetchedMessage};
pub use mime::MimePart;
pub use parser::{Response, ResponseParser, UntaggedResponse};
pub use push_state::{PushState, new_push_state};
pub use qresync::{ModSeq, ResyncBootstrap, ResyncCheckpoint};
pub use session::{AppendMessage, FolderSelection, FolderSession};
pub use types::{
    Capability, Flag, Flags, Mailbox, OpenMode, ResponseCode, SeqNum, SequenceSet, Status, Tag,
    Uid, UidSet, UidValidity,
};
