//! Sync progress listeners.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, info};

/// Receiver for sync progress. Every method defaults to a no-op.
pub trait SyncListener: Send + Sync {
    /// Header phase started.
    fn headers_started(&self, _folder: &str) {}

    /// One header fetched during backfill.
    fn headers_progress(&self, _folder: &str, _done: usize, _total: usize) {}

    /// Header phase finished.
    fn headers_finished(&self, _folder: &str, _done: usize, _total: usize) {}

    /// One changed message processed.
    fn progress(&self, _folder: &str, _done: usize, _total: usize) {}

    /// A new unread message was stored.
    fn new_message(&self, _folder: &str, _uid: &str) {}

    /// Folder sync finished.
    fn finished(&self, _folder: &str, _total: usize, _new: usize) {}
}

/// A recorded listener call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// See [`SyncListener::headers_started`].
    HeadersStarted {
        /// Folder name.
        folder: String,
    },
    /// See [`SyncListener::headers_progress`].
    HeadersProgress {
        /// Folder name.
        folder: String,
        /// Headers done.
        done: usize,
        /// Headers expected.
        total: usize,
    },
    /// See [`SyncListener::headers_finished`].
    HeadersFinished {
        /// Folder name.
        folder: String,
        /// Headers done.
        done: usize,
        /// Headers expected.
        total: usize,
    },
    /// See [`SyncListener::progress`].
    Progress {
        /// Folder name.
        folder: String,
        /// Messages done.
        done: usize,
        /// Messages expected.
        total: usize,
    },
    /// See [`SyncListener::new_message`].
    NewMessage {
        /// Folder name.
        folder: String,
        /// Message UID.
        uid: String,
    },
    /// See [`SyncListener::finished`].
    Finished {
        /// Folder name.
        folder: String,
        /// Messages in the folder.
        total: usize,
        /// New messages.
        new: usize,
    },
}

/// Listener that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl SyncListener for NoopListener {}

/// Listener that forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingListener;

impl SyncListener for LoggingListener {
    fn headers_started(&self, folder: &str) {
        debug!(folder, "Header sync started");
    }

    fn headers_progress(&self, folder: &str, done: usize, total: usize) {
        debug!(folder, done, total, "Header progress");
    }

    fn headers_finished(&self, folder: &str, done: usize, total: usize) {
        debug!(folder, done, total, "Header sync finished");
    }

    fn progress(&self, folder: &str, done: usize, total: usize) {
        debug!(folder, done, total, "Sync progress");
    }

    fn new_message(&self, folder: &str, uid: &str) {
        info!(folder, uid, "New message");
    }

    fn finished(&self, folder: &str, total: usize, new: usize) {
        info!(folder, total, new, "Folder sync finished");
    }
}

/// Listener that records every event, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct CollectingListener {
    events: Mutex<Vec<SyncEvent>>,
}

impl CollectingListener {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far.
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, event: SyncEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl SyncListener for CollectingListener {
    fn headers_started(&self, folder: &str) {
        self.push(SyncEvent::HeadersStarted {
            folder: folder.to_string(),
        });
    }

    fn headers_progress(&self, folder: &str, done: usize, total: usize) {
        self.push(SyncEvent::HeadersProgress {
            folder: folder.to_string(),
            done,
            total,
        });
    }

    fn headers_finished(&self, folder: &str, done: usize, total: usize) {
        self.push(SyncEvent::HeadersFinished {
            folder: folder.to_string(),
            done,
            total,
        });
    }

    fn progress(&self, folder: &str, done: usize, total: usize) {
        self.push(SyncEvent::Progress {
            folder: folder.to_string(),
            done,
            total,
        });
    }

    fn new_message(&self, folder: &str, uid: &str) {
        self.push(SyncEvent::NewMessage {
            folder: folder.to_string(),
            uid: uid.to_string(),
        });
    }

    fn finished(&self, folder: &str, total: usize, new: usize) {
        self.push(SyncEvent::Finished {
            folder: folder.to_string(),
            total,
            new,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_keeps_order() {
        let listener = CollectingListener::new();
        listener.headers_started("INBOX");
        listener.new_message("INBOX", "7");
        listener.finished("INBOX", 0, 0);

        assert_eq!(
            listener.events(),
            vec![
                SyncEvent::HeadersStarted {
                    folder: "INBOX".into()
                },
                SyncEvent::NewMessage {
                    folder: "INBOX".into(),
                    uid: "7".into()
                },
                SyncEvent::Finished {
                    folder: "INBOX".into(),
                    total: 0,
                    new: 0
                },
            ]
        );
    }

    #[test]
    fn noop_accepts_everything() {
        let listener = NoopListener;
        listener.progress("INBOX", 1, 2);
        listener.headers_finished("INBOX", 0, 0);
    }
}
