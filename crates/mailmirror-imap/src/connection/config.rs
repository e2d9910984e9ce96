//! Folder session configuration.

use crate::fetch::DEFAULT_WINDOW_SIZE;

/// Window used when probing for older messages.
pub const DEFAULT_MORE_MESSAGES_WINDOW: u32 = 500;

/// Tunables for a [`FolderSession`](crate::FolderSession).
///
/// # Example
///
/// ```
/// use mailmirror_imap::SessionConfig;
///
/// let config = SessionConfig::new()
///     .window_size(50)
///     .use_qresync(false)
///     .max_download_size(64 * 1024);
/// assert_eq!(config.window_size, 50);
/// assert!(config.use_condstore);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// UIDs per `UID FETCH` window.
    pub window_size: usize,
    /// Sequence window for [`are_more_messages_available`](crate::FolderSession::are_more_messages_available).
    pub more_messages_window: u32,
    /// Negotiate QRESYNC when the server offers it.
    pub use_qresync: bool,
    /// Negotiate CONDSTORE when the server offers it.
    pub use_condstore: bool,
    /// Whether remote search is permitted at all.
    pub allow_remote_search: bool,
    /// Search body text instead of subject and sender.
    pub remote_search_full_text: bool,
    /// Partial fetch limit for sane bodies; zero means unlimited.
    pub max_download_size: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            more_messages_window: DEFAULT_MORE_MESSAGES_WINDOW,
            use_qresync: true,
            use_condstore: true,
            allow_remote_search: false,
            remote_search_full_text: false,
            max_download_size: 0,
        }
    }
}

impl SessionConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fetch window size. Zero is raised to one.
    #[must_use]
    pub fn window_size(mut self, size: usize) -> Self {
        self.window_size = size.max(1);
        self
    }

    /// Sets the older-message scan window. Zero is raised to one.
    #[must_use]
    pub fn more_messages_window(mut self, size: u32) -> Self {
        self.more_messages_window = size.max(1);
        self
    }

    /// Enables or disables QRESYNC.
    #[must_use]
    pub const fn use_qresync(mut self, enabled: bool) -> Self {
        self.use_qresync = enabled;
        self
    }

    /// Enables or disables CONDSTORE.
    #[must_use]
    pub const fn use_condstore(mut self, enabled: bool) -> Self {
        self.use_condstore = enabled;
        self
    }

    /// Permits remote search.
    #[must_use]
    pub const fn allow_remote_search(mut self, enabled: bool) -> Self {
        self.allow_remote_search = enabled;
        self
    }

    /// Searches full text instead of subject and sender.
    #[must_use]
    pub const fn remote_search_full_text(mut self, enabled: bool) -> Self {
        self.remote_search_full_text = enabled;
        self
    }

    /// Sets the partial download limit.
    #[must_use]
    pub const fn max_download_size(mut self, bytes: u32) -> Self {
        self.max_download_size = bytes;
        self
    }
}
