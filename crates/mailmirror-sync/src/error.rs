//! Error types for the sync layer.

use thiserror::Error;

/// Errors that can occur while reconciling a folder.
#[derive(Debug, Error)]
pub enum Error {
    /// Protocol session failed.
    #[error("IMAP error: {0}")]
    Imap(#[from] mailmirror_imap::Error),

    /// Local store rejected an update.
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns true if the remote connection was lost.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        match self {
            Self::Imap(e) => e.is_transport(),
            _ => false,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
