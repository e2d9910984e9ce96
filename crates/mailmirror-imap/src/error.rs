//! Error types for the mirror's protocol layer.

use thiserror::Error;

/// Errors that can occur while driving a folder session.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error on the underlying connection.
    ///
    /// Always terminal for the connection that produced it.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed server response.
    #[error("Protocol error at position {position}: {message}")]
    Parse {
        /// Byte position where the error occurred.
        position: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// Server returned NO response.
    #[error("Server returned NO: {0}")]
    No(String),

    /// Server returned BAD response.
    #[error("Server returned BAD: {0}")]
    Bad(String),

    /// Server sent BYE (disconnecting).
    #[error("Server sent BYE: {0}")]
    Bye(String),

    /// Operation attempted on an unselected or wrong-mode folder.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Protocol violation or unexpected data.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The response stream can no longer be framed.
    ///
    /// Part of a response is left unread or the server still waits for
    /// data, so the connection is terminal like an I/O failure.
    #[error("Framing error: {0}")]
    Framing(String),

    /// Message part shape that cannot be decoded.
    #[error("Unsupported body structure: {0}")]
    UnsupportedStructure(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The connection failed and has been discarded.
    Transport,
    /// Negative or malformed server reply; the connection stays usable.
    Protocol,
    /// Caller misuse, never retried.
    State,
    /// One message's body could not be decoded.
    UnsupportedStructure,
}

impl Error {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::Framing(_) => ErrorKind::Transport,
            Self::Parse { .. } | Self::No(_) | Self::Bad(_) | Self::Bye(_) | Self::Protocol(_) => {
                ErrorKind::Protocol
            }
            Self::InvalidState(_) => ErrorKind::State,
            Self::UnsupportedStructure(_) => ErrorKind::UnsupportedStructure,
        }
    }

    /// Returns true if this error invalidates the connection.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport)
    }

    /// Returns true if the connection must not be reused.
    ///
    /// Covers transport failures and a server `BYE`.
    #[must_use]
    pub const fn closes_connection(&self) -> bool {
        self.is_transport() || matches!(self, Self::Bye(_))
    }

    /// Returns true if the server answered NO.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        matches!(self, Self::No(_))
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
