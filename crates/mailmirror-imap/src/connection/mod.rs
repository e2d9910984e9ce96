//! Connection handling.
//!
//! - Framed I/O over any `AsyncRead + AsyncWrite` stream
//! - [`Connection`]: tags, capabilities and parsed responses
//! - [`ConnectionPool`]: where folder sessions get connections from
//! - [`SessionConfig`]: folder session tunables

mod config;
mod framed;
mod pool;
mod transport;

pub use config::{DEFAULT_MORE_MESSAGES_WINDOW, SessionConfig};
pub use framed::{FramedStream, normalize_crlf};
pub use pool::{ConnectionPool, QueuePool};
pub use transport::Connection;
