//! An established, authenticated server connection.

#![allow(clippy::missing_errors_doc)]

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace};

use super::framed::FramedStream;
use crate::command::{Command, TagGenerator};
use crate::parser::{Response, ResponseParser};
use crate::types::Capability;
use crate::Result;

/// A connection handed out by a [`ConnectionPool`](super::ConnectionPool).
///
/// The connection knows nothing about folders; it sends commands, reads
/// parsed responses and streams literals.
pub struct Connection<S> {
    framed: FramedStream<S>,
    tags: TagGenerator,
    capabilities: Vec<Capability>,
    qresync_enabled: bool,
}

impl<S> std::fmt::Debug for Connection<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("tags", &self.tags)
            .field("capabilities", &self.capabilities)
            .field("qresync_enabled", &self.qresync_enabled)
            .finish_non_exhaustive()
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a stream that is already past greeting and authentication.
    pub fn new(stream: S, capabilities: Vec<Capability>) -> Self {
        Self {
            framed: FramedStream::new(stream),
            tags: TagGenerator::default(),
            capabilities,
            qresync_enabled: false,
        }
    }

    /// Capabilities advertised by the server.
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Checks for a capability.
    #[must_use]
    pub fn has_capability(&self, cap: &Capability) -> bool {
        self.capabilities.contains(cap)
    }

    /// QRESYNC (RFC 7162).
    #[must_use]
    pub fn supports_qresync(&self) -> bool {
        self.has_capability(&Capability::QResync)
    }

    /// CONDSTORE (RFC 7162). Implied by QRESYNC.
    #[must_use]
    pub fn supports_condstore(&self) -> bool {
        self.has_capability(&Capability::CondStore) || self.supports_qresync()
    }

    /// True once `ENABLE QRESYNC` succeeded on this connection.
    #[must_use]
    pub const fn qresync_enabled(&self) -> bool {
        self.qresync_enabled
    }

    pub(crate) const fn set_qresync_enabled(&mut self) {
        self.qresync_enabled = true;
    }

    /// UIDPLUS (RFC 4315).
    #[must_use]
    pub fn supports_uidplus(&self) -> bool {
        self.has_capability(&Capability::UidPlus)
    }

    /// Sends a command and returns its tag.
    pub async fn send(&mut self, command: &Command) -> Result<String> {
        let tag = self.tags.next_tag();
        debug!(tag = %tag, command = command.verb(), "Sending command");
        self.framed.write_command(&command.serialize(&tag)).await?;
        Ok(tag)
    }

    /// Reads and parses the next response.
    ///
    /// # Errors
    ///
    /// [`Error::Parse`](crate::Error::Parse) when the response is malformed.
    /// The framing layer has consumed it whole, so the stream stays in sync.
    pub async fn read_response(&mut self) -> Result<Response> {
        let raw = self.read_frame().await?;
        let response = ResponseParser::parse(&raw)?;
        trace!(?response, "Received");
        Ok(response)
    }

    /// Reads one framed response without parsing it.
    pub(crate) async fn read_frame(&mut self) -> Result<Vec<u8>> {
        self.framed.read_response().await
    }

    /// Streams literal bytes after a continuation, then the closing CRLF.
    pub async fn write_literal(&mut self, data: &[u8]) -> Result<()> {
        self.framed.write_literal(data).await
    }

    /// Closes the connection.
    pub async fn close(mut self) {
        debug!("Closing connection");
        self.framed.shutdown().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio_test::io::Builder;

    use super::*;
    use crate::parser::UntaggedResponse;
    use crate::types::Status;
    use crate::{Error, ErrorKind};

    #[tokio::test]
    async fn send_uses_sequential_tags() {
        let mock = Builder::new()
            .write(b"A0000 NOOP\r\n")
            .write(b"A0001 EXPUNGE\r\n")
            .build();
        let mut conn = Connection::new(mock, vec![]);
        assert_eq!(conn.send(&Command::Noop).await.unwrap(), "A0000");
        assert_eq!(conn.send(&Command::Expunge).await.unwrap(), "A0001");
    }

    #[tokio::test]
    async fn malformed_line_is_parse_error() {
        let mock = Builder::new()
            .read(b")garbage\r\n")
            .read(b"* 5 EXISTS\r\n")
            .read(b"A0000 OK done\r\n")
            .build();
        let mut conn = Connection::new(mock, vec![]);
        let err = conn.read_response().await.unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(
            conn.read_response().await.unwrap(),
            Response::Untagged(UntaggedResponse::Exists(5))
        );
        assert!(matches!(
            conn.read_response().await.unwrap(),
            Response::Tagged { status: Status::Ok, .. }
        ));
    }

    #[tokio::test]
    async fn qresync_implies_condstore() {
        let conn = Connection::new(Builder::new().build(), vec![Capability::QResync]);
        assert!(conn.supports_qresync());
        assert!(conn.supports_condstore());
        assert!(!conn.supports_uidplus());
    }
}
