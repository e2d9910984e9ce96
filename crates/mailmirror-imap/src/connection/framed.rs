//! Line framing over an async byte stream.
//!
//! Responses are CRLF-terminated lines that may embed `{n}` literals; a
//! response is only complete once every announced literal has been read and
//! the line after it ends without a further literal.

#![allow(clippy::missing_errors_doc)]

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::{Error, Result};

const READ_BUFFER_SIZE: usize = 8192;

/// Longest line accepted before the connection is treated as broken.
const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Largest literal accepted from the server.
const MAX_LITERAL_SIZE: usize = 100 * 1024 * 1024;

/// Buffered, response-framed stream.
pub struct FramedStream<S> {
    reader: BufReader<S>,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a connected stream.
    pub fn new(stream: S) -> Self {
        Self {
            reader: BufReader::with_capacity(READ_BUFFER_SIZE, stream),
        }
    }

    /// Reads one complete response including embedded literals.
    pub async fn read_response(&mut self) -> Result<Vec<u8>> {
        let mut response = Vec::new();
        loop {
            let line = self.read_line().await?;
            response.extend_from_slice(&line);

            let Some(len) = literal_length(&line) else {
                return Ok(response);
            };
            if len > MAX_LITERAL_SIZE {
                return Err(Error::Framing(format!(
                    "literal too large: {len} bytes (max {MAX_LITERAL_SIZE})"
                )));
            }
            let start = response.len();
            response.resize(start + len, 0);
            self.reader.read_exact(&mut response[start..]).await?;
        }
    }

    async fn read_line(&mut self) -> Result<Vec<u8>> {
        let mut line = Vec::new();
        loop {
            let buf = self.reader.fill_buf().await?;
            if buf.is_empty() {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed").into());
            }
            if let Some(pos) = find_crlf(buf) {
                line.extend_from_slice(&buf[..pos + 2]);
                self.reader.consume(pos + 2);
                return Ok(line);
            }
            // A CR at the end of the buffer may pair with an LF in the next read.
            let take = if buf.ends_with(b"\r") { buf.len() - 1 } else { buf.len() };
            if take == 0 {
                let mut pair = [0u8; 2];
                self.reader.read_exact(&mut pair).await?;
                line.extend_from_slice(&pair);
                if pair == *b"\r\n" {
                    return Ok(line);
                }
            } else {
                line.extend_from_slice(&buf[..take]);
                self.reader.consume(take);
            }
            if line.len() > MAX_LINE_LENGTH {
                return Err(Error::Framing("line too long".to_string()));
            }
        }
    }

    /// Writes a serialized command and flushes.
    pub async fn write_command(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.reader.get_mut();
        stream.write_all(data).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Writes literal bytes followed by the CRLF that ends the command.
    pub async fn write_literal(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.reader.get_mut();
        stream.write_all(data).await?;
        stream.write_all(b"\r\n").await?;
        stream.flush().await?;
        Ok(())
    }

    /// Shuts the write half down. Errors are ignored; the stream is going away.
    pub async fn shutdown(&mut self) {
        let _ = self.reader.get_mut().shutdown().await;
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// Length announced by a trailing `{n}` or `{n+}` on a CRLF-terminated line.
fn literal_length(line: &[u8]) -> Option<usize> {
    let body = line.strip_suffix(b"\r\n")?.strip_suffix(b"}")?;
    let body = body.strip_suffix(b"+").unwrap_or(body);
    let open = body.iter().rposition(|&b| b == b'{')?;
    std::str::from_utf8(&body[open + 1..]).ok()?.parse().ok()
}

/// Converts bare LF and bare CR line endings to CRLF.
#[must_use]
pub fn normalize_crlf(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / 32);
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'\r' => {
                out.extend_from_slice(b"\r\n");
                if data.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\n' => out.extend_from_slice(b"\r\n"),
            b => out.push(b),
        }
        i += 1;
    }
    out
}
