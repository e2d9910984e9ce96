//! One command round trip on a bound connection.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{trace, warn};

use super::FolderSelection;
use crate::command::Command;
use crate::connection::Connection;
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::{ResponseCode, Status};
use crate::{Error, Result};

/// Successful completion of a command.
#[derive(Debug, Default)]
pub struct Completion {
    /// Code on the tagged OK.
    pub code: Option<ResponseCode>,
    /// Untagged responses received before completion, in order.
    pub untagged: Vec<UntaggedResponse>,
}

impl Completion {
    /// Numbers from all `SEARCH` responses.
    pub fn search_results(&self) -> Vec<u32> {
        self.untagged
            .iter()
            .filter_map(|u| match u {
                UntaggedResponse::Search(ns) => Some(ns.as_slice()),
                _ => None,
            })
            .flatten()
            .copied()
            .collect()
    }
}

/// Sends `command` and reads until its tagged completion.
///
/// `literal` is streamed on the first continuation request. Every untagged
/// response goes through [`FolderSelection::apply_untagged`] first.
///
/// A malformed response fails the command with [`Error::Parse`] once the
/// command has completed, so the connection stays in sync. A malformed
/// completion line for this tag ends the command at once.
pub async fn exchange<S>(
    conn: &mut Connection<S>,
    selection: &mut FolderSelection,
    command: &Command,
    mut literal: Option<&[u8]>,
) -> Result<Completion>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let tag = conn.send(command).await?;
    let mut untagged = Vec::new();
    let mut malformed = None;
    loop {
        let raw = conn.read_frame().await?;
        let response = match ResponseParser::parse(&raw) {
            Ok(response) => {
                trace!(?response, "Received");
                response
            }
            Err(e) => {
                warn!(tag = %tag, error = %e, line = %String::from_utf8_lossy(&raw).trim_end(), "Malformed response");
                if completes(&raw, &tag) {
                    return Err(e);
                }
                if malformed.is_none() {
                    malformed = Some(e);
                }
                continue;
            }
        };
        match response {
            Response::Untagged(response) => {
                selection.apply_untagged(&response);
                untagged.push(response);
            }
            Response::Continuation { text } => match literal.take() {
                Some(data) => conn.write_literal(data).await?,
                None => {
                    return Err(Error::Framing(format!(
                        "unexpected continuation: {}",
                        text.unwrap_or_default()
                    )));
                }
            },
            Response::Tagged {
                tag: got,
                status,
                code,
                text,
            } => {
                if got.as_str() != tag {
                    warn!(expected = %tag, got = %got, "Ignoring completion for another tag");
                    continue;
                }
                if let Some(code) = &code {
                    selection.apply_code(code);
                }
                return match (status, malformed) {
                    (Status::Ok | Status::PreAuth, Some(e)) => Err(e),
                    (Status::Ok | Status::PreAuth, None) => Ok(Completion { code, untagged }),
                    (Status::No, _) => Err(Error::No(text)),
                    (Status::Bad, _) => Err(Error::Bad(text)),
                    (Status::Bye, _) => Err(Error::Bye(text)),
                };
            }
        }
    }
}

/// True when `raw` starts with `tag` and a space.
fn completes(raw: &[u8], tag: &str) -> bool {
    raw.strip_prefix(tag.as_bytes())
        .is_some_and(|rest| rest.first() == Some(&b' '))
}
