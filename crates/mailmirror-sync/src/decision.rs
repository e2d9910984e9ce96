//! Per-message download decision.
//!
//! Each remote message seen during a sync is classified against the local
//! copy, first match wins:
//!
//! 1. deleted on the server: flags only, local deletion handling removes it;
//! 2. no local copy: download it, unless the server-side copy already
//!    carries download markers, in which case it is stored directly;
//! 3. live local copy: download again if nothing was downloaded, else sync
//!    flags and advance the push state;
//! 4. local copy deleted locally: ignore.

use mailmirror_imap::new_push_state;
use tracing::trace;

use crate::Result;
use crate::listener::SyncListener;
use crate::model::{LocalMessage, RemoteMessage};
use crate::store::LocalMailStore;

/// What to do with one remote message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncDecision {
    /// Queue for download.
    NewUnsynced,
    /// Stored locally from the server's markers; nothing to fetch.
    Promoted,
    /// Only flags need syncing.
    FlagSyncOnly,
    /// Leave alone.
    Ignore,
}

/// Classifies `remote` against its local copy.
#[must_use]
pub fn classify(remote: &RemoteMessage, local: Option<&LocalMessage>) -> SyncDecision {
    if remote.is_deleted() {
        return SyncDecision::FlagSyncOnly;
    }
    match local {
        None if remote.download.is_downloaded() => SyncDecision::Promoted,
        None => SyncDecision::NewUnsynced,
        Some(local) if local.is_deleted() => SyncDecision::Ignore,
        Some(local) if !local.download.is_downloaded() => SyncDecision::NewUnsynced,
        Some(_) => SyncDecision::FlagSyncOnly,
    }
}

/// Classifies `remote` and applies the side effects of the decision.
///
/// A promoted message is stored and, when unread, announced to the
/// listener. A flag-only update of a live local copy advances the folder's
/// push state.
///
/// # Errors
///
/// Returns store errors.
pub fn evaluate<S, L>(store: &mut S, listener: &L, remote: &RemoteMessage) -> Result<SyncDecision>
where
    S: LocalMailStore + ?Sized,
    L: SyncListener + ?Sized,
{
    let local = store.message(&remote.uid)?;
    let decision = classify(remote, local.as_ref());
    trace!(uid = %remote.uid, ?decision, "Classified message");

    match decision {
        SyncDecision::Promoted => {
            store.append(LocalMessage::from_remote(remote))?;
            if !remote.flags.is_seen() {
                listener.new_message(store.folder_name(), &remote.uid);
            }
        }
        SyncDecision::FlagSyncOnly if local.is_some() && !remote.is_deleted() => {
            let advanced = remote
                .numeric_uid()
                .and_then(|uid| new_push_state(store.push_state().as_deref(), uid));
            if let Some(state) = advanced {
                store.set_push_state(state)?;
            }
        }
        _ => {}
    }
    Ok(decision)
}
