//! Push-resume watermark.
//!
//! The push state is an opaque string persisted by the local store. It
//! encodes the next UID the folder expects, as `uidNext=<n>`, and only ever
//! moves forward.

use std::fmt;
use std::str::FromStr;

use crate::types::Uid;

const KEY: &str = "uidNext";

/// Decoded push state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushState {
    uid_next: Option<u64>,
}

impl PushState {
    /// State resuming after `uid`.
    #[must_use]
    pub fn after(uid: Uid) -> Self {
        Self {
            uid_next: Some(u64::from(uid.get()) + 1),
        }
    }

    /// The stored watermark, if any.
    #[must_use]
    pub const fn uid_next(&self) -> Option<u64> {
        self.uid_next
    }

    /// Parses a stored state. Anything unrecognized yields the default.
    #[must_use]
    pub fn parse(serialized: Option<&str>) -> Self {
        serialized
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Returns the advanced state for a newly seen UID, or `None` when the
    /// UID does not move the watermark.
    #[must_use]
    pub fn advance(&self, uid: Uid) -> Option<Self> {
        match self.uid_next {
            Some(watermark) if u64::from(uid.get()) <= watermark => None,
            _ => Some(Self::after(uid)),
        }
    }
}

impl fmt::Display for PushState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.uid_next {
            Some(n) => write!(f, "{KEY}={n}"),
            None => write!(f, "{KEY}=-1"),
        }
    }
}

/// Error for a push state that is not `uidNext=<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPushState;

impl FromStr for PushState {
    type Err = InvalidPushState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s.trim().split_once('=').ok_or(InvalidPushState)?;
        if !key.eq_ignore_ascii_case(KEY) {
            return Err(InvalidPushState);
        }
        if value == "-1" {
            return Ok(Self::default());
        }
        let n = value.parse().map_err(|_| InvalidPushState)?;
        Ok(Self { uid_next: Some(n) })
    }
}

/// Computes the serialized push state after seeing `uid`.
///
/// Returns `None` when the stored watermark is already at or beyond `uid`.
#[must_use]
pub fn new_push_state(old: Option<&str>, uid: Uid) -> Option<String> {
    PushState::parse(old).advance(uid).map(|s| s.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn uid(n: u32) -> Uid {
        Uid::new(n).unwrap()
    }

    #[test]
    fn state_after_uid_100_resumes_at_101() {
        let state = new_push_state(None, uid(100)).unwrap();
        assert_eq!(state, "uidNext=101");
        assert_eq!(PushState::parse(Some(&state)).uid_next(), Some(101));
    }

    #[test]
    fn uids_at_or_below_watermark_do_not_update() {
        let state = PushState::after(uid(100)).to_string();
        assert_eq!(new_push_state(Some(&state), uid(100)), None);
        assert_eq!(new_push_state(Some(&state), uid(101)), None);
        assert_eq!(new_push_state(Some(&state), uid(7)), None);
        assert_eq!(
            new_push_state(Some(&state), uid(150)).as_deref(),
            Some("uidNext=151")
        );
    }

    #[test]
    fn garbage_parses_to_default() {
        assert_eq!(PushState::parse(Some("bogus")), PushState::default());
        assert_eq!(PushState::parse(Some("uidNext=abc")), PushState::default());
        assert_eq!(PushState::parse(Some("other=5")), PushState::default());
        assert_eq!(new_push_state(Some("bogus"), uid(1)).as_deref(), Some("uidNext=2"));
    }

    #[test]
    fn default_round_trips() {
        let s = PushState::default().to_string();
        assert_eq!(PushState::parse(Some(&s)), PushState::default());
    }
}
