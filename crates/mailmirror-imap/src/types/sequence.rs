//! Sequence and UID sets.

use super::{SeqNum, Uid};

/// Sequence set for specifying positional message ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceSet {
    /// Single sequence number.
    Single(SeqNum),
    /// Range of sequence numbers (inclusive).
    Range(SeqNum, SeqNum),
    /// All messages (`1:*`).
    All,
}

impl SequenceSet {
    /// Creates a sequence set from a single number.
    #[must_use]
    pub fn single(n: u32) -> Option<Self> {
        SeqNum::new(n).map(Self::Single)
    }

    /// Creates a range sequence set.
    #[must_use]
    pub fn range(start: u32, end: u32) -> Option<Self> {
        Some(Self::Range(SeqNum::new(start)?, SeqNum::new(end)?))
    }
}

impl std::fmt::Display for SequenceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(n) => write!(f, "{n}"),
            Self::Range(start, end) => write!(f, "{start}:{end}"),
            Self::All => f.write_str("1:*"),
        }
    }
}

/// UID-based message set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UidSet {
    /// Single UID.
    Single(Uid),
    /// Range of UIDs (inclusive).
    Range(Uid, Uid),
    /// Every UID (`1:*`).
    All,
    /// Multiple UID specifications.
    Set(Vec<Self>),
}

impl UidSet {
    /// Builds a compact set from arbitrary UIDs.
    ///
    /// Consecutive runs collapse into ranges; duplicates are dropped.
    /// Returns `None` for an empty slice.
    #[must_use]
    pub fn from_uids(uids: &[Uid]) -> Option<Self> {
        let mut sorted = uids.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut parts = Vec::new();
        let mut iter = sorted.into_iter();
        let mut start = iter.next()?;
        let mut end = start;
        for uid in iter {
            if uid.get() == end.get() + 1 {
                end = uid;
            } else {
                parts.push(Self::span(start, end));
                start = uid;
                end = uid;
            }
        }
        parts.push(Self::span(start, end));

        Some(if parts.len() == 1 {
            parts.remove(0)
        } else {
            Self::Set(parts)
        })
    }

    fn span(start: Uid, end: Uid) -> Self {
        if start == end {
            Self::Single(start)
        } else {
            Self::Range(start, end)
        }
    }
}

impl std::fmt::Display for UidSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(n) => write!(f, "{n}"),
            Self::Range(start, end) => write!(f, "{start}:{end}"),
            Self::All => f.write_str("1:*"),
            Self::Set(items) => {
                let s: Vec<_> = items.iter().map(ToString::to_string).collect();
                f.write_str(&s.join(","))
            }
        }
    }
}

/// Expands a wire UID set such as `1:3,7` into individual UIDs.
///
/// Ranges may be written in either order. Returns `None` on malformed input.
#[must_use]
pub fn expand_uid_set(s: &str) -> Option<Vec<Uid>> {
    let mut out = Vec::new();
    for part in s.split(',') {
        if let Some((a, b)) = part.split_once(':') {
            let a: u32 = a.parse().ok()?;
            let b: u32 = b.parse().ok()?;
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            for n in lo..=hi {
                out.push(Uid::new(n)?);
            }
        } else {
            out.push(Uid::new(part.parse().ok()?)?);
        }
    }
    Some(out)
}
