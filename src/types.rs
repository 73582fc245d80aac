//! Shared primitive IDs and comment-view enums.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Opaque comment identifier, assigned by the backend or the local clock.
pub type CommentId = String;

/// Vote overlay value in `{-1, 0, +1}`.
pub type VoteValue = i8;

/// Direction of a single vote click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteDirection {
    /// Upvote, `+1`.
    Up,
    /// Downvote, `-1`.
    Down,
}

impl VoteDirection {
    /// Overlay value this direction sets when it becomes active.
    pub fn value(self) -> VoteValue {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

/// Ordering applied to the top-level comment list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Weighted likes with a small recency tiebreak.
    #[default]
    Best,
    /// Most recent first.
    New,
    /// Oldest first.
    Old,
    /// Highest likes first.
    Top,
    /// Likes farthest from 50 first.
    Controversial,
}

impl SortMode {
    /// All modes in the order a sort bar lists them.
    pub const ALL: [SortMode; 5] = [
        SortMode::Best,
        SortMode::Top,
        SortMode::New,
        SortMode::Controversial,
        SortMode::Old,
    ];

    /// Lowercase wire/display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Best => "best",
            Self::New => "new",
            Self::Old => "old",
            Self::Top => "top",
            Self::Controversial => "controversial",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown sort mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort mode: {0}")]
pub struct UnknownSortMode(pub String);

impl FromStr for SortMode {
    type Err = UnknownSortMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSortMode(s.to_string()))
    }
}

/// Where a mutation ended up being applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncSource {
    /// The backend accepted the call and local state mirrors its answer.
    Remote,
    /// The backend call failed and the change was applied locally only.
    LocalFallback,
}

/// Which source satisfied a full load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadSource {
    /// The live comments API.
    Live,
    /// The bundled static snapshot.
    Fallback,
}
