//! Lifecycle states of a tracked download and the allowed transitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::history::HistoryEventType;

/// Where a tracked download is in its lifecycle.
///
/// `Downloading` is the only non-terminal state. Once an aggregate leaves it,
/// history is authoritative and the state never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedDownloadState {
    Downloading,
    Imported,
    DownloadFailed,
}

impl TrackedDownloadState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Downloading => "downloading",
            Self::Imported => "imported",
            Self::DownloadFailed => "download_failed",
        }
    }

    /// States reachable from this one.
    #[must_use]
    pub fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Downloading => &[Self::Imported, Self::DownloadFailed],
            Self::Imported | Self::DownloadFailed => &[],
        }
    }

    /// True when moving to `next` is permitted. Staying put always is.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || self.allowed_transitions().contains(&next)
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// State implied by the most recent history event for a download.
    #[must_use]
    pub fn from_history(event_type: HistoryEventType) -> Self {
        match event_type {
            HistoryEventType::DownloadFolderImported => Self::Imported,
            HistoryEventType::DownloadFailed => Self::DownloadFailed,
            _ => Self::Downloading,
        }
    }
}

impl fmt::Display for TrackedDownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TrackedDownloadState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "downloading" => Ok(Self::Downloading),
            "imported" => Ok(Self::Imported),
            "download_failed" => Ok(Self::DownloadFailed),
            _ => Err(format!("invalid tracked download state: {s}")),
        }
    }
}
