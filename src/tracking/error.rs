//! Error types for tracked download handling.

use thiserror::Error;

use super::TrackedDownloadState;
use crate::ports::CollaboratorError;

/// Failures while tracking a download.
///
/// None of these are fatal. An untrackable download simply stays out of the
/// queue until a later poll succeeds.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrackingError {
    /// Neither the live title nor the grab history could be parsed.
    #[error("unable to parse release title '{title}'")]
    Unparsable { title: String },

    /// The title parsed but matches nothing in the library.
    #[error("release '{title}' does not match any library entry")]
    Unmappable { title: String },

    /// A download client poll failed; prior state was kept.
    #[error("stale snapshot from download client '{client}': {reason}")]
    StaleSnapshot { client: String, reason: String },

    /// A write tried to leave a terminal state.
    #[error("invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: TrackedDownloadState,
        to: TrackedDownloadState,
    },

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

impl TrackingError {
    pub fn unparsable(title: impl Into<String>) -> Self {
        Self::Unparsable {
            title: title.into(),
        }
    }

    pub fn unmappable(title: impl Into<String>) -> Self {
        Self::Unmappable {
            title: title.into(),
        }
    }

    pub fn stale_snapshot(client: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StaleSnapshot {
            client: client.into(),
            reason: reason.into(),
        }
    }

    /// True for outcomes that are expected during normal operation.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::Unparsable { .. } | Self::Unmappable { .. })
    }
}
