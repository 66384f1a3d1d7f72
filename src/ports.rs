//! Interfaces to the collaborators this crate depends on but does not implement.
//!
//! Title parsing, the history store and indexer settings live outside this
//! crate. Callers provide implementations; every call is synchronous and any
//! failure is reported as [`CollaboratorError`] and isolated by the caller.

use thiserror::Error;

use crate::history::HistoryEntry;
use crate::release::{ParsedReleaseInfo, ResolvedRelease};
use crate::seed::SeedCriteria;

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollaboratorError {
    /// The collaborator could not be reached or refused the request.
    #[error("{service} unavailable: {message}")]
    Unavailable {
        service: &'static str,
        message: String,
    },

    /// The collaborator answered with data this crate cannot use.
    #[error("{service} returned invalid data: {message}")]
    InvalidData {
        service: &'static str,
        message: String,
    },
}

impl CollaboratorError {
    pub fn unavailable(service: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            service,
            message: message.into(),
        }
    }

    pub fn invalid_data(service: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidData {
            service,
            message: message.into(),
        }
    }
}

/// Title parsing and library mapping.
pub trait ReleaseParser: Send + Sync {
    /// Parses a release title. `Ok(None)` means the title is not recognisable.
    fn parse_title(&self, title: &str) -> Result<Option<ParsedReleaseInfo>, CollaboratorError>;

    /// Maps parsed info onto library entities. `Ok(None)` means no match.
    fn map(&self, parsed: &ParsedReleaseInfo) -> Result<Option<ResolvedRelease>, CollaboratorError>;

    /// Maps parsed info onto a known artist and an explicit set of units.
    fn map_with_ids(
        &self,
        parsed: &ParsedReleaseInfo,
        artist_id: i64,
        unit_ids: &[i64],
    ) -> Result<Option<ResolvedRelease>, CollaboratorError>;
}

/// Read-only history queries.
pub trait HistoryProvider: Send + Sync {
    /// Every entry recorded for a download id, in any order.
    fn find_by_download_id(&self, download_id: &str) -> Result<Vec<HistoryEntry>, CollaboratorError>;
}

/// Per-indexer settings lookup.
pub trait IndexerSettingsSource: Send + Sync {
    /// Seed criteria for a torrent indexer; `Ok(None)` for unknown or non-torrent indexers.
    fn seed_criteria(&self, indexer_id: i64) -> Result<Option<SeedCriteria>, CollaboratorError>;
}
