//! Releasegate Core Library
//!
//! Decides which indexer search results are acceptable for a library target,
//! ranks them, and tracks grabbed downloads from the download client through
//! import into a stable queue view.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`quality`] - Quality tiers, revisions, profiles and the comparator
//! - [`decision`] - Acceptance rules, the decision engine and the prioritizer
//! - [`seed`] - Per-indexer torrent seed targets with push invalidation
//! - [`tracking`] - Tracked download aggregates and the already-imported check
//! - [`queue`] - Queue rows materialized from tracked downloads
//! - [`monitor`] - Facade used by the poll scheduler, presentation and import
//! - [`ports`] - Traits for the parsing, history and indexer collaborators
//! - [`config`] - TOML configuration
//!
//! Nothing here performs network or disk I/O on its own; collaborators are
//! injected through [`ports`].

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod decision;
pub mod download_client;
pub mod history;
pub mod monitor;
pub mod ports;
pub mod quality;
pub mod queue;
pub mod release;
pub mod seed;
pub mod tracking;

// Re-export commonly used types
pub use config::{ConfigError, CoreConfig};
pub use decision::{
    Decision, DecisionEngine, EvaluationContext, Rejection, RejectionType, ReleasePrioritizer,
    Specification,
};
pub use download_client::{DownloadClientDefinition, DownloadClientItem, DownloadItemStatus};
pub use history::{HistoryEntry, HistoryEventType};
pub use monitor::DownloadMonitor;
pub use ports::{CollaboratorError, HistoryProvider, IndexerSettingsSource, ReleaseParser};
pub use quality::{Quality, QualityModel, QualityProfile, Revision};
pub use queue::{QueueEntry, QueueEntryId, QueueStore};
pub use release::{Protocol, ReleaseCandidate, SearchContext};
pub use seed::{IndexerEvent, SeedConfig, SeedConfigResolver};
pub use tracking::{TrackedDownload, TrackedDownloadService, TrackedDownloadState, TrackingError};
