//! Queue rows and their identity.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::download_client::DownloadItemStatus;
use crate::quality::QualityModel;
use crate::release::{Artist, Protocol, Unit};
use crate::tracking::{StatusMessage, TrackedDownloadState};

/// Stable identity of a queue row.
///
/// `unit_id` is 0 for the single row of an unresolved download.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueueEntryId {
    pub download_client_id: i64,
    pub download_id: String,
    pub unit_id: i64,
}

impl QueueEntryId {
    pub fn new(download_client_id: i64, download_id: impl Into<String>, unit_id: Option<i64>) -> Self {
        Self {
            download_client_id,
            download_id: download_id.into(),
            unit_id: unit_id.unwrap_or(0),
        }
    }

    /// Deterministic scalar form for callers that need a single integer id.
    ///
    /// First 8 bytes of a SHA-256 digest over the length-prefixed fields.
    #[must_use]
    pub fn scalar(&self) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(self.download_client_id.to_be_bytes());
        hasher.update((self.download_id.len() as u64).to_be_bytes());
        hasher.update(self.download_id.as_bytes());
        hasher.update(self.unit_id.to_be_bytes());
        let digest = hasher.finalize();

        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(prefix)
    }
}

impl fmt::Display for QueueEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.download_client_id, self.download_id, self.unit_id
        )
    }
}

/// One presentation row: a tracked download narrowed to one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: QueueEntryId,
    pub download_client: String,
    pub protocol: Protocol,
    pub title: String,
    pub artist: Option<Artist>,
    pub unit: Option<Unit>,
    pub quality: Option<QualityModel>,
    /// Total size in bytes.
    pub size: u64,
    pub remaining_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_time: Option<Duration>,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub status: DownloadItemStatus,
    pub state: TrackedDownloadState,
    pub status_messages: Vec<StatusMessage>,
    pub indexer: Option<String>,
    pub download_forced: bool,
    pub output_path: Option<PathBuf>,
}

impl QueueEntry {
    #[must_use]
    pub fn download_id(&self) -> &str {
        &self.id.download_id
    }
}
