//! Read-only view of the external event history.
//!
//! History is append-only and owned elsewhere; this crate only queries it
//! (see [`crate::ports::HistoryProvider`]).

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata key on grab events recording a user-forced download.
pub const DOWNLOAD_FORCED_KEY: &str = "downloadForced";

/// Metadata key on grab events recording the indexer name.
pub const INDEXER_KEY: &str = "indexer";

/// Kind of history event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryEventType {
    /// Release sent to a download client.
    Grabbed,
    /// Whole download folder imported.
    DownloadFolderImported,
    /// Download imported for one unit.
    Imported,
    /// Single file of a unit imported.
    UnitFileImported,
    /// Only part of a unit could be imported.
    UnitImportIncomplete,
    DownloadFailed,
    /// User chose to stop tracking the download.
    DownloadIgnored,
    UnitFileDeleted,
}

impl HistoryEventType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grabbed => "grabbed",
            Self::DownloadFolderImported => "download_folder_imported",
            Self::Imported => "imported",
            Self::UnitFileImported => "unit_file_imported",
            Self::UnitImportIncomplete => "unit_import_incomplete",
            Self::DownloadFailed => "download_failed",
            Self::DownloadIgnored => "download_ignored",
            Self::UnitFileDeleted => "unit_file_deleted",
        }
    }

    /// Events that count a unit as imported.
    #[must_use]
    pub fn is_import(&self) -> bool {
        matches!(self, Self::Imported | Self::UnitFileImported)
    }
}

impl fmt::Display for HistoryEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One history row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub download_id: Option<String>,
    pub artist_id: i64,
    pub unit_id: i64,
    pub event_type: HistoryEventType,
    pub date: DateTime<Utc>,
    /// Release title recorded at the time of the event.
    pub source_title: String,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

impl HistoryEntry {
    /// Interprets a boolean metadata value; absent or malformed is `false`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.data
            .get(key)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

/// Most recent entry of the given type.
#[must_use]
pub fn latest_of_type(entries: &[HistoryEntry], event_type: HistoryEventType) -> Option<&HistoryEntry> {
    entries
        .iter()
        .filter(|e| e.event_type == event_type)
        .max_by_key(|e| e.date)
}

/// Most recent entry of any type.
#[must_use]
pub fn latest(entries: &[HistoryEntry]) -> Option<&HistoryEntry> {
    entries.iter().max_by_key(|e| e.date)
}
