//! Download client definitions and the ephemeral item snapshots they report.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::release::Protocol;

/// A configured download client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadClientDefinition {
    pub id: i64,
    pub name: String,
    pub protocol: Protocol,
}

/// Status reported by a download client for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadItemStatus {
    Queued,
    Paused,
    Downloading,
    Completed,
    Failed,
    Warning,
}

impl DownloadItemStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Paused => "paused",
            Self::Downloading => "downloading",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for DownloadItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One poll result for one download. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadClientItem {
    pub download_id: String,
    pub title: String,
    /// Total size in bytes.
    pub total_size: u64,
    /// Bytes still to download.
    pub remaining_size: u64,
    #[serde(default, with = "optional_secs")]
    pub remaining_time: Option<Duration>,
    pub status: DownloadItemStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

mod optional_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_item_deserializes_remaining_time_in_seconds() {
        let json = r#"{
            "download_id": "ABC",
            "title": "Artist - Album FLAC",
            "total_size": 100,
            "remaining_size": 40,
            "remaining_time": 90,
            "status": "downloading"
        }"#;
        let item: DownloadClientItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.remaining_time, Some(Duration::from_secs(90)));
        assert_eq!(item.status, DownloadItemStatus::Downloading);
        assert!(item.output_path.is_none());
    }

    #[test]
    fn test_item_without_remaining_time() {
        let json = r#"{
            "download_id": "ABC",
            "title": "t",
            "total_size": 1,
            "remaining_size": 1,
            "status": "queued"
        }"#;
        let item: DownloadClientItem = serde_json::from_str(json).unwrap();
        assert!(item.remaining_time.is_none());
    }
}
