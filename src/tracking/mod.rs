//! Tracked downloads: stable aggregates over ephemeral download client polls.
//!
//! # Architecture
//!
//! - [`TrackedDownload`] - One in-flight download and the library identity it maps to
//! - [`TrackedDownloadState`] - Lifecycle state with an explicit transition table
//! - [`TrackedDownloadService`] - Concurrent cache with atomic get-or-create per download id
//! - [`is_imported`] - All-or-nothing completion check over history
//!
//! The service never touches a download client. Callers poll clients and
//! hand the snapshots in; history is queried through
//! [`HistoryProvider`](crate::ports::HistoryProvider).

mod already_imported;
mod error;
mod service;
mod state;

pub use already_imported::is_imported;
pub use error::TrackingError;
pub use service::TrackedDownloadService;
pub use state::TrackedDownloadState;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::download_client::{DownloadClientDefinition, DownloadClientItem, DownloadItemStatus};
use crate::release::{ParsedReleaseInfo, Protocol, ResolvedRelease};

/// A titled group of messages shown against a queue row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub title: String,
    pub messages: Vec<String>,
}

impl StatusMessage {
    pub fn new(title: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            title: title.into(),
            messages,
        }
    }
}

/// In-memory aggregate for one download id.
///
/// Created on the first successful sighting, updated in place on later polls
/// and evicted on TTL or removal. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedDownload {
    pub download_client_id: i64,
    pub download_client_name: String,
    pub protocol: Protocol,
    /// Latest snapshot from the download client.
    pub item: DownloadClientItem,
    pub parsed: Option<ParsedReleaseInfo>,
    pub release: Option<ResolvedRelease>,
    state: TrackedDownloadState,
    pub status_messages: Vec<StatusMessage>,
    /// Indexer name recorded when the release was grabbed.
    pub indexer: Option<String>,
    /// Cleared when the download was explicitly excluded from the queue.
    pub is_trackable: bool,
    pub last_seen: DateTime<Utc>,
}

impl TrackedDownload {
    #[must_use]
    pub fn new(
        client: &DownloadClientDefinition,
        item: DownloadClientItem,
        now: DateTime<Utc>,
    ) -> Self {
        let mut tracked = Self {
            download_client_id: client.id,
            download_client_name: client.name.clone(),
            protocol: client.protocol,
            item,
            parsed: None,
            release: None,
            state: TrackedDownloadState::Downloading,
            status_messages: Vec::new(),
            indexer: None,
            is_trackable: true,
            last_seen: now,
        };
        tracked.refresh_client_messages();
        tracked
    }

    #[must_use]
    pub fn download_id(&self) -> &str {
        &self.item.download_id
    }

    #[must_use]
    pub fn state(&self) -> TrackedDownloadState {
        self.state
    }

    /// Moves to `next`, enforcing the transition table.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::InvalidTransition`] when `next` is not
    /// reachable from the current state.
    pub fn transition_to(&mut self, next: TrackedDownloadState) -> Result<(), TrackingError> {
        if !self.state.can_transition_to(next) {
            return Err(TrackingError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Replaces the client snapshot and re-derives the client's messages.
    pub fn update_item(&mut self, item: DownloadClientItem, now: DateTime<Utc>) {
        self.item = item;
        self.last_seen = now;
        self.refresh_client_messages();
    }

    /// Adds a warning shown on the queue row until the next snapshot.
    pub fn warn(&mut self, title: impl Into<String>, messages: Vec<String>) {
        self.status_messages.push(StatusMessage::new(title, messages));
    }

    /// True when the aggregate belongs in the live queue view.
    #[must_use]
    pub fn is_queue_visible(&self) -> bool {
        self.is_trackable && self.state != TrackedDownloadState::Imported
    }

    fn refresh_client_messages(&mut self) {
        self.status_messages.clear();
        if matches!(
            self.item.status,
            DownloadItemStatus::Warning | DownloadItemStatus::Failed
        ) {
            if let Some(message) = &self.item.message {
                self.status_messages.push(StatusMessage::new(
                    self.item.title.clone(),
                    vec![message.clone()],
                ));
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> DownloadClientDefinition {
        DownloadClientDefinition {
            id: 1,
            name: "qBittorrent".to_string(),
            protocol: Protocol::Torrent,
        }
    }

    fn item(status: DownloadItemStatus, message: Option<&str>) -> DownloadClientItem {
        DownloadClientItem {
            download_id: "abc".to_string(),
            title: "Artist - Album".to_string(),
            total_size: 100,
            remaining_size: 50,
            remaining_time: None,
            status,
            message: message.map(ToString::to_string),
            output_path: None,
        }
    }

    #[test]
    fn test_new_tracked_download_starts_downloading() {
        let tracked = TrackedDownload::new(&client(), item(DownloadItemStatus::Downloading, None), Utc::now());
        assert_eq!(tracked.state(), TrackedDownloadState::Downloading);
        assert_eq!(tracked.download_id(), "abc");
        assert!(tracked.is_trackable);
        assert!(tracked.status_messages.is_empty());
    }

    #[test]
    fn test_terminal_state_is_sticky() {
        let mut tracked = TrackedDownload::new(&client(), item(DownloadItemStatus::Completed, None), Utc::now());
        tracked.transition_to(TrackedDownloadState::DownloadFailed).unwrap();
        let err = tracked
            .transition_to(TrackedDownloadState::Downloading)
            .unwrap_err();
        assert!(matches!(err, TrackingError::InvalidTransition { .. }));
        assert_eq!(tracked.state(), TrackedDownloadState::DownloadFailed);
    }

    #[test]
    fn test_client_warning_becomes_status_message() {
        let mut tracked = TrackedDownload::new(
            &client(),
            item(DownloadItemStatus::Warning, Some("Stalled")),
            Utc::now(),
        );
        assert_eq!(tracked.status_messages.len(), 1);
        assert_eq!(tracked.status_messages[0].messages, vec!["Stalled".to_string()]);

        tracked.update_item(item(DownloadItemStatus::Downloading, Some("ignored")), Utc::now());
        assert!(tracked.status_messages.is_empty());
    }

    #[test]
    fn test_imported_is_not_queue_visible() {
        let mut tracked = TrackedDownload::new(&client(), item(DownloadItemStatus::Completed, None), Utc::now());
        assert!(tracked.is_queue_visible());
        tracked.transition_to(TrackedDownloadState::Imported).unwrap();
        assert!(!tracked.is_queue_visible());
    }
}
