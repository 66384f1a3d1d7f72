//! Projection of tracked downloads into queue rows.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use super::{QueueEntry, QueueEntryId};
use crate::history::{self, DOWNLOAD_FORCED_KEY, HistoryEventType};
use crate::ports::HistoryProvider;
use crate::release::Unit;
use crate::tracking::TrackedDownload;

/// Builds queue rows from a snapshot of tracked downloads.
pub struct QueueMaterializer {
    history: Arc<dyn HistoryProvider>,
}

impl QueueMaterializer {
    #[must_use]
    pub fn new(history: Arc<dyn HistoryProvider>) -> Self {
        Self { history }
    }

    /// Rebuilds the full queue.
    ///
    /// Emits one row per resolved unit of every queue-visible download, or a
    /// single unit-less row when the release is unresolved. Rows are ordered
    /// by remaining time, unknown last; ties keep snapshot order.
    #[must_use]
    #[instrument(skip(self, downloads, now), fields(downloads = downloads.len()))]
    pub fn rebuild(&self, downloads: &[TrackedDownload], now: DateTime<Utc>) -> Vec<QueueEntry> {
        let mut entries: Vec<QueueEntry> = Vec::new();

        for tracked in downloads.iter().filter(|t| t.is_queue_visible()) {
            let forced = self.download_forced(tracked);
            match tracked.release.as_ref().filter(|r| !r.units.is_empty()) {
                Some(release) => entries.extend(
                    release
                        .units
                        .iter()
                        .map(|unit| entry(tracked, Some(unit), forced, now)),
                ),
                None => entries.push(entry(tracked, None, forced, now)),
            }
        }

        entries.sort_by_key(|e| (e.remaining_time.is_none(), e.remaining_time));
        debug!(entries = entries.len(), "Rebuilt queue");
        entries
    }

    /// Forced flag from the most recent grab; `false` when unknown.
    fn download_forced(&self, tracked: &TrackedDownload) -> bool {
        match self.history.find_by_download_id(tracked.download_id()) {
            Ok(entries) => history::latest_of_type(&entries, HistoryEventType::Grabbed)
                .is_some_and(|grab| grab.flag(DOWNLOAD_FORCED_KEY)),
            Err(error) => {
                warn!(
                    download_id = %tracked.download_id(),
                    error = %error,
                    "History lookup failed, assuming not forced"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for QueueMaterializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueMaterializer").finish_non_exhaustive()
    }
}

fn entry(tracked: &TrackedDownload, unit: Option<&Unit>, forced: bool, now: DateTime<Utc>) -> QueueEntry {
    let item = &tracked.item;
    let estimated_completion = item
        .remaining_time
        .and_then(|remaining| chrono::Duration::from_std(remaining).ok())
        .and_then(|remaining| now.checked_add_signed(remaining));

    QueueEntry {
        id: QueueEntryId::new(
            tracked.download_client_id,
            item.download_id.clone(),
            unit.map(|u| u.id),
        ),
        download_client: tracked.download_client_name.clone(),
        protocol: tracked.protocol,
        title: item.title.clone(),
        artist: tracked.release.as_ref().map(|r| r.artist.clone()),
        unit: unit.cloned(),
        quality: tracked.parsed.as_ref().map(|p| p.quality.clone()),
        size: item.total_size,
        remaining_size: item.remaining_size,
        remaining_time: item.remaining_time,
        estimated_completion,
        status: item.status,
        state: tracked.state(),
        status_messages: tracked.status_messages.clone(),
        indexer: tracked.indexer.clone(),
        download_forced: forced,
        output_path: item.output_path.clone(),
    }
}
