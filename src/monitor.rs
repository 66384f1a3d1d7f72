//! Entry point for the polling scheduler, presentation and import pipeline.
//!
//! [`DownloadMonitor`] wires the [`TrackedDownloadService`], the
//! [`QueueMaterializer`] and a shared [`QueueStore`]. Every refresh of tracked
//! state is followed by a queue rebuild over an immutable snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::config::TrackingConfig;
use crate::download_client::{DownloadClientDefinition, DownloadClientItem};
use crate::ports::{CollaboratorError, HistoryProvider, ReleaseParser};
use crate::queue::{QueueEntry, QueueEntryId, QueueMaterializer, QueueStore};
use crate::tracking::{self, TrackedDownload, TrackedDownloadService, TrackingError};

/// Tracked downloads plus the queue view derived from them.
pub struct DownloadMonitor {
    tracking: TrackedDownloadService,
    materializer: QueueMaterializer,
    store: Arc<QueueStore>,
    history: Arc<dyn HistoryProvider>,
}

impl DownloadMonitor {
    #[must_use]
    pub fn new(
        parser: Arc<dyn ReleaseParser>,
        history: Arc<dyn HistoryProvider>,
        config: &TrackingConfig,
        store: Arc<QueueStore>,
    ) -> Self {
        Self {
            tracking: TrackedDownloadService::new(parser, Arc::clone(&history), config),
            materializer: QueueMaterializer::new(Arc::clone(&history)),
            store,
            history,
        }
    }

    /// Ingests one client's poll and republishes the queue.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::StaleSnapshot`] when the poll failed. Tracked
    /// state and the published queue are left as they were.
    #[instrument(skip(self, client, poll), fields(client = %client.name))]
    pub fn refresh_client(
        &self,
        client: &DownloadClientDefinition,
        poll: Result<Vec<DownloadClientItem>, CollaboratorError>,
    ) -> Result<Arc<[QueueEntry]>, TrackingError> {
        self.tracking.refresh_client(client, poll)?;
        Ok(self.rebuild_queue(Utc::now()))
    }

    /// Rebuilds the queue from the current tracked state.
    pub fn rebuild_queue(&self, now: DateTime<Utc>) -> Arc<[QueueEntry]> {
        let generation = self.store.begin_rebuild();
        let snapshot = self.tracking.snapshot();
        let entries = self.materializer.rebuild(&snapshot, now);
        self.store.publish(generation, entries);
        self.store.snapshot()
    }

    /// Drops aggregates past their TTL and republishes the queue.
    pub fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let evicted = self.tracking.evict_expired(now);
        if evicted > 0 {
            self.rebuild_queue(now);
        }
        evicted
    }

    /// Current queue view.
    #[must_use]
    pub fn get_queue(&self) -> Arc<[QueueEntry]> {
        self.store.snapshot()
    }

    #[must_use]
    pub fn find_tracked_download(&self, download_id: &str) -> Option<TrackedDownload> {
        self.tracking.find(download_id)
    }

    /// Stops tracking the download behind a queue row.
    ///
    /// Only the in-memory aggregate is evicted; the download client is not
    /// touched, so the download reappears if a later poll still reports it.
    #[instrument(skip(self), fields(id = %id))]
    pub fn remove_from_queue(&self, id: &QueueEntryId) -> bool {
        let removed = self.tracking.remove(&id.download_id).is_some();
        if removed {
            info!("Removed download from queue");
            self.rebuild_queue(Utc::now());
        }
        removed
    }

    /// Includes or excludes a download from the queue view.
    pub fn set_trackable(&self, download_id: &str, trackable: bool) -> bool {
        let found = self.tracking.set_trackable(download_id, trackable);
        if found {
            self.rebuild_queue(Utc::now());
        }
        found
    }

    /// Whether every unit of the download has been imported.
    ///
    /// A failed history lookup answers `false`; the import pipeline retries
    /// on its next pass.
    #[must_use]
    pub fn is_already_imported(&self, tracked: &TrackedDownload) -> bool {
        match self.history.find_by_download_id(tracked.download_id()) {
            Ok(history) => tracking::is_imported(tracked, &history),
            Err(error) => {
                warn!(
                    download_id = %tracked.download_id(),
                    error = %error,
                    "History lookup failed, treating as not imported"
                );
                false
            }
        }
    }

    #[must_use]
    pub fn store(&self) -> Arc<QueueStore> {
        Arc::clone(&self.store)
    }

    #[must_use]
    pub fn tracking(&self) -> &TrackedDownloadService {
        &self.tracking
    }
}

impl std::fmt::Debug for DownloadMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadMonitor")
            .field("tracking", &self.tracking)
            .field("queue_generation", &self.store.generation())
            .finish_non_exhaustive()
    }
}
