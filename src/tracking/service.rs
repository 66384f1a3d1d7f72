//! Concurrent cache of tracked downloads.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{debug, info, instrument, warn};

use super::{TrackedDownload, TrackedDownloadState, TrackingError};
use crate::config::TrackingConfig;
use crate::download_client::{DownloadClientDefinition, DownloadClientItem};
use crate::history::{self, HistoryEntry, HistoryEventType, INDEXER_KEY};
use crate::ports::{CollaboratorError, HistoryProvider, ReleaseParser};
use crate::release::{ParsedReleaseInfo, ResolvedRelease};

/// One cache slot. `None` while the first sighting is being resolved.
type Slot = Arc<Mutex<Option<TrackedDownload>>>;

enum Upsert {
    Done(Option<TrackedDownload>),
    Retry(DownloadClientItem),
}

fn lock(slot: &Slot) -> MutexGuard<'_, Option<TrackedDownload>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Upserts download client snapshots into [`TrackedDownload`] aggregates.
///
/// # Thread Safety
///
/// Polls for different clients may run concurrently. Each download id has
/// one slot holding an inner mutex. A shard lock is never held while
/// blocking on a slot; under a shard lock slots are only `try_lock`ed.
/// Concurrent calls for the same id serialize on the slot, so at most one
/// aggregate ever exists per download id.
pub struct TrackedDownloadService {
    parser: Arc<dyn ReleaseParser>,
    history: Arc<dyn HistoryProvider>,
    ttl: Duration,
    cache: DashMap<String, Slot>,
}

impl TrackedDownloadService {
    #[must_use]
    pub fn new(
        parser: Arc<dyn ReleaseParser>,
        history: Arc<dyn HistoryProvider>,
        config: &TrackingConfig,
    ) -> Self {
        Self {
            parser,
            history,
            ttl: Duration::hours(i64::from(config.ttl_hours)),
            cache: DashMap::new(),
        }
    }

    /// Tracks one snapshot, returning the current aggregate.
    ///
    /// Returns `None` when the download cannot be matched to the library.
    /// That is an expected outcome; the next poll simply tries again.
    #[must_use]
    pub fn track_download(
        &self,
        client: &DownloadClientDefinition,
        item: DownloadClientItem,
    ) -> Option<TrackedDownload> {
        self.track_download_at(client, item, Utc::now())
    }

    /// Same as [`track_download`](Self::track_download) with an explicit clock.
    #[must_use]
    #[instrument(skip(self, client, item, now), fields(client = %client.name, download_id = %item.download_id))]
    pub fn track_download_at(
        &self,
        client: &DownloadClientDefinition,
        item: DownloadClientItem,
        now: DateTime<Utc>,
    ) -> Option<TrackedDownload> {
        let download_id = item.download_id.clone();
        let mut item = item;
        loop {
            // Clone the Arc so the shard lock is released before the slot is locked.
            let slot = Arc::clone(self.cache.entry(download_id.clone()).or_default().value());
            match self.upsert(&slot, client, item, now) {
                Upsert::Done(tracked) => return tracked,
                // Slot was evicted while we waited on it; start over.
                Upsert::Retry(returned) => item = returned,
            }
        }
    }

    fn upsert(
        &self,
        slot: &Slot,
        client: &DownloadClientDefinition,
        item: DownloadClientItem,
        now: DateTime<Utc>,
    ) -> Upsert {
        let mut guard = lock(slot);
        if !self.is_current(&item.download_id, slot) {
            return Upsert::Retry(item);
        }

        if let Some(existing) = guard.as_mut() {
            existing.update_item(item, now);
            if existing.state() == TrackedDownloadState::Downloading {
                self.refresh_from_history(existing);
            }
            return Upsert::Done(Some(existing.clone()));
        }

        let download_id = item.download_id.clone();
        match self.create(client, item, now) {
            Ok(tracked) => {
                info!(
                    state = %tracked.state(),
                    units = tracked.release.as_ref().map_or(0, |r| r.units.len()),
                    "Tracking download"
                );
                *guard = Some(tracked.clone());
                Upsert::Done(Some(tracked))
            }
            Err(error) => {
                if error.is_expected() {
                    debug!(error = %error, "Download not tracked");
                } else {
                    warn!(error = %error, "Failed to track download");
                }
                drop(guard);
                self.remove_empty_slot(&download_id, slot);
                Upsert::Done(None)
            }
        }
    }

    /// Ingests one client's poll.
    ///
    /// A failed poll leaves every aggregate of that client untouched. After a
    /// successful poll, aggregates of that client missing from it are evicted.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::StaleSnapshot`] when `poll` is an error.
    #[instrument(skip(self, client, poll), fields(client = %client.name))]
    pub fn refresh_client(
        &self,
        client: &DownloadClientDefinition,
        poll: Result<Vec<DownloadClientItem>, CollaboratorError>,
    ) -> Result<Vec<TrackedDownload>, TrackingError> {
        self.refresh_client_at(client, poll, Utc::now())
    }

    /// Same as [`refresh_client`](Self::refresh_client) with an explicit clock.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::StaleSnapshot`] when `poll` is an error.
    pub fn refresh_client_at(
        &self,
        client: &DownloadClientDefinition,
        poll: Result<Vec<DownloadClientItem>, CollaboratorError>,
        now: DateTime<Utc>,
    ) -> Result<Vec<TrackedDownload>, TrackingError> {
        let items = match poll {
            Ok(items) => items,
            Err(error) => {
                warn!(error = %error, "Download client poll failed, keeping prior state");
                return Err(TrackingError::stale_snapshot(&client.name, error.to_string()));
            }
        };

        let seen: HashSet<String> = items.iter().map(|i| i.download_id.clone()).collect();
        let tracked: Vec<TrackedDownload> = items
            .into_iter()
            .filter_map(|item| self.track_download_at(client, item, now))
            .collect();

        let gone: Vec<String> = self
            .snapshot()
            .into_iter()
            .filter(|t| t.download_client_id == client.id && !seen.contains(t.download_id()))
            .map(|t| t.item.download_id)
            .collect();
        for download_id in &gone {
            self.remove(download_id);
        }

        debug!(tracked = tracked.len(), evicted = gone.len(), "Refreshed download client");
        Ok(tracked)
    }

    /// Current aggregate for a download id.
    #[must_use]
    pub fn find(&self, download_id: &str) -> Option<TrackedDownload> {
        let slot = self.cache.get(download_id).map(|s| Arc::clone(s.value()))?;
        let guard = lock(&slot);
        guard.clone()
    }

    /// Point-in-time copy of every resolved aggregate.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TrackedDownload> {
        let slots: Vec<Slot> = self.cache.iter().map(|s| Arc::clone(s.value())).collect();
        slots.iter().filter_map(|slot| lock(slot).clone()).collect()
    }

    /// Evicts an aggregate. Never touches the download client.
    pub fn remove(&self, download_id: &str) -> Option<TrackedDownload> {
        let (_, slot) = self.cache.remove(download_id)?;
        let removed = lock(&slot).take();
        if removed.is_some() {
            debug!(download_id, "Stopped tracking download");
        }
        removed
    }

    /// Drops aggregates not seen within the configured TTL.
    pub fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<String> = self
            .snapshot()
            .into_iter()
            .filter(|t| now - t.last_seen > self.ttl)
            .map(|t| t.item.download_id)
            .collect();
        for download_id in &expired {
            self.remove(download_id);
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), "Evicted expired tracked downloads");
        }
        expired.len()
    }

    /// Includes or excludes a download from the queue. Returns `false` if unknown.
    pub fn set_trackable(&self, download_id: &str, trackable: bool) -> bool {
        let Some(slot) = self.cache.get(download_id).map(|s| Arc::clone(s.value())) else {
            return false;
        };
        let mut guard = lock(&slot);
        match guard.as_mut() {
            Some(tracked) => {
                tracked.is_trackable = trackable;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn create(
        &self,
        client: &DownloadClientDefinition,
        item: DownloadClientItem,
        now: DateTime<Utc>,
    ) -> Result<TrackedDownload, TrackingError> {
        let history = self.history.find_by_download_id(&item.download_id)?;
        let mut parsed = self.parser.parse_title(&item.title)?;
        let mut release = match &parsed {
            Some(info) => self.parser.map(info)?,
            None => None,
        };

        if !is_resolved(release.as_ref()) {
            if let Some((info, fallback)) = self.resolve_from_history(&history)? {
                debug!(title = %item.title, "Resolved download from grab history");
                parsed = Some(info);
                release = fallback;
            }
        }

        let Some(release) = release.filter(|r| !r.units.is_empty()) else {
            return Err(if parsed.is_none() {
                TrackingError::unparsable(&item.title)
            } else {
                TrackingError::unmappable(&item.title)
            });
        };

        let mut tracked = TrackedDownload::new(client, item, now);
        tracked.parsed = parsed;
        tracked.release = Some(release);
        tracked.indexer = history::latest_of_type(&history, HistoryEventType::Grabbed)
            .and_then(|grab| grab.data.get(INDEXER_KEY).cloned());
        apply_history(&mut tracked, &history);
        Ok(tracked)
    }

    /// Re-identifies a download from its most recent grab.
    ///
    /// The unit set is widened to every unit grabbed under this download id.
    fn resolve_from_history(
        &self,
        history: &[HistoryEntry],
    ) -> Result<Option<(ParsedReleaseInfo, Option<ResolvedRelease>)>, CollaboratorError> {
        let Some(grab) = history::latest_of_type(history, HistoryEventType::Grabbed) else {
            return Ok(None);
        };
        let Some(info) = self.parser.parse_title(&grab.source_title)? else {
            return Ok(None);
        };

        let mut unit_ids: Vec<i64> = Vec::new();
        for entry in history.iter().filter(|e| e.event_type == HistoryEventType::Grabbed) {
            if !unit_ids.contains(&entry.unit_id) {
                unit_ids.push(entry.unit_id);
            }
        }

        let release = self.parser.map_with_ids(&info, grab.artist_id, &unit_ids)?;
        Ok(Some((info, release)))
    }

    fn refresh_from_history(&self, tracked: &mut TrackedDownload) {
        match self.history.find_by_download_id(tracked.download_id()) {
            Ok(history) => apply_history(tracked, &history),
            Err(error) => {
                warn!(error = %error, "History lookup failed, keeping prior state");
                tracked.warn("History unavailable", vec![error.to_string()]);
            }
        }
    }

    fn is_current(&self, download_id: &str, slot: &Slot) -> bool {
        self.cache
            .get(download_id)
            .is_some_and(|current| Arc::ptr_eq(current.value(), slot))
    }

    /// Removes a slot left empty by a failed first sighting.
    ///
    /// Skips slots that were replaced or are being worked on by another call.
    fn remove_empty_slot(&self, download_id: &str, slot: &Slot) {
        self.cache.remove_if(download_id, |_, current| {
            Arc::ptr_eq(current, slot) && current.try_lock().is_ok_and(|guard| guard.is_none())
        });
    }
}

impl std::fmt::Debug for TrackedDownloadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedDownloadService")
            .field("ttl", &self.ttl)
            .field("tracked", &self.cache.len())
            .finish_non_exhaustive()
    }
}

fn is_resolved(release: Option<&ResolvedRelease>) -> bool {
    release.is_some_and(|r| !r.units.is_empty())
}

/// Derives state and trackability from the latest history event.
fn apply_history(tracked: &mut TrackedDownload, history: &[HistoryEntry]) {
    let Some(latest) = history::latest(history) else {
        return;
    };

    if latest.event_type == HistoryEventType::DownloadIgnored {
        tracked.is_trackable = false;
        return;
    }

    let next = TrackedDownloadState::from_history(latest.event_type);
    let previous = tracked.state();
    if previous == next {
        return;
    }
    match tracked.transition_to(next) {
        Ok(()) => info!(
            download_id = %tracked.download_id(),
            from = %previous,
            to = %next,
            "Tracked download state changed"
        ),
        Err(error) => debug!(
            download_id = %tracked.download_id(),
            error = %error,
            "Ignoring history event"
        ),
    }
}
