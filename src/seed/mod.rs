//! Per-indexer torrent seed targets.
//!
//! Criteria are fetched from the indexer settings collaborator and cached
//! per indexer id with a rolling TTL. Settings changes are pushed over a
//! broadcast channel of [`IndexerEvent`]s and drop the affected entries
//! immediately.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::config::SeedCacheConfig;
use crate::ports::IndexerSettingsSource;
use crate::release::{Protocol, ReleaseCandidate};

/// Seed settings stored on a torrent indexer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedCriteria {
    /// Ratio target, applies to every release from the indexer.
    pub seed_ratio: Option<f64>,
    /// Seed time for single-unit releases.
    pub seed_time_minutes: Option<u32>,
    /// Seed time for discographies and other full sets.
    pub discography_seed_time_minutes: Option<u32>,
}

/// Seed targets handed to the download client with a grab.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedConfig {
    pub ratio: Option<f64>,
    pub seed_time: Option<Duration>,
}

impl SeedConfig {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ratio.is_none() && self.seed_time.is_none()
    }
}

/// Indexer settings lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexerEvent {
    SettingsChanged(i64),
    Deleted(i64),
    /// Bulk edit or reload; every cached entry is stale.
    AllChanged,
}

#[derive(Debug)]
struct CachedCriteria {
    criteria: Option<SeedCriteria>,
    expires_at: Instant,
}

/// TTL cache in front of [`IndexerSettingsSource`].
///
/// Every invalidation bumps `epoch` before removing entries. A fetch that
/// started under an older epoch returns its value but does not cache it,
/// so an event landing mid-fetch is never overwritten by the stale read.
pub struct SeedConfigResolver {
    source: Arc<dyn IndexerSettingsSource>,
    ttl: Duration,
    cache: DashMap<i64, CachedCriteria>,
    epoch: AtomicU64,
}

impl SeedConfigResolver {
    #[must_use]
    pub fn new(source: Arc<dyn IndexerSettingsSource>, config: &SeedCacheConfig) -> Self {
        Self {
            source,
            ttl: config.ttl(),
            cache: DashMap::new(),
            epoch: AtomicU64::new(0),
        }
    }

    /// Seed targets for a release, or `None` when none apply.
    ///
    /// Only torrents from a known indexer have seed targets. Lookup failures
    /// are logged and treated as "no targets".
    #[must_use]
    pub fn get_seed_configuration(
        &self,
        protocol: Protocol,
        indexer_id: Option<i64>,
        is_full_release_set: bool,
    ) -> Option<SeedConfig> {
        self.get_seed_configuration_at(protocol, indexer_id, is_full_release_set, Instant::now())
    }

    /// Same as [`get_seed_configuration`](Self::get_seed_configuration) with an explicit clock.
    #[must_use]
    #[instrument(skip(self, now))]
    pub fn get_seed_configuration_at(
        &self,
        protocol: Protocol,
        indexer_id: Option<i64>,
        is_full_release_set: bool,
        now: Instant,
    ) -> Option<SeedConfig> {
        if protocol != Protocol::Torrent {
            return None;
        }
        let indexer_id = indexer_id?;
        let criteria = self.criteria(indexer_id, now)?;

        let seed_time = if is_full_release_set {
            criteria.discography_seed_time_minutes
        } else {
            criteria.seed_time_minutes
        };
        let config = SeedConfig {
            ratio: criteria.seed_ratio,
            seed_time: seed_time.map(|minutes| Duration::from_secs(u64::from(minutes) * 60)),
        };

        if config.is_empty() { None } else { Some(config) }
    }

    /// Convenience over a candidate's protocol, indexer and set size.
    #[must_use]
    pub fn for_candidate(&self, candidate: &ReleaseCandidate) -> Option<SeedConfig> {
        self.get_seed_configuration(
            candidate.protocol,
            candidate.indexer_id,
            candidate.is_full_release_set(),
        )
    }

    fn criteria(&self, indexer_id: i64, now: Instant) -> Option<SeedCriteria> {
        if let Some(mut cached) = self.cache.get_mut(&indexer_id) {
            if cached.expires_at > now {
                cached.expires_at = now + self.ttl;
                return cached.criteria.clone();
            }
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        match self.source.seed_criteria(indexer_id) {
            Ok(criteria) => {
                debug!(indexer_id, found = criteria.is_some(), "Fetched seed criteria");
                self.store(indexer_id, epoch, criteria.clone(), now);
                criteria
            }
            Err(error) => {
                warn!(indexer_id, error = %error, "Unable to load seed criteria");
                None
            }
        }
    }

    /// Caches a fetched value unless an invalidation happened since `epoch`.
    ///
    /// The epoch is checked while the entry's shard is locked, so an
    /// invalidation either precedes the check or removes the new entry.
    fn store(&self, indexer_id: i64, epoch: u64, criteria: Option<SeedCriteria>, now: Instant) {
        let entry = self.cache.entry(indexer_id);
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!(indexer_id, "Seed criteria changed during fetch, not caching");
            return;
        }
        let cached = CachedCriteria {
            criteria,
            expires_at: now + self.ttl,
        };
        match entry {
            Entry::Occupied(mut occupied) => {
                occupied.insert(cached);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(cached);
            }
        }
    }

    /// Drops the cached entry for one indexer.
    pub fn invalidate(&self, indexer_id: i64) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if self.cache.remove(&indexer_id).is_some() {
            debug!(indexer_id, "Invalidated seed criteria");
        }
    }

    pub fn clear(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.cache.clear();
    }

    pub fn handle(&self, event: IndexerEvent) {
        match event {
            IndexerEvent::SettingsChanged(id) | IndexerEvent::Deleted(id) => self.invalidate(id),
            IndexerEvent::AllChanged => self.clear(),
        }
    }

    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Applies indexer events until the channel closes.
    ///
    /// A lagging receiver has missed events it cannot replay, so the whole
    /// cache is cleared.
    pub fn spawn_invalidation_listener(
        self: Arc<Self>,
        mut events: broadcast::Receiver<IndexerEvent>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => self.handle(event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Indexer event listener lagged, clearing seed cache");
                        self.clear();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Indexer event listener stopped");
        })
    }
}

impl std::fmt::Debug for SeedConfigResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedConfigResolver")
            .field("ttl", &self.ttl)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}
