//! Published queue snapshots.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::{QueueEntry, QueueEntryId};

#[derive(Debug)]
struct Published {
    generation: u64,
    entries: Arc<[QueueEntry]>,
}

/// Holds the current queue view.
///
/// Constructed once and shared by the rebuild path (writer) and presentation
/// (readers). Readers get an immutable `Arc<[QueueEntry]>` that never changes
/// under them. Each rebuild reserves a generation before it reads tracked
/// state; a result for an older generation never replaces a newer one.
#[derive(Debug)]
pub struct QueueStore {
    next_generation: AtomicU64,
    published: RwLock<Published>,
}

impl QueueStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_generation: AtomicU64::new(1),
            published: RwLock::new(Published {
                generation: 0,
                entries: Arc::from(Vec::new()),
            }),
        }
    }

    /// Reserves the generation for a rebuild about to start.
    #[must_use]
    pub fn begin_rebuild(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::SeqCst)
    }

    /// Publishes a rebuild result. Returns `false` if a newer one is already live.
    pub fn publish(&self, generation: u64, entries: Vec<QueueEntry>) -> bool {
        let mut published = self
            .published
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if generation <= published.generation {
            debug!(
                generation,
                current = published.generation,
                "Discarding stale queue rebuild"
            );
            return false;
        }
        published.generation = generation;
        published.entries = Arc::from(entries);
        true
    }

    /// Current queue view.
    #[must_use]
    pub fn snapshot(&self) -> Arc<[QueueEntry]> {
        Arc::clone(
            &self
                .published
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .entries,
        )
    }

    /// Generation of the current view; 0 before the first publish.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    #[must_use]
    pub fn find(&self, id: &QueueEntryId) -> Option<QueueEntry> {
        self.snapshot().iter().find(|e| &e.id == id).cloned()
    }

    /// Looks up a row by its [`QueueEntryId::scalar`] form.
    #[must_use]
    pub fn find_by_scalar(&self, scalar: u64) -> Option<QueueEntry> {
        self.snapshot()
            .iter()
            .find(|e| e.id.scalar() == scalar)
            .cloned()
    }
}

impl Default for QueueStore {
    fn default() -> Self {
        Self::new()
    }
}
