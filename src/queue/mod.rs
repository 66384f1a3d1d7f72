//! Live queue view derived from tracked downloads.
//!
//! The queue is a recomputed cache, never a source of truth:
//!
//! - [`QueueMaterializer`] - Projects an immutable snapshot of tracked downloads into rows
//! - [`QueueStore`] - Holds the published rows; shared by writer and readers
//! - [`QueueEntry`] / [`QueueEntryId`] - One row and its stable identity

mod entry;
mod materializer;
mod store;

pub use entry::{QueueEntry, QueueEntryId};
pub use materializer::QueueMaterializer;
pub use store::QueueStore;
