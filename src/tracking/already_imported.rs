use tracing::{debug, trace};

use super::TrackedDownload;
use crate::history::HistoryEntry;

/// Whether every unit of a tracked download has been imported.
///
/// `history` is the history recorded for the download's id. The answer is
/// all-or-nothing: a multi-unit download with one unit still missing an
/// import event is not imported. Entries for units outside the resolved
/// release are ignored.
#[must_use]
pub fn is_imported(tracked: &TrackedDownload, history: &[HistoryEntry]) -> bool {
    if history.is_empty() {
        trace!(download_id = %tracked.download_id(), "No history, not imported");
        return false;
    }

    let Some(release) = tracked.release.as_ref().filter(|r| !r.units.is_empty()) else {
        debug!(
            download_id = %tracked.download_id(),
            "No resolved units, treating as imported"
        );
        return true;
    };

    let all_imported = release.units.iter().all(|unit| {
        let imported = history
            .iter()
            .any(|entry| entry.unit_id == unit.id && entry.event_type.is_import());
        if !imported {
            trace!(
                download_id = %tracked.download_id(),
                unit_id = unit.id,
                "Unit has no import event"
            );
        }
        imported
    });

    debug!(
        download_id = %tracked.download_id(),
        units = release.units.len(),
        imported = all_imported,
        "Checked import history"
    );
    all_imported
}
