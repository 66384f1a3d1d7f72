//! Shared fakes for integration tests.
//!
//! Collaborators are in-memory: the parser understands "Artist - Album"
//! titles, history is a mutable list, and indexer settings are a map that
//! counts lookups.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use releasegate_core::history::INDEXER_KEY;
use releasegate_core::quality::{ProfileQualityItem, Quality, QualityModel, QualityProfile};
use releasegate_core::release::{Artist, ParsedReleaseInfo, ResolvedRelease, Unit};
use releasegate_core::seed::SeedCriteria;
use releasegate_core::{
    CollaboratorError, DownloadClientDefinition, DownloadClientItem, DownloadItemStatus,
    HistoryEntry, HistoryEventType, HistoryProvider, IndexerSettingsSource, Protocol,
    ReleaseCandidate, ReleaseParser,
};

pub const ARTIST_ID: i64 = 7;
pub const ARTIST_NAME: &str = "Boards of Canada";

pub fn artist() -> Artist {
    Artist {
        id: ARTIST_ID,
        name: ARTIST_NAME.to_string(),
    }
}

pub fn unit(id: i64, title: &str) -> Unit {
    Unit {
        id,
        title: title.to_string(),
        current_quality: None,
    }
}

/// MP3-192 (not wanted) < MP3-320 < FLAC, cutoff at FLAC.
pub fn profile() -> QualityProfile {
    QualityProfile {
        id: 1,
        name: "Lossless".to_string(),
        items: vec![
            ProfileQualityItem::single(Quality::mp3_192(), false),
            ProfileQualityItem::single(Quality::mp3_320(), true),
            ProfileQualityItem::single(Quality::flac(), true),
        ],
        cutoff: Quality::flac().id,
        upgrade_allowed: true,
        format_items: Vec::new(),
        min_format_score: 0,
    }
}

pub fn parsed(artist_name: &str, album: &str, quality: Quality) -> ParsedReleaseInfo {
    ParsedReleaseInfo {
        artist_name: artist_name.to_string(),
        unit_titles: vec![album.to_string()],
        quality: QualityModel::new(quality),
        release_group: None,
        discography: false,
    }
}

pub fn candidate(title: &str, protocol: Protocol, quality: Quality, size_mb: u64) -> ReleaseCandidate {
    let (artist_name, album) = title.split_once(" - ").unwrap_or((ARTIST_NAME, title));
    ReleaseCandidate {
        title: title.to_string(),
        protocol,
        size: size_mb * 1024 * 1024,
        publish_date: Utc::now() - chrono::Duration::days(1),
        indexer_id: Some(1),
        indexer: Some("Tracker".to_string()),
        seeders: Some(10),
        parsed: Some(parsed(artist_name, album, quality)),
        mapped: None,
    }
}

pub fn client(id: i64, protocol: Protocol) -> DownloadClientDefinition {
    DownloadClientDefinition {
        id,
        name: format!("client-{id}"),
        protocol,
    }
}

pub fn item(download_id: &str, title: &str, remaining_secs: Option<u64>) -> DownloadClientItem {
    DownloadClientItem {
        download_id: download_id.to_string(),
        title: title.to_string(),
        total_size: 400 * 1024 * 1024,
        remaining_size: 100 * 1024 * 1024,
        remaining_time: remaining_secs.map(Duration::from_secs),
        status: DownloadItemStatus::Downloading,
        message: None,
        output_path: None,
    }
}

pub fn history_event(
    download_id: &str,
    unit_id: i64,
    event_type: HistoryEventType,
    date: DateTime<Utc>,
) -> HistoryEntry {
    HistoryEntry {
        download_id: Some(download_id.to_string()),
        artist_id: ARTIST_ID,
        unit_id,
        event_type,
        date,
        source_title: format!("{ARTIST_NAME} - Geogaddi"),
        data: HashMap::new(),
    }
}

pub fn grab(download_id: &str, unit_id: i64, date: DateTime<Utc>) -> HistoryEntry {
    let mut entry = history_event(download_id, unit_id, HistoryEventType::Grabbed, date);
    entry.data.insert(INDEXER_KEY.to_string(), "Tracker".to_string());
    entry
}

// ==================== FakeParser for Testing ====================

/// Parses "Artist - Album" titles and maps known album titles to units.
pub struct FakeParser {
    units: Vec<Unit>,
    pub parse_calls: AtomicUsize,
}

impl FakeParser {
    pub fn with_units(units: Vec<Unit>) -> Self {
        Self {
            units,
            parse_calls: AtomicUsize::new(0),
        }
    }

    pub fn parse_calls(&self) -> usize {
        self.parse_calls.load(Ordering::SeqCst)
    }
}

impl ReleaseParser for FakeParser {
    fn parse_title(&self, title: &str) -> Result<Option<ParsedReleaseInfo>, CollaboratorError> {
        self.parse_calls.fetch_add(1, Ordering::SeqCst);
        Ok(title.split_once(" - ").map(|(artist, album)| ParsedReleaseInfo {
            artist_name: artist.to_string(),
            unit_titles: vec![album.to_string()],
            quality: QualityModel::new(Quality::flac()),
            release_group: None,
            discography: false,
        }))
    }

    fn map(&self, parsed: &ParsedReleaseInfo) -> Result<Option<ResolvedRelease>, CollaboratorError> {
        if parsed.artist_name != ARTIST_NAME {
            return Ok(None);
        }
        let units: Vec<Unit> = self
            .units
            .iter()
            .filter(|u| parsed.unit_titles.contains(&u.title))
            .cloned()
            .collect();
        Ok(Some(ResolvedRelease {
            artist: artist(),
            units,
        }))
    }

    fn map_with_ids(
        &self,
        _parsed: &ParsedReleaseInfo,
        artist_id: i64,
        unit_ids: &[i64],
    ) -> Result<Option<ResolvedRelease>, CollaboratorError> {
        if artist_id != ARTIST_ID {
            return Ok(None);
        }
        let units: Vec<Unit> = self
            .units
            .iter()
            .filter(|u| unit_ids.contains(&u.id))
            .cloned()
            .collect();
        Ok(Some(ResolvedRelease {
            artist: artist(),
            units,
        }))
    }
}

// ==================== FakeHistory for Testing ====================

#[derive(Default)]
pub struct FakeHistory {
    entries: Mutex<Vec<HistoryEntry>>,
    failing: Mutex<bool>,
}

impl FakeHistory {
    pub fn push(&self, entry: HistoryEntry) {
        self.entries.lock().unwrap().push(entry);
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    fn check(&self) -> Result<(), CollaboratorError> {
        if *self.failing.lock().unwrap() {
            Err(CollaboratorError::unavailable("history", "database locked"))
        } else {
            Ok(())
        }
    }
}

impl HistoryProvider for FakeHistory {
    fn find_by_download_id(&self, download_id: &str) -> Result<Vec<HistoryEntry>, CollaboratorError> {
        self.check()?;
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.download_id.as_deref() == Some(download_id))
            .cloned()
            .collect())
    }
}

// ==================== FakeIndexerSettings for Testing ====================

#[derive(Default)]
pub struct FakeIndexerSettings {
    criteria: Mutex<HashMap<i64, SeedCriteria>>,
    pub lookups: AtomicUsize,
}

impl FakeIndexerSettings {
    pub fn set(&self, indexer_id: i64, criteria: SeedCriteria) {
        self.criteria.lock().unwrap().insert(indexer_id, criteria);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl IndexerSettingsSource for FakeIndexerSettings {
    fn seed_criteria(&self, indexer_id: i64) -> Result<Option<SeedCriteria>, CollaboratorError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.criteria.lock().unwrap().get(&indexer_id).cloned())
    }
}
