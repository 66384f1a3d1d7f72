//! Release candidates and the library entities they map onto.
//!
//! A [`ReleaseCandidate`] is one search result returned by an indexer, before
//! any acceptance decision. Title parsing and library mapping happen upstream;
//! their results arrive here as [`ParsedReleaseInfo`] and [`ResolvedRelease`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quality::QualityModel;

/// Transport a release is fetched over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// NZB / usenet download.
    Usenet,
    /// `BitTorrent` download.
    Torrent,
}

impl Protocol {
    /// Returns the config/log representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usenet => "usenet",
            Self::Torrent => "torrent",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "usenet" => Ok(Self::Usenet),
            "torrent" => Ok(Self::Torrent),
            _ => Err(format!("invalid protocol: {s}")),
        }
    }
}

/// Library artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: i64,
    pub name: String,
}

/// One library unit (an album) that a release can satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: i64,
    pub title: String,
    /// Quality of the files currently on disk for this unit, if any.
    #[serde(default)]
    pub current_quality: Option<QualityModel>,
}

/// Library identity a release title was mapped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRelease {
    pub artist: Artist,
    pub units: Vec<Unit>,
}

impl ResolvedRelease {
    /// Returns the ids of every resolved unit, in resolution order.
    #[must_use]
    pub fn unit_ids(&self) -> Vec<i64> {
        self.units.iter().map(|u| u.id).collect()
    }
}

/// Fields extracted from a release title by the parsing collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReleaseInfo {
    pub artist_name: String,
    /// Unit titles named in the release; empty for a discography.
    #[serde(default)]
    pub unit_titles: Vec<String>,
    pub quality: QualityModel,
    #[serde(default)]
    pub release_group: Option<String>,
    /// Release claims to contain an artist's full set of units.
    #[serde(default)]
    pub discography: bool,
}

impl ParsedReleaseInfo {
    /// True when the release spans more than one unit.
    #[must_use]
    pub fn is_multi_unit(&self) -> bool {
        self.discography || self.unit_titles.len() > 1
    }
}

/// One indexer search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseCandidate {
    pub title: String,
    pub protocol: Protocol,
    /// Size in bytes.
    pub size: u64,
    pub publish_date: DateTime<Utc>,
    #[serde(default)]
    pub indexer_id: Option<i64>,
    #[serde(default)]
    pub indexer: Option<String>,
    #[serde(default)]
    pub seeders: Option<u32>,
    #[serde(default)]
    pub parsed: Option<ParsedReleaseInfo>,
    /// Library entities the parsed title maps onto, when known.
    #[serde(default)]
    pub mapped: Option<ResolvedRelease>,
}

impl ReleaseCandidate {
    /// Age of the release relative to `now`, in whole minutes.
    #[must_use]
    pub fn age_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.publish_date).num_minutes()
    }

    /// Quality claimed by the parsed title.
    #[must_use]
    pub fn quality(&self) -> Option<&QualityModel> {
        self.parsed.as_ref().map(|p| &p.quality)
    }

    /// True when this candidate spans more than one unit.
    #[must_use]
    pub fn is_full_release_set(&self) -> bool {
        self.parsed.as_ref().is_some_and(ParsedReleaseInfo::is_multi_unit)
    }
}

/// What a user or scheduled search asked for.
///
/// Automatic feed scans evaluate candidates without a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchContext {
    pub artist: Artist,
    pub units: Vec<Unit>,
    /// Search was started by a user rather than the scheduler.
    #[serde(default)]
    pub user_invoked: bool,
    /// Results will be shown to the user for manual selection.
    #[serde(default)]
    pub interactive: bool,
}

impl SearchContext {
    /// True when the search targets exactly one unit.
    #[must_use]
    pub fn is_single_unit(&self) -> bool {
        self.units.len() == 1
    }
}
