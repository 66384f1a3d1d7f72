//! Quality tiers, revisions, profiles and the comparator built on them.
//!
//! # Overview
//!
//! - [`Quality`] - One ranked tier (e.g. `FLAC`, `MP3-320`)
//! - [`Revision`] - Tie-break within a tier (version, repack, real)
//! - [`QualityModel`] - A tier plus its revision, as claimed by a release
//! - [`QualityProfile`] - Ordered allowed tiers, cutoff and custom-format scores
//! - [`QualityComparer`] - Ranking over quality models given a profile
//! - [`CustomFormat`] - Title/group/size/protocol conditions that add score

mod comparer;
mod custom_format;
mod profile;

pub use comparer::{QualityComparer, QualityIndex};
pub use custom_format::{ConditionKind, CustomFormat, FormatCondition, Pattern};
pub use profile::{ProfileFormatItem, ProfileQualityItem, QualityProfile};

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A quality tier.
///
/// Identity is the numeric `id`; the name is for display only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quality {
    pub id: i32,
    pub name: String,
}

impl Quality {
    #[must_use]
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn unknown() -> Self {
        Self::new(0, "Unknown")
    }

    #[must_use]
    pub fn mp3_192() -> Self {
        Self::new(1, "MP3-192")
    }

    #[must_use]
    pub fn mp3_vbr() -> Self {
        Self::new(2, "MP3-VBR-V0")
    }

    #[must_use]
    pub fn mp3_256() -> Self {
        Self::new(3, "MP3-256")
    }

    #[must_use]
    pub fn mp3_320() -> Self {
        Self::new(4, "MP3-320")
    }

    #[must_use]
    pub fn flac() -> Self {
        Self::new(6, "FLAC")
    }

    #[must_use]
    pub fn aac_256() -> Self {
        Self::new(11, "AAC-256")
    }

    #[must_use]
    pub fn flac_24() -> Self {
        Self::new(21, "FLAC 24bit")
    }
}

impl PartialEq for Quality {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Quality {}

impl Hash for Quality {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Secondary ranking inside one tier.
///
/// Field order matters: the derived `Ord` compares `version` first, then
/// `repack`, then `real`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Revision {
    pub version: u32,
    #[serde(default)]
    pub repack: bool,
    #[serde(default)]
    pub real: bool,
}

impl Revision {
    #[must_use]
    pub const fn new(version: u32) -> Self {
        Self {
            version,
            repack: false,
            real: false,
        }
    }

    #[must_use]
    pub const fn repack(version: u32) -> Self {
        Self {
            version,
            repack: true,
            real: false,
        }
    }
}

impl Default for Revision {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Quality claimed by a release or present on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualityModel {
    pub quality: Quality,
    #[serde(default)]
    pub revision: Revision,
}

impl QualityModel {
    /// Tier with the default revision (version 1, no repack/real).
    #[must_use]
    pub fn new(quality: Quality) -> Self {
        Self {
            quality,
            revision: Revision::default(),
        }
    }

    #[must_use]
    pub fn with_revision(quality: Quality, revision: Revision) -> Self {
        Self { quality, revision }
    }
}

impl fmt::Display for QualityModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.quality, self.revision.version)?;
        if self.revision.repack {
            write!(f, " REPACK")?;
        }
        if self.revision.real {
            write!(f, " REAL")?;
        }
        Ok(())
    }
}
