//! Quality profile: which tiers are wanted, how they rank, and when to stop upgrading.

use serde::{Deserialize, Serialize};

use super::{CustomFormat, Quality, QualityComparer, QualityModel};
use crate::release::ReleaseCandidate;

/// One entry in a profile's ordered item list.
///
/// Grouped qualities are equally preferred unless a comparison explicitly
/// respects group order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileQualityItem {
    Single {
        quality: Quality,
        allowed: bool,
    },
    Group {
        /// Group ids share the cutoff namespace with quality ids and must not collide.
        id: i32,
        name: String,
        qualities: Vec<Quality>,
        allowed: bool,
    },
}

impl ProfileQualityItem {
    #[must_use]
    pub fn single(quality: Quality, allowed: bool) -> Self {
        Self::Single { quality, allowed }
    }

    #[must_use]
    pub fn group(id: i32, name: impl Into<String>, qualities: Vec<Quality>, allowed: bool) -> Self {
        Self::Group {
            id,
            name: name.into(),
            qualities,
            allowed,
        }
    }

    #[must_use]
    pub fn is_allowed(&self) -> bool {
        match self {
            Self::Single { allowed, .. } | Self::Group { allowed, .. } => *allowed,
        }
    }

    /// Position of `quality` inside this item, if it belongs here.
    pub(crate) fn position_of(&self, quality: &Quality) -> Option<usize> {
        match self {
            Self::Single { quality: q, .. } => (q == quality).then_some(0),
            Self::Group { qualities, .. } => qualities.iter().position(|q| q == quality),
        }
    }

    /// Id used for cutoff lookups: the quality id or the group id.
    #[must_use]
    pub fn cutoff_id(&self) -> i32 {
        match self {
            Self::Single { quality, .. } => quality.id,
            Self::Group { id, .. } => *id,
        }
    }
}

/// Score a custom format contributes under a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileFormatItem {
    pub format: CustomFormat,
    pub score: i32,
}

/// Ordered allowed tiers plus upgrade cutoff and custom-format scoring.
///
/// `items` runs from least to most preferred: the last item is the best tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityProfile {
    pub id: i64,
    pub name: String,
    pub items: Vec<ProfileQualityItem>,
    /// Quality id or group id at which upgrading stops.
    pub cutoff: i32,
    #[serde(default = "default_true")]
    pub upgrade_allowed: bool,
    #[serde(default)]
    pub format_items: Vec<ProfileFormatItem>,
    #[serde(default)]
    pub min_format_score: i32,
}

fn default_true() -> bool {
    true
}

impl QualityProfile {
    /// Comparator over this profile's item ordering.
    #[must_use]
    pub fn comparer(&self) -> QualityComparer<'_> {
        QualityComparer::new(self)
    }

    /// True when `quality` is listed and its item is allowed.
    #[must_use]
    pub fn is_allowed(&self, quality: &Quality) -> bool {
        self.items
            .iter()
            .find(|item| item.position_of(quality).is_some())
            .is_some_and(ProfileQualityItem::is_allowed)
    }

    /// Index of the cutoff item, or `None` if the cutoff is not in the item list.
    #[must_use]
    pub fn cutoff_index(&self) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.cutoff_id() == self.cutoff)
    }

    /// True when `current` already reaches the cutoff tier.
    ///
    /// A profile whose cutoff is missing from its items treats every listed
    /// quality as meeting it, so nothing is upgraded indefinitely.
    #[must_use]
    pub fn cutoff_met(&self, current: &QualityModel) -> bool {
        let Some(current_index) = self.comparer().index_of(&current.quality) else {
            return false;
        };
        self.cutoff_index()
            .is_none_or(|cutoff| current_index.index >= cutoff)
    }

    /// Sum of the scores of every matching custom format.
    #[must_use]
    pub fn format_score(&self, candidate: &ReleaseCandidate) -> i32 {
        self.format_items
            .iter()
            .filter(|item| item.format.matches(candidate))
            .map(|item| item.score)
            .sum()
    }
}
