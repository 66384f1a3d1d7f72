//! Ranking of quality models under a profile.
//!
//! Used both for upgrade decisions and for ordering accepted releases.

use std::cmp::Ordering;

use super::{Quality, QualityModel, QualityProfile};

/// Where a quality sits in a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QualityIndex {
    /// Position of the containing item in the profile's list.
    pub index: usize,
    /// Position inside a group; always 0 for ungrouped items.
    pub group_index: usize,
}

/// Compares quality models by their rank in one profile.
///
/// Tier dominates revision. Qualities missing from the profile rank below
/// every listed quality and compare equal to each other on tier.
#[derive(Debug, Clone, Copy)]
pub struct QualityComparer<'a> {
    profile: &'a QualityProfile,
}

impl<'a> QualityComparer<'a> {
    #[must_use]
    pub fn new(profile: &'a QualityProfile) -> Self {
        Self { profile }
    }

    /// Locates `quality` in the profile, or `None` when it is not listed.
    #[must_use]
    pub fn index_of(&self, quality: &Quality) -> Option<QualityIndex> {
        self.profile
            .items
            .iter()
            .enumerate()
            .find_map(|(index, item)| {
                item.position_of(quality)
                    .map(|group_index| QualityIndex { index, group_index })
            })
    }

    /// Compares tiers only.
    ///
    /// Grouped members are equal unless `respect_group_order` is set, in
    /// which case a later position in the group wins.
    #[must_use]
    pub fn compare_quality(&self, a: &Quality, b: &Quality, respect_group_order: bool) -> Ordering {
        let left = self.index_of(a);
        let right = self.index_of(b);
        match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(l), Some(r)) if respect_group_order => l.cmp(&r),
            (Some(l), Some(r)) => l.index.cmp(&r.index),
        }
    }

    /// Compares tier first, then revision.
    #[must_use]
    pub fn compare(&self, a: &QualityModel, b: &QualityModel, respect_group_order: bool) -> Ordering {
        self.compare_quality(&a.quality, &b.quality, respect_group_order)
            .then_with(|| a.revision.cmp(&b.revision))
    }

    /// True when `candidate` ranks strictly above `current`.
    #[must_use]
    pub fn is_upgrade(&self, current: &QualityModel, candidate: &QualityModel) -> bool {
        self.compare(candidate, current, true) == Ordering::Greater
    }
}
