//! Ranking of accepted decisions for one search.

use std::cmp::{Ordering, Reverse};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Decision;
use crate::config::PrioritizationConfig;
use crate::quality::QualityProfile;
use crate::release::Protocol;

/// Last ordering key applied when quality, format score and protocol tie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryTiebreak {
    /// Larger releases first.
    #[default]
    Size,
    /// Newest releases first.
    PublishDate,
}

/// Orders accepted decisions best-first.
///
/// Keys, in order: quality descending (group order respected), custom-format
/// score descending, preferred protocol, then the secondary tiebreak. The
/// sort is stable, so full ties keep indexer order.
#[derive(Debug, Clone, Default)]
pub struct ReleasePrioritizer {
    config: PrioritizationConfig,
}

impl ReleasePrioritizer {
    #[must_use]
    pub fn new(config: PrioritizationConfig) -> Self {
        Self { config }
    }

    /// Drops rejected decisions and sorts the rest best-first.
    #[must_use]
    pub fn prioritize(&self, decisions: Vec<Decision>, profile: &QualityProfile) -> Vec<Decision> {
        let comparer = profile.comparer();

        // Scores are computed once; regex matching is the expensive part.
        let mut scored: Vec<(i32, Decision)> = decisions
            .into_iter()
            .filter(Decision::is_accepted)
            .map(|decision| (profile.format_score(&decision.candidate), decision))
            .collect();

        scored.sort_by(|(left_score, left), (right_score, right)| {
            let quality = match (left.candidate.quality(), right.candidate.quality()) {
                (Some(l), Some(r)) => comparer.compare(r, l, true),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };

            quality
                .then_with(|| right_score.cmp(left_score))
                .then_with(|| {
                    self.protocol_rank(left.candidate.protocol)
                        .cmp(&self.protocol_rank(right.candidate.protocol))
                })
                .then_with(|| match self.config.secondary_tiebreak {
                    SecondaryTiebreak::Size => right.candidate.size.cmp(&left.candidate.size),
                    SecondaryTiebreak::PublishDate => Reverse(left.candidate.publish_date)
                        .cmp(&Reverse(right.candidate.publish_date)),
                })
        });

        debug!(accepted = scored.len(), "Prioritized releases");
        scored.into_iter().map(|(_, decision)| decision).collect()
    }

    /// The single best accepted decision, if any.
    #[must_use]
    pub fn best(&self, decisions: Vec<Decision>, profile: &QualityProfile) -> Option<Decision> {
        self.prioritize(decisions, profile).into_iter().next()
    }

    /// 0 for the preferred protocol, 1 otherwise; all 0 when none is set.
    fn protocol_rank(&self, protocol: Protocol) -> u8 {
        match self.config.preferred_protocol {
            Some(preferred) if preferred != protocol => 1,
            _ => 0,
        }
    }
}
