use crate::decision::{
    EvaluationContext, RejectionType, RuleOutcome, Specification, SpecificationError,
    SpecificationPriority,
};
use crate::release::{ReleaseCandidate, Unit};

/// Rejects releases that would not improve files already on disk.
///
/// Only units with an existing file are checked. Each one must allow
/// upgrades, sit below the cutoff, and rank below the candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpgradeAllowedSpecification;

impl UpgradeAllowedSpecification {
    fn units<'a>(candidate: &'a ReleaseCandidate, ctx: &EvaluationContext<'a>) -> &'a [Unit] {
        if let Some(mapped) = &candidate.mapped {
            return &mapped.units;
        }
        match ctx.search {
            Some(search) => &search.units,
            None => &[],
        }
    }
}

impl Specification for UpgradeAllowedSpecification {
    fn name(&self) -> &'static str {
        "upgrade_allowed"
    }

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Database
    }

    fn rejection_type(&self) -> RejectionType {
        RejectionType::Permanent
    }

    fn check(
        &self,
        candidate: &ReleaseCandidate,
        ctx: &EvaluationContext<'_>,
    ) -> Result<RuleOutcome, SpecificationError> {
        let quality = candidate
            .quality()
            .ok_or_else(|| SpecificationError::missing_data("parsed quality", &candidate.title))?;
        let profile = ctx.profile;
        let comparer = profile.comparer();

        for unit in Self::units(candidate, ctx) {
            let Some(current) = &unit.current_quality else {
                continue;
            };

            if !profile.upgrade_allowed {
                return Ok(RuleOutcome::reject(format!(
                    "Upgrades are disabled and {} already has a file",
                    unit.title
                )));
            }
            if profile.cutoff_met(current) {
                return Ok(RuleOutcome::reject(format!(
                    "Existing file for {} meets cutoff: {current}",
                    unit.title
                )));
            }
            if !comparer.is_upgrade(current, quality) {
                return Ok(RuleOutcome::reject(format!(
                    "Existing file for {} is {current}, not an upgrade",
                    unit.title
                )));
            }
        }

        Ok(RuleOutcome::Accept)
    }
}
