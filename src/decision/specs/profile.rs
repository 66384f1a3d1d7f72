//! Rules checked against the quality profile.

use crate::decision::{
    EvaluationContext, RejectionType, RuleOutcome, Specification, SpecificationError,
    SpecificationPriority,
};
use crate::release::ReleaseCandidate;

/// Rejects qualities the profile does not list or does not allow.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityAllowedSpecification;

impl Specification for QualityAllowedSpecification {
    fn name(&self) -> &'static str {
        "quality_allowed"
    }

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Default
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

        if ctx.profile.is_allowed(&quality.quality) {
            Ok(RuleOutcome::Accept)
        } else {
            Ok(RuleOutcome::reject(format!(
                "Quality {} is not wanted in profile",
                quality.quality
            )))
        }
    }
}

/// Rejects releases whose custom-format score is below the profile minimum.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomFormatScoreSpecification;

impl Specification for CustomFormatScoreSpecification {
    fn name(&self) -> &'static str {
        "custom_format_score"
    }

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Default
    }

    fn rejection_type(&self) -> RejectionType {
        RejectionType::Permanent
    }

    fn check(
        &self,
        candidate: &ReleaseCandidate,
        ctx: &EvaluationContext<'_>,
    ) -> Result<RuleOutcome, SpecificationError> {
        let score = ctx.profile.format_score(candidate);
        if score < ctx.profile.min_format_score {
            return Ok(RuleOutcome::reject(format!(
                "Custom formats score {score} is below the minimum of {}",
                ctx.profile.min_format_score
            )));
        }
        Ok(RuleOutcome::Accept)
    }
}
