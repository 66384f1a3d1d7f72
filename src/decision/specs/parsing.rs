use crate::decision::{
    EvaluationContext, RejectionType, RuleOutcome, Specification, SpecificationError,
    SpecificationPriority,
};
use crate::release::ReleaseCandidate;

/// Rejects candidates whose title could not be parsed upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParsedSpecification;

impl Specification for ParsedSpecification {
    fn name(&self) -> &'static str {
        "parsed"
    }

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Parsing
    }

    fn rejection_type(&self) -> RejectionType {
        RejectionType::Permanent
    }

    fn check(
        &self,
        candidate: &ReleaseCandidate,
        _ctx: &EvaluationContext<'_>,
    ) -> Result<RuleOutcome, SpecificationError> {
        if candidate.parsed.is_none() {
            return Ok(RuleOutcome::reject("Unable to parse release"));
        }
        Ok(RuleOutcome::Accept)
    }
}
