//! Rules driven purely by configuration limits and candidate metadata.

use crate::decision::{
    EvaluationContext, RejectionType, RuleOutcome, Specification, SpecificationError,
    SpecificationPriority,
};
use crate::release::{Protocol, ReleaseCandidate};

const BYTES_PER_MB: u64 = 1024 * 1024;
const MINUTES_PER_DAY: i64 = 24 * 60;

/// Rejects candidates using a protocol that is switched off.
#[derive(Debug, Clone)]
pub struct ProtocolEnabledSpecification {
    enabled: Vec<Protocol>,
}

impl ProtocolEnabledSpecification {
    #[must_use]
    pub fn new(enabled: Vec<Protocol>) -> Self {
        Self { enabled }
    }
}

impl Specification for ProtocolEnabledSpecification {
    fn name(&self) -> &'static str {
        "protocol_enabled"
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
        _ctx: &EvaluationContext<'_>,
    ) -> Result<RuleOutcome, SpecificationError> {
        if self.enabled.contains(&candidate.protocol) {
            Ok(RuleOutcome::Accept)
        } else {
            Ok(RuleOutcome::reject(format!(
                "{} is not enabled",
                candidate.protocol
            )))
        }
    }
}

/// Rejects releases above a configured size. 0 disables the limit.
#[derive(Debug, Clone, Copy)]
pub struct MaximumSizeSpecification {
    maximum_mb: u64,
}

impl MaximumSizeSpecification {
    #[must_use]
    pub fn new(maximum_mb: u64) -> Self {
        Self { maximum_mb }
    }
}

impl Specification for MaximumSizeSpecification {
    fn name(&self) -> &'static str {
        "maximum_size"
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
        _ctx: &EvaluationContext<'_>,
    ) -> Result<RuleOutcome, SpecificationError> {
        if self.maximum_mb == 0 {
            return Ok(RuleOutcome::Accept);
        }

        let maximum = self.maximum_mb.saturating_mul(BYTES_PER_MB);
        if candidate.size > maximum {
            return Ok(RuleOutcome::reject(format!(
                "{} MB is too big, maximum size is {} MB",
                candidate.size / BYTES_PER_MB,
                self.maximum_mb
            )));
        }
        Ok(RuleOutcome::Accept)
    }
}

/// Rejects usenet posts older than the provider's retention. 0 disables.
#[derive(Debug, Clone, Copy)]
pub struct RetentionSpecification {
    retention_days: u32,
}

impl RetentionSpecification {
    #[must_use]
    pub fn new(retention_days: u32) -> Self {
        Self { retention_days }
    }
}

impl Specification for RetentionSpecification {
    fn name(&self) -> &'static str {
        "retention"
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
        if candidate.protocol != Protocol::Usenet || self.retention_days == 0 {
            return Ok(RuleOutcome::Accept);
        }

        let age_days = candidate.age_minutes(ctx.now) / MINUTES_PER_DAY;
        if age_days > i64::from(self.retention_days) {
            return Ok(RuleOutcome::reject(format!(
                "Older than configured retention: {age_days} days, retention is {} days",
                self.retention_days
            )));
        }
        Ok(RuleOutcome::Accept)
    }
}

/// Defers usenet posts that are too new to have propagated.
///
/// User-invoked searches bypass the delay.
#[derive(Debug, Clone, Copy)]
pub struct MinimumAgeSpecification {
    minimum_minutes: u32,
}

impl MinimumAgeSpecification {
    #[must_use]
    pub fn new(minimum_minutes: u32) -> Self {
        Self { minimum_minutes }
    }
}

impl Specification for MinimumAgeSpecification {
    fn name(&self) -> &'static str {
        "minimum_age"
    }

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Default
    }

    fn rejection_type(&self) -> RejectionType {
        RejectionType::Temporary
    }

    fn check(
        &self,
        candidate: &ReleaseCandidate,
        ctx: &EvaluationContext<'_>,
    ) -> Result<RuleOutcome, SpecificationError> {
        if candidate.protocol != Protocol::Usenet || self.minimum_minutes == 0 {
            return Ok(RuleOutcome::Accept);
        }
        if ctx.search.is_some_and(|s| s.user_invoked || s.interactive) {
            return Ok(RuleOutcome::Accept);
        }

        let age = candidate.age_minutes(ctx.now);
        if age < i64::from(self.minimum_minutes) {
            return Ok(RuleOutcome::reject(format!(
                "Only {age} minutes old, minimum age is {} minutes",
                self.minimum_minutes
            )));
        }
        Ok(RuleOutcome::Accept)
    }
}
