//! Rule registry with the short-circuiting evaluation loop.

use tracing::{debug, warn};

use super::specs;
use super::{
    Decision, EvaluationContext, Rejection, RejectionType, RuleOutcome, Specification,
};
use crate::config::DecisionConfig;
use crate::release::ReleaseCandidate;

/// A priority-ordered collection of acceptance rules.
///
/// Rules run cheapest first (ascending priority); within one priority level,
/// registration order is preserved. Evaluation stops at the first rejection.
pub struct DecisionEngine {
    rules: Vec<Box<dyn Specification>>,
}

impl DecisionEngine {
    /// Creates an engine with no rules; every candidate is accepted.
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Creates an engine with the built-in rule set.
    #[must_use]
    pub fn with_default_rules(config: &DecisionConfig) -> Self {
        let mut engine = Self::new();
        engine.register(Box::new(specs::ParsedSpecification));
        engine.register(Box::new(specs::ProtocolEnabledSpecification::new(
            config.enabled_protocols.clone(),
        )));
        engine.register(Box::new(specs::MaximumSizeSpecification::new(
            config.maximum_size_mb,
        )));
        engine.register(Box::new(specs::RetentionSpecification::new(
            config.retention_days,
        )));
        engine.register(Box::new(specs::MinimumAgeSpecification::new(
            config.minimum_age_minutes,
        )));
        engine.register(Box::new(specs::QualityAllowedSpecification));
        engine.register(Box::new(specs::CustomFormatScoreSpecification));
        engine.register(Box::new(specs::DiscographySpecification));
        engine.register(Box::new(specs::ArtistMatchesSpecification));
        engine.register(Box::new(specs::UnitRequestedSpecification));
        engine.register(Box::new(specs::UpgradeAllowedSpecification));
        engine
    }

    /// Registers a rule, keeping the list sorted by priority.
    #[tracing::instrument(skip(self, rule), fields(rule_name))]
    pub fn register(&mut self, rule: Box<dyn Specification>) {
        tracing::Span::current().record("rule_name", rule.name());
        debug!(
            name = rule.name(),
            priority = ?rule.priority(),
            "Registering rule"
        );
        self.rules.push(rule);
        // Stable sort: equal priorities keep registration order.
        self.rules.sort_by_key(|r| r.priority());
    }

    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names in evaluation order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Evaluates one candidate, returning at most one rejection.
    ///
    /// A rule that fails to reach a verdict produces a temporary rejection
    /// and is logged; it never propagates.
    #[tracing::instrument(skip(self, candidate, ctx), fields(title = %candidate.title))]
    pub fn evaluate(&self, candidate: &ReleaseCandidate, ctx: &EvaluationContext<'_>) -> Decision {
        for rule in &self.rules {
            match rule.check(candidate, ctx) {
                Ok(RuleOutcome::Accept) => {}
                Ok(RuleOutcome::Reject(reason)) => {
                    debug!(rule = rule.name(), reason = %reason, "Release rejected");
                    return Decision::rejected(
                        candidate.clone(),
                        Rejection::new(rule.name(), reason, rule.rejection_type()),
                    );
                }
                Err(error) => {
                    warn!(
                        rule = rule.name(),
                        error = %error,
                        "Rule failed, treating as temporary rejection"
                    );
                    return Decision::rejected(
                        candidate.clone(),
                        Rejection::new(
                            rule.name(),
                            format!("Unable to evaluate {}: {error}", rule.name()),
                            RejectionType::Temporary,
                        ),
                    );
                }
            }
        }

        debug!("Release accepted");
        Decision::accepted(candidate.clone())
    }

    /// Evaluates a batch, preserving input order.
    #[must_use]
    pub fn evaluate_all(
        &self,
        candidates: &[ReleaseCandidate],
        ctx: &EvaluationContext<'_>,
    ) -> Vec<Decision> {
        let decisions: Vec<Decision> = candidates
            .iter()
            .map(|candidate| self.evaluate(candidate, ctx))
            .collect();
        debug!(
            total = decisions.len(),
            accepted = decisions.iter().filter(|d| d.is_accepted()).count(),
            "Evaluated candidates"
        );
        decisions
    }
}

impl std::fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("rule_count", &self.rules.len())
            .field("rules", &self.rule_names())
            .finish()
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}
