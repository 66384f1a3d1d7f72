//! Acceptance decisions for release candidates.
//!
//! This module turns an indexer's candidate list into typed accept/reject
//! decisions and ranks the accepted ones.
//!
//! # Architecture
//!
//! - [`Specification`] - Trait that each independent acceptance rule implements
//! - [`DecisionEngine`] - Priority-ordered collection of rules with the evaluation loop
//! - [`Decision`] - A candidate plus its rejections; accepted when there are none
//! - [`ReleasePrioritizer`] - Stable ordering of accepted decisions for one search
//! - [`specs`] - The built-in rules
//!
//! # Example
//!
//! ```no_run
//! use releasegate_core::config::CoreConfig;
//! use releasegate_core::decision::{DecisionEngine, EvaluationContext, ReleasePrioritizer};
//! # use releasegate_core::quality::QualityProfile;
//! # use releasegate_core::release::ReleaseCandidate;
//! # fn example(profile: &QualityProfile, candidates: &[ReleaseCandidate]) {
//! let config = CoreConfig::default();
//! let engine = DecisionEngine::with_default_rules(&config.decision);
//! let ctx = EvaluationContext::automatic(profile);
//!
//! let decisions = engine.evaluate_all(candidates, &ctx);
//! let ranked = ReleasePrioritizer::new(config.prioritization).prioritize(decisions, profile);
//! if let Some(best) = ranked.first() {
//!     println!("Grabbing {}", best.candidate.title);
//! }
//! # }
//! ```

mod engine;
mod error;
mod prioritizer;
pub mod specs;

pub use engine::DecisionEngine;
pub use error::SpecificationError;
pub use prioritizer::{ReleasePrioritizer, SecondaryTiebreak};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quality::QualityProfile;
use crate::release::{ReleaseCandidate, SearchContext};

/// Cost class of a rule; cheaper classes run first.
///
/// Derives `Ord` so that `Parsing < Default < Search < Database`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpecificationPriority {
    /// Needs nothing beyond the raw candidate.
    Parsing = 0,
    /// Needs candidate fields plus configuration or profile.
    Default = 1,
    /// Needs the search context.
    Search = 2,
    /// Needs library state.
    Database = 3,
}

/// Whether a rejection can change on a later evaluation of the same search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionType {
    /// Never retried for this search.
    Permanent,
    /// May pass later (e.g. the release is too new).
    Temporary,
}

impl fmt::Display for RejectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permanent => write!(f, "permanent"),
            Self::Temporary => write!(f, "temporary"),
        }
    }
}

/// Why a candidate was turned down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Name of the rule that rejected.
    pub rule: String,
    /// Human-readable reason.
    pub reason: String,
    pub rejection_type: RejectionType,
}

impl Rejection {
    pub fn new(rule: impl Into<String>, reason: impl Into<String>, rejection_type: RejectionType) -> Self {
        Self {
            rule: rule.into(),
            reason: reason.into(),
            rejection_type,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rejection_type, self.reason)
    }
}

/// Outcome of evaluating one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub candidate: ReleaseCandidate,
    pub rejections: Vec<Rejection>,
}

impl Decision {
    #[must_use]
    pub fn accepted(candidate: ReleaseCandidate) -> Self {
        Self {
            candidate,
            rejections: Vec::new(),
        }
    }

    #[must_use]
    pub fn rejected(candidate: ReleaseCandidate, rejection: Rejection) -> Self {
        Self {
            candidate,
            rejections: vec![rejection],
        }
    }

    /// Accepted if and only if there are no rejections.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.rejections.is_empty()
    }

    /// True for a rejected decision whose rejections are all temporary.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !self.is_accepted()
            && self
                .rejections
                .iter()
                .all(|r| r.rejection_type == RejectionType::Temporary)
    }

    /// First blocking reason, if any.
    #[must_use]
    pub fn first_rejection(&self) -> Option<&Rejection> {
        self.rejections.first()
    }
}

/// Result of a single rule check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Accept,
    /// Rejected with a human-readable reason; the type comes from the rule.
    Reject(String),
}

impl RuleOutcome {
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::Reject(reason.into())
    }
}

/// Everything a rule may consult besides the candidate.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub profile: &'a QualityProfile,
    /// `None` for automatic feed scans; search-specific rules then accept.
    pub search: Option<&'a SearchContext>,
    pub now: DateTime<Utc>,
}

impl<'a> EvaluationContext<'a> {
    /// Context for an automatic feed scan (no search).
    #[must_use]
    pub fn automatic(profile: &'a QualityProfile) -> Self {
        Self {
            profile,
            search: None,
            now: Utc::now(),
        }
    }

    /// Context for an explicit search.
    #[must_use]
    pub fn search(profile: &'a QualityProfile, search: &'a SearchContext) -> Self {
        Self {
            profile,
            search: Some(search),
            now: Utc::now(),
        }
    }

    #[must_use]
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

/// One independent acceptance rule.
///
/// Rules are registered with a [`DecisionEngine`] and run in ascending
/// [`SpecificationPriority`], then registration order.
pub trait Specification: Send + Sync {
    /// Short stable name used in logs and rejections.
    fn name(&self) -> &'static str;

    fn priority(&self) -> SpecificationPriority;

    /// Type attached to rejections from this rule.
    fn rejection_type(&self) -> RejectionType;

    /// Checks one candidate.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError`] when the rule cannot reach a verdict;
    /// the engine treats this as a temporary rejection.
    ///
    /// # Panics
    ///
    /// Implementations must not panic. Every failure goes through `Err`,
    /// which is the only failure [`DecisionEngine::evaluate_all`] isolates
    /// per candidate.
    fn check(
        &self,
        candidate: &ReleaseCandidate,
        ctx: &EvaluationContext<'_>,
    ) -> Result<RuleOutcome, SpecificationError>;
}
