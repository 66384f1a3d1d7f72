//! Custom formats: named sets of conditions that add profile score to a release.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::release::{Protocol, ReleaseCandidate};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Case-insensitive regex compiled on first use.
///
/// An invalid pattern never matches; the compile error is logged once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern {
    source: String,
    #[serde(skip)]
    compiled: OnceLock<Option<Regex>>,
}

impl Pattern {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            compiled: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn is_match(&self, haystack: &str) -> bool {
        self.compiled
            .get_or_init(|| {
                RegexBuilder::new(&self.source)
                    .case_insensitive(true)
                    .build()
                    .map_err(|error| {
                        warn!(pattern = %self.source, error = %error, "Invalid custom format regex");
                        error
                    })
                    .ok()
            })
            .as_ref()
            .is_some_and(|re| re.is_match(haystack))
    }
}

/// What a single condition inspects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionKind {
    ReleaseTitle { pattern: Pattern },
    ReleaseGroup { pattern: Pattern },
    /// Inclusive size window in megabytes; 0 leaves a bound open.
    Size { min_mb: u64, max_mb: u64 },
    Protocol { protocol: Protocol },
}

/// One condition of a custom format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatCondition {
    #[serde(flatten)]
    pub kind: ConditionKind,
    #[serde(default)]
    pub negate: bool,
    #[serde(default)]
    pub required: bool,
}

impl FormatCondition {
    #[must_use]
    pub fn new(kind: ConditionKind) -> Self {
        Self {
            kind,
            negate: false,
            required: false,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }

    /// Evaluates the condition, applying `negate`.
    #[must_use]
    pub fn is_satisfied_by(&self, candidate: &ReleaseCandidate) -> bool {
        let raw = match &self.kind {
            ConditionKind::ReleaseTitle { pattern } => pattern.is_match(&candidate.title),
            ConditionKind::ReleaseGroup { pattern } => candidate
                .parsed
                .as_ref()
                .and_then(|p| p.release_group.as_deref())
                .is_some_and(|group| pattern.is_match(group)),
            ConditionKind::Size { min_mb, max_mb } => {
                let size_mb = candidate.size / BYTES_PER_MB;
                (*min_mb == 0 || size_mb >= *min_mb) && (*max_mb == 0 || size_mb <= *max_mb)
            }
            ConditionKind::Protocol { protocol } => candidate.protocol == *protocol,
        };
        raw != self.negate
    }
}

/// A named format scored by quality profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomFormat {
    pub id: i64,
    pub name: String,
    pub conditions: Vec<FormatCondition>,
}

impl CustomFormat {
    /// A format matches when every required condition holds and, if any
    /// optional conditions exist, at least one of them holds.
    #[must_use]
    pub fn matches(&self, candidate: &ReleaseCandidate) -> bool {
        if self.conditions.is_empty() {
            return false;
        }

        let (required, optional): (Vec<_>, Vec<_>) =
            self.conditions.iter().partition(|c| c.required);

        required.iter().all(|c| c.is_satisfied_by(candidate))
            && (optional.is_empty() || optional.iter().any(|c| c.is_satisfied_by(candidate)))
    }
}
