//! Core configuration: decision limits, ranking, tracking and seed caching.
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no file)
//! yields a working configuration with all optional limits disabled.
//!
//! ```toml
//! [decision]
//! maximum_size_mb = 2000
//! minimum_age_minutes = 30
//! retention_days = 3000
//! enabled_protocols = ["usenet", "torrent"]
//!
//! [prioritization]
//! secondary_tiebreak = "publish_date"
//! preferred_protocol = "torrent"
//!
//! [tracking]
//! ttl_hours = 24
//!
//! [seed]
//! cache_ttl_minutes = 60
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::decision::SecondaryTiebreak;
use crate::release::Protocol;

const DEFAULT_TRACKING_TTL_HOURS: u32 = 24;
const DEFAULT_SEED_CACHE_TTL_MINUTES: u32 = 60;
const MAX_TRACKING_TTL_HOURS: u32 = 24 * 30;
const MAX_SEED_CACHE_TTL_MINUTES: u32 = 24 * 60;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Limits applied by the acceptance rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Largest acceptable release in megabytes; 0 disables the check.
    pub maximum_size_mb: u64,
    /// Usenet posts younger than this are deferred; 0 disables the check.
    pub minimum_age_minutes: u32,
    /// Usenet posts older than this are rejected; 0 disables the check.
    pub retention_days: u32,
    pub enabled_protocols: Vec<Protocol>,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            maximum_size_mb: 0,
            minimum_age_minutes: 0,
            retention_days: 0,
            enabled_protocols: vec![Protocol::Usenet, Protocol::Torrent],
        }
    }
}

/// Ordering of accepted releases beyond quality and format score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrioritizationConfig {
    pub secondary_tiebreak: SecondaryTiebreak,
    pub preferred_protocol: Option<Protocol>,
}

/// Tracked download cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Aggregates unseen for this long are evicted.
    pub ttl_hours: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            ttl_hours: DEFAULT_TRACKING_TTL_HOURS,
        }
    }
}

impl TrackingConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.ttl_hours) * 3600)
    }
}

/// Seed criteria cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedCacheConfig {
    pub cache_ttl_minutes: u32,
}

impl Default for SeedCacheConfig {
    fn default() -> Self {
        Self {
            cache_ttl_minutes: DEFAULT_SEED_CACHE_TTL_MINUTES,
        }
    }
}

impl SeedCacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.cache_ttl_minutes) * 60)
    }
}

/// Complete core configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub decision: DecisionConfig,
    pub prioritization: PrioritizationConfig,
    pub tracking: TrackingConfig,
    pub seed: SeedCacheConfig,
}

impl CoreConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, otherwise
    /// the same errors as [`CoreConfig::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decision.enabled_protocols.is_empty() {
            return Err(ConfigError::invalid(
                "decision.enabled_protocols",
                "at least one protocol must be enabled",
            ));
        }

        if !(1..=MAX_TRACKING_TTL_HOURS).contains(&self.tracking.ttl_hours) {
            return Err(ConfigError::invalid(
                "tracking.ttl_hours",
                format!(
                    "{}. Expected range: 1..={MAX_TRACKING_TTL_HOURS}",
                    self.tracking.ttl_hours
                ),
            ));
        }

        if !(1..=MAX_SEED_CACHE_TTL_MINUTES).contains(&self.seed.cache_ttl_minutes) {
            return Err(ConfigError::invalid(
                "seed.cache_ttl_minutes",
                format!(
                    "{}. Expected range: 1..={MAX_SEED_CACHE_TTL_MINUTES}",
                    self.seed.cache_ttl_minutes
                ),
            ));
        }

        Ok(())
    }
}
