//! Built-in acceptance rules.
//!
//! Each rule is a small value implementing [`Specification`](super::Specification).
//! [`DecisionEngine::with_default_rules`](super::DecisionEngine::with_default_rules)
//! registers all of them.

mod limits;
mod parsing;
mod profile;
mod search;
mod upgrade;

pub use limits::{
    MaximumSizeSpecification, MinimumAgeSpecification, ProtocolEnabledSpecification,
    RetentionSpecification,
};
pub use parsing::ParsedSpecification;
pub use profile::{CustomFormatScoreSpecification, QualityAllowedSpecification};
pub use search::{
    ArtistMatchesSpecification, DiscographySpecification, UnitRequestedSpecification,
};
pub use upgrade::UpgradeAllowedSpecification;

/// Lower-cased alphanumerics only, for loose title comparison.
pub(crate) fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
