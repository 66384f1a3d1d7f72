//! Rules that only apply to an explicit search; automatic scans accept.

use super::normalize_title;
use crate::decision::{
    EvaluationContext, RejectionType, RuleOutcome, Specification, SpecificationError,
    SpecificationPriority,
};
use crate::release::ReleaseCandidate;

/// Rejects multi-unit releases when the search asked for exactly one unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscographySpecification;

impl Specification for DiscographySpecification {
    fn name(&self) -> &'static str {
        "discography"
    }

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Search
    }

    fn rejection_type(&self) -> RejectionType {
        RejectionType::Permanent
    }

    fn check(
        &self,
        candidate: &ReleaseCandidate,
        ctx: &EvaluationContext<'_>,
    ) -> Result<RuleOutcome, SpecificationError> {
        let Some(search) = ctx.search else {
            return Ok(RuleOutcome::Accept);
        };

        if search.is_single_unit() && candidate.is_full_release_set() {
            return Ok(RuleOutcome::reject(
                "Multi-unit release found during single unit search",
            ));
        }
        Ok(RuleOutcome::Accept)
    }
}

/// Rejects releases for a different artist than the one searched.
///
/// Prefers the library mapping; falls back to a case-insensitive name match.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtistMatchesSpecification;

impl Specification for ArtistMatchesSpecification {
    fn name(&self) -> &'static str {
        "artist_matches"
    }

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Search
    }

    fn rejection_type(&self) -> RejectionType {
        RejectionType::Permanent
    }

    fn check(
        &self,
        candidate: &ReleaseCandidate,
        ctx: &EvaluationContext<'_>,
    ) -> Result<RuleOutcome, SpecificationError> {
        let Some(search) = ctx.search else {
            return Ok(RuleOutcome::Accept);
        };

        let matches = if let Some(mapped) = &candidate.mapped {
            mapped.artist.id == search.artist.id
        } else {
            let parsed = candidate
                .parsed
                .as_ref()
                .ok_or_else(|| SpecificationError::missing_data("parsed info", &candidate.title))?;
            normalize_title(&parsed.artist_name) == normalize_title(&search.artist.name)
        };

        if matches {
            Ok(RuleOutcome::Accept)
        } else {
            Ok(RuleOutcome::reject(format!(
                "Wrong artist, expected {}",
                search.artist.name
            )))
        }
    }
}

/// Rejects releases that contain none of the searched units.
///
/// A discography contains every unit and always passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitRequestedSpecification;

impl Specification for UnitRequestedSpecification {
    fn name(&self) -> &'static str {
        "unit_requested"
    }

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Search
    }

    fn rejection_type(&self) -> RejectionType {
        RejectionType::Permanent
    }

    fn check(
        &self,
        candidate: &ReleaseCandidate,
        ctx: &EvaluationContext<'_>,
    ) -> Result<RuleOutcome, SpecificationError> {
        let Some(search) = ctx.search else {
            return Ok(RuleOutcome::Accept);
        };
        let parsed = candidate
            .parsed
            .as_ref()
            .ok_or_else(|| SpecificationError::missing_data("parsed info", &candidate.title))?;

        if parsed.discography {
            return Ok(RuleOutcome::Accept);
        }

        let requested = if let Some(mapped) = &candidate.mapped {
            mapped
                .units
                .iter()
                .any(|unit| search.units.iter().any(|wanted| wanted.id == unit.id))
        } else {
            parsed.unit_titles.iter().any(|title| {
                let title = normalize_title(title);
                search
                    .units
                    .iter()
                    .any(|wanted| normalize_title(&wanted.title) == title)
            })
        };

        if requested {
            Ok(RuleOutcome::Accept)
        } else {
            Ok(RuleOutcome::reject("Unit was not requested"))
        }
    }
}
