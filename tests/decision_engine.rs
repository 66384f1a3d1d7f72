//! Integration tests for candidate evaluation and ranking.

#![allow(clippy::unwrap_used)]

mod support;

use chrono::Utc;
use releasegate_core::config::{DecisionConfig, PrioritizationConfig};
use releasegate_core::decision::{
    RuleOutcome, SecondaryTiebreak, SpecificationError, SpecificationPriority,
};
use releasegate_core::quality::{
    ConditionKind, CustomFormat, FormatCondition, Pattern, ProfileFormatItem, Quality,
    QualityModel,
};
use releasegate_core::release::SearchContext;
use releasegate_core::{
    Decision, DecisionEngine, EvaluationContext, Protocol, RejectionType, ReleaseCandidate,
    ReleasePrioritizer, Specification,
};
use support::{artist, candidate, profile, unit};

fn album_search(units: Vec<releasegate_core::release::Unit>) -> SearchContext {
    SearchContext {
        artist: artist(),
        units,
        user_invoked: false,
        interactive: false,
    }
}

fn titles(decisions: &[Decision]) -> Vec<&str> {
    decisions.iter().map(|d| d.candidate.title.as_str()).collect()
}

#[test]
fn test_search_accepts_wanted_and_ranks_best_first() {
    let profile = profile();
    let search = album_search(vec![unit(10, "Geogaddi")]);
    let candidates = vec![
        candidate("Boards of Canada - Geogaddi", Protocol::Torrent, Quality::mp3_320(), 120),
        candidate("Boards of Canada - Geogaddi", Protocol::Usenet, Quality::flac(), 400),
        candidate("Boards of Canada - Geogaddi", Protocol::Torrent, Quality::mp3_192(), 80),
        candidate("Autechre - Geogaddi", Protocol::Torrent, Quality::flac(), 400),
        candidate("Boards of Canada - Campfire Headphase", Protocol::Torrent, Quality::flac(), 400),
    ];

    let engine = DecisionEngine::with_default_rules(&DecisionConfig::default());
    let ctx = EvaluationContext::search(&profile, &search);
    let decisions = engine.evaluate_all(&candidates, &ctx);

    assert_eq!(decisions.len(), candidates.len());
    let rules: Vec<Option<&str>> = decisions
        .iter()
        .map(|d| d.first_rejection().map(|r| r.rule.as_str()))
        .collect();
    assert_eq!(
        rules,
        vec![
            None,
            None,
            Some("quality_allowed"),
            Some("artist_matches"),
            Some("unit_requested"),
        ]
    );

    let ranked = ReleasePrioritizer::default().prioritize(decisions, &profile);
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].candidate.protocol, Protocol::Usenet);
    assert_eq!(ranked[1].candidate.protocol, Protocol::Torrent);
}

#[test]
fn test_decision_carries_exactly_one_rejection() {
    let profile = profile();
    let mut garbled = candidate("garbled", Protocol::Usenet, Quality::flac(), 1);
    garbled.parsed = None;

    let config = DecisionConfig {
        enabled_protocols: vec![Protocol::Torrent],
        ..DecisionConfig::default()
    };
    let engine = DecisionEngine::with_default_rules(&config);
    let decision = engine.evaluate(&garbled, &EvaluationContext::automatic(&profile));

    // Parsing runs first and short-circuits the disabled-protocol check.
    assert_eq!(decision.rejections.len(), 1);
    assert_eq!(decision.rejections[0].rule, "parsed");
    assert_eq!(decision.rejections[0].rejection_type, RejectionType::Permanent);
}

#[test]
fn test_young_usenet_release_is_retryable_unless_user_invoked() {
    let profile = profile();
    let mut fresh = candidate("Boards of Canada - Geogaddi", Protocol::Usenet, Quality::flac(), 400);
    let now = Utc::now();
    fresh.publish_date = now - chrono::Duration::minutes(5);

    let config = DecisionConfig {
        minimum_age_minutes: 30,
        ..DecisionConfig::default()
    };
    let engine = DecisionEngine::with_default_rules(&config);

    let scheduled = album_search(vec![unit(10, "Geogaddi")]);
    let decision = engine.evaluate(&fresh, &EvaluationContext::search(&profile, &scheduled).at(now));
    assert!(!decision.is_accepted());
    assert!(decision.is_retryable());
    assert_eq!(decision.first_rejection().unwrap().rule, "minimum_age");

    let manual = SearchContext {
        user_invoked: true,
        ..scheduled
    };
    let decision = engine.evaluate(&fresh, &EvaluationContext::search(&profile, &manual).at(now));
    assert!(decision.is_accepted());
}

#[test]
fn test_existing_file_at_cutoff_blocks_upgrade() {
    let profile = profile();
    let mut owned = unit(10, "Geogaddi");
    owned.current_quality = Some(QualityModel::new(Quality::flac()));
    let search = album_search(vec![owned]);

    let engine = DecisionEngine::with_default_rules(&DecisionConfig::default());
    let ctx = EvaluationContext::search(&profile, &search);

    let decision = engine.evaluate(
        &candidate("Boards of Canada - Geogaddi", Protocol::Torrent, Quality::flac(), 400),
        &ctx,
    );
    let rejection = decision.first_rejection().unwrap();
    assert_eq!(rejection.rule, "upgrade_allowed");
    assert!(rejection.reason.contains("meets cutoff"));
}

#[test]
fn test_existing_lower_file_accepts_upgrade_only() {
    let profile = profile();
    let mut owned = unit(10, "Geogaddi");
    owned.current_quality = Some(QualityModel::new(Quality::mp3_320()));
    let search = album_search(vec![owned]);

    let engine = DecisionEngine::with_default_rules(&DecisionConfig::default());
    let ctx = EvaluationContext::search(&profile, &search);
    let decisions = engine.evaluate_all(
        &[
            candidate("Boards of Canada - Geogaddi", Protocol::Torrent, Quality::flac(), 400),
            candidate("Boards of Canada - Geogaddi", Protocol::Torrent, Quality::mp3_320(), 120),
        ],
        &ctx,
    );

    assert!(decisions[0].is_accepted());
    assert_eq!(decisions[1].first_rejection().unwrap().rule, "upgrade_allowed");
}

#[test]
fn test_custom_format_score_orders_equal_quality() {
    let mut profile = profile();
    profile.format_items = vec![ProfileFormatItem {
        format: CustomFormat {
            id: 1,
            name: "Web".to_string(),
            conditions: vec![
                FormatCondition::new(ConditionKind::ReleaseTitle {
                    pattern: Pattern::new(r"\bWEB\b"),
                })
                .required(),
            ],
        },
        score: 50,
    }];

    let engine = DecisionEngine::with_default_rules(&DecisionConfig::default());
    let ctx = EvaluationContext::automatic(&profile);
    let decisions = engine.evaluate_all(
        &[
            candidate("Boards of Canada - Geogaddi CD", Protocol::Torrent, Quality::flac(), 900),
            candidate("Boards of Canada - Geogaddi WEB", Protocol::Torrent, Quality::flac(), 300),
        ],
        &ctx,
    );

    let ranked = ReleasePrioritizer::default().prioritize(decisions, &profile);
    assert_eq!(
        titles(&ranked),
        vec!["Boards of Canada - Geogaddi WEB", "Boards of Canada - Geogaddi CD"]
    );
}

#[test]
fn test_publish_date_tiebreak_prefers_newest() {
    let profile = profile();
    let mut older = candidate("Boards of Canada - Geogaddi old", Protocol::Torrent, Quality::flac(), 900);
    older.publish_date = Utc::now() - chrono::Duration::days(30);
    let newer = candidate("Boards of Canada - Geogaddi new", Protocol::Torrent, Quality::flac(), 300);

    let engine = DecisionEngine::with_default_rules(&DecisionConfig::default());
    let decisions = engine.evaluate_all(&[older, newer], &EvaluationContext::automatic(&profile));

    let by_size = ReleasePrioritizer::default().prioritize(decisions.clone(), &profile);
    assert_eq!(by_size[0].candidate.title, "Boards of Canada - Geogaddi old");

    let by_date = ReleasePrioritizer::new(PrioritizationConfig {
        secondary_tiebreak: SecondaryTiebreak::PublishDate,
        preferred_protocol: None,
    })
    .prioritize(decisions, &profile);
    assert_eq!(by_date[0].candidate.title, "Boards of Canada - Geogaddi new");
}

// ==================== Custom Rules for Testing ====================

/// Fails to reach a verdict for every candidate.
struct BrokenRule;

impl Specification for BrokenRule {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn priority(&self) -> SpecificationPriority {
        SpecificationPriority::Database
    }

    fn rejection_type(&self) -> RejectionType {
        RejectionType::Permanent
    }

    fn check(
        &self,
        _candidate: &ReleaseCandidate,
        _ctx: &EvaluationContext<'_>,
    ) -> Result<RuleOutcome, SpecificationError> {
        Err(SpecificationError::other("library unavailable"))
    }
}

/// Rejects releases with too few seeders.
struct MinimumSeeders(u32);

impl Specification for MinimumSeeders {
    fn name(&self) -> &'static str {
        "minimum_seeders"
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
        _ctx: &EvaluationContext<'_>,
    ) -> Result<RuleOutcome, SpecificationError> {
        match candidate.seeders {
            Some(seeders) if seeders < self.0 => Ok(RuleOutcome::reject(format!(
                "Not enough seeders: {seeders}"
            ))),
            _ => Ok(RuleOutcome::Accept),
        }
    }
}

#[test]
fn test_faulting_rule_becomes_temporary_rejection() {
    let profile = profile();
    let mut engine = DecisionEngine::new();
    engine.register(Box::new(BrokenRule));

    let decision = engine.evaluate(
        &candidate("Boards of Canada - Geogaddi", Protocol::Torrent, Quality::flac(), 400),
        &EvaluationContext::automatic(&profile),
    );
    let rejection = decision.first_rejection().unwrap();
    assert_eq!(rejection.rule, "broken");
    assert_eq!(rejection.rejection_type, RejectionType::Temporary);
    assert!(decision.is_retryable());
}

#[test]
fn test_registered_rule_runs_in_priority_order() {
    let profile = profile();
    let mut engine = DecisionEngine::new();
    engine.register(Box::new(BrokenRule));
    engine.register(Box::new(MinimumSeeders(20)));

    assert_eq!(engine.rule_names(), vec!["minimum_seeders", "broken"]);

    let decision = engine.evaluate(
        &candidate("Boards of Canada - Geogaddi", Protocol::Torrent, Quality::flac(), 400),
        &EvaluationContext::automatic(&profile),
    );
    assert_eq!(decision.first_rejection().unwrap().rule, "minimum_seeders");
}
