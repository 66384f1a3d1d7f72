//! Evaluate command handler: run the decision engine over a fixture.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use releasegate_core::{
    CoreConfig, Decision, DecisionEngine, EvaluationContext, QualityProfile, ReleaseCandidate,
    ReleasePrioritizer, SearchContext,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Input document for `releasegate evaluate`.
#[derive(Debug, Deserialize)]
struct EvaluateFixture {
    profile: QualityProfile,
    /// Omitted for an automatic feed scan.
    #[serde(default)]
    search: Option<SearchContext>,
    candidates: Vec<ReleaseCandidate>,
    /// Evaluation instant; the current time when omitted.
    #[serde(default)]
    now: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct EvaluateReport {
    decisions: Vec<Decision>,
    ranked: Vec<Decision>,
}

pub fn run_evaluate_command(config: &CoreConfig, fixture_path: &Path, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(fixture_path)
        .with_context(|| format!("failed to read fixture {}", fixture_path.display()))?;
    let fixture: EvaluateFixture = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse fixture {}", fixture_path.display()))?;
    debug!(candidates = fixture.candidates.len(), "Loaded fixture");

    let report = evaluate(config, &fixture);
    info!(
        total = report.decisions.len(),
        accepted = report.ranked.len(),
        "Evaluation complete"
    );

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to encode report")?
        );
    } else {
        print!("{}", render_text(&report));
    }

    Ok(())
}

fn evaluate(config: &CoreConfig, fixture: &EvaluateFixture) -> EvaluateReport {
    let engine = DecisionEngine::with_default_rules(&config.decision);
    let prioritizer = ReleasePrioritizer::new(config.prioritization.clone());

    let ctx = match &fixture.search {
        Some(search) => EvaluationContext::search(&fixture.profile, search),
        None => EvaluationContext::automatic(&fixture.profile),
    };
    let ctx = ctx.at(fixture.now.unwrap_or_else(Utc::now));

    let decisions = engine.evaluate_all(&fixture.candidates, &ctx);
    let ranked = prioritizer.prioritize(decisions.clone(), &fixture.profile);
    EvaluateReport { decisions, ranked }
}

fn render_text(report: &EvaluateReport) -> String {
    let mut out = String::new();

    for decision in &report.decisions {
        let verdict = if decision.is_accepted() {
            "ACCEPT"
        } else {
            "REJECT"
        };
        let _ = writeln!(out, "{verdict}  {}", decision.candidate.title);
        for rejection in &decision.rejections {
            let _ = writeln!(out, "        {}: {rejection}", rejection.rule);
        }
    }

    let _ = writeln!(out);
    if report.ranked.is_empty() {
        let _ = writeln!(out, "ranked = <none>");
        return out;
    }
    let _ = writeln!(out, "ranked:");
    for (position, decision) in report.ranked.iter().enumerate() {
        let quality = decision
            .candidate
            .quality()
            .map_or_else(|| "unknown".to_string(), ToString::to_string);
        let _ = writeln!(
            out,
            "  {}. {} ({quality}, {})",
            position + 1,
            decision.candidate.title,
            decision.candidate.protocol
        );
    }
    out
}
