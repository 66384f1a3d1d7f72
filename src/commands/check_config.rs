//! Check-config command handler: show the effective configuration.

use std::path::Path;

use anyhow::Result;
use releasegate_core::decision::SecondaryTiebreak;
use releasegate_core::{CoreConfig, Protocol};

pub fn run_check_config_command(config: &CoreConfig, path: Option<&Path>) -> Result<()> {
    print!("{}", render(config, path));
    Ok(())
}

fn render(config: &CoreConfig, path: Option<&Path>) -> String {
    let protocols: Vec<&str> = config
        .decision
        .enabled_protocols
        .iter()
        .map(Protocol::as_str)
        .collect();
    let preferred = config
        .prioritization
        .preferred_protocol
        .as_ref()
        .map_or("<none>", Protocol::as_str);
    let tiebreak = match config.prioritization.secondary_tiebreak {
        SecondaryTiebreak::Size => "size",
        SecondaryTiebreak::PublishDate => "publish_date",
    };

    let lines = [
        format!(
            "config_file = {}",
            path.map_or_else(
                || "not given (using defaults)".to_string(),
                |p| p.display().to_string()
            )
        ),
        format!("decision.enabled_protocols = {}", protocols.join(", ")),
        format!("decision.maximum_size_mb = {}", config.decision.maximum_size_mb),
        format!(
            "decision.minimum_age_minutes = {}",
            config.decision.minimum_age_minutes
        ),
        format!("decision.retention_days = {}", config.decision.retention_days),
        format!("prioritization.preferred_protocol = {preferred}"),
        format!("prioritization.secondary_tiebreak = {tiebreak}"),
        format!("tracking.ttl_hours = {}", config.tracking.ttl_hours),
        format!("seed.cache_ttl_minutes = {}", config.seed.cache_ttl_minutes),
    ];

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
