//! Command runners

use anyhow::Context;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;
use tracing::info;

use super::output::{self, prop_rows, OutputMode};
use super::Commands;
use crate::config::AppConfig;
use crate::props::generator::GenerationRequest;
use crate::props::kelly::{full_kelly, kelly_stake};
use crate::props::odds::{format_american, implied_probability, normalize_odds};
use crate::props::pipeline::{value_stats, ProjectionDiffFilter};
use crate::props::session::PropSession;

pub fn run(command: Commands, config: &AppConfig, mode: OutputMode) -> anyhow::Result<()> {
    match command {
        Commands::Analyze {
            input,
            sport,
            search,
            min_edge,
            min_diff,
            diff_sign,
            agree,
            prefer_projection,
            limit,
        } => {
            let mut filters = config.filters.clone();
            if let Some(sport) = sport {
                filters.sport = sport;
            }
            if let Some(search) = search {
                filters.search = search;
            }
            if min_edge.is_some() {
                filters.min_edge = min_edge;
            }
            if let Some(threshold) = min_diff {
                filters.projection_diff = Some(ProjectionDiffFilter {
                    threshold,
                    sign: diff_sign.unwrap_or_default(),
                });
            } else if let (Some(sign), Some(filter)) =
                (diff_sign, filters.projection_diff.as_mut())
            {
                filter.sign = sign;
            }
            if let Some(agree) = agree {
                filters.require_agreement = agree;
            }
            if let Some(prefer) = prefer_projection {
                filters.prefer_projection_value = prefer;
            }

            let mut session = load_session(&input, config)?;
            session.set_filters(filters);
            let mut props = session.filtered();
            let stats = value_stats(&props);
            if let Some(limit) = limit {
                props.truncate(limit);
            }

            match mode {
                OutputMode::Json => output::print_item(&props)?,
                OutputMode::Table => {
                    output::print_items(&prop_rows(&props), mode)?;
                    output::print_kv(
                        "props",
                        &format!(
                            "{} kept of {} grouped, {} with positive edge ({:.0}%)",
                            stats.total,
                            session.grouped().len(),
                            stats.with_positive_edge,
                            stats.positive_edge_percentage
                        ),
                    );
                }
            }
        }
        Commands::Generate {
            input,
            query,
            strategy,
            count,
            ignore_filters,
        } => {
            let request = GenerationRequest {
                query,
                strategy: strategy.unwrap_or(config.generator.strategy),
                count: count.unwrap_or(config.generator.count),
                ignore_filters: ignore_filters || config.generator.ignore_filters,
            };

            let mut session = load_session(&input, config)?;
            let set = session.generate(&request);

            match mode {
                OutputMode::Json => output::print_item(set)?,
                OutputMode::Table => {
                    output::print_kv("set", &format!("{} ({})", set.id, set.source));
                    output::print_items(&prop_rows(&set.props), mode)?;
                }
            }
        }
        Commands::Kelly {
            edge,
            odds,
            bankroll,
            fraction,
        } => {
            let normalized = normalize_odds(&odds, None);
            let bankroll = bankroll.unwrap_or(config.sizing.bankroll);
            let kelly_fraction = fraction.unwrap_or(config.sizing.kelly_fraction);
            let sizing = kelly_stake(edge, normalized, bankroll, kelly_fraction);

            let row = KellyRow {
                odds: normalized.map(format_american).unwrap_or_else(|| "invalid".to_string()),
                edge: format!("{:.2}%", edge * 100.0),
                full_kelly: normalized
                    .map(|o| format!("{:.2}%", full_kelly(edge, o) * 100.0))
                    .unwrap_or_else(|| "-".to_string()),
                applied: format!("{:.2}%", sizing.percent_of_bankroll()),
                stake: sizing.amount.round_dp(2).to_string(),
                bankroll: bankroll.to_string(),
            };
            output::print_items(&[row], mode)?;
        }
        Commands::Odds { values } => {
            let rows: Vec<OddsRow> = values.iter().map(|raw| OddsRow::from_raw(raw)).collect();
            output::print_items(&rows, mode)?;
        }
    }
    Ok(())
}

fn load_session(input: &Path, config: &AppConfig) -> anyhow::Result<PropSession> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read props from {}", input.display()))?;

    let mut session = PropSession::from_config(config);
    session
        .refresh_json(&text)
        .with_context(|| format!("failed to ingest props from {}", input.display()))?;

    info!(
        input = %input.display(),
        grouped = session.grouped().len(),
        "loaded props"
    );
    if session.grouped().is_empty() {
        output::print_warn("No usable props in input");
    }
    Ok(session)
}

#[derive(Debug, Serialize, Tabled)]
struct KellyRow {
    odds: String,
    edge: String,
    full_kelly: String,
    applied: String,
    stake: String,
    bankroll: String,
}

#[derive(Debug, Serialize, Tabled)]
struct OddsRow {
    input: String,
    american: String,
    decimal: String,
    implied: String,
}

impl OddsRow {
    fn from_raw(raw: &str) -> Self {
        let normalized = normalize_odds(raw, None);
        let missing = || "-".to_string();
        Self {
            input: raw.to_string(),
            american: normalized.map(format_american).unwrap_or_else(|| "invalid".to_string()),
            decimal: normalized
                .map(crate::props::odds::american_to_decimal)
                .and_then(Decimal::from_f64)
                .map(|d| d.round_dp(3).to_string())
                .unwrap_or_else(missing),
            implied: normalized
                .map(|o| format!("{:.2}%", implied_probability(o) * 100.0))
                .unwrap_or_else(missing),
        }
    }
}
