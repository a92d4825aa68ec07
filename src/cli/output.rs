//! Output formatting for `propedge` commands.
//!
//! Supports two modes: human-readable tables (default) and JSON (--json).

use serde::Serialize;
use tabled::{Table, Tabled};

use crate::props::analysis::AnalyzedProp;
use crate::props::odds::format_american;

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// Print a vec of Tabled + Serialize items in the chosen mode.
pub fn print_items<T: Tabled + Serialize>(items: &[T], mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Table => {
            if items.is_empty() {
                println!("(no results)");
            } else {
                let table = Table::new(items).to_string();
                println!("{table}");
            }
        }
        OutputMode::Json => {
            let json = serde_json::to_string_pretty(items)?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Print a single Serialize item as pretty JSON.
pub fn print_item<T: Serialize>(item: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(item)?);
    Ok(())
}

/// Print a simple key-value pair.
pub fn print_kv(key: &str, value: &str) {
    println!("{key}: {value}");
}

/// Print a warning message.
pub fn print_warn(msg: &str) {
    println!("\x1b[33m{msg}\x1b[0m");
}

/// One analysed prop as a table row
#[derive(Debug, Serialize, Tabled)]
pub struct PropRow {
    pub player: String,
    pub stat: String,
    pub line: String,
    pub over: String,
    pub under: String,
    pub proj: String,
    pub diff: String,
    pub side: String,
    pub edge: String,
    pub tier: String,
    pub stake: String,
}

impl From<&AnalyzedProp> for PropRow {
    fn from(prop: &AnalyzedProp) -> Self {
        let record = &prop.record;
        let odds = |o: Option<i32>| o.map(format_american).unwrap_or_else(|| "-".to_string());
        let number = |v: Option<f64>| {
            v.map(|v| format!("{v:.1}"))
                .unwrap_or_else(|| "-".to_string())
        };

        Self {
            player: record.player.clone(),
            stat: record.stat_type.clone(),
            line: format!("{:.1}", record.line),
            over: odds(record.over_odds),
            under: odds(record.under_odds),
            proj: number(record.projection),
            diff: prop
                .projection_diff()
                .map(|d| format!("{d:+.1}"))
                .unwrap_or_else(|| "-".to_string()),
            side: prop.assessment.recommended_side.as_str().to_string(),
            edge: format!("{:.2}%", prop.edge() * 100.0),
            tier: prop.assessment.confidence_tier.as_str().to_string(),
            stake: if prop.sizing.is_bet() {
                format!(
                    "{} ({:.1}%)",
                    prop.sizing.amount.round_dp(2),
                    prop.sizing.percent_of_bankroll()
                )
            } else {
                "-".to_string()
            },
        }
    }
}

pub fn prop_rows(props: &[AnalyzedProp]) -> Vec<PropRow> {
    props.iter().map(PropRow::from).collect()
}
