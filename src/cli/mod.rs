//! propedge CLI
//!
//! Commands:
//! - `propedge analyze` - Ingest a feed, run the value pipeline, print props
//! - `propedge generate` - Build a generated set from a query or strategy
//! - `propedge kelly` - Size a single stake
//! - `propedge odds` - Normalise odds values

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::props::generator::GenerationStrategy;
use crate::props::pipeline::DiffSign;

/// Player-prop value and bet-sizing engine
#[derive(Parser, Debug)]
#[command(name = "propedge")]
#[command(author, version, about = "Player-prop value and bet-sizing engine", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true, default_value = "config")]
    pub config: PathBuf,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyse a props feed and print the filtered, sorted result
    Analyze {
        /// JSON file holding raw props (array or envelope object)
        #[arg(short, long)]
        input: PathBuf,
        /// Sport code, or "all"
        #[arg(long)]
        sport: Option<String>,
        /// Free-text search over player/team/stat/game
        #[arg(long)]
        search: Option<String>,
        /// Minimum edge as a fraction (e.g., 0.03)
        #[arg(long, allow_negative_numbers = true)]
        min_edge: Option<f64>,
        /// Minimum |projection - line|
        #[arg(long)]
        min_diff: Option<f64>,
        /// Sign of projection - line to keep (positive, negative, both)
        #[arg(long)]
        diff_sign: Option<DiffSign>,
        /// Require market value side to agree with the projection
        #[arg(long)]
        agree: Option<bool>,
        /// Sort by projection edge instead of market edge
        #[arg(long)]
        prefer_projection: Option<bool>,
        /// Maximum rows to print
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Generate a ranked prop set
    Generate {
        /// JSON file holding raw props (array or envelope object)
        #[arg(short, long)]
        input: PathBuf,
        /// Free-text query (e.g., "jokic points")
        #[arg(short, long)]
        query: Option<String>,
        /// Ranking strategy when no query is given (edge, value, projection)
        #[arg(short, long)]
        strategy: Option<GenerationStrategy>,
        /// Props in the set (1-50)
        #[arg(long)]
        count: Option<usize>,
        /// Rank every grouped prop instead of the filtered output
        #[arg(long)]
        ignore_filters: bool,
    },
    /// Kelly stake for one bet
    Kelly {
        /// Edge as a fraction (e.g., 0.05)
        #[arg(long, allow_negative_numbers = true)]
        edge: f64,
        /// Odds in any supported format (-110, +150, 2.5)
        #[arg(long, allow_hyphen_values = true)]
        odds: String,
        /// Bankroll (defaults to configured sizing.bankroll)
        #[arg(long)]
        bankroll: Option<Decimal>,
        /// Kelly multiplier (defaults to configured sizing.kelly_fraction)
        #[arg(long)]
        fraction: Option<f64>,
    },
    /// Normalise odds to American and show implied probability
    Odds {
        /// Values to normalise (-110, +150, 2.5)
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<String>,
    },
}
