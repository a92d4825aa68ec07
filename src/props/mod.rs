//! Player-prop value and bet-sizing engine
//!
//! Flow: raw feed -> [`ingest`] -> [`grouping`] -> [`analysis`] (value, market,
//! Kelly sizing) -> [`pipeline`] -> [`generator`] / [`query`].
//! [`session::PropSession`] owns one pass of that flow plus the generation history.

pub mod analysis;
pub mod generator;
pub mod grouping;
pub mod ingest;
pub mod kelly;
pub mod market;
pub mod odds;
pub mod pipeline;
pub mod query;
pub mod session;
pub mod types;
pub mod value;

pub use analysis::{analyze, analyze_all, AnalyzedProp};
pub use generator::{
    generate, GeneratedSet, GenerationHistory, GenerationRequest, GenerationStrategy, SetSource,
};
pub use grouping::group;
pub use ingest::{ingest, ingest_json};
pub use kelly::{kelly_stake, KellySizer, MAX_KELLY_FRACTION};
pub use market::{check_odds, read_market, MarketLevel, MarketRead, OddsCheck};
pub use odds::{format_american, implied_probability, normalize_odds};
pub use pipeline::{DiffSign, FilterConfig, ProjectionDiffFilter, PropFilters, ValueStats};
pub use query::{parse_intent, rank, score, QueryAction, QueryIntent};
pub use session::PropSession;
pub use types::{BetSizing, ConfidenceTier, PropRecord, Side, ValueAssessment, ValueSide};
pub use value::assess;
