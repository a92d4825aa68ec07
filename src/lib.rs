pub mod cli;
pub mod config;
pub mod error;
pub mod props;

pub use config::AppConfig;
pub use error::{PropError, Result};
pub use props::{
    AnalyzedProp, BetSizing, ConfidenceTier, FilterConfig, GeneratedSet, GenerationHistory,
    GenerationRequest, GenerationStrategy, KellySizer, PropRecord, PropSession, QueryIntent, Side,
    ValueAssessment, ValueSide,
};
