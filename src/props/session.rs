//! Dashboard session: the single owner of the current prop set and history
//!
//! A refresh replaces everything derived from the previous feed. Changing
//! sizing re-analyses the retained grouped records; changing filters only
//! affects the next call to [`PropSession::filtered`].

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use super::analysis::{analyze_all, AnalyzedProp};
use super::generator::{generate, GeneratedSet, GenerationHistory, GenerationRequest};
use super::grouping::group;
use super::ingest::{ingest, ingest_json};
use super::kelly::KellySizer;
use super::pipeline::{FilterConfig, PropFilters};
use super::types::PropRecord;
use crate::config::AppConfig;
use crate::error::Result;

pub struct PropSession {
    sizer: KellySizer,
    filters: PropFilters,
    default_sport: String,
    grouped: Vec<PropRecord>,
    analyzed: Vec<AnalyzedProp>,
    history: GenerationHistory,
}

impl PropSession {
    pub fn new(sizer: KellySizer, filters: FilterConfig, default_sport: impl Into<String>) -> Self {
        Self {
            sizer,
            filters: PropFilters::new(filters),
            default_sport: default_sport.into(),
            grouped: Vec::new(),
            analyzed: Vec::new(),
            history: GenerationHistory::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            KellySizer::new(config.sizing.bankroll, config.sizing.kelly_fraction),
            config.filters.clone(),
            config.default_sport.clone(),
        )
    }

    /// Replace the current set with a new raw feed
    pub fn refresh(&mut self, raw: &[Value]) {
        let records = ingest(raw, &self.default_sport);
        self.load(records);
    }

    /// Replace the current set from a JSON payload
    pub fn refresh_json(&mut self, text: &str) -> Result<()> {
        let records = ingest_json(text, &self.default_sport)?;
        self.load(records);
        Ok(())
    }

    /// Replace the current set with already-typed records
    pub fn load(&mut self, records: Vec<PropRecord>) {
        let ingested = records.len();
        self.grouped = group(records);
        self.reanalyze();
        info!(
            ingested,
            grouped = self.grouped.len(),
            "refreshed prop set"
        );
    }

    pub fn set_sizing(&mut self, bankroll: Decimal, kelly_fraction: f64) {
        self.sizer = KellySizer::new(bankroll, kelly_fraction);
        self.reanalyze();
    }

    pub fn set_filters(&mut self, filters: FilterConfig) {
        self.filters = PropFilters::new(filters);
    }

    pub fn sizer(&self) -> &KellySizer {
        &self.sizer
    }

    pub fn filter_config(&self) -> &FilterConfig {
        self.filters.config()
    }

    pub fn grouped(&self) -> &[PropRecord] {
        &self.grouped
    }

    /// Every grouped record, analysed, in grouping order
    pub fn analyzed(&self) -> &[AnalyzedProp] {
        &self.analyzed
    }

    /// Pipeline output for the current filter configuration
    pub fn filtered(&self) -> Vec<AnalyzedProp> {
        self.filters.apply(&self.analyzed)
    }

    /// Build a generated set and append it to history
    pub fn generate(&mut self, request: &GenerationRequest) -> &GeneratedSet {
        let pool = if request.ignore_filters {
            self.analyzed.clone()
        } else {
            self.filtered()
        };
        generate(&pool, request, &mut self.history)
    }

    pub fn history(&self) -> &GenerationHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut GenerationHistory {
        &mut self.history
    }

    pub fn reset_history(&mut self) {
        self.history.reset();
    }

    fn reanalyze(&mut self) {
        self.analyzed = analyze_all(self.grouped.clone(), &self.sizer);
    }
}
