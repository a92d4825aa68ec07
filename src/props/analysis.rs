//! Per-record analysis: value assessment, market read and stake sizing

use serde::{Deserialize, Serialize};

use super::kelly::KellySizer;
use super::market::{check_odds, market_value_side, read_record, MarketRead, OddsCheck};
use super::types::{BetSizing, PropRecord, ValueAssessment, ValueSide};
use super::value::assess_record;

/// A record enriched with everything the presentation layer displays.
///
/// Pure function of the record and the sizer; rebuilt on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedProp {
    pub record: PropRecord,
    pub assessment: ValueAssessment,
    pub market: MarketRead,
    /// Market-assigned value side
    pub value_side: ValueSide,
    pub sizing: BetSizing,
    /// edge * 100 for positive edge, else 0
    pub value_score: f64,
    pub odds_check: OddsCheck,
}

impl AnalyzedProp {
    pub fn edge(&self) -> f64 {
        self.assessment.edge
    }

    pub fn projection_diff(&self) -> Option<f64> {
        self.record.projection_diff()
    }

    /// Edge in percent; the feed's own figure wins when it sent one
    pub fn percentage_edge(&self) -> f64 {
        self.record
            .feed_edge
            .unwrap_or(self.assessment.edge * 100.0)
    }

    /// Combined projection/market edge in percent, falling back to the value score
    pub fn combined_value_score(&self) -> f64 {
        self.market
            .combined_edge
            .map(|edge| edge * 100.0)
            .unwrap_or(self.value_score)
    }
}

pub fn analyze(record: PropRecord, sizer: &KellySizer) -> AnalyzedProp {
    let assessment = assess_record(&record);
    let market = read_record(&record);
    let value_side = market_value_side(&market);

    let sizing = assessment
        .actionable_side()
        .map(|side| sizer.size(assessment.edge, record.odds_for(side)))
        .unwrap_or_else(BetSizing::zero);

    let value_score = if assessment.edge > 0.0 {
        assessment.edge * 100.0
    } else {
        0.0
    };
    let odds_check = check_odds(record.over_odds, record.under_odds);

    AnalyzedProp {
        record,
        assessment,
        market,
        value_side,
        sizing,
        value_score,
        odds_check,
    }
}

pub fn analyze_all(records: Vec<PropRecord>, sizer: &KellySizer) -> Vec<AnalyzedProp> {
    records.into_iter().map(|r| analyze(r, sizer)).collect()
}
