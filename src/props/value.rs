//! Projection-vs-line value assessment
//!
//! The true-probability estimate is a bucketed heuristic on |projection - line|.
//! It is monotone and deliberately simple; it is not a calibrated model and the
//! buckets must stay exactly as they are.

use super::odds::implied_probability;
use super::types::{ConfidenceTier, PropRecord, Side, ValueAssessment, ValueSide};

/// (|diff| lower bound, probability for the recommended direction)
const PROBABILITY_BUCKETS: [(f64, f64); 3] = [(2.0, 0.65), (1.0, 0.60), (0.5, 0.55)];
const BASELINE_PROBABILITY: f64 = 0.52;

/// Compare a projection with the market line and price the recommended side.
pub fn assess(
    projection: Option<f64>,
    line: Option<f64>,
    over_odds: Option<i32>,
    under_odds: Option<i32>,
) -> ValueAssessment {
    let (Some(projection), Some(line)) = (projection, line) else {
        return ValueAssessment::neutral(0.0);
    };

    let diff = projection - line;
    let side = if diff > 0.0 { Side::Over } else { Side::Under };
    let relevant_odds = match side {
        Side::Over => over_odds,
        Side::Under => under_odds,
    };
    let Some(odds) = relevant_odds else {
        return ValueAssessment::neutral(diff);
    };

    let market_implied = implied_probability(odds);
    let estimated_true = estimated_true_probability(diff);
    let edge = estimated_true - market_implied;

    ValueAssessment {
        edge,
        recommended_side: ValueSide::from(side),
        confidence_tier: ConfidenceTier::from_edge(edge),
        market_implied_probability: market_implied,
        estimated_true_probability: estimated_true,
        projection_diff: diff,
    }
}

/// Assess a record using its own projection, line and odds
pub fn assess_record(record: &PropRecord) -> ValueAssessment {
    assess(
        record.projection,
        Some(record.line),
        record.over_odds,
        record.under_odds,
    )
}

/// Heuristic probability that the recommended side wins.
///
/// The recommended side takes the high value of its |diff| bucket; the other
/// side implicitly takes the complement.
pub fn estimated_true_probability(diff: f64) -> f64 {
    let abs_diff = diff.abs();
    PROBABILITY_BUCKETS
        .iter()
        .find(|(bound, _)| abs_diff > *bound)
        .map(|(_, p)| *p)
        .unwrap_or(BASELINE_PROBABILITY)
}
