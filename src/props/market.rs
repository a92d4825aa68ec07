//! Market-side read of an over/under pair
//!
//! Prices both sides against each other (vig removal for complementary
//! markets, a coin-flip benchmark otherwise), blends in the projection
//! direction, and assigns the market value side used by the agreement filter.

use serde::{Deserialize, Serialize};

use super::odds::implied_probability;
use super::types::{PropRecord, Side, ValueSide};

const COMPLEMENTARY_MIN_TOTAL: f64 = 0.95;
const COMPLEMENTARY_MAX_TOTAL: f64 = 1.15;
const HIGH_MARGIN_TOTAL: f64 = 1.07;
const INDEPENDENT_BENCHMARK: f64 = 0.5;
const PROJECTION_OVERRIDE_EDGE: f64 = 0.02;

/// Quality bucket of the market pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarketLevel {
    Invalid,
    GoodValue,
    Fair,
    SlightJuice,
    BadValue,
    GoodIndependent,
    FairIndependent,
    NeutralIndependent,
    BadIndependent,
}

/// Market read for one prop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketRead {
    pub level: MarketLevel,
    /// Best side value
    pub edge: f64,
    pub over_value: f64,
    pub under_value: f64,
    pub complementary: bool,
    pub total_implied: f64,
    /// Projection edge under the linear blend model, when a projection is priced
    pub projection_edge: Option<f64>,
    pub combined_edge: Option<f64>,
    pub projection_direction: Option<Side>,
}

impl MarketRead {
    fn invalid() -> Self {
        Self {
            level: MarketLevel::Invalid,
            edge: 0.0,
            over_value: 0.0,
            under_value: 0.0,
            complementary: false,
            total_implied: 0.0,
            projection_edge: None,
            combined_edge: None,
            projection_direction: None,
        }
    }
}

/// Price an over/under pair. Either side missing gives an `Invalid` read.
pub fn read_market(over_odds: Option<i32>, under_odds: Option<i32>) -> MarketRead {
    let (Some(over), Some(under)) = (over_odds, under_odds) else {
        return MarketRead::invalid();
    };

    let over_implied = implied_probability(over);
    let under_implied = implied_probability(under);
    let total = over_implied + under_implied;
    let complementary = (COMPLEMENTARY_MIN_TOTAL..=COMPLEMENTARY_MAX_TOTAL).contains(&total);

    let (over_value, under_value, level) = if complementary {
        let margin = total - 1.0;
        let over_value = over_implied / total - over_implied;
        let under_value = under_implied / total - under_implied;
        let best = over_value.max(under_value);
        let level = if best > 0.02 {
            MarketLevel::GoodValue
        } else if best > 0.0 {
            MarketLevel::Fair
        } else if margin < 0.07 {
            MarketLevel::SlightJuice
        } else {
            MarketLevel::BadValue
        };
        (over_value, under_value, level)
    } else {
        let over_value = INDEPENDENT_BENCHMARK - over_implied;
        let under_value = INDEPENDENT_BENCHMARK - under_implied;
        let best = over_value.max(under_value);
        let worst = over_value.min(under_value);
        let level = if best > 0.05 {
            MarketLevel::GoodIndependent
        } else if best > 0.02 {
            MarketLevel::FairIndependent
        } else if worst > -0.05 {
            MarketLevel::NeutralIndependent
        } else {
            MarketLevel::BadIndependent
        };
        (over_value, under_value, level)
    };

    MarketRead {
        level,
        edge: over_value.max(under_value),
        over_value,
        under_value,
        complementary,
        total_implied: total,
        projection_edge: None,
        combined_edge: None,
        projection_direction: None,
    }
}

/// Blend a projection into a market read.
///
/// strength = |diff| / 3, p = clamp(0.5 + 0.3 * strength, 0.3, 0.7), mirrored for
/// unders; combined = 0.7 * projection edge + 0.3 * market edge.
pub fn blend_projection(mut read: MarketRead, record: &PropRecord) -> MarketRead {
    let Some(diff) = record.projection_diff() else {
        return read;
    };
    let direction = if diff > 0.0 { Side::Over } else { Side::Under };
    let Some(odds) = record.odds_for(direction) else {
        return read;
    };

    let strength = diff.abs() / 3.0;
    let mut p = (0.5 + strength * 0.3).clamp(0.3, 0.7);
    if direction == Side::Under {
        p = 1.0 - p;
    }
    let projection_edge = p - implied_probability(odds);

    read.projection_edge = Some(projection_edge);
    read.combined_edge = Some(projection_edge * 0.7 + read.edge * 0.3);
    read.projection_direction = Some(direction);
    read
}

/// Full market read for a record: pair pricing plus projection blend
pub fn read_record(record: &PropRecord) -> MarketRead {
    blend_projection(read_market(record.over_odds, record.under_odds), record)
}

/// Side the market read favours
pub fn market_value_side(read: &MarketRead) -> ValueSide {
    if let (Some(edge), Some(direction)) = (read.projection_edge, read.projection_direction) {
        if edge > PROJECTION_OVERRIDE_EDGE {
            return direction.into();
        }
    }

    if read.level == MarketLevel::Invalid {
        return ValueSide::None;
    }

    if read.complementary {
        if read.over_value > 0.005 && read.over_value > read.under_value {
            return ValueSide::Over;
        }
        if read.under_value > 0.005 && read.under_value > read.over_value {
            return ValueSide::Under;
        }
    } else {
        if read.over_value > 0.02 {
            return ValueSide::Over;
        }
        if read.under_value > 0.02 {
            return ValueSide::Under;
        }
    }

    ValueSide::None
}

/// No-vig probabilities for an over/under pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairProbabilities {
    pub over: f64,
    pub under: f64,
    pub vig: f64,
}

pub fn fair_probabilities(over_odds: i32, under_odds: i32) -> FairProbabilities {
    let over = implied_probability(over_odds);
    let under = implied_probability(under_odds);
    let total = over + under;
    FairProbabilities {
        over: over / total,
        under: under / total,
        vig: total - 1.0,
    }
}

/// Sanity check of a priced pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OddsCheck {
    pub unrealistic: bool,
    pub warnings: Vec<String>,
}

impl OddsCheck {
    pub fn is_clean(&self) -> bool {
        !self.unrealistic && self.warnings.is_empty()
    }
}

pub fn check_odds(over_odds: Option<i32>, under_odds: Option<i32>) -> OddsCheck {
    let mut check = OddsCheck::default();
    let (Some(over), Some(under)) = (over_odds, under_odds) else {
        return check;
    };

    let total = implied_probability(over) + implied_probability(under);
    if !(COMPLEMENTARY_MIN_TOTAL..=COMPLEMENTARY_MAX_TOTAL).contains(&total) {
        check.unrealistic = true;
        check.warnings.push(format!(
            "Non-complementary odds ({:.1}% total)",
            total * 100.0
        ));
    } else if total > HIGH_MARGIN_TOTAL {
        check.warnings.push(format!(
            "High bookmaker edge ({:.1}%)",
            (total - 1.0) * 100.0
        ));
    }

    if over > 0 && under > 0 {
        check.warnings.push("Both positive odds".to_string());
    } else if over < 0 && under < 0 {
        check.warnings.push("Both negative odds".to_string());
    }

    check
}
