//! Kelly criterion bet sizing
//!
//! f* = (b*p - q) / b, where
//!     b = decimal odds - 1
//!     p = 0.5 + edge (edge is a displacement from a coin flip, not a calibrated win rate)
//!     q = 1 - p
//!
//! The applied fraction is f* scaled by the configured Kelly multiplier and
//! clamped to [0, MAX_KELLY_FRACTION].

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use super::odds::american_to_decimal;
use super::types::BetSizing;

/// Hard ceiling on the fraction of bankroll staked on one prop
pub const MAX_KELLY_FRACTION: f64 = 0.2;

/// Size a stake for a prop with the given edge and American odds.
///
/// Non-positive edge, missing odds or a non-positive bankroll return a zero stake.
pub fn kelly_stake(
    edge: f64,
    odds: Option<i32>,
    bankroll: Decimal,
    kelly_fraction: f64,
) -> BetSizing {
    let Some(odds) = odds else {
        return BetSizing::zero();
    };
    if edge <= 0.0 || bankroll <= Decimal::ZERO {
        return BetSizing::zero();
    }

    let fraction = applied_fraction(full_kelly(edge, odds), kelly_fraction);
    let amount = Decimal::from_f64(fraction)
        .map(|f| bankroll * f)
        .unwrap_or(Decimal::ZERO);

    BetSizing { fraction, amount }
}

/// Full Kelly fraction; can be negative
pub fn full_kelly(edge: f64, odds: i32) -> f64 {
    let b = american_to_decimal(odds) - 1.0;
    let p = 0.5 + edge;
    let q = 1.0 - p;
    (b * p - q) / b
}

fn applied_fraction(full: f64, kelly_fraction: f64) -> f64 {
    let scaled = full * kelly_fraction;
    if !scaled.is_finite() {
        // zero odds give an infinite payout ratio
        return 0.0;
    }
    scaled.clamp(0.0, MAX_KELLY_FRACTION)
}

/// Kelly sizer bound to a bankroll and multiplier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KellySizer {
    pub bankroll: Decimal,
    pub kelly_fraction: f64,
}

impl KellySizer {
    pub fn new(bankroll: Decimal, kelly_fraction: f64) -> Self {
        Self {
            bankroll,
            kelly_fraction,
        }
    }

    pub fn size(&self, edge: f64, odds: Option<i32>) -> BetSizing {
        kelly_stake(edge, odds, self.bankroll, self.kelly_fraction)
    }
}

impl Default for KellySizer {
    fn default() -> Self {
        Self {
            bankroll: Decimal::new(1000, 0),
            kelly_fraction: 0.25,
        }
    }
}
