//! Odds normalization
//!
//! Canonicalizes odds arriving as American strings ("+150", "-110"), bare
//! integers, or decimal odds ("2.50") into signed American integers.
//! Unparsable input yields `None`; it never defaults to zero.

use serde_json::Value;
use tracing::debug;

use super::types::Side;

/// Normalize a textual odds value to American odds.
///
/// `side` is only used for diagnostics.
pub fn normalize_odds(raw: &str, side: Option<Side>) -> Option<i32> {
    let text = raw.trim();
    let side_label = side.map(|s| s.as_str()).unwrap_or("-");

    if text.is_empty() {
        debug!(side = side_label, "no odds provided");
        return None;
    }

    // Explicit sign: American odds, sign kept as provided
    if text.starts_with('+') || text.starts_with('-') {
        let parsed = parse_int_prefix(text);
        match parsed {
            Some(odds) => {
                debug!(raw = text, side = side_label, odds, "parsed signed american odds")
            }
            None => debug!(raw = text, side = side_label, "invalid american odds"),
        }
        return parsed;
    }

    if text.contains('.') {
        let converted = parse_float_prefix(text).and_then(decimal_to_american);
        match converted {
            Some(odds) => debug!(raw = text, side = side_label, odds, "converted decimal odds"),
            None => debug!(raw = text, side = side_label, "invalid decimal odds"),
        }
        return converted;
    }

    let parsed = parse_int_prefix(text);
    if parsed.is_none() {
        debug!(raw = text, side = side_label, "could not parse odds");
    }
    parsed
}

/// Normalize a loosely-typed JSON odds value (string or number).
pub fn normalize_odds_value(value: &Value, side: Option<Side>) -> Option<i32> {
    match value {
        Value::String(s) => normalize_odds(s, side),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return i32::try_from(i).ok();
            }
            let f = n.as_f64()?;
            if f.fract() == 0.0 {
                // 2.0 arrives as an integer, not as decimal odds
                normalize_odds(&format!("{}", f as i64), side)
            } else {
                normalize_odds(&f.to_string(), side)
            }
        }
        _ => None,
    }
}

/// Convert decimal odds to American odds.
///
/// Decimal >= 2.0 maps to positive odds, below 2.0 to negative odds.
pub fn decimal_to_american(decimal: f64) -> Option<i32> {
    if !decimal.is_finite() {
        return None;
    }
    let american = if decimal >= 2.0 {
        round_half_up((decimal - 1.0) * 100.0)
    } else {
        round_half_up(-100.0 / (decimal - 1.0))
    };
    if american.is_finite() && american.abs() <= i32::MAX as f64 {
        Some(american as i32)
    } else {
        None
    }
}

/// Convert American odds to decimal odds (stake included)
pub fn american_to_decimal(odds: i32) -> f64 {
    let price = odds as f64;
    if price > 0.0 {
        price / 100.0 + 1.0
    } else {
        100.0 / price.abs() + 1.0
    }
}

/// Market-implied probability of American odds.
///
/// Zero odds fall into the non-positive branch and yield 0.0 rather than an error.
pub fn implied_probability(odds: i32) -> f64 {
    let price = odds as f64;
    if price > 0.0 {
        100.0 / (price + 100.0)
    } else {
        price.abs() / (price.abs() + 100.0)
    }
}

/// Format American odds the way books print them ("+150", "-110", "EV")
pub fn format_american(odds: i32) -> String {
    if odds > 0 {
        format!("+{}", odds)
    } else if odds < 0 {
        odds.to_string()
    } else {
        "EV".to_string()
    }
}

/// Odds for the opposite side of a no-vig market priced at `odds`.
///
/// Only defined for plus-money input.
pub fn complementary_odds(odds: i32) -> Option<i32> {
    if odds <= 0 {
        return None;
    }
    let implied = 100.0 / (odds as f64 + 100.0);
    let other = 1.0 - implied;
    let american = if other > 0.5 {
        round_half_up(-100.0 * other / (1.0 - other))
    } else {
        round_half_up((1.0 - other) * 100.0 / other)
    };
    Some(american as i32)
}

fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Leading integer of `text` (sign and digits), ignoring any trailing characters
fn parse_int_prefix(text: &str) -> Option<i32> {
    let (sign, rest) = split_sign(text);
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let magnitude: i64 = digits.parse().ok()?;
    i32::try_from(sign * magnitude).ok()
}

/// Leading float of `text`, ignoring any trailing characters
fn parse_float_prefix(text: &str) -> Option<f64> {
    let (sign, rest) = split_sign(text);
    let mut seen_dot = false;
    let numeric: String = rest
        .chars()
        .take_while(|c| {
            if *c == '.' && !seen_dot {
                seen_dot = true;
                true
            } else {
                c.is_ascii_digit()
            }
        })
        .collect();
    if !numeric.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    numeric.parse::<f64>().ok().map(|v| v * sign as f64)
}

fn split_sign(text: &str) -> (i64, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (-1, rest)
    } else if let Some(rest) = text.strip_prefix('+') {
        (1, rest)
    } else {
        (1, text)
    }
}
