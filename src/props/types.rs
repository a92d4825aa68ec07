//! Core data types for the prop value engine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of a two-way over/under proposition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Over,
    Under,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Over => "over",
            Side::Under => "under",
        }
    }

    /// Parse a feed `type` marker ("Over", "under", ...)
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker.trim().to_lowercase().as_str() {
            "over" => Some(Side::Over),
            "under" => Some(Side::Under),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommended wager direction, or no recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSide {
    Over,
    Under,
    #[default]
    None,
}

impl ValueSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueSide::Over => "over",
            ValueSide::Under => "under",
            ValueSide::None => "none",
        }
    }

    pub fn side(&self) -> Option<Side> {
        match self {
            ValueSide::Over => Some(Side::Over),
            ValueSide::Under => Some(Side::Under),
            ValueSide::None => None,
        }
    }
}

impl From<Side> for ValueSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Over => ValueSide::Over,
            Side::Under => ValueSide::Under,
        }
    }
}

impl fmt::Display for ValueSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence bucket derived from edge. Ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfidenceTier {
    NoEdge,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceTier {
    pub fn from_edge(edge: f64) -> Self {
        if edge > 0.05 {
            ConfidenceTier::VeryHigh
        } else if edge > 0.03 {
            ConfidenceTier::High
        } else if edge > 0.01 {
            ConfidenceTier::Medium
        } else if edge > 0.0 {
            ConfidenceTier::Low
        } else {
            ConfidenceTier::NoEdge
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::NoEdge => "no-edge",
            ConfidenceTier::Low => "low",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::High => "high",
            ConfidenceTier::VeryHigh => "very-high",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One wagerable proposition, strictly typed after ingestion.
///
/// Identity strings keep their display casing; comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropRecord {
    pub player: String,
    pub team: String,
    pub opponent: String,
    pub sport: String,
    /// Lower-case stat category with any namespacing prefix removed
    pub stat_type: String,
    pub line: f64,
    /// American odds for the over side
    pub over_odds: Option<i32>,
    /// American odds for the under side
    pub under_odds: Option<i32>,
    pub projection: Option<f64>,
    /// Composite game description used for search and relevance matching
    pub game: String,
    #[serde(default)]
    pub bookmaker: Option<String>,
    /// Edge reported by the feed, in percent
    #[serde(default)]
    pub feed_edge: Option<f64>,
    #[serde(default)]
    pub feed_projection_edge: Option<f64>,
    #[serde(default)]
    pub feed_confidence: Option<String>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    /// Combined prices that arrived without a side marker, settled by grouping
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub untyped_odds: Vec<i32>,
}

impl PropRecord {
    pub fn new(player: impl Into<String>, stat_type: impl Into<String>, line: f64) -> Self {
        Self {
            player: player.into(),
            team: String::new(),
            opponent: String::new(),
            sport: String::new(),
            stat_type: stat_type.into(),
            line,
            over_odds: None,
            under_odds: None,
            projection: None,
            game: String::new(),
            bookmaker: None,
            feed_edge: None,
            feed_projection_edge: None,
            feed_confidence: None,
            last_updated: None,
            untyped_odds: Vec::new(),
        }
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = team.into();
        self
    }

    pub fn with_opponent(mut self, opponent: impl Into<String>) -> Self {
        self.opponent = opponent.into();
        self
    }

    pub fn with_sport(mut self, sport: impl Into<String>) -> Self {
        self.sport = sport.into();
        self
    }

    pub fn with_game(mut self, game: impl Into<String>) -> Self {
        self.game = game.into();
        self
    }

    pub fn with_odds(mut self, over: Option<i32>, under: Option<i32>) -> Self {
        self.over_odds = over;
        self.under_odds = under;
        self
    }

    pub fn with_projection(mut self, projection: f64) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Grouping identity: case-insensitive player, exact stat type and line
    pub fn key(&self) -> PropKey {
        PropKey {
            player: self.player.to_lowercase(),
            stat_type: self.stat_type.clone(),
            line_bits: self.line.to_bits(),
        }
    }

    /// `projection - line`, absent without a projection
    pub fn projection_diff(&self) -> Option<f64> {
        self.projection.map(|p| p - self.line)
    }

    /// Direction the projection points at relative to the line
    pub fn projection_direction(&self) -> Option<Side> {
        self.projection_diff()
            .map(|diff| if diff > 0.0 { Side::Over } else { Side::Under })
    }

    pub fn odds_for(&self, side: Side) -> Option<i32> {
        match side {
            Side::Over => self.over_odds,
            Side::Under => self.under_odds,
        }
    }
}

/// Grouping key for [`PropRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropKey {
    player: String,
    stat_type: String,
    line_bits: u64,
}

/// Projection-vs-line value read for one record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueAssessment {
    pub edge: f64,
    pub recommended_side: ValueSide,
    pub confidence_tier: ConfidenceTier,
    pub market_implied_probability: f64,
    pub estimated_true_probability: f64,
    pub projection_diff: f64,
}

impl ValueAssessment {
    pub fn neutral(projection_diff: f64) -> Self {
        Self {
            edge: 0.0,
            recommended_side: ValueSide::None,
            confidence_tier: ConfidenceTier::Low,
            market_implied_probability: 0.0,
            estimated_true_probability: 0.5,
            projection_diff,
        }
    }

    /// Side worth staking: the recommended side when the edge is positive
    pub fn actionable_side(&self) -> Option<Side> {
        if self.edge > 0.0 {
            self.recommended_side.side()
        } else {
            None
        }
    }
}

/// Kelly stake recommendation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetSizing {
    /// Applied fraction of bankroll, in [0, 0.2]
    pub fraction: f64,
    pub amount: Decimal,
}

impl BetSizing {
    pub fn zero() -> Self {
        Self {
            fraction: 0.0,
            amount: Decimal::ZERO,
        }
    }

    pub fn percent_of_bankroll(&self) -> f64 {
        self.fraction * 100.0
    }

    pub fn is_bet(&self) -> bool {
        self.fraction > 0.0
    }
}

impl Default for BetSizing {
    fn default() -> Self {
        Self::zero()
    }
}
