//! Filter and sort pipeline
//!
//! Stages, each toggled by [`FilterConfig`]:
//! 1. Scope: sport plus free-text search over player/team/stat/game
//! 2. Projection difference: |projection - line| >= threshold, optionally signed
//! 3. Minimum edge
//! 4. Agreement: market value side must match the projection direction
//! 5. Sort: positive-edge props first, each group by edge descending (stable)

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use tracing::{debug, info};

use super::analysis::AnalyzedProp;
use super::types::ValueSide;

const ALL_SPORTS: &str = "all";

/// Sign restriction for the projection-difference filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffSign {
    Positive,
    Negative,
    #[default]
    Both,
}

impl FromStr for DiffSign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "pos" | "+" => Ok(DiffSign::Positive),
            "negative" | "neg" | "-" => Ok(DiffSign::Negative),
            "both" | "any" => Ok(DiffSign::Both),
            other => Err(format!("unknown diff sign: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionDiffFilter {
    /// Minimum |projection - line|
    pub threshold: f64,
    #[serde(default)]
    pub sign: DiffSign,
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Sport code, or "all"
    pub sport: String,
    /// Free-text search; empty passes everything
    pub search: String,
    pub projection_diff: Option<ProjectionDiffFilter>,
    pub min_edge: Option<f64>,
    pub require_agreement: bool,
    /// Sort by projection edge instead of market edge
    pub prefer_projection_value: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            sport: ALL_SPORTS.to_string(),
            search: String::new(),
            projection_diff: None,
            min_edge: None,
            require_agreement: true,
            prefer_projection_value: true,
        }
    }
}

/// Runs the staged pipeline over analysed props
pub struct PropFilters {
    config: FilterConfig,
}

impl PropFilters {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Filter then sort. Input order decides ties.
    pub fn apply(&self, props: &[AnalyzedProp]) -> Vec<AnalyzedProp> {
        let search = self.config.search.trim().to_lowercase();

        let mut kept: Vec<AnalyzedProp> = props
            .iter()
            .filter(|p| self.in_scope(p, &search))
            .filter(|p| self.passes_projection_diff(p))
            .filter(|p| self.passes_min_edge(p))
            .filter(|p| self.passes_agreement(p))
            .cloned()
            .collect();

        debug!(input = props.len(), kept = kept.len(), "filtered props");

        sort_by_value(&mut kept, self.config.prefer_projection_value);

        let stats = value_stats(&kept);
        info!(
            total = stats.total,
            positive = stats.with_positive_edge,
            strong = stats.with_strong_edge,
            very_strong = stats.with_very_strong_edge,
            "value pipeline complete"
        );
        kept
    }

    fn in_scope(&self, prop: &AnalyzedProp, search: &str) -> bool {
        let sport = self.config.sport.trim();
        if !sport.is_empty()
            && !sport.eq_ignore_ascii_case(ALL_SPORTS)
            && !prop.record.sport.eq_ignore_ascii_case(sport)
        {
            return false;
        }

        if search.is_empty() {
            return true;
        }
        let record = &prop.record;
        [&record.player, &record.team, &record.stat_type, &record.game]
            .iter()
            .any(|field| field.to_lowercase().contains(search))
    }

    fn passes_projection_diff(&self, prop: &AnalyzedProp) -> bool {
        let Some(filter) = self.config.projection_diff else {
            return true;
        };
        let Some(diff) = prop.projection_diff() else {
            return false;
        };
        if diff.abs() < filter.threshold {
            return false;
        }
        match filter.sign {
            DiffSign::Positive => diff > 0.0,
            DiffSign::Negative => diff < 0.0,
            DiffSign::Both => true,
        }
    }

    fn passes_min_edge(&self, prop: &AnalyzedProp) -> bool {
        self.config
            .min_edge
            .map_or(true, |min| prop.edge() >= min)
    }

    fn passes_agreement(&self, prop: &AnalyzedProp) -> bool {
        if !self.config.require_agreement {
            return true;
        }
        match prop.record.projection_direction() {
            Some(direction) => prop.value_side == ValueSide::from(direction),
            None => false,
        }
    }
}

/// Positive-edge props first; within each group by edge, highest first.
///
/// `prefer_projection_value` ranks by the projection edge, otherwise by the
/// market edge. The sort is stable.
pub fn sort_by_value(props: &mut [AnalyzedProp], prefer_projection_value: bool) {
    let rank_edge = |p: &AnalyzedProp| {
        if prefer_projection_value {
            p.assessment.edge
        } else {
            p.market.edge
        }
    };

    props.sort_by(|a, b| {
        let a_positive = a.edge() > 0.0;
        let b_positive = b.edge() > 0.0;
        match (a_positive, b_positive) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => rank_edge(b).total_cmp(&rank_edge(a)),
        }
    });
}

/// Edge distribution of a prop set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueStats {
    pub total: usize,
    pub with_positive_edge: usize,
    /// edge > 3%
    pub with_strong_edge: usize,
    /// edge > 5%
    pub with_very_strong_edge: usize,
    pub positive_edge_percentage: f64,
}

pub fn value_stats(props: &[AnalyzedProp]) -> ValueStats {
    let total = props.len();
    let count = |min: f64| props.iter().filter(|p| p.edge() > min).count();
    let with_positive_edge = count(0.0);

    ValueStats {
        total,
        with_positive_edge,
        with_strong_edge: count(0.03),
        with_very_strong_edge: count(0.05),
        positive_edge_percentage: if total > 0 {
            with_positive_edge as f64 / total as f64 * 100.0
        } else {
            0.0
        },
    }
}
