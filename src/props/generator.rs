//! Generated sets: ranked subsets of props built from a query or a strategy
//!
//! Every generation is appended to a [`GenerationHistory`] owned by the
//! session. History only shrinks through [`GenerationHistory::reset`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use super::analysis::AnalyzedProp;
use super::query::{parse_intent, rank, QueryIntent};

pub const MIN_SET_SIZE: usize = 1;
pub const MAX_SET_SIZE: usize = 50;
pub const DEFAULT_SET_SIZE: usize = 10;

/// Ranking used when no query is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStrategy {
    /// Percentage edge, highest first
    #[default]
    Edge,
    /// Combined projection/market value score, highest first
    Value,
    /// Raw projection, highest first; props without one go last
    Projection,
}

impl GenerationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStrategy::Edge => "edge",
            GenerationStrategy::Value => "value",
            GenerationStrategy::Projection => "projection",
        }
    }
}

impl fmt::Display for GenerationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "edge" => Ok(GenerationStrategy::Edge),
            "value" => Ok(GenerationStrategy::Value),
            "projection" => Ok(GenerationStrategy::Projection),
            other => Err(format!("unknown strategy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Free-text query; blank means strategy mode
    pub query: Option<String>,
    pub strategy: GenerationStrategy,
    pub count: usize,
    /// Rank the whole grouped set instead of the filtered output
    pub ignore_filters: bool,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            query: None,
            strategy: GenerationStrategy::default(),
            count: DEFAULT_SET_SIZE,
            ignore_filters: false,
        }
    }
}

impl GenerationRequest {
    pub fn for_query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn for_strategy(strategy: GenerationStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Requested count clamped to 1..=50
    pub fn effective_count(&self) -> usize {
        self.count.clamp(MIN_SET_SIZE, MAX_SET_SIZE)
    }

    /// Non-blank query text, trimmed
    pub fn query_text(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

/// What produced a generated set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SetSource {
    Query { text: String, intent: QueryIntent },
    Strategy { strategy: GenerationStrategy },
}

impl fmt::Display for SetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetSource::Query { text, .. } => write!(f, "query \"{}\"", text),
            SetSource::Strategy { strategy } => write!(f, "strategy {}", strategy),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSet {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub source: SetSource,
    pub props: Vec<AnalyzedProp>,
}

impl GeneratedSet {
    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

/// Append-only log of generated sets with a navigation cursor
#[derive(Debug, Clone, Default)]
pub struct GenerationHistory {
    sets: Vec<GeneratedSet>,
    cursor: Option<usize>,
}

impl GenerationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a set and move the cursor onto it
    pub fn push(&mut self, set: GeneratedSet) -> &GeneratedSet {
        self.sets.push(set);
        let last = self.sets.len() - 1;
        self.cursor = Some(last);
        &self.sets[last]
    }

    pub fn get(&self, index: usize) -> Option<&GeneratedSet> {
        self.sets.get(index)
    }

    pub fn current(&self) -> Option<&GeneratedSet> {
        self.cursor.and_then(|i| self.sets.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.cursor
    }

    /// Step back one set; stays on the first set
    pub fn previous(&mut self) -> Option<&GeneratedSet> {
        if let Some(i) = self.cursor {
            self.cursor = Some(i.saturating_sub(1));
        }
        self.current()
    }

    /// Step forward one set; stays on the last set
    pub fn next(&mut self) -> Option<&GeneratedSet> {
        if let Some(i) = self.cursor {
            if i + 1 < self.sets.len() {
                self.cursor = Some(i + 1);
            }
        }
        self.current()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedSet> {
        self.sets.iter()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn reset(&mut self) {
        self.sets.clear();
        self.cursor = None;
    }
}

/// Rank `pool` for a request without recording it
pub fn build_set(pool: &[AnalyzedProp], request: &GenerationRequest) -> GeneratedSet {
    let count = request.effective_count();

    let (source, props) = match request.query_text() {
        Some(text) => {
            let intent = parse_intent(text);
            let props = rank(pool, &intent, count);
            (
                SetSource::Query {
                    text: text.to_string(),
                    intent,
                },
                props,
            )
        }
        None => {
            let mut props = pool.to_vec();
            sort_by_strategy(&mut props, request.strategy);
            props.truncate(count);
            (
                SetSource::Strategy {
                    strategy: request.strategy,
                },
                props,
            )
        }
    };

    GeneratedSet {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        source,
        props,
    }
}

/// Rank `pool` for a request and append the result to `history`
pub fn generate<'h>(
    pool: &[AnalyzedProp],
    request: &GenerationRequest,
    history: &'h mut GenerationHistory,
) -> &'h GeneratedSet {
    let set = build_set(pool, request);
    info!(
        id = %set.id,
        source = %set.source,
        pool = pool.len(),
        selected = set.len(),
        "generated prop set"
    );
    history.push(set)
}

/// Stable descending sort by the strategy's key
pub fn sort_by_strategy(props: &mut [AnalyzedProp], strategy: GenerationStrategy) {
    match strategy {
        GenerationStrategy::Edge => {
            props.sort_by(|a, b| b.percentage_edge().total_cmp(&a.percentage_edge()))
        }
        GenerationStrategy::Value => props.sort_by(|a, b| {
            b.combined_value_score()
                .total_cmp(&a.combined_value_score())
        }),
        GenerationStrategy::Projection => {
            props.sort_by(|a, b| match (a.record.projection, b.record.projection) {
                (Some(x), Some(y)) => y.total_cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::analysis::analyze;
    use crate::props::kelly::KellySizer;
    use crate::props::types::PropRecord;

    fn prop(player: &str, line: f64, projection: Option<f64>) -> AnalyzedProp {
        let mut record = PropRecord::new(player, "points", line)
            .with_sport("nba")
            .with_odds(Some(-110), Some(-110));
        record.projection = projection;
        analyze(record, &KellySizer::default())
    }

    fn pool() -> Vec<AnalyzedProp> {
        vec![
            prop("Small", 10.0, Some(10.6)),
            prop("Blind", 10.0, None),
            prop("Nikola Jokic", 27.5, Some(30.0)),
            prop("Medium", 10.0, Some(11.2)),
        ]
    }

    fn players(set: &GeneratedSet) -> Vec<&str> {
        set.props.iter().map(|p| p.record.player.as_str()).collect()
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("Edge".parse::<GenerationStrategy>(), Ok(GenerationStrategy::Edge));
        assert_eq!(
            " projection ".parse::<GenerationStrategy>(),
            Ok(GenerationStrategy::Projection)
        );
        assert!("random".parse::<GenerationStrategy>().is_err());
    }

    #[test]
    fn test_count_clamped() {
        assert_eq!(GenerationRequest::default().with_count(0).effective_count(), 1);
        assert_eq!(GenerationRequest::default().with_count(500).effective_count(), 50);
        assert_eq!(GenerationRequest::default().effective_count(), 10);
    }

    #[test]
    fn test_blank_query_uses_strategy() {
        let request = GenerationRequest::for_query("   ");
        assert_eq!(request.query_text(), None);
        let set = build_set(&pool(), &request);
        assert_eq!(
            set.source,
            SetSource::Strategy {
                strategy: GenerationStrategy::Edge
            }
        );
    }

    #[test]
    fn test_edge_strategy() {
        let set = build_set(&pool(), &GenerationRequest::default().with_count(2));
        assert_eq!(players(&set), vec!["Nikola Jokic", "Medium"]);
    }

    #[test]
    fn test_projection_strategy_missing_last() {
        let request = GenerationRequest::for_strategy(GenerationStrategy::Projection);
        let set = build_set(&pool(), &request);
        assert_eq!(players(&set), vec!["Nikola Jokic", "Medium", "Small", "Blind"]);
    }

    #[test]
    fn test_feed_edge_drives_edge_strategy() {
        let mut props = pool();
        props[1].record.feed_edge = Some(99.0);
        sort_by_strategy(&mut props, GenerationStrategy::Edge);
        assert_eq!(props[0].record.player, "Blind");
    }

    #[test]
    fn test_query_set_records_intent() {
        let set = build_set(&pool(), &GenerationRequest::for_query("jokic points"));
        assert_eq!(players(&set)[0], "Nikola Jokic");
        match &set.source {
            SetSource::Query { text, intent } => {
                assert_eq!(text, "jokic points");
                assert_eq!(intent.player(), Some("jokic"));
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_history_navigation() {
        let mut history = GenerationHistory::new();
        assert!(history.current().is_none());
        assert!(history.previous().is_none());

        let first = generate(&pool(), &GenerationRequest::default(), &mut history).id;
        let second = generate(&pool(), &GenerationRequest::for_query("jokic"), &mut history).id;
        assert_ne!(first, second);
        assert_eq!(history.len(), 2);
        assert_eq!(history.current().map(|s| s.id), Some(second));

        assert_eq!(history.previous().map(|s| s.id), Some(first));
        assert_eq!(history.previous().map(|s| s.id), Some(first));
        assert_eq!(history.next().map(|s| s.id), Some(second));
        assert_eq!(history.next().map(|s| s.id), Some(second));
        assert_eq!(history.get(0).map(|s| s.id), Some(first));
        assert!(history.get(2).is_none());

        history.reset();
        assert!(history.is_empty());
        assert!(history.current().is_none());
    }

    #[test]
    fn test_empty_pool() {
        let mut history = GenerationHistory::new();
        let set = generate(&[], &GenerationRequest::default(), &mut history);
        assert!(set.is_empty());
        assert_eq!(history.len(), 1);
    }
}
