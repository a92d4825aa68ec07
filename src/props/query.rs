//! Free-text query intent and relevance ranking
//!
//! Queries such as "jokic points" are split into a sport, a player, a team and
//! generic keywords using fixed dictionaries, then used to score props:
//!
//! - player substring match: +20
//! - team substring match:   +15
//! - any keyword in player/team/stat/game: +10
//! - 5 * edge as a continuous bonus

use serde::{Deserialize, Serialize};

use super::analysis::AnalyzedProp;

const MIN_TOKEN_LEN: usize = 3;

const PLAYER_MATCH_SCORE: f64 = 20.0;
const TEAM_MATCH_SCORE: f64 = 15.0;
const KEYWORD_MATCH_SCORE: f64 = 10.0;
const EDGE_WEIGHT: f64 = 5.0;

const SPORT_ALIASES: &[(&str, &str)] = &[
    ("basketball", "nba"),
    ("nba", "nba"),
    ("football", "nfl"),
    ("nfl", "nfl"),
    ("hockey", "nhl"),
    ("nhl", "nhl"),
    ("baseball", "mlb"),
    ("mlb", "mlb"),
    ("soccer", "soccer"),
];

const PLAYER_NAMES: &[&str] = &[
    "jokic", "lebron", "mahomes", "judge", "curry", "doncic", "embiid", "ohtani", "mcdavid",
    "tatum",
];

const TEAM_NAMES: &[&str] = &[
    "lakers", "chiefs", "yankees", "bruins", "nuggets", "celtics", "warriors", "dodgers",
    "eagles", "oilers",
];

/// (aliases, plural form, singular form)
const STAT_ALIASES: &[(&[&str], &str, &str)] = &[
    (&["pts", "point", "points", "scoring"], "points", "point"),
    (&["reb", "rebs", "rebound", "rebounds", "boards"], "rebounds", "rebound"),
    (&["ast", "asts", "assist", "assists", "dimes"], "assists", "assist"),
    (&["3pm", "3pt", "three", "threes", "triples"], "threes", "three"),
    (&["yds", "yard", "yards", "yardage"], "yards", "yard"),
    (&["strikeout", "strikeouts"], "strikeouts", "strikeout"),
    (&["goal", "goals"], "goals", "goal"),
    (&["hit", "hits"], "hits", "hit"),
];

const ACTION_WORDS: &[&str] = &["explain", "generate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryAction {
    #[default]
    Generate,
    Explain,
}

/// Structured reading of a free-text query. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryIntent {
    sport: Option<String>,
    player: Option<String>,
    team: Option<String>,
    keywords: Vec<String>,
    action: QueryAction,
}

impl QueryIntent {
    pub fn sport(&self) -> Option<&str> {
        self.sport.as_deref()
    }

    pub fn player(&self) -> Option<&str> {
        self.player.as_deref()
    }

    pub fn team(&self) -> Option<&str> {
        self.team.as_deref()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn action(&self) -> QueryAction {
        self.action
    }

    /// Whether the query names anything that props must match
    pub fn has_terms(&self) -> bool {
        self.player.is_some() || self.team.is_some() || !self.keywords.is_empty()
    }
}

/// Parse a free-text query into an intent.
pub fn parse_intent(text: &str) -> QueryIntent {
    let lower = text.trim().to_lowercase();
    let tokens: Vec<&str> = lower
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .collect();

    let sport = tokens.iter().find_map(|t| sport_for(t)).map(str::to_string);
    let player = tokens
        .iter()
        .find(|t| PLAYER_NAMES.contains(t))
        .map(|t| t.to_string());
    let team = tokens
        .iter()
        .find(|t| TEAM_NAMES.contains(t))
        .map(|t| t.to_string());

    let mut keywords: Vec<String> = Vec::new();
    let mut push = |word: &str| {
        if !keywords.iter().any(|k| k == word) {
            keywords.push(word.to_string());
        }
    };

    for token in &tokens {
        if sport_for(token).is_some()
            || PLAYER_NAMES.contains(token)
            || TEAM_NAMES.contains(token)
            || ACTION_WORDS.contains(token)
        {
            continue;
        }
        match stat_forms(token) {
            Some((plural, singular)) => {
                push(plural);
                push(singular);
            }
            None => push(*token),
        }
    }

    let action = if lower.contains("explain") {
        QueryAction::Explain
    } else {
        QueryAction::Generate
    };

    QueryIntent {
        sport,
        player,
        team,
        keywords,
        action,
    }
}

fn sport_for(token: &str) -> Option<&'static str> {
    SPORT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == token)
        .map(|(_, sport)| *sport)
}

fn stat_forms(token: &str) -> Option<(&'static str, &'static str)> {
    STAT_ALIASES
        .iter()
        .find(|(aliases, _, _)| aliases.contains(&token))
        .map(|(_, plural, singular)| (*plural, *singular))
}

/// Lower-cased searchable fields of a prop
struct Haystack {
    player: String,
    team: String,
    stat_type: String,
    game: String,
}

impl Haystack {
    fn of(prop: &AnalyzedProp) -> Self {
        let record = &prop.record;
        Self {
            player: record.player.to_lowercase(),
            team: record.team.to_lowercase(),
            stat_type: record.stat_type.to_lowercase(),
            game: record.game.to_lowercase(),
        }
    }

    fn player_matches(&self, intent: &QueryIntent) -> bool {
        intent.player().is_some_and(|p| self.player.contains(p))
    }

    fn team_matches(&self, intent: &QueryIntent) -> bool {
        intent.team().is_some_and(|t| self.team.contains(t))
    }

    fn keyword_matches(&self, intent: &QueryIntent) -> bool {
        intent.keywords().iter().any(|k| {
            self.player.contains(k.as_str())
                || self.team.contains(k.as_str())
                || self.stat_type.contains(k.as_str())
                || self.game.contains(k.as_str())
        })
    }
}

/// Relevance of a prop to an intent
pub fn score(prop: &AnalyzedProp, intent: &QueryIntent) -> f64 {
    let hay = Haystack::of(prop);
    let mut total = 0.0;
    if hay.player_matches(intent) {
        total += PLAYER_MATCH_SCORE;
    }
    if hay.team_matches(intent) {
        total += TEAM_MATCH_SCORE;
    }
    if hay.keyword_matches(intent) {
        total += KEYWORD_MATCH_SCORE;
    }
    total + EDGE_WEIGHT * prop.edge()
}

/// Whether a prop matches at least one player/team/keyword term
pub fn matches(prop: &AnalyzedProp, intent: &QueryIntent) -> bool {
    let hay = Haystack::of(prop);
    hay.player_matches(intent) || hay.team_matches(intent) || hay.keyword_matches(intent)
}

/// Rank props for a query, best first, truncated to `count`.
///
/// With any term extracted, props matching none of them are dropped; an
/// empty result is a valid answer.
pub fn rank(props: &[AnalyzedProp], intent: &QueryIntent, count: usize) -> Vec<AnalyzedProp> {
    let mut scored: Vec<(f64, &AnalyzedProp)> = props
        .iter()
        .filter(|p| {
            intent
                .sport()
                .map_or(true, |sport| p.record.sport.to_lowercase().contains(sport))
        })
        .filter(|p| !intent.has_terms() || matches(p, intent))
        .map(|p| (score(p, intent), p))
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(count)
        .map(|(_, p)| p.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::analysis::analyze;
    use crate::props::kelly::KellySizer;
    use crate::props::types::PropRecord;

    fn prop(player: &str, team: &str, stat: &str, sport: &str) -> AnalyzedProp {
        let record = PropRecord::new(player, stat, 10.5)
            .with_team(team)
            .with_sport(sport)
            .with_game(format!("{} game", team))
            .with_odds(Some(-110), Some(-110));
        analyze(record, &KellySizer::default())
    }

    #[test]
    fn test_parse_entities_and_keywords() {
        let intent = parse_intent("  Jokic POINTS nuggets nba  ");
        assert_eq!(intent.player(), Some("jokic"));
        assert_eq!(intent.team(), Some("nuggets"));
        assert_eq!(intent.sport(), Some("nba"));
        assert_eq!(intent.keywords(), &["points".to_string(), "point".to_string()]);
        assert_eq!(intent.action(), QueryAction::Generate);
    }

    #[test]
    fn test_short_tokens_dropped() {
        let intent = parse_intent("a of to big");
        assert_eq!(intent.keywords(), &["big".to_string()]);
    }

    #[test]
    fn test_stat_aliases_collapse() {
        let a = parse_intent("pts");
        let b = parse_intent("scoring");
        assert_eq!(a.keywords(), b.keywords());
        assert_eq!(
            parse_intent("boards").keywords(),
            &["rebounds".to_string(), "rebound".to_string()]
        );
    }

    #[test]
    fn test_explain_action() {
        let intent = parse_intent("explain lebron assists");
        assert_eq!(intent.action(), QueryAction::Explain);
        assert_eq!(intent.player(), Some("lebron"));
        assert_eq!(intent.keywords(), &["assists".to_string(), "assist".to_string()]);
    }

    #[test]
    fn test_empty_query_has_no_terms() {
        let intent = parse_intent("   ");
        assert!(!intent.has_terms());
        assert_eq!(intent, QueryIntent::default());
    }

    #[test]
    fn test_score_components() {
        let jokic = prop("Nikola Jokic", "Nuggets", "points", "nba");
        let intent = parse_intent("jokic nuggets points");
        let expected = 20.0 + 15.0 + 10.0 + 5.0 * jokic.edge();
        assert!((score(&jokic, &intent) - expected).abs() < 1e-12);

        let other = prop("Jayson Tatum", "Celtics", "rebounds", "nba");
        assert!((score(&other, &intent) - 5.0 * other.edge()).abs() < 1e-12);
    }

    #[test]
    fn test_rank_filters_and_orders() {
        let props = vec![
            prop("Jayson Tatum", "Celtics", "rebounds", "nba"),
            prop("Stephen Curry", "Warriors", "points", "nba"),
            prop("Nikola Jokic", "Nuggets", "points", "nba"),
            prop("Connor McDavid", "Oilers", "shots", "nhl"),
        ];
        let ranked = rank(&props, &parse_intent("jokic points"), 10);
        let names: Vec<&str> = ranked.iter().map(|p| p.record.player.as_str()).collect();
        assert_eq!(names, vec!["Nikola Jokic", "Stephen Curry"]);
    }

    #[test]
    fn test_rank_no_match_is_empty() {
        let props = vec![prop("Jayson Tatum", "Celtics", "rebounds", "nba")];
        assert!(rank(&props, &parse_intent("touchdowns"), 10).is_empty());
    }

    #[test]
    fn test_rank_sport_restriction_and_count() {
        let props = vec![
            prop("Connor McDavid", "Oilers", "shots", "nhl"),
            prop("Jayson Tatum", "Celtics", "rebounds", "NBA"),
            prop("Nikola Jokic", "Nuggets", "rebounds", "nba"),
        ];
        let ranked = rank(&props, &parse_intent("basketball rebounds"), 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].record.player, "Jayson Tatum");
    }
}
