//! Raw feed ingestion
//!
//! Feeds disagree on field names. Each concept has an ordered list of
//! candidate keys, resolved once here; nothing downstream branches on field
//! presence.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::odds::normalize_odds_value;
use super::types::{PropRecord, Side};
use crate::error::{PropError, Result};

const PLAYER_KEYS: &[&str] = &["player", "player_name"];
const STAT_KEYS: &[&str] = &["stat_type", "prop_type", "stat"];
const LINE_KEYS: &[&str] = &["line"];
const OVER_ODDS_KEYS: &[&str] = &["over_price"];
const UNDER_ODDS_KEYS: &[&str] = &["under_price"];
const COMBINED_ODDS_KEYS: &[&str] = &["odds"];
const COMBINED_SIDE_KEYS: &[&str] = &["type"];
const TEAM_KEYS: &[&str] = &["team"];
const OPPONENT_KEYS: &[&str] = &["opponent"];
const GAME_KEYS: &[&str] = &["game"];
const SPORT_KEYS: &[&str] = &["sport"];
const BOOKMAKER_KEYS: &[&str] = &["bookmaker"];
const PROJECTION_KEYS: &[&str] = &["projection"];
const EDGE_KEYS: &[&str] = &["edge"];
const PROJECTION_EDGE_KEYS: &[&str] = &["projection_edge"];
const CONFIDENCE_KEYS: &[&str] = &["confidence"];
const TIMESTAMP_KEYS: &[&str] = &["last_updated", "timestamp", "last_update"];

/// Prefixes feeds put in front of stat categories ("player_points")
/// Envelope keys that carry the prop array, in priority order
const ENVELOPE_KEYS: &[&str] = &["selections", "props", "data"];

const STAT_PREFIXES: &[&str] = &["player_", "batter_", "pitcher_"];
const DEFAULT_STAT: &str = "points";

/// Decode a JSON payload holding raw props.
///
/// Accepts a bare array or an envelope object. In an envelope the first
/// non-empty array under a known key wins, then the first non-empty array in
/// payload order, then any array.
pub fn ingest_json(text: &str, default_sport: &str) -> Result<Vec<PropRecord>> {
    let payload: Value = serde_json::from_str(text)?;
    let items = extract_items(payload).ok_or_else(|| {
        PropError::InvalidInput("payload holds no array of props".to_string())
    })?;
    Ok(ingest(&items, default_sport))
}

/// Resolve every raw item into a typed record, skipping unusable ones.
pub fn ingest(raw: &[Value], default_sport: &str) -> Vec<PropRecord> {
    let records: Vec<PropRecord> = raw
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let Some(fields) = item.as_object() else {
                warn!(index, "skipping non-object prop entry");
                return None;
            };
            resolve_record(fields, default_sport).or_else(|| {
                warn!(index, "skipping prop without player or line");
                None
            })
        })
        .collect();

    debug!(raw = raw.len(), ingested = records.len(), "ingested props");
    records
}

/// Resolve one raw prop; `None` when player or line is unusable.
pub fn resolve_record(fields: &Map<String, Value>, default_sport: &str) -> Option<PropRecord> {
    let player = first_string(fields, PLAYER_KEYS)?;
    let line = first_number(fields, LINE_KEYS).filter(|l| *l >= 0.0)?;

    let stat_type = first_string(fields, STAT_KEYS)
        .map(|s| normalize_stat_type(&s))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_STAT.to_string());

    let projection = first_number(fields, PROJECTION_KEYS);
    let team = first_string(fields, TEAM_KEYS).unwrap_or_default();
    let opponent = first_string(fields, OPPONENT_KEYS).unwrap_or_default();
    let game = first_string(fields, GAME_KEYS).unwrap_or_else(|| compose_game(&team, &opponent));

    let mut record = PropRecord::new(player, stat_type, line);
    record.team = team;
    record.opponent = opponent;
    record.game = game;
    record.sport = first_string(fields, SPORT_KEYS).unwrap_or_else(|| default_sport.to_string());
    record.projection = projection;
    record.bookmaker = first_string(fields, BOOKMAKER_KEYS);
    record.feed_edge = first_number(fields, EDGE_KEYS);
    record.feed_projection_edge = first_number(fields, PROJECTION_EDGE_KEYS);
    record.feed_confidence = first_string(fields, CONFIDENCE_KEYS);
    record.last_updated = first_value(fields, TIMESTAMP_KEYS).and_then(parse_timestamp);

    record.over_odds = first_value(fields, OVER_ODDS_KEYS)
        .and_then(|v| normalize_odds_value(v, Some(Side::Over)));
    record.under_odds = first_value(fields, UNDER_ODDS_KEYS)
        .and_then(|v| normalize_odds_value(v, Some(Side::Under)));

    if record.over_odds.is_none() && record.under_odds.is_none() {
        apply_combined_odds(&mut record, fields);
    }

    Some(record)
}

/// Lower-case a stat category and strip its namespacing prefix
pub fn normalize_stat_type(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    STAT_PREFIXES
        .iter()
        .find_map(|prefix| lower.strip_prefix(prefix))
        .map(str::to_string)
        .unwrap_or(lower)
}

/// `odds` + `type` pairs. An untyped price is held on the record until
/// grouping has seen every row of the proposition.
fn apply_combined_odds(record: &mut PropRecord, fields: &Map<String, Value>) {
    let Some(raw_odds) = first_value(fields, COMBINED_ODDS_KEYS) else {
        return;
    };
    let marked_side =
        first_string(fields, COMBINED_SIDE_KEYS).and_then(|t| Side::from_marker(&t));

    let Some(side) = marked_side else {
        if let Some(odds) = normalize_odds_value(raw_odds, None) {
            record.untyped_odds.push(odds);
        }
        return;
    };

    let odds = normalize_odds_value(raw_odds, Some(side));
    match side {
        Side::Over => record.over_odds = odds,
        Side::Under => record.under_odds = odds,
    }
}

fn compose_game(team: &str, opponent: &str) -> String {
    match (team.is_empty(), opponent.is_empty()) {
        (false, false) => format!("{} vs {}", team, opponent),
        (false, true) => team.to_string(),
        (true, false) => opponent.to_string(),
        (true, true) => String::new(),
    }
}

fn first_value<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|v| !v.is_null())
}

fn first_string(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match fields.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn first_number(fields: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match fields.get(*key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
    .filter(|v| v.is_finite())
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let raw = n.as_i64()?;
            // anything past ~2001 in milliseconds is larger than any plausible seconds value
            if raw.abs() >= 1_000_000_000_000 {
                Utc.timestamp_millis_opt(raw).single()
            } else {
                Utc.timestamp_opt(raw, 0).single()
            }
        }
        _ => None,
    }
}

/// Pull the prop array out of a payload
fn extract_items(payload: Value) -> Option<Vec<Value>> {
    let mut map = match payload {
        Value::Array(items) => return Some(items),
        Value::Object(map) => map,
        _ => return None,
    };

    let non_empty = |v: &Value| v.as_array().is_some_and(|items| !items.is_empty());
    let key = ENVELOPE_KEYS
        .iter()
        .map(|key| key.to_string())
        .find(|key| map.get(key).is_some_and(non_empty))
        .or_else(|| map.iter().find(|(_, v)| non_empty(*v)).map(|(k, _)| k.clone()))
        .or_else(|| map.iter().find(|(_, v)| v.is_array()).map(|(k, _)| k.clone()))?;

    debug!(key = %key, "extracted props from envelope");
    match map.remove(&key) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    }
}
