//! Over/under pair grouping
//!
//! Feeds often split one proposition into an "over" row and an "under" row.
//! Rows sharing (player, stat type, line) are merged into one record; output
//! keeps the order in which keys were first seen.
//!
//! Prices that arrived without a side marker are settled once the whole group
//! is known: an opposite-signed pair splits by sign (positive is the over),
//! anything else goes to the side the projection points at.

use std::collections::HashMap;
use tracing::debug;

use super::types::{PropKey, PropRecord, Side};

/// Merge records that describe the same proposition.
pub fn group(records: Vec<PropRecord>) -> Vec<PropRecord> {
    let input_len = records.len();
    let mut index: HashMap<PropKey, usize> = HashMap::with_capacity(input_len);
    let mut grouped: Vec<PropRecord> = Vec::with_capacity(input_len);

    for record in records {
        let key = record.key();
        match index.get(&key).copied() {
            Some(slot) => merge_into(&mut grouped[slot], record),
            None => {
                index.insert(key, grouped.len());
                grouped.push(record);
            }
        }
    }

    grouped.iter_mut().for_each(settle_untyped_odds);

    debug!(input = input_len, grouped = grouped.len(), "grouped props");
    grouped
}

/// Assign held untyped prices to sides. Sides already priced are kept.
pub fn settle_untyped_odds(record: &mut PropRecord) {
    let untyped = std::mem::take(&mut record.untyped_odds);
    match untyped.as_slice() {
        [] => {}
        &[a, b] if (a > 0) != (b > 0) => {
            let (over, under) = if a > 0 { (a, b) } else { (b, a) };
            record.over_odds = record.over_odds.or(Some(over));
            record.under_odds = record.under_odds.or(Some(under));
        }
        &[first, ..] => {
            let Some(side) = record.projection_direction() else {
                debug!(player = %record.player, "untyped odds without projection, side unknown");
                return;
            };
            if untyped.len() > 1 {
                debug!(player = %record.player, count = untyped.len(), "ambiguous untyped odds");
            }
            match side {
                Side::Over => record.over_odds = record.over_odds.or(Some(first)),
                Side::Under => record.under_odds = record.under_odds.or(Some(first)),
            }
        }
    }
}

/// Fold `incoming` into `acc`. Populated fields are never cleared.
fn merge_into(acc: &mut PropRecord, incoming: PropRecord) {
    if incoming.over_odds.is_some() {
        acc.over_odds = incoming.over_odds;
    }
    if incoming.under_odds.is_some() {
        acc.under_odds = incoming.under_odds;
    }

    // missing projection ranks below any value
    let current = acc.projection.unwrap_or(f64::NEG_INFINITY);
    if let Some(projection) = incoming.projection {
        if projection > current {
            acc.projection = Some(projection);
        }
    }

    fill_if_empty(&mut acc.team, incoming.team);
    fill_if_empty(&mut acc.opponent, incoming.opponent);
    fill_if_empty(&mut acc.game, incoming.game);
    fill_if_empty(&mut acc.sport, incoming.sport);
    acc.bookmaker = acc.bookmaker.take().or(incoming.bookmaker);
    acc.feed_edge = acc.feed_edge.or(incoming.feed_edge);
    acc.feed_projection_edge = acc.feed_projection_edge.or(incoming.feed_projection_edge);
    acc.feed_confidence = acc.feed_confidence.take().or(incoming.feed_confidence);
    acc.last_updated = acc.last_updated.max(incoming.last_updated);
    acc.untyped_odds.extend(incoming.untyped_odds);
}

fn fill_if_empty(target: &mut String, candidate: String) {
    if target.is_empty() {
        *target = candidate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(player: &str, line: f64) -> PropRecord {
        PropRecord::new(player, "points", line)
    }

    #[test]
    fn test_merges_split_sides() {
        let records = vec![
            prop("Nikola Jokic", 27.5).with_odds(Some(-120), None),
            prop("nikola jokic", 27.5).with_odds(None, Some(100)),
        ];
        let grouped = group(records);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].player, "Nikola Jokic");
        assert_eq!(grouped[0].over_odds, Some(-120));
        assert_eq!(grouped[0].under_odds, Some(100));
    }

    #[test]
    fn test_null_never_overwrites() {
        let records = vec![
            prop("A", 10.5).with_odds(Some(-110), Some(-110)),
            prop("A", 10.5).with_odds(None, None),
        ];
        let grouped = group(records);
        assert_eq!(grouped[0].over_odds, Some(-110));
        assert_eq!(grouped[0].under_odds, Some(-110));
    }

    #[test]
    fn test_keeps_highest_projection() {
        let records = vec![
            prop("A", 10.5),
            prop("A", 10.5).with_projection(11.0),
            prop("A", 10.5).with_projection(9.0),
            prop("A", 10.5).with_projection(12.5),
        ];
        let grouped = group(records);
        assert_eq!(grouped[0].projection, Some(12.5));
        assert_eq!(grouped[0].projection_diff(), Some(2.0));
    }

    #[test]
    fn test_distinct_lines_and_stats_stay_apart() {
        let records = vec![
            prop("A", 10.5),
            prop("A", 11.5),
            PropRecord::new("A", "rebounds", 10.5),
        ];
        assert_eq!(group(records).len(), 3);
    }

    #[test]
    fn test_first_seen_order() {
        let records = vec![prop("C", 1.0), prop("A", 1.0), prop("C", 1.0), prop("B", 1.0)];
        let players: Vec<String> = group(records).into_iter().map(|r| r.player).collect();
        assert_eq!(players, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_idempotent() {
        let records = vec![
            prop("A", 1.5).with_odds(Some(-115), None).with_projection(2.0),
            prop("B", 3.5).with_odds(Some(100), Some(-130)),
            prop("a", 1.5).with_odds(None, Some(-105)).with_projection(1.0),
        ];
        let once = group(records);
        let twice = group(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_untyped_pair_splits_by_sign() {
        let mut over = PropRecord::new("Aaron Judge", "hits", 0.5).with_projection(1.2);
        over.untyped_odds.push(120);
        let mut under = over.clone();
        under.untyped_odds = vec![-150];

        let grouped = group(vec![over.clone(), under.clone()]);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].over_odds, Some(120));
        assert_eq!(grouped[0].under_odds, Some(-150));
        assert!(grouped[0].untyped_odds.is_empty());

        // row order does not matter
        let grouped = group(vec![under, over]);
        assert_eq!(grouped[0].over_odds, Some(120));
        assert_eq!(grouped[0].under_odds, Some(-150));
    }

    #[test]
    fn test_lone_untyped_price_follows_projection() {
        let mut rec = prop("A", 10.5).with_projection(9.0);
        rec.untyped_odds.push(-125);
        let grouped = group(vec![rec]);
        assert_eq!(grouped[0].over_odds, None);
        assert_eq!(grouped[0].under_odds, Some(-125));

        let mut blind = prop("B", 10.5);
        blind.untyped_odds.push(-125);
        let grouped = group(vec![blind]);
        assert_eq!(grouped[0].over_odds, None);
        assert_eq!(grouped[0].under_odds, None);
    }

    #[test]
    fn test_same_signed_untyped_pair_uses_projection() {
        let mut first = prop("A", 10.5).with_projection(12.0);
        first.untyped_odds.push(-110);
        let mut second = prop("A", 10.5);
        second.untyped_odds.push(-130);

        let grouped = group(vec![first, second]);
        assert_eq!(grouped[0].over_odds, Some(-110));
        assert_eq!(grouped[0].under_odds, None);
    }

    #[test]
    fn test_untyped_price_never_replaces_typed_side() {
        let mut untyped = prop("A", 10.5).with_projection(12.0);
        untyped.untyped_odds.push(-140);
        let typed = prop("A", 10.5).with_odds(Some(-105), None);

        let grouped = group(vec![untyped, typed]);
        assert_eq!(grouped[0].over_odds, Some(-105));
        assert_eq!(group(grouped.clone()), grouped);
    }

    #[test]
    fn test_empty_input() {
        assert!(group(Vec::new()).is_empty());
    }
}
