use propedge::props::analysis::analyze_all;
use propedge::props::grouping::group;
use propedge::props::ingest::{ingest, ingest_json};
use propedge::props::kelly::{kelly_stake, KellySizer, MAX_KELLY_FRACTION};
use propedge::props::odds::{format_american, normalize_odds};
use propedge::props::pipeline::{FilterConfig, PropFilters};
use propedge::props::query::{parse_intent, rank};
use propedge::props::types::{ConfidenceTier, PropRecord, ValueSide};
use propedge::PropError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn open_filters() -> PropFilters {
    PropFilters::new(FilterConfig {
        require_agreement: false,
        ..FilterConfig::default()
    })
}

/// A single complete Jokic record is priced over with a very-high tier.
#[test]
fn jokic_points_over_is_very_high_value() {
    let raw = vec![json!({
        "player": "Nikola Jokic",
        "stat_type": "player_points",
        "line": 27.5,
        "projection": 30.0,
        "over_price": -110,
        "under_price": -110
    })];
    let records = ingest(&raw, "nba");
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.stat_type, "points");
    assert_eq!(record.over_odds, Some(-110));
    assert_eq!(record.under_odds, Some(-110));

    let props = analyze_all(records, &KellySizer::default());
    let a = &props[0].assessment;
    assert_eq!(a.recommended_side, ValueSide::Over);
    assert_eq!(a.projection_diff, 2.5);
    assert_eq!(a.estimated_true_probability, 0.65);
    assert!((a.market_implied_probability - 110.0 / 210.0).abs() < 1e-12);
    assert!((a.edge - 0.1262).abs() < 1e-4, "edge was {}", a.edge);
    assert_eq!(a.confidence_tier, ConfidenceTier::VeryHigh);
}

/// Split over/under rows for one proposition collapse into one record.
#[test]
fn split_sides_merge_into_one_record() {
    let raw = vec![
        json!({"player": "Nikola Jokic", "stat_type": "points", "line": 27.5, "over_price": -120}),
        json!({"player": "Nikola Jokic", "stat_type": "points", "line": 27.5,
               "under_price": "+100"}),
    ];
    let grouped = group(ingest(&raw, "nba"));
    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped[0].over_odds, Some(-120));
    assert_eq!(grouped[0].under_odds, Some(100));
}

/// A player query keeps only matching props and ranks the named player first.
#[test]
fn player_query_ranks_named_player_first() {
    let raw = vec![
        json!({"player": "Jayson Tatum", "team": "Celtics", "stat_type": "rebounds", "line": 8.5,
               "projection": 9.9, "over_price": -110, "under_price": -110}),
        json!({"player": "Aaron Judge", "team": "Yankees", "stat_type": "batter_hits", "line": 0.5,
               "projection": 1.0, "over_price": -150, "under_price": 120, "sport": "mlb"}),
        json!({"player": "Nikola Jokic", "stat_type": "player_points", "line": 27.5,
               "projection": 30.0, "over_price": -110, "under_price": -110}),
        json!({"player": "Connor McDavid", "team": "Oilers", "stat_type": "shots", "line": 3.5,
               "projection": 4.0, "over_price": 100, "under_price": -120, "sport": "nhl"}),
        json!({"player": "Patrick Mahomes", "team": "Chiefs", "stat_type": "passing_yards",
               "line": 274.5, "over_price": -115, "under_price": -105, "sport": "nfl"}),
        json!({"player": "Stephen Curry", "team": "Warriors", "stat_type": "threes", "line": 4.5,
               "projection": 5.0, "over_price": 110, "under_price": -130}),
    ];
    let props = analyze_all(group(ingest(&raw, "nba")), &KellySizer::default());
    assert_eq!(props.len(), 6);

    let intent = parse_intent("jokic points");
    assert_eq!(intent.player(), Some("jokic"));
    assert_eq!(intent.keywords(), &["points".to_string(), "point".to_string()]);

    let ranked = rank(&props, &intent, 10);
    assert!(!ranked.is_empty());
    assert!(ranked.len() <= 6);
    assert_eq!(ranked[0].record.player, "Nikola Jokic");
    assert!(ranked.iter().all(|p| p.record.player == "Nikola Jokic"
        || p.record.stat_type.contains("point")));
}

/// Non-positive edge never stakes anything.
#[test]
fn negative_edge_stakes_nothing() {
    let sizing = kelly_stake(-0.02, Some(-110), dec!(1000), 0.25);
    assert_eq!(sizing.fraction, 0.0);
    assert_eq!(sizing.amount, Decimal::ZERO);
}

#[test]
fn kelly_fraction_stays_within_bounds() {
    let edges = [-0.5, -0.01, 0.0, 0.001, 0.05, 0.13, 0.3, 0.49];
    let odds = [-1000, -300, -110, 100, 150, 400, 2500];
    let multipliers = [0.1, 0.25, 0.5, 1.0];

    for &edge in &edges {
        for &o in &odds {
            for &m in &multipliers {
                let sizing = kelly_stake(edge, Some(o), dec!(1000), m);
                assert!(
                    (0.0..=MAX_KELLY_FRACTION).contains(&sizing.fraction),
                    "edge {edge} odds {o} multiplier {m} gave {}",
                    sizing.fraction
                );
                assert!(sizing.amount >= Decimal::ZERO);
                assert!(sizing.amount <= dec!(200.001));
            }
        }
    }
}

#[test]
fn american_odds_survive_format_and_normalize() {
    for odds in [-10000, -500, -110, -101, 100, 101, 150, 999, 25000] {
        assert_eq!(normalize_odds(&format_american(odds), None), Some(odds));
    }
    assert_eq!(normalize_odds("2.5", None), Some(150));
    assert_eq!(normalize_odds("1.5", None), Some(-200));
}

#[test]
fn recommended_side_follows_projection() {
    let records = vec![
        PropRecord::new("A", "points", 10.5)
            .with_odds(Some(-110), Some(-110))
            .with_projection(12.0),
        PropRecord::new("B", "points", 10.5)
            .with_odds(Some(-110), Some(-110))
            .with_projection(9.0),
        PropRecord::new("C", "points", 10.5)
            .with_odds(Some(-110), Some(-110))
            .with_projection(10.5),
    ];
    for prop in analyze_all(records, &KellySizer::default()) {
        let diff = prop.projection_diff().unwrap();
        let is_over = prop.assessment.recommended_side == ValueSide::Over;
        assert_eq!(is_over, diff > 0.0, "{}", prop.record.player);
    }
}

#[test]
fn grouping_twice_changes_nothing() {
    let records = vec![
        PropRecord::new("A", "points", 1.5).with_odds(Some(-115), None),
        PropRecord::new("a", "points", 1.5)
            .with_odds(None, Some(-105))
            .with_projection(2.0),
        PropRecord::new("B", "assists", 3.5).with_team("Lakers"),
        PropRecord::new("B", "assists", 3.5).with_opponent("Nuggets"),
    ];
    let once = group(records);
    assert_eq!(once.len(), 2);
    assert_eq!(group(once.clone()), once);
}

#[test]
fn pipeline_never_puts_losers_before_winners() {
    let mut records = Vec::new();
    for (i, projection) in [9.0, 12.0, 10.4, 11.2, 8.0, 10.6, 14.0].iter().enumerate() {
        records.push(
            PropRecord::new(format!("P{i}"), "points", 10.5)
                .with_odds(Some(-110 - 10 * i as i32), Some(-110 + 5 * i as i32))
                .with_projection(*projection),
        );
    }
    records.push(PropRecord::new("Blind", "points", 10.5).with_odds(Some(-110), Some(-110)));

    let sorted = open_filters().apply(&analyze_all(records, &KellySizer::default()));
    assert_eq!(sorted.len(), 8);
    let first_loser = sorted.iter().position(|p| p.edge() <= 0.0).unwrap_or(sorted.len());
    assert!(sorted[..first_loser].iter().all(|p| p.edge() > 0.0));
    assert!(sorted[first_loser..].iter().all(|p| p.edge() <= 0.0));
}

#[test]
fn malformed_input_degrades_to_empty_output() {
    let records = ingest(&[json!(null), json!("x"), json!({"team": "Bruins"})], "nba");
    assert!(records.is_empty());
    assert!(open_filters().apply(&analyze_all(records, &KellySizer::default())).is_empty());

    assert!(matches!(ingest_json("not json", "nba"), Err(PropError::Json(_))));
    assert!(matches!(ingest_json("42", "nba"), Err(PropError::InvalidInput(_))));
}

#[test]
fn envelope_payload_is_accepted() {
    let text = r#"{"selections": [{"player_name": "Aaron Judge", "prop_type": "batter_hits",
                   "line": "0.5", "odds": "-150", "type": "Over"}]}"#;
    let records = ingest_json(text, "mlb").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].stat_type, "hits");
    assert_eq!(records[0].sport, "mlb");
    assert_eq!(records[0].over_odds, Some(-150));
    assert_eq!(records[0].under_odds, None);
}

/// An empty sibling array in the envelope does not hide the props.
#[test]
fn envelope_with_empty_sibling_array() {
    let text = r#"{"props": [{"player": "Nikola Jokic", "line": 27.5, "over_price": -110}],
                   "errors": []}"#;
    let records = ingest_json(text, "nba").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].over_odds, Some(-110));
}

/// Two untyped rows for one prop split into over and under by sign.
#[test]
fn untyped_price_pair_splits_by_sign() {
    let raw = vec![
        json!({"player": "Aaron Judge", "stat": "hits", "line": 0.5, "projection": 1.2,
               "odds": "+120"}),
        json!({"player": "Aaron Judge", "stat": "hits", "line": 0.5, "projection": 1.2,
               "odds": "-150"}),
        json!({"player": "Juan Soto", "stat": "hits", "line": 0.5, "projection": 0.3,
               "odds": "-135"}),
    ];
    let grouped = group(ingest(&raw, "mlb"));
    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped[0].over_odds, Some(120));
    assert_eq!(grouped[0].under_odds, Some(-150));
    assert_eq!(grouped[1].over_odds, None);
    assert_eq!(grouped[1].under_odds, Some(-135));

    let props = analyze_all(grouped, &KellySizer::default());
    assert_eq!(props[0].assessment.recommended_side, ValueSide::Over);
    assert!(props[0].market.complementary);
}
