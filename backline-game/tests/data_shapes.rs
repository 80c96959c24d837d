use std::collections::BTreeSet;

use backline_game::{
    DifficultyTable, DifficultyTier, EconomyCfg, EngineConfig, GameSession, RelationshipEventKind,
    RelationshipLedger, SessionSnapshot, SynergyTable, TraitKind, Venue, default_config,
};
use serde_json::Value;
use std::sync::Arc;

const SYNERGIES: &str = include_str!("../assets/data/synergies.json");
const DIFFICULTY: &str = include_str!("../assets/data/difficulty.json");
const ECONOMY: &str = include_str!("../assets/data/economy.json");

#[test]
fn embedded_assets_parse_and_validate() {
    let config = EngineConfig::from_json_parts(SYNERGIES, DIFFICULTY, ECONOMY).unwrap();
    assert_eq!(&config, default_config());
    config.validate().unwrap();
}

#[test]
fn synergy_rules_have_unique_ids_and_known_traits() {
    let table = SynergyTable::from_json(SYNERGIES).unwrap();
    let ids: BTreeSet<&str> = table.rules.iter().map(|rule| rule.id.as_str()).collect();
    assert_eq!(ids.len(), table.rules.len());
    assert!(
        table
            .rules_for_trait("GRIMY_FLOORS")
            .any(|rule| rule.act_tag.as_deref() == Some("punk"))
    );
    for rule in &table.rules {
        assert!(
            rule.venue_trait
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == '_'),
            "{} trait {}",
            rule.id,
            rule.venue_trait
        );
    }
}

#[test]
fn difficulty_tiers_escalate() {
    let table = DifficultyTable::from_json(DIFFICULTY).unwrap();
    let order: Vec<DifficultyTier> = table.tiers.iter().map(|band| band.tier).collect();
    assert_eq!(
        order,
        vec![
            DifficultyTier::Easy,
            DifficultyTier::Medium,
            DifficultyTier::Hard,
            DifficultyTier::Extreme,
            DifficultyTier::Endless,
        ]
    );
    for window in table.tiers.windows(2) {
        let (lower, upper) = (&window[0].multipliers, &window[1].multipliers);
        assert!(upper.cost >= lower.cost);
        assert!(upper.expectation >= lower.expectation);
        assert!(upper.risk >= lower.risk);
    }
}

#[test]
fn economy_asset_matches_defaults() {
    let parsed = EconomyCfg::from_json(ECONOMY).unwrap();
    let defaults = EconomyCfg::from_json("{}").unwrap();
    assert_eq!(parsed, defaults);
}

#[test]
fn ledger_serializes_as_relationship_list() {
    let mut ledger = RelationshipLedger::new();
    ledger.update("b", "a", 12.0, RelationshipEventKind::Collaboration, "split EP", 4);
    let value = serde_json::to_value(&ledger).unwrap();
    let list = value["relationships"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["history"][0]["kind"], Value::from("collaboration"));

    let back: RelationshipLedger = serde_json::from_value(value).unwrap();
    assert_eq!(back, ledger);
    assert!((back.get("a", "b") - 12.0).abs() < f64::EPSILON);
}

#[test]
fn session_snapshot_carries_rules_fingerprint() {
    let config = Arc::new(EngineConfig::load_from_static());
    let mut session = GameSession::new(Arc::clone(&config), 0x00C0_FFEE);
    let acts = [
        backline_game::Act::new("first", "emo").with_stats(60.0, 70.0, 40.0, 50.0),
        backline_game::Act::new("second", "emo").with_stats(35.0, 65.0, 55.0, 45.0),
    ];
    let venue = Venue::new("rec-hall", 220).with_trait("ALL_AGES", TraitKind::Social);
    session.play_show(&acts, &venue, None).unwrap();

    let json = serde_json::to_string(&session.snapshot()).unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["round"], Value::from(1));
    assert_eq!(
        value["rules_fingerprint"].as_u64(),
        Some(config.fingerprint())
    );

    let snapshot: SessionSnapshot = serde_json::from_str(&json).unwrap();
    let resumed = GameSession::from_snapshot(snapshot, config);
    assert_eq!(resumed.ledger(), session.ledger());
    assert_eq!(resumed.reputation(), session.reputation());
}
