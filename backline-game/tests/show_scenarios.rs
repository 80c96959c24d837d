use backline_game::{
    Act, ActTrait, DifficultyTable, DifficultyTier, EngineConfig, RelationshipLedger, ShowInput,
    SynergyTable, TraitKind, Venue, analyze, resolve_show, synergy,
};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn random_act(rng: &mut SmallRng, idx: usize) -> Act {
    const GENRES: [&str; 5] = ["punk", "metal", "jazz", "folk", "synthwave"];
    const SUBGENRES: [&str; 6] = ["hardcore", "doom", "bebop", "garage", "emo", "diy"];
    let genre = GENRES[rng.gen_range(0..GENRES.len())];
    let sub = SUBGENRES[rng.gen_range(0..SUBGENRES.len())];
    let mut act = Act::new(format!("act-{idx}"), genre)
        .with_subgenres([sub])
        .with_stats(
            rng.gen_range(-50.0..500.0),
            rng.gen_range(-50.0..500.0),
            rng.gen_range(-50.0..500.0),
            rng.gen_range(-50.0..500.0),
        );
    if rng.gen_range(0..4) == 0 {
        act = act.with_trait(ActTrait::new("Party Animals", "Wild after-show plans"));
    }
    if rng.gen_range(0..4) == 0 {
        act = act.with_trait(ActTrait::new("Straight Edge", "No drinks backstage"));
    }
    if rng.gen_range(0..3) == 0 {
        act = act.formed_in(rng.gen_range(1970..2024));
    }
    act
}

fn punk_trio() -> Vec<Act> {
    ["a", "b", "c"]
        .into_iter()
        .map(|id| Act::new(id, "punk").with_subgenres(["hardcore"]))
        .collect()
}

#[test]
fn single_act_bills_are_perfectly_calm() {
    let mut rng = SmallRng::seed_from_u64(0x5EED);
    let ledger = RelationshipLedger::new();
    for idx in 0..50 {
        let act = random_act(&mut rng, idx);
        let bill = analyze(&[act], &ledger).unwrap();
        assert!((bill.dynamics.chemistry_score - 100.0).abs() < f64::EPSILON);
        assert!(bill.dynamics.drama_risk.abs() < f64::EPSILON);
        assert!(bill.openers.is_empty());
    }
}

#[test]
fn dynamics_stay_in_range_for_wild_inputs() {
    let mut rng = SmallRng::seed_from_u64(0xB111);
    let mut ledger = RelationshipLedger::new();
    ledger.update("act-0", "act-1", 100.0, backline_game::RelationshipEventKind::Collaboration, "tour", 0);
    for _ in 0..200 {
        let count = rng.gen_range(2..6);
        let acts: Vec<Act> = (0..count).map(|idx| random_act(&mut rng, idx)).collect();
        let d = analyze(&acts, &ledger).unwrap().dynamics;
        for value in [d.chemistry_score, d.drama_risk, d.crowd_appeal, d.scene_alignment] {
            assert!((0.0..=100.0).contains(&value), "{d:?}");
        }
    }
}

#[test]
fn analysis_is_deterministic() {
    let mut rng = SmallRng::seed_from_u64(42);
    let ledger = RelationshipLedger::new();
    let acts: Vec<Act> = (0..4).map(|idx| random_act(&mut rng, idx)).collect();
    let first = analyze(&acts, &ledger).unwrap();
    let second = analyze(&acts, &ledger).unwrap();
    assert_eq!(first, second);
}

#[test]
fn lifestyle_clash_adds_at_least_thirty_drama() {
    let ledger = RelationshipLedger::new();
    let plain = [Act::new("sober", "punk"), Act::new("rowdy", "punk")];
    let clashing = [
        Act::new("sober", "punk").with_trait(ActTrait::new("Straight Edge", "Clean living")),
        Act::new("rowdy", "punk").with_trait(ActTrait::new("Party", "Last ones out")),
    ];
    let base = analyze(&plain, &ledger).unwrap().dynamics.drama_risk;
    let clash = analyze(&clashing, &ledger).unwrap().dynamics.drama_risk;
    assert!(clash - base >= 30.0, "base {base}, clash {clash}");
}

#[test]
fn grimy_floors_punk_bill() {
    let acts = punk_trio();
    let venue = Venue::new("the-pit", 180).with_trait("GRIMY_FLOORS", TraitKind::Atmosphere);
    let ledger = RelationshipLedger::new();
    let config = EngineConfig::load_from_static();
    let mut rng = SmallRng::seed_from_u64(1);

    let result = resolve_show(&ShowInput::new(&acts, &venue, 3), &ledger, &config, &mut rng).unwrap();
    assert!((result.bill.dynamics.chemistry_score - 100.0).abs() < f64::EPSILON);
    assert!(result.fired("basement_punks"));
    assert!(result.attendance_multiplier > 1.0);
    assert!(result.attendance <= venue.capacity);
}

#[test]
fn synergy_resolution_ignores_lineup_order() {
    let table = SynergyTable::load_from_static();
    let venue = Venue::new("club", 200)
        .with_trait("GRIMY_FLOORS", TraitKind::Atmosphere)
        .with_trait("DIY_SPACE", TraitKind::Social)
        .with_trait("STANDING_ROOM_ONLY", TraitKind::Social);
    let mut acts = vec![
        Act::new("one", "punk"),
        Act::new("two", "metal").with_subgenres(["hardcore"]),
        Act::new("three", "folk").with_subgenres(["diy"]),
    ];
    let expected: Vec<String> = synergy::resolve(&table, &venue, &acts)
        .iter()
        .map(|rule| rule.id.clone())
        .collect();
    assert!(!expected.is_empty());

    let mut rng = SmallRng::seed_from_u64(7);
    for _ in 0..20 {
        acts.shuffle(&mut rng);
        let fired: Vec<String> = synergy::resolve(&table, &venue, &acts)
            .iter()
            .map(|rule| rule.id.clone())
            .collect();
        assert_eq!(fired, expected);
    }
}

#[test]
fn ledger_stays_symmetric_and_clamped() {
    let mut ledger = RelationshipLedger::new();
    let ids = ["x", "y", "z"];
    for round in 0..30 {
        ledger.batch_update_from_show(&ids, true, round);
    }
    for a in ids {
        for b in ids {
            if a == b {
                continue;
            }
            assert!((ledger.get(a, b) - ledger.get(b, a)).abs() < f64::EPSILON);
            assert!((ledger.get(a, b) - 100.0).abs() < f64::EPSILON);
        }
    }
    for round in 30..100 {
        ledger.batch_update_from_show(&ids, false, round);
    }
    assert!((ledger.get("x", "z") + 100.0).abs() < f64::EPSILON);
}

#[test]
fn round_beyond_table_is_endless() {
    let table = DifficultyTable::load_from_static();
    assert_eq!(table.tier_for(150).tier, DifficultyTier::Endless);
    for round in (0..10_000).step_by(7) {
        let hits = table.tiers.iter().filter(|band| band.contains(round)).count();
        assert_eq!(hits, 1, "round {round}");
    }
}

#[test]
fn resolved_shows_respect_capacity_across_seeds() {
    let config = EngineConfig::load_from_static();
    let ledger = RelationshipLedger::new();
    let venue = Venue::new("hall", 400)
        .with_ratings(90.0, 90.0, 90.0)
        .with_trait("HISTORIC_STAGE", TraitKind::Legendary)
        .with_trait("GRIMY_FLOORS", TraitKind::Atmosphere);
    let mut roster_rng = SmallRng::seed_from_u64(3);
    for seed in 0..100_u64 {
        let acts: Vec<Act> = (0..3).map(|idx| random_act(&mut roster_rng, idx)).collect();
        let mut rng = SmallRng::seed_from_u64(seed);
        let result =
            resolve_show(&ShowInput::new(&acts, &venue, 0), &ledger, &config, &mut rng).unwrap();
        assert!(result.attendance <= venue.capacity);
        assert!((0.0..=1.0).contains(&result.fill_ratio));
        if result.had_drama() {
            assert!(!result.success);
        }
    }
}
