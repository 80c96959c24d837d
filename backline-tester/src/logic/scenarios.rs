use anyhow::{Context, Result, bail, ensure};
use backline_game::{
    Act, EngineConfig, GameSession, RelationshipLedger, ShowInput, TraitKind, Venue, resolve_show,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

use super::roster::Roster;
use super::simulation::{economy_curve, run_campaign, summarize_sweep, sweep_bookings};

pub struct ScenarioCtx {
    pub config: Arc<EngineConfig>,
    pub seed: u64,
}

pub type ScenarioCheck = fn(&ScenarioCtx) -> Result<()>;

#[derive(Clone)]
pub struct LogicScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub check: ScenarioCheck,
}

const SCENARIOS: [LogicScenario; 7] = [
    LogicScenario {
        key: "smoke",
        name: "Smoke",
        description: "Play a few shows end to end",
        check: smoke,
    },
    LogicScenario {
        key: "booking-sweep",
        name: "Booking Sweep",
        description: "Parallel hypothetical bookings stay within venue limits",
        check: booking_sweep,
    },
    LogicScenario {
        key: "preview-isolation",
        name: "Preview Isolation",
        description: "Previews never touch the ledger or the played outcome",
        check: preview_isolation,
    },
    LogicScenario {
        key: "determinism",
        name: "Determinism",
        description: "Identical seeds replay identical campaigns",
        check: determinism,
    },
    LogicScenario {
        key: "ledger-bounds",
        name: "Ledger Bounds",
        description: "Long campaigns keep affinities symmetric and clamped",
        check: ledger_bounds,
    },
    LogicScenario {
        key: "economy-curve",
        name: "Economy Curve",
        description: "Projected costs and prices escalate by tier",
        check: economy_curve_check,
    },
    LogicScenario {
        key: "synergy-coverage",
        name: "Synergy Coverage",
        description: "Every synergy rule can fire",
        check: synergy_coverage,
    },
];

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS.iter().map(|s| (s.key, s.description)).collect()
}

pub fn scenario_keys() -> Vec<&'static str> {
    SCENARIOS.iter().map(|s| s.key).collect()
}

pub fn get_scenario(key: &str) -> Option<LogicScenario> {
    SCENARIOS.iter().find(|s| s.key == key).cloned()
}

fn roster(ctx: &ScenarioCtx) -> Roster {
    Roster::generate(ctx.seed, 20, 6)
}

fn smoke(ctx: &ScenarioCtx) -> Result<()> {
    let roster = roster(ctx);
    let record = run_campaign(Arc::clone(&ctx.config), &roster, ctx.seed, 3, 1)?;
    ensure!(record.rounds == 3, "expected 3 rounds, got {}", record.rounds);
    ensure!(record.total_attendance > 0, "nobody came to any show");
    Ok(())
}

fn booking_sweep(ctx: &ScenarioCtx) -> Result<()> {
    let roster = roster(ctx);
    let ledger = RelationshipLedger::new();
    let samples = sweep_bookings(&ctx.config, &ledger, &roster, 0, ctx.seed, 128)?;
    let summary = summarize_sweep(&samples);
    ensure!(
        summary.capacity_violations == 0,
        "{} bookings exceeded capacity",
        summary.capacity_violations
    );
    if let Some(bad) = samples.iter().find(|s| s.drama && s.success) {
        bail!("booking at {} had drama but counted as a success", bad.venue);
    }
    ensure!(
        (0.0..=1.0).contains(&summary.mean_fill),
        "mean fill {} out of range",
        summary.mean_fill
    );
    Ok(())
}

fn preview_isolation(ctx: &ScenarioCtx) -> Result<()> {
    let roster = roster(ctx);
    let lineup: Vec<Act> = roster.acts.iter().take(3).cloned().collect();
    let venue = roster.venues.first().context("roster has no venues")?;

    let mut previewed = GameSession::new(Arc::clone(&ctx.config), ctx.seed);
    let mut direct = GameSession::new(Arc::clone(&ctx.config), ctx.seed);
    for _ in 0..5 {
        previewed.preview_show(&lineup, venue, None)?;
        previewed.preview_show(&lineup, venue, Some(42.0))?;
    }
    ensure!(previewed.ledger().is_empty(), "preview mutated the ledger");
    let after_preview = previewed.play_show(&lineup, venue, None)?;
    let without_preview = direct.play_show(&lineup, venue, None)?;
    ensure!(
        after_preview == without_preview,
        "previews changed the played outcome"
    );
    Ok(())
}

fn determinism(ctx: &ScenarioCtx) -> Result<()> {
    let roster = roster(ctx);
    let first = run_campaign(Arc::clone(&ctx.config), &roster, ctx.seed, 10, 2)?;
    let second = run_campaign(Arc::clone(&ctx.config), &roster, ctx.seed, 10, 2)?;
    ensure!(first == second, "campaign diverged for seed {}", ctx.seed);
    Ok(())
}

fn ledger_bounds(ctx: &ScenarioCtx) -> Result<()> {
    let roster = Roster::generate(ctx.seed, 6, 3);
    let mut session = GameSession::new(Arc::clone(&ctx.config), ctx.seed);
    let mut rng = ChaCha8Rng::seed_from_u64(ctx.seed);
    for _ in 0..40 {
        let lineup = roster.lineup(&mut rng, 3);
        let venue = roster.venue(&mut rng).context("roster has no venues")?.clone();
        session.play_show(&lineup, &venue, None)?;
    }
    let ledger = session.ledger();
    for rel in ledger.iter() {
        let (a, b) = (rel.pair.first(), rel.pair.second());
        ensure!(
            (-100.0..=100.0).contains(&rel.affinity),
            "{} affinity {} out of range",
            rel.pair,
            rel.affinity
        );
        ensure!(
            (ledger.get(a, b) - ledger.get(b, a)).abs() < f64::EPSILON,
            "{} is asymmetric",
            rel.pair
        );
    }
    Ok(())
}

fn economy_curve_check(ctx: &ScenarioCtx) -> Result<()> {
    let rounds: Vec<u32> = (0..=150).step_by(5).collect();
    let curve = economy_curve(&ctx.config, &rounds);
    let ticket = &ctx.config.economy.ticket;
    for window in curve.windows(2) {
        let (lower, upper) = (&window[0], &window[1]);
        ensure!(upper.tier >= lower.tier, "tier regressed at round {}", upper.round);
        ensure!(
            upper.total_costs >= lower.total_costs,
            "costs fell at round {}",
            upper.round
        );
    }
    for point in &curve {
        ensure!(
            (ticket.min_price..=ticket.max_price).contains(&point.ticket_price),
            "round {} price {} outside bounds",
            point.round,
            point.ticket_price
        );
    }
    Ok(())
}

fn synergy_coverage(ctx: &ScenarioCtx) -> Result<()> {
    let ledger = RelationshipLedger::new();
    let mut rng = ChaCha8Rng::seed_from_u64(ctx.seed);
    for rule in &ctx.config.synergies.rules {
        let venue = Venue::new("probe", 200).with_trait(rule.venue_trait.clone(), TraitKind::default());
        let genre = rule.act_tag.clone().unwrap_or_else(|| "any".to_string());
        let acts = [Act::new("probe-act", genre)];
        let result = resolve_show(&ShowInput::new(&acts, &venue, 0), &ledger, &ctx.config, &mut rng)?;
        ensure!(result.fired(&rule.id), "rule {} never fires", rule.id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(seed: u64) -> ScenarioCtx {
        ScenarioCtx {
            config: Arc::new(EngineConfig::load_from_static()),
            seed,
        }
    }

    #[test]
    fn every_scenario_passes_on_embedded_rules() {
        for key in scenario_keys() {
            let scenario = get_scenario(key).unwrap();
            (scenario.check)(&ctx(1337)).unwrap_or_else(|err| panic!("{key}: {err:#}"));
        }
    }

    #[test]
    fn unknown_scenario_is_none() {
        assert!(get_scenario("nope").is_none());
        assert_eq!(list_scenarios().len(), scenario_keys().len());
    }
}
