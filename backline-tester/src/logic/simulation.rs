use anyhow::{Context, Result};
use backline_game::numbers::{i64_to_f64, u64_to_f64, usize_to_f64};
use backline_game::{
    DifficultyTier, EconomicsProjection, EngineConfig, GameSession, RelationshipLedger, ShowInput,
    resolve_show,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::roster::Roster;

const MAX_LINEUP: usize = 4;

/// Outcome of one hypothetical booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSample {
    pub lineup: Vec<String>,
    pub venue: String,
    pub capacity: u32,
    pub attendance: u32,
    pub fill_ratio: f64,
    pub revenue: u64,
    pub drama: bool,
    pub success: bool,
    pub fired: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub bookings: usize,
    pub mean_fill: f64,
    pub drama_rate: f64,
    pub success_rate: f64,
    pub capacity_violations: usize,
    pub synergy_hits: BTreeMap<String, usize>,
}

/// Resolve many hypothetical bookings in parallel against one ledger.
///
/// Each booking draws from its own stream, so results do not depend on
/// thread scheduling.
pub fn sweep_bookings(
    config: &EngineConfig,
    ledger: &RelationshipLedger,
    roster: &Roster,
    round: u32,
    seed: u64,
    bookings: usize,
) -> Result<Vec<BookingSample>> {
    (0..bookings)
        .into_par_iter()
        .map(|idx| -> Result<BookingSample> {
            let stream = seed ^ u64::try_from(idx).unwrap_or(u64::MAX).rotate_left(17);
            let mut rng = ChaCha8Rng::seed_from_u64(stream);
            let size = rng.gen_range(1..=MAX_LINEUP);
            let lineup = roster.lineup(&mut rng, size);
            let venue = roster.venue(&mut rng).context("roster has no venues")?;
            let input = ShowInput::new(&lineup, venue, round);
            let result = resolve_show(&input, ledger, config, &mut rng)
                .with_context(|| format!("booking {idx} at {}", venue.id))?;
            Ok(BookingSample {
                lineup: lineup.iter().map(|act| act.id.clone()).collect(),
                venue: venue.id.clone(),
                capacity: venue.capacity,
                attendance: result.attendance,
                fill_ratio: result.fill_ratio,
                revenue: result.revenue,
                drama: result.had_drama(),
                success: result.success,
                fired: result.fired_synergies.into_iter().map(|s| s.id).collect(),
            })
        })
        .collect()
}

pub fn summarize_sweep(samples: &[BookingSample]) -> SweepSummary {
    if samples.is_empty() {
        return SweepSummary::default();
    }
    let count = usize_to_f64(samples.len());
    let mut synergy_hits: BTreeMap<String, usize> = BTreeMap::new();
    for sample in samples {
        for id in &sample.fired {
            *synergy_hits.entry(id.clone()).or_default() += 1;
        }
    }
    SweepSummary {
        bookings: samples.len(),
        mean_fill: samples.iter().map(|s| s.fill_ratio).sum::<f64>() / count,
        drama_rate: usize_to_f64(samples.iter().filter(|s| s.drama).count()) / count,
        success_rate: usize_to_f64(samples.iter().filter(|s| s.success).count()) / count,
        capacity_violations: samples
            .iter()
            .filter(|s| s.attendance > s.capacity)
            .count(),
        synergy_hits,
    }
}

/// Totals from one seeded campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub seed: u64,
    pub rounds: u32,
    pub total_attendance: u64,
    pub total_revenue: u64,
    pub reputation: i64,
    pub fans: i64,
    pub successes: u32,
    pub dramas: u32,
    pub final_tier: DifficultyTier,
    pub relationships: usize,
    pub mean_affinity: f64,
}

/// Play `rounds` shows, booking the best-previewed of `candidates` lineups
/// each round.
pub fn run_campaign(
    config: Arc<EngineConfig>,
    roster: &Roster,
    seed: u64,
    rounds: u32,
    candidates: usize,
) -> Result<CampaignRecord> {
    let mut session = GameSession::new(Arc::clone(&config), seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut record = CampaignRecord {
        seed,
        rounds,
        total_attendance: 0,
        total_revenue: 0,
        reputation: 0,
        fans: 0,
        successes: 0,
        dramas: 0,
        final_tier: config.difficulty.tier_for(0).tier,
        relationships: 0,
        mean_affinity: 0.0,
    };

    for _ in 0..rounds {
        let venue = roster.venue(&mut rng).context("roster has no venues")?.clone();
        let mut best: Option<(u64, Vec<_>)> = None;
        for _ in 0..candidates.max(1) {
            let size = rng.gen_range(2..=MAX_LINEUP);
            let lineup = roster.lineup(&mut rng, size);
            let preview = session.preview_show(&lineup, &venue, None)?;
            if best.as_ref().is_none_or(|(revenue, _)| preview.revenue > *revenue) {
                best = Some((preview.revenue, lineup));
            }
        }
        let Some((_, lineup)) = best else {
            continue;
        };
        let result = session.play_show(&lineup, &venue, None)?;
        record.total_attendance += u64::from(result.attendance);
        record.total_revenue += result.revenue;
        record.successes += u32::from(result.success);
        record.dramas += u32::from(result.had_drama());
        record.final_tier = result.tier;
    }

    let ledger = session.ledger();
    record.reputation = session.reputation();
    record.fans = session.fans();
    record.relationships = ledger.len();
    record.mean_affinity = if ledger.is_empty() {
        0.0
    } else {
        ledger.iter().map(|rel| rel.affinity).sum::<f64>() / usize_to_f64(ledger.len())
    };
    Ok(record)
}

/// Campaigns for every seed, in parallel.
pub fn run_campaigns(
    config: &Arc<EngineConfig>,
    roster: &Roster,
    seeds: &[u64],
    rounds: u32,
) -> Result<Vec<CampaignRecord>> {
    seeds
        .par_iter()
        .map(|&seed| run_campaign(Arc::clone(config), roster, seed, rounds, 3))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignAggregate {
    pub runs: usize,
    pub mean_revenue: f64,
    pub mean_attendance: f64,
    pub mean_reputation: f64,
    pub success_rate: f64,
    pub drama_rate: f64,
}

pub fn aggregate_campaigns(records: &[CampaignRecord]) -> CampaignAggregate {
    if records.is_empty() {
        return CampaignAggregate::default();
    }
    let runs = usize_to_f64(records.len());
    let shows: u32 = records.iter().map(|r| r.rounds).sum();
    let shows = f64::from(shows.max(1));
    CampaignAggregate {
        runs: records.len(),
        mean_revenue: records.iter().map(|r| u64_to_f64(r.total_revenue)).sum::<f64>() / runs,
        mean_attendance: records
            .iter()
            .map(|r| u64_to_f64(r.total_attendance))
            .sum::<f64>()
            / runs,
        mean_reputation: records.iter().map(|r| i64_to_f64(r.reputation)).sum::<f64>() / runs,
        success_rate: f64::from(records.iter().map(|r| r.successes).sum::<u32>()) / shows,
        drama_rate: f64::from(records.iter().map(|r| r.dramas).sum::<u32>()) / shows,
    }
}

/// Projected economics at each listed round.
pub fn economy_curve(config: &EngineConfig, rounds: &[u32]) -> Vec<EconomicsProjection> {
    rounds
        .iter()
        .map(|&round| {
            config
                .economy
                .projected_economics(&config.difficulty, round)
        })
        .collect()
}
