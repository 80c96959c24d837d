//! Show resolution: folds bill dynamics, venue synergies, relationship
//! modifiers and the difficulty tier into one outcome.
//!
//! Resolution never mutates the ledger. The updates it proposes ride along
//! on [`ShowResult::relationship_updates`] for the session to apply.
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::act::Act;
use crate::bill::{
    self, AnalysisContext, Bill, BillError, attendance_modifier, reputation_modifier, roll_drama,
};
use crate::config::EngineConfig;
use crate::constants::{
    LEDGER_DRAMA_DELTA, LOG_TARGET_SHOW, SHOW_APPEAL_FILL, SHOW_ATMOSPHERE_DIVISOR, SHOW_BASE_FILL,
    SHOW_DRAMA_FAN_LOSS, SHOW_DRAMA_REPUTATION_COST, SHOW_FAN_CONVERSION, SHOW_REPUTATION_SWING,
    SHOW_VENUE_ATMOSPHERE_DIVISOR, SHOW_VENUE_ATMOSPHERE_PIVOT,
};
use crate::difficulty::DifficultyTier;
use crate::economy::success_threshold;
use crate::numbers::{round_f64_to_i32, round_f64_to_u32_capped, round_f64_to_u64};
use crate::relationships::{
    PairKey, RelationshipEventKind, RelationshipLedger, RelationshipSynergy, RelationshipUpdate,
    unordered_pairs,
};
use crate::synergy::{self, FiredSynergy, ShowProjection, SynergyTotals};
use crate::venue::Venue;

/// One booking to resolve.
#[derive(Debug, Clone, Copy)]
pub struct ShowInput<'a> {
    pub acts: &'a [Act],
    pub venue: &'a Venue,
    pub round: u32,
    /// Overrides the tier's optimal ticket price when set.
    pub ticket_price: Option<f64>,
    pub context: AnalysisContext,
}

impl<'a> ShowInput<'a> {
    #[must_use]
    pub fn new(acts: &'a [Act], venue: &'a Venue, round: u32) -> Self {
        Self {
            acts,
            venue,
            round,
            ticket_price: None,
            context: AnalysisContext::default(),
        }
    }

    #[must_use]
    pub const fn with_ticket_price(mut self, price: f64) -> Self {
        self.ticket_price = Some(price);
        self
    }

    #[must_use]
    pub const fn with_context(mut self, context: AnalysisContext) -> Self {
        self.context = context;
        self
    }
}

/// A relationship-threshold modifier active for one booked pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairModifier {
    pub pair: PairKey,
    pub synergy: RelationshipSynergy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowResult {
    pub round: u32,
    pub tier: DifficultyTier,
    pub bill: Bill,
    pub attendance: u32,
    pub fill_ratio: f64,
    pub ticket_price: f64,
    pub revenue: u64,
    pub reputation_delta: i32,
    pub fans_delta: i32,
    pub atmosphere: f64,
    /// Combined venue-synergy and relationship multiplier on attendance.
    pub attendance_multiplier: f64,
    pub fired_synergies: Vec<FiredSynergy>,
    pub relationship_modifiers: Vec<PairModifier>,
    pub drama: Option<String>,
    pub success: bool,
    pub relationship_updates: Vec<RelationshipUpdate>,
}

impl ShowResult {
    #[must_use]
    pub fn had_drama(&self) -> bool {
        self.drama.is_some()
    }

    #[must_use]
    pub fn fired(&self, synergy_id: &str) -> bool {
        self.fired_synergies.iter().any(|s| s.id == synergy_id)
    }
}

/// Resolve one show against a read-only ledger.
///
/// # Errors
///
/// Returns [`BillError::EmptyLineup`] when no acts are booked.
pub fn resolve_show<R>(
    input: &ShowInput<'_>,
    ledger: &RelationshipLedger,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<ShowResult, BillError>
where
    R: Rng + ?Sized,
{
    let bill = bill::analyze_with(input.acts, ledger, &input.context)?;
    let dynamics = bill.dynamics;
    let venue = input.venue;
    let round = input.round;

    let band = config.difficulty.tier_for(round);
    let multipliers = band.multipliers;
    let ticket_price = input
        .ticket_price
        .map_or_else(
            || config.economy.optimal_ticket_price(&config.difficulty, round),
            |price| price.max(0.0),
        );

    let ids: Vec<&str> = input.acts.iter().map(|act| act.id.as_str()).collect();
    let relationship_modifiers: Vec<PairModifier> = unordered_pairs(&ids)
        .into_iter()
        .flat_map(|pair| {
            ledger
                .synergy_for(pair.first(), pair.second())
                .into_iter()
                .map(move |synergy| PairModifier {
                    pair: pair.clone(),
                    synergy,
                })
        })
        .collect();
    let relationship_mult: f64 = relationship_modifiers
        .iter()
        .map(|m| m.synergy.multiplier)
        .product();

    let capacity = f64::from(venue.capacity);
    let base_draw = capacity * (SHOW_BASE_FILL + SHOW_APPEAL_FILL * dynamics.crowd_appeal / 100.0);
    let drawn = base_draw * attendance_modifier(&dynamics) * relationship_mult / multipliers.expectation;

    let rules = synergy::resolve(&config.synergies, venue, input.acts);
    let totals = SynergyTotals::from_rules(&rules);
    let projection = synergy::apply(
        ShowProjection {
            attendance: drawn,
            revenue: 0.0,
            reputation: 0.0,
            fan_conversion: SHOW_FAN_CONVERSION,
            atmosphere: 0.0,
            fired: Vec::new(),
        },
        &rules,
    );

    let attendance = round_f64_to_u32_capped(projection.attendance, venue.capacity);
    let heads = f64::from(attendance);
    let fill_ratio = if venue.capacity == 0 {
        0.0
    } else {
        heads / capacity
    };
    let revenue = round_f64_to_u64(
        heads * ticket_price * totals.revenue_mult + heads * config.economy.bar_spend_per_head,
    );

    let drama = roll_drama(&dynamics, rng);

    let mut reputation = (fill_ratio - 0.5) * SHOW_REPUTATION_SWING * reputation_modifier(&dynamics)
        + projection.reputation
        + projection.atmosphere / SHOW_ATMOSPHERE_DIVISOR
        + (venue.atmosphere - SHOW_VENUE_ATMOSPHERE_PIVOT) / SHOW_VENUE_ATMOSPHERE_DIVISOR;
    if drama.is_some() {
        reputation -= SHOW_DRAMA_REPUTATION_COST;
    }
    if reputation < 0.0 {
        reputation *= multipliers.risk;
    }

    let mut fans = heads * projection.fan_conversion * dynamics.chemistry_score / 100.0;
    if drama.is_some() {
        fans -= heads * SHOW_DRAMA_FAN_LOSS;
    }

    let success = fill_ratio >= success_threshold(&config.difficulty, round) && drama.is_none();

    let mut relationship_updates = RelationshipLedger::plan_show_updates(&ids, success);
    if let Some(incident) = drama
        && let Some(opener) = bill.openers.first()
    {
        relationship_updates.push(RelationshipUpdate {
            pair: PairKey::new(&bill.headliner, opener),
            delta: LEDGER_DRAMA_DELTA,
            kind: RelationshipEventKind::Drama,
            description: incident.to_string(),
        });
    }

    debug!(
        target: LOG_TARGET_SHOW,
        "round {round} ({}) at {}: {attendance}/{} heads, ${revenue}, {} synergies, drama {}",
        band.tier,
        venue.id,
        venue.capacity,
        rules.len(),
        drama.is_some()
    );

    Ok(ShowResult {
        round,
        tier: band.tier,
        bill,
        attendance,
        fill_ratio,
        ticket_price,
        revenue,
        reputation_delta: round_f64_to_i32(reputation),
        fans_delta: round_f64_to_i32(fans),
        atmosphere: projection.atmosphere,
        attendance_multiplier: totals.attendance_mult * relationship_mult,
        fired_synergies: projection.fired,
        relationship_modifiers,
        drama: drama.map(str::to_string),
        success,
        relationship_updates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::act::ActTrait;
    use crate::venue::TraitKind;
    use rand::RngCore;

    /// Always draws zero, so any positive drama risk triggers an incident.
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            dest.fill(0);
            Ok(())
        }
    }

    fn punk(id: &str) -> Act {
        Act::new(id, "punk").with_subgenres(["hardcore"])
    }

    fn basement() -> Venue {
        Venue::new("basement", 200).with_trait("GRIMY_FLOORS", TraitKind::Atmosphere)
    }

    fn config() -> EngineConfig {
        EngineConfig::load_from_static()
    }

    #[test]
    fn punk_basement_show_fires_synergy() {
        // Popularity spread keeps every opener outside the clash window.
        let acts = [
            punk("a").with_stats(60.0, 50.0, 50.0, 50.0),
            punk("b").with_stats(40.0, 50.0, 50.0, 50.0),
            punk("c").with_stats(20.0, 50.0, 50.0, 50.0),
        ];
        let venue = basement();
        let ledger = RelationshipLedger::new();
        let result =
            resolve_show(&ShowInput::new(&acts, &venue, 1), &ledger, &config(), &mut ZeroRng)
                .unwrap();

        assert!((result.bill.dynamics.chemistry_score - 100.0).abs() < 1e-9);
        assert!(result.bill.dynamics.drama_risk.abs() < 1e-9);
        assert!(result.fired("basement_punks"));
        assert!(result.fired("grimy_regulars"));
        assert!(!result.fired("sticky_metal"));
        assert!(result.attendance_multiplier > 1.0);
        assert!(result.drama.is_none());
        assert!(result.attendance <= venue.capacity);
        assert_eq!(result.relationship_updates.len(), 3);
    }

    #[test]
    fn empty_lineup_is_rejected() {
        let venue = basement();
        let err = resolve_show(
            &ShowInput::new(&[], &venue, 0),
            &RelationshipLedger::new(),
            &config(),
            &mut ZeroRng,
        )
        .unwrap_err();
        assert_eq!(err, BillError::EmptyLineup);
    }

    #[test]
    fn attendance_never_exceeds_capacity() {
        let acts = [
            Act::new("huge", "punk").with_stats(500.0, 500.0, 500.0, 500.0),
            Act::new("bigger", "punk").with_stats(400.0, 400.0, 400.0, 400.0),
        ];
        let venue = basement().with_ratings(100.0, 100.0, 100.0);
        let mut ledger = RelationshipLedger::new();
        for round in 0..10 {
            ledger.batch_update_from_show(&["huge", "bigger"], true, round);
        }
        let result =
            resolve_show(&ShowInput::new(&acts, &venue, 0), &ledger, &config(), &mut ZeroRng)
                .unwrap();
        assert!(result.attendance <= venue.capacity);
        assert!(result.fill_ratio <= 1.0);
        assert!(!result.relationship_modifiers.is_empty());
    }

    #[test]
    fn zero_capacity_venue_draws_nobody() {
        let acts = [punk("a")];
        let venue = Venue::new("closet", 0);
        let result = resolve_show(
            &ShowInput::new(&acts, &venue, 0),
            &RelationshipLedger::new(),
            &config(),
            &mut ZeroRng,
        )
        .unwrap();
        assert_eq!(result.attendance, 0);
        assert_eq!(result.revenue, 0);
        assert!(!result.success);
    }

    #[test]
    fn ticket_override_replaces_optimal_price() {
        let acts = [punk("a"), punk("b")];
        let venue = basement();
        let ledger = RelationshipLedger::new();
        let cfg = config();
        let optimal =
            resolve_show(&ShowInput::new(&acts, &venue, 0), &ledger, &cfg, &mut ZeroRng).unwrap();
        assert!((optimal.ticket_price - 15.0).abs() < 1e-9);

        let pricey = resolve_show(
            &ShowInput::new(&acts, &venue, 0).with_ticket_price(40.0),
            &ledger,
            &cfg,
            &mut ZeroRng,
        )
        .unwrap();
        assert!((pricey.ticket_price - 40.0).abs() < 1e-9);
        assert_eq!(pricey.attendance, optimal.attendance);
        assert!(pricey.revenue > optimal.revenue);
    }

    #[test]
    fn drama_costs_reputation_fans_and_the_relationship() {
        let acts = [
            Act::new("edge", "hardcore").with_trait(ActTrait::new("Straight Edge", "No drinks")),
            Act::new("wild", "hardcore").with_trait(ActTrait::new("Party Animal", "All night")),
        ];
        let venue = Venue::new("hall", 300);
        let ledger = RelationshipLedger::new();
        let result =
            resolve_show(&ShowInput::new(&acts, &venue, 0), &ledger, &config(), &mut ZeroRng)
                .unwrap();

        assert!(result.bill.dynamics.drama_risk >= 30.0);
        assert!(result.had_drama());
        assert!(!result.success);

        let drama_updates: Vec<_> = result
            .relationship_updates
            .iter()
            .filter(|u| u.kind == RelationshipEventKind::Drama)
            .collect();
        assert_eq!(drama_updates.len(), 1);
        assert_eq!(drama_updates[0].pair, PairKey::new("edge", "wild"));
        assert!((drama_updates[0].delta - LEDGER_DRAMA_DELTA).abs() < 1e-9);
        assert!(
            result
                .relationship_updates
                .iter()
                .any(|u| u.kind == RelationshipEventKind::ShowTogether && u.delta < 0.0)
        );
    }

    #[test]
    fn single_act_never_rolls_drama() {
        let acts = [punk("solo")];
        let venue = basement();
        let result = resolve_show(
            &ShowInput::new(&acts, &venue, 0),
            &RelationshipLedger::new(),
            &config(),
            &mut ZeroRng,
        )
        .unwrap();
        assert!(result.drama.is_none());
        assert!(result.relationship_updates.is_empty());
    }

    #[test]
    fn later_tiers_draw_smaller_crowds() {
        let acts = [punk("a"), punk("b")];
        let venue = Venue::new("hall", 1000);
        let ledger = RelationshipLedger::new();
        let cfg = config();
        let early =
            resolve_show(&ShowInput::new(&acts, &venue, 0), &ledger, &cfg, &mut ZeroRng).unwrap();
        let late =
            resolve_show(&ShowInput::new(&acts, &venue, 150), &ledger, &cfg, &mut ZeroRng).unwrap();
        assert_eq!(late.tier, DifficultyTier::Endless);
        assert!(late.attendance < early.attendance);
    }

    #[test]
    fn resolution_leaves_the_ledger_untouched() {
        let acts = [punk("a"), punk("b")];
        let venue = basement();
        let ledger = RelationshipLedger::new();
        let before = ledger.clone();
        let _ = resolve_show(&ShowInput::new(&acts, &venue, 0), &ledger, &config(), &mut ZeroRng)
            .unwrap();
        assert_eq!(ledger, before);
    }
}
