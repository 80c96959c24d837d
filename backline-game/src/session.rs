//! Running games: ledger ownership, round progression and save snapshots.
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::act::Act;
use crate::bill::BillError;
use crate::config::EngineConfig;
use crate::constants::LOG_TARGET_SHOW;
use crate::relationships::RelationshipLedger;
use crate::rng::RngBundle;
use crate::show::{ShowInput, ShowResult, resolve_show};
use crate::venue::Venue;

/// Everything needed to resume a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub seed: u64,
    pub round: u32,
    pub ledger: RelationshipLedger,
    /// [`EngineConfig::fingerprint`] of the rules the game was played under.
    pub rules_fingerprint: u64,
    #[serde(default)]
    pub reputation: i64,
    #[serde(default)]
    pub fans: i64,
}

/// One running game: the ledger, the round counter and the seeded streams.
///
/// Only [`GameSession::play_show`] mutates the ledger.
#[derive(Debug, Clone)]
pub struct GameSession {
    config: Arc<EngineConfig>,
    ledger: RelationshipLedger,
    rng: RngBundle,
    round: u32,
    reputation: i64,
    fans: i64,
}

impl GameSession {
    #[must_use]
    pub fn new(config: Arc<EngineConfig>, seed: u64) -> Self {
        Self {
            config,
            ledger: RelationshipLedger::new(),
            rng: RngBundle::for_round(seed, 0),
            round: 0,
            reputation: 0,
            fans: 0,
        }
    }

    /// Resume from a snapshot. A fingerprint mismatch is logged, not fatal.
    #[must_use]
    pub fn from_snapshot(snapshot: SessionSnapshot, config: Arc<EngineConfig>) -> Self {
        let current = config.fingerprint();
        if snapshot.rules_fingerprint != current {
            warn!(
                target: LOG_TARGET_SHOW,
                "session saved under rules {:016x}, resuming under {current:016x}",
                snapshot.rules_fingerprint
            );
        }
        Self {
            config,
            ledger: snapshot.ledger,
            rng: RngBundle::for_round(snapshot.seed, snapshot.round),
            round: snapshot.round,
            reputation: snapshot.reputation,
            fans: snapshot.fans,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            seed: self.rng.seed(),
            round: self.round,
            ledger: self.ledger.clone(),
            rules_fingerprint: self.config.fingerprint(),
            reputation: self.reputation,
            fans: self.fans,
        }
    }

    #[must_use]
    pub const fn ledger(&self) -> &RelationshipLedger {
        &self.ledger
    }

    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Running reputation total across played shows.
    #[must_use]
    pub const fn reputation(&self) -> i64 {
        self.reputation
    }

    #[must_use]
    pub const fn fans(&self) -> i64 {
        self.fans
    }

    /// Resolve a hypothetical booking at the current round.
    ///
    /// Repeated previews of the same booking agree with each other and leave
    /// the ledger and the canonical drama stream untouched.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::EmptyLineup`] when no acts are booked.
    pub fn preview_show(
        &self,
        acts: &[Act],
        venue: &Venue,
        ticket_price: Option<f64>,
    ) -> Result<ShowResult, BillError> {
        let input = self.input(acts, venue, ticket_price);
        let mut rng = self.rng.preview();
        resolve_show(&input, &self.ledger, &self.config, &mut rng)
    }

    /// Play a booking for real: apply its relationship updates and advance
    /// to the next round.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::EmptyLineup`] when no acts are booked; the session
    /// is left unchanged.
    pub fn play_show(
        &mut self,
        acts: &[Act],
        venue: &Venue,
        ticket_price: Option<f64>,
    ) -> Result<ShowResult, BillError> {
        let input = self.input(acts, venue, ticket_price);
        let result = {
            let mut drama = self.rng.drama();
            resolve_show(&input, &self.ledger, &self.config, &mut *drama)?
        };
        self.ledger
            .apply_updates(&result.relationship_updates, self.round);
        self.reputation = self
            .reputation
            .saturating_add(i64::from(result.reputation_delta));
        self.fans = self.fans.saturating_add(i64::from(result.fans_delta));
        self.round = self.round.saturating_add(1);
        self.rng = RngBundle::for_round(self.rng.seed(), self.round);
        Ok(result)
    }

    /// Start over with a fresh ledger and seed, keeping the rules.
    pub fn new_game(&mut self, seed: u64) {
        info!(target: LOG_TARGET_SHOW, "new game with seed {seed:#x}");
        self.ledger.reset();
        self.round = 0;
        self.reputation = 0;
        self.fans = 0;
        self.rng = RngBundle::for_round(seed, 0);
    }

    fn input<'a>(&self, acts: &'a [Act], venue: &'a Venue, ticket_price: Option<f64>) -> ShowInput<'a> {
        let mut input = ShowInput::new(acts, venue, self.round);
        input.ticket_price = ticket_price;
        input
    }
}
