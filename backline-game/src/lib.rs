//! Backline Game Engine
//!
//! Platform-agnostic show-resolution core for the Backline music-scene
//! booking game. Scores lineups, matches venue synergies, evolves the
//! relationships between acts and scales outcomes by difficulty tier.
//! No UI, storage or platform-specific dependencies.

pub mod act;
pub mod bill;
pub mod config;
pub mod constants;
pub mod difficulty;
pub mod economy;
pub mod numbers;
pub mod relationships;
pub mod rng;
pub mod session;
pub mod show;
pub mod synergy;
pub mod venue;

use std::convert::Infallible;
use std::sync::Arc;

// Re-export commonly used types
pub use act::{Act, ActTrait, TagSet};
pub use bill::{
    AnalysisContext, Bill, BillDynamics, BillError, analyze, analyze_with, attendance_modifier,
    headliner_score, reputation_modifier, roll_drama, select_headliner,
};
pub use config::{ConfigError, EngineConfig, default_config};
pub use difficulty::{DifficultyTable, DifficultyTier, ScaleAxis, TierBand, TierMultipliers};
pub use economy::{
    EconomicsProjection, EconomyCfg, ForecastVariance, ShowForecast, reconcile, success_threshold,
};
pub use relationships::{
    PairKey, Relationship, RelationshipEvent, RelationshipEventKind, RelationshipLedger,
    RelationshipSynergy, RelationshipUpdate,
};
pub use rng::{CountingRng, RngBundle};
pub use session::{GameSession, SessionSnapshot};
pub use show::{PairModifier, ShowInput, ShowResult, resolve_show};
pub use synergy::{FiredSynergy, SynergyRule, SynergyTable, SynergyTotals};
pub use venue::{TraitKind, Venue, VenueTrait, VenueUpgrade};

/// Source of the rule tables a game is played under.
/// Platform-specific implementations should provide this
pub trait ConfigLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load and validate the engine configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any table cannot be loaded or fails validation.
    fn load_config(&self) -> Result<EngineConfig, Self::Error>;
}

/// Loader backed by the tables compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticConfigLoader;

impl ConfigLoader for StaticConfigLoader {
    type Error = Infallible;

    fn load_config(&self) -> Result<EngineConfig, Self::Error> {
        Ok(default_config().clone())
    }
}

/// Trait for abstracting save/load of session snapshots
/// Platform-specific implementations should provide this
pub trait LedgerStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a session snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    fn save_snapshot(&self, save_name: &str, snapshot: &SessionSnapshot) -> Result<(), Self::Error>;

    /// Load a session snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be loaded.
    fn load_snapshot(&self, save_name: &str) -> Result<Option<SessionSnapshot>, Self::Error>;

    /// Delete a saved snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_snapshot(&self, save_name: &str) -> Result<(), Self::Error>;
}

/// Entry point binding a config source to snapshot storage.
pub struct BookingEngine<L, S>
where
    L: ConfigLoader,
    S: LedgerStorage,
{
    config_loader: L,
    storage: S,
}

impl<L, S> BookingEngine<L, S>
where
    L: ConfigLoader,
    S: LedgerStorage,
{
    pub const fn new(config_loader: L, storage: S) -> Self {
        Self {
            config_loader,
            storage,
        }
    }

    /// Start a fresh session under the loader's rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn create_session(&self, seed: u64) -> Result<GameSession, L::Error> {
        let config = self.config_loader.load_config()?;
        Ok(GameSession::new(Arc::new(config), seed))
    }

    /// Persist a session snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    pub fn save_session(&self, save_name: &str, session: &GameSession) -> Result<(), S::Error> {
        self.storage.save_snapshot(save_name, &session.snapshot())
    }

    /// Resume a saved session under freshly loaded rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot or configuration cannot be loaded.
    pub fn load_session(&self, save_name: &str) -> Result<Option<GameSession>, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        let Some(snapshot) = self
            .storage
            .load_snapshot(save_name)
            .map_err(Into::<anyhow::Error>::into)?
        else {
            return Ok(None);
        };
        let config = self
            .config_loader
            .load_config()
            .map_err(Into::<anyhow::Error>::into)?;
        Ok(Some(GameSession::from_snapshot(snapshot, Arc::new(config))))
    }

    /// Remove a saved session
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    pub fn delete_session(&self, save_name: &str) -> Result<(), S::Error> {
        self.storage.delete_snapshot(save_name)
    }
}
