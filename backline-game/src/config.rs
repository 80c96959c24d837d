//! Engine configuration assembled from the embedded data tables.
use serde::{Deserialize, Serialize};
use std::hash::Hasher;
use std::sync::OnceLock;
use thiserror::Error;
use twox_hash::XxHash64;

use crate::difficulty::{DifficultyTable, TierTableError};
use crate::economy::{EconomyCfg, EconomyCfgError};
use crate::synergy::{SynergyTable, SynergyTableError};

/// Failure to parse or validate one of the data tables.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid difficulty table: {0}")]
    Difficulty(#[from] TierTableError),
    #[error("invalid synergy table: {0}")]
    Synergy(#[from] SynergyTableError),
    #[error("invalid economy config: {0}")]
    Economy(#[from] EconomyCfgError),
}

/// Immutable rule set shared by every show in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub synergies: SynergyTable,
    pub difficulty: DifficultyTable,
    pub economy: EconomyCfg,
}

impl EngineConfig {
    /// Build from the embedded tables, falling back per table on failure.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self {
            synergies: SynergyTable::load_from_static(),
            difficulty: DifficultyTable::load_from_static(),
            economy: EconomyCfg::load_from_static(),
        }
    }

    /// Parse each table from its own JSON document.
    ///
    /// # Errors
    ///
    /// Returns the first table that fails to parse or validate.
    pub fn from_json_parts(
        synergies: &str,
        difficulty: &str,
        economy: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            synergies: SynergyTable::from_json(synergies)?,
            difficulty: DifficultyTable::from_json(difficulty)?,
            economy: EconomyCfg::from_json(economy)?,
        })
    }

    /// # Errors
    ///
    /// Returns the first table invariant that does not hold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.synergies.validate()?;
        self.difficulty.validate()?;
        self.economy.validate()?;
        Ok(())
    }

    /// Hash of every table; saves record it so rule changes can be detected.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write_u64(self.synergies.fingerprint());
        hasher.write(&serde_json::to_vec(&self.difficulty).unwrap_or_default());
        hasher.write(&serde_json::to_vec(&self.economy).unwrap_or_default());
        hasher.finish()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::load_from_static()
    }
}

/// Shared copy of the embedded configuration.
#[must_use]
pub fn default_config() -> &'static EngineConfig {
    static CONFIG: OnceLock<EngineConfig> = OnceLock::new();
    CONFIG.get_or_init(EngineConfig::load_from_static)
}
