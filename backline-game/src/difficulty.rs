//! Round-based difficulty tiers and the multipliers they carry.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const DEFAULT_DIFFICULTY_DATA: &str = include_str!("../assets/data/difficulty.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
    Extreme,
    Endless,
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
            Self::Extreme => write!(f, "extreme"),
            Self::Endless => write!(f, "endless"),
        }
    }
}

/// Which multiplier a scaled amount uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleAxis {
    Cost,
    Expectation,
    Risk,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierMultipliers {
    pub cost: f64,
    pub expectation: f64,
    pub risk: f64,
}

impl TierMultipliers {
    #[must_use]
    pub const fn get(&self, axis: ScaleAxis) -> f64 {
        match axis {
            ScaleAxis::Cost => self.cost,
            ScaleAxis::Expectation => self.expectation,
            ScaleAxis::Risk => self.risk,
        }
    }
}

impl Default for TierMultipliers {
    fn default() -> Self {
        Self {
            cost: 1.0,
            expectation: 1.0,
            risk: 1.0,
        }
    }
}

/// A tier bound to an inclusive round range; `max_round: None` is unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierBand {
    pub tier: DifficultyTier,
    pub min_round: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_round: Option<u32>,
    pub multipliers: TierMultipliers,
}

impl TierBand {
    #[must_use]
    pub fn contains(&self, round: u32) -> bool {
        round >= self.min_round && self.max_round.is_none_or(|max| round <= max)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TierTableError {
    #[error("difficulty table has no tiers")]
    Empty,
    #[error("first tier must start at round 0 (starts at {0})")]
    FirstTierOffset(u32),
    #[error("tier {tier} range invalid (min {min} > max {max})")]
    InvertedRange {
        tier: DifficultyTier,
        min: u32,
        max: u32,
    },
    #[error("tier {tier} starts at {found}, expected {expected}")]
    Gap {
        tier: DifficultyTier,
        expected: u32,
        found: u32,
    },
    #[error("tier {0} is unbounded but is not the last tier")]
    UnboundedBeforeEnd(DifficultyTier),
    #[error("last tier {0} must be unbounded")]
    BoundedLastTier(DifficultyTier),
    #[error("tier {tier} has non-positive {axis:?} multiplier {value}")]
    Multiplier {
        tier: DifficultyTier,
        axis: ScaleAxis,
        value: f64,
    },
}

/// Ordered, contiguous tier ranges covering every round from 0 upward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTable {
    #[serde(default)]
    pub version: u32,
    pub tiers: Vec<TierBand>,
}

impl DifficultyTable {
    /// Parse and validate a table from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or the ranges are not
    /// contiguous and exhaustive.
    pub fn from_json(json: &str) -> Result<Self, crate::config::ConfigError> {
        let table: Self = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// The embedded default table.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_DIFFICULTY_DATA).unwrap_or_else(|err| {
            log::warn!(
                target: crate::constants::LOG_TARGET_CONFIG,
                "embedded difficulty table rejected ({err}); using flat single tier"
            );
            Self::flat()
        })
    }

    /// A single unbounded tier with neutral multipliers.
    #[must_use]
    pub fn flat() -> Self {
        Self {
            version: 0,
            tiers: vec![TierBand {
                tier: DifficultyTier::Easy,
                min_round: 0,
                max_round: None,
                multipliers: TierMultipliers::default(),
            }],
        }
    }

    /// Check that ranges are contiguous, exhaustive, and multipliers positive.
    ///
    /// # Errors
    ///
    /// Returns the first invariant violation found.
    pub fn validate(&self) -> Result<(), TierTableError> {
        let first = self.tiers.first().ok_or(TierTableError::Empty)?;
        if first.min_round != 0 {
            return Err(TierTableError::FirstTierOffset(first.min_round));
        }
        let last_idx = self.tiers.len() - 1;
        let mut expected = 0u32;
        for (idx, band) in self.tiers.iter().enumerate() {
            for axis in [ScaleAxis::Cost, ScaleAxis::Expectation, ScaleAxis::Risk] {
                let value = band.multipliers.get(axis);
                if value.is_nan() || value <= 0.0 {
                    return Err(TierTableError::Multiplier {
                        tier: band.tier,
                        axis,
                        value,
                    });
                }
            }
            if band.min_round != expected {
                return Err(TierTableError::Gap {
                    tier: band.tier,
                    expected,
                    found: band.min_round,
                });
            }
            match band.max_round {
                Some(max) if max < band.min_round => {
                    return Err(TierTableError::InvertedRange {
                        tier: band.tier,
                        min: band.min_round,
                        max,
                    });
                }
                Some(_) if idx == last_idx => {
                    return Err(TierTableError::BoundedLastTier(band.tier));
                }
                Some(max) => expected = max.saturating_add(1),
                None if idx != last_idx => {
                    return Err(TierTableError::UnboundedBeforeEnd(band.tier));
                }
                None => {}
            }
        }
        Ok(())
    }

    /// The band containing `round`, falling back to the last (unbounded) one.
    ///
    /// # Panics
    ///
    /// Panics if the table has no tiers; tables are validated on load.
    #[must_use]
    pub fn tier_for(&self, round: u32) -> &TierBand {
        self.tiers
            .iter()
            .find(|band| band.contains(round))
            .or_else(|| self.tiers.last())
            .expect("difficulty table validated non-empty")
    }

    #[must_use]
    pub fn multipliers(&self, round: u32) -> TierMultipliers {
        self.tier_for(round).multipliers
    }

    /// `base × multiplier[axis]` for the tier active at `round`.
    #[must_use]
    pub fn scale(&self, base: f64, round: u32, axis: ScaleAxis) -> f64 {
        base * self.tier_for(round).multipliers.get(axis)
    }
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self::load_from_static()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(tier: DifficultyTier, min: u32, max: Option<u32>) -> TierBand {
        TierBand {
            tier,
            min_round: min,
            max_round: max,
            multipliers: TierMultipliers::default(),
        }
    }

    #[test]
    fn embedded_table_is_valid() {
        let table = DifficultyTable::from_json(DEFAULT_DIFFICULTY_DATA).unwrap();
        assert_eq!(table.tiers.len(), 5);
        assert_eq!(table.tiers.last().unwrap().tier, DifficultyTier::Endless);
    }

    #[test]
    fn tier_lookup_uses_inclusive_ranges() {
        let table = DifficultyTable::load_from_static();
        assert_eq!(table.tier_for(0).tier, DifficultyTier::Easy);
        assert_eq!(table.tier_for(10).tier, DifficultyTier::Easy);
        assert_eq!(table.tier_for(11).tier, DifficultyTier::Medium);
        assert_eq!(table.tier_for(50).tier, DifficultyTier::Hard);
        assert_eq!(table.tier_for(100).tier, DifficultyTier::Extreme);
    }

    #[test]
    fn rounds_past_the_last_bound_are_endless() {
        let table = DifficultyTable::load_from_static();
        assert_eq!(table.tier_for(150).tier, DifficultyTier::Endless);
        assert_eq!(table.tier_for(u32::MAX).tier, DifficultyTier::Endless);
    }

    #[test]
    fn every_round_maps_to_exactly_one_tier() {
        let table = DifficultyTable::load_from_static();
        for round in 0..500 {
            let hits = table.tiers.iter().filter(|b| b.contains(round)).count();
            assert_eq!(hits, 1, "round {round}");
        }
    }

    #[test]
    fn scale_multiplies_by_axis() {
        let table = DifficultyTable::load_from_static();
        assert!((table.scale(100.0, 30, ScaleAxis::Cost) - 150.0).abs() < 1e-9);
        assert!((table.scale(100.0, 30, ScaleAxis::Expectation) - 135.0).abs() < 1e-9);
        assert!((table.scale(100.0, 30, ScaleAxis::Risk) - 125.0).abs() < 1e-9);
        assert!((table.scale(100.0, 3, ScaleAxis::Cost) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn validation_rejects_gaps_and_bounded_tail() {
        let gap = DifficultyTable {
            version: 1,
            tiers: vec![
                band(DifficultyTier::Easy, 0, Some(5)),
                band(DifficultyTier::Medium, 7, None),
            ],
        };
        assert_eq!(
            gap.validate(),
            Err(TierTableError::Gap {
                tier: DifficultyTier::Medium,
                expected: 6,
                found: 7
            })
        );

        let bounded = DifficultyTable {
            version: 1,
            tiers: vec![band(DifficultyTier::Easy, 0, Some(5))],
        };
        assert_eq!(
            bounded.validate(),
            Err(TierTableError::BoundedLastTier(DifficultyTier::Easy))
        );

        let offset = DifficultyTable {
            version: 1,
            tiers: vec![band(DifficultyTier::Easy, 3, None)],
        };
        assert_eq!(offset.validate(), Err(TierTableError::FirstTierOffset(3)));

        let early_open = DifficultyTable {
            version: 1,
            tiers: vec![
                band(DifficultyTier::Easy, 0, None),
                band(DifficultyTier::Hard, 1, None),
            ],
        };
        assert_eq!(
            early_open.validate(),
            Err(TierTableError::UnboundedBeforeEnd(DifficultyTier::Easy))
        );

        let empty = DifficultyTable {
            version: 1,
            tiers: Vec::new(),
        };
        assert_eq!(empty.validate(), Err(TierTableError::Empty));
    }

    #[test]
    fn validation_rejects_non_positive_multipliers() {
        let mut table = DifficultyTable::flat();
        table.tiers[0].multipliers.risk = 0.0;
        assert!(matches!(
            table.validate(),
            Err(TierTableError::Multiplier {
                axis: ScaleAxis::Risk,
                ..
            })
        ));
    }
}
