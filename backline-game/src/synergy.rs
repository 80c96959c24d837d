//! Venue-synergy matching between venue traits and act tags.
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::hash::Hasher;
use thiserror::Error;
use twox_hash::XxHash64;

use crate::act::Act;
use crate::constants::{
    LOG_TARGET_SYNERGY, VALUE_ACOUSTICS_WEIGHT, VALUE_ATMOSPHERE_WEIGHT, VALUE_AUTHENTICITY_WEIGHT,
    VALUE_CAPACITY_WEIGHT, VALUE_LEGENDARY_TRAIT, VALUE_OTHER_TRAIT, VALUE_SOCIAL_TRAIT,
    VALUE_TECHNICAL_TRAIT, VALUE_UPGRADE_RATIO,
};
use crate::numbers::round_f64_to_i64;
use crate::venue::{TraitKind, Venue};

const DEFAULT_SYNERGY_DATA: &str = include_str!("../assets/data/synergies.json");

/// Effects granted when a rule fires; absent fields are neutral.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynergyEffects {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance_mult: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_mult: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reputation_bonus: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan_conversion_mult: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atmosphere_bonus: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyRule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub venue_trait: String,
    /// Act-side requirement; rules without one fire on the venue trait alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub act_tag: Option<String>,
    #[serde(default)]
    pub effects: SynergyEffects,
}

impl SynergyRule {
    fn satisfied_by(&self, acts: &[Act]) -> bool {
        self.act_tag
            .as_deref()
            .is_none_or(|tag| acts.iter().any(|act| act.matches_tag(tag)))
    }
}

/// Presentation record for a rule that fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiredSynergy {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl From<&SynergyRule> for FiredSynergy {
    fn from(rule: &SynergyRule) -> Self {
        Self {
            id: rule.id.clone(),
            name: rule.name.clone(),
            description: rule.description.clone(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SynergyTableError {
    #[error("duplicate synergy rule id {0}")]
    DuplicateId(String),
    #[error("synergy rule {0} has no venue trait")]
    MissingVenueTrait(String),
    #[error("synergy rule {0} has an empty act tag")]
    EmptyActTag(String),
    #[error("synergy rule {id} has non-positive {field} {value}")]
    Multiplier {
        id: String,
        field: &'static str,
        value: f64,
    },
}

/// Static rule table, loaded once and never mutated at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyTable {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub rules: Vec<SynergyRule>,
}

impl SynergyTable {
    /// Parse and validate a rule table from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or a rule is malformed.
    pub fn from_json(json: &str) -> Result<Self, crate::config::ConfigError> {
        let table: Self = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_SYNERGY_DATA).unwrap_or_else(|err| {
            log::warn!(
                target: crate::constants::LOG_TARGET_CONFIG,
                "embedded synergy table rejected ({err}); running without synergies"
            );
            Self::empty()
        })
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            version: 0,
            rules: Vec::new(),
        }
    }

    /// # Errors
    ///
    /// Returns the first malformed rule found.
    pub fn validate(&self) -> Result<(), SynergyTableError> {
        let mut seen = BTreeSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(SynergyTableError::DuplicateId(rule.id.clone()));
            }
            if rule.venue_trait.trim().is_empty() {
                return Err(SynergyTableError::MissingVenueTrait(rule.id.clone()));
            }
            if rule.act_tag.as_deref().is_some_and(|tag| tag.trim().is_empty()) {
                return Err(SynergyTableError::EmptyActTag(rule.id.clone()));
            }
            let multipliers = [
                ("attendance_mult", rule.effects.attendance_mult),
                ("revenue_mult", rule.effects.revenue_mult),
                ("fan_conversion_mult", rule.effects.fan_conversion_mult),
            ];
            for (field, value) in multipliers {
                if let Some(value) = value
                    && (value.is_nan() || value <= 0.0)
                {
                    return Err(SynergyTableError::Multiplier {
                        id: rule.id.clone(),
                        field,
                        value,
                    });
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SynergyRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// Rules keyed to a venue trait, in table order.
    pub fn rules_for_trait<'a>(&'a self, trait_id: &str) -> impl Iterator<Item = &'a SynergyRule> {
        self.rules.iter().filter(move |rule| rule.venue_trait == trait_id)
    }

    /// Stable hash of the table contents, stored with saves to spot rule changes.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&canonical);
        hasher.finish()
    }
}

impl Default for SynergyTable {
    fn default() -> Self {
        Self::load_from_static()
    }
}

/// Every rule that fires for this venue and lineup.
///
/// Output follows venue-trait order then table order, so it does not depend
/// on how the acts are ordered. Each rule fires at most once.
#[must_use]
pub fn resolve<'t>(table: &'t SynergyTable, venue: &Venue, acts: &[Act]) -> Vec<&'t SynergyRule> {
    let mut fired_ids: BTreeSet<&str> = BTreeSet::new();
    let mut active = Vec::new();
    for venue_trait in &venue.traits {
        for rule in table.rules_for_trait(&venue_trait.id) {
            if fired_ids.contains(rule.id.as_str()) || !rule.satisfied_by(acts) {
                continue;
            }
            fired_ids.insert(rule.id.as_str());
            active.push(rule);
        }
    }
    debug!(
        target: LOG_TARGET_SYNERGY,
        "venue {} fired {} synergies: {:?}",
        venue.id,
        active.len(),
        active.iter().map(|r| r.id.as_str()).collect::<Vec<_>>()
    );
    active
}

/// Combined effect of a set of fired rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyTotals {
    pub attendance_mult: f64,
    pub revenue_mult: f64,
    pub fan_conversion_mult: f64,
    pub reputation_bonus: f64,
    pub atmosphere_bonus: f64,
}

impl Default for SynergyTotals {
    fn default() -> Self {
        Self {
            attendance_mult: 1.0,
            revenue_mult: 1.0,
            fan_conversion_mult: 1.0,
            reputation_bonus: 0.0,
            atmosphere_bonus: 0.0,
        }
    }
}

impl SynergyTotals {
    /// Multiplicative effects multiply, bonuses add.
    #[must_use]
    pub fn from_rules(rules: &[&SynergyRule]) -> Self {
        rules.iter().fold(Self::default(), |mut totals, rule| {
            let fx = &rule.effects;
            totals.attendance_mult *= fx.attendance_mult.unwrap_or(1.0);
            totals.revenue_mult *= fx.revenue_mult.unwrap_or(1.0);
            totals.fan_conversion_mult *= fx.fan_conversion_mult.unwrap_or(1.0);
            totals.reputation_bonus += fx.reputation_bonus.unwrap_or(0.0);
            totals.atmosphere_bonus += fx.atmosphere_bonus.unwrap_or(0.0);
            totals
        })
    }
}

/// Unrounded show figures that synergies adjust.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowProjection {
    pub attendance: f64,
    pub revenue: f64,
    pub reputation: f64,
    pub fan_conversion: f64,
    pub atmosphere: f64,
    #[serde(default)]
    pub fired: Vec<FiredSynergy>,
}

/// Fold fired rules into a projection.
#[must_use]
pub fn apply(base: ShowProjection, rules: &[&SynergyRule]) -> ShowProjection {
    let totals = SynergyTotals::from_rules(rules);
    let mut fired = base.fired;
    fired.extend(rules.iter().map(|rule| FiredSynergy::from(*rule)));
    ShowProjection {
        attendance: base.attendance * totals.attendance_mult,
        revenue: base.revenue * totals.revenue_mult,
        reputation: base.reputation + totals.reputation_bonus,
        fan_conversion: base.fan_conversion * totals.fan_conversion_mult,
        atmosphere: base.atmosphere + totals.atmosphere_bonus,
        fired,
    }
}

const fn trait_weight(kind: TraitKind) -> f64 {
    match kind {
        TraitKind::Legendary => VALUE_LEGENDARY_TRAIT,
        TraitKind::Technical => VALUE_TECHNICAL_TRAIT,
        TraitKind::Social => VALUE_SOCIAL_TRAIT,
        TraitKind::Atmosphere => VALUE_OTHER_TRAIT,
    }
}

/// Informational venue worth; never used during resolution.
#[must_use]
pub fn valuation(venue: &Venue) -> i64 {
    let traits: f64 = venue.traits.iter().map(|t| trait_weight(t.kind)).sum();
    let upgrades: f64 = venue.upgrades.iter().map(|u| u.cost).sum();
    round_f64_to_i64(
        VALUE_CAPACITY_WEIGHT * f64::from(venue.capacity)
            + VALUE_ACOUSTICS_WEIGHT * venue.acoustics
            + VALUE_AUTHENTICITY_WEIGHT * venue.authenticity
            + VALUE_ATMOSPHERE_WEIGHT * venue.atmosphere
            + traits
            + VALUE_UPGRADE_RATIO * upgrades,
    )
}
