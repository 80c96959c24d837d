//! Venues and the traits synergy rules attach to.
use serde::{Deserialize, Serialize};

/// Broad category of a venue trait; drives valuation weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TraitKind {
    #[default]
    Atmosphere,
    Technical,
    Social,
    Legendary,
}

/// A venue trait with a stable identifier such as `GRIMY_FLOORS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueTrait {
    pub id: String,
    #[serde(default)]
    pub kind: TraitKind,
}

impl VenueTrait {
    #[must_use]
    pub fn new(id: impl Into<String>, kind: TraitKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// Purchased improvement; only its cost matters to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueUpgrade {
    pub name: String,
    #[serde(default)]
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub capacity: u32,
    #[serde(default)]
    pub acoustics: f64,
    #[serde(default)]
    pub authenticity: f64,
    #[serde(default)]
    pub atmosphere: f64,
    #[serde(default)]
    pub traits: Vec<VenueTrait>,
    #[serde(default)]
    pub upgrades: Vec<VenueUpgrade>,
}

impl Venue {
    /// Create a venue with neutral (50) ratings and no traits.
    #[must_use]
    pub fn new(id: impl Into<String>, capacity: u32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            capacity,
            acoustics: 50.0,
            authenticity: 50.0,
            atmosphere: 50.0,
            traits: Vec::new(),
            upgrades: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_ratings(mut self, acoustics: f64, authenticity: f64, atmosphere: f64) -> Self {
        self.acoustics = acoustics;
        self.authenticity = authenticity;
        self.atmosphere = atmosphere;
        self
    }

    #[must_use]
    pub fn with_trait(mut self, id: impl Into<String>, kind: TraitKind) -> Self {
        self.traits.push(VenueTrait::new(id, kind));
        self
    }

    #[must_use]
    pub fn with_upgrade(mut self, name: impl Into<String>, cost: f64) -> Self {
        self.upgrades.push(VenueUpgrade {
            name: name.into(),
            cost,
        });
        self
    }

    #[must_use]
    pub fn has_trait(&self, trait_id: &str) -> bool {
        self.traits.iter().any(|t| t.id == trait_id)
    }
}
