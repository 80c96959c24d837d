//! Pairwise history between acts that feeds back into bill chemistry.
//!
//! The ledger keeps exactly one [`Relationship`] per unordered pair of acts
//! that has ever interacted. Records are accretive: affinity is adjusted and
//! history appended, never overwritten. Only a new game clears it.
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{
    AFFINITY_MAX, AFFINITY_MIN, BAD_BLOOD_MULT, BAD_BLOOD_THRESHOLD, CHEMISTRY_MULT,
    CHEMISTRY_THRESHOLD, HARMONY_MULT, HARMONY_THRESHOLD, LEDGER_FAILURE_DELTA,
    LEDGER_SUCCESS_DELTA, LOG_TARGET_LEDGER, RIVALS_MULT, RIVALS_THRESHOLD,
};
use crate::numbers::{clamp_score, usize_to_f64};

/// Order-independent key for a pair of acts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    /// Build the canonical key; `PairKey::new(a, b) == PairKey::new(b, a)`.
    #[must_use]
    pub fn new(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    #[must_use]
    pub fn first(&self) -> &str {
        &self.first
    }

    #[must_use]
    pub fn second(&self) -> &str {
        &self.second
    }

    #[must_use]
    pub fn contains(&self, act_id: &str) -> bool {
        self.first == act_id || self.second == act_id
    }

    /// The member of the pair that is not `act_id`.
    #[must_use]
    pub fn other(&self, act_id: &str) -> Option<&str> {
        if self.first == act_id {
            Some(&self.second)
        } else if self.second == act_id {
            Some(&self.first)
        } else {
            None
        }
    }

    fn is_self_pair(&self) -> bool {
        self.first == self.second
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.first, self.second)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipEventKind {
    ShowTogether,
    Conflict,
    Collaboration,
    Drama,
}

/// One entry in a pair's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEvent {
    pub kind: RelationshipEventKind,
    pub description: String,
    pub impact: f64,
    pub round: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub pair: PairKey,
    pub affinity: f64,
    #[serde(default)]
    pub history: Vec<RelationshipEvent>,
}

/// A pending ledger adjustment produced by show resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipUpdate {
    pub pair: PairKey,
    pub delta: f64,
    pub kind: RelationshipEventKind,
    pub description: String,
}

/// Named modifier derived from an affinity threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipSynergy {
    pub name: String,
    pub multiplier: f64,
    pub description: String,
}

impl RelationshipSynergy {
    fn new(name: &str, multiplier: f64, description: &str) -> Self {
        Self {
            name: name.to_string(),
            multiplier,
            description: description.to_string(),
        }
    }
}

/// Accretive map of pair relationships owned by one game session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "LedgerSnapshot", into = "LedgerSnapshot")]
pub struct RelationshipLedger {
    pairs: BTreeMap<PairKey, Relationship>,
}

#[derive(Serialize, Deserialize)]
struct LedgerSnapshot {
    #[serde(default)]
    relationships: Vec<Relationship>,
}

impl From<LedgerSnapshot> for RelationshipLedger {
    /// Re-canonicalize loaded records: keys are rebuilt, affinity clamped,
    /// self-pairs dropped and duplicate pairs merged in load order.
    fn from(snapshot: LedgerSnapshot) -> Self {
        let mut pairs: BTreeMap<PairKey, Relationship> = BTreeMap::new();
        for rel in snapshot.relationships {
            let pair = PairKey::new(rel.pair.first(), rel.pair.second());
            if pair.is_self_pair() {
                warn!(target: LOG_TARGET_LEDGER, "dropping saved self-pair {pair}");
                continue;
            }
            let affinity = clamp_score(rel.affinity, AFFINITY_MIN, AFFINITY_MAX);
            if let Some(existing) = pairs.get_mut(&pair) {
                warn!(target: LOG_TARGET_LEDGER, "merging duplicate saved pair {pair}");
                existing.affinity = affinity;
                existing.history.extend(rel.history);
                existing.history.sort_by_key(|event| event.round);
            } else {
                pairs.insert(
                    pair.clone(),
                    Relationship {
                        pair,
                        affinity,
                        history: rel.history,
                    },
                );
            }
        }
        Self { pairs }
    }
}

impl From<RelationshipLedger> for LedgerSnapshot {
    fn from(ledger: RelationshipLedger) -> Self {
        Self {
            relationships: ledger.pairs.into_values().collect(),
        }
    }
}

impl RelationshipLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Affinity between two acts; 0 for pairs that never interacted.
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> f64 {
        self.pairs
            .get(&PairKey::new(a, b))
            .map_or(0.0, |rel| rel.affinity)
    }

    #[must_use]
    pub fn relationship(&self, a: &str, b: &str) -> Option<&Relationship> {
        self.pairs.get(&PairKey::new(a, b))
    }

    /// Event history for a pair in the order events were recorded.
    #[must_use]
    pub fn history(&self, a: &str, b: &str) -> &[RelationshipEvent] {
        self.relationship(a, b)
            .map(|rel| rel.history.as_slice())
            .unwrap_or_default()
    }

    /// Adjust a pair's affinity and append the event to its history.
    ///
    /// Returns the new affinity, or `None` when `a` and `b` name the same act.
    pub fn update(
        &mut self,
        a: &str,
        b: &str,
        delta: f64,
        kind: RelationshipEventKind,
        description: impl Into<String>,
        round: u32,
    ) -> Option<f64> {
        let pair = PairKey::new(a, b);
        if pair.is_self_pair() {
            debug!(target: LOG_TARGET_LEDGER, "ignoring self-pair update for {a}");
            return None;
        }
        let rel = self
            .pairs
            .entry(pair.clone())
            .or_insert_with(|| Relationship {
                pair,
                affinity: 0.0,
                history: Vec::new(),
            });
        rel.affinity = clamp_score(rel.affinity + delta, AFFINITY_MIN, AFFINITY_MAX);
        rel.history.push(RelationshipEvent {
            kind,
            description: description.into(),
            impact: delta,
            round,
        });
        debug!(
            target: LOG_TARGET_LEDGER,
            "{} {kind:?} {delta:+.1} -> {:.1} (round {round})",
            rel.pair,
            rel.affinity
        );
        Some(rel.affinity)
    }

    /// Every act `act_id` has a record with, sorted by the other act's id.
    #[must_use]
    pub fn relationships_of(&self, act_id: &str) -> Vec<(String, f64)> {
        let mut partners: Vec<(String, f64)> = self
            .pairs
            .values()
            .filter_map(|rel| {
                rel.pair
                    .other(act_id)
                    .map(|other| (other.to_string(), rel.affinity))
            })
            .collect();
        partners.sort_by(|a, b| a.0.cmp(&b.0));
        partners
    }

    /// Show-together adjustments for every unordered pair in the booked set.
    #[must_use]
    pub fn plan_show_updates<S: AsRef<str>>(act_ids: &[S], success: bool) -> Vec<RelationshipUpdate> {
        let (delta, description) = if success {
            (LEDGER_SUCCESS_DELTA, "Played a successful show together")
        } else {
            (LEDGER_FAILURE_DELTA, "Shared a disappointing bill")
        };
        unordered_pairs(act_ids)
            .into_iter()
            .map(|pair| RelationshipUpdate {
                pair,
                delta,
                kind: RelationshipEventKind::ShowTogether,
                description: description.to_string(),
            })
            .collect()
    }

    /// Apply the fixed success/failure delta to every pair in the booked set.
    pub fn batch_update_from_show<S: AsRef<str>>(&mut self, act_ids: &[S], success: bool, round: u32) {
        let updates = Self::plan_show_updates(act_ids, success);
        self.apply_updates(&updates, round);
    }

    /// Apply pending updates, typically the ones carried by a show result.
    pub fn apply_updates(&mut self, updates: &[RelationshipUpdate], round: u32) {
        for update in updates {
            if self
                .update(
                    update.pair.first(),
                    update.pair.second(),
                    update.delta,
                    update.kind,
                    update.description.clone(),
                    round,
                )
                .is_none()
            {
                debug!(target: LOG_TARGET_LEDGER, "skipped pending update for {}", update.pair);
            }
        }
    }

    /// Threshold modifiers currently in effect between two acts.
    #[must_use]
    pub fn synergy_for(&self, a: &str, b: &str) -> Vec<RelationshipSynergy> {
        let affinity = self.get(a, b);
        let mut out = Vec::new();
        if affinity > HARMONY_THRESHOLD {
            out.push(RelationshipSynergy::new(
                "Perfect Harmony",
                HARMONY_MULT,
                "These acts feed off each other on stage",
            ));
        }
        if affinity > CHEMISTRY_THRESHOLD {
            out.push(RelationshipSynergy::new(
                "Good Chemistry",
                CHEMISTRY_MULT,
                "A history of strong shows together",
            ));
        }
        if affinity < RIVALS_THRESHOLD {
            out.push(RelationshipSynergy::new(
                "Bitter Rivals",
                RIVALS_MULT,
                "Drama sells tickets",
            ));
        }
        if affinity < BAD_BLOOD_THRESHOLD {
            out.push(RelationshipSynergy::new(
                "Bad Blood",
                BAD_BLOOD_MULT,
                "Tension between these acts keeps fans away",
            ));
        }
        out
    }

    /// Mean affinity across every unordered pair in the set; 0 below two acts.
    #[must_use]
    pub fn average_affinity<S: AsRef<str>>(&self, act_ids: &[S]) -> f64 {
        let pairs = unordered_pairs(act_ids);
        if pairs.is_empty() {
            return 0.0;
        }
        let total: f64 = pairs
            .iter()
            .map(|pair| self.get(pair.first(), pair.second()))
            .sum();
        total / usize_to_f64(pairs.len())
    }

    /// Clear everything for a new game.
    pub fn reset(&mut self) {
        info!(target: LOG_TARGET_LEDGER, "clearing {} relationships", self.pairs.len());
        self.pairs.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.pairs.values()
    }
}

/// Canonical unordered pairs over a booked set, with duplicate ids collapsed.
pub(crate) fn unordered_pairs<S: AsRef<str>>(act_ids: &[S]) -> Vec<PairKey> {
    let mut ids: Vec<&str> = act_ids.iter().map(AsRef::as_ref).collect();
    ids.sort_unstable();
    ids.dedup();
    let mut pairs = Vec::with_capacity(ids.len() * ids.len().saturating_sub(1) / 2);
    for (idx, a) in ids.iter().enumerate() {
        for b in &ids[idx + 1..] {
            pairs.push(PairKey::new(a, b));
        }
    }
    pairs
}
