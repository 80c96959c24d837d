//! Bill analysis: headliner selection and lineup dynamics.
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::act::Act;
use crate::constants::{
    APPEAL_ENERGY_FLOW_BONUS, APPEAL_ENERGY_SLACK, APPEAL_VARIETY_BONUS, CHEMISTRY_AFFINITY_DIVISOR,
    CHEMISTRY_ALL_DISTINCT, CHEMISTRY_MIXED, CHEMISTRY_SHARED_GENRE, CHEMISTRY_SINGLE_ACT,
    CHEMISTRY_SUBGENRE_BONUS, CHEMISTRY_SUBGENRE_CAP, DEFAULT_CURRENT_YEAR,
    DRAMA_AUTHENTICITY_CLASH, DRAMA_AUTHENTICITY_SPREAD, DRAMA_ENERGY_MARGIN,
    DRAMA_ENERGY_UPSTAGE, DRAMA_EXTRA_STAR, DRAMA_HIGH_POPULARITY, DRAMA_LIFESTYLE_CLASH,
    DRAMA_POOL, DRAMA_POPULARITY_CLASH, DRAMA_POPULARITY_WINDOW, HEADLINER_ENERGY_WEIGHT,
    HEADLINER_POPULARITY_WEIGHT, HEADLINER_SKILL_WEIGHT, HEADLINER_VETERAN_BONUS,
    HEADLINER_YEARS_CAP, HEADLINER_YEARS_WEIGHT, LOG_TARGET_BILL, PARTY_KEYWORDS, SCORE_MAX,
    SCORE_MIN, STRAIGHT_EDGE_KEYWORDS, VETERAN_KEYWORDS,
};
use crate::numbers::{clamp_score, usize_to_f64};
use crate::relationships::RelationshipLedger;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BillError {
    #[error("cannot analyze a bill with no booked acts")]
    EmptyLineup,
}

/// Inputs to analysis that do not come from the acts themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisContext {
    /// Calendar year used to derive years active from formation year.
    pub current_year: i32,
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self {
            current_year: DEFAULT_CURRENT_YEAR,
        }
    }
}

/// Lineup scores, each clamped to `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BillDynamics {
    pub chemistry_score: f64,
    pub drama_risk: f64,
    pub crowd_appeal: f64,
    pub scene_alignment: f64,
}

impl BillDynamics {
    fn clamped(self) -> Self {
        Self {
            chemistry_score: clamp_score(self.chemistry_score, SCORE_MIN, SCORE_MAX),
            drama_risk: clamp_score(self.drama_risk, SCORE_MIN, SCORE_MAX),
            crowd_appeal: clamp_score(self.crowd_appeal, SCORE_MIN, SCORE_MAX),
            scene_alignment: clamp_score(self.scene_alignment, SCORE_MIN, SCORE_MAX),
        }
    }
}

/// The lineup for one show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub headliner: String,
    pub openers: Vec<String>,
    pub dynamics: BillDynamics,
}

impl Bill {
    /// Act ids in performance order: openers first, headliner last.
    #[must_use]
    pub fn running_order(&self) -> Vec<&str> {
        self.openers
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.headliner.as_str()))
            .collect()
    }

    #[must_use]
    pub fn act_count(&self) -> usize {
        self.openers.len() + 1
    }
}

/// Analyze a lineup with the default context.
///
/// # Errors
///
/// Returns [`BillError::EmptyLineup`] when `acts` is empty.
pub fn analyze(acts: &[Act], ledger: &RelationshipLedger) -> Result<Bill, BillError> {
    analyze_with(acts, ledger, &AnalysisContext::default())
}

/// Pick a headliner and score the lineup.
///
/// # Errors
///
/// Returns [`BillError::EmptyLineup`] when `acts` is empty.
pub fn analyze_with(
    acts: &[Act],
    ledger: &RelationshipLedger,
    ctx: &AnalysisContext,
) -> Result<Bill, BillError> {
    let headliner_idx = select_headliner(acts, ctx).ok_or(BillError::EmptyLineup)?;
    let headliner = &acts[headliner_idx];

    if acts.len() == 1 {
        return Ok(Bill {
            headliner: headliner.id.clone(),
            openers: Vec::new(),
            dynamics: BillDynamics {
                chemistry_score: CHEMISTRY_SINGLE_ACT,
                drama_risk: 0.0,
                crowd_appeal: headliner.popularity,
                scene_alignment: headliner.authenticity,
            }
            .clamped(),
        });
    }

    let openers: Vec<&Act> = acts
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != headliner_idx)
        .map(|(_, act)| act)
        .collect();

    let ids: Vec<&str> = acts.iter().map(|a| a.id.as_str()).collect();
    let dynamics = BillDynamics {
        chemistry_score: chemistry(acts) + ledger.average_affinity(&ids) / CHEMISTRY_AFFINITY_DIVISOR,
        drama_risk: drama_risk(acts, headliner, &openers),
        crowd_appeal: crowd_appeal(acts, headliner, &openers),
        scene_alignment: mean(acts.iter().map(|a| a.authenticity)),
    }
    .clamped();

    debug!(
        target: LOG_TARGET_BILL,
        "headliner {} over {} openers: chemistry {:.1} drama {:.1} appeal {:.1} scene {:.1}",
        headliner.id,
        openers.len(),
        dynamics.chemistry_score,
        dynamics.drama_risk,
        dynamics.crowd_appeal,
        dynamics.scene_alignment
    );

    Ok(Bill {
        headliner: headliner.id.clone(),
        openers: openers.iter().map(|a| a.id.clone()).collect(),
        dynamics,
    })
}

/// Weighted score used to pick the headliner.
#[must_use]
pub fn headliner_score(act: &Act, ctx: &AnalysisContext) -> f64 {
    let years = f64::from(act.years_active(ctx.current_year));
    let veteran = if act.has_trait_keyword(&VETERAN_KEYWORDS) {
        HEADLINER_VETERAN_BONUS
    } else {
        0.0
    };
    HEADLINER_POPULARITY_WEIGHT * act.popularity
        + HEADLINER_ENERGY_WEIGHT * act.energy
        + HEADLINER_SKILL_WEIGHT * act.technical_skill
        + (HEADLINER_YEARS_WEIGHT * years).min(HEADLINER_YEARS_CAP)
        + veteran
}

/// Index of the highest-scoring act; the earliest act wins ties.
#[must_use]
pub fn select_headliner(acts: &[Act], ctx: &AnalysisContext) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, act) in acts.iter().enumerate() {
        let score = headliner_score(act, ctx);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}

fn distinct_genres(acts: &[Act]) -> usize {
    acts.iter()
        .map(|a| a.genre.to_lowercase())
        .collect::<BTreeSet<_>>()
        .len()
}

fn chemistry(acts: &[Act]) -> f64 {
    let genres = distinct_genres(acts);
    let base = if genres == 1 {
        CHEMISTRY_SHARED_GENRE
    } else if genres == acts.len() {
        CHEMISTRY_ALL_DISTINCT
    } else {
        CHEMISTRY_MIXED
    };

    let mut subgenre_counts: BTreeMap<String, usize> = BTreeMap::new();
    for act in acts {
        let own: BTreeSet<String> = act.subgenres.iter().map(|s| s.to_lowercase()).collect();
        for subgenre in own {
            *subgenre_counts.entry(subgenre).or_default() += 1;
        }
    }
    let duplicates: usize = subgenre_counts
        .values()
        .map(|count| count.saturating_sub(1))
        .sum();
    let bonus = (CHEMISTRY_SUBGENRE_BONUS * usize_to_f64(duplicates)).min(CHEMISTRY_SUBGENRE_CAP);
    base + bonus
}

fn drama_risk(acts: &[Act], headliner: &Act, openers: &[&Act]) -> f64 {
    let mut risk = 0.0;

    let stars = acts
        .iter()
        .filter(|a| a.popularity > DRAMA_HIGH_POPULARITY)
        .count();
    risk += DRAMA_EXTRA_STAR * usize_to_f64(stars.saturating_sub(1));

    // Penalties stack per opener.
    for opener in openers {
        if (opener.popularity - headliner.popularity).abs() <= DRAMA_POPULARITY_WINDOW {
            risk += DRAMA_POPULARITY_CLASH;
        }
        if opener.energy - headliner.energy > DRAMA_ENERGY_MARGIN {
            risk += DRAMA_ENERGY_UPSTAGE;
        }
    }

    let (min_auth, max_auth) = acts.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), a| {
        (lo.min(a.authenticity), hi.max(a.authenticity))
    });
    if max_auth - min_auth > DRAMA_AUTHENTICITY_SPREAD {
        risk += DRAMA_AUTHENTICITY_CLASH;
    }

    if has_lifestyle_clash(acts) {
        risk += DRAMA_LIFESTYLE_CLASH;
    }
    risk
}

/// A straight-edge act and a different party act on the same bill.
fn has_lifestyle_clash(acts: &[Act]) -> bool {
    let straight: Vec<usize> = acts
        .iter()
        .enumerate()
        .filter(|(_, a)| a.has_trait_keyword(&STRAIGHT_EDGE_KEYWORDS))
        .map(|(idx, _)| idx)
        .collect();
    if straight.is_empty() {
        return false;
    }
    acts.iter()
        .enumerate()
        .filter(|(_, a)| a.has_trait_keyword(&PARTY_KEYWORDS))
        .any(|(idx, _)| straight.iter().any(|s| *s != idx))
}

fn crowd_appeal(acts: &[Act], headliner: &Act, openers: &[&Act]) -> f64 {
    let mut appeal = mean(acts.iter().map(|a| a.popularity));

    let running: Vec<f64> = openers
        .iter()
        .map(|a| a.energy)
        .chain(std::iter::once(headliner.energy))
        .collect();
    let builds = running
        .windows(2)
        .all(|pair| pair[1] >= pair[0] - APPEAL_ENERGY_SLACK);
    if builds {
        appeal += APPEAL_ENERGY_FLOW_BONUS;
    }

    let genres = distinct_genres(acts);
    if genres > 1 && genres < acts.len() {
        appeal += APPEAL_VARIETY_BONUS;
    }
    appeal
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / usize_to_f64(count)
    }
}

fn alignment_factor(scene_alignment: f64) -> f64 {
    if scene_alignment > 80.0 {
        1.2
    } else if scene_alignment < 40.0 {
        0.8
    } else {
        1.0
    }
}

/// Attendance multiplier implied by the lineup dynamics.
#[must_use]
pub fn attendance_modifier(dynamics: &BillDynamics) -> f64 {
    let chemistry = 0.8 + 0.4 * dynamics.chemistry_score / 100.0;
    let appeal = 0.7 + 0.6 * dynamics.crowd_appeal / 100.0;
    chemistry * appeal * alignment_factor(dynamics.scene_alignment)
}

/// Reputation multiplier implied by the lineup dynamics.
#[must_use]
pub fn reputation_modifier(dynamics: &BillDynamics) -> f64 {
    let chemistry = 0.8 + 0.4 * dynamics.chemistry_score / 100.0;
    let scene = if dynamics.scene_alignment > 70.0 {
        1.3
    } else {
        1.0
    };
    chemistry * scene
}

/// Roll for an incident; the chance in percent is the bill's drama risk.
pub fn roll_drama<R>(dynamics: &BillDynamics, rng: &mut R) -> Option<&'static str>
where
    R: Rng + ?Sized,
{
    let roll: f64 = rng.gen_range(0.0..100.0);
    if roll >= dynamics.drama_risk {
        return None;
    }
    let idx = rng.gen_range(0..DRAMA_POOL.len());
    Some(DRAMA_POOL[idx])
}
