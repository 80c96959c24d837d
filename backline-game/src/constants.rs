//! Centralized balance and tuning constants for Backline show resolution.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that balance can only be adjusted via
//! code changes reviewed in version control. Table-shaped data (synergy
//! rules, difficulty tiers) lives in the JSON assets instead.

// Logging targets ----------------------------------------------------------
pub(crate) const LOG_TARGET_BILL: &str = "backline::bill";
pub(crate) const LOG_TARGET_SYNERGY: &str = "backline::synergy";
pub(crate) const LOG_TARGET_SHOW: &str = "backline::show";
pub(crate) const LOG_TARGET_LEDGER: &str = "backline::ledger";
pub(crate) const LOG_TARGET_CONFIG: &str = "backline::config";

// Score bounds -------------------------------------------------------------
pub(crate) const SCORE_MIN: f64 = 0.0;
pub(crate) const SCORE_MAX: f64 = 100.0;
pub(crate) const AFFINITY_MIN: f64 = -100.0;
pub(crate) const AFFINITY_MAX: f64 = 100.0;

// Headliner weighting ------------------------------------------------------
pub(crate) const HEADLINER_POPULARITY_WEIGHT: f64 = 2.0;
pub(crate) const HEADLINER_ENERGY_WEIGHT: f64 = 0.5;
pub(crate) const HEADLINER_SKILL_WEIGHT: f64 = 0.3;
pub(crate) const HEADLINER_YEARS_WEIGHT: f64 = 5.0;
pub(crate) const HEADLINER_YEARS_CAP: f64 = 50.0;
pub(crate) const HEADLINER_VETERAN_BONUS: f64 = 30.0;
pub(crate) const DEFAULT_CURRENT_YEAR: i32 = 2024;

// Chemistry ----------------------------------------------------------------
pub(crate) const CHEMISTRY_SINGLE_ACT: f64 = 100.0;
pub(crate) const CHEMISTRY_SHARED_GENRE: f64 = 100.0;
pub(crate) const CHEMISTRY_ALL_DISTINCT: f64 = 40.0;
pub(crate) const CHEMISTRY_MIXED: f64 = 70.0;
pub(crate) const CHEMISTRY_SUBGENRE_BONUS: f64 = 5.0;
pub(crate) const CHEMISTRY_SUBGENRE_CAP: f64 = 20.0;
pub(crate) const CHEMISTRY_AFFINITY_DIVISOR: f64 = 10.0;

// Drama --------------------------------------------------------------------
pub(crate) const DRAMA_HIGH_POPULARITY: f64 = 70.0;
pub(crate) const DRAMA_EXTRA_STAR: f64 = 15.0;
pub(crate) const DRAMA_POPULARITY_WINDOW: f64 = 10.0;
pub(crate) const DRAMA_POPULARITY_CLASH: f64 = 20.0;
pub(crate) const DRAMA_ENERGY_MARGIN: f64 = 20.0;
pub(crate) const DRAMA_ENERGY_UPSTAGE: f64 = 15.0;
pub(crate) const DRAMA_AUTHENTICITY_SPREAD: f64 = 50.0;
pub(crate) const DRAMA_AUTHENTICITY_CLASH: f64 = 25.0;
pub(crate) const DRAMA_LIFESTYLE_CLASH: f64 = 30.0;

// Crowd appeal -------------------------------------------------------------
pub(crate) const APPEAL_ENERGY_SLACK: f64 = 10.0;
pub(crate) const APPEAL_ENERGY_FLOW_BONUS: f64 = 20.0;
pub(crate) const APPEAL_VARIETY_BONUS: f64 = 10.0;

// Trait keywords -----------------------------------------------------------
pub(crate) const VETERAN_KEYWORDS: [&str; 2] = ["veteran", "legend"];
pub(crate) const STRAIGHT_EDGE_KEYWORDS: [&str; 2] = ["straight edge", "straight-edge"];
pub(crate) const PARTY_KEYWORDS: [&str; 2] = ["party", "wild"];

// Relationship ledger ------------------------------------------------------
pub(crate) const LEDGER_SUCCESS_DELTA: f64 = 10.0;
pub(crate) const LEDGER_FAILURE_DELTA: f64 = -5.0;
pub(crate) const LEDGER_DRAMA_DELTA: f64 = -10.0;
pub(crate) const HARMONY_THRESHOLD: f64 = 80.0;
pub(crate) const HARMONY_MULT: f64 = 1.5;
pub(crate) const CHEMISTRY_THRESHOLD: f64 = 50.0;
pub(crate) const CHEMISTRY_MULT: f64 = 1.2;
pub(crate) const RIVALS_THRESHOLD: f64 = -80.0;
pub(crate) const RIVALS_MULT: f64 = 1.3;
pub(crate) const BAD_BLOOD_THRESHOLD: f64 = -50.0;
pub(crate) const BAD_BLOOD_MULT: f64 = 0.8;

// Venue valuation ----------------------------------------------------------
pub(crate) const VALUE_CAPACITY_WEIGHT: f64 = 0.5;
pub(crate) const VALUE_ACOUSTICS_WEIGHT: f64 = 2.0;
pub(crate) const VALUE_AUTHENTICITY_WEIGHT: f64 = 1.5;
pub(crate) const VALUE_ATMOSPHERE_WEIGHT: f64 = 1.5;
pub(crate) const VALUE_LEGENDARY_TRAIT: f64 = 500.0;
pub(crate) const VALUE_TECHNICAL_TRAIT: f64 = 200.0;
pub(crate) const VALUE_SOCIAL_TRAIT: f64 = 150.0;
pub(crate) const VALUE_OTHER_TRAIT: f64 = 100.0;
pub(crate) const VALUE_UPGRADE_RATIO: f64 = 0.8;

// Show resolution ----------------------------------------------------------
pub(crate) const SHOW_BASE_FILL: f64 = 0.3;
pub(crate) const SHOW_APPEAL_FILL: f64 = 0.7;
pub(crate) const SHOW_REPUTATION_SWING: f64 = 20.0;
pub(crate) const SHOW_ATMOSPHERE_DIVISOR: f64 = 10.0;
pub(crate) const SHOW_VENUE_ATMOSPHERE_PIVOT: f64 = 50.0;
pub(crate) const SHOW_VENUE_ATMOSPHERE_DIVISOR: f64 = 25.0;
pub(crate) const SHOW_DRAMA_REPUTATION_COST: f64 = 5.0;
pub(crate) const SHOW_FAN_CONVERSION: f64 = 0.1;
pub(crate) const SHOW_DRAMA_FAN_LOSS: f64 = 0.02;
pub(crate) const SHOW_SUCCESS_FILL: f64 = 0.5;
pub(crate) const SHOW_SUCCESS_FILL_CAP: f64 = 0.95;

// Drama incidents ----------------------------------------------------------
pub(crate) const DRAMA_POOL: [&str; 8] = [
    "The headliner stormed off stage after a soundcheck argument.",
    "Two bands got into a shoving match over the green room.",
    "An opener played twenty minutes over and cut into the headliner's set.",
    "Someone trashed the merch table during the changeover.",
    "A guitarist called out the other band from the stage.",
    "The drummer vanished before the encore and never came back.",
    "A feud over shared backline gear delayed the show by an hour.",
    "The crowd split into factions and started a chant war.",
];

// RNG stream tags ----------------------------------------------------------
pub(crate) const RNG_STREAM_DRAMA: &[u8] = b"drama";
pub(crate) const RNG_STREAM_PREVIEW: &[u8] = b"preview";
