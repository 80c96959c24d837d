//! Ticket pricing, projected show economics, and forecast reconciliation.
//!
//! Projections share the difficulty multiplier tables with per-show
//! resolution so balance tooling and live play stay consistent.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{SHOW_SUCCESS_FILL, SHOW_SUCCESS_FILL_CAP};
use crate::difficulty::{DifficultyTable, DifficultyTier, ScaleAxis};
use crate::numbers::{round_f64_to_i64, round_f64_to_u32_capped};
use crate::venue::Venue;

const DEFAULT_ECONOMY_DATA: &str = include_str!("../assets/data/economy.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketCfg {
    #[serde(default = "TicketCfg::default_base_price")]
    pub base_price: f64,
    #[serde(default = "TicketCfg::default_min_price")]
    pub min_price: f64,
    #[serde(default = "TicketCfg::default_max_price")]
    pub max_price: f64,
}

impl TicketCfg {
    const fn default_base_price() -> f64 {
        15.0
    }

    const fn default_min_price() -> f64 {
        5.0
    }

    const fn default_max_price() -> f64 {
        60.0
    }
}

impl Default for TicketCfg {
    fn default() -> Self {
        Self {
            base_price: Self::default_base_price(),
            min_price: Self::default_min_price(),
            max_price: Self::default_max_price(),
        }
    }
}

/// Baseline figures for the balance projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionCfg {
    #[serde(default = "ProjectionCfg::default_venue_rent")]
    pub venue_rent: f64,
    #[serde(default = "ProjectionCfg::default_act_fee")]
    pub act_fee: f64,
    #[serde(default = "ProjectionCfg::default_acts_per_show")]
    pub acts_per_show: u32,
    #[serde(default = "ProjectionCfg::default_average_capacity")]
    pub average_capacity: u32,
    #[serde(default = "ProjectionCfg::default_assumed_fill")]
    pub assumed_fill: f64,
}

impl ProjectionCfg {
    const fn default_venue_rent() -> f64 {
        200.0
    }

    const fn default_act_fee() -> f64 {
        150.0
    }

    const fn default_acts_per_show() -> u32 {
        3
    }

    const fn default_average_capacity() -> u32 {
        250
    }

    const fn default_assumed_fill() -> f64 {
        0.7
    }
}

impl Default for ProjectionCfg {
    fn default() -> Self {
        Self {
            venue_rent: Self::default_venue_rent(),
            act_fee: Self::default_act_fee(),
            acts_per_show: Self::default_acts_per_show(),
            average_capacity: Self::default_average_capacity(),
            assumed_fill: Self::default_assumed_fill(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EconomyCfgError {
    #[error("ticket price bounds invalid (min {min:.2} > max {max:.2})")]
    PriceBounds { min: f64, max: f64 },
    #[error("{field} must be at least {min:.2} (got {value:.2})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be a finite number (got {value})")]
    NonFinite { field: &'static str, value: f64 },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyCfg {
    #[serde(default)]
    pub ticket: TicketCfg,
    #[serde(default = "EconomyCfg::default_bar_spend")]
    pub bar_spend_per_head: f64,
    #[serde(default)]
    pub projection: ProjectionCfg,
}

impl EconomyCfg {
    const fn default_bar_spend() -> f64 {
        5.0
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or values are out of range.
    pub fn from_json(json: &str) -> Result<Self, crate::config::ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_ECONOMY_DATA).unwrap_or_else(|err| {
            log::warn!(
                target: crate::constants::LOG_TARGET_CONFIG,
                "embedded economy config rejected ({err}); using built-in defaults"
            );
            Self {
                ticket: TicketCfg::default(),
                bar_spend_per_head: Self::default_bar_spend(),
                projection: ProjectionCfg::default(),
            }
        })
    }

    /// # Errors
    ///
    /// Returns the first out-of-range value.
    pub fn validate(&self) -> Result<(), EconomyCfgError> {
        let finite = [
            ("ticket.base_price", self.ticket.base_price),
            ("ticket.min_price", self.ticket.min_price),
            ("ticket.max_price", self.ticket.max_price),
            ("bar_spend_per_head", self.bar_spend_per_head),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(EconomyCfgError::NonFinite { field, value });
            }
        }
        if self.ticket.min_price > self.ticket.max_price {
            return Err(EconomyCfgError::PriceBounds {
                min: self.ticket.min_price,
                max: self.ticket.max_price,
            });
        }
        let non_negative = [
            ("ticket.min_price", self.ticket.min_price),
            ("ticket.base_price", self.ticket.base_price),
            ("bar_spend_per_head", self.bar_spend_per_head),
            ("projection.venue_rent", self.projection.venue_rent),
            ("projection.act_fee", self.projection.act_fee),
        ];
        for (field, value) in non_negative {
            if value.is_nan() || value < 0.0 {
                return Err(EconomyCfgError::MinViolation {
                    field,
                    min: 0.0,
                    value,
                });
            }
        }
        let fill = self.projection.assumed_fill;
        if !(0.0..=1.0).contains(&fill) {
            return Err(EconomyCfgError::RangeViolation {
                field: "projection.assumed_fill",
                min: 0.0,
                max: 1.0,
                value: fill,
            });
        }
        Ok(())
    }

    /// `clamp(base × (1 + round/100) / sqrt(expectation), min, max)`.
    #[must_use]
    pub fn optimal_ticket_price(&self, tiers: &DifficultyTable, round: u32) -> f64 {
        let expectation = tiers.tier_for(round).multipliers.expectation;
        let raw = self.ticket.base_price * (1.0 + f64::from(round) / 100.0) / expectation.sqrt();
        raw.clamp(self.ticket.min_price, self.ticket.max_price)
    }

    /// Balance-testing projection of an average show at `round`.
    #[must_use]
    pub fn projected_economics(&self, tiers: &DifficultyTable, round: u32) -> EconomicsProjection {
        let band = tiers.tier_for(round);
        let cfg = &self.projection;
        let venue_rent = tiers.scale(cfg.venue_rent, round, ScaleAxis::Cost);
        let act_fees = tiers.scale(
            cfg.act_fee * f64::from(cfg.acts_per_show),
            round,
            ScaleAxis::Cost,
        );
        let total_costs = venue_rent + act_fees;

        let attendance = round_f64_to_u32_capped(
            f64::from(cfg.average_capacity) * cfg.assumed_fill,
            cfg.average_capacity,
        );
        let ticket_price = self.optimal_ticket_price(tiers, round);
        let ticket_revenue = f64::from(attendance) * ticket_price;
        let bar_revenue = f64::from(attendance) * self.bar_spend_per_head;
        let total_revenue = ticket_revenue + bar_revenue;
        let profit = total_revenue - total_costs;
        let profit_margin = if total_revenue > 0.0 {
            profit / total_revenue
        } else {
            0.0
        };

        EconomicsProjection {
            round,
            tier: band.tier,
            cost_multiplier: band.multipliers.cost,
            venue_rent,
            act_fees,
            total_costs,
            attendance,
            ticket_price,
            ticket_revenue,
            bar_revenue,
            total_revenue,
            profit,
            profit_margin,
        }
    }

    /// Pre-show expectation for a specific venue at `round`.
    #[must_use]
    pub fn forecast_show(&self, tiers: &DifficultyTable, venue: &Venue, round: u32) -> ShowForecast {
        let attendance = round_f64_to_u32_capped(
            f64::from(venue.capacity) * self.projection.assumed_fill,
            venue.capacity,
        );
        let ticket_price = self.optimal_ticket_price(tiers, round);
        let revenue = f64::from(attendance) * (ticket_price + self.bar_spend_per_head);
        ShowForecast {
            round,
            attendance,
            ticket_price,
            revenue: round_f64_to_i64(revenue),
        }
    }
}

impl Default for EconomyCfg {
    fn default() -> Self {
        Self::load_from_static()
    }
}

/// Minimum fill ratio for a show to count as a success at `round`.
#[must_use]
pub fn success_threshold(tiers: &DifficultyTable, round: u32) -> f64 {
    let expectation = tiers.tier_for(round).multipliers.expectation;
    (SHOW_SUCCESS_FILL * expectation).min(SHOW_SUCCESS_FILL_CAP)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicsProjection {
    pub round: u32,
    pub tier: DifficultyTier,
    pub cost_multiplier: f64,
    pub venue_rent: f64,
    pub act_fees: f64,
    pub total_costs: f64,
    pub attendance: u32,
    pub ticket_price: f64,
    pub ticket_revenue: f64,
    pub bar_revenue: f64,
    pub total_revenue: f64,
    pub profit: f64,
    pub profit_margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowForecast {
    pub round: u32,
    pub attendance: u32,
    pub ticket_price: f64,
    pub revenue: i64,
}

/// Actual minus forecast, after a show resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastVariance {
    pub attendance_delta: i64,
    pub revenue_delta: i64,
}

impl ForecastVariance {
    #[must_use]
    pub const fn beat_forecast(&self) -> bool {
        self.attendance_delta >= 0 && self.revenue_delta >= 0
    }
}

/// Compare a resolved show's attendance and revenue with its forecast.
#[must_use]
pub fn reconcile(forecast: &ShowForecast, attendance: u32, revenue: u64) -> ForecastVariance {
    let revenue = i64::try_from(revenue).unwrap_or(i64::MAX);
    ForecastVariance {
        attendance_delta: i64::from(attendance) - i64::from(forecast.attendance),
        revenue_delta: revenue.saturating_sub(forecast.revenue),
    }
}
