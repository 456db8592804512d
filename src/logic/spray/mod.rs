pub mod engine;
pub mod heat;
pub mod rain_washoff;
pub mod risk_threshold;
pub mod wind_drift;

pub use engine::SprayDecisionEngine;

use crate::models::{CurrentConditions, ForecastSummary};
use serde::{Deserialize, Serialize};

/// Everything a veto rule may look at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SprayInputs {
    /// Risk score (0-100) of the disease driving the decision
    pub disease_risk: u8,
    pub current: CurrentConditions,
    pub forecast: ForecastSummary,
}

impl SprayInputs {
    pub fn new(disease_risk: u8, current: CurrentConditions, forecast: ForecastSummary) -> Self {
        Self {
            disease_risk,
            current,
            forecast,
        }
    }
}

/// Limits the veto rules compare against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SprayThresholds {
    /// Spraying is only worthwhile at or above this risk
    pub disease_risk: u8,
    pub max_wind_speed_kmh: f64,
    pub max_temp_celsius: f64,
    /// Rain starting within this many hours can wash product off
    pub rain_forecast_hours: f64,
    pub rain_chance_percent: u8,
}

impl Default for SprayThresholds {
    fn default() -> Self {
        Self {
            disease_risk: 70,
            max_wind_speed_kmh: 15.0,
            max_temp_celsius: 30.0,
            rain_forecast_hours: 6.0,
            rain_chance_percent: 40,
        }
    }
}

/// A veto rule blocks spraying when its condition holds
pub trait VetoRule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Return the reason to hold off spraying, or `None` if the rule passes
    fn check(&self, inputs: &SprayInputs, thresholds: &SprayThresholds) -> Option<String>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// High risk, calm, mild, dry: every rule passes
    pub fn favorable() -> SprayInputs {
        SprayInputs::new(
            85,
            CurrentConditions::new(22.0, 10.0),
            ForecastSummary::new(12.0, 10),
        )
    }
}
