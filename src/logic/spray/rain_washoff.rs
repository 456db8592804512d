use super::{SprayInputs, SprayThresholds, VetoRule};

/// Rain soon after application washes product off the leaves.
///
/// Fires only when rain is both close (within the window) and likely.
pub struct RainWashoffRule;

impl VetoRule for RainWashoffRule {
    fn id(&self) -> &'static str {
        "rain_washoff"
    }

    fn name(&self) -> &'static str {
        "Rain Wash-off"
    }

    fn check(&self, inputs: &SprayInputs, thresholds: &SprayThresholds) -> Option<String> {
        let forecast = &inputs.forecast;
        let rain_soon = forecast.rain_in_next_hours <= thresholds.rain_forecast_hours;
        let rain_likely = forecast.chance_of_rain_percent > thresholds.rain_chance_percent;

        if rain_soon && rain_likely {
            Some(format!(
                "Rain is forecast within {} hours ({}% chance). Product may wash off.",
                thresholds.rain_forecast_hours, forecast.chance_of_rain_percent
            ))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::favorable;
    use super::*;
    use crate::models::ForecastSummary;

    fn with_forecast(hours: f64, chance: u8) -> SprayInputs {
        let mut inputs = favorable();
        inputs.forecast = ForecastSummary::new(hours, chance);
        inputs
    }

    #[test]
    fn blocks_close_likely_rain() {
        let thresholds = SprayThresholds::default();
        let reason = RainWashoffRule
            .check(&with_forecast(6.0, 41), &thresholds)
            .unwrap();
        assert!(reason.contains("within 6 hours"));
        assert!(reason.contains("wash off"));
    }

    #[test]
    fn needs_both_conditions() {
        let thresholds = SprayThresholds::default();
        // Likely but later than the window
        assert!(RainWashoffRule
            .check(&with_forecast(6.5, 90), &thresholds)
            .is_none());
        // Close but exactly at the chance limit
        assert!(RainWashoffRule
            .check(&with_forecast(2.0, 40), &thresholds)
            .is_none());
    }
}
