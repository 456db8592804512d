use super::{SprayInputs, SprayThresholds, VetoRule};

/// Strong wind carries spray off target
pub struct WindDriftRule;

impl VetoRule for WindDriftRule {
    fn id(&self) -> &'static str {
        "wind_drift"
    }

    fn name(&self) -> &'static str {
        "Spray Drift"
    }

    fn check(&self, inputs: &SprayInputs, thresholds: &SprayThresholds) -> Option<String> {
        let wind = inputs.current.wind_speed_kmh;
        if wind > thresholds.max_wind_speed_kmh {
            Some(format!(
                "High wind speed ({:.1} km/h). Risk of spray drift.",
                wind
            ))
        } else {
            None
        }
    }
}
