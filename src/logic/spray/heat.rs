use super::{SprayInputs, SprayThresholds, VetoRule};

/// Fungicide applied in high heat can scorch foliage
pub struct PhytotoxicityRule;

impl VetoRule for PhytotoxicityRule {
    fn id(&self) -> &'static str {
        "phytotoxicity"
    }

    fn name(&self) -> &'static str {
        "Heat Phytotoxicity"
    }

    fn check(&self, inputs: &SprayInputs, thresholds: &SprayThresholds) -> Option<String> {
        let temp = inputs.current.temp_celsius;
        if temp > thresholds.max_temp_celsius {
            Some(format!(
                "Temperature is too high ({:.1}°C). Risk of phytotoxicity.",
                temp
            ))
        } else {
            None
        }
    }
}
