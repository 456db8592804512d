use super::{SprayInputs, SprayThresholds, VetoRule};

/// Spraying below the infection risk threshold wastes product
pub struct RiskThresholdRule;

impl VetoRule for RiskThresholdRule {
    fn id(&self) -> &'static str {
        "risk_threshold"
    }

    fn name(&self) -> &'static str {
        "Disease Risk Threshold"
    }

    fn check(&self, inputs: &SprayInputs, thresholds: &SprayThresholds) -> Option<String> {
        if inputs.disease_risk < thresholds.disease_risk {
            Some(format!(
                "Disease risk ({}%) is below the {}% threshold.",
                inputs.disease_risk, thresholds.disease_risk
            ))
        } else {
            None
        }
    }
}
