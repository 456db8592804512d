use super::{
    heat::PhytotoxicityRule, rain_washoff::RainWashoffRule, risk_threshold::RiskThresholdRule,
    wind_drift::WindDriftRule, SprayInputs, SprayThresholds, VetoRule,
};
use crate::models::{CurrentConditions, ForecastSummary, SprayWindowDecision};

const FAVORABLE_REASON: &str = "Disease risk is high and weather conditions are favorable.";

/// Ordered veto list; the first rule that objects decides the outcome
pub struct SprayDecisionEngine {
    rules: Vec<Box<dyn VetoRule>>,
    thresholds: SprayThresholds,
}

impl SprayDecisionEngine {
    pub fn new(thresholds: SprayThresholds) -> Self {
        // Order matters: later rules are never consulted once one fires
        let rules: Vec<Box<dyn VetoRule>> = vec![
            Box::new(RiskThresholdRule),
            Box::new(WindDriftRule),
            Box::new(PhytotoxicityRule),
            Box::new(RainWashoffRule),
        ];

        Self { rules, thresholds }
    }

    pub fn decide(
        &self,
        disease_risk: u8,
        current: CurrentConditions,
        forecast: ForecastSummary,
    ) -> SprayWindowDecision {
        self.evaluate(&SprayInputs::new(disease_risk, current, forecast))
    }

    pub fn evaluate(&self, inputs: &SprayInputs) -> SprayWindowDecision {
        for rule in &self.rules {
            if let Some(reason) = rule.check(inputs, &self.thresholds) {
                tracing::debug!(rule = rule.id(), %reason, "Spray vetoed");
                return SprayWindowDecision::do_not_spray(rule.id(), reason);
            }
        }

        SprayWindowDecision::spray_now(FAVORABLE_REASON)
    }

    pub fn list_rules(&self) -> Vec<(&'static str, &'static str)> {
        self.rules.iter().map(|r| (r.id(), r.name())).collect()
    }
}

impl Default for SprayDecisionEngine {
    fn default() -> Self {
        Self::new(SprayThresholds::default())
    }
}
