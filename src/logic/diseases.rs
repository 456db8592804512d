use crate::models::{
    Disease, DiseaseRiskAssessment, RiskScore, RiskStatus, WetnessWindowMetrics,
};

/// Second argument a disease model reads from the metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelInput {
    WetnessHours,
    AverageHumidity,
}

/// A disease model: `(avg temp during wetness °C, wetness hours or humidity %)`
pub type RiskModel = fn(f64, f64) -> RiskScore;

impl Disease {
    pub fn model(&self) -> RiskModel {
        match self {
            Disease::AppleScab => apple_scab,
            Disease::AlternariaBlotch => alternaria_blotch,
            Disease::MarssoninaBlotch => marssonina_blotch,
            Disease::PowderyMildew => powdery_mildew,
            Disease::CedarAppleRust => cedar_apple_rust,
            Disease::BlackRot => black_rot,
            Disease::BitterRot => bitter_rot,
        }
    }

    pub fn model_input(&self) -> ModelInput {
        match self {
            Disease::PowderyMildew => ModelInput::AverageHumidity,
            _ => ModelInput::WetnessHours,
        }
    }

    pub fn assess(&self, metrics: &WetnessWindowMetrics) -> DiseaseRiskAssessment {
        let second = match self.model_input() {
            ModelInput::WetnessHours => metrics.total_wetness_hours,
            ModelInput::AverageHumidity => metrics.overall_avg_humidity,
        };
        let score = (self.model())(metrics.avg_temp_during_wetness, second);
        DiseaseRiskAssessment::new(*self, score)
    }
}

/// Run every disease model over the same metrics, in `Disease::ALL` order
pub fn evaluate_all_diseases(metrics: &WetnessWindowMetrics) -> Vec<DiseaseRiskAssessment> {
    Disease::all()
        .iter()
        .map(|disease| {
            let assessment = disease.assess(metrics);
            tracing::debug!(
                disease = disease.key(),
                value = assessment.value,
                status = %assessment.status,
                "Disease risk evaluated"
            );
            assessment
        })
        .collect()
}

/// Minimum wetness duration for a full Apple Scab infection at `temp` (Mills table).
///
/// Single-degree bands match the exact temperature only.
pub fn apple_scab_required_hours(temp: f64) -> Option<f64> {
    if (18.0..=24.0).contains(&temp) {
        Some(9.0)
    } else if temp == 17.0 {
        Some(10.0)
    } else if temp == 16.0 {
        Some(11.0)
    } else if temp == 15.0 {
        Some(12.0)
    } else if (13.0..=14.0).contains(&temp) {
        Some(14.0)
    } else if temp == 12.0 {
        Some(15.0)
    } else if (10.0..=11.0).contains(&temp) {
        Some(20.0)
    } else {
        None
    }
}

pub fn apple_scab(temp: f64, wetness_hours: f64) -> RiskScore {
    if temp < 6.0 {
        return RiskScore::NONE;
    }

    let Some(required_hours) = apple_scab_required_hours(temp) else {
        return RiskScore::NONE;
    };

    let risk = (wetness_hours / required_hours * 100.0).clamp(0.0, 100.0);
    let value = risk.round() as u8;
    RiskScore::new(value, RiskStatus::from_value(value))
}

pub fn alternaria_blotch(temp: f64, wetness_hours: f64) -> RiskScore {
    if (25.0..=30.0).contains(&temp) && wetness_hours >= 5.5 {
        RiskScore::new(80, RiskStatus::High)
    } else if (20.0..=32.0).contains(&temp) && wetness_hours >= 4.0 {
        RiskScore::new(50, RiskStatus::Medium)
    } else {
        RiskScore::NONE
    }
}

pub fn marssonina_blotch(temp: f64, wetness_hours: f64) -> RiskScore {
    if (20.0..=25.0).contains(&temp) && wetness_hours >= 24.0 {
        RiskScore::new(90, RiskStatus::High)
    } else if (16.0..=28.0).contains(&temp) && wetness_hours >= 10.0 {
        RiskScore::new(60, RiskStatus::Medium)
    } else {
        RiskScore::NONE
    }
}

pub fn powdery_mildew(temp: f64, humidity: f64) -> RiskScore {
    if !(10.0..=25.0).contains(&temp) || humidity < 70.0 {
        return RiskScore::NONE;
    }

    let optimal = (19.0..=22.0).contains(&temp) && humidity > 75.0;
    let value = if optimal { 90 } else { 60 };
    RiskScore::new(value, high_or_medium(value))
}

pub fn cedar_apple_rust(temp: f64, wetness_hours: f64) -> RiskScore {
    if (13.0..=24.0).contains(&temp) && wetness_hours >= 4.0 {
        RiskScore::new(75, RiskStatus::High)
    } else if (10.0..=26.0).contains(&temp) && wetness_hours >= 2.0 {
        RiskScore::new(50, RiskStatus::Medium)
    } else {
        RiskScore::NONE
    }
}

pub fn black_rot(temp: f64, wetness_hours: f64) -> RiskScore {
    if !(20.0..=35.0).contains(&temp) || wetness_hours < 4.0 {
        return RiskScore::NONE;
    }

    let optimal = (26.0..=32.0).contains(&temp) && wetness_hours >= 6.0;
    let value = if optimal { 85 } else { 60 };
    RiskScore::new(value, high_or_medium(value))
}

pub fn bitter_rot(temp: f64, wetness_hours: f64) -> RiskScore {
    if (26.0..=32.0).contains(&temp) && wetness_hours >= 5.0 {
        RiskScore::new(80, RiskStatus::High)
    } else if (20.0..=35.0).contains(&temp) && wetness_hours >= 3.0 {
        RiskScore::new(50, RiskStatus::Medium)
    } else {
        RiskScore::NONE
    }
}

fn high_or_medium(value: u8) -> RiskStatus {
    if value >= 70 {
        RiskStatus::High
    } else {
        RiskStatus::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(value: u8, status: RiskStatus) -> RiskScore {
        RiskScore::new(value, status)
    }

    #[test]
    fn apple_scab_boundary_scenarios() {
        assert_eq!(apple_scab(17.0, 10.0), score(100, RiskStatus::High));
        assert_eq!(apple_scab(17.0, 5.0), score(50, RiskStatus::Medium));
        assert_eq!(apple_scab(17.0, 2.0), score(20, RiskStatus::Low));
    }

    #[test]
    fn apple_scab_outside_bands_is_no_risk() {
        for wetness in [0.0, 5.0, 48.0, 500.0] {
            assert_eq!(apple_scab(9.0, wetness), RiskScore::NONE);
            assert_eq!(apple_scab(5.9, wetness), RiskScore::NONE);
            assert_eq!(apple_scab(25.0, wetness), RiskScore::NONE);
            // Between single-degree bands
            assert_eq!(apple_scab(16.5, wetness), RiskScore::NONE);
        }
    }

    #[test]
    fn apple_scab_mills_bands() {
        assert_eq!(apple_scab_required_hours(18.0), Some(9.0));
        assert_eq!(apple_scab_required_hours(21.37), Some(9.0));
        assert_eq!(apple_scab_required_hours(24.0), Some(9.0));
        assert_eq!(apple_scab_required_hours(17.0), Some(10.0));
        assert_eq!(apple_scab_required_hours(16.0), Some(11.0));
        assert_eq!(apple_scab_required_hours(15.0), Some(12.0));
        assert_eq!(apple_scab_required_hours(13.5), Some(14.0));
        assert_eq!(apple_scab_required_hours(12.0), Some(15.0));
        assert_eq!(apple_scab_required_hours(10.0), Some(20.0));
        assert_eq!(apple_scab_required_hours(11.0), Some(20.0));
        assert_eq!(apple_scab_required_hours(9.99), None);
        assert_eq!(apple_scab_required_hours(24.01), None);
    }

    #[test]
    fn apple_scab_monotonic_and_capped() {
        for temp in [10.0, 12.0, 13.0, 15.0, 16.0, 17.0, 20.0] {
            let mut previous = 0;
            for step in 0..=80 {
                let wetness = step as f64 * 0.5;
                let value = apple_scab(temp, wetness).value;
                assert!(value >= previous, "not monotonic at {}°C/{}h", temp, wetness);
                assert!(value <= 100);
                previous = value;
            }
            assert_eq!(previous, 100);
        }
    }

    #[test]
    fn apple_scab_rounds_to_nearest() {
        // 4.5 / 9 = 50%, 1 / 9 = 11.1%, 5 / 9 = 55.6%
        assert_eq!(apple_scab(20.0, 4.5).value, 50);
        assert_eq!(apple_scab(20.0, 1.0).value, 11);
        assert_eq!(apple_scab(20.0, 5.0).value, 56);
    }

    #[test]
    fn alternaria_blotch_tiers() {
        assert_eq!(alternaria_blotch(25.0, 5.5), score(80, RiskStatus::High));
        assert_eq!(alternaria_blotch(30.0, 6.0), score(80, RiskStatus::High));
        assert_eq!(alternaria_blotch(25.0, 5.0), score(50, RiskStatus::Medium));
        assert_eq!(alternaria_blotch(20.0, 4.0), score(50, RiskStatus::Medium));
        assert_eq!(alternaria_blotch(32.0, 4.0), score(50, RiskStatus::Medium));
        assert_eq!(alternaria_blotch(32.5, 10.0), RiskScore::NONE);
        assert_eq!(alternaria_blotch(22.0, 3.5), RiskScore::NONE);
    }

    #[test]
    fn marssonina_blotch_tiers() {
        assert_eq!(marssonina_blotch(20.0, 24.0), score(90, RiskStatus::High));
        assert_eq!(marssonina_blotch(25.0, 30.0), score(90, RiskStatus::High));
        assert_eq!(marssonina_blotch(26.0, 24.0), score(60, RiskStatus::Medium));
        assert_eq!(marssonina_blotch(16.0, 10.0), score(60, RiskStatus::Medium));
        assert_eq!(marssonina_blotch(28.0, 10.0), score(60, RiskStatus::Medium));
        assert_eq!(marssonina_blotch(22.0, 9.5), RiskScore::NONE);
        assert_eq!(marssonina_blotch(15.9, 30.0), RiskScore::NONE);
    }

    #[test]
    fn powdery_mildew_tiers() {
        assert_eq!(powdery_mildew(20.0, 80.0), score(90, RiskStatus::High));
        assert_eq!(powdery_mildew(19.0, 75.1), score(90, RiskStatus::High));
        // Humidity must be strictly above 75 for the optimal tier
        assert_eq!(powdery_mildew(20.0, 75.0), score(60, RiskStatus::Medium));
        assert_eq!(powdery_mildew(10.0, 70.0), score(60, RiskStatus::Medium));
        assert_eq!(powdery_mildew(25.0, 99.0), score(60, RiskStatus::Medium));
        assert_eq!(powdery_mildew(9.9, 90.0), RiskScore::NONE);
        assert_eq!(powdery_mildew(25.1, 90.0), RiskScore::NONE);
        assert_eq!(powdery_mildew(20.0, 69.9), RiskScore::NONE);
    }

    #[test]
    fn cedar_apple_rust_tiers() {
        assert_eq!(cedar_apple_rust(13.0, 4.0), score(75, RiskStatus::High));
        assert_eq!(cedar_apple_rust(24.0, 4.0), score(75, RiskStatus::High));
        assert_eq!(cedar_apple_rust(12.0, 4.0), score(50, RiskStatus::Medium));
        assert_eq!(cedar_apple_rust(26.0, 2.0), score(50, RiskStatus::Medium));
        assert_eq!(cedar_apple_rust(20.0, 1.5), RiskScore::NONE);
        assert_eq!(cedar_apple_rust(27.0, 10.0), RiskScore::NONE);
    }

    #[test]
    fn black_rot_tiers() {
        assert_eq!(black_rot(26.0, 6.0), score(85, RiskStatus::High));
        assert_eq!(black_rot(32.0, 12.0), score(85, RiskStatus::High));
        assert_eq!(black_rot(26.0, 5.5), score(60, RiskStatus::Medium));
        assert_eq!(black_rot(20.0, 4.0), score(60, RiskStatus::Medium));
        assert_eq!(black_rot(35.0, 8.0), score(60, RiskStatus::Medium));
        assert_eq!(black_rot(19.9, 8.0), RiskScore::NONE);
        assert_eq!(black_rot(35.1, 8.0), RiskScore::NONE);
        assert_eq!(black_rot(28.0, 3.5), RiskScore::NONE);
    }

    #[test]
    fn bitter_rot_tiers() {
        assert_eq!(bitter_rot(26.0, 5.0), score(80, RiskStatus::High));
        assert_eq!(bitter_rot(32.0, 5.0), score(80, RiskStatus::High));
        assert_eq!(bitter_rot(33.0, 5.0), score(50, RiskStatus::Medium));
        assert_eq!(bitter_rot(20.0, 3.0), score(50, RiskStatus::Medium));
        assert_eq!(bitter_rot(35.0, 3.0), score(50, RiskStatus::Medium));
        assert_eq!(bitter_rot(19.0, 10.0), RiskScore::NONE);
        assert_eq!(bitter_rot(28.0, 2.5), RiskScore::NONE);
    }

    #[test]
    fn zero_metrics_yield_no_risk_everywhere() {
        let assessments = evaluate_all_diseases(&WetnessWindowMetrics::default());
        assert_eq!(assessments.len(), 7);
        for assessment in &assessments {
            assert_eq!(assessment.value, 0, "{}", assessment.name);
            assert_eq!(assessment.status, RiskStatus::NoRisk, "{}", assessment.name);
        }
    }

    #[test]
    fn evaluate_all_uses_humidity_for_powdery_mildew() {
        let metrics = WetnessWindowMetrics::new(0.0, 20.0, 80.0);
        let assessments = evaluate_all_diseases(&metrics);

        let mildew = assessments
            .iter()
            .find(|a| a.disease == Disease::PowderyMildew)
            .unwrap();
        assert_eq!(mildew.value, 90);
        assert_eq!(mildew.name, "Powdery Mildew");

        // No wetness hours, so the wetness-driven models stay quiet
        let scab = &assessments[0];
        assert_eq!(scab.disease, Disease::AppleScab);
        assert_eq!(scab.value, 0);
        assert_eq!(scab.status, RiskStatus::Low);
    }

    #[test]
    fn evaluate_all_preserves_order() {
        let metrics = WetnessWindowMetrics::new(12.0, 27.0, 85.0);
        let diseases: Vec<Disease> = evaluate_all_diseases(&metrics)
            .iter()
            .map(|a| a.disease)
            .collect();
        assert_eq!(diseases, Disease::ALL.to_vec());
    }

    #[test]
    fn warm_wet_week_scores() {
        let metrics = WetnessWindowMetrics::new(12.0, 27.0, 85.0);
        let values: Vec<u8> = evaluate_all_diseases(&metrics)
            .iter()
            .map(|a| a.value)
            .collect();
        // scab, alternaria, marssonina, mildew, cedar rust, black rot, bitter rot
        assert_eq!(values, vec![0, 80, 60, 0, 0, 85, 80]);
    }
}
