use crate::config::{AnalysisConfig, Config};
use crate::datasources::{DeviceApiClient, OpenWeatherMapClient};
use crate::error::{OrchardOpsError, Result};
use crate::logic::diseases::evaluate_all_diseases;
use crate::logic::spray::SprayDecisionEngine;
use crate::logic::wetness;
use crate::logic::window::AnalysisWindow;
use crate::models::{
    CurrentConditions, DiseaseRiskAssessment, ForecastSummary, SensorReading,
    SprayWindowDecision, WeatherForecast, WetnessWindowMetrics,
};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;

/// Disease risk table over one analysis window
#[derive(Debug, Clone, Serialize)]
pub struct RiskReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub readings: usize,
    pub metrics: WetnessWindowMetrics,
    pub assessments: Vec<DiseaseRiskAssessment>,
}

/// Everything behind one spray recommendation
#[derive(Debug, Clone, Serialize)]
pub struct SprayAdvisory {
    pub generated_at: DateTime<Utc>,
    pub risk: Option<RiskReport>,
    pub primary: Option<DiseaseRiskAssessment>,
    pub current: Option<CurrentConditions>,
    pub forecast: Option<ForecastSummary>,
    pub decision: SprayWindowDecision,
}

/// Upstream data as returned by the collaborators, failures included
pub struct AdvisoryInputs {
    pub window: (NaiveDate, NaiveDate),
    pub history: Result<Vec<SensorReading>>,
    pub live: Result<SensorReading>,
    pub forecast: Result<ForecastSummary>,
}

pub fn build_risk_report(
    readings: &[SensorReading],
    window: (NaiveDate, NaiveDate),
    analysis: &AnalysisConfig,
) -> RiskReport {
    let metrics = wetness::aggregate(readings, &analysis.cadence);
    RiskReport {
        from: window.0,
        to: window.1,
        readings: readings.len(),
        metrics,
        assessments: evaluate_all_diseases(&metrics),
    }
}

/// Turn resolved inputs into an advisory.
///
/// Any missing input yields an `Error` recommendation, never a spray verdict.
pub fn assemble_advisory(
    inputs: AdvisoryInputs,
    analysis: &AnalysisConfig,
    engine: &SprayDecisionEngine,
    now: DateTime<Utc>,
) -> SprayAdvisory {
    let cutoff = analysis.spray_cutoff(now);
    let risk = match &inputs.history {
        Ok(readings) => {
            // Whole calendar days are fetched; only the trailing hours count
            let recent: Vec<SensorReading> = readings
                .iter()
                .filter(|r| r.timestamp >= cutoff)
                .cloned()
                .collect();
            Some(build_risk_report(&recent, inputs.window, analysis))
        }
        Err(_) => None,
    };
    let primary = risk
        .as_ref()
        .and_then(|r| analysis.primary_disease.select(&r.assessments))
        .cloned();
    let current = inputs.live.as_ref().ok().map(CurrentConditions::from);
    let forecast = inputs.forecast.as_ref().ok().copied();

    let decision = match (&inputs.history, &inputs.live, &inputs.forecast, &primary) {
        (Err(e), _, _, _) => {
            SprayWindowDecision::error(format!("Could not fetch sensor history: {}", e))
        }
        (_, Err(e), _, _) => {
            SprayWindowDecision::error(format!("Could not fetch the live reading: {}", e))
        }
        (_, _, Err(e), _) => {
            SprayWindowDecision::error(format!("Could not fetch the weather forecast: {}", e))
        }
        (Ok(_), Ok(_), Ok(_), None) => SprayWindowDecision::error(format!(
            "No risk assessment available for {}",
            analysis.primary_disease
        )),
        (Ok(_), Ok(live), Ok(summary), Some(primary)) => {
            engine.decide(primary.value, CurrentConditions::from(live), *summary)
        }
    };

    if decision.is_error() {
        tracing::warn!(reason = %decision.reason, "Spray advisory unavailable");
    } else {
        tracing::info!(
            recommendation = %decision.recommendation,
            reason = %decision.reason,
            "Spray advisory computed"
        );
    }

    SprayAdvisory {
        generated_at: now,
        risk,
        primary,
        current,
        forecast,
        decision,
    }
}

/// Gathers collaborator data and runs the engine
pub struct AdvisoryService {
    config: Config,
    device_client: DeviceApiClient,
    openweathermap_client: Option<OpenWeatherMapClient>,
    engine: SprayDecisionEngine,
}

impl AdvisoryService {
    pub fn new(config: Config) -> Result<Self> {
        let device_client = DeviceApiClient::new(config.device.clone())?;

        let openweathermap_client = config
            .openweathermap
            .as_ref()
            .filter(|c| c.enabled && !c.api_key.is_empty())
            .map(|c| {
                tracing::info!("OpenWeatherMap client configured for forecast data");
                OpenWeatherMapClient::new(c.clone())
            })
            .transpose()?;

        if openweathermap_client.is_none() {
            tracing::warn!("OpenWeatherMap not configured - spray advice will report an error");
        }

        tracing::info!(
            window_end = config.analysis.window_end.as_str(),
            risk_days = config.analysis.risk_window_days,
            spray_days = config.analysis.spray_window_days,
            "Analysis windows"
        );

        let engine = SprayDecisionEngine::new(config.spray);

        Ok(Self {
            config,
            device_client,
            openweathermap_client,
            engine,
        })
    }

    pub fn engine(&self) -> &SprayDecisionEngine {
        &self.engine
    }

    /// Spray advisory for `now`; history, live reading and forecast are fetched concurrently
    pub async fn advise(&self, now: DateTime<Utc>) -> SprayAdvisory {
        let today = now.with_timezone(&Local).date_naive();
        let range = self.config.analysis.spray_window().date_range(today);
        let window = range.as_ref().copied().unwrap_or((today, today));

        let history = async {
            match range {
                Ok((from, to)) => self.device_client.get_historical_readings(from, to).await,
                Err(e) => Err(e),
            }
        };

        let (history, live, forecast) = tokio::join!(
            history,
            self.device_client.get_live_reading(),
            self.forecast_summary(now),
        );

        let inputs = AdvisoryInputs {
            window,
            history,
            live,
            forecast,
        };

        assemble_advisory(inputs, &self.config.analysis, &self.engine, now)
    }

    /// Disease risk table over the risk window ending relative to `today`
    pub async fn risk_report(&self, today: NaiveDate) -> Result<RiskReport> {
        self.risk_report_for(self.config.analysis.risk_window(), today)
            .await
    }

    pub async fn risk_report_for(
        &self,
        window: AnalysisWindow,
        today: NaiveDate,
    ) -> Result<RiskReport> {
        let (from, to) = window.date_range(today)?;
        let readings = self
            .device_client
            .get_historical_readings(from, to)
            .await?;
        Ok(build_risk_report(&readings, (from, to), &self.config.analysis))
    }

    /// Full forecast series for the timeline view
    pub async fn forecast(&self) -> Result<WeatherForecast> {
        self.openweathermap_client()?.fetch_forecast().await
    }

    async fn forecast_summary(&self, now: DateTime<Utc>) -> Result<ForecastSummary> {
        self.openweathermap_client()?
            .fetch_summary(now, self.config.spray.rain_forecast_hours)
            .await
    }

    fn openweathermap_client(&self) -> Result<&OpenWeatherMapClient> {
        self.openweathermap_client.as_ref().ok_or_else(|| {
            OrchardOpsError::DataSourceUnavailable("OpenWeatherMap is not configured".into())
        })
    }

    pub async fn check_connections(&self) -> ConnectionStatus {
        let mut status = ConnectionStatus::default();

        status.device = self
            .device_client
            .test_connection()
            .await
            .unwrap_or(false);

        if let Some(ref client) = self.openweathermap_client {
            status.openweathermap = Some(client.test_connection().await.unwrap_or(false));
        }

        status
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConnectionStatus {
    pub device: bool,
    /// `None` when no forecast source is configured
    pub openweathermap: Option<bool>,
}

impl ConnectionStatus {
    pub fn all_connected(&self) -> bool {
        self.device && self.openweathermap == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Disease, DiseaseFocus, SprayRecommendation};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 10, 9, 0, 0).unwrap()
    }

    fn window() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2025, 5, 9).unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
        )
    }

    /// `count` half-hour readings at `temp`, all wet
    fn wet_history(count: usize, temp: f64) -> Vec<SensorReading> {
        (0..count)
            .map(|i| {
                SensorReading::new(now() - Duration::minutes(30 * i as i64), temp, 88.0)
                    .with_leaf_wetness(0.7)
            })
            .collect()
    }

    fn live(temp: f64, wind_mps: f64) -> SensorReading {
        SensorReading::new(now(), temp, 60.0).with_wind(wind_mps)
    }

    fn inputs(
        history: Result<Vec<SensorReading>>,
        live: Result<SensorReading>,
        forecast: Result<ForecastSummary>,
    ) -> AdvisoryInputs {
        AdvisoryInputs {
            window: window(),
            history,
            live,
            forecast,
        }
    }

    fn advise(inputs: AdvisoryInputs) -> SprayAdvisory {
        assemble_advisory(
            inputs,
            &AnalysisConfig::default(),
            &SprayDecisionEngine::default(),
            now(),
        )
    }

    #[test]
    fn wet_night_and_calm_morning_sprays() {
        // 20 wet half-hours at 20°C = 10h, Apple Scab needs 9h -> 100
        let advisory = advise(inputs(
            Ok(wet_history(20, 20.0)),
            Ok(live(22.0, 2.0)),
            Ok(ForecastSummary::new(12.0, 10)),
        ));

        let primary = advisory.primary.as_ref().unwrap();
        assert_eq!(primary.disease, Disease::AppleScab);
        assert_eq!(primary.value, 100);
        assert_eq!(advisory.decision.recommendation, SprayRecommendation::SprayNow);

        let risk = advisory.risk.as_ref().unwrap();
        assert_eq!(risk.readings, 20);
        assert!((risk.metrics.total_wetness_hours - 10.0).abs() < 0.001);
    }

    #[test]
    fn live_wind_converted_to_kmh() {
        // 5 m/s = 18 km/h, over the 15 km/h limit
        let advisory = advise(inputs(
            Ok(wet_history(20, 20.0)),
            Ok(live(22.0, 5.0)),
            Ok(ForecastSummary::new(12.0, 10)),
        ));

        let current = advisory.current.unwrap();
        assert!((current.wind_speed_kmh - 18.0).abs() < 0.001);
        assert_eq!(advisory.decision.vetoed_by.as_deref(), Some("wind_drift"));
    }

    #[test]
    fn empty_history_is_low_risk_not_error() {
        let advisory = advise(inputs(
            Ok(vec![]),
            Ok(live(22.0, 2.0)),
            Ok(ForecastSummary::new(12.0, 10)),
        ));

        assert_eq!(
            advisory.decision.recommendation,
            SprayRecommendation::DoNotSpray
        );
        assert_eq!(advisory.decision.vetoed_by.as_deref(), Some("risk_threshold"));
        assert_eq!(advisory.primary.unwrap().value, 0);
    }

    #[test]
    fn readings_older_than_a_day_are_ignored() {
        // 4 wet hours today, 6 more yesterday morning: only the first 4 count
        let mut history = wet_history(8, 20.0);
        history.extend((0..12).map(|i| {
            SensorReading::new(
                now() - Duration::hours(30) - Duration::minutes(30 * i),
                20.0,
                88.0,
            )
            .with_leaf_wetness(0.7)
        }));

        let advisory = advise(inputs(
            Ok(history),
            Ok(live(22.0, 2.0)),
            Ok(ForecastSummary::new(12.0, 10)),
        ));

        let risk = advisory.risk.as_ref().unwrap();
        assert_eq!(risk.readings, 8);
        assert!((risk.metrics.total_wetness_hours - 4.0).abs() < 0.001);
        assert_eq!(advisory.primary.as_ref().unwrap().value, 44);
        assert_eq!(advisory.decision.vetoed_by.as_deref(), Some("risk_threshold"));
    }

    #[test]
    fn missing_live_reading_is_error() {
        let advisory = advise(inputs(
            Ok(wet_history(20, 20.0)),
            Err(OrchardOpsError::NotFound("no live reading".into())),
            Ok(ForecastSummary::new(12.0, 10)),
        ));

        assert_eq!(advisory.decision.recommendation, SprayRecommendation::Error);
        assert!(advisory.decision.reason.contains("live reading"));
        // Risk is still reported for context
        assert!(advisory.risk.is_some());
        assert!(advisory.current.is_none());
    }

    #[test]
    fn missing_forecast_is_error() {
        let advisory = advise(inputs(
            Ok(wet_history(20, 20.0)),
            Ok(live(22.0, 2.0)),
            Err(OrchardOpsError::DataSourceUnavailable(
                "OpenWeatherMap is not configured".into(),
            )),
        ));

        assert_eq!(advisory.decision.recommendation, SprayRecommendation::Error);
        assert!(advisory.decision.reason.contains("forecast"));
    }

    #[test]
    fn failed_history_is_error_even_with_good_weather() {
        let advisory = advise(inputs(
            Err(OrchardOpsError::DataSourceUnavailable("timeout".into())),
            Ok(live(22.0, 2.0)),
            Ok(ForecastSummary::new(12.0, 10)),
        ));

        assert_eq!(advisory.decision.recommendation, SprayRecommendation::Error);
        assert!(advisory.decision.reason.contains("history"));
        assert!(advisory.risk.is_none());
        assert!(advisory.primary.is_none());
    }

    #[test]
    fn riskiest_focus_drives_decision() {
        let analysis = AnalysisConfig {
            primary_disease: DiseaseFocus::Riskiest,
            ..AnalysisConfig::default()
        };

        // 27°C is outside every Apple Scab band, but Black Rot peaks
        let advisory = assemble_advisory(
            inputs(
                Ok(wet_history(16, 27.0)),
                Ok(live(25.0, 1.0)),
                Ok(ForecastSummary::new(24.0, 5)),
            ),
            &analysis,
            &SprayDecisionEngine::default(),
            now(),
        );

        let primary = advisory.primary.unwrap();
        assert_eq!(primary.disease, Disease::BlackRot);
        assert_eq!(primary.value, 85);
        assert_eq!(advisory.decision.recommendation, SprayRecommendation::SprayNow);
    }

    #[test]
    fn assembly_is_idempotent() {
        let make = || {
            inputs(
                Ok(wet_history(12, 18.0)),
                Ok(live(21.0, 3.0)),
                Ok(ForecastSummary::new(4.0, 55)),
            )
        };
        let first = advise(make());
        let second = advise(make());
        assert_eq!(first.decision, second.decision);
        assert_eq!(first.primary, second.primary);
    }

    #[test]
    fn connection_status_requires_forecast() {
        let status = ConnectionStatus {
            device: true,
            openweathermap: None,
        };
        assert!(!status.all_connected());

        let status = ConnectionStatus {
            device: true,
            openweathermap: Some(true),
        };
        assert!(status.all_connected());
    }
}
