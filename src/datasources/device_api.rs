use crate::config::DeviceConfig;
use crate::error::{OrchardOpsError, Result};
use crate::models::SensorReading;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Client for the field station REST API (history + live readings)
pub struct DeviceApiClient {
    client: reqwest::Client,
    config: DeviceConfig,
}

// Field station API response structures
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    status: Option<bool>,
    #[serde(default)]
    data: Vec<DeviceRecord>,
    #[serde(default)]
    message: Option<String>,
}

/// Numeric fields arrive either as JSON numbers or as numeric strings
#[derive(Debug, Deserialize)]
struct DeviceRecord {
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    wind_speed: Option<f64>, // m/s
    #[serde(default, deserialize_with = "lenient_f64")]
    rainfall: Option<f64>, // mm
    #[serde(default, deserialize_with = "lenient_f64")]
    leaf_wetness: Option<f64>,
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    // "NaN" and "inf" parse as f64 but are no more usable than "n/a"
    Ok(parsed.filter(|v| v.is_finite()))
}

impl DeviceApiClient {
    pub fn new(config: DeviceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Readings for the inclusive `from..=to` date range
    pub async fn get_historical_readings(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SensorReading>> {
        let url = format!(
            "{}/devices/{}/history?range=custom&from={}&to={}",
            self.base_url(),
            self.config.device_id,
            format_api_date(from),
            format_api_date(to)
        );

        let envelope = self.get_envelope(&url).await?;
        let readings = parse_records(envelope.data);
        tracing::debug!(
            device = %self.config.device_id,
            %from,
            %to,
            count = readings.len(),
            "Fetched sensor history"
        );
        Ok(readings)
    }

    /// Most recent reading reported by the device
    pub async fn get_live_reading(&self) -> Result<SensorReading> {
        let url = format!("{}/live-data/{}", self.base_url(), self.config.device_id);

        let envelope = self.get_envelope(&url).await?;
        live_reading(envelope, &self.config.device_id)
    }

    /// Test connection to the field station API
    pub async fn test_connection(&self) -> Result<bool> {
        let url = format!("{}/live-data/{}", self.base_url(), self.config.device_id);

        let response = self
            .request(&url)
            .send()
            .await
            .map_err(|e| OrchardOpsError::DataSourceUnavailable(format!("Field station: {}", e)))?;

        Ok(response.status().is_success())
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let builder = self.client.get(url);
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_envelope(&self, url: &str) -> Result<ApiEnvelope> {
        let response = self
            .request(url)
            .send()
            .await
            .map_err(|e| OrchardOpsError::DataSourceUnavailable(format!("Field station: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OrchardOpsError::DataSourceUnavailable(format!(
                "Field station returned {}: {}",
                status, body
            )));
        }

        let envelope: ApiEnvelope = response.json().await.map_err(|e| {
            OrchardOpsError::DataSourceUnavailable(format!(
                "Failed to parse field station response: {}",
                e
            ))
        })?;

        check_envelope(envelope)
    }
}

fn check_envelope(envelope: ApiEnvelope) -> Result<ApiEnvelope> {
    if envelope.status == Some(false) {
        return Err(OrchardOpsError::DataSourceUnavailable(format!(
            "Field station reported failure: {}",
            envelope.message.as_deref().unwrap_or("no message")
        )));
    }
    Ok(envelope)
}

/// The live reading feeds the wind veto, so a missing wind speed is an error
fn live_reading(envelope: ApiEnvelope, device_id: &str) -> Result<SensorReading> {
    let record = envelope.data.into_iter().next().ok_or_else(|| {
        OrchardOpsError::NotFound(format!("No live reading for device {}", device_id))
    })?;

    if record.wind_speed.is_none() {
        return Err(OrchardOpsError::InvalidData(format!(
            "live reading for device {} has no usable wind speed",
            device_id
        )));
    }

    record_to_reading(record)
}

fn format_api_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Convert raw records, dropping any that lack a usable timestamp, temperature or humidity
fn parse_records(records: Vec<DeviceRecord>) -> Vec<SensorReading> {
    let total = records.len();
    let readings: Vec<SensorReading> = records
        .into_iter()
        .filter_map(|record| match record_to_reading(record) {
            Ok(reading) => Some(reading),
            Err(e) => {
                tracing::warn!("Skipping sensor record: {}", e);
                None
            }
        })
        .collect();

    if readings.len() < total {
        tracing::warn!(
            kept = readings.len(),
            total,
            "Some sensor records were unusable"
        );
    }
    readings
}

fn record_to_reading(record: DeviceRecord) -> Result<SensorReading> {
    let timestamp = record
        .timestamp
        .as_deref()
        .and_then(parse_timestamp)
        .ok_or_else(|| {
            OrchardOpsError::InvalidData(format!("bad timestamp {:?}", record.timestamp))
        })?;

    let temperature = record
        .temp
        .ok_or_else(|| OrchardOpsError::InvalidData(format!("missing temp at {}", timestamp)))?;
    let humidity = record.humidity.ok_or_else(|| {
        OrchardOpsError::InvalidData(format!("missing humidity at {}", timestamp))
    })?;

    // A station without a leaf wetness sensor reports nothing; treat as dry
    Ok(SensorReading::new(timestamp, temperature, humidity)
        .with_leaf_wetness(record.leaf_wetness.unwrap_or(0.0))
        .with_wind(record.wind_speed.unwrap_or(0.0))
        .with_rainfall(record.rainfall.unwrap_or(0.0)))
}

/// Accepts RFC 3339 or naive `YYYY-MM-DD HH:MM:SS` (taken as UTC)
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
