use crate::config::OpenWeatherMapConfig;
use crate::error::{OrchardOpsError, Result};
use crate::models::forecast::{
    ForecastEntry, ForecastLocation, ForecastSummary, WeatherCondition, WeatherForecast,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

const API_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

pub struct OpenWeatherMapClient {
    client: reqwest::Client,
    base_url: String,
    config: OpenWeatherMapConfig,
}

// OpenWeatherMap API response structures
#[derive(Debug, Deserialize)]
struct OwmForecastResponse {
    list: Vec<OwmForecastItem>,
    city: OwmCity,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    dt: i64,
    main: OwmMain,
    weather: Vec<OwmWeather>,
    wind: OwmWind,
    #[serde(default)]
    pop: f64, // probability of precipitation
    #[serde(default)]
    rain: Option<OwmPrecipitation>,
    #[serde(default)]
    snow: Option<OwmPrecipitation>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    id: u32,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64, // m/s with metric units
}

#[derive(Debug, Deserialize)]
struct OwmPrecipitation {
    #[serde(rename = "3h", default)]
    three_hour: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCity {
    name: String,
    #[serde(default)]
    country: String,
    coord: OwmCoord,
}

#[derive(Debug, Deserialize)]
struct OwmCoord {
    lat: f64,
    lon: f64,
}

impl OpenWeatherMapClient {
    pub fn new(config: OpenWeatherMapConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            config,
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Fetch the next `entries` 3-hour steps, metric units
    pub async fn fetch_forecast(&self) -> Result<WeatherForecast> {
        let url = format!(
            "{}/forecast?lat={}&lon={}&cnt={}&appid={}&units=metric",
            self.base_url,
            self.config.latitude,
            self.config.longitude,
            self.config.entries,
            self.config.api_key
        );

        let response = self.client.get(&url).send().await.map_err(unavailable)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OrchardOpsError::DataSourceUnavailable(format!(
                "OpenWeatherMap returned {}: {}",
                status, body
            )));
        }

        let owm_response: OwmForecastResponse = response.json().await.map_err(|e| {
            OrchardOpsError::DataSourceUnavailable(format!(
                "Failed to parse OpenWeatherMap response: {}",
                e.without_url()
            ))
        })?;

        Ok(convert_response(owm_response, Utc::now()))
    }

    /// Forecast collapsed to rain onset and probability over `window_hours`
    pub async fn fetch_summary(
        &self,
        now: DateTime<Utc>,
        window_hours: f64,
    ) -> Result<ForecastSummary> {
        let forecast = self.fetch_forecast().await?;
        summarize_forecast(&forecast, now, window_hours)
    }

    /// Test connection to OpenWeatherMap API
    pub async fn test_connection(&self) -> Result<bool> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            self.base_url, self.config.latitude, self.config.longitude, self.config.api_key
        );

        let response = self.client.get(&url).send().await.map_err(unavailable)?;

        Ok(response.status().is_success())
    }
}

/// Transport failure without the request URL, which carries the API key
fn unavailable(e: reqwest::Error) -> OrchardOpsError {
    OrchardOpsError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e.without_url()))
}

/// An empty forecast says nothing about rain; it is unavailable, not dry
fn summarize_forecast(
    forecast: &WeatherForecast,
    now: DateTime<Utc>,
    window_hours: f64,
) -> Result<ForecastSummary> {
    if forecast.entries.is_empty() {
        return Err(OrchardOpsError::DataSourceUnavailable(
            "OpenWeatherMap returned no usable forecast steps".into(),
        ));
    }

    let summary = forecast.summarize(now, window_hours);
    tracing::debug!(?summary, entries = forecast.entries.len(), "Forecast summarized");
    Ok(summary)
}

fn convert_response(response: OwmForecastResponse, fetched_at: DateTime<Utc>) -> WeatherForecast {
    let location = ForecastLocation {
        city: response.city.name,
        country: response.city.country,
        latitude: response.city.coord.lat,
        longitude: response.city.coord.lon,
    };

    let mut entries: Vec<ForecastEntry> = response
        .list
        .iter()
        .filter_map(convert_forecast_item)
        .collect();
    entries.sort_by_key(|e| e.timestamp);

    WeatherForecast {
        fetched_at,
        location,
        entries,
    }
}

fn convert_forecast_item(item: &OwmForecastItem) -> Option<ForecastEntry> {
    let Some(timestamp) = DateTime::from_timestamp(item.dt, 0) else {
        tracing::warn!(dt = item.dt, "Skipping forecast step with invalid timestamp");
        return None;
    };

    let weather = item.weather.first();
    let condition = weather
        .map(|w| WeatherCondition::from_owm_id(w.id))
        .unwrap_or_default();
    let description = weather
        .map(|w| w.description.clone())
        .unwrap_or_else(|| condition.as_str().to_lowercase());

    // Combine rain and snow precipitation
    let rain_mm = item.rain.as_ref().map(|r| r.three_hour).unwrap_or(0.0);
    let snow_mm = item.snow.as_ref().map(|s| s.three_hour).unwrap_or(0.0);

    Some(ForecastEntry {
        timestamp,
        temperature_celsius: item.main.temp,
        humidity_percent: item.main.humidity,
        wind_speed_mps: item.wind.speed,
        description,
        condition,
        precipitation_mm: rain_mm + snow_mm,
        precipitation_prob: item.pop,
    })
}
