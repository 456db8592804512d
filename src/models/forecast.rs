use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Length of one OpenWeatherMap forecast step
pub const FORECAST_STEP_HOURS: f64 = 3.0;

/// Probability at which a forecast step counts as the start of rain
const RAIN_ONSET_PROBABILITY: f64 = 0.2;

/// Short-horizon weather forecast (OpenWeatherMap 5-day/3-hour API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub fetched_at: DateTime<Utc>,
    pub location: ForecastLocation,
    pub entries: Vec<ForecastEntry>, // 3-hour steps, ascending
}

impl WeatherForecast {
    /// Collapse the forecast series into the rain onset view used by the
    /// wash-off veto.
    ///
    /// The chance reported is the highest probability of any step up to
    /// `window_hours` ahead (or up to the onset, if that comes later), so a
    /// weak early signal cannot mask likely rain further into the window.
    pub fn summarize(&self, now: DateTime<Utc>, window_hours: f64) -> ForecastSummary {
        let hours_from_now = |entry: &ForecastEntry| -> f64 {
            let minutes = (entry.timestamp - now).num_minutes();
            (minutes as f64 / 60.0).max(0.0)
        };

        let max_prob_until = |limit: f64| -> f64 {
            self.entries
                .iter()
                .filter(|&e| hours_from_now(e) <= limit)
                .map(|e| e.precipitation_prob)
                .fold(0.0_f64, f64::max)
        };

        if let Some(onset) = self.entries.iter().find(|e| e.signals_rain()) {
            let onset_hours = hours_from_now(onset);
            let max_prob = max_prob_until(onset_hours.max(window_hours));
            return ForecastSummary::new(onset_hours, probability_to_percent(max_prob));
        }

        let horizon = self
            .entries
            .last()
            .map(|e| hours_from_now(e) + FORECAST_STEP_HOURS)
            .unwrap_or(0.0);

        ForecastSummary::new(horizon, probability_to_percent(max_prob_until(f64::INFINITY)))
    }

    /// Entries at or before `now + hours`
    pub fn next_hours(&self, now: DateTime<Utc>, hours: u32) -> Vec<&ForecastEntry> {
        let cutoff = now + chrono::Duration::hours(hours as i64);
        self.entries
            .iter()
            .filter(|e| e.timestamp <= cutoff)
            .collect()
    }
}

fn probability_to_percent(prob: f64) -> u8 {
    (prob.clamp(0.0, 1.0) * 100.0).round() as u8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastLocation {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A single 3-hour forecast step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temperature_celsius: f64,
    pub humidity_percent: f64,
    pub wind_speed_mps: f64,
    pub description: String,
    pub condition: WeatherCondition,
    pub precipitation_mm: f64,   // rain + snow
    pub precipitation_prob: f64, // 0.0-1.0
}

impl ForecastEntry {
    pub fn signals_rain(&self) -> bool {
        self.precipitation_mm > 0.0
            || self.condition.has_precipitation()
            || self.precipitation_prob >= RAIN_ONSET_PROBABILITY
    }

    /// Timeline badge: dry description and wind under 3 m/s
    pub fn is_ideal_for_spraying(&self) -> bool {
        !self.description.to_lowercase().contains("rain") && self.wind_speed_mps < 3.0
    }
}

/// Collapsed forecast consumed by the spray decision engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    /// Hours until rain is expected to start
    pub rain_in_next_hours: f64,
    pub chance_of_rain_percent: u8,
}

impl ForecastSummary {
    pub fn new(rain_in_next_hours: f64, chance_of_rain_percent: u8) -> Self {
        Self {
            rain_in_next_hours,
            chance_of_rain_percent,
        }
    }
}

/// Weather condition categories from OpenWeatherMap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WeatherCondition {
    #[default]
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Fog,
    Other,
}

impl WeatherCondition {
    pub fn from_owm_id(id: u32) -> Self {
        match id {
            200..=232 => WeatherCondition::Thunderstorm,
            300..=321 => WeatherCondition::Drizzle,
            500..=531 => WeatherCondition::Rain,
            600..=622 => WeatherCondition::Snow,
            701 => WeatherCondition::Mist,
            741 => WeatherCondition::Fog,
            800 => WeatherCondition::Clear,
            801..=804 => WeatherCondition::Clouds,
            _ => WeatherCondition::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "Clear",
            WeatherCondition::Clouds => "Cloudy",
            WeatherCondition::Rain => "Rain",
            WeatherCondition::Drizzle => "Drizzle",
            WeatherCondition::Thunderstorm => "Thunderstorm",
            WeatherCondition::Snow => "Snow",
            WeatherCondition::Mist => "Mist",
            WeatherCondition::Fog => "Fog",
            WeatherCondition::Other => "Other",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "☀",
            WeatherCondition::Clouds => "☁",
            WeatherCondition::Rain => "🌧",
            WeatherCondition::Drizzle => "🌦",
            WeatherCondition::Thunderstorm => "⛈",
            WeatherCondition::Snow => "❄",
            WeatherCondition::Mist => "🌫",
            WeatherCondition::Fog => "🌫",
            WeatherCondition::Other => "?",
        }
    }

    /// Whether this condition involves precipitation
    pub fn has_precipitation(&self) -> bool {
        matches!(
            self,
            WeatherCondition::Rain
                | WeatherCondition::Drizzle
                | WeatherCondition::Thunderstorm
                | WeatherCondition::Snow
        )
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
