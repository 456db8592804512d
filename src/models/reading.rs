use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sampled interval from an orchard field station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub timestamp: DateTime<Utc>,
    pub temperature_celsius: f64,
    pub humidity_percent: f64,
    /// Continuous leaf wetness signal, 0.0 (dry) to 1.0 (saturated)
    pub leaf_wetness_factor: f64,
    pub wind_speed_mps: f64,
    pub rainfall_mm: f64,
}

impl SensorReading {
    pub fn new(timestamp: DateTime<Utc>, temperature_celsius: f64, humidity_percent: f64) -> Self {
        Self {
            timestamp,
            temperature_celsius,
            humidity_percent,
            leaf_wetness_factor: 0.0,
            wind_speed_mps: 0.0,
            rainfall_mm: 0.0,
        }
    }

    pub fn with_leaf_wetness(mut self, factor: f64) -> Self {
        self.leaf_wetness_factor = factor;
        self
    }

    pub fn with_wind(mut self, wind_speed_mps: f64) -> Self {
        self.wind_speed_mps = wind_speed_mps;
        self
    }

    pub fn with_rainfall(mut self, rainfall_mm: f64) -> Self {
        self.rainfall_mm = rainfall_mm;
        self
    }

    pub fn wind_speed_kmh(&self) -> f64 {
        mps_to_kmh(self.wind_speed_mps)
    }
}

/// Live weather as seen by the spray decision engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_celsius: f64,
    pub wind_speed_kmh: f64,
}

impl CurrentConditions {
    pub fn new(temp_celsius: f64, wind_speed_kmh: f64) -> Self {
        Self {
            temp_celsius,
            wind_speed_kmh,
        }
    }
}

impl From<&SensorReading> for CurrentConditions {
    fn from(reading: &SensorReading) -> Self {
        Self::new(reading.temperature_celsius, reading.wind_speed_kmh())
    }
}

pub fn mps_to_kmh(mps: f64) -> f64 {
    mps * 3.6
}
