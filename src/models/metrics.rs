use serde::{Deserialize, Serialize};

/// Wetness window summary derived from a reading series.
///
/// Recomputed from scratch for every evaluation; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WetnessWindowMetrics {
    /// Hours the leaf wetness factor stayed above the wet threshold
    pub total_wetness_hours: f64,
    /// Mean temperature over the wet intervals only (°C)
    pub avg_temp_during_wetness: f64,
    /// Mean humidity over the whole window (%)
    pub overall_avg_humidity: f64,
}

impl WetnessWindowMetrics {
    pub fn new(
        total_wetness_hours: f64,
        avg_temp_during_wetness: f64,
        overall_avg_humidity: f64,
    ) -> Self {
        Self {
            total_wetness_hours,
            avg_temp_during_wetness,
            overall_avg_humidity,
        }
    }

    pub fn has_wetness(&self) -> bool {
        self.total_wetness_hours > 0.0
    }
}
