use crate::models::{SensorReading, WetnessWindowMetrics};
use serde::{Deserialize, Serialize};

/// Leaf counts as wet strictly above this factor
pub const WETNESS_THRESHOLD: f64 = 0.3;

/// Assumed duration of one sampled interval (30-minute cadence)
pub const DEFAULT_INTERVAL_HOURS: f64 = 0.5;

/// How much time each reading stands for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Cadence {
    /// Every reading covers the same fixed interval
    Fixed {
        #[serde(default = "default_interval_hours")]
        interval_hours: f64,
    },
    /// Interval taken from the gap to the next reading's timestamp
    Derived {
        #[serde(default = "default_interval_hours")]
        fallback_hours: f64,
        #[serde(default = "default_max_gap_hours")]
        max_gap_hours: f64,
    },
}

fn default_interval_hours() -> f64 {
    DEFAULT_INTERVAL_HOURS
}

fn default_max_gap_hours() -> f64 {
    2.0
}

impl Default for Cadence {
    fn default() -> Self {
        Cadence::Fixed {
            interval_hours: DEFAULT_INTERVAL_HOURS,
        }
    }
}

impl Cadence {
    /// Duration in hours for each reading, in the order given
    fn interval_hours(&self, readings: &[SensorReading]) -> Vec<f64> {
        match *self {
            Cadence::Fixed { interval_hours } => vec![interval_hours; readings.len()],
            Cadence::Derived {
                fallback_hours,
                max_gap_hours,
            } => {
                let mut order: Vec<usize> = (0..readings.len()).collect();
                order.sort_by_key(|&i| readings[i].timestamp);

                let mut hours = vec![fallback_hours; readings.len()];
                for pair in order.windows(2) {
                    let gap = readings[pair[1]].timestamp - readings[pair[0]].timestamp;
                    let gap_hours = gap.num_seconds() as f64 / 3600.0;
                    hours[pair[0]] = gap_hours.clamp(0.0, max_gap_hours);
                }
                hours
            }
        }
    }
}

/// Reduce a reading series to wetness window metrics.
///
/// Empty input yields all-zero metrics; nothing here can fail.
pub fn aggregate(readings: &[SensorReading], cadence: &Cadence) -> WetnessWindowMetrics {
    if readings.is_empty() {
        return WetnessWindowMetrics::default();
    }

    let durations = cadence.interval_hours(readings);

    let mut wet_count = 0usize;
    let mut wet_hours = 0.0;
    let mut wet_temp_sum = 0.0;

    for (reading, hours) in readings.iter().zip(&durations) {
        if is_wet(reading) {
            wet_count += 1;
            wet_hours += hours;
            wet_temp_sum += reading.temperature_celsius;
        }
    }

    let avg_temp_during_wetness = if wet_count > 0 {
        wet_temp_sum / wet_count as f64
    } else {
        0.0
    };

    let overall_avg_humidity =
        readings.iter().map(|r| r.humidity_percent).sum::<f64>() / readings.len() as f64;

    let metrics = WetnessWindowMetrics::new(
        wet_hours,
        round_2dp(avg_temp_during_wetness),
        round_2dp(overall_avg_humidity),
    );

    tracing::debug!(
        readings = readings.len(),
        wet_intervals = wet_count,
        ?metrics,
        "Aggregated wetness window"
    );

    metrics
}

pub fn is_wet(reading: &SensorReading) -> bool {
    reading.leaf_wetness_factor > WETNESS_THRESHOLD
}

fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 20, 0, 0, 0).unwrap()
    }

    fn reading(minutes: i64, temp: f64, humidity: f64, wetness: f64) -> SensorReading {
        SensorReading::new(start() + Duration::minutes(minutes), temp, humidity)
            .with_leaf_wetness(wetness)
    }

    #[test]
    fn empty_window_is_all_zero() {
        let metrics = aggregate(&[], &Cadence::default());
        assert_eq!(metrics, WetnessWindowMetrics::new(0.0, 0.0, 0.0));
        assert!(!metrics.avg_temp_during_wetness.is_nan());
        assert!(!metrics.overall_avg_humidity.is_nan());
    }

    #[test]
    fn threshold_is_strict() {
        let readings = vec![
            reading(0, 15.0, 80.0, 0.3),
            reading(30, 15.0, 80.0, 0.29),
            reading(60, 15.0, 80.0, 0.0),
        ];

        let metrics = aggregate(&readings, &Cadence::default());
        assert_eq!(metrics.total_wetness_hours, 0.0);
        assert_eq!(metrics.avg_temp_during_wetness, 0.0);
        assert!((metrics.overall_avg_humidity - 80.0).abs() < 0.001);
    }

    #[test]
    fn wet_hours_and_wet_temperature() {
        let readings = vec![
            reading(0, 12.0, 90.0, 0.8),
            reading(30, 14.0, 88.0, 0.31),
            reading(60, 16.0, 86.0, 0.5),
            reading(90, 30.0, 40.0, 0.1), // dry, excluded from wet temp
        ];

        let metrics = aggregate(&readings, &Cadence::default());
        assert!((metrics.total_wetness_hours - 1.5).abs() < 0.001);
        assert!((metrics.avg_temp_during_wetness - 14.0).abs() < 0.001);
        // Humidity averages over every interval, wet or dry
        assert!((metrics.overall_avg_humidity - 76.0).abs() < 0.001);
    }

    #[test]
    fn averages_rounded_to_two_decimals() {
        let readings = vec![
            reading(0, 17.001, 70.0, 0.9),
            reading(30, 17.002, 71.0, 0.9),
            reading(60, 17.0, 71.0, 0.9),
        ];

        let metrics = aggregate(&readings, &Cadence::default());
        assert_eq!(metrics.avg_temp_during_wetness, 17.0);
        assert_eq!(metrics.overall_avg_humidity, 70.67);
    }

    #[test]
    fn order_does_not_matter_for_fixed_cadence() {
        let mut readings = vec![
            reading(0, 10.0, 60.0, 0.9),
            reading(30, 20.0, 80.0, 0.0),
            reading(60, 14.0, 70.0, 0.6),
        ];
        let forward = aggregate(&readings, &Cadence::default());
        readings.reverse();
        assert_eq!(aggregate(&readings, &Cadence::default()), forward);
    }

    #[test]
    fn derived_cadence_uses_timestamp_gaps() {
        let cadence = Cadence::Derived {
            fallback_hours: 0.5,
            max_gap_hours: 2.0,
        };

        // 15-minute sampling, last reading falls back to 0.5h
        let readings = vec![
            reading(0, 15.0, 90.0, 0.9),
            reading(15, 15.0, 90.0, 0.9),
            reading(30, 15.0, 90.0, 0.9),
        ];
        let metrics = aggregate(&readings, &cadence);
        assert!((metrics.total_wetness_hours - 1.0).abs() < 0.001);
    }

    #[test]
    fn derived_cadence_caps_outage_gaps() {
        let cadence = Cadence::Derived {
            fallback_hours: 0.5,
            max_gap_hours: 2.0,
        };

        // Six hour sensor outage after the first reading, given out of order
        let readings = vec![
            reading(360, 15.0, 90.0, 0.0),
            reading(0, 15.0, 90.0, 0.9),
        ];
        let metrics = aggregate(&readings, &cadence);
        assert!((metrics.total_wetness_hours - 2.0).abs() < 0.001);
    }

    #[test]
    fn cadence_deserializes_from_yaml() {
        let fixed: Cadence = serde_yaml::from_str("mode: fixed").unwrap();
        assert_eq!(fixed, Cadence::default());

        let derived: Cadence = serde_yaml::from_str("mode: derived\nmax_gap_hours: 1.0").unwrap();
        assert_eq!(
            derived,
            Cadence::Derived {
                fallback_hours: 0.5,
                max_gap_hours: 1.0
            }
        );
    }
}
