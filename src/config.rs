use crate::error::{OrchardOpsError, Result};
use crate::logic::spray::SprayThresholds;
use crate::logic::wetness::Cadence;
use crate::logic::window::{AnalysisWindow, WindowEnd};
use crate::models::{Disease, DiseaseFocus};
use chrono::{DateTime, Duration, Utc};
use dialoguer::{Input, Password};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Longest trailing window accepted from configuration
pub const MAX_WINDOW_DAYS: u32 = 3650;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub device: DeviceConfig,
    pub openweathermap: Option<OpenWeatherMapConfig>,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub spray: SprayThresholds,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Base URL of the field station API
    pub url: String,
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl std::fmt::Debug for DeviceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceConfig")
            .field("url", &self.url)
            .field("device_id", &self.device_id)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct OpenWeatherMapConfig {
    pub api_key: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Number of 3-hour forecast steps to request
    #[serde(default = "default_forecast_entries")]
    pub entries: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_forecast_entries() -> u32 {
    10
}

fn default_enabled() -> bool {
    true
}

impl std::fmt::Debug for OpenWeatherMapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherMapConfig")
            .field("api_key", &"[REDACTED]")
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .field("entries", &self.entries)
            .field("enabled", &self.enabled)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Trailing days feeding the disease risk table
    pub risk_window_days: u32,
    /// Trailing days feeding the spray decision
    pub spray_window_days: u32,
    pub window_end: WindowEnd,
    pub cadence: Cadence,
    pub primary_disease: DiseaseFocus,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            risk_window_days: 7,
            spray_window_days: 1,
            window_end: WindowEnd::Today,
            cadence: Cadence::default(),
            primary_disease: DiseaseFocus::Single(Disease::AppleScab),
        }
    }
}

impl AnalysisConfig {
    pub fn risk_window(&self) -> AnalysisWindow {
        AnalysisWindow::new(self.risk_window_days, self.window_end)
    }

    /// Calendar days fetched for the spray decision. Always ends today,
    /// since the decision looks at the hours right before `now`.
    pub fn spray_window(&self) -> AnalysisWindow {
        AnalysisWindow::new(self.spray_window_days, WindowEnd::Today)
    }

    /// Oldest reading that still counts toward the spray decision
    pub fn spray_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(Duration::hours(24 * i64::from(self.spray_window_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(OrchardOpsError::Config(format!(
                "Config file not found at {:?}. Run `orchardops init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| OrchardOpsError::Config(format!("Failed to read config: {}", e)))?;

        let config = Self::from_yaml(&config_str)?;
        tracing::debug!(path = %config_path.display(), ?config, "Configuration loaded");
        Ok(config)
    }

    /// Parse YAML after `${VAR}` substitution, then validate
    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content)?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| OrchardOpsError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.device.url.trim().is_empty() {
            return Err(OrchardOpsError::Config("device.url must not be empty".into()));
        }
        if self.device.device_id.trim().is_empty() {
            return Err(OrchardOpsError::Config(
                "device.device_id must not be empty".into(),
            ));
        }
        if self.analysis.risk_window_days == 0 || self.analysis.spray_window_days == 0 {
            return Err(OrchardOpsError::Config(
                "analysis window lengths must be at least one day".into(),
            ));
        }
        if self.analysis.risk_window_days > MAX_WINDOW_DAYS
            || self.analysis.spray_window_days > MAX_WINDOW_DAYS
        {
            return Err(OrchardOpsError::Config(format!(
                "analysis window lengths must not exceed {} days",
                MAX_WINDOW_DAYS
            )));
        }
        match self.analysis.cadence {
            Cadence::Fixed { interval_hours } if interval_hours <= 0.0 => {
                return Err(OrchardOpsError::Config(
                    "analysis.cadence.interval_hours must be positive".into(),
                ));
            }
            Cadence::Derived {
                fallback_hours,
                max_gap_hours,
            } if fallback_hours <= 0.0 || max_gap_hours <= 0.0 => {
                return Err(OrchardOpsError::Config(
                    "analysis.cadence hours must be positive".into(),
                ));
            }
            _ => {}
        }
        if let Some(owm) = &self.openweathermap {
            if !(-90.0..=90.0).contains(&owm.latitude) || !(-180.0..=180.0).contains(&owm.longitude)
            {
                return Err(OrchardOpsError::Config(format!(
                    "invalid forecast coordinates ({}, {})",
                    owm.latitude, owm.longitude
                )));
            }
            if owm.entries == 0 {
                return Err(OrchardOpsError::Config(
                    "openweathermap.entries must be at least 1".into(),
                ));
            }
        }
        Ok(())
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("orchardops").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        Self::default_config_path()
    }

    /// Returns true if a config file can be found in any standard location.
    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/orchardops/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| OrchardOpsError::Config("Cannot determine config directory".into()))?
            .join("orchardops");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the new Config and the path it was written to.
    pub fn setup_interactive(target: Option<PathBuf>) -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up OrchardOps!");
        println!();

        // --- Field station ---
        println!("Field station API");
        let url: String = Input::new()
            .with_prompt("  Base URL")
            .default("http://localhost:5000/api".into())
            .interact_text()
            .map_err(input_error)?;

        let device_id: String = Input::new()
            .with_prompt("  Device id")
            .interact_text()
            .map_err(input_error)?;

        let token: String = Password::new()
            .with_prompt("  API token (blank for none)")
            .allow_empty_password(true)
            .interact()
            .map_err(input_error)?;

        println!();

        // --- OpenWeatherMap (optional) ---
        println!("OpenWeatherMap (leave API key blank to skip)");
        let owm_api_key: String = Input::new()
            .with_prompt("  API key")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(input_error)?;

        let openweathermap = if owm_api_key.is_empty() {
            None
        } else {
            let latitude: f64 = Input::new()
                .with_prompt("  Orchard latitude")
                .default(30.34)
                .interact_text()
                .map_err(input_error)?;

            let longitude: f64 = Input::new()
                .with_prompt("  Orchard longitude")
                .default(78.02)
                .interact_text()
                .map_err(input_error)?;

            Some(OpenWeatherMapConfig {
                api_key: owm_api_key,
                latitude,
                longitude,
                entries: default_forecast_entries(),
                enabled: true,
                timeout_secs: default_timeout_secs(),
            })
        };

        println!();

        // --- Analysis ---
        println!("Analysis");
        let primary: String = Input::new()
            .with_prompt("  Disease driving spray advice (riskiest, apple_scab, black_rot, ...)")
            .default("apple_scab".into())
            .validate_with(|value: &String| -> std::result::Result<(), String> {
                DiseaseFocus::from_str(value)
                    .map(|_| ())
                    .ok_or_else(|| format!("unknown disease '{}'", value))
            })
            .interact_text()
            .map_err(input_error)?;

        let primary_disease = DiseaseFocus::from_str(&primary)
            .ok_or_else(|| OrchardOpsError::Config(format!("unknown disease '{}'", primary)))?;

        println!();

        let config = Config {
            device: DeviceConfig {
                url,
                device_id,
                token: if token.is_empty() { None } else { Some(token) },
                timeout_secs: default_timeout_secs(),
            },
            openweathermap,
            analysis: AnalysisConfig {
                primary_disease,
                ..AnalysisConfig::default()
            },
            spray: SprayThresholds::default(),
        };
        config.validate()?;

        let config_path = match target {
            Some(p) => p,
            None => Self::default_config_path()?,
        };
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| OrchardOpsError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# OrchardOps Configuration\n# Generated by `orchardops init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        let mut result = content.to_string();

        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| OrchardOpsError::Config(format!("Bad substitution pattern: {}", e)))?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        Ok(result)
    }
}

fn input_error(e: dialoguer::Error) -> OrchardOpsError {
    OrchardOpsError::Config(format!("Input error: {}", e))
}
