//! Configuration file support for bacwatch.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/bacwatch/config.toml`.

use crate::elimination::EliminationStrategy;
use crate::reading::ReadingOptions;
use crate::{Error, Result, UserId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Longest lookback accepted for the live BAC (one year)
pub const MAX_LOOKBACK_HOURS: u32 = 24 * 366;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub user: UserConfig,

    #[serde(default)]
    pub estimator: EstimatorConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,

    #[serde(default)]
    pub intake: IntakeConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Which user's drinks the CLI reads and writes
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user")]
    pub default: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            default: default_user(),
        }
    }
}

/// BAC estimation parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EstimatorConfig {
    #[serde(default)]
    pub strategy: EliminationStrategy,

    /// How far back drinks still count toward the live BAC
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            strategy: EliminationStrategy::default(),
            lookback_hours: default_lookback_hours(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            period_secs: default_period_secs(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IntakeConfig {
    #[serde(default = "default_daily_limit_cc")]
    pub daily_limit_cc: f64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            daily_limit_cc: default_daily_limit_cc(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("bacwatch")
}

fn default_user() -> String {
    "default".into()
}

fn default_lookback_hours() -> u32 {
    48
}

fn default_period_secs() -> u64 {
    crate::scheduler::DEFAULT_REFRESH_PERIOD.as_secs()
}

fn default_daily_limit_cc() -> f64 {
    crate::intake::DEFAULT_DAILY_LIMIT_CC
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("bacwatch").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject values the estimator or scheduler cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.refresh.period_secs == 0 {
            return Err(Error::Config("refresh.period_secs must be at least 1".into()));
        }
        if self.estimator.lookback_hours == 0
            || self.estimator.lookback_hours > MAX_LOOKBACK_HOURS
        {
            return Err(Error::Config(format!(
                "estimator.lookback_hours must be between 1 and {}, got {}",
                MAX_LOOKBACK_HOURS, self.estimator.lookback_hours
            )));
        }
        if !self.intake.daily_limit_cc.is_finite() || self.intake.daily_limit_cc <= 0.0 {
            return Err(Error::Config(format!(
                "intake.daily_limit_cc must be positive, got {}",
                self.intake.daily_limit_cc
            )));
        }
        UserId::new(self.user.default.clone())
            .map_err(|e| Error::Config(format!("user.default: {}", e)))?;
        Ok(())
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh.period_secs)
    }

    pub fn reading_options(&self) -> ReadingOptions {
        ReadingOptions {
            strategy: self.estimator.strategy,
            lookback_hours: self.estimator.lookback_hours,
            daily_limit_cc: self.intake.daily_limit_cc,
        }
    }
}
