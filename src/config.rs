use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

use crate::error::{PropError, Result};
use crate::props::generator::{GenerationStrategy, DEFAULT_SET_SIZE, MAX_SET_SIZE, MIN_SET_SIZE};
use crate::props::kelly::KellySizer;
use crate::props::pipeline::FilterConfig;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sizing: SizingConfig,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Sport assigned to props whose feed omits one
    #[serde(default = "default_sport")]
    pub default_sport: String,
}

fn default_sport() -> String {
    "nba".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sizing: SizingConfig::default(),
            filters: FilterConfig::default(),
            generator: GeneratorConfig::default(),
            logging: LoggingConfig::default(),
            default_sport: default_sport(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SizingConfig {
    /// Bankroll in currency units
    #[serde(default = "default_bankroll")]
    pub bankroll: Decimal,
    /// Kelly multiplier (e.g., 0.25 = quarter Kelly)
    #[serde(default = "default_kelly_fraction")]
    pub kelly_fraction: f64,
}

fn default_bankroll() -> Decimal {
    Decimal::new(1000, 0)
}

fn default_kelly_fraction() -> f64 {
    0.25
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            bankroll: default_bankroll(),
            kelly_fraction: default_kelly_fraction(),
        }
    }
}

impl SizingConfig {
    pub fn sizer(&self) -> KellySizer {
        KellySizer::new(self.bankroll, self.kelly_fraction)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub strategy: GenerationStrategy,
    /// Props per generated set (1-50)
    #[serde(default = "default_count")]
    pub count: usize,
    /// Rank the whole grouped set instead of the filtered output
    #[serde(default)]
    pub ignore_filters: bool,
}

fn default_count() -> usize {
    DEFAULT_SET_SIZE
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            strategy: GenerationStrategy::default(),
            count: default_count(),
            ignore_filters: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> std::result::Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("sizing.bankroll", "1000")?
            .set_default("sizing.kelly_fraction", 0.25)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("PROPEDGE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (PROPEDGE_SIZING__BANKROLL, etc.)
            .add_source(
                Environment::with_prefix("PROPEDGE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Check values the engine would silently degrade on
    pub fn validate(&self) -> Result<()> {
        if self.sizing.bankroll <= Decimal::ZERO {
            return Err(PropError::Validation(format!(
                "bankroll must be positive, got {}",
                self.sizing.bankroll
            )));
        }
        let fraction = self.sizing.kelly_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(PropError::Validation(format!(
                "kelly_fraction must be in (0, 1], got {}",
                fraction
            )));
        }
        if !(MIN_SET_SIZE..=MAX_SET_SIZE).contains(&self.generator.count) {
            return Err(PropError::Validation(format!(
                "generator.count must be in {}..={}, got {}",
                MIN_SET_SIZE, MAX_SET_SIZE, self.generator.count
            )));
        }
        if let Some(filter) = &self.filters.projection_diff {
            if filter.threshold < 0.0 {
                return Err(PropError::Validation(format!(
                    "projection_diff.threshold must not be negative, got {}",
                    filter.threshold
                )));
            }
        }
        Ok(())
    }
}
