// Configuration management for the market simulation

use crate::core::universe::Universe;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub months: u32,
    pub ticks_per_month: u32,
    pub starting_cash: f64,
    /// Fixed seed for a replayable run; `None` draws from entropy
    #[serde(default)]
    pub seed: Option<u64>,
    /// Wall-clock length of one tick when driven in real time
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceConfig {
    pub max_move_up: f64,       // Largest random-walk step upwards
    pub max_move_down: f64,     // Largest random-walk step downwards
    pub history_size: usize,    // Samples kept per security for charting
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    pub probability: f64,       // Chance of a random headline per interval
    pub interval_ticks: u32,    // Cadence of the random headline check
    pub min_per_month: u32,
    pub max_per_month: u32,
    pub impact_delay_ticks: u32,
    pub impact_duration_ticks: u32,
    pub magnitude_unit: f64,    // Fraction of price moved per tier
    pub magnitude_tiers: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub enable_news_logging: bool,
    pub enable_trade_logging: bool,
    pub enable_price_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub price: PriceConfig,
    pub news: NewsConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub universe: Universe,
}

fn default_tick_millis() -> u64 { 1000 }

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            months: 12,
            ticks_per_month: 60,
            starting_cash: 10_000.0,
            seed: None,
            tick_millis: default_tick_millis(),
        }
    }
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            max_move_up: 5.0,
            max_move_down: 5.0,
            history_size: 200,
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            probability: 0.25,
            interval_ticks: 5,
            min_per_month: 2,
            max_per_month: 3,
            impact_delay_ticks: 10,
            impact_duration_ticks: 15,
            magnitude_unit: 0.20,   // 20% of price per tier
            magnitude_tiers: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_news_logging: true,
            enable_trade_logging: true,
            enable_price_logging: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            price: PriceConfig::default(),
            news: NewsConfig::default(),
            logging: LoggingConfig::default(),
            universe: Universe::default(),
        }
    }
}

impl SimulationConfig {
    pub fn total_ticks(&self) -> u64 {
        self.months as u64 * self.ticks_per_month as u64
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(e.to_string()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, content)
            .map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }

    /// Load configuration from file, or create default if file doesn't exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            let config = Self::default();
            config.to_file(&path)?;
            tracing::info!("📁 Created default config file: {}", path.as_ref().display());
            Ok(config)
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.months == 0 {
            return Err(ConfigError::Validation("months must be greater than 0".to_string()));
        }

        if sim.ticks_per_month < 2 {
            return Err(ConfigError::Validation("ticks_per_month must be at least 2".to_string()));
        }

        if !sim.starting_cash.is_finite() || sim.starting_cash < 0.0 {
            return Err(ConfigError::Validation("starting_cash must be non-negative".to_string()));
        }

        if sim.tick_millis == 0 {
            return Err(ConfigError::Validation("tick_millis must be greater than 0".to_string()));
        }

        let price = &self.price;
        if !(price.max_move_up >= 0.0 && price.max_move_down >= 0.0) {
            return Err(ConfigError::Validation("price move bounds must be non-negative".to_string()));
        }

        if price.history_size == 0 {
            return Err(ConfigError::Validation("history_size must be greater than 0".to_string()));
        }

        let news = &self.news;
        if !(0.0..=1.0).contains(&news.probability) {
            return Err(ConfigError::Validation("news probability must be within [0, 1]".to_string()));
        }

        if news.interval_ticks == 0 {
            return Err(ConfigError::Validation("interval_ticks must be greater than 0".to_string()));
        }

        if news.min_per_month == 0 || news.min_per_month > news.max_per_month {
            return Err(ConfigError::Validation(
                "news per month range must satisfy 1 <= min_per_month <= max_per_month".to_string(),
            ));
        }

        // Triggers are drawn without replacement from offsets 1..ticks_per_month-1
        if news.max_per_month > sim.ticks_per_month - 1 {
            return Err(ConfigError::Validation(format!(
                "max_per_month ({}) exceeds the {} available trigger offsets",
                news.max_per_month,
                sim.ticks_per_month - 1
            )));
        }

        if news.impact_duration_ticks == 0 {
            return Err(ConfigError::Validation("impact_duration_ticks must be greater than 0".to_string()));
        }

        if !news.magnitude_unit.is_finite() || news.magnitude_unit < 0.0 {
            return Err(ConfigError::Validation("magnitude_unit must be non-negative".to_string()));
        }

        if news.magnitude_tiers == 0 {
            return Err(ConfigError::Validation("magnitude_tiers must be greater than 0".to_string()));
        }

        self.universe
            .validate()
            .map_err(ConfigError::Validation)?;

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(String),

    #[error("Failed to write config file: {0}")]
    FileWrite(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
