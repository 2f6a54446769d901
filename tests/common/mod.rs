// Common test utilities and helpers
#![allow(dead_code)]

use market_sim::{Config, SimulationEngine, TickReport};
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a seeded, quiet configuration with a short run
pub fn create_test_config(seed: u64) -> Config {
    let mut config = Config::default();
    config.simulation.seed = Some(seed);
    config.simulation.months = 3;
    config.simulation.ticks_per_month = 30;
    config.logging.enable_news_logging = false;
    config.logging.enable_trade_logging = false;
    config.logging.enable_price_logging = false;
    config
}

/// Same as `create_test_config` but prices only move through news impacts
pub fn create_news_only_config(seed: u64) -> Config {
    let mut config = create_test_config(seed);
    config.price.max_move_up = 0.0;
    config.price.max_move_down = 0.0;
    config.news.probability = 0.0;
    config
}

pub fn create_engine(config: Config) -> SimulationEngine {
    SimulationEngine::new(config).expect("Failed to create engine")
}

/// Advance until the run ends, keeping every tick report
pub fn drive_to_end(engine: &mut SimulationEngine) -> Vec<TickReport> {
    let mut reports = Vec::new();
    while !engine.is_ended() {
        reports.push(engine.advance_tick().expect("Tick failed before the run ended"));
    }
    reports
}

/// Create a temporary directory for config files
pub fn create_temp_config_path() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    (temp_dir, config_path)
}
