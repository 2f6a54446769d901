// Market Simulation Library
//
// A tick-driven synthetic stock market with delayed news impacts and a
// single-player portfolio

pub mod core;
pub mod config;
pub mod error;       // Unified error handling
pub mod simulation;
pub mod progress;    // Progress bars for headless runs
pub mod sweep;       // Parallel seeded runs

// Re-export core market types
pub use core::{
    Clock, ClockState, ClockTick, Market, Portfolio, Security, PricePoint, PriceWalk, TradeRecord,
    Universe, SecuritySpec, GroupSpec, BuyQuantity, SellQuantity, Movement, TradeSide, PRICE_FLOOR,
};

// Re-export error types
pub use error::{MarketError, MarketResult};

// Re-export configuration
pub use config::{Config, SimulationConfig, PriceConfig, NewsConfig, LoggingConfig, ConfigError};

// Re-export simulation components
pub use simulation::{
    SimulationEngine, SimulationEvent, RunPhase, TickReport, FinalReport, Quote, NetWorthSample,
    MarketLogEntry, ImpactScheduler, PendingImpact, AppliedImpact, NewsGenerator, NewsEvent,
    NewsSource, Sentiment,
};

pub use progress::RunProgress;
pub use sweep::{SweepSummary, run_sweep};
