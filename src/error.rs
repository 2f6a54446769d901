//! Unified error handling for the market simulation
//!
//! Trade validation failures are local and recoverable: the engine reports
//! them to the caller and the market log, and keeps running.

use crate::config::ConfigError;
use thiserror::Error;

/// Main error type for the simulation engine
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("Invalid share amount: {0}")]
    InvalidQuantity(String),

    #[error("Insufficient cash: required ${required:.2}, available ${available:.2}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("Insufficient shares of {security}: requested {requested}, owned {owned}")]
    InsufficientShares {
        security: String,
        requested: u64,
        owned: u64,
    },

    #[error("No position in {0}")]
    NoPosition(String),

    #[error("No security selected")]
    NoSelection,

    #[error("The run has ended")]
    RunEnded,

    #[error("Unknown security: {0}")]
    UnknownSecurity(String),

    #[error("Invalid universe: {0}")]
    InvalidUniverse(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl MarketError {
    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            MarketError::InvalidQuantity(_)
            | MarketError::InsufficientFunds { .. }
            | MarketError::InsufficientShares { .. }
            | MarketError::NoPosition(_)
            | MarketError::NoSelection
            | MarketError::UnknownSecurity(_) => "trade",
            MarketError::RunEnded => "lifecycle",
            MarketError::InvalidUniverse(_) | MarketError::Config(_) => "setup",
        }
    }

    /// Trade rejections are reported to the player; the run continues
    pub fn is_trade_rejection(&self) -> bool {
        matches!(self.category(), "trade" | "lifecycle")
    }
}

/// Result type alias using MarketError
pub type MarketResult<T> = Result<T, MarketError>;
