// Common types used across the simulation

use crate::error::MarketError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// No security may ever trade below this price
pub const PRICE_FLOOR: f64 = 1.0;

pub const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

pub fn month_name(index: u32) -> &'static str {
    MONTH_NAMES.get(index as usize).copied().unwrap_or("Unknown")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Movement {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Share count for a buy command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuyQuantity {
    Shares(i64),
    Max,    // As many whole shares as cash allows
}

/// Share count for a sell command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellQuantity {
    Shares(i64),
    All,    // The entire holding
}

fn parse_share_count(input: &str) -> Result<i64, MarketError> {
    let trimmed = input.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| MarketError::InvalidQuantity(format!("'{}' is not a whole number of shares", trimmed)))
}

impl FromStr for BuyQuantity {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("max") {
            return Ok(BuyQuantity::Max);
        }
        parse_share_count(s).map(BuyQuantity::Shares)
    }
}

impl FromStr for SellQuantity {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(SellQuantity::All);
        }
        parse_share_count(s).map(SellQuantity::Shares)
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "Bought"),
            TradeSide::Sell => write!(f, "Sold"),
        }
    }
}
