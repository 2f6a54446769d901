// Cash, holdings and trade validation

use crate::core::market::Market;
use crate::core::security::Security;
use crate::core::types::{BuyQuantity, SellQuantity, TradeSide};
use crate::error::{MarketError, MarketResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Portfolio {
    starting_cash: f64,
    cash: f64,
    holdings: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub tick: u64,
    pub security_id: String,
    pub side: TradeSide,
    pub shares: u64,
    pub price: f64,
    pub total: f64,
    pub cash_after: f64,
    pub timestamp: DateTime<Utc>,
}

impl Portfolio {
    pub fn new(starting_cash: f64) -> Self {
        let starting_cash = starting_cash.max(0.0);
        Self {
            starting_cash,
            cash: starting_cash,
            holdings: BTreeMap::new(),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn starting_cash(&self) -> f64 {
        self.starting_cash
    }

    /// Shares held; absent securities hold zero
    pub fn shares(&self, security_id: &str) -> u64 {
        self.holdings.get(security_id).copied().unwrap_or(0)
    }

    /// Non-zero positions, ordered by security id
    pub fn holdings(&self) -> impl Iterator<Item = (&str, u64)> {
        self.holdings
            .iter()
            .filter(|&(_, &shares)| shares > 0)
            .map(|(id, &shares)| (id.as_str(), shares))
    }

    pub fn buy(&mut self, tick: u64, security: &Security, quantity: BuyQuantity) -> MarketResult<TradeRecord> {
        let price = security.price();

        let shares = match quantity {
            BuyQuantity::Max => {
                // The quotient can round up across a whole number
                let mut affordable = (self.cash / price).floor().max(0.0) as u64;
                while affordable > 0 && affordable as f64 * price > self.cash {
                    affordable -= 1;
                }
                if affordable == 0 {
                    return Err(MarketError::InsufficientFunds {
                        required: price,
                        available: self.cash,
                    });
                }
                affordable
            }
            BuyQuantity::Shares(n) => {
                if n <= 0 {
                    return Err(MarketError::InvalidQuantity(format!("cannot buy {} shares", n)));
                }
                n as u64
            }
        };

        let cost = shares as f64 * price;
        if cost > self.cash {
            return Err(MarketError::InsufficientFunds {
                required: cost,
                available: self.cash,
            });
        }

        self.cash = (self.cash - cost).max(0.0);
        *self.holdings.entry(security.id().to_string()).or_insert(0) += shares;

        Ok(self.record(tick, security, TradeSide::Buy, shares, cost))
    }

    pub fn sell(&mut self, tick: u64, security: &Security, quantity: SellQuantity) -> MarketResult<TradeRecord> {
        let owned = self.shares(security.id());
        if owned == 0 {
            return Err(MarketError::NoPosition(security.id().to_string()));
        }

        let shares = match quantity {
            SellQuantity::All => owned,
            SellQuantity::Shares(n) => {
                if n <= 0 {
                    return Err(MarketError::InvalidQuantity(format!("cannot sell {} shares", n)));
                }
                let n = n as u64;
                if n > owned {
                    return Err(MarketError::InsufficientShares {
                        security: security.id().to_string(),
                        requested: n,
                        owned,
                    });
                }
                n
            }
        };

        let proceeds = shares as f64 * security.price();
        self.cash += proceeds;

        let remaining = owned - shares;
        if remaining == 0 {
            self.holdings.remove(security.id());
        } else {
            self.holdings.insert(security.id().to_string(), remaining);
        }

        Ok(self.record(tick, security, TradeSide::Sell, shares, proceeds))
    }

    /// Cash plus every holding marked at its current price
    pub fn net_worth(&self, market: &Market) -> f64 {
        self.cash + self.invested_value(market)
    }

    pub fn invested_value(&self, market: &Market) -> f64 {
        self.holdings
            .iter()
            .filter_map(|(id, &shares)| market.price_of(id).map(|price| shares as f64 * price))
            .sum()
    }

    fn record(&self, tick: u64, security: &Security, side: TradeSide, shares: u64, total: f64) -> TradeRecord {
        TradeRecord {
            tick,
            security_id: security.id().to_string(),
            side,
            shares,
            price: security.price(),
            total,
            cash_after: self.cash,
            timestamp: Utc::now(),
        }
    }
}
