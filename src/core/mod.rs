// Core market model: calendar, instruments, portfolio

pub mod types;
pub mod universe;
pub mod security;
pub mod market;
pub mod clock;
pub mod portfolio;

// Re-export commonly used types
pub use types::{BuyQuantity, SellQuantity, Movement, TradeSide, PRICE_FLOOR, month_name};
pub use universe::{Universe, SecuritySpec, GroupSpec};
pub use security::{Security, PricePoint, PriceWalk};
pub use market::Market;
pub use clock::{Clock, ClockState, ClockTick};
pub use portfolio::{Portfolio, TradeRecord};
