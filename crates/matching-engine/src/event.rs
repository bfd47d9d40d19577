//! Market data event types

use chrono::{DateTime, Utc};
use common::Symbol;
use serde::{Deserialize, Serialize};

/// One side of the order book depth carried on a price event
///
/// Depth is informational: matching fills against the quoted price, not
/// against these levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub quantity: u32,
}

/// Price event published by the market-data collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketPriceEvent {
    /// Stock the event is for
    pub symbol: Symbol,
    /// Current quoted price
    pub current_price: f64,
    /// Ask depth snapshot
    pub asks: Vec<PriceLevel>,
    /// Bid depth snapshot
    pub bids: Vec<PriceLevel>,
    /// When the event was produced
    pub observed_at: DateTime<Utc>,
}

impl MarketPriceEvent {
    /// Event carrying only a quoted price, no depth
    pub fn new(symbol: Symbol, current_price: f64) -> Self {
        Self {
            symbol,
            current_price,
            asks: Vec::new(),
            bids: Vec::new(),
            observed_at: Utc::now(),
        }
    }
}
