//! Ledger domain types

use chrono::{DateTime, Utc};
use common::{AccountId, Side, Symbol, TradeId};
use serde::{Deserialize, Serialize};

/// Share position for one account and symbol
///
/// A holding whose quantity reaches zero is deleted, not retained.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    pub account_id: AccountId,
    pub symbol: Symbol,
    /// Shares currently held
    pub quantity: u32,
    /// Quantity-weighted average purchase price
    pub avg_price: f64,
    /// Total purchase cost of the current position
    pub total_cost: f64,
    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Holding {
    /// Open a new holding from a first buy fill
    pub fn new(account_id: AccountId, symbol: Symbol, quantity: u32, price: f64) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            symbol,
            quantity,
            avg_price: price,
            total_cost: price * quantity as f64,
            opened_at: now,
            updated_at: now,
        }
    }

    /// Add a buy fill, recomputing the weighted average purchase price
    pub fn add_fill(&mut self, fill_quantity: u32, fill_price: f64) {
        self.total_cost += fill_price * fill_quantity as f64;
        self.quantity += fill_quantity;
        self.avg_price = self.total_cost / self.quantity as f64;
        self.updated_at = Utc::now();
    }

    /// Reduce the position by a sell fill
    ///
    /// The cost basis shrinks proportionally at the average price; the
    /// average itself is unchanged by a sale.
    pub fn reduce(&mut self, quantity: u32) {
        let quantity = quantity.min(self.quantity);
        self.total_cost -= self.avg_price * quantity as f64;
        self.quantity -= quantity;
        if self.quantity == 0 {
            self.total_cost = 0.0;
        }
        self.updated_at = Utc::now();
    }

    /// True once the position is fully sold out
    pub fn is_exhausted(&self) -> bool {
        self.quantity == 0
    }

    /// Market value of the position at the given price
    pub fn market_value(&self, price: f64) -> f64 {
        price * self.quantity as f64
    }
}

/// Cash balance for one account
///
/// One logical "latest" row per account; every settlement adjusts
/// `available` by exactly the trade's net amount and persists the result
/// before the next trade on the same account is processed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashBalance {
    pub account_id: AccountId,
    /// Cash available for trading
    pub available: f64,
    /// Available cash plus the cost basis of all holdings
    pub total_assets: f64,
    pub updated_at: DateTime<Utc>,
}

impl CashBalance {
    /// Open a balance row with an initial deposit
    pub fn new(account_id: AccountId, available: f64) -> Self {
        Self {
            account_id,
            available,
            total_assets: available,
            updated_at: Utc::now(),
        }
    }

    /// Apply a settlement delta (negative for buys, positive for sells)
    /// and refresh the derived total from the holdings cost sum.
    pub fn settle(&mut self, delta: f64, holdings_cost: f64) {
        self.available += delta;
        self.total_assets = self.available + holdings_cost;
        self.updated_at = Utc::now();
    }
}

/// One executed fill, as recorded in the trade history
///
/// Records are immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade_id: TradeId,
    pub account_id: AccountId,
    pub symbol: Symbol,
    pub side: Side,
    /// Shares executed
    pub quantity: u32,
    /// Execution price
    pub price: f64,
    /// price x quantity
    pub gross_amount: f64,
    /// Commission charged on this fill
    pub commission: f64,
    /// Transaction tax (sell side only)
    pub tax: f64,
    /// Available cash after this trade settled
    pub cash_after: f64,
    /// Holding quantity after this trade settled
    pub holding_after: u32,
    /// Free-text memo
    pub memo: String,
    pub executed_at: DateTime<Utc>,
}
