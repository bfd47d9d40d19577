//! Last-quote board
//!
//! Records the most recent quoted price per symbol as events stream in.
//! The order manager reads it through the [`QuoteSource`] seam to price
//! market orders at submission time.

use async_trait::async_trait;
use common::Symbol;
use oms::QuoteSource;
use std::collections::HashMap;
use std::sync::RwLock;

/// Last seen price per symbol
pub struct QuoteBoard {
    prices: RwLock<HashMap<Symbol, f64>>,
}

impl QuoteBoard {
    pub fn new() -> Self {
        Self {
            prices: RwLock::new(HashMap::new()),
        }
    }

    /// Record the latest quote for a symbol
    pub fn record(&self, symbol: &Symbol, price: f64) {
        let mut prices = self.prices.write().unwrap();
        prices.insert(symbol.clone(), price);
    }

    /// Get the latest quote for a symbol
    pub fn get(&self, symbol: &Symbol) -> Option<f64> {
        let prices = self.prices.read().unwrap();
        prices.get(symbol).copied()
    }
}

impl Default for QuoteBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteSource for QuoteBoard {
    async fn last_price(&self, symbol: &Symbol) -> Option<f64> {
        self.get(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_and_read_back() {
        let board = QuoteBoard::new();
        let symbol = Symbol::parse("005930").unwrap();

        assert_eq!(board.last_price(&symbol).await, None);

        board.record(&symbol, 70_000.0);
        assert_eq!(board.last_price(&symbol).await, Some(70_000.0));

        // Later quotes replace earlier ones
        board.record(&symbol, 70_500.0);
        assert_eq!(board.get(&symbol), Some(70_500.0));
    }
}
