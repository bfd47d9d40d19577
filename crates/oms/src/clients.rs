//! Collaborator traits consumed by the order manager
//!
//! The OMS does not settle fills itself: the fill-and-settle primitive is
//! provided by the settlement crate and injected behind [`FillExecutor`],
//! and the quote needed for synchronous market-order execution comes from
//! the matching side behind [`QuoteSource`].

use async_trait::async_trait;
use common::{OrderId, Symbol};

use crate::error::OmsResult;
use crate::types::Order;

/// Executes the atomic fill + ledger settlement unit for an order.
///
/// Implementations must either apply the order mutation, the holding and
/// cash mutations, and the trade-history append together, or apply none
/// of them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FillExecutor: Send + Sync {
    /// Fill the order's entire remaining quantity at `execution_price`.
    async fn execute_fill(&self, order_id: OrderId, execution_price: f64) -> OmsResult<Order>;
}

/// Provides the current quoted price for a symbol.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Get the last quoted price for a symbol, if one has been seen.
    async fn last_price(&self, symbol: &Symbol) -> Option<f64>;
}
