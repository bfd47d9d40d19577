//! Settlement error types

use common::{AccountId, OrderId};
use ledger::LedgerError;
use oms::OmsError;
use thiserror::Error;

/// Errors that can occur while settling a fill
///
/// These are caught and logged by the matching batch loop; they never
/// halt the batch, and the settlement unit guarantees no half-applied
/// fill is left behind when one is returned.
#[derive(Error, Debug)]
pub enum SettlementError {
    /// Order does not exist
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Order was filled or cancelled before settlement could start
    #[error("Order is no longer active: {0}")]
    OrderNotActive(OrderId),

    /// Sell fill requested more shares than the account holds
    #[error("Insufficient holding for order {order_id}: requested {requested}, held {held}")]
    InsufficientHolding {
        order_id: OrderId,
        requested: u32,
        held: u32,
    },

    /// Buy fill costs more than the account's available cash
    #[error("Insufficient cash for order {order_id}: required {required}, available {available}")]
    InsufficientCash {
        order_id: OrderId,
        required: f64,
        available: f64,
    },

    /// No cash balance row exists for the account
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Order store failure
    #[error(transparent)]
    Order(#[from] OmsError),

    /// Ledger store failure
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Result type for settlement operations
pub type SettlementResult<T> = std::result::Result<T, SettlementError>;
