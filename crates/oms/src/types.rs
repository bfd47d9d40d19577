//! Order domain types
//!
//! The status transition table lives here as a pure function on the enum
//! so it can be checked independently of persistence.

use chrono::{DateTime, Utc};
use common::{AccountId, OrderId, OrderMethod, Side, Symbol};
use serde::{Deserialize, Serialize};

use crate::error::{OmsError, OmsResult};

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Accepted and waiting for a matching price event
    Pending,
    /// Some quantity filled, remainder still working
    PartiallyFilled,
    /// Fully filled (terminal)
    Filled,
    /// Cancelled by the owner or the expiration pass (terminal)
    Cancelled,
    /// Rejected at submission (terminal)
    Rejected,
}

/// Events driving the order state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    /// A fill covering part of the remaining quantity
    PartialFill,
    /// A fill completing the order
    CompleteFill,
    /// A cancellation request
    Cancel,
    /// A rejection at submission time
    Reject,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }

    /// Check if an order in this status can still receive fills or cancels
    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::PartiallyFilled)
    }

    /// The transition table: `(status, event) -> status`
    ///
    /// Returns `None` for edges the state machine does not allow.
    pub fn transition(self, event: OrderEvent) -> Option<OrderStatus> {
        use OrderEvent::*;
        use OrderStatus::*;

        match (self, event) {
            (Pending, PartialFill) => Some(PartiallyFilled),
            (Pending, CompleteFill) => Some(Filled),
            (Pending, Cancel) => Some(Cancelled),
            (Pending, Reject) => Some(Rejected),
            (PartiallyFilled, PartialFill) => Some(PartiallyFilled),
            (PartiallyFilled, CompleteFill) => Some(Filled),
            (PartiallyFilled, Cancel) => Some(Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::PartiallyFilled => write!(f, "partially_filled"),
            OrderStatus::Filled => write!(f, "filled"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
            OrderStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Order in the system
///
/// Orders are never deleted; terminal orders remain as the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier
    pub order_id: OrderId,
    /// Account that placed the order
    pub account_id: AccountId,
    /// Stock being traded
    pub symbol: Symbol,
    /// Buy or sell
    pub side: Side,
    /// Execution method (limit/market)
    pub method: OrderMethod,
    /// Limit price (None for market orders)
    pub price: Option<f64>,
    /// Requested quantity of shares
    pub quantity: u32,
    /// Filled quantity
    pub filled_quantity: u32,
    /// Notional amount filled so far
    pub filled_amount: f64,
    /// Average fill price, defined once any quantity has filled
    pub avg_fill_price: Option<f64>,
    /// Total notional frozen at creation for limit orders
    pub total_amount: Option<f64>,
    /// Current order status
    pub status: OrderStatus,
    /// Reason for rejection (if rejected)
    pub reject_reason: Option<String>,
    /// Order creation timestamp
    pub created_at: DateTime<Utc>,
    /// When the order reached FILLED
    pub filled_at: Option<DateTime<Utc>>,
    /// When the order was cancelled
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency version, bumped by the store on every update
    pub version: u64,
}

impl Order {
    /// Create a new pending order
    pub fn new(
        account_id: AccountId,
        symbol: Symbol,
        side: Side,
        method: OrderMethod,
        price: Option<f64>,
        quantity: u32,
    ) -> Self {
        let now = Utc::now();
        let total_amount = match method {
            OrderMethod::Limit => price.map(|p| p * quantity as f64),
            OrderMethod::Market => None,
        };
        Self {
            order_id: OrderId::new(),
            account_id,
            symbol,
            side,
            method,
            price,
            quantity,
            filled_quantity: 0,
            filled_amount: 0.0,
            avg_fill_price: None,
            total_amount,
            status: OrderStatus::Pending,
            reject_reason: None,
            created_at: now,
            filled_at: None,
            cancelled_at: None,
            updated_at: now,
            version: 0,
        }
    }

    /// Get remaining quantity to fill
    pub fn remaining_quantity(&self) -> u32 {
        self.quantity.saturating_sub(self.filled_quantity)
    }

    /// Check if the order can still receive fills or cancels
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Check if order can be cancelled
    pub fn can_cancel(&self) -> bool {
        self.status.is_active()
    }

    /// Apply a fill to this order
    ///
    /// Increments filled quantity and notional, recomputes the average
    /// fill price, and advances the state machine. The fill timestamp is
    /// recorded when the order completes.
    pub fn apply_fill(&mut self, fill_quantity: u32, fill_price: f64) -> OmsResult<()> {
        if fill_quantity == 0 {
            return Err(OmsError::Validation("fill quantity must be positive".into()));
        }
        if fill_quantity > self.remaining_quantity() {
            return Err(OmsError::StateConflict(format!(
                "fill of {} exceeds remaining quantity {}",
                fill_quantity,
                self.remaining_quantity()
            )));
        }

        let event = if fill_quantity == self.remaining_quantity() {
            OrderEvent::CompleteFill
        } else {
            OrderEvent::PartialFill
        };
        let next = self.status.transition(event).ok_or_else(|| {
            OmsError::StateConflict(format!("cannot fill order in {} status", self.status))
        })?;

        let now = Utc::now();
        self.filled_quantity += fill_quantity;
        self.filled_amount += fill_price * fill_quantity as f64;
        self.avg_fill_price = Some(self.filled_amount / self.filled_quantity as f64);
        self.status = next;
        if next == OrderStatus::Filled {
            self.filled_at = Some(now);
        }
        self.updated_at = now;

        debug_assert!(self.filled_quantity <= self.quantity);
        Ok(())
    }

    /// Cancel this order
    pub fn cancel(&mut self) -> OmsResult<()> {
        let next = self.status.transition(OrderEvent::Cancel).ok_or_else(|| {
            OmsError::StateConflict(format!("cannot cancel order in {} status", self.status))
        })?;

        let now = Utc::now();
        self.status = next;
        self.cancelled_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Reject this order, recording the reason
    pub fn reject(&mut self, reason: impl Into<String>) -> OmsResult<()> {
        let next = self.status.transition(OrderEvent::Reject).ok_or_else(|| {
            OmsError::StateConflict(format!("cannot reject order in {} status", self.status))
        })?;

        self.status = next;
        self.reject_reason = Some(reason.into());
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit_buy(quantity: u32, price: f64) -> Order {
        Order::new(
            AccountId::new(),
            Symbol::parse("005930").unwrap(),
            Side::Buy,
            OrderMethod::Limit,
            Some(price),
            quantity,
        )
    }

    #[test]
    fn test_transition_table() {
        use OrderEvent::*;
        use OrderStatus::*;

        // Allowed edges
        assert_eq!(Pending.transition(PartialFill), Some(PartiallyFilled));
        assert_eq!(Pending.transition(CompleteFill), Some(Filled));
        assert_eq!(Pending.transition(Cancel), Some(Cancelled));
        assert_eq!(Pending.transition(Reject), Some(Rejected));
        assert_eq!(PartiallyFilled.transition(PartialFill), Some(PartiallyFilled));
        assert_eq!(PartiallyFilled.transition(CompleteFill), Some(Filled));
        assert_eq!(PartiallyFilled.transition(Cancel), Some(Cancelled));

        // Terminal states accept nothing
        for status in [Filled, Cancelled, Rejected] {
            for event in [PartialFill, CompleteFill, Cancel, Reject] {
                assert_eq!(status.transition(event), None);
            }
        }
    }

    #[test]
    fn test_new_limit_order_freezes_notional() {
        let order = limit_buy(10, 70_000.0);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, Some(700_000.0));
        assert_eq!(order.filled_quantity, 0);
        assert!(order.avg_fill_price.is_none());
    }

    #[test]
    fn test_apply_fill_full() {
        let mut order = limit_buy(10, 70_000.0);
        order.apply_fill(10, 70_000.0).unwrap();

        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.filled_quantity, 10);
        assert_eq!(order.avg_fill_price, Some(70_000.0));
        assert!(order.filled_at.is_some());
    }

    #[test]
    fn test_apply_fill_partial_then_complete() {
        let mut order = limit_buy(10, 70_000.0);
        order.apply_fill(4, 70_000.0).unwrap();

        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.remaining_quantity(), 6);
        assert!(order.filled_at.is_none());

        order.apply_fill(6, 71_000.0).unwrap();
        assert_eq!(order.status, OrderStatus::Filled);

        // Quantity-weighted average of the two fills
        let expected = (4.0 * 70_000.0 + 6.0 * 71_000.0) / 10.0;
        assert!((order.avg_fill_price.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_overfill_rejected() {
        let mut order = limit_buy(10, 70_000.0);
        let err = order.apply_fill(11, 70_000.0).unwrap_err();
        assert_eq!(err.code(), "STATE_CONFLICT");
        assert_eq!(order.filled_quantity, 0);
    }

    #[test]
    fn test_cancel_pending() {
        let mut order = limit_buy(10, 70_000.0);
        order.cancel().unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert!(order.cancelled_at.is_some());
    }

    #[test]
    fn test_reject_records_reason() {
        let mut order = limit_buy(10, 70_000.0);
        order.reject("account suspended").unwrap();

        assert_eq!(order.status, OrderStatus::Rejected);
        assert_eq!(order.reject_reason.as_deref(), Some("account suspended"));
        assert!(order.reject("again").is_err());
    }

    #[test]
    fn test_order_serialization_roundtrip() {
        let order = limit_buy(10, 70_000.0);
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();

        assert_eq!(back.order_id, order.order_id);
        assert_eq!(back.symbol, order.symbol);
        assert_eq!(back.status, order.status);
        assert_eq!(back.total_amount, order.total_amount);
    }

    #[test]
    fn test_cancel_filled_rejected() {
        let mut order = limit_buy(10, 70_000.0);
        order.apply_fill(10, 70_000.0).unwrap();

        let err = order.cancel().unwrap_err();
        assert_eq!(err.code(), "STATE_CONFLICT");
        assert_eq!(order.status, OrderStatus::Filled);
    }
}
