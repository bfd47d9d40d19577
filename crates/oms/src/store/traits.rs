//! OrderStore trait definition

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{AccountId, OrderId, Side, Symbol};

use crate::error::OmsResult;
use crate::types::{Order, OrderStatus};

/// OrderStore trait - defines the interface for order storage
///
/// This trait allows different storage implementations (in-memory, SQL, ...)
/// to be swapped without changing the business logic.
///
/// `update` is a compare-and-swap on [`Order::version`]: it fails with
/// `OmsError::VersionConflict` when the stored version differs from the
/// caller's copy, and bumps the version on success. Every mutation of a
/// persisted order goes through this check, which is what lets the
/// expiration pass and the fill pipeline race safely.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order
    async fn create(&self, order: Order) -> OmsResult<Order>;

    /// Get an order by ID
    async fn get(&self, order_id: OrderId) -> OmsResult<Option<Order>>;

    /// Update an existing order (version CAS)
    ///
    /// Returns the stored order with its bumped version.
    async fn update(&self, order: &Order) -> OmsResult<Order>;

    /// Active (pending / partially filled) orders for one symbol and side
    async fn get_active_for_symbol(&self, symbol: &Symbol, side: Side) -> OmsResult<Vec<Order>>;

    /// Active orders created strictly before the cutoff
    async fn get_active_created_before(&self, cutoff: DateTime<Utc>) -> OmsResult<Vec<Order>>;

    /// Active orders created in `[start, end)`
    async fn get_active_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> OmsResult<Vec<Order>>;

    /// List orders with filters; `created_in` bounds creation time to
    /// `[start, end)`
    async fn list(
        &self,
        account_id: Option<AccountId>,
        symbol: Option<&Symbol>,
        statuses: Option<Vec<OrderStatus>>,
        created_in: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> OmsResult<Vec<Order>>;
}
