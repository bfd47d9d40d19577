//! In-memory order store implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{AccountId, OrderId, Side, Symbol};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{OmsError, OmsResult};
use crate::store::traits::OrderStore;
use crate::types::{Order, OrderStatus};

/// In-memory order store for testing and single-process deployments
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderStore {
    /// Create a new in-memory order store
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: Order) -> OmsResult<Order> {
        let mut orders = self.orders.write().unwrap();
        orders.insert(order.order_id, order.clone());
        Ok(order)
    }

    async fn get(&self, order_id: OrderId) -> OmsResult<Option<Order>> {
        let orders = self.orders.read().unwrap();
        Ok(orders.get(&order_id).cloned())
    }

    async fn update(&self, order: &Order) -> OmsResult<Order> {
        let mut orders = self.orders.write().unwrap();
        let stored = orders
            .get_mut(&order.order_id)
            .ok_or(OmsError::NotFound(order.order_id))?;

        if stored.version != order.version {
            return Err(OmsError::VersionConflict(order.order_id));
        }

        let mut next = order.clone();
        next.version += 1;
        *stored = next.clone();
        Ok(next)
    }

    async fn get_active_for_symbol(&self, symbol: &Symbol, side: Side) -> OmsResult<Vec<Order>> {
        let orders = self.orders.read().unwrap();
        Ok(orders
            .values()
            .filter(|o| o.symbol == *symbol && o.side == side && o.status.is_active())
            .cloned()
            .collect())
    }

    async fn get_active_created_before(&self, cutoff: DateTime<Utc>) -> OmsResult<Vec<Order>> {
        let orders = self.orders.read().unwrap();
        Ok(orders
            .values()
            .filter(|o| o.status.is_active() && o.created_at < cutoff)
            .cloned()
            .collect())
    }

    async fn get_active_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> OmsResult<Vec<Order>> {
        let orders = self.orders.read().unwrap();
        Ok(orders
            .values()
            .filter(|o| o.status.is_active() && o.created_at >= start && o.created_at < end)
            .cloned()
            .collect())
    }

    async fn list(
        &self,
        account_id: Option<AccountId>,
        symbol: Option<&Symbol>,
        statuses: Option<Vec<OrderStatus>>,
        created_in: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> OmsResult<Vec<Order>> {
        let orders = self.orders.read().unwrap();
        let mut result: Vec<Order> = orders.values().cloned().collect();

        if let Some(account_id) = account_id {
            result.retain(|o| o.account_id == account_id);
        }

        if let Some(symbol) = symbol {
            result.retain(|o| o.symbol == *symbol);
        }

        if let Some(ref statuses) = statuses {
            result.retain(|o| statuses.contains(&o.status));
        }

        if let Some((start, end)) = created_in {
            result.retain(|o| o.created_at >= start && o.created_at < end);
        }

        // Newest first
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(result)
    }
}
