//! Order Manager - core business logic for order lifecycle handling

use std::sync::Arc;

use common::{AccountId, OrderId, OrderMethod, Side, Symbol};
use config::TradingConfig;
use observability::EngineMetrics;
use tracing::{info, warn};

use crate::clients::{FillExecutor, QuoteSource};
use crate::error::{OmsError, OmsResult};
use crate::store::OrderStore;
use crate::types::Order;

/// Order Manager - owns submission, validation and cancellation
///
/// Fills are delegated to the injected [`FillExecutor`] so the order
/// mutation and the ledger settlement happen as one unit.
pub struct OrderManager {
    store: Arc<dyn OrderStore>,
    fill_executor: Arc<dyn FillExecutor>,
    quote_source: Arc<dyn QuoteSource>,
    trading: TradingConfig,
    metrics: EngineMetrics,
}

impl OrderManager {
    /// Create a new OrderManager
    pub fn new(
        store: Arc<dyn OrderStore>,
        fill_executor: Arc<dyn FillExecutor>,
        quote_source: Arc<dyn QuoteSource>,
        trading: TradingConfig,
        metrics: EngineMetrics,
    ) -> Self {
        Self {
            store,
            fill_executor,
            quote_source,
            trading,
            metrics,
        }
    }

    /// Submit a new order
    ///
    /// Flow:
    /// 1. Validate symbol, quantity and price
    /// 2. Persist as PENDING (limit notional frozen at creation)
    /// 3. Market orders with an available quote fill synchronously through
    ///    the settlement primitive; without a quote they stay PENDING
    pub async fn submit(
        &self,
        account_id: AccountId,
        symbol: &str,
        side: Side,
        method: OrderMethod,
        quantity: u32,
        price: Option<f64>,
    ) -> OmsResult<Order> {
        let symbol = Symbol::parse(symbol).map_err(|e| OmsError::Validation(e.to_string()))?;
        self.validate_quantity(quantity)?;
        let price = self.validate_price(method, price)?;

        let order = self
            .store
            .create(Order::new(account_id, symbol, side, method, price, quantity))
            .await?;
        self.metrics.order_submitted();

        info!(
            order_id = %order.order_id,
            account_id = %account_id,
            symbol = %order.symbol,
            side = %side,
            method = %method,
            quantity,
            price = ?price,
            "Order accepted"
        );

        if method == OrderMethod::Market {
            return self.fill_market_order(order).await;
        }

        Ok(order)
    }

    /// Cancel an order on behalf of its owner
    ///
    /// Fails with a state conflict if the order is not owned by the caller
    /// or is no longer in a cancellable state. Retries on version conflicts
    /// so a concurrent fill or expiration resolves to exactly one outcome.
    pub async fn cancel(&self, account_id: AccountId, order_id: OrderId) -> OmsResult<Order> {
        loop {
            let mut order = self
                .store
                .get(order_id)
                .await?
                .ok_or(OmsError::NotFound(order_id))?;

            if order.account_id != account_id {
                return Err(OmsError::StateConflict(format!(
                    "order {} does not belong to the caller",
                    order_id
                )));
            }

            order.cancel()?;

            match self.store.update(&order).await {
                Ok(stored) => {
                    self.metrics.order_cancelled();
                    info!(order_id = %order_id, "Order cancelled");
                    return Ok(stored);
                }
                Err(OmsError::VersionConflict(_)) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Cancel an order if it is still active; a no-op on terminal orders
    ///
    /// This is the idempotent variant used by the expiration passes, where
    /// an order filled or cancelled between selection and this call is not
    /// an error.
    pub async fn cancel_if_active(
        &self,
        order_id: OrderId,
        reason: &str,
    ) -> OmsResult<Option<Order>> {
        loop {
            let mut order = self
                .store
                .get(order_id)
                .await?
                .ok_or(OmsError::NotFound(order_id))?;

            if !order.is_active() {
                return Ok(None);
            }

            order.cancel()?;

            match self.store.update(&order).await {
                Ok(stored) => {
                    self.metrics.order_cancelled();
                    info!(order_id = %order_id, reason, "Order cancelled");
                    return Ok(Some(stored));
                }
                Err(OmsError::VersionConflict(_)) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    async fn fill_market_order(&self, order: Order) -> OmsResult<Order> {
        match self.quote_source.last_price(&order.symbol).await {
            Some(quote) => {
                info!(
                    order_id = %order.order_id,
                    symbol = %order.symbol,
                    quote,
                    "Filling market order at submission quote"
                );
                self.fill_executor.execute_fill(order.order_id, quote).await
            }
            None => {
                warn!(
                    order_id = %order.order_id,
                    symbol = %order.symbol,
                    "No quote available for market order, leaving pending"
                );
                Ok(order)
            }
        }
    }

    fn validate_quantity(&self, quantity: u32) -> OmsResult<()> {
        if quantity == 0 {
            return Err(OmsError::Validation("quantity must be positive".into()));
        }
        if quantity > self.trading.max_order_quantity {
            return Err(OmsError::Validation(format!(
                "quantity {} exceeds the per-order ceiling {}",
                quantity, self.trading.max_order_quantity
            )));
        }
        Ok(())
    }

    fn validate_price(&self, method: OrderMethod, price: Option<f64>) -> OmsResult<Option<f64>> {
        match (method, price) {
            (OrderMethod::Limit, Some(price)) => {
                if !price.is_finite() || price <= 0.0 {
                    return Err(OmsError::Validation(format!(
                        "limit price must be positive, got {}",
                        price
                    )));
                }
                let tick = self.trading.price_tick;
                let steps = price / tick;
                if (steps - steps.round()).abs() > 1e-9 {
                    return Err(OmsError::Validation(format!(
                        "limit price {} is not aligned to the {} tick",
                        price, tick
                    )));
                }
                Ok(Some(price))
            }
            (OrderMethod::Limit, None) => {
                Err(OmsError::Validation("limit orders require a price".into()))
            }
            (OrderMethod::Market, None) => Ok(None),
            (OrderMethod::Market, Some(_)) => Err(OmsError::Validation(
                "market orders must not carry a price".into(),
            )),
        }
    }
}
