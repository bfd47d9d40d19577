//! Matching engine core
//!
//! Candidate selection and the fill decision for one market price event.

use std::cmp::Ordering;
use std::sync::Arc;

use common::Side;
use ledger::LedgerStore;
use oms::{FillExecutor, OmsResult, Order, OrderStore};
use ordered_float::OrderedFloat;
use settlement::FeeSchedule;
use tracing::{debug, info, warn};

use crate::event::MarketPriceEvent;

/// What one match pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Active orders considered on the event's symbol
    pub evaluated: usize,
    /// Orders filled and settled
    pub filled: usize,
    /// Candidates whose price crossed but which were skipped
    /// (failed a gate or failed settlement)
    pub skipped: usize,
}

/// Decides which pending orders a price event fills
///
/// Every fillable order is executed for its entire remaining quantity at
/// the event's quoted price through the injected [`FillExecutor`]. An
/// error settling one order is logged and the pass continues with the
/// next candidate.
pub struct MatchingEngine {
    orders: Arc<dyn OrderStore>,
    ledger: Arc<dyn LedgerStore>,
    executor: Arc<dyn FillExecutor>,
    fees: FeeSchedule,
}

impl MatchingEngine {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        ledger: Arc<dyn LedgerStore>,
        executor: Arc<dyn FillExecutor>,
        fees: FeeSchedule,
    ) -> Self {
        Self {
            orders,
            ledger,
            executor,
            fees,
        }
    }

    /// Run one match pass for a price event
    pub async fn handle_event(&self, event: &MarketPriceEvent) -> OmsResult<MatchOutcome> {
        let mut outcome = MatchOutcome::default();

        let mut buys = self
            .orders
            .get_active_for_symbol(&event.symbol, Side::Buy)
            .await?;
        rank_candidates(&mut buys, Side::Buy);

        let mut sells = self
            .orders
            .get_active_for_symbol(&event.symbol, Side::Sell)
            .await?;
        rank_candidates(&mut sells, Side::Sell);

        outcome.evaluated = buys.len() + sells.len();

        for order in buys.iter().chain(sells.iter()) {
            if !price_crosses(order, event.current_price) {
                continue;
            }

            if !self.passes_gates(order, event.current_price).await? {
                outcome.skipped += 1;
                continue;
            }

            match self
                .executor
                .execute_fill(order.order_id, event.current_price)
                .await
            {
                Ok(filled) => {
                    debug!(
                        order_id = %filled.order_id,
                        symbol = %event.symbol,
                        price = event.current_price,
                        "Order filled by price event"
                    );
                    outcome.filled += 1;
                }
                Err(e) => {
                    // One order's settlement failure never aborts the batch
                    warn!(
                        order_id = %order.order_id,
                        symbol = %event.symbol,
                        error = %e,
                        "Settlement failed, continuing with next candidate"
                    );
                    outcome.skipped += 1;
                }
            }
        }

        if outcome.filled > 0 || outcome.skipped > 0 {
            info!(
                symbol = %event.symbol,
                price = event.current_price,
                evaluated = outcome.evaluated,
                filled = outcome.filled,
                skipped = outcome.skipped,
                "Match pass complete"
            );
        }

        Ok(outcome)
    }

    /// Advisory pre-checks at decision time: buying power for buys,
    /// holding quantity for sells. The settlement unit re-checks both
    /// authoritatively; gating here keeps orders from reaching FILLED
    /// with their ledger effect skipped.
    async fn passes_gates(&self, order: &Order, current_price: f64) -> OmsResult<bool> {
        let remaining = order.remaining_quantity();
        match order.side {
            Side::Buy => {
                let cash = self
                    .ledger
                    .get_cash_balance(order.account_id)
                    .await
                    .map_err(|e| oms::OmsError::Storage(e.to_string()))?;
                let required = self.fees.assess(Side::Buy, current_price, remaining).buy_cost();
                match cash {
                    Some(cash) if cash.available >= required => Ok(true),
                    Some(cash) => {
                        warn!(
                            order_id = %order.order_id,
                            required,
                            available = cash.available,
                            "Buy skipped: insufficient buying power"
                        );
                        Ok(false)
                    }
                    None => {
                        warn!(
                            order_id = %order.order_id,
                            account_id = %order.account_id,
                            "Buy skipped: no cash balance for account"
                        );
                        Ok(false)
                    }
                }
            }
            Side::Sell => {
                let held = self
                    .ledger
                    .get_holding(order.account_id, &order.symbol)
                    .await
                    .map_err(|e| oms::OmsError::Storage(e.to_string()))?
                    .map(|h| h.quantity)
                    .unwrap_or(0);
                if held >= remaining {
                    Ok(true)
                } else {
                    warn!(
                        order_id = %order.order_id,
                        symbol = %order.symbol,
                        requested = remaining,
                        held,
                        "Sell skipped: insufficient holding at decision time"
                    );
                    Ok(false)
                }
            }
        }
    }
}

/// True when the quoted price satisfies the order's limit condition.
/// Market orders left pending (no quote at submission) fill at any price.
fn price_crosses(order: &Order, current_price: f64) -> bool {
    match (order.side, order.price) {
        (_, None) => true,
        (Side::Buy, Some(limit)) => current_price <= limit,
        (Side::Sell, Some(limit)) => current_price >= limit,
    }
}

/// Order candidates best-first: market orders ahead of limit orders,
/// buys by descending limit, sells by ascending limit, oldest first
/// within a price.
fn rank_candidates(orders: &mut [Order], side: Side) {
    orders.sort_by(|a, b| match (a.price, b.price) {
        (None, None) => a.created_at.cmp(&b.created_at),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => {
            let by_price = match side {
                Side::Buy => OrderedFloat(y).cmp(&OrderedFloat(x)),
                Side::Sell => OrderedFloat(x).cmp(&OrderedFloat(y)),
            };
            by_price.then(a.created_at.cmp(&b.created_at))
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{AccountId, OrderId, OrderMethod, Symbol};
    use ledger::{CashBalance, Holding, InMemoryLedgerStore};
    use observability::EngineMetrics;
    use oms::{InMemoryOrderStore, OmsError, OrderStatus};
    use settlement::{LogNotifier, SettlementLedger};

    struct Fixture {
        orders: Arc<InMemoryOrderStore>,
        ledger: Arc<InMemoryLedgerStore>,
        engine: MatchingEngine,
    }

    fn fixture() -> Fixture {
        let orders = Arc::new(InMemoryOrderStore::new());
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let settlement = Arc::new(SettlementLedger::new(
            orders.clone(),
            ledger.clone(),
            FeeSchedule::default(),
            Arc::new(LogNotifier),
            EngineMetrics::new(),
        ));
        let engine = MatchingEngine::new(
            orders.clone(),
            ledger.clone(),
            settlement,
            FeeSchedule::default(),
        );
        Fixture {
            orders,
            ledger,
            engine,
        }
    }

    fn symbol() -> Symbol {
        Symbol::parse("005930").unwrap()
    }

    async fn seed_account(fx: &Fixture, cash: f64) -> AccountId {
        let account_id = AccountId::new();
        fx.ledger
            .save_cash_balance(&CashBalance::new(account_id, cash))
            .await
            .unwrap();
        account_id
    }

    async fn limit_order(
        fx: &Fixture,
        account_id: AccountId,
        side: Side,
        quantity: u32,
        price: f64,
    ) -> Order {
        fx.orders
            .create(Order::new(
                account_id,
                symbol(),
                side,
                OrderMethod::Limit,
                Some(price),
                quantity,
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_limit_buy_fills_when_price_reaches_limit() {
        // Scenario: LIMIT BUY 005930 x10 @70,000, event at 70,000
        let fx = fixture();
        let account_id = seed_account(&fx, 1_000_000.0).await;
        let order = limit_order(&fx, account_id, Side::Buy, 10, 70_000.0).await;

        let outcome = fx
            .engine
            .handle_event(&MarketPriceEvent::new(symbol(), 70_000.0))
            .await
            .unwrap();
        assert_eq!(outcome.filled, 1);

        let order = fx.orders.get(order.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.filled_quantity, 10);
        assert_eq!(order.avg_fill_price, Some(70_000.0));

        let holding = fx
            .ledger
            .get_holding(account_id, &symbol())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(holding.quantity, 10);

        let commission = (700_000.0 * 0.000_15_f64).max(15.0);
        let cash = fx.ledger.get_cash_balance(account_id).await.unwrap().unwrap();
        assert!((cash.available - (1_000_000.0 - 700_000.0 - commission)).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_buy_executes_at_quote_below_limit() {
        // Favorable-to-buyer execution: filled at the quote, not the limit
        let fx = fixture();
        let account_id = seed_account(&fx, 1_000_000.0).await;
        let order = limit_order(&fx, account_id, Side::Buy, 10, 70_000.0).await;

        fx.engine
            .handle_event(&MarketPriceEvent::new(symbol(), 69_000.0))
            .await
            .unwrap();

        let order = fx.orders.get(order.order_id).await.unwrap().unwrap();
        assert_eq!(order.avg_fill_price, Some(69_000.0));
    }

    #[tokio::test]
    async fn test_buy_does_not_fill_above_limit() {
        let fx = fixture();
        let account_id = seed_account(&fx, 1_000_000.0).await;
        let order = limit_order(&fx, account_id, Side::Buy, 10, 70_000.0).await;

        let outcome = fx
            .engine
            .handle_event(&MarketPriceEvent::new(symbol(), 70_100.0))
            .await
            .unwrap();
        assert_eq!(outcome, MatchOutcome { evaluated: 1, filled: 0, skipped: 0 });

        let order = fx.orders.get(order.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_sell_fills_at_or_above_limit() {
        let fx = fixture();
        let account_id = seed_account(&fx, 0.0).await;
        fx.ledger
            .save_holding(&Holding::new(account_id, symbol(), 10, 60_000.0))
            .await
            .unwrap();
        let order = limit_order(&fx, account_id, Side::Sell, 10, 70_000.0).await;

        // Below the limit: nothing happens
        fx.engine
            .handle_event(&MarketPriceEvent::new(symbol(), 69_900.0))
            .await
            .unwrap();
        assert_eq!(
            fx.orders.get(order.order_id).await.unwrap().unwrap().status,
            OrderStatus::Pending
        );

        // Above the limit: fills at the quote
        fx.engine
            .handle_event(&MarketPriceEvent::new(symbol(), 70_500.0))
            .await
            .unwrap();
        let order = fx.orders.get(order.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.avg_fill_price, Some(70_500.0));
    }

    #[tokio::test]
    async fn test_best_bidder_fills_first() {
        // Two buys, cash only covers one: the higher limit wins
        let fx = fixture();
        let account_id = seed_account(&fx, 750_000.0).await;
        let low = limit_order(&fx, account_id, Side::Buy, 10, 70_500.0).await;
        let high = limit_order(&fx, account_id, Side::Buy, 10, 71_000.0).await;

        let outcome = fx
            .engine
            .handle_event(&MarketPriceEvent::new(symbol(), 70_000.0))
            .await
            .unwrap();
        assert_eq!(outcome.filled, 1);
        assert_eq!(outcome.skipped, 1);

        assert_eq!(
            fx.orders.get(high.order_id).await.unwrap().unwrap().status,
            OrderStatus::Filled
        );
        assert_eq!(
            fx.orders.get(low.order_id).await.unwrap().unwrap().status,
            OrderStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_pending_market_order_fills_on_next_event() {
        let fx = fixture();
        let account_id = seed_account(&fx, 1_000_000.0).await;
        let order = fx
            .orders
            .create(Order::new(
                account_id,
                symbol(),
                Side::Buy,
                OrderMethod::Market,
                None,
                5,
            ))
            .await
            .unwrap();

        fx.engine
            .handle_event(&MarketPriceEvent::new(symbol(), 71_000.0))
            .await
            .unwrap();

        let order = fx.orders.get(order.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.avg_fill_price, Some(71_000.0));
    }

    #[tokio::test]
    async fn test_sell_short_of_holding_is_gated_not_filled() {
        // Holding of 3, sell of 5: the order must not reach FILLED with
        // its ledger effect skipped - it stays pending and nothing moves.
        let fx = fixture();
        let account_id = seed_account(&fx, 0.0).await;
        fx.ledger
            .save_holding(&Holding::new(account_id, symbol(), 3, 60_000.0))
            .await
            .unwrap();
        let order = limit_order(&fx, account_id, Side::Sell, 5, 70_000.0).await;

        let outcome = fx
            .engine
            .handle_event(&MarketPriceEvent::new(symbol(), 70_000.0))
            .await
            .unwrap();
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.filled, 0);

        let order = fx.orders.get(order.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.filled_quantity, 0);

        let holding = fx
            .ledger
            .get_holding(account_id, &symbol())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(holding.quantity, 3);
        assert!(fx.ledger.list_trades(account_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_settlement_error_does_not_abort_the_batch() {
        struct FailingExecutor;

        #[async_trait::async_trait]
        impl FillExecutor for FailingExecutor {
            async fn execute_fill(&self, order_id: OrderId, _price: f64) -> OmsResult<Order> {
                Err(OmsError::Settlement(format!("injected failure for {}", order_id)))
            }
        }

        let orders = Arc::new(InMemoryOrderStore::new());
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let engine = MatchingEngine::new(
            orders.clone(),
            ledger.clone(),
            Arc::new(FailingExecutor),
            FeeSchedule::default(),
        );

        let account_id = AccountId::new();
        ledger
            .save_cash_balance(&CashBalance::new(account_id, 10_000_000.0))
            .await
            .unwrap();
        for price in [70_000.0, 70_500.0, 71_000.0] {
            orders
                .create(Order::new(
                    account_id,
                    symbol(),
                    Side::Buy,
                    OrderMethod::Limit,
                    Some(price),
                    1,
                ))
                .await
                .unwrap();
        }

        let outcome = engine
            .handle_event(&MarketPriceEvent::new(symbol(), 69_000.0))
            .await
            .unwrap();

        // Every candidate was attempted despite each one failing
        assert_eq!(outcome.evaluated, 3);
        assert_eq!(outcome.skipped, 3);
        assert_eq!(outcome.filled, 0);
    }

    #[tokio::test]
    async fn test_events_for_other_symbols_do_not_match() {
        let fx = fixture();
        let account_id = seed_account(&fx, 1_000_000.0).await;
        let order = limit_order(&fx, account_id, Side::Buy, 10, 70_000.0).await;

        let other = Symbol::parse("035720").unwrap();
        let outcome = fx
            .engine
            .handle_event(&MarketPriceEvent::new(other, 1.0))
            .await
            .unwrap();
        assert_eq!(outcome.evaluated, 0);

        assert_eq!(
            fx.orders.get(order.order_id).await.unwrap().unwrap().status,
            OrderStatus::Pending
        );
    }

    #[test]
    fn test_rank_candidates_ordering() {
        let account_id = AccountId::new();
        let mut buys: Vec<Order> = [70_000.0, 71_000.0, 70_500.0]
            .iter()
            .map(|p| {
                Order::new(
                    account_id,
                    Symbol::parse("005930").unwrap(),
                    Side::Buy,
                    OrderMethod::Limit,
                    Some(*p),
                    1,
                )
            })
            .collect();
        rank_candidates(&mut buys, Side::Buy);
        let prices: Vec<f64> = buys.iter().map(|o| o.price.unwrap()).collect();
        assert_eq!(prices, vec![71_000.0, 70_500.0, 70_000.0]);

        let mut sells: Vec<Order> = [70_000.0, 69_000.0, 69_500.0]
            .iter()
            .map(|p| {
                Order::new(
                    account_id,
                    Symbol::parse("005930").unwrap(),
                    Side::Sell,
                    OrderMethod::Limit,
                    Some(*p),
                    1,
                )
            })
            .collect();
        rank_candidates(&mut sells, Side::Sell);
        let prices: Vec<f64> = sells.iter().map(|o| o.price.unwrap()).collect();
        assert_eq!(prices, vec![69_000.0, 69_500.0, 70_000.0]);
    }
}
