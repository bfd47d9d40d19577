//! The atomic fill + ledger settlement unit

use std::sync::Arc;

use common::{OrderId, Side, Symbol, TradeId};
use ledger::{CashBalance, Holding, LedgerStore, TradeRecord};
use observability::EngineMetrics;
use oms::{FillExecutor, OmsError, OmsResult, Order, OrderStore};
use tracing::{error, info, warn};

use crate::error::{SettlementError, SettlementResult};
use crate::fees::{FeeSchedule, Fees};
use crate::locks::AccountLocks;
use crate::notify::Notifier;

/// Holding mutation computed during validation, written only after every
/// check has passed.
enum StagedHolding {
    Save(Holding),
    Delete(Symbol),
}

impl StagedHolding {
    fn quantity_after(&self) -> u32 {
        match self {
            StagedHolding::Save(h) => h.quantity,
            StagedHolding::Delete(_) => 0,
        }
    }
}

/// Applies a fill and its ledger effects as one unit
///
/// Sequence per fill, under the account's lock:
///
/// 1. reload the order and require it to still be active
/// 2. assess commission and tax on the full remaining quantity
/// 3. validate cash (buy) or holding quantity (sell) and stage the new
///    ledger state - no writes yet
/// 4. persist the order fill through the version CAS (a concurrent
///    cancel makes this lose cleanly, with no ledger effect)
/// 5. write holding, cash balance and the trade-history entry; if any of
///    these fail the order write is reverted before the error surfaces
pub struct SettlementLedger {
    orders: Arc<dyn OrderStore>,
    ledger: Arc<dyn LedgerStore>,
    fees: FeeSchedule,
    locks: AccountLocks,
    notifier: Arc<dyn Notifier>,
    metrics: EngineMetrics,
}

impl SettlementLedger {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        ledger: Arc<dyn LedgerStore>,
        fees: FeeSchedule,
        notifier: Arc<dyn Notifier>,
        metrics: EngineMetrics,
    ) -> Self {
        Self {
            orders,
            ledger,
            fees,
            locks: AccountLocks::new(),
            notifier,
            metrics,
        }
    }

    /// Fill the order's entire remaining quantity at `execution_price`
    /// and settle the ledger effects.
    pub async fn settle_fill(
        &self,
        order_id: OrderId,
        execution_price: f64,
    ) -> SettlementResult<Order> {
        let peek = self
            .orders
            .get(order_id)
            .await?
            .ok_or(SettlementError::OrderNotFound(order_id))?;

        let _account_guard = self.locks.acquire(peek.account_id).await;

        // Reload under the lock; the order may have changed while we waited
        let mut order = self
            .orders
            .get(order_id)
            .await?
            .ok_or(SettlementError::OrderNotFound(order_id))?;
        if !order.is_active() {
            return Err(SettlementError::OrderNotActive(order_id));
        }

        let fill_quantity = order.remaining_quantity();
        let fees = self.fees.assess(order.side, execution_price, fill_quantity);

        let mut cash = self
            .ledger
            .get_cash_balance(order.account_id)
            .await?
            .ok_or(SettlementError::AccountNotFound(order.account_id))?;

        let staged = self
            .validate_and_stage(&order, fill_quantity, execution_price, &fees, &cash)
            .await?;

        // Order write first: the version CAS resolves a race with a
        // concurrent cancel to exactly one winner.
        let snapshot = order.clone();
        order.apply_fill(fill_quantity, execution_price)?;
        let stored = match self.orders.update(&order).await {
            Ok(stored) => stored,
            Err(OmsError::VersionConflict(_)) => {
                return Err(SettlementError::OrderNotActive(order_id))
            }
            Err(e) => return Err(e.into()),
        };

        match self
            .apply_ledger(&stored, staged, &mut cash, &fees, fill_quantity, execution_price)
            .await
        {
            Ok(trade) => {
                self.metrics.order_filled();
                info!(
                    order_id = %stored.order_id,
                    trade_id = %trade.trade_id,
                    symbol = %trade.symbol,
                    side = %trade.side,
                    quantity = trade.quantity,
                    price = trade.price,
                    "Fill settled"
                );
                self.notifier.execution(&trade);
                Ok(stored)
            }
            Err(e) => {
                self.metrics.settlement_failure();
                self.revert_fill(order_id, &snapshot).await;
                Err(e)
            }
        }
    }

    /// Validate the fill against the ledgers and compute the holding
    /// state to write. Performs no writes.
    async fn validate_and_stage(
        &self,
        order: &Order,
        fill_quantity: u32,
        execution_price: f64,
        fees: &Fees,
        cash: &CashBalance,
    ) -> SettlementResult<StagedHolding> {
        match order.side {
            Side::Buy => {
                if cash.available < fees.buy_cost() {
                    return Err(SettlementError::InsufficientCash {
                        order_id: order.order_id,
                        required: fees.buy_cost(),
                        available: cash.available,
                    });
                }
                let holding = self
                    .ledger
                    .get_holding(order.account_id, &order.symbol)
                    .await?;
                Ok(match holding {
                    Some(mut h) => {
                        h.add_fill(fill_quantity, execution_price);
                        StagedHolding::Save(h)
                    }
                    None => StagedHolding::Save(Holding::new(
                        order.account_id,
                        order.symbol.clone(),
                        fill_quantity,
                        execution_price,
                    )),
                })
            }
            Side::Sell => {
                let holding = self
                    .ledger
                    .get_holding(order.account_id, &order.symbol)
                    .await?;
                match holding {
                    Some(mut h) if h.quantity >= fill_quantity => {
                        h.reduce(fill_quantity);
                        Ok(if h.is_exhausted() {
                            StagedHolding::Delete(order.symbol.clone())
                        } else {
                            StagedHolding::Save(h)
                        })
                    }
                    other => {
                        let held = other.map(|h| h.quantity).unwrap_or(0);
                        warn!(
                            order_id = %order.order_id,
                            symbol = %order.symbol,
                            requested = fill_quantity,
                            held,
                            "Sell fill exceeds holding, settlement aborted"
                        );
                        Err(SettlementError::InsufficientHolding {
                            order_id: order.order_id,
                            requested: fill_quantity,
                            held,
                        })
                    }
                }
            }
        }
    }

    async fn apply_ledger(
        &self,
        order: &Order,
        staged: StagedHolding,
        cash: &mut CashBalance,
        fees: &Fees,
        fill_quantity: u32,
        execution_price: f64,
    ) -> SettlementResult<TradeRecord> {
        let holding_after = staged.quantity_after();

        match &staged {
            StagedHolding::Save(holding) => self.ledger.save_holding(holding).await?,
            StagedHolding::Delete(symbol) => {
                self.ledger.delete_holding(order.account_id, symbol).await?
            }
        }

        let holdings_cost: f64 = self
            .ledger
            .list_holdings(order.account_id)
            .await?
            .iter()
            .map(|h| h.total_cost)
            .sum();
        cash.settle(fees.net_cash_delta(order.side), holdings_cost);
        self.ledger.save_cash_balance(cash).await?;

        let trade = TradeRecord {
            trade_id: TradeId::new(),
            account_id: order.account_id,
            symbol: order.symbol.clone(),
            side: order.side,
            quantity: fill_quantity,
            price: execution_price,
            gross_amount: fees.gross,
            commission: fees.commission,
            tax: fees.tax,
            cash_after: cash.available,
            holding_after,
            memo: format!(
                "{} {} x{} @{:.0}",
                order.side, order.symbol, fill_quantity, execution_price
            ),
            executed_at: chrono::Utc::now(),
        };
        self.ledger.append_trade(&trade).await?;

        Ok(trade)
    }

    /// Compensating rollback: restore the order to its pre-fill state
    /// after a ledger write failed.
    async fn revert_fill(&self, order_id: OrderId, snapshot: &Order) {
        loop {
            let current = match self.orders.get(order_id).await {
                Ok(Some(order)) => order,
                Ok(None) | Err(_) => {
                    error!(order_id = %order_id, "Unable to reload order for fill revert");
                    return;
                }
            };

            let mut restored = snapshot.clone();
            restored.version = current.version;
            match self.orders.update(&restored).await {
                Ok(_) => {
                    warn!(order_id = %order_id, "Fill reverted after ledger failure");
                    return;
                }
                Err(OmsError::VersionConflict(_)) => continue,
                Err(e) => {
                    error!(order_id = %order_id, error = %e, "Fill revert failed");
                    return;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl FillExecutor for SettlementLedger {
    async fn execute_fill(&self, order_id: OrderId, execution_price: f64) -> OmsResult<Order> {
        self.settle_fill(order_id, execution_price)
            .await
            .map_err(|e| match e {
                SettlementError::Order(e) => e,
                other => OmsError::Settlement(other.to_string()),
            })
    }
}
