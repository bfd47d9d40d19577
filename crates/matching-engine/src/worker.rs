//! Event consumer task
//!
//! A single worker drains the market event channel, so events for one
//! symbol are always handled in the order they arrived.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use crate::engine::MatchingEngine;
use crate::event::MarketPriceEvent;
use crate::quotes::QuoteBoard;

/// Consumes [`MarketPriceEvent`]s: records the quote, then runs a match
/// pass for the symbol.
pub struct MatchingWorker {
    engine: Arc<MatchingEngine>,
    board: Arc<QuoteBoard>,
    events: mpsc::Receiver<MarketPriceEvent>,
}

impl MatchingWorker {
    pub fn new(
        engine: Arc<MatchingEngine>,
        board: Arc<QuoteBoard>,
        events: mpsc::Receiver<MarketPriceEvent>,
    ) -> Self {
        Self {
            engine,
            board,
            events,
        }
    }

    /// Run until the event channel closes or shutdown is signalled
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("Matching worker started");

        loop {
            tokio::select! {
                maybe_event = self.events.recv() => {
                    match maybe_event {
                        Some(event) => {
                            self.board.record(&event.symbol, event.current_price);
                            if let Err(e) = self.engine.handle_event(&event).await {
                                error!(
                                    symbol = %event.symbol,
                                    error = %e,
                                    "Match pass failed"
                                );
                            }
                        }
                        None => {
                            info!("Event channel closed, matching worker stopping");
                            return;
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Matching worker shutting down");
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{AccountId, Side, Symbol};
    use ledger::{CashBalance, InMemoryLedgerStore, LedgerStore};
    use observability::EngineMetrics;
    use oms::{InMemoryOrderStore, Order, OrderStatus, OrderStore};
    use settlement::{FeeSchedule, LogNotifier, SettlementLedger};

    #[tokio::test]
    async fn test_worker_processes_events_and_updates_board() {
        let orders = Arc::new(InMemoryOrderStore::new());
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let settlement = Arc::new(SettlementLedger::new(
            orders.clone(),
            ledger.clone(),
            FeeSchedule::default(),
            Arc::new(LogNotifier),
            EngineMetrics::new(),
        ));
        let engine = Arc::new(MatchingEngine::new(
            orders.clone(),
            ledger.clone(),
            settlement,
            FeeSchedule::default(),
        ));
        let board = Arc::new(QuoteBoard::new());

        let account_id = AccountId::new();
        ledger
            .save_cash_balance(&CashBalance::new(account_id, 1_000_000.0))
            .await
            .unwrap();
        let symbol = Symbol::parse("005930").unwrap();
        let order = orders
            .create(Order::new(
                account_id,
                symbol.clone(),
                Side::Buy,
                common::OrderMethod::Limit,
                Some(70_000.0),
                10,
            ))
            .await
            .unwrap();

        let (tx, rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = MatchingWorker::new(engine, board.clone(), rx);
        let handle = tokio::spawn(worker.run(shutdown_rx));

        tx.send(MarketPriceEvent::new(symbol.clone(), 70_000.0))
            .await
            .unwrap();

        // Closing the channel drains the event, then stops the worker
        drop(tx);
        handle.await.unwrap();
        drop(shutdown_tx);

        assert_eq!(board.get(&symbol), Some(70_000.0));
        let order = orders.get(order.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
    }

    #[tokio::test]
    async fn test_worker_stops_on_shutdown_signal() {
        let orders = Arc::new(InMemoryOrderStore::new());
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let settlement = Arc::new(SettlementLedger::new(
            orders.clone(),
            ledger.clone(),
            FeeSchedule::default(),
            Arc::new(LogNotifier),
            EngineMetrics::new(),
        ));
        let engine = Arc::new(MatchingEngine::new(
            orders,
            ledger,
            settlement,
            FeeSchedule::default(),
        ));

        let (_tx, rx) = mpsc::channel::<MarketPriceEvent>(16);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = MatchingWorker::new(engine, Arc::new(QuoteBoard::new()), rx);
        let handle = tokio::spawn(worker.run(shutdown_rx));

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
