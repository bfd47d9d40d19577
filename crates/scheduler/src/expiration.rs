//! The expiration scheduler

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use config::SchedulerConfig;
use observability::EngineMetrics;
use oms::{Order, OrderManager, OrderStore};
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Cancels orders left unresolved past their trading day
///
/// Pass bodies take the reference date as a parameter; the `run` loop
/// supplies the current local date so tests can drive the passes with
/// explicit dates instead of a clock.
pub struct ExpirationScheduler {
    orders: Arc<dyn OrderStore>,
    manager: Arc<OrderManager>,
    config: SchedulerConfig,
    metrics: EngineMetrics,
}

impl ExpirationScheduler {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        manager: Arc<OrderManager>,
        config: SchedulerConfig,
        metrics: EngineMetrics,
    ) -> Self {
        Self {
            orders,
            manager,
            config,
            metrics,
        }
    }

    /// Run the scheduler. Blocks until shutdown is signalled.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            enabled = self.config.enabled,
            run_on_startup = self.config.run_on_startup,
            "Expiration scheduler started"
        );

        if self.config.run_on_startup {
            match self.reconcile_startup(Local::now().date_naive()).await {
                Ok(cancelled) => info!(cancelled, "Startup reconciliation complete"),
                Err(e) => error!(error = %e, "Startup reconciliation failed"),
            }
        }

        if !self.config.enabled {
            info!("Daily expiration pass disabled, scheduler idle");
            return;
        }

        loop {
            let wait = duration_until_next_local_midnight();
            debug!(seconds = wait.as_secs(), "Sleeping until next daily pass");

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    let today = Local::now().date_naive();
                    match self.expire_previous_day(today).await {
                        Ok(cancelled) => info!(%today, cancelled, "Daily expiration pass complete"),
                        Err(e) => error!(%today, error = %e, "Daily expiration pass failed"),
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Expiration scheduler shutting down");
                        return;
                    }
                }
            }
        }
    }

    /// Daily pass: cancel active orders created during the calendar day
    /// before `today` (local time).
    pub async fn expire_previous_day(&self, today: NaiveDate) -> oms::OmsResult<usize> {
        let start = local_day_start(today - Days::new(1));
        let end = local_day_start(today);

        let stale = self.orders.get_active_created_between(start, end).await?;
        info!(%today, selected = stale.len(), "Expiring previous day's unresolved orders");

        Ok(self.cancel_each(stale).await)
    }

    /// Startup pass: cancel active orders created strictly before `today`
    /// (local time), covering daily passes missed while the service was
    /// down.
    pub async fn reconcile_startup(&self, today: NaiveDate) -> oms::OmsResult<usize> {
        let cutoff = local_day_start(today);

        let stale = self.orders.get_active_created_before(cutoff).await?;
        info!(%today, selected = stale.len(), "Reconciling orders unresolved before today");

        Ok(self.cancel_each(stale).await)
    }

    /// Cancel every selected order, logging per-order outcomes. One
    /// order's failure never aborts the batch.
    async fn cancel_each(&self, stale: Vec<Order>) -> usize {
        let mut cancelled = 0;

        for order in stale {
            match self
                .manager
                .cancel_if_active(order.order_id, "expired")
                .await
            {
                Ok(Some(_)) => {
                    cancelled += 1;
                    self.metrics.order_expired();
                }
                Ok(None) => {
                    debug!(order_id = %order.order_id, "Order already terminal, nothing to expire");
                }
                Err(e) => {
                    error!(order_id = %order.order_id, error = %e, "Failed to expire order");
                }
            }
        }

        cancelled
    }
}

/// Local midnight of `date`, in UTC. Falls back to treating midnight as
/// UTC when the local timezone has no unambiguous midnight that day.
fn local_day_start(date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

fn duration_until_next_local_midnight() -> Duration {
    let tomorrow = Local::now().date_naive() + Days::new(1);
    let next = local_day_start(tomorrow);
    next.signed_duration_since(Utc::now())
        .to_std()
        .map(|d| d + Duration::from_secs(1))
        .unwrap_or(Duration::from_secs(60))
}
