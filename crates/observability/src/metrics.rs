//! Prometheus metrics infrastructure
//!
//! This module provides utilities for initializing Prometheus metrics
//! and the counter set shared by the order and settlement pipeline.

use metrics::{counter, Counter};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize the Prometheus metrics exporter
///
/// This starts an HTTP listener on the specified port that exposes metrics
/// at the `/metrics` endpoint.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics listener started");
    Ok(())
}

/// Order pipeline metrics
///
/// One instance is shared across the order manager, matching engine and
/// expiration scheduler.
///
/// # Metrics
///
/// * `orders_submitted_total` - Orders accepted by the order manager
/// * `orders_filled_total` - Orders that reached FILLED
/// * `orders_cancelled_total` - User and scheduler cancellations
/// * `orders_expired_total` - Cancellations issued by the expiration passes
/// * `settlement_failures_total` - Fills whose settlement step was aborted
#[derive(Clone)]
pub struct EngineMetrics {
    orders_submitted: Counter,
    orders_filled: Counter,
    orders_cancelled: Counter,
    orders_expired: Counter,
    settlement_failures: Counter,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self {
            orders_submitted: counter!("orders_submitted_total"),
            orders_filled: counter!("orders_filled_total"),
            orders_cancelled: counter!("orders_cancelled_total"),
            orders_expired: counter!("orders_expired_total"),
            settlement_failures: counter!("settlement_failures_total"),
        }
    }

    pub fn order_submitted(&self) {
        self.orders_submitted.increment(1);
    }

    pub fn order_filled(&self) {
        self.orders_filled.increment(1);
    }

    pub fn order_cancelled(&self) {
        self.orders_cancelled.increment(1);
    }

    pub fn order_expired(&self) {
        self.orders_expired.increment(1);
    }

    pub fn settlement_failure(&self) {
        self.settlement_failures.increment(1);
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}
