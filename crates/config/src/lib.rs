//! Configuration for OpenBrokerage
//!
//! The brokerage is configured from a single YAML file. Loading performs
//! environment-variable substitution, then YAML parsing; validation is a
//! separate pass producing a [`ValidationReport`] so callers can decide
//! how to surface warnings.

use serde::{Deserialize, Serialize};

pub mod parser;
pub mod substitution;
pub mod validator;

pub use parser::*;
pub use substitution::*;
pub use validator::*;

/// Top-level configuration for a brokerage deployment
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrokerageConfig {
    pub brokerage: BrokerageInfo,
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub fees: FeeConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Deployment metadata
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrokerageInfo {
    pub name: String,
    pub description: String,
    pub version: String,
}

/// Order acceptance limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TradingConfig {
    /// Maximum quantity accepted on a single order
    #[serde(default = "default_max_order_quantity")]
    pub max_order_quantity: u32,
    /// Price increment limit orders must align to
    #[serde(default = "default_price_tick")]
    pub price_tick: f64,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            max_order_quantity: default_max_order_quantity(),
            price_tick: default_price_tick(),
        }
    }
}

/// Commission and tax schedule applied at settlement
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeeConfig {
    /// Commission rate applied to gross amount, both sides
    #[serde(default = "default_commission_rate")]
    pub commission_rate: f64,
    /// Commission floor in currency units
    #[serde(default = "default_commission_min")]
    pub commission_min: f64,
    /// Transaction tax rate, sell side only
    #[serde(default = "default_sell_tax_rate")]
    pub sell_tax_rate: f64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            commission_rate: default_commission_rate(),
            commission_min: default_commission_min(),
            sell_tax_rate: default_sell_tax_rate(),
        }
    }
}

/// Matching engine tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchingConfig {
    /// Capacity of the market event channel feeding the matching worker
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

/// Expiration scheduler behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Whether the daily expiration pass runs at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Whether the startup reconciliation pass runs on boot
    #[serde(default = "default_enabled")]
    pub run_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            run_on_startup: true,
        }
    }
}

fn default_max_order_quantity() -> u32 {
    1_000_000
}

fn default_price_tick() -> f64 {
    1.0
}

fn default_commission_rate() -> f64 {
    0.000_15
}

fn default_commission_min() -> f64 {
    15.0
}

fn default_sell_tax_rate() -> f64 {
    0.002_3
}

fn default_event_channel_capacity() -> usize {
    1024
}

fn default_enabled() -> bool {
    true
}
