//! Commission and tax assessment

use common::Side;
use config::FeeConfig;
use serde::Serialize;

/// Fee schedule applied to every fill
///
/// Commission applies to both sides with a currency-unit floor; the
/// transaction tax applies to sells only.
#[derive(Debug, Clone)]
pub struct FeeSchedule {
    commission_rate: f64,
    commission_min: f64,
    sell_tax_rate: f64,
}

/// Assessed amounts for one fill
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Fees {
    /// price x quantity
    pub gross: f64,
    /// Commission charged on this fill
    pub commission: f64,
    /// Transaction tax (zero on buys)
    pub tax: f64,
}

impl Fees {
    /// Net movement of the account's cash: negative for buys
    /// (gross plus charges paid out), positive for sells (gross minus
    /// charges received).
    pub fn net_cash_delta(&self, side: Side) -> f64 {
        match side {
            Side::Buy => -(self.gross + self.commission + self.tax),
            Side::Sell => self.gross - self.commission - self.tax,
        }
    }

    /// Total cash a buy requires
    pub fn buy_cost(&self) -> f64 {
        self.gross + self.commission + self.tax
    }
}

impl FeeSchedule {
    pub fn new(config: &FeeConfig) -> Self {
        Self {
            commission_rate: config.commission_rate,
            commission_min: config.commission_min,
            sell_tax_rate: config.sell_tax_rate,
        }
    }

    /// Assess commission and tax for a fill
    pub fn assess(&self, side: Side, price: f64, quantity: u32) -> Fees {
        let gross = price * quantity as f64;
        let commission = (gross * self.commission_rate).max(self.commission_min);
        let tax = match side {
            Side::Sell => gross * self.sell_tax_rate,
            Side::Buy => 0.0,
        };
        Fees {
            gross,
            commission,
            tax,
        }
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::new(&FeeConfig::default())
    }
}
