//! Execution notifications
//!
//! Each completed fill produces a textual notification intended for
//! downstream dispatch (push/chat systems). This core only formats and
//! logs it; delivery is a collaborator's job.

use ledger::TradeRecord;
use tracing::info;

/// Sink for execution notifications
pub trait Notifier: Send + Sync {
    /// Called once per settled fill
    fn execution(&self, trade: &TradeRecord);
}

/// Default notifier: formats the execution message and logs it
pub struct LogNotifier;

impl LogNotifier {
    /// Render the user-facing execution message for a trade
    pub fn format(trade: &TradeRecord) -> String {
        format!(
            "[{}] {} {} x{} @ {:.0} (commission {:.0}, tax {:.0}, cash after {:.0})",
            trade.symbol,
            trade.side,
            trade.symbol,
            trade.quantity,
            trade.price,
            trade.commission,
            trade.tax,
            trade.cash_after,
        )
    }
}

impl Notifier for LogNotifier {
    fn execution(&self, trade: &TradeRecord) {
        info!(
            account_id = %trade.account_id,
            trade_id = %trade.trade_id,
            message = %Self::format(trade),
            "Execution notification"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{AccountId, Side, Symbol, TradeId};

    #[test]
    fn test_format_mentions_symbol_and_quantity() {
        let trade = TradeRecord {
            trade_id: TradeId::new(),
            account_id: AccountId::new(),
            symbol: Symbol::parse("005930").unwrap(),
            side: Side::Buy,
            quantity: 10,
            price: 70_000.0,
            gross_amount: 700_000.0,
            commission: 105.0,
            tax: 0.0,
            cash_after: 299_895.0,
            holding_after: 10,
            memo: "buy 005930 x10 @70000".to_string(),
            executed_at: Utc::now(),
        };

        let message = LogNotifier::format(&trade);
        assert!(message.contains("005930"));
        assert!(message.contains("x10"));
        assert!(message.contains("70000"));
    }
}
