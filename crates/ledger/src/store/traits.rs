//! LedgerStore trait definition

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{AccountId, Symbol};

use crate::error::LedgerResult;
use crate::types::{CashBalance, Holding, TradeRecord};

/// LedgerStore trait - persistence boundary for account ledgers
///
/// Pure data access; fee arithmetic and settlement ordering live in the
/// settlement crate. Trade history is append-only: there is no update or
/// delete for [`TradeRecord`]s.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Get the cash balance row for an account
    async fn get_cash_balance(&self, account_id: AccountId) -> LedgerResult<Option<CashBalance>>;

    /// Upsert the cash balance row for an account
    async fn save_cash_balance(&self, balance: &CashBalance) -> LedgerResult<()>;

    /// Get the holding for an account and symbol
    async fn get_holding(
        &self,
        account_id: AccountId,
        symbol: &Symbol,
    ) -> LedgerResult<Option<Holding>>;

    /// Upsert a holding
    async fn save_holding(&self, holding: &Holding) -> LedgerResult<()>;

    /// Remove a holding (a position sold down to zero)
    async fn delete_holding(&self, account_id: AccountId, symbol: &Symbol) -> LedgerResult<()>;

    /// All holdings for an account
    async fn list_holdings(&self, account_id: AccountId) -> LedgerResult<Vec<Holding>>;

    /// Append one trade to the history
    async fn append_trade(&self, trade: &TradeRecord) -> LedgerResult<()>;

    /// Trade history for an account, oldest first
    async fn list_trades(&self, account_id: AccountId) -> LedgerResult<Vec<TradeRecord>>;

    /// Trade history for an account within `[start, end)`, oldest first
    async fn list_trades_between(
        &self,
        account_id: AccountId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> LedgerResult<Vec<TradeRecord>>;
}
