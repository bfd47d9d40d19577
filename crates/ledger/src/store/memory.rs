//! In-memory ledger store implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{AccountId, Symbol};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::LedgerResult;
use crate::store::traits::LedgerStore;
use crate::types::{CashBalance, Holding, TradeRecord};

/// In-memory ledger store for testing and single-process deployments
pub struct InMemoryLedgerStore {
    balances: RwLock<HashMap<AccountId, CashBalance>>,
    holdings: RwLock<HashMap<(AccountId, Symbol), Holding>>,
    trades: RwLock<Vec<TradeRecord>>,
}

impl InMemoryLedgerStore {
    /// Create a new in-memory ledger store
    pub fn new() -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
            holdings: RwLock::new(HashMap::new()),
            trades: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn get_cash_balance(&self, account_id: AccountId) -> LedgerResult<Option<CashBalance>> {
        let balances = self.balances.read().unwrap();
        Ok(balances.get(&account_id).cloned())
    }

    async fn save_cash_balance(&self, balance: &CashBalance) -> LedgerResult<()> {
        let mut balances = self.balances.write().unwrap();
        balances.insert(balance.account_id, balance.clone());
        Ok(())
    }

    async fn get_holding(
        &self,
        account_id: AccountId,
        symbol: &Symbol,
    ) -> LedgerResult<Option<Holding>> {
        let holdings = self.holdings.read().unwrap();
        Ok(holdings.get(&(account_id, symbol.clone())).cloned())
    }

    async fn save_holding(&self, holding: &Holding) -> LedgerResult<()> {
        let mut holdings = self.holdings.write().unwrap();
        holdings.insert(
            (holding.account_id, holding.symbol.clone()),
            holding.clone(),
        );
        Ok(())
    }

    async fn delete_holding(&self, account_id: AccountId, symbol: &Symbol) -> LedgerResult<()> {
        let mut holdings = self.holdings.write().unwrap();
        holdings.remove(&(account_id, symbol.clone()));
        Ok(())
    }

    async fn list_holdings(&self, account_id: AccountId) -> LedgerResult<Vec<Holding>> {
        let holdings = self.holdings.read().unwrap();
        Ok(holdings
            .iter()
            .filter(|((id, _), _)| *id == account_id)
            .map(|(_, h)| h.clone())
            .collect())
    }

    async fn append_trade(&self, trade: &TradeRecord) -> LedgerResult<()> {
        let mut trades = self.trades.write().unwrap();
        trades.push(trade.clone());
        Ok(())
    }

    async fn list_trades(&self, account_id: AccountId) -> LedgerResult<Vec<TradeRecord>> {
        let trades = self.trades.read().unwrap();
        Ok(trades
            .iter()
            .filter(|t| t.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn list_trades_between(
        &self,
        account_id: AccountId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> LedgerResult<Vec<TradeRecord>> {
        let trades = self.trades.read().unwrap();
        Ok(trades
            .iter()
            .filter(|t| t.account_id == account_id && t.executed_at >= start && t.executed_at < end)
            .cloned()
            .collect())
    }
}
