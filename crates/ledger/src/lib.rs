//! Account ledgers for OpenBrokerage
//!
//! Three record families, all owned by an account and mutated only by the
//! settlement pipeline:
//!
//! - [`Holding`](types::Holding) - per-symbol share position with its
//!   average purchase price
//! - [`CashBalance`](types::CashBalance) - the account's available cash
//!   and derived total assets
//! - [`TradeRecord`](types::TradeRecord) - append-only trade history,
//!   one entry per executed fill
//!
//! Persistence goes through the [`LedgerStore`](store::LedgerStore) trait.

pub mod error;
pub mod store;
pub mod types;

pub use error::{LedgerError, LedgerResult};
pub use store::{InMemoryLedgerStore, LedgerStore};
pub use types::{CashBalance, Holding, TradeRecord};
