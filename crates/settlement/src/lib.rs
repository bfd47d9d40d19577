//! Settlement for OpenBrokerage
//!
//! This crate owns the ledger-mutating side of a fill: fee assessment,
//! holding and cash mutation, and the trade-history append. The
//! [`SettlementLedger`](ledger_unit::SettlementLedger) applies a fill and
//! its ledger effects as one unit - either the order's new status, the
//! holding change, the balance change and the history entry all persist,
//! or none do.
//!
//! Per-account serialization is provided by [`locks::AccountLocks`]: two
//! fills touching the same account never interleave their cash
//! read-modify-write, while fills on different accounts run concurrently.

pub mod error;
pub mod fees;
pub mod ledger_unit;
pub mod locks;
pub mod notify;

pub use error::{SettlementError, SettlementResult};
pub use fees::{FeeSchedule, Fees};
pub use ledger_unit::SettlementLedger;
pub use notify::{LogNotifier, Notifier};
