//! Expiration scheduling for OpenBrokerage
//!
//! Orders left unresolved past their trading day are cancelled so stale
//! obligations never persist across sessions. Two passes share the same
//! cancellation path:
//!
//! - the **daily pass** fires at local start-of-day and cancels active
//!   orders created during the previous calendar day
//! - the **startup pass** runs once on boot and cancels active orders
//!   created strictly before today, covering any days the service was
//!   down and the daily pass never fired
//!
//! Cancellation goes through the order manager's idempotent
//! `cancel_if_active`, so an order filled or already cancelled between
//! selection and cancellation is a no-op rather than an error, and a
//! second instance running the same pass cannot double-cancel.

pub mod expiration;

pub use expiration::ExpirationScheduler;
