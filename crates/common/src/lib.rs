//! Common types for OpenBrokerage
//!
//! This crate provides the shared domain types used across all
//! OpenBrokerage crates.
//!
//! # Modules
//!
//! - [`types`] - Shared domain types (AccountId, OrderId, Symbol, Side, etc.)

pub mod types;

pub use types::*;
