//! Matching for OpenBrokerage
//!
//! The engine reacts to market price events: it selects the pending
//! orders on the event's symbol whose limit condition the quoted price
//! satisfies, and pushes each one through the fill/settlement primitive
//! for its entire remaining quantity at the quoted price. The market is
//! modeled as infinite liquidity at the quote - depth snapshots on the
//! event are informational and not consulted for fill sizing.
//!
//! One [`MatchingWorker`](worker::MatchingWorker) consumes the event
//! channel, so events for a symbol are handled in arrival order.

pub mod engine;
pub mod event;
pub mod quotes;
pub mod worker;

pub use engine::{MatchOutcome, MatchingEngine};
pub use event::{MarketPriceEvent, PriceLevel};
pub use quotes::QuoteBoard;
pub use worker::MatchingWorker;
