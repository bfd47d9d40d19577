//! Ledger error types

use common::AccountId;
use thiserror::Error;

/// Errors that can occur in the ledger stores
#[derive(Error, Debug)]
pub enum LedgerError {
    /// No cash balance row exists for the account
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
