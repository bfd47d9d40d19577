//! OMS error types

use common::OrderId;
use thiserror::Error;

/// Errors that can occur in the Order Management System
#[derive(Error, Debug)]
pub enum OmsError {
    /// Submission failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Order not found
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// Order is in a state that does not allow the operation,
    /// or does not belong to the caller
    #[error("State conflict: {0}")]
    StateConflict(String),

    /// Concurrent modification detected by the version check
    #[error("Version conflict on order: {0}")]
    VersionConflict(OrderId),

    /// Settlement of a synchronous fill failed
    #[error("Settlement error: {0}")]
    Settlement(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl OmsError {
    /// Machine-readable rejection code surfaced at the submission and
    /// cancellation boundary.
    pub fn code(&self) -> &'static str {
        match self {
            OmsError::Validation(_) => "VALIDATION",
            OmsError::NotFound(_) => "NOT_FOUND",
            OmsError::StateConflict(_) => "STATE_CONFLICT",
            OmsError::VersionConflict(_) => "VERSION_CONFLICT",
            OmsError::Settlement(_) => "SETTLEMENT",
            OmsError::Storage(_) => "STORAGE",
        }
    }
}

/// Result type for OMS operations
pub type OmsResult<T> = std::result::Result<T, OmsError>;
