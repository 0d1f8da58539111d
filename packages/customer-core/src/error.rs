//! Store error types.

use thiserror::Error;

use crate::customer::CustomerId;

/// Record store operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record carries the requested identifier
    #[error("Customer {id} not found")]
    CustomerNotFound { id: CustomerId },

    /// Two initial records share an identifier
    #[error("Duplicate customer id {id}")]
    DuplicateId { id: CustomerId },

    /// Lock poisoned (RwLock poisoned)
    #[error("Lock poisoned")]
    LockPoisoned,
}
