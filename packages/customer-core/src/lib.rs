//! Core record store for the customer service.
//!
//! Provides the customer record types, the lock-guarded in-memory store
//! with monotonic identifier assignment, error types, and service
//! configuration.

pub mod config;
pub mod customer;
pub mod error;
pub mod store;

pub use customer::{Customer, CustomerFields, CustomerId};
pub use error::StoreError;
pub use store::CustomerStore;
