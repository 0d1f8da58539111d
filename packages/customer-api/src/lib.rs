//! REST API server for the customer store.
//!
//! Provides HTTP endpoints for customer CRUD operations, request routing,
//! and a hyper server with graceful shutdown.

pub mod handlers;
pub mod router;
pub mod server;
