//! Shared infrastructure for Pelfish services.
//!
//! Document-store access ([`store`]), structured logging, HTTP middleware and
//! small serialization helpers.

pub mod bson_ext;
pub mod error;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod store;
pub mod tracing;
