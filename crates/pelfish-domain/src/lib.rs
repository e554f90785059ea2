//! Domain types shared across the Pelfish crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Storage layout lives in the records schema crate; HTTP shapes live in the service.

pub mod id;
pub mod threat;
pub mod user;
