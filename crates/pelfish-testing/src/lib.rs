//! Test utilities for Pelfish services.
//!
//! Provides the in-memory `MemoryStore`, document fixtures and session-cookie
//! helpers. Import from tests only, never from production code.

pub mod auth;
pub mod fixture;
pub mod store;
