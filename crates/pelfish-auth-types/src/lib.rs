//! Session types shared across Pelfish services.
//!
//! Provides the session cookie helpers, the `SessionCookie` extractor and the
//! resolved [`identity::Identity`].

pub mod cookie;
pub mod identity;
