//! Document schema of the `records` and `users` collections.

pub mod records;
pub mod users;
