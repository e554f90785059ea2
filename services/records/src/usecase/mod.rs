pub mod lifecycle;
pub mod record;
pub mod reports;
pub mod session;
