pub mod health;
pub mod record;
pub mod reports;
pub mod session;
