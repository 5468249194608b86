pub mod auth;
pub mod products;
pub mod reports;
pub mod transactions;
