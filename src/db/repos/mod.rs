pub mod legacy_users;
pub mod products;
pub mod reports;
pub mod transactions;
