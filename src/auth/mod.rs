pub mod migration;
pub mod provider;
pub mod session;
