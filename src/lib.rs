//! Quadratic-funding contract client library

pub mod config;
pub mod observability;
pub mod keystore;
pub mod blockchain;
pub mod contract;
pub mod lifecycle;

pub use blockchain::{HdWallet, SigningClient};
pub use config::schema::ClientConfig;
pub use contract::{QuadraticFunding, QuadraticFundingInstance};
pub use lifecycle::{Network, Session};
