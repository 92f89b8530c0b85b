//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or built-in defaults
//!     → loader.rs (parse & deserialize)
//!     → ClientConfig (immutable)
//!     → NetworkConfig handed to wallet provisioning and the signing client
//!     → ContractSourceConfig handed to the contract factory
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults (heldernet preset) to allow minimal configs
//! - No eager semantic validation; bad endpoints surface at first use

pub mod loader;
pub mod schema;

pub use schema::ClientConfig;
pub use schema::ContractSourceConfig;
pub use schema::GasKind;
pub use schema::GasLimits;
pub use schema::GasPrice;
pub use schema::NetworkConfig;
pub use schema::ObservabilityConfig;
