//! Quadratic-funding contract client.
//!
//! # Data Flow
//! ```text
//! SigningClient (shared via Arc)
//!     → factory.rs (download bytecode, upload, instantiate, attach)
//!     → instance.rs (typed queries and actions on one address)
//!     → msg.rs (contract JSON messages)
//! ```

pub mod factory;
pub mod instance;
pub mod msg;

pub use factory::QuadraticFunding;
pub use instance::QuadraticFundingInstance;
pub use msg::{Binary, Expiration, InitMsg, Proposal, QfAlgorithm, Vote};
