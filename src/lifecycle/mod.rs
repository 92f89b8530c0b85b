//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Resolve key file → Provision wallet → Connect → Faucet
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then wallet, then network
//! - A session is a single sequential flow; there is no background work

pub mod startup;

pub use startup::{Network, RecoveredMnemonic, Session};
