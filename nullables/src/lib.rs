//! Nullable infrastructure for deterministic testing.
//!
//! The vault's external collaborators (the host's value-transfer capability
//! and its persistence layer) are abstracted behind traits. This crate
//! provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod bank;
pub mod store;

pub use bank::NullBank;
pub use store::NullVaultStore;
