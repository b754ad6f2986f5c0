//! Abstract persistence traits for the FundMe vault.
//!
//! The host platform persists the vault's state across calls. Every backend
//! (durable or in-memory for testing) implements these traits; the rest of
//! the codebase depends only on the traits.

pub mod error;
pub mod vault;

pub use error::StoreError;
pub use vault::VaultStore;
