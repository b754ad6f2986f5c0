//! Fundamental types for the FundMe vault.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account addresses, value amounts, and fixed protocol parameters.

pub mod address;
pub mod amount;
pub mod params;

pub use address::AccountAddress;
pub use amount::Amount;
pub use params::MIN_CONTRIBUTION;
