//! FundMe custody core.
//!
//! A single-ledger value-custody component: accepts contributions above a
//! minimum threshold, tracks per-contributor balances, and lets the owner
//! withdraw the accumulated value — in full to itself, or partially to a
//! designated address.
//!
//! The vault only does bookkeeping. Actual value movement is delegated to
//! an injected [`ValueTransfer`] capability provided by the host platform,
//! so tests can substitute an in-memory double.

pub mod error;
pub mod transfer;
pub mod vault;

pub use error::VaultError;
pub use transfer::{TransferError, ValueTransfer};
pub use vault::FundVault;
