//! Value transfer capability.
//!
//! The host platform is the only party that can actually move native value.
//! The vault invokes this trait for every movement and treats any failure
//! as aborting the whole call, so bookkeeping and value custody never
//! diverge.

use fundme_types::{AccountAddress, Amount};
use thiserror::Error;

/// Host capability that moves native value in and out of custody.
///
/// Implementations must be all-or-nothing per call: either the full amount
/// moves or an error is returned and nothing moved.
pub trait ValueTransfer {
    /// Take `amount` from `from` into the vault's custody.
    ///
    /// Invoked during a contribution, before the ledger is credited.
    fn custody(&self, from: &AccountAddress, amount: Amount) -> Result<(), TransferError>;

    /// Release `amount` of custodied value to `to`.
    ///
    /// Invoked during a withdrawal, before the ledger is debited.
    fn release(&self, to: &AccountAddress, amount: Amount) -> Result<(), TransferError>;
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("account {account} has insufficient value: need {needed}, have {available}")]
    InsufficientValue {
        account: AccountAddress,
        needed: Amount,
        available: Amount,
    },

    #[error("custodied value underrun: need {needed}, have {available}")]
    InsufficientCustody { needed: Amount, available: Amount },

    #[error("host refused the transfer: {0}")]
    Refused(String),
}
