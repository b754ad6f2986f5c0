//! Vault-specific errors.

use crate::transfer::TransferError;
use fundme_types::{AccountAddress, Amount};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("contribution below minimum: sent {sent}, minimum {minimum}")]
    BelowMinimumContribution { sent: Amount, minimum: Amount },

    #[error("caller {caller} is not the owner")]
    NotOwner { caller: AccountAddress },

    #[error("insufficient held value: requested {requested}, held {held}")]
    InsufficientHeldValue { requested: Amount, held: Amount },

    #[error("arithmetic overflow in vault bookkeeping")]
    Overflow,

    #[error("value transfer failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("storage error: {0}")]
    Store(String),
}
