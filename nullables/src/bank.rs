//! Nullable bank — an in-memory value-transfer host for testing.

use fundme_types::{AccountAddress, Amount};
use fundme_vault::{TransferError, ValueTransfer};
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory double of the host's value-custody mechanism.
///
/// Tracks both sides of every movement: external account balances and the
/// total currently custodied on the vault's behalf, so tests can assert
/// that value left one place exactly when it arrived in the other.
/// Thread-safe so multi-threaded test harnesses can share it.
pub struct NullBank {
    accounts: Mutex<HashMap<String, Amount>>,
    custodied: Mutex<Amount>,
}

impl NullBank {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            custodied: Mutex::new(Amount::ZERO),
        }
    }

    /// Seed an external account with spendable value.
    pub fn mint(&self, address: &AccountAddress, amount: Amount) {
        let mut accounts = self.accounts.lock().unwrap();
        let balance = accounts.entry(address.to_string()).or_insert(Amount::ZERO);
        *balance = balance.saturating_add(amount);
    }

    /// An external account's current balance.
    pub fn balance_of(&self, address: &AccountAddress) -> Amount {
        self.accounts
            .lock()
            .unwrap()
            .get(address.as_str())
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// The total value currently held in custody.
    pub fn custodied(&self) -> Amount {
        *self.custodied.lock().unwrap()
    }

    /// Empty the custody pool without touching any account, so tests can
    /// force the next release to fail at the host.
    pub fn drain_custody(&self) {
        *self.custodied.lock().unwrap() = Amount::ZERO;
    }
}

impl Default for NullBank {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueTransfer for NullBank {
    fn custody(&self, from: &AccountAddress, amount: Amount) -> Result<(), TransferError> {
        let mut accounts = self.accounts.lock().unwrap();
        let balance = accounts.entry(from.to_string()).or_insert(Amount::ZERO);
        let remaining =
            balance
                .checked_sub(amount)
                .ok_or_else(|| TransferError::InsufficientValue {
                    account: from.clone(),
                    needed: amount,
                    available: *balance,
                })?;
        *balance = remaining;
        let mut custodied = self.custodied.lock().unwrap();
        *custodied = custodied.saturating_add(amount);
        Ok(())
    }

    fn release(&self, to: &AccountAddress, amount: Amount) -> Result<(), TransferError> {
        let mut custodied = self.custodied.lock().unwrap();
        let remaining =
            custodied
                .checked_sub(amount)
                .ok_or(TransferError::InsufficientCustody {
                    needed: amount,
                    available: *custodied,
                })?;
        *custodied = remaining;
        let mut accounts = self.accounts.lock().unwrap();
        let balance = accounts.entry(to.to_string()).or_insert(Amount::ZERO);
        *balance = balance.saturating_add(amount);
        Ok(())
    }
}
