//! The FundVault state machine.

use crate::error::VaultError;
use crate::transfer::ValueTransfer;
use fundme_types::{AccountAddress, Amount, MIN_CONTRIBUTION};
use std::collections::HashMap;

/// The custody vault — one owner, a ledger of contributor balances, and the
/// total value currently held.
///
/// `held` mirrors `sum(funders.values())` and every mutating operation keeps
/// the two in lockstep within the same call. All mutating operations take
/// `&mut self`, so the type system serializes access; a multi-threaded host
/// must wrap the whole vault in a single mutual-exclusion domain.
pub struct FundVault {
    owner: AccountAddress,
    funders: HashMap<AccountAddress, Amount>,
    /// Funder addresses in first-contribution order. Partial withdrawals
    /// debit balances in this order (FIFO attribution).
    arrival_order: Vec<AccountAddress>,
    held: Amount,
}

impl FundVault {
    /// Create a vault owned by the deploying identity.
    ///
    /// The owner is set exactly once, here, and never reassigned.
    pub fn new(owner: AccountAddress) -> Self {
        Self {
            owner,
            funders: HashMap::new(),
            arrival_order: Vec::new(),
            held: Amount::ZERO,
        }
    }

    /// The identity authorized to initiate withdrawals.
    pub fn owner(&self) -> &AccountAddress {
        &self.owner
    }

    /// The total value currently custodied by the vault.
    pub fn held(&self) -> Amount {
        self.held
    }

    /// A funder's recorded balance, zero when absent.
    pub fn funder_balance(&self, who: &AccountAddress) -> Amount {
        self.funders.get(who).copied().unwrap_or(Amount::ZERO)
    }

    /// Number of distinct funders ever credited (entries may sit at zero).
    pub fn funder_count(&self) -> usize {
        self.funders.len()
    }

    /// Accept a contribution of `amount` from `caller`.
    ///
    /// Rejects amounts below [`MIN_CONTRIBUTION`] in full — no state change
    /// and no value custodied. On success the host takes custody of the
    /// value and the caller's balance is credited within the same call.
    pub fn contribute(
        &mut self,
        caller: &AccountAddress,
        amount: Amount,
        bank: &dyn ValueTransfer,
    ) -> Result<(), VaultError> {
        if amount < MIN_CONTRIBUTION {
            return Err(VaultError::BelowMinimumContribution {
                sent: amount,
                minimum: MIN_CONTRIBUTION,
            });
        }
        // Pre-compute both updates so an overflow rejects the call before
        // any value moves.
        let new_balance = self
            .funder_balance(caller)
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;
        let new_held = self
            .held
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;

        bank.custody(caller, amount)?;

        if self.funders.insert(caller.clone(), new_balance).is_none() {
            self.arrival_order.push(caller.clone());
        }
        self.held = new_held;
        debug_assert_eq!(self.total_funder_balance(), self.held);

        tracing::debug!(funder = %caller, amount = %amount, "contribution accepted");
        Ok(())
    }

    /// Withdraw the entire held value to the owner.
    ///
    /// Clears every funder balance — the owner may have no personal entry,
    /// so debiting only the caller would break the sum invariant. Returns
    /// the amount released.
    pub fn withdraw(
        &mut self,
        caller: &AccountAddress,
        bank: &dyn ValueTransfer,
    ) -> Result<Amount, VaultError> {
        if *caller != self.owner {
            return Err(VaultError::NotOwner {
                caller: caller.clone(),
            });
        }
        let total = self.held;
        bank.release(caller, total)?;

        for balance in self.funders.values_mut() {
            *balance = Amount::ZERO;
        }
        self.held = Amount::ZERO;

        tracing::info!(owner = %caller, amount = %total, "full withdrawal");
        Ok(total)
    }

    /// Withdraw `amount` to a designated `recipient`.
    ///
    /// Funder balances are debited in first-contribution order until the
    /// amount is accounted for; with a single funder this debits that
    /// funder by exactly `amount`.
    pub fn withdraw_to(
        &mut self,
        caller: &AccountAddress,
        recipient: &AccountAddress,
        amount: Amount,
        bank: &dyn ValueTransfer,
    ) -> Result<(), VaultError> {
        if *caller != self.owner {
            return Err(VaultError::NotOwner {
                caller: caller.clone(),
            });
        }
        if amount > self.held {
            return Err(VaultError::InsufficientHeldValue {
                requested: amount,
                held: self.held,
            });
        }
        bank.release(recipient, amount)?;

        let mut remaining = amount;
        for address in &self.arrival_order {
            if remaining.is_zero() {
                break;
            }
            if let Some(balance) = self.funders.get_mut(address) {
                let debit = (*balance).min(remaining);
                *balance = balance.saturating_sub(debit);
                remaining = remaining.saturating_sub(debit);
            }
        }
        // `amount <= held == sum(funders)`, so the walk always covers it.
        debug_assert!(remaining.is_zero());
        self.held = self.held.saturating_sub(amount);
        debug_assert_eq!(self.total_funder_balance(), self.held);

        tracing::info!(
            owner = %caller,
            recipient = %recipient,
            amount = %amount,
            "partial withdrawal"
        );
        Ok(())
    }

    fn total_funder_balance(&self) -> Amount {
        self.funders
            .values()
            .fold(Amount::ZERO, |acc, b| acc.saturating_add(*b))
    }
}

impl FundVault {
    /// Persist the full vault state to a store.
    pub fn save_to_store(&self, store: &dyn fundme_store::VaultStore) -> Result<(), VaultError> {
        let owner_bytes =
            bincode::serialize(&self.owner).map_err(|e| VaultError::Store(e.to_string()))?;
        store
            .put_meta(b"owner", &owner_bytes)
            .map_err(|e| VaultError::Store(e.to_string()))?;

        let held_bytes =
            bincode::serialize(&self.held).map_err(|e| VaultError::Store(e.to_string()))?;
        store
            .put_meta(b"held", &held_bytes)
            .map_err(|e| VaultError::Store(e.to_string()))?;

        let order_bytes = bincode::serialize(&self.arrival_order)
            .map_err(|e| VaultError::Store(e.to_string()))?;
        store
            .put_meta(b"arrival_order", &order_bytes)
            .map_err(|e| VaultError::Store(e.to_string()))?;

        for (address, balance) in &self.funders {
            let bytes =
                bincode::serialize(balance).map_err(|e| VaultError::Store(e.to_string()))?;
            store
                .put_funder_state(address, &bytes)
                .map_err(|e| VaultError::Store(e.to_string()))?;
        }
        Ok(())
    }

    /// Restore a vault from a store.
    ///
    /// Fails if the owner is missing or the stored held total disagrees
    /// with the funder balances — either means the stored state is corrupt.
    pub fn load_from_store(store: &dyn fundme_store::VaultStore) -> Result<Self, VaultError> {
        let owner: AccountAddress = match store
            .get_meta(b"owner")
            .map_err(|e| VaultError::Store(e.to_string()))?
        {
            Some(bytes) => {
                bincode::deserialize(&bytes).map_err(|e| VaultError::Store(e.to_string()))?
            }
            None => return Err(VaultError::Store("missing owner".into())),
        };

        let entries = store
            .iter_funder_states()
            .map_err(|e| VaultError::Store(e.to_string()))?;
        let mut funders = HashMap::new();
        let mut sum = Amount::ZERO;
        for (address, bytes) in entries {
            let balance: Amount =
                bincode::deserialize(&bytes).map_err(|e| VaultError::Store(e.to_string()))?;
            sum = sum.checked_add(balance).ok_or(VaultError::Overflow)?;
            funders.insert(address, balance);
        }

        let held: Amount = match store
            .get_meta(b"held")
            .map_err(|e| VaultError::Store(e.to_string()))?
        {
            Some(bytes) => {
                bincode::deserialize(&bytes).map_err(|e| VaultError::Store(e.to_string()))?
            }
            None => sum,
        };
        if held != sum {
            return Err(VaultError::Store(
                "held total does not match funder balances".into(),
            ));
        }

        let arrival_order: Vec<AccountAddress> = match store
            .get_meta(b"arrival_order")
            .map_err(|e| VaultError::Store(e.to_string()))?
        {
            Some(bytes) => {
                bincode::deserialize(&bytes).map_err(|e| VaultError::Store(e.to_string()))?
            }
            None => funders.keys().cloned().collect(),
        };

        Ok(Self {
            owner,
            funders,
            arrival_order,
            held,
        })
    }
}

#[cfg(test)]
mod tests {
    // Import from the external library build (not `super`) so these types
    // unify with the `fundme_vault` copy that `NullBank` implements
    // `ValueTransfer` for, despite the dev-dependency cycle.
    use fundme_nullables::NullBank;
    use fundme_types::amount::GWEI;
    use fundme_types::{AccountAddress, Amount, MIN_CONTRIBUTION};
    use fundme_vault::{FundVault, VaultError};

    fn test_address(n: u8) -> AccountAddress {
        AccountAddress::new(format!("acct_{:0>3}", n))
    }

    fn funded_bank(accounts: &[(AccountAddress, Amount)]) -> NullBank {
        let bank = NullBank::new();
        for (address, amount) in accounts {
            bank.mint(address, *amount);
        }
        bank
    }

    #[test]
    fn test_owner_is_set_at_construction() {
        let owner = test_address(0);
        let vault = FundVault::new(owner.clone());
        assert_eq!(*vault.owner(), owner);
        assert_eq!(vault.held(), Amount::ZERO);
    }

    #[test]
    fn test_contribution_credits_funder_and_held() {
        let mut vault = FundVault::new(test_address(0));
        let funder = test_address(1);
        let amount = Amount::from_native(1);
        let bank = funded_bank(&[(funder.clone(), amount)]);

        vault.contribute(&funder, amount, &bank).unwrap();

        assert_eq!(vault.funder_balance(&funder), amount);
        assert_eq!(vault.held(), amount);
        assert_eq!(bank.custodied(), amount);
        assert_eq!(bank.balance_of(&funder), Amount::ZERO);
    }

    #[test]
    fn test_contribution_below_minimum_is_rejected_in_full() {
        let mut vault = FundVault::new(test_address(0));
        let funder = test_address(1);
        let bank = funded_bank(&[(funder.clone(), Amount::from_gwei(9))]);

        let result = vault.contribute(&funder, Amount::from_gwei(9), &bank);
        match result.unwrap_err() {
            VaultError::BelowMinimumContribution { sent, minimum } => {
                assert_eq!(sent, Amount::from_gwei(9));
                assert_eq!(minimum, MIN_CONTRIBUTION);
            }
            other => panic!("expected BelowMinimumContribution, got {other:?}"),
        }
        assert_eq!(vault.held(), Amount::ZERO);
        assert_eq!(vault.funder_balance(&funder), Amount::ZERO);
        assert_eq!(bank.custodied(), Amount::ZERO);
        assert_eq!(bank.balance_of(&funder), Amount::from_gwei(9));
    }

    #[test]
    fn test_contribution_at_exact_threshold_succeeds() {
        let mut vault = FundVault::new(test_address(0));
        let funder = test_address(1);
        let bank = funded_bank(&[(funder.clone(), Amount::from_gwei(10))]);

        vault
            .contribute(&funder, Amount::from_gwei(10), &bank)
            .unwrap();
        assert_eq!(vault.funder_balance(&funder), Amount::from_gwei(10));
        assert_eq!(vault.held(), Amount::from_gwei(10));
    }

    #[test]
    fn test_repeat_contributions_accumulate() {
        let mut vault = FundVault::new(test_address(0));
        let funder = test_address(1);
        let bank = funded_bank(&[(funder.clone(), Amount::from_gwei(50))]);

        vault
            .contribute(&funder, Amount::from_gwei(20), &bank)
            .unwrap();
        vault
            .contribute(&funder, Amount::from_gwei(30), &bank)
            .unwrap();
        assert_eq!(vault.funder_balance(&funder), Amount::from_gwei(50));
        assert_eq!(vault.held(), Amount::from_gwei(50));
        assert_eq!(vault.funder_count(), 1);
    }

    #[test]
    fn test_full_withdrawal_clears_every_funder() {
        let owner = test_address(0);
        let mut vault = FundVault::new(owner.clone());
        let (a, b) = (test_address(1), test_address(2));
        let bank = funded_bank(&[
            (a.clone(), Amount::from_gwei(40)),
            (b.clone(), Amount::from_gwei(60)),
        ]);
        vault.contribute(&a, Amount::from_gwei(40), &bank).unwrap();
        vault.contribute(&b, Amount::from_gwei(60), &bank).unwrap();

        let released = vault.withdraw(&owner, &bank).unwrap();

        assert_eq!(released, Amount::from_gwei(100));
        assert_eq!(vault.held(), Amount::ZERO);
        assert_eq!(vault.funder_balance(&a), Amount::ZERO);
        assert_eq!(vault.funder_balance(&b), Amount::ZERO);
        assert_eq!(bank.balance_of(&owner), Amount::from_gwei(100));
        assert_eq!(bank.custodied(), Amount::ZERO);
    }

    #[test]
    fn test_withdraw_by_non_owner_is_rejected() {
        let mut vault = FundVault::new(test_address(0));
        let funder = test_address(1);
        let bank = funded_bank(&[(funder.clone(), Amount::from_gwei(20))]);
        vault
            .contribute(&funder, Amount::from_gwei(20), &bank)
            .unwrap();

        let intruder = test_address(9);
        let result = vault.withdraw(&intruder, &bank);
        match result.unwrap_err() {
            VaultError::NotOwner { caller } => assert_eq!(caller, intruder),
            other => panic!("expected NotOwner, got {other:?}"),
        }
        assert_eq!(vault.held(), Amount::from_gwei(20));
        assert_eq!(vault.funder_balance(&funder), Amount::from_gwei(20));
        assert_eq!(bank.custodied(), Amount::from_gwei(20));
    }

    #[test]
    fn test_partial_withdrawal_debits_single_funder() {
        let owner = test_address(0);
        let mut vault = FundVault::new(owner.clone());
        let funder = test_address(1);
        let recipient = test_address(2);
        let bank = funded_bank(&[(funder.clone(), Amount::from_native(1))]);
        vault
            .contribute(&funder, Amount::from_native(1), &bank)
            .unwrap();

        let half = Amount::new(Amount::from_native(1).raw() / 2);
        vault.withdraw_to(&owner, &recipient, half, &bank).unwrap();

        assert_eq!(vault.funder_balance(&funder), half);
        assert_eq!(vault.held(), half);
        assert_eq!(bank.balance_of(&recipient), half);
        assert_eq!(bank.custodied(), half);
    }

    #[test]
    fn test_partial_withdrawal_debits_in_arrival_order() {
        let owner = test_address(0);
        let mut vault = FundVault::new(owner.clone());
        let (first, second) = (test_address(1), test_address(2));
        let recipient = test_address(3);
        let bank = funded_bank(&[
            (first.clone(), Amount::from_gwei(30)),
            (second.clone(), Amount::from_gwei(30)),
        ]);
        vault
            .contribute(&first, Amount::from_gwei(30), &bank)
            .unwrap();
        vault
            .contribute(&second, Amount::from_gwei(30), &bank)
            .unwrap();

        // 40 gwei: drains the first funder entirely, then 10 from the second.
        vault
            .withdraw_to(&owner, &recipient, Amount::from_gwei(40), &bank)
            .unwrap();

        assert_eq!(vault.funder_balance(&first), Amount::ZERO);
        assert_eq!(vault.funder_balance(&second), Amount::from_gwei(20));
        assert_eq!(vault.held(), Amount::from_gwei(20));
        assert_eq!(bank.balance_of(&recipient), Amount::from_gwei(40));
    }

    #[test]
    fn test_partial_withdrawal_over_held_is_rejected() {
        let owner = test_address(0);
        let mut vault = FundVault::new(owner.clone());
        let funder = test_address(1);
        let bank = funded_bank(&[(funder.clone(), Amount::from_gwei(20))]);
        vault
            .contribute(&funder, Amount::from_gwei(20), &bank)
            .unwrap();

        let result = vault.withdraw_to(&owner, &funder, Amount::from_gwei(21), &bank);
        match result.unwrap_err() {
            VaultError::InsufficientHeldValue { requested, held } => {
                assert_eq!(requested, Amount::from_gwei(21));
                assert_eq!(held, Amount::from_gwei(20));
            }
            other => panic!("expected InsufficientHeldValue, got {other:?}"),
        }
        assert_eq!(vault.held(), Amount::from_gwei(20));
        assert_eq!(bank.custodied(), Amount::from_gwei(20));
    }

    #[test]
    fn test_withdraw_to_by_non_owner_is_rejected() {
        let mut vault = FundVault::new(test_address(0));
        let funder = test_address(1);
        let bank = funded_bank(&[(funder.clone(), Amount::from_gwei(20))]);
        vault
            .contribute(&funder, Amount::from_gwei(20), &bank)
            .unwrap();

        let result = vault.withdraw_to(&funder, &funder, Amount::from_gwei(20), &bank);
        assert!(matches!(result, Err(VaultError::NotOwner { .. })));
        assert_eq!(vault.held(), Amount::from_gwei(20));
    }

    #[test]
    fn test_failed_release_leaves_bookkeeping_untouched() {
        let owner = test_address(0);
        let mut vault = FundVault::new(owner.clone());
        let funder = test_address(1);
        let bank = funded_bank(&[(funder.clone(), Amount::from_gwei(20))]);
        vault
            .contribute(&funder, Amount::from_gwei(20), &bank)
            .unwrap();

        // Drain the custodied value behind the vault's back so the next
        // release fails at the host.
        bank.drain_custody();

        let result = vault.withdraw(&owner, &bank);
        assert!(matches!(result, Err(VaultError::Transfer(_))));
        assert_eq!(vault.held(), Amount::from_gwei(20));
        assert_eq!(vault.funder_balance(&funder), Amount::from_gwei(20));
    }

    #[test]
    fn test_reads_are_idempotent() {
        let owner = test_address(0);
        let mut vault = FundVault::new(owner.clone());
        let funder = test_address(1);
        let bank = funded_bank(&[(funder.clone(), Amount::from_gwei(15))]);
        vault
            .contribute(&funder, Amount::from_gwei(15), &bank)
            .unwrap();

        for _ in 0..3 {
            assert_eq!(*vault.owner(), owner);
            assert_eq!(vault.funder_balance(&funder), Amount::from_gwei(15));
            assert_eq!(vault.held(), Amount::from_gwei(15));
        }
    }

    #[test]
    fn test_contribution_overflow_is_rejected() {
        let mut vault = FundVault::new(test_address(0));
        let funder = test_address(1);
        let huge = Amount::new(u128::MAX - GWEI);
        let bank = funded_bank(&[(funder.clone(), Amount::new(u128::MAX))]);
        vault.contribute(&funder, huge, &bank).unwrap();

        let result = vault.contribute(&funder, Amount::from_gwei(10), &bank);
        assert!(matches!(result, Err(VaultError::Overflow)));
        assert_eq!(vault.held(), huge);
    }
}
