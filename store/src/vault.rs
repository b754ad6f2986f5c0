//! Vault storage trait.

use crate::StoreError;
use fundme_types::AccountAddress;

/// Store trait for persisting vault state to durable storage.
///
/// Uses opaque `Vec<u8>` so the store doesn't depend on the `fundme-vault`
/// crate (which would create a circular dependency). The vault
/// serializes/deserializes its own types.
pub trait VaultStore {
    fn get_funder_state(&self, address: &AccountAddress) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_funder_state(&self, address: &AccountAddress, state: &[u8]) -> Result<(), StoreError>;
    fn delete_funder_state(&self, address: &AccountAddress) -> Result<(), StoreError>;
    fn iter_funder_states(&self) -> Result<Vec<(AccountAddress, Vec<u8>)>, StoreError>;

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
}
