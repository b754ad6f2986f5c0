//! Nullable store — thread-safe in-memory vault storage for testing.

use fundme_store::{StoreError, VaultStore};
use fundme_types::AccountAddress;
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory vault store for testing.
pub struct NullVaultStore {
    funders: Mutex<HashMap<String, Vec<u8>>>,
    meta: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl NullVaultStore {
    pub fn new() -> Self {
        Self {
            funders: Mutex::new(HashMap::new()),
            meta: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for NullVaultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultStore for NullVaultStore {
    fn get_funder_state(&self, address: &AccountAddress) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.funders.lock().unwrap().get(address.as_str()).cloned())
    }

    fn put_funder_state(&self, address: &AccountAddress, state: &[u8]) -> Result<(), StoreError> {
        self.funders
            .lock()
            .unwrap()
            .insert(address.to_string(), state.to_vec());
        Ok(())
    }

    fn delete_funder_state(&self, address: &AccountAddress) -> Result<(), StoreError> {
        self.funders.lock().unwrap().remove(address.as_str());
        Ok(())
    }

    fn iter_funder_states(&self) -> Result<Vec<(AccountAddress, Vec<u8>)>, StoreError> {
        Ok(self
            .funders
            .lock()
            .unwrap()
            .iter()
            .map(|(address, bytes)| (AccountAddress::new(address.clone()), bytes.clone()))
            .collect())
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.meta.lock().unwrap().get(key).cloned())
    }

    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.meta
            .lock()
            .unwrap()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}
