//! In-memory state store for tests and hosts with their own persistence

use crate::store_trait::StateStore;
use parking_lot::Mutex;
use siwa_types::AuthResult;
use std::collections::HashMap;

/// In-memory `StateStore`. Contents do not survive the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> AuthResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> AuthResult<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AuthResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
