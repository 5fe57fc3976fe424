use super::{KeyValueStore, StoreResult};
use std::collections::HashMap;

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
