//! In-memory backend for tests and ephemeral hosts.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::MigrateResult;
use crate::store::KeyValueBackend;

/// In-memory key-value backend. Nothing survives the process; `flush` is a
/// no-op.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> MigrateResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> MigrateResult<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> MigrateResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn flush(&self) -> MigrateResult<()> {
        Ok(())
    }
}
