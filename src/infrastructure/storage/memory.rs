use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::models::KeyValueStore;

/// In-process store. Clones share the same entries, which lets tests simulate
/// a restart by building a second consumer over the same store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    #[allow(clippy::implicit_return)]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        return Ok(self.entries.get(key).map(|e| return e.value().to_string()));
    }

    #[allow(clippy::implicit_return)]
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        return Ok(());
    }
}
