use anyhow::Result;
use async_trait::async_trait;

/// Small persistent string store that survives restarts, keyed by fixed names.
#[async_trait]
pub trait KeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

pub type StoreBox = Box<dyn KeyValueStore + Send + Sync>;
