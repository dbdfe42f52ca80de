#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::path;

use anyhow::Result;
use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::models::KeyValueStore;

/// Key/value pairs kept in a single YAML file, read and rewritten on each
/// access.
pub struct FileStore {
    pub file_path: path::PathBuf,
}

impl Default for FileStore {
    fn default() -> FileStore {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| return path::PathBuf::from("."))
            .join("natter");

        return FileStore::new(cache_dir.join("storage.yaml"));
    }
}

impl FileStore {
    pub fn new(file_path: path::PathBuf) -> FileStore {
        return FileStore { file_path };
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !fs::try_exists(&self.file_path).await? {
            return Ok(BTreeMap::new());
        }

        let payload = fs::read_to_string(&self.file_path).await?;
        if payload.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        let entries: BTreeMap<String, String> = serde_yaml::from_str(&payload)?;
        return Ok(entries);
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    #[allow(clippy::implicit_return)]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        return Ok(self.read_all().await?.get(key).cloned());
    }

    #[allow(clippy::implicit_return)]
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.file_path.parent() {
            if !fs::try_exists(parent).await? {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = fs::File::create(&self.file_path).await?;
        file.write_all(serde_yaml::to_string(&entries)?.as_bytes())
            .await?;
        file.flush().await?;

        return Ok(());
    }
}
