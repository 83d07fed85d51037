//! In-memory task storage
//!
//! Keeps the serialized collection in memory, going through the same JSON
//! encoding as the file store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::model::Task;
use super::store::{decode, encode, TaskStore, DEFAULT_STORAGE_KEY};
use crate::Result;

/// Single-key blob store held in memory
#[derive(Debug)]
pub struct MemoryTaskStore {
    key: String,
    blob: RwLock<Option<String>>,
}

impl Default for MemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::with_key(DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            blob: RwLock::new(None),
        }
    }

    /// Seed the raw blob stored under this store's key
    pub async fn put_raw(&self, content: impl Into<String>) {
        *self.blob.write().await = Some(content.into());
    }

    /// Raw blob stored under this store's key, if any
    pub async fn raw(&self) -> Option<String> {
        self.blob.read().await.clone()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    fn key(&self) -> &str {
        &self.key
    }

    async fn read_all(&self) -> Result<Vec<Task>> {
        let blob = self.blob.read().await;
        match blob.as_deref() {
            Some(content) => decode(content),
            None => Ok(Vec::new()),
        }
    }

    async fn write_all(&self, tasks: &[Task]) -> Result<()> {
        // Encode before taking the lock so a serialization fault leaves the old blob
        let content = encode(tasks)?;
        *self.blob.write().await = Some(content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;
    use crate::Error;

    #[tokio::test]
    async fn test_empty_until_written() {
        let store = MemoryTaskStore::new();
        assert!(store.read_all().await.unwrap().is_empty());
        assert!(store.raw().await.is_none());
    }

    #[tokio::test]
    async fn test_round_trip() {
        let store = MemoryTaskStore::new();
        let tasks = vec![
            Task::new("One"),
            Task::new("Two").with_status(TaskStatus::Completed),
        ];

        store.write_all(&tasks).await.unwrap();

        assert_eq!(store.read_all().await.unwrap(), tasks);
        assert!(store.raw().await.unwrap().contains("\"Completed\""));
    }

    #[tokio::test]
    async fn test_corrupted_blob() {
        let store = MemoryTaskStore::new();
        store.put_raw("[{\"id\":").await;

        assert!(matches!(
            store.read_all().await,
            Err(Error::Serialization(_))
        ));
        assert!(store.read_all_or_empty().await.is_empty());
    }

    #[tokio::test]
    async fn test_custom_key() {
        let work = MemoryTaskStore::with_key("@work");
        work.write_all(&[Task::new("Report")]).await.unwrap();

        assert_eq!(work.key(), "@work");
        assert_eq!(work.read_all().await.unwrap().len(), 1);
    }
}
