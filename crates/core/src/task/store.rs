//! Task store trait
//!
//! A store keeps the whole task collection as one serialized blob under a
//! single key. It never looks inside the tasks; it only reads and writes the
//! ordered sequence.

use async_trait::async_trait;

use super::model::Task;
use crate::Result;

/// Key the task collection is stored under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "@tasks";

/// Durable read-all / write-all persistence for the task collection
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Key the collection lives under
    fn key(&self) -> &str;

    /// Read the stored collection. Returns an empty collection if nothing was
    /// ever written.
    async fn read_all(&self) -> Result<Vec<Task>>;

    /// Replace the stored collection. Readers never observe a partial write.
    async fn write_all(&self, tasks: &[Task]) -> Result<()>;

    /// Read the stored collection, treating any fault as "no tasks".
    ///
    /// A transient fault is indistinguishable from an empty store here.
    async fn read_all_or_empty(&self) -> Vec<Task> {
        match self.read_all().await {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::warn!(key = self.key(), error = %e, "Failed to read tasks, using empty collection");
                Vec::new()
            }
        }
    }
}

/// Serialize a collection the way every store writes it
pub(crate) fn encode(tasks: &[Task]) -> Result<String> {
    Ok(serde_json::to_string_pretty(tasks)?)
}

/// Parse a stored blob; blank content counts as an empty collection
pub(crate) fn decode(content: &str) -> Result<Vec<Task>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(content)?)
}
