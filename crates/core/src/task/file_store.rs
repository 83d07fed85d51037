//! File-based task storage implementation
//!
//! Stores the task collection as JSON in a single file on disk.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::model::Task;
use super::store::{decode, encode, TaskStore, DEFAULT_STORAGE_KEY};
use crate::{Error, Result};

/// File-based task store using JSON
#[derive(Debug, Clone)]
pub struct FileTaskStore {
    /// Storage key, kept for diagnostics
    key: String,
    /// Path to the JSON file
    path: PathBuf,
}

impl FileTaskStore {
    /// Create a store backed by the file at `path`
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            key: DEFAULT_STORAGE_KEY.to_string(),
            path: path.into(),
        }
    }

    /// Create a store for `key` inside `data_dir`
    ///
    /// `@tasks` maps to `<data_dir>/tasks.json`. Keys must be `@` followed by
    /// ASCII letters, digits, `-` or `_`, so every key gets its own file.
    pub fn in_dir(data_dir: impl AsRef<Path>, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let path = data_dir.as_ref().join(file_name_for_key(&key)?);
        Ok(Self { key, path })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// File name holding the blob for `key`
pub(crate) fn file_name_for_key(key: &str) -> Result<String> {
    let stem = key.strip_prefix('@').unwrap_or_default();
    let valid = !stem.is_empty()
        && stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(Error::Config(format!(
            "Storage key must look like \"@name\" using letters, digits, '-' or '_', got \"{}\"",
            key
        )));
    }
    Ok(format!("{}.json", stem))
}

#[async_trait]
impl TaskStore for FileTaskStore {
    fn key(&self) -> &str {
        &self.key
    }

    async fn read_all(&self) -> Result<Vec<Task>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let tasks = decode(&content)?;
        tracing::debug!(path = %self.path.display(), count = tasks.len(), "Read tasks");
        Ok(tasks)
    }

    async fn write_all(&self, tasks: &[Task]) -> Result<()> {
        let content = encode(tasks)?;

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        tokio::fs::create_dir_all(parent).await?;

        // Same directory as the target so the rename never crosses filesystems
        let temp_path = parent.join(format!(".{}.tmp", Uuid::new_v4().as_hyphenated()));
        if let Err(err) = tokio::fs::write(&temp_path, content).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(err.into());
        }

        // A single rename replaces the old file; readers see the old or the new
        // collection, never a missing file.
        if let Err(err) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(Error::Storage(format!(
                "Failed to replace tasks file {}: {}",
                self.path.display(),
                err
            )));
        }

        tracing::debug!(path = %self.path.display(), count = tasks.len(), "Wrote tasks");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;
    use chrono::Duration;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_store() -> (FileTaskStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTaskStore::in_dir(temp_dir.path(), DEFAULT_STORAGE_KEY).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_key_maps_to_file_name() {
        assert_eq!(file_name_for_key("@tasks").unwrap(), "tasks.json");
        assert_eq!(file_name_for_key("@work_tasks").unwrap(), "work_tasks.json");
        assert_eq!(file_name_for_key("@home-2").unwrap(), "home-2.json");
    }

    #[test]
    fn test_keys_needing_rewrite_are_rejected() {
        for key in ["@", "", "tasks", "@work/tasks", "@work tasks", "@@tasks", "@../tasks"] {
            assert!(
                matches!(file_name_for_key(key), Err(Error::Config(_))),
                "key {:?} should be rejected",
                key
            );
        }
        assert!(FileTaskStore::in_dir("/tmp", "@work/tasks").is_err());
    }

    #[tokio::test]
    async fn test_read_missing_file_is_empty() {
        let (store, _temp) = create_test_store();
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_round_trip_preserves_order_and_fields() {
        let (store, _temp) = create_test_store();

        let tasks = vec![
            Task::new("First")
                .with_description("one")
                .with_location("Home")
                .with_date_time(chrono::Utc::now() + Duration::hours(3)),
            Task::new("Second").with_status(TaskStatus::Cancelled),
            Task::new("Third").with_status(TaskStatus::InProgress),
        ];

        store.write_all(&tasks).await.unwrap();
        let read = store.read_all().await.unwrap();

        assert_eq!(read, tasks);
    }

    #[tokio::test]
    async fn test_write_replaces_previous_collection() {
        let (store, temp) = create_test_store();

        store
            .write_all(&[Task::new("A"), Task::new("B")])
            .await
            .unwrap();
        let only = vec![Task::new("C")];
        store.write_all(&only).await.unwrap();

        assert_eq!(store.read_all().await.unwrap(), only);

        // No temp or backup files are left behind
        let mut entries = tokio::fs::read_dir(temp.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        assert_eq!(names, vec!["tasks.json".to_string()]);
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("tasks.json");

        let task = Task::new("Persistent task").with_description("Should survive reload");
        FileTaskStore::new(&path)
            .write_all(std::slice::from_ref(&task))
            .await
            .unwrap();

        let read = FileTaskStore::new(&path).read_all().await.unwrap();
        assert_eq!(read, vec![task]);
    }

    #[tokio::test]
    async fn test_corrupted_file_is_an_error_but_reads_as_empty() {
        let (store, _temp) = create_test_store();
        tokio::fs::write(store.path(), "{ not json").await.unwrap();

        assert!(matches!(
            store.read_all().await,
            Err(Error::Serialization(_))
        ));
        assert!(store.read_all_or_empty().await.is_empty());
    }

    #[tokio::test]
    async fn test_write_fails_when_data_dir_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("state");
        tokio::fs::write(&data_dir, "not a directory").await.unwrap();

        let store = FileTaskStore::in_dir(&data_dir, DEFAULT_STORAGE_KEY).unwrap();
        let result = store.write_all(&[Task::new("Lost")]).await;

        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_read_through_a_file_is_an_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("state");
        tokio::fs::write(&data_dir, "not a directory").await.unwrap();

        let store = FileTaskStore::in_dir(&data_dir, DEFAULT_STORAGE_KEY).unwrap();

        assert!(matches!(store.read_all().await, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_write_failure_keeps_previous_file() {
        let (store, temp) = create_test_store();
        let kept = vec![Task::new("Kept")];
        store.write_all(&kept).await.unwrap();

        // A directory at the target path makes the final rename fail
        let blocked = FileTaskStore::new(temp.path().join("blocked.json"));
        tokio::fs::create_dir(blocked.path()).await.unwrap();
        tokio::fs::write(blocked.path().join("inner"), "x").await.unwrap();
        let result = blocked.write_all(&kept).await;

        assert!(matches!(result, Err(Error::Storage(_))));
        assert_eq!(store.read_all().await.unwrap(), kept);

        let mut entries = tokio::fs::read_dir(temp.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            let name = entry.file_name().to_string_lossy().to_string();
            assert!(!name.ends_with(".tmp"), "leftover temp file {}", name);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_reader_never_sees_missing_collection() {
        let (store, _temp) = create_test_store();
        let tasks = vec![Task::new("One"), Task::new("Two")];
        store.write_all(&tasks).await.unwrap();

        let done = Arc::new(AtomicBool::new(false));
        let reader = {
            let store = store.clone();
            let done = Arc::clone(&done);
            tokio::spawn(async move {
                let (mut reads, mut empty_reads) = (0usize, 0usize);
                while !done.load(Ordering::SeqCst) {
                    if store.read_all().await.unwrap().is_empty() {
                        empty_reads += 1;
                    }
                    reads += 1;
                }
                (reads, empty_reads)
            })
        };

        for _ in 0..500 {
            store.write_all(&tasks).await.unwrap();
        }
        done.store(true, Ordering::SeqCst);

        let (reads, empty_reads) = reader.await.unwrap();
        assert!(reads > 0);
        assert_eq!(empty_reads, 0, "reader saw an empty collection mid-write");
        assert_eq!(store.read_all().await.unwrap(), tasks);
    }
}
