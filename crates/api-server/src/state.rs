//! Application state

use std::sync::Arc;

use taskdeck_core::task::{FileTaskStore, TaskRepository};
use taskdeck_core::Config;

pub type Repository = TaskRepository<FileTaskStore>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    repository: Repository,
}

impl AppState {
    /// Create the state and load whatever the configured store already holds
    ///
    /// A load failure is recorded in the repository state rather than
    /// aborting startup. An unusable storage key is an error.
    pub async fn new(config: Config) -> taskdeck_core::Result<Self> {
        let repository =
            TaskRepository::new(config.file_store()?).with_read_fault(config.read_fault);
        match repository.reload().await {
            Ok(tasks) => tracing::info!("Loaded {} tasks", tasks.len()),
            Err(e) => tracing::warn!("Starting with an empty task list: {}", e),
        }

        Ok(Self {
            inner: Arc::new(AppStateInner { config, repository }),
        })
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get reference to the task repository
    pub fn repository(&self) -> &Repository {
        &self.inner.repository
    }
}
