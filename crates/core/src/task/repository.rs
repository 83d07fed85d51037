//! Task repository
//!
//! Owns task identity, CRUD, status transitions and sorting. Every mutation
//! reads the whole collection from the store, changes it in memory and writes
//! it back; the repository then caches the result as its current view.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error};

use super::model::{SortOrder, Task, TaskId, TaskStatus};
use super::store::TaskStore;
use crate::config::ReadFaultPolicy;
use crate::{Error, Result, TaskError};

/// Pending/error state observed by callers while rendering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryState {
    pub loading: bool,
    pub error: Option<String>,
}

/// Task repository over a single store
pub struct TaskRepository<S> {
    store: S,
    read_fault: ReadFaultPolicy,
    /// Last loaded collection; only replaced after a successful store operation
    tasks: RwLock<Vec<Task>>,
    state: RwLock<RepositoryState>,
    state_tx: broadcast::Sender<RepositoryState>,
}

impl<S: TaskStore> TaskRepository<S> {
    /// Create a repository with an empty view. Call [`reload`](Self::reload)
    /// to pick up what the store already holds.
    pub fn new(store: S) -> Self {
        let (state_tx, _) = broadcast::channel(64);
        Self {
            store,
            read_fault: ReadFaultPolicy::default(),
            tasks: RwLock::new(Vec::new()),
            state: RwLock::new(RepositoryState::default()),
            state_tx,
        }
    }

    /// Set how read faults are handled
    pub fn with_read_fault(mut self, policy: ReadFaultPolicy) -> Self {
        self.read_fault = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Build a new task. Nothing is persisted until [`add`](Self::add).
    ///
    /// `date_time` defaults to the creation time.
    pub fn create(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        date_time: Option<DateTime<Utc>>,
        location: impl Into<String>,
    ) -> Task {
        let task = Task::new(title)
            .with_description(description)
            .with_location(location);
        match date_time {
            Some(when) => task.with_date_time(when),
            None => task,
        }
    }

    /// Append `task` and persist
    pub async fn add(&self, task: Task) -> std::result::Result<Vec<Task>, TaskError> {
        debug!(id = %task.id, "Adding task");
        self.mutate("add", TaskError::Add, move |tasks| tasks.push(task))
            .await
    }

    /// Replace the stored record with the same id by `task`
    ///
    /// An unknown id leaves the collection unchanged and still succeeds.
    pub async fn update(&self, task: Task) -> std::result::Result<Vec<Task>, TaskError> {
        debug!(id = %task.id, "Updating task");
        self.mutate("update", TaskError::Update, move |tasks| {
            for existing in tasks.iter_mut().filter(|t| t.id == task.id) {
                *existing = task.clone();
            }
        })
        .await
    }

    /// Remove the task with `id`; an unknown id is a successful no-op
    pub async fn remove(&self, id: &TaskId) -> std::result::Result<Vec<Task>, TaskError> {
        debug!(%id, "Removing task");
        self.mutate("delete", TaskError::Delete, |tasks| {
            tasks.retain(|t| &t.id != id)
        })
        .await
    }

    /// Move the task with `id` to `status`
    ///
    /// The task is looked up in the current view; if it is not there the
    /// store is left untouched and `TaskError::NotFound` is returned.
    pub async fn change_status(
        &self,
        id: &TaskId,
        status: TaskStatus,
    ) -> std::result::Result<Vec<Task>, TaskError> {
        let Some(task) = self.get(id).await else {
            debug!(%id, "Status change for unknown task");
            return Err(TaskError::NotFound(id.clone()));
        };
        self.update(task.with_status(status)).await
    }

    /// Current view of the collection
    pub async fn list(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    /// Look up a task in the current view
    pub async fn get(&self, id: &TaskId) -> Option<Task> {
        self.tasks.read().await.iter().find(|t| &t.id == id).cloned()
    }

    /// Replace the current view with what the store holds
    pub async fn reload(&self) -> std::result::Result<Vec<Task>, TaskError> {
        self.begin().await;
        match self.read_current().await {
            Ok(tasks) => {
                *self.tasks.write().await = tasks.clone();
                self.finish(|state| state.error = None).await;
                Ok(tasks)
            }
            Err(e) => {
                error!(key = self.store.key(), error = %e, "Failed to load tasks");
                let err = TaskError::Load(e);
                let message = err.to_string();
                self.finish(move |state| state.error = Some(message)).await;
                Err(err)
            }
        }
    }

    /// Reorder the current view in place and return it. Not persisted.
    pub async fn sort(&self, order: SortOrder) -> Vec<Task> {
        let mut tasks = self.tasks.write().await;
        order.apply(&mut tasks);
        tasks.clone()
    }

    /// Snapshot of the loading/error state
    pub async fn state(&self) -> RepositoryState {
        self.state.read().await.clone()
    }

    /// Receive every loading/error state change
    pub fn subscribe(&self) -> broadcast::Receiver<RepositoryState> {
        self.state_tx.subscribe()
    }

    async fn read_current(&self) -> Result<Vec<Task>> {
        match self.read_fault {
            ReadFaultPolicy::Empty => Ok(self.store.read_all_or_empty().await),
            ReadFaultPolicy::Fail => self.store.read_all().await,
        }
    }

    /// Read-modify-write the stored collection. The view is replaced only
    /// after the write succeeded.
    async fn mutate<F>(
        &self,
        operation: &'static str,
        wrap: fn(Error) -> TaskError,
        apply: F,
    ) -> std::result::Result<Vec<Task>, TaskError>
    where
        F: FnOnce(&mut Vec<Task>),
    {
        self.begin().await;

        let written = match self.read_current().await {
            Ok(mut tasks) => {
                apply(&mut tasks);
                self.store.write_all(&tasks).await.map(|()| tasks)
            }
            Err(e) => Err(e),
        };

        match written {
            Ok(tasks) => {
                *self.tasks.write().await = tasks.clone();
                self.finish(|_| {}).await;
                Ok(tasks)
            }
            Err(e) => {
                error!(operation, key = self.store.key(), error = %e, "Task operation failed");
                let err = wrap(e);
                let message = err.to_string();
                self.finish(move |state| state.error = Some(message)).await;
                Err(err)
            }
        }
    }

    async fn begin(&self) {
        self.set_state(|state| state.loading = true).await;
    }

    async fn finish(&self, f: impl FnOnce(&mut RepositoryState)) {
        self.set_state(|state| {
            state.loading = false;
            f(state);
        })
        .await;
    }

    async fn set_state(&self, f: impl FnOnce(&mut RepositoryState)) {
        let snapshot = {
            let mut state = self.state.write().await;
            f(&mut state);
            state.clone()
        };
        // No subscribers is fine
        let _ = self.state_tx.send(snapshot);
    }
}
