//! Task module
//!
//! This module contains task-related types and logic.

mod file_store;
mod form;
mod memory_store;
mod model;
mod repository;
mod store;

pub(crate) use file_store::file_name_for_key;
pub use file_store::FileTaskStore;
pub use form::{FormError, TaskForm};
pub use memory_store::MemoryTaskStore;
pub use model::*;
pub use repository::{RepositoryState, TaskRepository};
pub use store::{TaskStore, DEFAULT_STORAGE_KEY};
