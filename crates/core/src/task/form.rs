//! Task form payload
//!
//! The add and edit screens submit the same four editable fields. The form
//! is where the title requirement lives; the repository accepts any title.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::Task;
use super::repository::TaskRepository;
use super::store::TaskStore;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Title is required")]
    TitleRequired,
}

/// Editable task fields as submitted by a form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub date_time: Option<DateTime<Utc>>,
}

impl TaskForm {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.title.trim().is_empty() {
            return Err(FormError::TitleRequired);
        }
        Ok(())
    }

    /// Build a new, unsaved task from the form
    pub fn into_task<S: TaskStore>(self, repo: &TaskRepository<S>) -> Result<Task, FormError> {
        self.validate()?;
        Ok(repo.create(self.title, self.description, self.date_time, self.location))
    }

    /// Full replacement record for `existing`
    ///
    /// Identity, status and creation time come from `existing`; the scheduled
    /// time is kept when the form carries none.
    pub fn apply_to(self, existing: &Task) -> Result<Task, FormError> {
        self.validate()?;
        Ok(Task {
            title: self.title,
            description: self.description,
            location: self.location,
            date_time: self.date_time.unwrap_or(existing.date_time),
            ..existing.clone()
        })
    }
}
