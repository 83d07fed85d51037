//! Task model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque, globally unique task identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generate a fresh identifier from 122 random bits (UUID v4, no hyphens)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Task lifecycle status
///
/// Every status can move to every other status; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "To Do")]
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Cancelled")]
    Cancelled,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Todo
    }
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        Self::Todo,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Display label, identical to the persisted form
    pub fn label(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Position in the status sort order (lower sorts first)
    pub fn rank(self) -> u8 {
        match self {
            Self::InProgress => 1,
            Self::Todo => 2,
            Self::Completed => 3,
            Self::Cancelled => 4,
        }
    }

    /// Move to `next`. Always allowed, including self-loops.
    pub fn transition_to(self, next: TaskStatus) -> TaskStatus {
        next
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// In-memory ordering applied to the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Newest `created_at` first
    Date,
    /// By status rank, in-progress first
    Status,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::Date
    }
}

impl SortOrder {
    /// Sort `tasks` in place. Both orders are stable.
    pub fn apply(self, tasks: &mut [Task]) {
        match self {
            Self::Date => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            Self::Status => tasks.sort_by_key(|t| t.status.rank()),
        }
    }
}

/// A tracked task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub date_time: DateTime<Utc>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new task with the given title, scheduled for now
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::generate(),
            title: title.into(),
            description: String::new(),
            location: String::new(),
            date_time: now,
            status: TaskStatus::default(),
            created_at: now,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the scheduled time
    pub fn with_date_time(mut self, date_time: DateTime<Utc>) -> Self {
        self.date_time = date_time;
        self
    }

    /// Copy of this task with `status` moved to `next`; every other field is kept
    pub fn with_status(mut self, next: TaskStatus) -> Self {
        self.status = self.status.transition_to(next);
        self
    }
}
