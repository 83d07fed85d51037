//! Core library for Taskdeck
//!
//! This crate contains the task data and lifecycle layer:
//! - Task model and status state machine
//! - Task persistence (file and in-memory stores)
//! - Task repository with CRUD, status transitions and sorting
//! - Runtime configuration

pub mod config;
pub mod error;
pub mod task;

pub use config::{Config, ReadFaultPolicy};
pub use error::{Error, TaskError};
pub type Result<T> = std::result::Result<T, Error>;
