//! Runtime configuration
//!
//! Settings come from `TASKDECK_*` environment variables, falling back to
//! defaults suitable for a single local user.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::task::{file_name_for_key, FileTaskStore, DEFAULT_STORAGE_KEY};
use crate::{Error, Result};

pub const DATA_DIR_VAR: &str = "TASKDECK_DATA_DIR";
pub const STORAGE_KEY_VAR: &str = "TASKDECK_STORAGE_KEY";
pub const READ_FAULT_VAR: &str = "TASKDECK_READ_FAULT";

const DEFAULT_DATA_DIR: &str = ".taskdeck-data";

/// What `reload` does when the store cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadFaultPolicy {
    /// Treat the fault as an empty collection
    Empty,
    /// Report the fault and keep the current in-memory collection
    Fail,
}

impl Default for ReadFaultPolicy {
    fn default() -> Self {
        Self::Empty
    }
}

impl FromStr for ReadFaultPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empty" => Ok(Self::Empty),
            "fail" | "error" => Ok(Self::Fail),
            other => Err(Error::Config(format!(
                "{} must be \"empty\" or \"fail\", got \"{}\"",
                READ_FAULT_VAR, other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub read_fault: ReadFaultPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            read_fault: ReadFaultPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = non_blank(lookup(DATA_DIR_VAR)) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(key) = non_blank(lookup(STORAGE_KEY_VAR)) {
            file_name_for_key(&key)?;
            config.storage_key = key;
        }
        if let Some(policy) = non_blank(lookup(READ_FAULT_VAR)) {
            config.read_fault = policy.parse()?;
        }

        Ok(config)
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_read_fault(mut self, policy: ReadFaultPolicy) -> Self {
        self.read_fault = policy;
        self
    }

    /// File store for the configured data directory and key
    pub fn file_store(&self) -> Result<FileTaskStore> {
        FileTaskStore::in_dir(&self.data_dir, self.storage_key.clone())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
