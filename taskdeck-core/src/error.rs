//! Error types for the task store and everything layered on it.

use std::path::PathBuf;

use thiserror::Error;

use crate::task::TaskId;

/// Errors raised by store reads/writes and record decoding.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A value outside its enumerated domain, or an empty required field.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Patch/delete addressed an id the store does not hold.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Reading or writing the backing file failed.
    #[error("store file {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file holds something that is not a list of task records.
    #[error("malformed store data: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TaskError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, TaskError>;
