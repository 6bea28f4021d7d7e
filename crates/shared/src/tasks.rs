//! Newline-delimited task list. One task per line; appends never dedupe and
//! deletion drops every line containing the query case-insensitively.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskStoreError {
    #[error("task file {0} does not exist")]
    Missing(String),
    #[error("task file {path}: {message}")]
    Io { path: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskListing {
    Missing,
    Empty,
    Tasks(String),
}

#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one line. Line breaks inside the task become spaces.
    pub fn add(&self, task: &str) -> Result<(), TaskStoreError> {
        let line = task.replace(['\r', '\n'], " ");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| self.io_error(err))?;
        file.write_all(format!("{line}\n").as_bytes())
            .map_err(|err| self.io_error(err))
    }

    pub fn list(&self) -> Result<TaskListing, TaskStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    Ok(TaskListing::Empty)
                } else {
                    Ok(TaskListing::Tasks(trimmed.to_string()))
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(TaskListing::Missing),
            Err(err) => Err(self.io_error(err)),
        }
    }

    /// Rewrites the file without the matching lines and returns how many
    /// lines were removed. The new content is written to a temp file next to
    /// the resolved target and renamed over it, keeping the target's
    /// permissions and any symlink pointing at it.
    pub fn delete_matching(&self, query: &str) -> Result<usize, TaskStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(TaskStoreError::Missing(self.path.display().to_string()));
            }
            Err(err) => return Err(self.io_error(err)),
        };

        let needle = query.to_lowercase();
        let mut kept = String::with_capacity(raw.len());
        let mut removed = 0_usize;
        for line in raw.split_inclusive('\n') {
            if line.to_lowercase().contains(&needle) {
                removed += 1;
            } else {
                kept.push_str(line);
            }
        }

        let target = fs::canonicalize(&self.path).map_err(|err| self.io_error(err))?;
        let permissions = fs::metadata(&target)
            .map_err(|err| self.io_error(err))?
            .permissions();
        let dir = target
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut staged = NamedTempFile::new_in(dir).map_err(|err| self.io_error(err))?;
        staged
            .write_all(kept.as_bytes())
            .map_err(|err| self.io_error(err))?;
        staged
            .as_file()
            .set_permissions(permissions)
            .map_err(|err| self.io_error(err))?;
        staged
            .persist(&target)
            .map_err(|err| self.io_error(err.error))?;

        Ok(removed)
    }

    fn io_error(&self, err: std::io::Error) -> TaskStoreError {
        TaskStoreError::Io {
            path: self.path.display().to_string(),
            message: err.to_string(),
        }
    }
}
