use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory {path:?} missing or not writable: {message}")]
    OutputDir { path: PathBuf, message: String },
    #[error("failed to write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Ensure output directory exists; create it and its parents if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let output_dir_error = |message: String| PersistError::OutputDir {
        path: dir.to_path_buf(),
        message,
    };
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| output_dir_error(e.to_string()))?;
        if !meta.is_dir() {
            return Err(output_dir_error("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| output_dir_error(e.to_string()))?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    SkippedExisting(PathBuf),
}

/// Writes post files under a root directory, never replacing existing files.
pub struct PostWriter {
    root: PathBuf,
}

impl PostWriter {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the directory chain for `relative` and return the absolute
    /// target, or `None` when a file is already there.
    pub fn prepare(&self, relative: &Path) -> Result<Option<PathBuf>, PersistError> {
        let target = self.root.join(relative);
        if let Some(parent) = target.parent() {
            ensure_output_dir(parent)?;
        }
        if target.exists() {
            return Ok(None);
        }
        Ok(Some(target))
    }

    /// Write `content` to `target` through a temp file in the same directory.
    /// A file that appeared at `target` in the meantime is left untouched.
    pub fn write_new(&self, target: &Path, content: &str) -> Result<WriteOutcome, PersistError> {
        let write_error = |source: io::Error| PersistError::Write {
            path: target.to_path_buf(),
            source,
        };
        let dir = target.parent().unwrap_or(&self.root);
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_error)?;
        tmp.write_all(content.as_bytes()).map_err(write_error)?;
        tmp.flush().map_err(write_error)?;
        tmp.as_file_mut().sync_all().map_err(write_error)?;

        match tmp.persist_noclobber(target) {
            Ok(_) => Ok(WriteOutcome::Written(target.to_path_buf())),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                Ok(WriteOutcome::SkippedExisting(target.to_path_buf()))
            }
            Err(err) => Err(write_error(err.error)),
        }
    }

    /// Write the document produced by `render` unless `relative` already exists.
    /// `render` is not called for existing files.
    pub fn write_if_absent<F>(&self, relative: &Path, render: F) -> Result<WriteOutcome, PersistError>
    where
        F: FnOnce() -> String,
    {
        match self.prepare(relative)? {
            Some(target) => self.write_new(&target, &render()),
            None => Ok(WriteOutcome::SkippedExisting(self.root.join(relative))),
        }
    }
}
