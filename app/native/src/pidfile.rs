//! PID marker file enforcing one server per user.
//!
//! The marker is created with create-exclusive semantics, so two servers
//! racing to start cannot both succeed.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// The server's PID marker.
///
/// The marker is removed when this value is dropped.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Creates the marker at `path` and records the current process id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRunning`] if the marker already exists, or an
    /// IO error if it cannot be written.
    pub fn acquire(path: &Path) -> Result<Self> {
        let mut file = match OpenOptions::new().write(true).create_new(true).mode(0o700).open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(Error::AlreadyRunning(path.to_path_buf()));
            }
            Err(err) => return Err(err.into()),
        };

        let marker = Self { path: path.to_path_buf() };
        write!(file, "{}", std::process::id())?;
        tracing::debug!(path = %path.display(), "acquired pid marker");
        Ok(marker)
    }

    /// Path of the marker.
    #[must_use]
    pub fn path(&self) -> &Path { &self.path }

    /// Removes the marker at `path`. A missing marker is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn remove(path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if let Err(err) = Self::remove(&self.path) {
            tracing::warn!(path = %self.path.display(), "failed to remove pid marker: {err}");
        }
    }
}
