//! Exclusive workspace lock
//!
//! A sibling `<workspace>.lock` file created with `create_new`, so a second
//! process editing the same workspace fails instead of racing. The file is
//! removed when the guard drops.

use crate::error::{Error, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Guard holding the schema lock of one workspace
#[derive(Debug)]
pub struct WorkspaceLock {
    path: PathBuf,
}

impl WorkspaceLock {
    /// Acquire the lock for `workspace`.
    pub fn acquire<P: AsRef<Path>>(workspace: P) -> Result<Self> {
        let workspace = workspace.as_ref();
        let path = Self::lock_path(workspace);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => Self::locked(workspace, &path),
                _ => Error::Io(e),
            })?;
        writeln!(file, "{}", std::process::id())?;
        debug!("Acquired lock {}", path.display());
        Ok(Self { path })
    }

    /// Error naming the lock file and, when readable, the process that wrote it.
    /// A lock left behind by a crashed run has to be removed by hand.
    fn locked(workspace: &Path, lock: &Path) -> Error {
        let holder = fs::read_to_string(lock)
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .map(|pid| format!(" held by pid {}", pid))
            .unwrap_or_default();
        Error::SchemaLocked(format!(
            "{} (lock file {}{}; remove it if no other run is active)",
            workspace.display(),
            lock.display(),
            holder
        ))
    }

    /// Lock file path used for `workspace`
    pub fn lock_path(workspace: &Path) -> PathBuf {
        let mut name = workspace.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }
}

impl Drop for WorkspaceLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("Could not release lock {}: {}", self.path.display(), e);
        }
    }
}
