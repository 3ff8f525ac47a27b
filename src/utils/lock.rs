use crate::error::{Result, UpgradeError};
use crate::utils::path_validator::PathValidator;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Exclusive marker that one upgrade run owns a version manager.
///
/// The lock file is created with `create_new`, so a second run for the same
/// manager fails instead of racing the first. The file is removed on drop.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    pub fn acquire(lock_dir: impl AsRef<Path>, manager: &str) -> Result<Self> {
        let dir = PathValidator::validate_state_dir(lock_dir)?;
        let path = dir.join(format!("langup-{manager}.lock"));

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let holder = fs::read_to_string(&path).unwrap_or_default();
                let holder = holder.trim();
                let owner = if holder.is_empty() {
                    String::new()
                } else {
                    format!(" (pid {holder})")
                };
                return Err(UpgradeError::AlreadyRunning(format!(
                    "lock file '{}' exists{owner}; remove it if no other run is active",
                    path.display()
                )));
            }
            Err(e) => {
                return Err(UpgradeError::BadArgument(format!(
                    "Cannot create lock file '{}': {e}",
                    path.display()
                )));
            }
        };

        // The pid is informational only.
        let _ = writeln!(file, "{}", std::process::id());

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
