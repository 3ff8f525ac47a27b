use crate::error::{Result, UpgradeError};
use std::path::{Path, PathBuf};

/// Checks directories taken from configuration before anything is written into them.
pub struct PathValidator;

impl PathValidator {
    /// Canonicalises a directory that will hold run state such as lock files.
    pub fn validate_state_dir(path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();

        let canonical = path.canonicalize().map_err(|e| {
            UpgradeError::BadArgument(format!("Invalid directory '{}': {e}", path.display()))
        })?;

        if !canonical.is_dir() {
            return Err(UpgradeError::BadArgument(format!(
                "Path '{}' is not a directory",
                canonical.display()
            )));
        }

        const FORBIDDEN: &[&str] = &["/etc", "/sys", "/proc", "/dev", "/boot"];

        for forbidden in FORBIDDEN {
            let forbidden_path = Path::new(forbidden);
            let hits = canonical.starts_with(forbidden_path)
                || forbidden_path
                    .canonicalize()
                    .is_ok_and(|resolved| canonical.starts_with(resolved));

            if hits {
                return Err(UpgradeError::BadArgument(format!(
                    "Refusing to keep state under system directory '{}'",
                    forbidden
                )));
            }
        }

        Ok(canonical)
    }
}
