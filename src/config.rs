use crate::error::{Result, UpgradeError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming a configuration file when `--config` is absent
pub const CONFIG_ENV: &str = "LANGUP_CONFIG";

/// Settings read from the optional TOML configuration file
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Guard each manager with a lock file while a run is active
    pub lock: bool,
    /// Directory holding the lock files; the system temp dir when unset
    pub lock_dir: Option<PathBuf>,
    pub perl: PerlConfig,
    pub ruby: RubyConfig,
    pub python: PythonConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock: true,
            lock_dir: None,
            perl: PerlConfig::default(),
            ruby: RubyConfig::default(),
            python: PythonConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PerlConfig {
    pub command: String,
    /// Extra arguments for `perlbrew install`, e.g. `--notest`
    pub install_args: Vec<String>,
}

impl Default for PerlConfig {
    fn default() -> Self {
        Self {
            command: "perlbrew".to_string(),
            install_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RubyConfig {
    pub command: String,
    pub install_args: Vec<String>,
}

impl Default for RubyConfig {
    fn default() -> Self {
        Self {
            command: "rbenv".to_string(),
            install_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PythonConfig {
    pub brew: String,
    /// Arguments placed before the package names in `pip install`.
    ///
    /// Homebrew marks its interpreters EXTERNALLY-MANAGED (PEP 668), so a user
    /// site install needs `--break-system-packages`.
    pub pip_install_args: Vec<String>,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            brew: "brew".to_string(),
            pip_install_args: vec!["--user".to_string(), "--break-system-packages".to_string()],
        }
    }
}

impl Config {
    /// Load the configuration named on the command line or in `LANGUP_CONFIG`.
    ///
    /// Without either, the defaults apply. A named file that cannot be read or
    /// parsed is an argument error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            UpgradeError::BadArgument(format!(
                "Failed to read config '{}': {e}",
                path.display()
            ))
        })?;
        Self::parse(&content).map_err(|e| match e {
            UpgradeError::BadArgument(msg) => {
                UpgradeError::BadArgument(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| UpgradeError::BadArgument(format!("Invalid config: {e}")))
    }

    pub fn lock_dir(&self) -> PathBuf {
        self.lock_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
