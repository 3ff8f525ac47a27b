use crate::exit_codes;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpgradeError {
    #[error("Invalid argument: {0}")]
    BadArgument(String),

    #[error("Querying {tool} failed: {message}")]
    ToolQuery { tool: String, message: String },

    #[error("Installing {version} failed: {message}")]
    Install { version: String, message: String },

    #[error("Copying libraries from {from} to {to} failed: {message}")]
    Clone {
        from: String,
        to: String,
        message: String,
    },

    #[error("Switching to {version} failed: {message}")]
    Switch { version: String, message: String },

    #[error("Uninstalling {version} failed: {message}")]
    Uninstall { version: String, message: String },

    #[error("Interrupted {0}")]
    Interrupted(String),

    #[error("Another upgrade is already running: {0}")]
    AlreadyRunning(String),
}

impl UpgradeError {
    pub fn tool_query(tool: &str, message: impl Into<String>) -> Self {
        UpgradeError::ToolQuery {
            tool: tool.to_string(),
            message: message.into(),
        }
    }

    /// Exit code reported to the shell for this failure kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            UpgradeError::BadArgument(_) => exit_codes::BAD_ARGUMENT,
            UpgradeError::ToolQuery { .. } => exit_codes::TOOL_QUERY,
            UpgradeError::Install { .. } => exit_codes::INSTALL,
            UpgradeError::Clone { .. } => exit_codes::CLONE,
            UpgradeError::Switch { .. } => exit_codes::SWITCH,
            UpgradeError::Uninstall { .. } => exit_codes::UNINSTALL,
            UpgradeError::Interrupted(_) => exit_codes::INTERRUPTED,
            UpgradeError::AlreadyRunning(_) => exit_codes::ALREADY_RUNNING,
        }
    }
}

pub type Result<T> = std::result::Result<T, UpgradeError>;
