// Version manager bindings
//
// Every binding implements `VersionManagerAdapter`, the capability set the
// upgrade coordinator relies on. Parsing of tool output stays inside the
// binding; the coordinator only sees version strings.
pub mod command;
pub mod homebrew_python;
pub mod perlbrew;
pub mod rbenv;

pub use command::{CommandRunner, SystemRunner, ToolCommand};
pub use homebrew_python::HomebrewPythonAdapter;
pub use perlbrew::PerlbrewAdapter;
pub use rbenv::RbenvAdapter;

use crate::error::Result;
use crate::upgrade::InstalledSet;

/// Capability interface over an external version management tool
pub trait VersionManagerAdapter {
    /// Short name of the underlying tool, used in messages
    fn name(&self) -> &str;

    /// Installed versions in ascending order, with the active one if any
    fn list_installed(&self) -> Result<InstalledSet>;

    /// Newest version the tool considers stable and installable
    fn latest_available(&self) -> Result<String>;

    fn install(&self, version: &str) -> Result<()>;

    fn uninstall(&self, version: &str) -> Result<()>;

    fn switch_active(&self, version: &str) -> Result<()>;

    /// Reinstall the packages of `old_version` into `new_version`
    fn clone_libraries(&self, old_version: &str, new_version: &str) -> Result<()>;
}

/// Run a query command and return its stdout, mapping any failure to a tool query error
pub(crate) fn query<R: CommandRunner>(
    runner: &R,
    tool: &str,
    command: &ToolCommand,
) -> Result<String> {
    let output = runner.run(command).map_err(|e| {
        crate::error::UpgradeError::tool_query(
            tool,
            format!("failed to execute `{}`: {e}", command.display()),
        )
    })?;

    if !output.success() {
        return Err(crate::error::UpgradeError::tool_query(
            tool,
            output.failure_summary(command),
        ));
    }

    Ok(output.stdout)
}

/// Run a mutating command; on failure hand the message to `to_error`
pub(crate) fn execute<R, F>(runner: &R, command: &ToolCommand, to_error: F) -> Result<()>
where
    R: CommandRunner,
    F: FnOnce(String) -> crate::error::UpgradeError,
{
    match runner.run(command) {
        Ok(output) if output.success() => Ok(()),
        Ok(output) => Err(to_error(output.failure_summary(command))),
        Err(e) => Err(to_error(format!(
            "failed to execute `{}`: {e}",
            command.display()
        ))),
    }
}
