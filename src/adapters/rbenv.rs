use super::{CommandRunner, SystemRunner, ToolCommand, VersionManagerAdapter, execute, query};
use crate::config::RubyConfig;
use crate::error::{Result, UpgradeError};
use crate::upgrade::InstalledSet;
use crate::version::{Version, VersionComparator};
use regex::Regex;
use std::collections::BTreeSet;

const TOOL: &str = "rbenv";

/// RbenvAdapter manages CRuby versions installed through rbenv and ruby-build.
///
/// Other interpreters rbenv may host (jruby, truffleruby, ...) are outside its
/// scope and never reported as installed.
pub struct RbenvAdapter<R = SystemRunner> {
    runner: R,
    command: String,
    install_args: Vec<String>,
}

impl RbenvAdapter<SystemRunner> {
    pub fn new(config: &RubyConfig) -> Self {
        Self::with_runner(SystemRunner, config)
    }
}

impl<R: CommandRunner> RbenvAdapter<R> {
    pub fn with_runner(runner: R, config: &RubyConfig) -> Self {
        Self {
            runner,
            command: config.command.clone(),
            install_args: config.install_args.clone(),
        }
    }

    fn rbenv(&self) -> ToolCommand {
        ToolCommand::new(&self.command)
    }

    /// `gem` run through rbenv under a specific ruby
    fn gem(&self, version: &str) -> ToolCommand {
        self.rbenv()
            .args(["exec", "gem"])
            .env("RBENV_VERSION", version)
    }

    fn installed_gems(&self, version: &str) -> std::result::Result<BTreeSet<String>, String> {
        let command = self.gem(version).args(["list", "--no-versions"]);
        match self.runner.run(&command) {
            Ok(output) if output.success() => Ok(parse_gem_names(&output.stdout)),
            Ok(output) => Err(output.failure_summary(&command)),
            Err(e) => Err(format!("failed to execute `{}`: {e}", command.display())),
        }
    }
}

impl<R: CommandRunner> VersionManagerAdapter for RbenvAdapter<R> {
    fn name(&self) -> &str {
        TOOL
    }

    fn list_installed(&self) -> Result<InstalledSet> {
        let versions = query(&self.runner, TOOL, &self.rbenv().args(["versions", "--bare"]))?;
        let global = query(&self.runner, TOOL, &self.rbenv().arg("global"))?;
        parse_installed(&versions, &global)
    }

    fn latest_available(&self) -> Result<String> {
        let stdout = query(&self.runner, TOOL, &self.rbenv().args(["install", "--list"]))?;
        let release = release_regex()?;
        let releases: Vec<String> = stdout
            .lines()
            .map(str::trim)
            .filter(|line| release.is_match(line))
            .map(str::to_string)
            .collect();

        VersionComparator::latest_matching(&releases, Version::is_release).ok_or_else(|| {
            UpgradeError::tool_query(TOOL, "`rbenv install --list` listed no stable ruby release")
        })
    }

    fn install(&self, version: &str) -> Result<()> {
        let command = self
            .rbenv()
            .arg("install")
            .args(self.install_args.iter().cloned())
            .arg(version)
            .long_running();
        execute(&self.runner, &command, |message| UpgradeError::Install {
            version: version.to_string(),
            message,
        })
    }

    fn uninstall(&self, version: &str) -> Result<()> {
        let command = self.rbenv().args(["uninstall", "-f", version]);
        execute(&self.runner, &command, |message| UpgradeError::Uninstall {
            version: version.to_string(),
            message,
        })
    }

    fn switch_active(&self, version: &str) -> Result<()> {
        let command = self.rbenv().args(["global", version]);
        execute(&self.runner, &command, |message| UpgradeError::Switch {
            version: version.to_string(),
            message,
        })
    }

    fn clone_libraries(&self, old_version: &str, new_version: &str) -> Result<()> {
        let clone_error = |message| UpgradeError::Clone {
            from: old_version.to_string(),
            to: new_version.to_string(),
            message,
        };

        let wanted = self.installed_gems(old_version).map_err(clone_error)?;
        let present = self.installed_gems(new_version).map_err(clone_error)?;
        let missing: Vec<&String> = wanted.difference(&present).collect();

        if missing.is_empty() {
            crate::utils::logger::verbose(&format!(
                "{new_version} already has every gem of {old_version}"
            ));
            return Ok(());
        }

        let command = self
            .gem(new_version)
            .arg("install")
            .args(missing.into_iter().cloned())
            .long_running();
        execute(&self.runner, &command, clone_error)
    }
}

fn release_regex() -> Result<Regex> {
    Regex::new(r"^\d+\.\d+\.\d+$")
        .map_err(|e| UpgradeError::tool_query(TOOL, format!("Regex error: {e}")))
}

/// Combine `rbenv versions --bare` with `rbenv global` into an installed set
pub fn parse_installed(versions: &str, global: &str) -> Result<InstalledSet> {
    let cruby = Regex::new(r"^\d+\.\d+\.\d+(-[0-9A-Za-z.]+)?$")
        .map_err(|e| UpgradeError::tool_query(TOOL, format!("Regex error: {e}")))?;

    let mut installed: Vec<String> = versions
        .lines()
        .map(str::trim)
        .filter(|line| cruby.is_match(line))
        .map(str::to_string)
        .collect();
    VersionComparator::sort_by_number(&mut installed, "");

    let active = global
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string);

    Ok(InstalledSet::new(installed, active))
}

/// Gem names from `gem list --no-versions`, skipping the section banner
pub fn parse_gem_names(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("***"))
        .map(str::to_string)
        .collect()
}
