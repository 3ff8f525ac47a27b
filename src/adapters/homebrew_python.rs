use super::{CommandRunner, SystemRunner, ToolCommand, VersionManagerAdapter, execute, query};
use crate::config::PythonConfig;
use crate::error::{Result, UpgradeError};
use crate::upgrade::InstalledSet;
use crate::version::VersionComparator;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const TOOL: &str = "brew";
const FORMULA_PREFIX: &str = "python@";

/// HomebrewPythonAdapter treats each `python@X.Y` formula as one installed version.
///
/// The active version is the formula that `$(brew --prefix)/bin/python3` points
/// into. Packages migrate through pip's user site.
pub struct HomebrewPythonAdapter<R = SystemRunner> {
    runner: R,
    brew: String,
    pip_install_args: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BrewInfo {
    formulae: Vec<BrewFormula>,
}

#[derive(Debug, Deserialize)]
struct BrewFormula {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PipPackage {
    name: String,
}

impl HomebrewPythonAdapter<SystemRunner> {
    pub fn new(config: &PythonConfig) -> Self {
        Self::with_runner(SystemRunner, config)
    }
}

impl<R: CommandRunner> HomebrewPythonAdapter<R> {
    pub fn with_runner(runner: R, config: &PythonConfig) -> Self {
        Self {
            runner,
            brew: config.brew.clone(),
            pip_install_args: config.pip_install_args.clone(),
        }
    }

    fn brew(&self) -> ToolCommand {
        ToolCommand::new(&self.brew)
    }

    fn prefix(&self) -> Result<PathBuf> {
        let stdout = query(&self.runner, TOOL, &self.brew().arg("--prefix"))?;
        let prefix = stdout.trim();
        if prefix.is_empty() {
            return Err(UpgradeError::tool_query(TOOL, "`brew --prefix` printed nothing"));
        }
        Ok(PathBuf::from(prefix))
    }

    fn active_formula(prefix: &Path) -> Option<String> {
        std::fs::read_link(prefix.join("bin").join("python3"))
            .ok()
            .and_then(|target| formula_in_path(&target))
    }

    /// `<prefix>/opt/python@X.Y/bin/pythonX.Y`
    fn interpreter(prefix: &Path, formula: &str) -> PathBuf {
        let series = formula.trim_start_matches(FORMULA_PREFIX);
        prefix
            .join("opt")
            .join(formula)
            .join("bin")
            .join(format!("python{series}"))
    }

    fn user_packages(&self, python: &Path) -> std::result::Result<Vec<String>, String> {
        let command = ToolCommand::new(python.to_string_lossy()).args([
            "-m",
            "pip",
            "list",
            "--user",
            "--not-required",
            "--format=json",
        ]);
        let output = self
            .runner
            .run(&command)
            .map_err(|e| format!("failed to execute `{}`: {e}", command.display()))?;
        if !output.success() {
            return Err(output.failure_summary(&command));
        }
        parse_pip_list(&output.stdout)
            .map_err(|e| format!("unexpected output from `{}`: {e}", command.display()))
    }
}

impl<R: CommandRunner> VersionManagerAdapter for HomebrewPythonAdapter<R> {
    fn name(&self) -> &str {
        TOOL
    }

    fn list_installed(&self) -> Result<InstalledSet> {
        let stdout = query(&self.runner, TOOL, &self.brew().args(["list", "--formula", "-1"]))?;
        let versions = parse_formula_list(&stdout)?;
        let prefix = self.prefix()?;
        let active = Self::active_formula(&prefix);
        Ok(InstalledSet::new(versions, active))
    }

    fn latest_available(&self) -> Result<String> {
        let stdout = query(
            &self.runner,
            TOOL,
            &self.brew().args(["info", "--json=v2", "python3"]),
        )?;
        parse_latest_formula(&stdout)
    }

    fn install(&self, version: &str) -> Result<()> {
        let command = self.brew().args(["install", version]).long_running();
        execute(&self.runner, &command, |message| UpgradeError::Install {
            version: version.to_string(),
            message,
        })
    }

    fn uninstall(&self, version: &str) -> Result<()> {
        let command = self.brew().args(["uninstall", version]);
        execute(&self.runner, &command, |message| UpgradeError::Uninstall {
            version: version.to_string(),
            message,
        })
    }

    fn switch_active(&self, version: &str) -> Result<()> {
        let switch_error = |message| UpgradeError::Switch {
            version: version.to_string(),
            message,
        };

        let prefix = self.prefix().map_err(|e| switch_error(e.to_string()))?;
        if let Some(current) = Self::active_formula(&prefix) {
            if current != version {
                execute(
                    &self.runner,
                    &self.brew().args(["unlink", current.as_str()]),
                    switch_error,
                )?;
            }
        }

        execute(
            &self.runner,
            &self.brew().args(["link", "--overwrite", version]),
            switch_error,
        )
    }

    fn clone_libraries(&self, old_version: &str, new_version: &str) -> Result<()> {
        let clone_error = |message| UpgradeError::Clone {
            from: old_version.to_string(),
            to: new_version.to_string(),
            message,
        };

        let prefix = self.prefix().map_err(|e| clone_error(e.to_string()))?;
        let packages = self
            .user_packages(&Self::interpreter(&prefix, old_version))
            .map_err(clone_error)?;
        if packages.is_empty() {
            crate::utils::logger::verbose(&format!("No user packages installed for {old_version}"));
            return Ok(());
        }

        let command = ToolCommand::new(Self::interpreter(&prefix, new_version).to_string_lossy())
            .args(["-m", "pip", "install"])
            .args(self.pip_install_args.iter().cloned())
            .args(packages)
            .long_running();
        execute(&self.runner, &command, clone_error)
    }
}

fn formula_regex() -> Result<Regex> {
    Regex::new(r"^python@\d+\.\d+$")
        .map_err(|e| UpgradeError::tool_query(TOOL, format!("Regex error: {e}")))
}

/// `python@X.Y` formula names from `brew list --formula -1`, ascending
pub fn parse_formula_list(output: &str) -> Result<Vec<String>> {
    let regex = formula_regex()?;
    let mut formulae: Vec<String> = output
        .lines()
        .map(str::trim)
        .filter(|line| regex.is_match(line))
        .map(str::to_string)
        .collect();
    VersionComparator::sort_by_number(&mut formulae, FORMULA_PREFIX);
    Ok(formulae)
}

/// Canonical formula behind the `python3` alias in `brew info --json=v2` output
pub fn parse_latest_formula(output: &str) -> Result<String> {
    let info: BrewInfo = serde_json::from_str(output)
        .map_err(|e| UpgradeError::tool_query(TOOL, format!("invalid `brew info` JSON: {e}")))?;

    let regex = formula_regex()?;
    info.formulae
        .into_iter()
        .map(|formula| formula.name)
        .find(|name| regex.is_match(name))
        .ok_or_else(|| {
            UpgradeError::tool_query(TOOL, "`brew info python3` named no python@X.Y formula")
        })
}

/// Formula a `python3` symlink target points into, e.g.
/// `../Cellar/python@3.12/3.12.4/bin/python3` -> `python@3.12`
pub fn formula_in_path(target: &Path) -> Option<String> {
    let regex = formula_regex().ok()?;
    target
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .find(|part| regex.is_match(part))
        .map(str::to_string)
}

/// Package names from `pip list --format=json`
pub fn parse_pip_list(output: &str) -> serde_json::Result<Vec<String>> {
    let packages: Vec<PipPackage> = serde_json::from_str(output.trim())?;
    Ok(packages.into_iter().map(|p| p.name).collect())
}
