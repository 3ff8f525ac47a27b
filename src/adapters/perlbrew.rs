use super::{CommandRunner, SystemRunner, ToolCommand, VersionManagerAdapter, execute, query};
use crate::config::PerlConfig;
use crate::error::{Result, UpgradeError};
use crate::upgrade::InstalledSet;
use crate::version::VersionComparator;
use regex::Regex;

const TOOL: &str = "perlbrew";

/// PerlbrewAdapter manages perl builds installed with perlbrew
pub struct PerlbrewAdapter<R = SystemRunner> {
    runner: R,
    command: String,
    install_args: Vec<String>,
}

impl PerlbrewAdapter<SystemRunner> {
    pub fn new(config: &PerlConfig) -> Self {
        Self::with_runner(SystemRunner, config)
    }
}

impl<R: CommandRunner> PerlbrewAdapter<R> {
    pub fn with_runner(runner: R, config: &PerlConfig) -> Self {
        Self {
            runner,
            command: config.command.clone(),
            install_args: config.install_args.clone(),
        }
    }

    fn perlbrew(&self) -> ToolCommand {
        ToolCommand::new(&self.command)
    }
}

impl<R: CommandRunner> VersionManagerAdapter for PerlbrewAdapter<R> {
    fn name(&self) -> &str {
        TOOL
    }

    fn list_installed(&self) -> Result<InstalledSet> {
        let stdout = query(&self.runner, TOOL, &self.perlbrew().arg("list"))?;
        parse_installed(&stdout)
    }

    fn latest_available(&self) -> Result<String> {
        let stdout = query(&self.runner, TOOL, &self.perlbrew().arg("available"))?;
        let releases = parse_available(&stdout)?;

        // Odd minor releases are development series.
        VersionComparator::latest_matching(&releases, |v| v.minor().is_some_and(|m| m % 2 == 0))
            .map(|number| format!("perl-{number}"))
            .ok_or_else(|| {
                UpgradeError::tool_query(TOOL, "no stable perl release in `perlbrew available`")
            })
    }

    fn install(&self, version: &str) -> Result<()> {
        let command = self
            .perlbrew()
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
        let command = self.perlbrew().args(["--yes", "uninstall", version]);
        execute(&self.runner, &command, |message| UpgradeError::Uninstall {
            version: version.to_string(),
            message,
        })
    }

    fn switch_active(&self, version: &str) -> Result<()> {
        let command = self.perlbrew().args(["switch", version]);
        execute(&self.runner, &command, |message| UpgradeError::Switch {
            version: version.to_string(),
            message,
        })
    }

    fn clone_libraries(&self, old_version: &str, new_version: &str) -> Result<()> {
        let command = self
            .perlbrew()
            .args(["clone-modules", old_version, new_version])
            .long_running();
        execute(&self.runner, &command, |message| UpgradeError::Clone {
            from: old_version.to_string(),
            to: new_version.to_string(),
            message,
        })
    }
}

fn perl_name_regex() -> Result<Regex> {
    Regex::new(r"^perl-(\d+\.\d+\.\d+)$")
        .map_err(|e| UpgradeError::tool_query(TOOL, format!("Regex error: {e}")))
}

/// Parse `perlbrew list`: one build per line, `*` in front of the active one.
///
/// Library entries (`perl-5.38.2@dev`) and custom-named builds are skipped, but a
/// starred library still counts as the active selection.
pub fn parse_installed(output: &str) -> Result<InstalledSet> {
    let name_regex = perl_name_regex()?;
    let mut versions = Vec::new();
    let mut active = None;

    for line in output.lines() {
        let trimmed = line.trim();
        let (is_active, rest) = match trimmed.strip_prefix('*') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        let Some(name) = rest.split_whitespace().next() else {
            continue;
        };

        if is_active {
            active = Some(name.to_string());
        }
        if name_regex.is_match(name) {
            versions.push(name.to_string());
        }
    }

    VersionComparator::sort_by_number(&mut versions, "perl-");
    Ok(InstalledSet::new(versions, active))
}

/// Parse `perlbrew available` into bare release numbers (`5.38.2`).
///
/// Lines look like `i perl-5.38.2` or `  perl-5.39.10  available from <url>`;
/// cperl, release candidates and section headers are ignored.
pub fn parse_available(output: &str) -> Result<Vec<String>> {
    let name_regex = perl_name_regex()?;

    let releases: Vec<String> = output
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            let trimmed = trimmed.strip_prefix("i ").unwrap_or(trimmed);
            let name = trimmed.split_whitespace().next()?;
            name_regex
                .captures(name)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
        .collect();

    if releases.is_empty() {
        return Err(UpgradeError::tool_query(
            TOOL,
            "`perlbrew available` listed no perl releases",
        ));
    }

    Ok(releases)
}
