use crate::adapters::{
    HomebrewPythonAdapter, PerlbrewAdapter, RbenvAdapter, VersionManagerAdapter,
};
use crate::cli::{Manager, UpgradeArgs};
use crate::config::Config;
use crate::error::Result;
use crate::interrupt::Interrupt;
use crate::upgrade::{CleanupDecision, UpgradeCoordinator, UpgradePlan, UpgradeReport};
use crate::utils::lock::RunLock;
use colored::Colorize;
use std::path::Path;

/// Build the adapter for a runtime family from its configuration section
pub fn adapter_for(manager: Manager, config: &Config) -> Box<dyn VersionManagerAdapter> {
    match manager {
        Manager::Perl => Box::new(PerlbrewAdapter::new(&config.perl)),
        Manager::Ruby => Box::new(RbenvAdapter::new(&config.ruby)),
        Manager::Python => Box::new(HomebrewPythonAdapter::new(&config.python)),
    }
}

/// Execute the upgrade workflow for one version manager
pub fn execute_upgrade(
    manager: Manager,
    args: UpgradeArgs,
    config_path: Option<&Path>,
    interrupt: Interrupt,
) -> Result<()> {
    let config = Config::load(config_path)?;
    let adapter = adapter_for(manager, &config);

    if args.dry_run {
        return execute_dry_run(adapter.as_ref(), args.cleanup, interrupt);
    }

    println!(
        "{}",
        format!("Upgrading {} via {}...", manager.key(), adapter.name())
            .cyan()
            .bold()
    );

    let _lock = if config.lock {
        let lock = RunLock::acquire(config.lock_dir(), manager.key())?;
        crate::utils::logger::verbose(&format!("Holding {}", lock.path().display()));
        Some(lock)
    } else {
        None
    };

    let coordinator = UpgradeCoordinator::new(adapter.as_ref(), interrupt);
    let report = coordinator.run(args.cleanup)?;

    print_upgrade_report(&report);
    println!("\n{}", "✨ Upgrade completed successfully!".green().bold());
    Ok(())
}

fn execute_dry_run(
    adapter: &dyn VersionManagerAdapter,
    cleanup: bool,
    interrupt: Interrupt,
) -> Result<()> {
    println!(
        "{}",
        format!("Planning {} upgrade (dry run)...", adapter.name())
            .cyan()
            .bold()
    );

    let (plan, decision) = UpgradeCoordinator::new(adapter, interrupt).plan(cleanup)?;
    print_plan(&plan, &decision);
    Ok(())
}

fn print_plan(plan: &UpgradePlan, decision: &CleanupDecision) {
    println!(
        "\n  Latest stable: {}",
        plan.new_version.as_str().green().bold()
    );

    if !plan.needs_install && decision.is_empty() {
        println!("\n{}", "✨ Nothing to do".green().bold());
        return;
    }

    let mut steps = Vec::new();
    if plan.needs_install {
        steps.push(format!("install {}", plan.new_version));
        if let Some(old) = &plan.old_version {
            steps.push(format!("copy libraries from {old} to {}", plan.new_version));
        }
    }
    if let Some(target) = &decision.switch_to {
        steps.push(format!("switch to {target}"));
    }
    for version in &decision.versions_to_remove {
        steps.push(format!("uninstall {version}"));
    }

    println!("\n{}:", "Planned steps".cyan().bold());
    for (index, step) in steps.iter().enumerate() {
        println!("  {}. {}", index + 1, step);
    }
    println!("\n{}", "Run again without --dry-run to apply.".dimmed());
}

fn print_upgrade_report(report: &UpgradeReport) {
    if report.is_empty() {
        println!("\n{}", "Already up to date, nothing changed".yellow());
        return;
    }

    println!("\n{}", "Upgrade Summary:".cyan().bold());

    if let Some(version) = &report.installed {
        println!("  • {} {}", "installed".white().bold(), version.green());
    }
    if let Some((from, to)) = &report.libraries_cloned {
        println!(
            "  • {} {} → {}",
            "libraries".white().bold(),
            from.red(),
            to.green()
        );
    }
    if let Some(version) = &report.switched_to {
        println!("  • {} {}", "active".white().bold(), version.green().bold());
    }
    for version in &report.removed {
        println!("  • {} {}", "removed".white().bold(), version.red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpgradeError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn adapters_report_their_tool() {
        let config = Config::default();
        assert_eq!(adapter_for(Manager::Perl, &config).name(), "perlbrew");
        assert_eq!(adapter_for(Manager::Ruby, &config).name(), "rbenv");
        assert_eq!(adapter_for(Manager::Python, &config).name(), "brew");
    }

    #[test]
    fn missing_tool_fails_as_query_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("langup.toml");
        fs::write(
            &config_path,
            format!(
                "lock_dir = {:?}\n[perl]\ncommand = \"langup-missing-perlbrew\"\n",
                dir.path().display().to_string()
            ),
        )
        .unwrap();

        let args = UpgradeArgs {
            cleanup: true,
            dry_run: false,
        };
        let err =
            execute_upgrade(Manager::Perl, args, Some(&config_path), Interrupt::new()).unwrap_err();
        assert!(matches!(err, UpgradeError::ToolQuery { .. }));
        assert!(!dir.path().join("langup-perl.lock").exists());
    }

    #[test]
    fn held_lock_blocks_a_second_run() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("langup.toml");
        fs::write(
            &config_path,
            format!("lock_dir = {:?}\n", dir.path().display().to_string()),
        )
        .unwrap();
        let _held = RunLock::acquire(dir.path(), "ruby").unwrap();

        let args = UpgradeArgs {
            cleanup: false,
            dry_run: false,
        };
        let err =
            execute_upgrade(Manager::Ruby, args, Some(&config_path), Interrupt::new()).unwrap_err();
        assert!(matches!(err, UpgradeError::AlreadyRunning(_)));
    }

    #[test]
    fn bad_config_is_an_argument_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("langup.toml");
        fs::write(&config_path, "lock = \"yes\"\n").unwrap();

        let args = UpgradeArgs {
            cleanup: false,
            dry_run: true,
        };
        let err = execute_upgrade(Manager::Python, args, Some(&config_path), Interrupt::new())
            .unwrap_err();
        assert_eq!(err.exit_code(), crate::exit_codes::BAD_ARGUMENT);
    }
}
