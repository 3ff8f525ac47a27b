use super::plan::{CleanupDecision, InstalledSet, UpgradePlan, UpgradeReport};
use super::policy::CleanupPolicy;
use crate::adapters::VersionManagerAdapter;
use crate::error::{Result, UpgradeError};
use crate::interrupt::Interrupt;
use crate::utils::logger;

/// Drives one upgrade run against a version manager.
///
/// Steps run strictly in order and the first failure ends the run. Nothing
/// that already happened is undone.
pub struct UpgradeCoordinator<'a> {
    adapter: &'a dyn VersionManagerAdapter,
    interrupt: Interrupt,
}

impl<'a> UpgradeCoordinator<'a> {
    pub fn new(adapter: &'a dyn VersionManagerAdapter, interrupt: Interrupt) -> Self {
        Self { adapter, interrupt }
    }

    /// Work out the plan and cleanup decision without changing anything
    pub fn plan(&self, cleanup_requested: bool) -> Result<(UpgradePlan, CleanupDecision)> {
        let (mut installed, plan) = self.survey()?;
        if plan.needs_install {
            installed.add_installed(&plan.new_version);
        }
        let decision = Self::decide(cleanup_requested, &installed, &plan);
        Ok((plan, decision))
    }

    pub fn run(&self, cleanup_requested: bool) -> Result<UpgradeReport> {
        let mut report = UpgradeReport::new();
        let (mut installed, plan) = self.survey()?;

        if plan.needs_install {
            let new = plan.new_version.as_str();

            self.step(&format!("installing {new}"), || self.adapter.install(new))?;
            logger::event(&format!("Installed {new} with {}", self.adapter.name()));
            report.installed = Some(new.to_string());
            installed.add_installed(new);

            if let Some(old) = plan.old_version.as_deref() {
                self.step(&format!("copying libraries from {old} to {new}"), || {
                    self.adapter.clone_libraries(old, new)
                })?;
                logger::event(&format!("Copied libraries from {old} to {new}"));
                report.libraries_cloned = Some((old.to_string(), new.to_string()));
            }
        }

        let decision = Self::decide(cleanup_requested, &installed, &plan);

        if let Some(target) = decision.switch_to.as_deref() {
            self.step(&format!("switching to {target}"), || {
                self.adapter.switch_active(target)
            })?;
            logger::event(&format!("Switched active version to {target}"));
            report.switched_to = Some(target.to_string());
        }

        for version in &decision.versions_to_remove {
            self.step(&format!("uninstalling {version}"), || {
                self.adapter.uninstall(version)
            })?;
            logger::event(&format!("Uninstalled {version}"));
            report.removed.push(version.clone());
        }

        Ok(report)
    }

    fn survey(&self) -> Result<(InstalledSet, UpgradePlan)> {
        let installed = self.step("querying installed versions", || {
            self.adapter.list_installed()
        })?;
        let latest = self.step("querying available versions", || {
            self.adapter.latest_available()
        })?;
        logger::verbose(&format!(
            "{}: installed {:?} (active {:?}), latest stable {latest}",
            self.adapter.name(),
            installed.versions,
            installed.active
        ));

        let plan = UpgradePlan::new(&installed, &latest);
        Ok((installed, plan))
    }

    fn decide(
        cleanup_requested: bool,
        installed: &InstalledSet,
        plan: &UpgradePlan,
    ) -> CleanupDecision {
        CleanupPolicy::decide(
            cleanup_requested,
            installed.active(),
            plan.old_version.as_deref(),
            &plan.new_version,
            installed,
        )
    }

    /// Run one adapter call unless an interrupt is pending; a failure that
    /// coincides with an interrupt is reported as the interrupt.
    fn step<T, F>(&self, description: &str, action: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        if self.interrupt.is_requested() {
            return Err(UpgradeError::Interrupted(format!("before {description}")));
        }

        match action() {
            Err(_) if self.interrupt.is_requested() => {
                Err(UpgradeError::Interrupted(format!("while {description}")))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Failing {
        Nothing,
        Query,
        Install,
        Clone,
        Switch,
        Uninstall,
    }

    /// In-memory version manager that records every call it receives
    struct FakeManager {
        state: RefCell<InstalledSet>,
        latest: String,
        failing: Failing,
        calls: RefCell<Vec<String>>,
        interrupt_on_install: Option<Interrupt>,
    }

    impl FakeManager {
        fn new(versions: &[&str], active: Option<&str>, latest: &str) -> Self {
            Self {
                state: RefCell::new(InstalledSet::new(
                    versions.iter().map(|v| v.to_string()).collect(),
                    active.map(str::to_string),
                )),
                latest: latest.to_string(),
                failing: Failing::Nothing,
                calls: RefCell::new(Vec::new()),
                interrupt_on_install: None,
            }
        }

        fn failing(mut self, failing: Failing) -> Self {
            self.failing = failing;
            self
        }

        fn record(&self, call: String, kind: Failing) -> Result<()> {
            self.calls.borrow_mut().push(call.clone());
            if self.failing == kind {
                let message = "simulated failure".to_string();
                return Err(match kind {
                    Failing::Install => UpgradeError::Install {
                        version: call,
                        message,
                    },
                    Failing::Clone => UpgradeError::Clone {
                        from: call.clone(),
                        to: call,
                        message,
                    },
                    Failing::Switch => UpgradeError::Switch {
                        version: call,
                        message,
                    },
                    Failing::Uninstall => UpgradeError::Uninstall {
                        version: call,
                        message,
                    },
                    _ => UpgradeError::tool_query("fake", message),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn mutating_calls(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter(|c| !c.starts_with("list") && !c.starts_with("latest"))
                .collect()
        }

        fn final_state(&self) -> InstalledSet {
            self.state.borrow().clone()
        }
    }

    impl VersionManagerAdapter for FakeManager {
        fn name(&self) -> &str {
            "fake"
        }

        fn list_installed(&self) -> Result<InstalledSet> {
            self.record("list".into(), Failing::Query)?;
            Ok(self.state.borrow().clone())
        }

        fn latest_available(&self) -> Result<String> {
            self.calls.borrow_mut().push("latest".into());
            Ok(self.latest.clone())
        }

        fn install(&self, version: &str) -> Result<()> {
            if let Some(interrupt) = &self.interrupt_on_install {
                interrupt.trigger();
            }
            self.record(format!("install {version}"), Failing::Install)?;
            self.state.borrow_mut().add_installed(version);
            Ok(())
        }

        fn uninstall(&self, version: &str) -> Result<()> {
            self.record(format!("uninstall {version}"), Failing::Uninstall)?;
            self.state.borrow_mut().versions.retain(|v| v != version);
            Ok(())
        }

        fn switch_active(&self, version: &str) -> Result<()> {
            self.record(format!("switch {version}"), Failing::Switch)?;
            self.state.borrow_mut().active = Some(version.to_string());
            Ok(())
        }

        fn clone_libraries(&self, old_version: &str, new_version: &str) -> Result<()> {
            self.record(format!("clone {old_version} {new_version}"), Failing::Clone)
        }
    }

    fn run(manager: &FakeManager, cleanup: bool) -> Result<UpgradeReport> {
        UpgradeCoordinator::new(manager, Interrupt::new()).run(cleanup)
    }

    #[test]
    fn installed_target_is_switched_to_and_old_removed() {
        let manager = FakeManager::new(&["v1", "v2"], Some("v1"), "v2");
        let report = run(&manager, true).unwrap();

        assert_eq!(manager.mutating_calls(), ["switch v2", "uninstall v1"]);
        assert_eq!(
            manager.final_state(),
            InstalledSet::new(vec!["v2".into()], Some("v2".into()))
        );
        assert_eq!(report.installed, None);
        assert_eq!(report.switched_to.as_deref(), Some("v2"));
        assert_eq!(report.removed, ["v1"]);
    }

    #[test]
    fn new_release_is_installed_cloned_and_activated() {
        let manager = FakeManager::new(&["v1"], Some("v1"), "v2");
        let report = run(&manager, false).unwrap();

        assert_eq!(
            manager.mutating_calls(),
            ["install v2", "clone v1 v2", "switch v2"]
        );
        assert_eq!(
            manager.final_state(),
            InstalledSet::new(vec!["v1".into(), "v2".into()], Some("v2".into()))
        );
        assert_eq!(report.libraries_cloned, Some(("v1".into(), "v2".into())));
        assert!(report.removed.is_empty());
    }

    #[test]
    fn removal_follows_successful_switch() {
        let manager = FakeManager::new(&["v1"], Some("v1"), "v2");
        run(&manager, true).unwrap();
        assert_eq!(
            manager.mutating_calls(),
            ["install v2", "clone v1 v2", "switch v2", "uninstall v1"]
        );
    }

    #[test]
    fn failed_switch_keeps_old_version() {
        let manager = FakeManager::new(&["v1"], Some("v1"), "v2").failing(Failing::Switch);
        let err = run(&manager, true).unwrap_err();

        assert!(matches!(err, UpgradeError::Switch { .. }));
        assert!(!manager.calls().iter().any(|c| c.starts_with("uninstall")));
        assert!(manager.final_state().contains("v1"));
    }

    #[test]
    fn failed_install_stops_everything() {
        let manager = FakeManager::new(&["v1"], Some("v1"), "v2").failing(Failing::Install);
        let err = run(&manager, true).unwrap_err();

        assert!(matches!(err, UpgradeError::Install { .. }));
        assert_eq!(manager.mutating_calls(), ["install v2"]);
    }

    #[test]
    fn failed_clone_stops_before_switch() {
        let manager = FakeManager::new(&["v1"], Some("v1"), "v2").failing(Failing::Clone);
        let err = run(&manager, true).unwrap_err();

        assert!(matches!(err, UpgradeError::Clone { .. }));
        assert_eq!(manager.mutating_calls(), ["install v2", "clone v1 v2"]);
    }

    #[test]
    fn failed_uninstall_stops_remaining_removals() {
        let manager =
            FakeManager::new(&["v1", "v2", "v3"], Some("v3"), "v3").failing(Failing::Uninstall);
        let err = run(&manager, true).unwrap_err();

        assert!(matches!(err, UpgradeError::Uninstall { .. }));
        assert_eq!(manager.mutating_calls(), ["uninstall v1"]);
    }

    #[test]
    fn query_failure_changes_nothing() {
        let manager = FakeManager::new(&["v1"], Some("v1"), "v2").failing(Failing::Query);
        let err = run(&manager, true).unwrap_err();

        assert!(matches!(err, UpgradeError::ToolQuery { .. }));
        assert!(manager.mutating_calls().is_empty());
    }

    #[test]
    fn up_to_date_runs_are_idempotent() {
        let manager = FakeManager::new(&["v2"], Some("v2"), "v2");
        let first = run(&manager, true).unwrap();
        let second = run(&manager, true).unwrap();

        assert!(first.is_empty());
        assert_eq!(first, second);
        assert!(manager.mutating_calls().is_empty());
    }

    #[test]
    fn active_latest_cleanup_removes_obsolete_versions() {
        let manager = FakeManager::new(&["v1", "v2", "v3"], Some("v3"), "v3");
        let report = run(&manager, true).unwrap();

        assert_eq!(manager.mutating_calls(), ["uninstall v1", "uninstall v2"]);
        assert_eq!(report.removed, ["v1", "v2"]);

        let again = run(&manager, true).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn pinned_version_survives_upgrade() {
        let manager = FakeManager::new(&["v1", "v2"], Some("v1"), "v3");
        let report = run(&manager, true).unwrap();

        assert_eq!(manager.mutating_calls(), ["install v3", "clone v2 v3"]);
        assert_eq!(report.switched_to, None);
        assert_eq!(manager.final_state().active.as_deref(), Some("v1"));
    }

    #[test]
    fn pending_interrupt_runs_no_steps() {
        let manager = FakeManager::new(&["v1"], Some("v1"), "v2");
        let interrupt = Interrupt::new();
        interrupt.trigger();

        let err = UpgradeCoordinator::new(&manager, interrupt)
            .run(true)
            .unwrap_err();
        assert!(matches!(err, UpgradeError::Interrupted(_)));
        assert!(manager.calls().is_empty());
    }

    #[test]
    fn interrupt_during_install_aborts_remaining_steps() {
        let interrupt = Interrupt::new();
        let mut manager = FakeManager::new(&["v1"], Some("v1"), "v2");
        manager.interrupt_on_install = Some(interrupt.clone());

        let err = UpgradeCoordinator::new(&manager, interrupt)
            .run(true)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Interrupted before copying libraries from v1 to v2"
        );
        assert_eq!(manager.mutating_calls(), ["install v2"]);
    }

    #[test]
    fn interrupted_failure_is_reported_as_interrupt() {
        let interrupt = Interrupt::new();
        let mut manager = FakeManager::new(&["v1"], Some("v1"), "v2").failing(Failing::Install);
        manager.interrupt_on_install = Some(interrupt.clone());

        let err = UpgradeCoordinator::new(&manager, interrupt)
            .run(false)
            .unwrap_err();
        assert!(matches!(err, UpgradeError::Interrupted(_)));
        assert_eq!(err.to_string(), "Interrupted while installing v2");
    }

    #[test]
    fn plan_reports_intended_steps_without_acting() {
        let manager = FakeManager::new(&["v1"], Some("v1"), "v2");
        let (plan, decision) = UpgradeCoordinator::new(&manager, Interrupt::new())
            .plan(true)
            .unwrap();

        assert!(plan.needs_install);
        assert_eq!(plan.old_version.as_deref(), Some("v1"));
        assert_eq!(decision.switch_to.as_deref(), Some("v2"));
        assert_eq!(decision.versions_to_remove, ["v1"]);
        assert!(manager.mutating_calls().is_empty());
    }
}
