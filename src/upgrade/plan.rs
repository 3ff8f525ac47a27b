/// Versions a manager has installed, ascending, plus the one currently selected
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledSet {
    pub versions: Vec<String>,
    /// May name something outside `versions`, such as rbenv's `system`
    pub active: Option<String>,
}

impl InstalledSet {
    pub fn new(versions: Vec<String>, active: Option<String>) -> Self {
        Self { versions, active }
    }

    pub fn contains(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Newest installed version other than `target`
    pub fn latest_except(&self, target: &str) -> Option<&str> {
        self.versions
            .iter()
            .rev()
            .find(|v| *v != target)
            .map(String::as_str)
    }

    /// Record a version installed during this run; it is the newest one
    pub fn add_installed(&mut self, version: &str) {
        if !self.contains(version) {
            self.versions.push(version.to_string());
        }
    }
}

/// What this run has to install, derived once from the manager's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradePlan {
    pub old_version: Option<String>,
    pub new_version: String,
    pub needs_install: bool,
}

impl UpgradePlan {
    pub fn new(installed: &InstalledSet, latest: &str) -> Self {
        Self {
            old_version: installed.latest_except(latest).map(str::to_string),
            new_version: latest.to_string(),
            needs_install: !installed.contains(latest),
        }
    }
}

/// Switch and removal steps chosen by the cleanup policy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupDecision {
    pub switch_to: Option<String>,
    pub versions_to_remove: Vec<String>,
}

impl CleanupDecision {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.switch_to.is_none() && self.versions_to_remove.is_empty()
    }
}

/// Tracks what a run actually changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeReport {
    pub installed: Option<String>,
    /// `(from, to)` of a completed library migration
    pub libraries_cloned: Option<(String, String)>,
    pub switched_to: Option<String>,
    pub removed: Vec<String>,
}

impl UpgradeReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the run left the manager untouched
    pub fn is_empty(&self) -> bool {
        self.installed.is_none()
            && self.libraries_cloned.is_none()
            && self.switched_to.is_none()
            && self.removed.is_empty()
    }
}
