use super::plan::{CleanupDecision, InstalledSet};

/// Decides which version to switch to and which versions to remove after an upgrade.
///
/// A version still in use is only scheduled for removal together with a switch
/// away from it, and a version the user pinned by hand is never touched.
pub struct CleanupPolicy;

impl CleanupPolicy {
    pub fn decide(
        cleanup_requested: bool,
        active: Option<&str>,
        old_latest: Option<&str>,
        new_latest: &str,
        installed: &InstalledSet,
    ) -> CleanupDecision {
        let Some(active) = active else {
            return CleanupDecision::none();
        };

        // Checked first so that an up-to-date active version is never removed.
        if active == new_latest {
            if !cleanup_requested {
                return CleanupDecision::none();
            }
            return CleanupDecision {
                switch_to: None,
                versions_to_remove: installed
                    .versions
                    .iter()
                    .filter(|v| *v != new_latest)
                    .cloned()
                    .collect(),
            };
        }

        if old_latest == Some(active) {
            return CleanupDecision {
                switch_to: Some(new_latest.to_string()),
                versions_to_remove: if cleanup_requested {
                    vec![active.to_string()]
                } else {
                    Vec::new()
                },
            };
        }

        CleanupDecision::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn installed(versions: &[&str], active: &str) -> InstalledSet {
        InstalledSet::new(
            versions.iter().map(|v| v.to_string()).collect(),
            Some(active.to_string()),
        )
    }

    fn decide(cleanup: bool, set: &InstalledSet, old: Option<&str>, new: &str) -> CleanupDecision {
        CleanupPolicy::decide(cleanup, set.active(), old, new, set)
    }

    #[test]
    fn active_old_latest_switches_and_removes_with_cleanup() {
        for versions in [&["v1", "v2"][..], &["v0", "v1", "v2"][..]] {
            let set = installed(versions, "v1");
            let decision = decide(true, &set, Some("v1"), "v2");
            assert_eq!(decision.switch_to.as_deref(), Some("v2"));
            assert_eq!(decision.versions_to_remove, ["v1"]);
        }
    }

    #[test]
    fn active_old_latest_switches_without_cleanup() {
        let set = installed(&["v1", "v2"], "v1");
        let decision = decide(false, &set, Some("v1"), "v2");
        assert_eq!(decision.switch_to.as_deref(), Some("v2"));
        assert!(decision.versions_to_remove.is_empty());
    }

    #[test]
    fn active_new_latest_removes_every_other_version() {
        let set = installed(&["v1", "v2", "v3"], "v3");
        let decision = decide(true, &set, Some("v2"), "v3");
        assert_eq!(decision.switch_to, None);
        assert_eq!(decision.versions_to_remove, ["v1", "v2"]);

        assert!(decide(false, &set, Some("v2"), "v3").is_empty());
    }

    #[test]
    fn pinned_version_is_left_alone() {
        let set = installed(&["v1", "v2", "v3"], "v1");
        for cleanup in [true, false] {
            assert!(decide(cleanup, &set, Some("v2"), "v3").is_empty());
        }

        let system = installed(&["v1", "v2"], "system");
        for cleanup in [true, false] {
            assert!(decide(cleanup, &system, Some("v1"), "v2").is_empty());
        }
    }

    #[test]
    fn no_active_version_means_no_action() {
        let set = InstalledSet::new(vec!["v1".into(), "v2".into()], None);
        assert!(decide(true, &set, Some("v1"), "v2").is_empty());
        assert!(decide(true, &InstalledSet::default(), None, "v2").is_empty());
    }

    #[test]
    fn only_version_installed_is_never_removed() {
        let set = installed(&["v2"], "v2");
        assert!(decide(true, &set, None, "v2").is_empty());
    }
}
