// Upgrade workflow
//
// - UpgradePlan / InstalledSet: what the version manager reports and what must be installed
// - CleanupPolicy: pure choice of switch and removals
// - UpgradeCoordinator: runs the steps in order against a VersionManagerAdapter
pub mod coordinator;
pub mod plan;
pub mod policy;

pub use coordinator::UpgradeCoordinator;
pub use plan::{CleanupDecision, InstalledSet, UpgradePlan, UpgradeReport};
