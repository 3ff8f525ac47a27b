//! Stable exit codes, one per failure kind.

/// Every invoked step succeeded.
pub const OK: i32 = 0;
/// Another run already holds the lock for this version manager.
pub const ALREADY_RUNNING: i32 = 92;
/// The version manager could not be queried or its output was not understood.
pub const TOOL_QUERY: i32 = 93;
/// Installing the new version failed.
pub const INSTALL: i32 = 94;
/// Migrating libraries to the new version failed.
pub const CLONE: i32 = 95;
/// Switching the active version failed.
pub const SWITCH: i32 = 96;
/// Removing a superseded version failed.
pub const UNINSTALL: i32 = 97;
/// Invalid command line or configuration.
pub const BAD_ARGUMENT: i32 = 98;
/// The run was interrupted before it completed.
pub const INTERRUPTED: i32 = 99;
