//! Stable exit codes for the drip CLI.

/// Run completed (including dry-run and duration-clipped runs).
pub const OK: i32 = 0;
/// Invalid configuration, rejected before the loop started.
pub const INVALID: i32 = 1;
/// A git invocation or file write failed mid-run.
pub const FAILED: i32 = 2;
