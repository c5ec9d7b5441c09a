//! Side-effecting operations: filesystem writes and git subprocesses.

pub mod activity_log;
pub mod git;
pub mod process;
