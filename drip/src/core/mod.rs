//! Pure, deterministic logic for the commit loop.

pub mod entry;
pub mod jitter;
pub mod messages;
pub mod plan;
pub mod push;
