//! Commit message pool: built-in defaults and seed-file parsing.

/// Default commit message fragments, used when no seed file is given.
pub const DEFAULT_MESSAGES: &[&str] = &[
    "Daily activity checkpoint",
    "Quick sync",
    "Touch base",
    "Health check",
    "Meta tweak",
    "Automation heartbeat",
    "Status refresh",
    "Keep-alive note",
];

/// The default pool as owned strings.
pub fn default_pool() -> Vec<String> {
    DEFAULT_MESSAGES.iter().map(|m| (*m).to_string()).collect()
}

/// Parse seed-file contents into a message pool.
///
/// One fragment per line; blank lines are dropped. A seed file with no
/// usable lines falls back to [`DEFAULT_MESSAGES`].
pub fn parse_pool(contents: &str) -> Vec<String> {
    let fragments: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if fragments.is_empty() {
        default_pool()
    } else {
        fragments
    }
}
