//! Commit message and log-entry formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Commit message for one cycle: a pool fragment plus a progress marker.
///
/// The `#seq/total` marker makes every message of a run unique, which in
/// turn guarantees each commit has a non-empty diff.
pub fn commit_message(fragment: &str, seq: u32, total: u32) -> String {
    format!("{fragment} #{seq}/{total}")
}

/// One appended log line: UTC timestamp plus the commit message.
pub fn entry_line(at: DateTime<Utc>, message: &str) -> String {
    format!(
        "{} :: {message}",
        at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn message_carries_progress_marker() {
        assert_eq!(commit_message("Quick sync", 3, 12), "Quick sync #3/12");
    }

    #[test]
    fn entry_line_prefixes_utc_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 8, 7, 9, 30, 0).unwrap();
        assert_eq!(
            entry_line(at, "Quick sync #3/12"),
            "2026-08-07T09:30:00Z :: Quick sync #3/12"
        );
    }

    #[test]
    fn lines_are_unique_across_a_run() {
        let at = Utc.with_ymd_and_hms(2026, 8, 7, 9, 30, 0).unwrap();
        let lines: Vec<String> = (1..=10)
            .map(|seq| entry_line(at, &commit_message("Touch base", seq, 10)))
            .collect();
        let unique: std::collections::HashSet<&String> = lines.iter().collect();
        assert_eq!(unique.len(), lines.len());
    }
}
