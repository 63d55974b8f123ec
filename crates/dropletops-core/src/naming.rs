//! Timestamp-derived names for snapshots and report files.

use chrono::{DateTime, Utc};

/// Granularity of the timestamp embedded in a generated name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
    /// `YYYY-MM-DD`, one name per day.
    Day,
    /// `YYYY-MM-DD-HH-MM`.
    Minute,
}

impl Stamp {
    fn format(self) -> &'static str {
        match self {
            Stamp::Day => "%Y-%m-%d",
            Stamp::Minute => "%Y-%m-%d-%H-%M",
        }
    }
}

/// `"<prefix>-<stamp>"`, e.g. `ecotachos-auto-backup-2026-10-19`.
pub fn snapshot_name(prefix: &str, stamp: Stamp, at: DateTime<Utc>) -> String {
    format!("{prefix}-{}", at.format(stamp.format()))
}

/// File name of a droplet health report.
pub fn health_report_file(at: DateTime<Utc>) -> String {
    format!("health-report-{}.json", at.format(Stamp::Minute.format()))
}

/// File name of a local (non-provider) snapshot.
pub fn local_snapshot_file(at: DateTime<Utc>) -> String {
    format!("snapshot-{}.txt", at.format("%Y%m%d-%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 7, 4, 5, 9).unwrap()
    }

    #[test]
    fn daily_snapshot_name() {
        assert_eq!(
            snapshot_name("ecotachos-auto-backup", Stamp::Day, at()),
            "ecotachos-auto-backup-2026-03-07"
        );
    }

    #[test]
    fn minute_snapshot_name() {
        assert_eq!(
            snapshot_name("ecotachos-backup", Stamp::Minute, at()),
            "ecotachos-backup-2026-03-07-04-05"
        );
    }

    #[test]
    fn file_names() {
        assert_eq!(health_report_file(at()), "health-report-2026-03-07-04-05.json");
        assert_eq!(local_snapshot_file(at()), "snapshot-20260307-040509.txt");
    }
}
