//! Local snapshots: a timestamped marker file for hosts without provider
//! access.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

use dropletops_core::naming::local_snapshot_file;

use crate::error::{SnapshotError, SnapshotResult};

/// Write `snapshot-<YYYYMMDD-HHMMSS>.txt` into `dir`, creating it if needed.
pub fn write_local_snapshot(dir: &Path, now: DateTime<Utc>) -> SnapshotResult<PathBuf> {
    let path = dir.join(local_snapshot_file(now));
    let write_err = |source| SnapshotError::LocalWrite {
        path: path.clone(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(write_err)?;
    let content = format!(
        "Backup created: {} (UTC)\n",
        now.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    std::fs::write(&path, content).map_err(write_err)?;

    info!(path = %path.display(), "local snapshot written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn writes_marker_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("snapshots");
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 15).unwrap();

        let path = write_local_snapshot(&target, now).unwrap();
        assert_eq!(path, target.join("snapshot-20261019-083015.txt"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Backup created: 2026-10-19T08:30:15Z (UTC)\n"
        );
    }

    #[test]
    fn unwritable_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let err = write_local_snapshot(&blocker.join("nested"), Utc::now()).unwrap_err();
        assert!(matches!(err, SnapshotError::LocalWrite { .. }));
    }
}
