//! Atomic status file writer

use std::io;
use std::path::Path;
use sync_status::StatusReport;
use tracing::debug;

/// Write the status report via temp-file-then-rename so readers never see a
/// partial snapshot.
pub fn write_status_atomic(report: &StatusReport, path: &Path) -> io::Result<()> {
    let json = serde_json::to_vec_pretty(report)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, &json)?;
    std::fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "status written");
    Ok(())
}
