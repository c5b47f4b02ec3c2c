// src/snapshot/mod.rs
use chrono::Utc;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::info;

/// Injected memory-snapshot capability for the `/memory` endpoint.
///
/// Implementations are synchronous and may block for a long time (the
/// service runs them on a blocking thread) — hosts should drain
/// traffic before triggering one. The returned path is read and
/// streamed back; cleanup of the file is left to the host environment.
pub trait SnapshotWriter: Send + Sync {
    fn write_snapshot(&self) -> io::Result<PathBuf>;
}

/// Default writer: a lightweight process summary dropped into the
/// system temp directory as `<millis>.heapsnapshot`.
///
/// This stands in for a real heap-dump capability; hosts with one
/// supply their own [`SnapshotWriter`].
#[derive(Debug, Default)]
pub struct TempfileSnapshotWriter;

impl SnapshotWriter for TempfileSnapshotWriter {
    fn write_snapshot(&self) -> io::Result<PathBuf> {
        let path = std::env::temp_dir().join(format!("{}.heapsnapshot", Utc::now().timestamp_millis()));

        let summary = serde_json::json!({
            "pid": std::process::id(),
            "taken_at": Utc::now().to_rfc3339(),
            "status": read_proc_status(),
        });

        fs::write(&path, summary.to_string())?;
        info!(path = %path.display(), "wrote memory snapshot");
        Ok(path)
    }
}

#[cfg(target_os = "linux")]
fn read_proc_status() -> Option<String> {
    fs::read_to_string("/proc/self/status").ok()
}

#[cfg(not(target_os = "linux"))]
fn read_proc_status() -> Option<String> {
    None
}
