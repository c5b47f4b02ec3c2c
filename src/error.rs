// src/error.rs
use tokio::task::JoinError;

/// Construction-time configuration errors. These fail hard when the
/// service is built, never at request time.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("need to specify `memory_name` and `memory_pass`")]
    MissingCredentials,
}

/// A fault in the aggregation machinery itself, distinct from any
/// individual probe failing.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("probe task was cancelled before settling: {0}")]
    TaskCancelled(#[source] JoinError),
}

/// Environment-level faults that escape to the hosting error pipeline.
/// Probe failures never surface here; they are converted to report
/// data.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("health aggregation failed: {0}")]
    Aggregate(#[from] AggregateError),

    #[error("memory snapshot failed: {0}")]
    Snapshot(#[from] std::io::Error),

    #[error("memory snapshot task failed: {0}")]
    SnapshotTask(#[source] JoinError),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to build response: {0}")]
    Http(#[from] hyper::http::Error),
}
