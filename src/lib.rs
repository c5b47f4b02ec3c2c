// src/lib.rs
pub mod aggregate;
pub mod auth;
pub mod error;
pub mod probe;
pub mod service;
pub mod snapshot;

pub use aggregate::{aggregate, Report};
pub use error::{AggregateError, ConfigError, ServiceError};
pub use probe::{probe, ProbeFailure, ProbeFuture, ProbeOutcome, ProbeSet, ProbesFn};
pub use service::{HealthcheckConfig, HealthcheckService};
pub use snapshot::{SnapshotWriter, TempfileSnapshotWriter};
