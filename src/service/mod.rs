// src/service/mod.rs
mod router;

use crate::error::{ConfigError, ServiceError};
use crate::probe::{ProbeSet, ProbesFn};
use crate::snapshot::{SnapshotWriter, TempfileSnapshotWriter};
use hyper::{Body, Request, Response};
use serde_json::Value;
use std::sync::Arc;
use tower::Service;

/// Options for a [`HealthcheckService`].
///
/// `memory_name` and `memory_pass` guard the `/memory` endpoint and
/// are mandatory; construction of the service fails without them. The
/// probes callback and version value are optional — their routes only
/// exist when configured.
pub struct HealthcheckConfig {
    pub(crate) probes_fn: Option<Arc<ProbesFn>>,
    pub(crate) memory_name: String,
    pub(crate) memory_pass: String,
    pub(crate) version: Option<Value>,
    pub(crate) snapshot_writer: Arc<dyn SnapshotWriter>,
}

impl HealthcheckConfig {
    pub fn new(memory_name: impl Into<String>, memory_pass: impl Into<String>) -> Self {
        Self {
            probes_fn: None,
            memory_name: memory_name.into(),
            memory_pass: memory_pass.into(),
            version: None,
            snapshot_writer: Arc::new(TempfileSnapshotWriter),
        }
    }

    /// Install the callback that produces a fresh probe set per
    /// `/detailed` request.
    pub fn with_probes<F>(mut self, probes_fn: F) -> Self
    where
        F: Fn() -> ProbeSet + Send + Sync + 'static,
    {
        self.probes_fn = Some(Arc::new(probes_fn));
        self
    }

    /// Static version payload served by `/version`.
    pub fn with_version(mut self, version: Value) -> Self {
        self.version = Some(version);
        self
    }

    /// Replace the default memory-snapshot capability.
    pub fn with_snapshot_writer(mut self, writer: Arc<dyn SnapshotWriter>) -> Self {
        self.snapshot_writer = writer;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_name.is_empty() || self.memory_pass.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        Ok(())
    }
}

/// The mountable health-endpoint set.
///
/// A `Clone` tower service routing `GET /`, `/detailed`, `/memory`
/// and `/version` under an optional mount prefix. Environment faults
/// surface as [`ServiceError`] for the hosting error pipeline; probe
/// failures never do.
#[derive(Clone)]
pub struct HealthcheckService {
    config: Arc<HealthcheckConfig>,
    prefix: Arc<str>,
}

impl HealthcheckService {
    /// Build the service, validating the configuration eagerly.
    pub fn new(config: HealthcheckConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            prefix: Arc::from(""),
        })
    }

    /// Mount under a path prefix, e.g. `/healthcheck`. Requests
    /// outside the prefix are answered 404.
    pub fn with_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        self.prefix = Arc::from(prefix.as_ref().trim_end_matches('/'));
        self
    }
}

impl Service<Request<Body>> for HealthcheckService {
    type Response = Response<Body>;
    type Error = ServiceError;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let config = Arc::clone(&self.config);
        let prefix = Arc::clone(&self.prefix);
        Box::pin(async move { router::route(config, &prefix, req).await })
    }
}
