// src/service/router.rs
use crate::aggregate::aggregate;
use crate::auth::basic_credentials;
use crate::error::ServiceError;
use crate::service::HealthcheckConfig;
use hyper::header::{CONTENT_TYPE, WWW_AUTHENTICATE};
use hyper::{Body, Method, Request, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Dispatch one request to its endpoint handler.
pub(super) async fn route(
    config: Arc<HealthcheckConfig>,
    prefix: &str,
    req: Request<Body>,
) -> Result<Response<Body>, ServiceError> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let rest = if prefix.is_empty() {
        path.as_str()
    } else {
        match path.strip_prefix(prefix) {
            Some(rest) => rest,
            None => return not_found(),
        }
    };

    debug!(%method, %path, "handling healthcheck request");

    match (&method, rest) {
        (&Method::GET, "" | "/") => empty_response(StatusCode::OK),
        (&Method::GET, "/detailed") if config.probes_fn.is_some() => detailed(&config).await,
        (&Method::GET, "/memory") => memory(&config, &req).await,
        (&Method::GET, "/version") if config.version.is_some() => version(&config),
        _ => not_found(),
    }
}

/// Run the caller's probe set and render the aggregated report.
/// Always a well-formed JSON object; probe failures set the status to
/// 500, only an aggregation fault escapes to the host.
async fn detailed(config: &HealthcheckConfig) -> Result<Response<Body>, ServiceError> {
    let probes_fn = config
        .probes_fn
        .as_ref()
        .expect("route only exists when probes are configured");

    let report = aggregate(probes_fn()).await.map_err(|err| {
        error!(%err, "health aggregation fault");
        err
    })?;

    let status = if report.any_failed() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };

    json_response(status, &report)
}

/// Basic-auth gate, then trigger the blocking snapshot capability and
/// return the produced file.
async fn memory(
    config: &HealthcheckConfig,
    req: &Request<Body>,
) -> Result<Response<Body>, ServiceError> {
    let authed = matches!(
        basic_credentials(req),
        Some(ref creds) if creds.name == config.memory_name && creds.pass == config.memory_pass
    );
    if !authed {
        warn!("rejected memory snapshot request with missing or invalid credentials");
        return Response::builder()
            .status(StatusCode::UNAUTHORIZED)
            .header(WWW_AUTHENTICATE, "Basic realm=\"memory\"")
            .body(Body::empty())
            .map_err(ServiceError::from);
    }

    let writer = Arc::clone(&config.snapshot_writer);
    let path = tokio::task::spawn_blocking(move || writer.write_snapshot())
        .await
        .map_err(ServiceError::SnapshotTask)??;

    let bytes = tokio::fs::read(&path).await?;
    debug!(path = %path.display(), size = bytes.len(), "serving memory snapshot");

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/octet-stream")
        .body(Body::from(bytes))
        .map_err(ServiceError::from)
}

fn version(config: &HealthcheckConfig) -> Result<Response<Body>, ServiceError> {
    let version = config
        .version
        .as_ref()
        .expect("route only exists when a version is configured");
    json_response(StatusCode::OK, version)
}

fn json_response(
    status: StatusCode,
    body: &impl Serialize,
) -> Result<Response<Body>, ServiceError> {
    let json = serde_json::to_vec(body)?;
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(json))
        .map_err(ServiceError::from)
}

fn empty_response(status: StatusCode) -> Result<Response<Body>, ServiceError> {
    Response::builder()
        .status(status)
        .body(Body::empty())
        .map_err(ServiceError::from)
}

fn not_found() -> Result<Response<Body>, ServiceError> {
    empty_response(StatusCode::NOT_FOUND)
}
