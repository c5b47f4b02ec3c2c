//! demos/embed.rs
//! Run: cargo run --example embed
//!
//! Mounts the healthcheck service under /healthcheck in a plain hyper
//! server, with a couple of toy probes.

use anyhow::Result;
use healthcheck_router::{probe, HealthcheckConfig, HealthcheckService, ProbeFailure, ProbeSet};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Response, Server, StatusCode};
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::sleep;
use tower::Service;
use tracing::{error, info};

fn demo_probes() -> ProbeSet {
    let mut probes = ProbeSet::new();
    probes.insert(
        "cache".to_string(),
        probe(async {
            sleep(Duration::from_millis(20)).await;
            Ok(json!("good"))
        }),
    );
    probes.insert(
        "queue".to_string(),
        probe(async {
            sleep(Duration::from_millis(40)).await;
            Err(ProbeFailure::error("Error", "queue depth over threshold")
                .with_extra("depth", json!(9000)))
        }),
    );
    probes
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = HealthcheckConfig::new("foo", "foo")
        .with_probes(demo_probes)
        .with_version(json!({"hash": env!("CARGO_PKG_VERSION")}));
    let health = HealthcheckService::new(config)?.with_prefix("/healthcheck");

    let make_svc = make_service_fn(move |_| {
        let health = health.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let mut health = health.clone();
                async move {
                    match health.call(req).await {
                        Ok(response) => Ok::<_, Infallible>(response),
                        Err(err) => {
                            error!(%err, "healthcheck service fault");
                            Ok(Response::builder()
                                .status(StatusCode::INTERNAL_SERVER_ERROR)
                                .body(Body::from("Internal Server Error"))
                                .unwrap())
                        }
                    }
                }
            }))
        }
    });

    let addr: SocketAddr = "127.0.0.1:3000".parse()?;
    info!("serving healthchecks on http://{}/healthcheck", addr);
    Server::bind(&addr).serve(make_svc).await?;

    Ok(())
}
