// tests/service_tests.rs
use healthcheck_router::{
    probe, ConfigError, HealthcheckConfig, HealthcheckService, ProbeFailure, ProbeSet,
    ServiceError, SnapshotWriter,
};
use hyper::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use hyper::{Body, Request, Response, StatusCode};
use serde_json::{json, Value};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

fn base_config() -> HealthcheckConfig {
    HealthcheckConfig::new("foo", "foo")
}

fn mounted(config: HealthcheckConfig) -> HealthcheckService {
    HealthcheckService::new(config)
        .expect("valid config")
        .with_prefix("/healthcheck")
}

async fn get(service: &HealthcheckService, path: &str) -> Response<Body> {
    let req = Request::builder().uri(path).body(Body::empty()).unwrap();
    service.clone().oneshot(req).await.unwrap()
}

async fn get_with_auth(service: &HealthcheckService, path: &str, header: &str) -> Response<Body> {
    let req = Request::builder()
        .uri(path)
        .header(AUTHORIZATION, header)
        .body(Body::empty())
        .unwrap();
    service.clone().oneshot(req).await.unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

mod liveness {
    use super::*;

    #[tokio::test]
    async fn returns_200_with_empty_body() {
        let service = mounted(base_config());
        let response = get(&service, "/healthcheck").await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn answers_with_and_without_trailing_slash() {
        let service = mounted(base_config());
        assert_eq!(get(&service, "/healthcheck").await.status(), StatusCode::OK);
        assert_eq!(get(&service, "/healthcheck/").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn paths_outside_the_mount_prefix_are_404() {
        let service = mounted(base_config());
        assert_eq!(get(&service, "/other").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get(&service, "/healthcheck/nope").await.status(),
            StatusCode::NOT_FOUND
        );
    }
}

mod detailed {
    use super::*;

    #[tokio::test]
    async fn missing_probes_callback_means_no_route() {
        let service = mounted(base_config());
        let response = get(&service, "/healthcheck/detailed").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_probe_set_is_200_with_empty_object() {
        let service = mounted(base_config().with_probes(ProbeSet::new));
        let response = get(&service, "/healthcheck/detailed").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({}));
    }

    #[tokio::test]
    async fn two_passing_probes_are_200() {
        let service = mounted(base_config().with_probes(|| {
            let mut probes = ProbeSet::new();
            probes.insert("foo".to_string(), probe(async { Ok(json!("good")) }));
            probes.insert("bar".to_string(), probe(async { Ok(json!("great")) }));
            probes
        }));

        let response = get(&service, "/healthcheck/detailed").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"foo": "good", "bar": "great"})
        );
    }

    #[tokio::test]
    async fn one_passing_and_one_failing_probe_is_500_with_both_entries() {
        let service = mounted(base_config().with_probes(|| {
            let mut probes = ProbeSet::new();
            probes.insert(
                "foo".to_string(),
                probe(async { Err(ProbeFailure::error("Error", "bad")) }),
            );
            probes.insert("bar".to_string(), probe(async { Ok(json!("great")) }));
            probes
        }));

        let response = get(&service, "/healthcheck/detailed").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"foo": {"name": "Error", "message": "bad"}, "bar": "great"})
        );
    }

    #[tokio::test]
    async fn two_failing_probes_are_500() {
        let service = mounted(base_config().with_probes(|| {
            let mut probes = ProbeSet::new();
            probes.insert(
                "foo".to_string(),
                probe(async { Err(ProbeFailure::error("Error", "bad")) }),
            );
            probes.insert(
                "bar".to_string(),
                probe(async { Err(ProbeFailure::error("Error", "worse")) }),
            );
            probes
        }));

        let response = get(&service, "/healthcheck/detailed").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({
                "foo": {"name": "Error", "message": "bad"},
                "bar": {"name": "Error", "message": "worse"}
            })
        );
    }

    #[tokio::test]
    async fn non_error_rejection_values_are_reported_verbatim() {
        let service = mounted(base_config().with_probes(|| {
            let mut probes = ProbeSet::new();
            probes.insert(
                "foo".to_string(),
                probe(async { Err(ProbeFailure::from("bad")) }),
            );
            probes
        }));

        let response = get(&service, "/healthcheck/detailed").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({"foo": "bad"}));
    }

    #[tokio::test]
    async fn structured_failures_keep_extra_fields() {
        let service = mounted(base_config().with_probes(|| {
            let mut probes = ProbeSet::new();
            probes.insert(
                "queue".to_string(),
                probe(async {
                    Err(ProbeFailure::error("TimeoutError", "no response")
                        .with_extra("waited_ms", json!(2500)))
                }),
            );
            probes
        }));

        let response = get(&service, "/healthcheck/detailed").await;
        assert_eq!(
            body_json(response).await,
            json!({"queue": {
                "name": "TimeoutError",
                "message": "no response",
                "waited_ms": 2500
            }})
        );
    }

    #[tokio::test]
    async fn a_fresh_probe_set_is_produced_per_request() {
        let service = mounted(base_config().with_probes(|| {
            let mut probes = ProbeSet::new();
            probes.insert("foo".to_string(), probe(async { Ok(json!("good")) }));
            probes
        }));

        for _ in 0..3 {
            let response = get(&service, "/healthcheck/detailed").await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_json(response).await, json!({"foo": "good"}));
        }
    }
}

mod memory {
    use super::*;

    struct FixedSnapshotWriter {
        dir: tempfile::TempDir,
    }

    impl FixedSnapshotWriter {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }
    }

    impl SnapshotWriter for FixedSnapshotWriter {
        fn write_snapshot(&self) -> io::Result<PathBuf> {
            let path = self.dir.path().join("snap.heapsnapshot");
            std::fs::write(&path, b"snapshot-bytes")?;
            Ok(path)
        }
    }

    struct FailingSnapshotWriter;

    impl SnapshotWriter for FailingSnapshotWriter {
        fn write_snapshot(&self) -> io::Result<PathBuf> {
            Err(io::Error::new(io::ErrorKind::Other, "no snapshot support"))
        }
    }

    #[tokio::test]
    async fn missing_credentials_are_401_with_challenge() {
        let service = mounted(base_config());
        let response = get(&service, "/healthcheck/memory").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"memory\""
        );
    }

    #[tokio::test]
    async fn malformed_credentials_are_401() {
        let service = mounted(base_config());
        let response = get_with_auth(&service, "/healthcheck/memory", "Basic 12ab").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_password_is_401() {
        let service = mounted(base_config());
        // "foo:bar"
        let response = get_with_auth(&service, "/healthcheck/memory", "Basic Zm9vOmJhcg==").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_credentials_stream_the_snapshot_file() {
        let service = mounted(
            base_config().with_snapshot_writer(Arc::new(FixedSnapshotWriter::new())),
        );

        // "foo:foo"
        let response = get_with_auth(&service, "/healthcheck/memory", "Basic Zm9vOmZvbw==").await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert_eq!(&bytes[..], b"snapshot-bytes");
    }

    #[tokio::test]
    async fn snapshot_fault_escapes_to_the_hosting_error_pipeline() {
        let service =
            mounted(base_config().with_snapshot_writer(Arc::new(FailingSnapshotWriter)));

        let req = Request::builder()
            .uri("/healthcheck/memory")
            .header(AUTHORIZATION, "Basic Zm9vOmZvbw==")
            .body(Body::empty())
            .unwrap();
        let result = service.clone().oneshot(req).await;

        assert!(matches!(result, Err(ServiceError::Snapshot(_))));
    }
}

mod version {
    use super::*;

    #[tokio::test]
    async fn unconfigured_version_is_404() {
        let service = mounted(base_config());
        let response = get(&service, "/healthcheck/version").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn configured_version_is_echoed_as_json() {
        let service = mounted(base_config().with_version(json!({"hash": "1234"})));
        let response = get(&service, "/healthcheck/version").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"hash": "1234"}));
    }
}

mod config {
    use super::*;

    #[test]
    fn missing_memory_name_fails_construction() {
        let result = HealthcheckService::new(HealthcheckConfig::new("", "pass"));
        assert!(matches!(result, Err(ConfigError::MissingCredentials)));
    }

    #[test]
    fn missing_memory_pass_fails_construction() {
        let result = HealthcheckService::new(HealthcheckConfig::new("name", ""));
        assert!(matches!(result, Err(ConfigError::MissingCredentials)));
    }

    #[tokio::test]
    async fn unprefixed_service_routes_from_the_root() {
        let service = HealthcheckService::new(base_config().with_probes(ProbeSet::new)).unwrap();

        assert_eq!(get(&service, "/").await.status(), StatusCode::OK);
        assert_eq!(get(&service, "/detailed").await.status(), StatusCode::OK);
    }
}
