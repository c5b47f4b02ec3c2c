// src/probe/mod.rs
mod runner;

pub use runner::run_probe;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;

/// A single in-flight dependency check. Resolves to the check's JSON
/// payload on success, or to a [`ProbeFailure`] describing what went
/// wrong.
pub type ProbeFuture = Pin<Box<dyn Future<Output = Result<Value, ProbeFailure>> + Send>>;

/// Named set of probes for one report. Insertion order is the order
/// the report is rendered in, independent of completion order.
pub type ProbeSet = IndexMap<String, ProbeFuture>;

/// Callback producing a fresh [`ProbeSet`] per incoming request.
pub type ProbesFn = dyn Fn() -> ProbeSet + Send + Sync;

/// Box a future into a [`ProbeFuture`].
pub fn probe<F>(fut: F) -> ProbeFuture
where
    F: Future<Output = Result<Value, ProbeFailure>> + Send + 'static,
{
    Box::pin(fut)
}

/// Why a probe failed.
///
/// `Structured` covers real error objects and serializes flat as
/// `{"name": ..., "message": ..., ...extra}`. `Opaque` covers
/// everything else a probe might fail with (a bare string, a number,
/// an arbitrary JSON object) and serializes as the value unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeFailure {
    Structured {
        name: String,
        message: String,
        extra: Map<String, Value>,
    },
    Opaque(Value),
}

impl ProbeFailure {
    /// Structured failure with no extra fields.
    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        ProbeFailure::Structured {
            name: name.into(),
            message: message.into(),
            extra: Map::new(),
        }
    }

    /// Attach an extra field to a structured failure. No-op on opaque
    /// failures.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        if let ProbeFailure::Structured { ref mut extra, .. } = self {
            extra.insert(key.into(), value);
        }
        self
    }

    /// Normalize into a plain JSON value. Total: every failure has a
    /// serializable form, including non-error rejection values.
    pub fn to_value(&self) -> Value {
        match self {
            ProbeFailure::Structured {
                name,
                message,
                extra,
            } => {
                let mut map = Map::with_capacity(2 + extra.len());
                map.insert("name".to_string(), Value::String(name.clone()));
                map.insert("message".to_string(), Value::String(message.clone()));
                for (key, value) in extra {
                    map.insert(key.clone(), value.clone());
                }
                Value::Object(map)
            }
            ProbeFailure::Opaque(value) => value.clone(),
        }
    }
}

impl Serialize for ProbeFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl From<&str> for ProbeFailure {
    fn from(reason: &str) -> Self {
        ProbeFailure::Opaque(Value::String(reason.to_string()))
    }
}

impl From<String> for ProbeFailure {
    fn from(reason: String) -> Self {
        ProbeFailure::Opaque(Value::String(reason))
    }
}

impl From<Value> for ProbeFailure {
    fn from(reason: Value) -> Self {
        ProbeFailure::Opaque(reason)
    }
}

impl From<anyhow::Error> for ProbeFailure {
    fn from(err: anyhow::Error) -> Self {
        ProbeFailure::error("Error", err.to_string())
    }
}

/// The settle result of one probe run.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Fulfilled(Value),
    Rejected(ProbeFailure),
}

impl ProbeOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, ProbeOutcome::Rejected(_))
    }

    /// Collapse into the report value: success payloads pass through
    /// unchanged, failures are normalized.
    pub fn into_value(self) -> Value {
        match self {
            ProbeOutcome::Fulfilled(value) => value,
            ProbeOutcome::Rejected(failure) => failure.to_value(),
        }
    }
}
