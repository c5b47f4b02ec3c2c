// src/aggregate/mod.rs
use crate::error::AggregateError;
use crate::probe::{run_probe, ProbeFailure, ProbeOutcome, ProbeSet};
use futures::future::join_all;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tokio::task::JoinError;
use tracing::{debug, warn};

/// Aggregated health report: one entry per probe, in probe-set order,
/// plus the derived overall status.
///
/// Serializes as the plain JSON object of entries; `any_failed` drives
/// the HTTP status and is not a body field.
#[derive(Debug)]
pub struct Report {
    entries: Vec<(String, Value)>,
    any_failed: bool,
}

impl Report {
    /// True iff at least one probe rejected.
    pub fn any_failed(&self) -> bool {
        self.any_failed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, value)| value)
    }

    /// Probe names in report order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Run every probe concurrently, wait for all of them to settle, and
/// build the report.
///
/// Fan-out is unconditional: a failed probe never aborts the barrier,
/// it becomes a normalized entry like any other. Report order is the
/// probe-set insertion order regardless of completion order. The only
/// error path is a fault in the task machinery itself, which is fatal
/// and propagated.
pub async fn aggregate(probes: ProbeSet) -> Result<Report, AggregateError> {
    let mut names = Vec::with_capacity(probes.len());
    let mut tasks = Vec::with_capacity(probes.len());

    for (name, probe) in probes {
        names.push(name);
        tasks.push(tokio::spawn(run_probe(probe)));
    }

    let settled = join_all(tasks).await;

    let mut entries = Vec::with_capacity(names.len());
    let mut any_failed = false;

    for (name, result) in names.into_iter().zip(settled) {
        let outcome = match result {
            Ok(outcome) => outcome,
            // A panicking probe settles the report entry, it does not
            // poison the barrier.
            Err(err) if err.is_panic() => ProbeOutcome::Rejected(panic_failure(err)),
            Err(err) => return Err(AggregateError::TaskCancelled(err)),
        };

        if outcome.is_rejected() {
            any_failed = true;
            warn!(probe = %name, "health probe failed");
        } else {
            debug!(probe = %name, "health probe passed");
        }

        entries.push((name, outcome.into_value()));
    }

    Ok(Report {
        entries,
        any_failed,
    })
}

fn panic_failure(err: JoinError) -> ProbeFailure {
    let payload = err.into_panic();
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "probe panicked".to_string()
    };
    ProbeFailure::error("Panic", message)
}
