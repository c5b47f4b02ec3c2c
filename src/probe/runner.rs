// src/probe/runner.rs
use super::{ProbeFuture, ProbeOutcome};

/// Settle one probe into an outcome record.
///
/// The probe's failure is captured, never propagated: this function
/// always resolves. A probe that never settles keeps the runner
/// pending with it — no timeout is imposed here.
pub async fn run_probe(probe: ProbeFuture) -> ProbeOutcome {
    match probe.await {
        Ok(value) => ProbeOutcome::Fulfilled(value),
        Err(failure) => ProbeOutcome::Rejected(failure),
    }
}
