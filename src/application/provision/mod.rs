//! Provision Module
//!
//! Creates (or reuses) a DigitalOcean image and droplet.
//!
//! ## Structure
//!
//! - `worker` - provider calls on a background thread (`ProvisionWorker`)
//! - `monitor` - status stream consumer with deadline (`ProvisionMonitor`)
//!
//! The worker only sends snapshots. The receiving end belongs to
//! [`provision`], which drops it after the monitor stops, so a worker that
//! outlives a timeout ends at its next send.

mod monitor;
mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use monitor::{
    resume_command, MonitorOutcome, ProvisionEvent, ProvisionMonitor, ReadyMachine,
};
pub use worker::{MachinePlan, PollIntervals, ProvisionWorker, StatusSink, DEFAULT_TAGS};

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::domain::ports::CloudProvider;
use crate::domain::value_objects::ProvisionRequest;
use crate::error::ApkerResult;

/// Run a worker in the background and monitor it until it finishes or the
/// deadline passes (zero waits forever)
pub fn provision<P>(
    worker: ProvisionWorker<P>,
    request: ProvisionRequest,
    deadline: Duration,
    on_event: impl FnMut(ProvisionEvent),
) -> ApkerResult<MonitorOutcome>
where
    P: CloudProvider + 'static,
{
    let (tx, rx) = mpsc::channel();
    let sink = StatusSink::new(tx);

    // Detached on purpose: after a timeout nobody joins it.
    thread::Builder::new()
        .name("apker-provision".to_string())
        .spawn(move || worker.run(&sink, request))?;

    let outcome = ProvisionMonitor::new(deadline).wait(&rx, on_event);
    debug!(?outcome, "provision monitor finished");
    drop(rx);

    Ok(outcome)
}
