//! Deploy Event Port
//!
//! Observable interface for the deploy executor. Every step produces exactly
//! one `StepStarted` followed by exactly one of `StepSucceeded` or
//! `StepFailed`.

/// Event emitted during a deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    /// Deployment started
    Started { step_count: usize },

    /// A step is about to run
    StepStarted { index: usize, label: String },

    /// A step finished successfully
    StepSucceeded {
        index: usize,
        message: String,
        output: Vec<u8>,
    },

    /// A step failed; no later step will run
    StepFailed {
        index: usize,
        command: String,
        output: Vec<u8>,
    },

    /// A lifecycle hook finished
    HookSucceeded { label: String, output: Vec<u8> },

    /// A lifecycle hook failed
    HookFailed { label: String, output: Vec<u8> },

    /// Deployment finished
    Completed { executed: usize, success: bool },
}

/// Trait for receiving deploy events
///
/// Sinks are called synchronously, one event at a time. A sink cannot
/// influence the deployment; output errors are the sink's own business.
pub trait DeployEventSink {
    fn on_event(&self, event: DeployEvent);
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}
}

impl<F> DeployEventSink for F
where
    F: Fn(DeployEvent),
{
    fn on_event(&self, event: DeployEvent) {
        self(event)
    }
}
