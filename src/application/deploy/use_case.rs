//! Deployment executor
//!
//! Runs the prelude followed by the compiled user steps over one remote
//! session, strictly in order, stopping at the first failure. Lifecycle
//! hooks run locally afterwards.

use std::io::Write;

use tracing::{debug, info, warn};

use crate::domain::entities::CompiledStep;
use crate::domain::ports::{DeployEvent, DeployEventSink, HookRunner, RemoteSession};
use crate::error::{ApkerError, ApkerResult};

use super::options::DeployOptions;
use super::prelude::build_prelude;
use super::result::DeploymentReport;

/// Deployment executor
///
/// Parameterized by its ports so tests can drive it without a network.
pub struct DeploymentExecutor<S, H>
where
    S: RemoteSession,
    H: HookRunner,
{
    session: S,
    hooks: H,
}

impl<S, H> DeploymentExecutor<S, H>
where
    S: RemoteSession,
    H: HookRunner,
{
    pub fn new(session: S, hooks: H) -> Self {
        Self { session, hooks }
    }

    #[cfg(test)]
    pub(super) fn into_parts(self) -> (S, H) {
        (self.session, self.hooks)
    }

    /// Run prelude + `steps`, then the matching lifecycle hook
    pub fn execute(
        &self,
        options: &DeployOptions,
        steps: &[CompiledStep],
        sink: &dyn DeployEventSink,
    ) -> ApkerResult<DeploymentReport> {
        let prelude = build_prelude(options)?;
        let prelude_len = prelude.len();
        let all: Vec<&CompiledStep> = prelude.iter().chain(steps.iter()).collect();

        sink.on_event(DeployEvent::Started {
            step_count: all.len(),
        });

        let mut executed = 0;
        let mut outcome = Ok(());
        for (index, step) in all.iter().enumerate() {
            if let Err(e) = self.run_step(index, step, sink) {
                outcome = Err(e);
                break;
            }
            executed += 1;
        }

        sink.on_event(DeployEvent::Completed {
            executed,
            success: outcome.is_ok(),
        });

        match outcome {
            Ok(()) => {
                info!(executed, "deployment finished");
                if options.run_hooks {
                    if let Some(command) = &options.hooks.success {
                        self.run_hook("Event: success", command, sink)?;
                    }
                }
                Ok(DeploymentReport {
                    executed,
                    prelude: prelude_len,
                })
            }
            Err(err) => {
                warn!(executed, error = %err, "deployment failed");
                if options.run_hooks {
                    if let Some(command) = &options.hooks.failure {
                        if let Err(hook_err) = self.run_hook("Event: failure", command, sink) {
                            warn!(error = %hook_err, "failure hook failed");
                        }
                    }
                }
                Err(err)
            }
        }
    }

    fn run_step(
        &self,
        index: usize,
        step: &CompiledStep,
        sink: &dyn DeployEventSink,
    ) -> ApkerResult<()> {
        sink.on_event(DeployEvent::StepStarted {
            index,
            label: step.label().into_owned(),
        });
        debug!(index, command = %step.display_command(), "running step");

        let output = match self.stage_upload(step).and_then(|()| {
            self.session.run(step.command()).map_err(ApkerError::from)
        }) {
            Ok(output) => output,
            Err(err) => {
                sink.on_event(DeployEvent::StepFailed {
                    index,
                    command: step.display_command().into_owned(),
                    output: step.redact(&err.to_string()).into_owned().into_bytes(),
                });
                return Err(err);
            }
        };

        let combined = String::from_utf8_lossy(&output.combined()).into_owned();
        let combined = step.redact(&combined).into_owned();

        if output.is_success() {
            sink.on_event(DeployEvent::StepSucceeded {
                index,
                message: step.done_message().into_owned(),
                output: combined.into_bytes(),
            });
            return Ok(());
        }

        debug!(index, exit_code = ?output.exit_code, "step failed");
        sink.on_event(DeployEvent::StepFailed {
            index,
            command: step.display_command().into_owned(),
            output: combined.clone().into_bytes(),
        });

        Err(ApkerError::RemoteExecution {
            label: step.label().into_owned(),
            command: step.display_command().into_owned(),
            output: combined,
        })
    }

    fn stage_upload(&self, step: &CompiledStep) -> ApkerResult<()> {
        let Some(upload) = step.upload() else {
            return Ok(());
        };

        let mut file = tempfile::Builder::new()
            .prefix("apker-")
            .suffix(".sh")
            .tempfile()?;
        file.write_all(upload.content.as_bytes())?;
        file.flush()?;

        self.session.upload(file.path(), &upload.remote_path)?;
        debug!(remote = %upload.remote_path, "staged upload");
        Ok(())
    }

    fn run_hook(&self, label: &str, command: &str, sink: &dyn DeployEventSink) -> ApkerResult<()> {
        info!(hook = label, "running lifecycle hook");

        let result = self.hooks.run(command);
        let (success, output, message) = match result {
            Ok(out) => (out.success, out.output, "exited with failure".to_string()),
            Err(e) => (false, e.to_string().into_bytes(), e.to_string()),
        };

        if success {
            sink.on_event(DeployEvent::HookSucceeded {
                label: label.to_string(),
                output,
            });
            Ok(())
        } else {
            sink.on_event(DeployEvent::HookFailed {
                label: label.to_string(),
                output,
            });
            Err(ApkerError::Hook {
                command: command.to_string(),
                message,
            })
        }
    }
}
