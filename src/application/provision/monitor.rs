//! Provision monitor
//!
//! Consumes the worker's status stream, turns it into user-facing events
//! and enforces the install deadline.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::domain::entities::MachineStatus;
use crate::domain::ports::ProviderError;
use crate::error::{ApkerError, ApkerResult};

/// Progress notifications for the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionEvent {
    /// The image is usable; reported once per run
    ImageReady { image_id: Option<u64> },
    /// Any other intermediate snapshot
    Progress { status: String },
    /// The droplet is active
    MachineReady { address: Option<String> },
    /// The worker reported an error
    Failed { message: String },
    /// The deadline passed before the droplet was active
    TimedOut {
        image_id: Option<u64>,
        droplet_id: Option<u64>,
    },
}

/// How a monitored run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    Success {
        address: Option<String>,
        image_id: Option<u64>,
        droplet_id: Option<u64>,
    },
    Error(ProviderError),
    TimedOut {
        image_id: Option<u64>,
        droplet_id: Option<u64>,
    },
}

/// A machine ready for deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyMachine {
    pub address: String,
    pub droplet_id: Option<u64>,
}

impl MonitorOutcome {
    /// Map the outcome onto the command result
    ///
    /// `Ok(None)` means the install timed out and the caller asked for that
    /// to be non-fatal.
    pub fn into_result(self, timeout_is_error: bool) -> ApkerResult<Option<ReadyMachine>> {
        match self {
            MonitorOutcome::Success {
                address: Some(address),
                droplet_id,
                ..
            } => Ok(Some(ReadyMachine {
                address,
                droplet_id,
            })),
            MonitorOutcome::Success { .. } => Err(ApkerError::Provision(ProviderError::Decode(
                "droplet is active but has no IPv4 address".to_string(),
            ))),
            MonitorOutcome::Error(err) => Err(ApkerError::Provision(err)),
            MonitorOutcome::TimedOut { image_id, .. } => {
                if timeout_is_error {
                    Err(ApkerError::Timeout { image_id })
                } else {
                    Ok(None)
                }
            }
        }
    }
}

/// Waits on the status stream with an optional deadline
#[derive(Debug, Clone, Copy)]
pub struct ProvisionMonitor {
    deadline: Duration,
}

impl ProvisionMonitor {
    /// A zero deadline waits forever
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    pub fn wait(
        &self,
        statuses: &Receiver<MachineStatus>,
        mut on_event: impl FnMut(ProvisionEvent),
    ) -> MonitorOutcome {
        let deadline_at = (!self.deadline.is_zero()).then(|| Instant::now() + self.deadline);
        let mut image_announced = false;
        let mut image_id = None;
        let mut droplet_id = None;

        loop {
            let received = match deadline_at {
                None => statuses.recv().map_err(|_| RecvTimeoutError::Disconnected),
                Some(at) => statuses.recv_timeout(at.saturating_duration_since(Instant::now())),
            };

            let status = match received {
                Ok(status) => status,
                Err(RecvTimeoutError::Timeout) => {
                    debug!(?image_id, ?droplet_id, "install deadline passed");
                    on_event(ProvisionEvent::TimedOut {
                        image_id,
                        droplet_id,
                    });
                    return MonitorOutcome::TimedOut {
                        image_id,
                        droplet_id,
                    };
                }
                Err(RecvTimeoutError::Disconnected) => {
                    on_event(ProvisionEvent::Failed {
                        message: ProviderError::Stopped.to_string(),
                    });
                    return MonitorOutcome::Error(ProviderError::Stopped);
                }
            };

            image_id = status.image_id.or(image_id);
            droplet_id = status.droplet_id.or(droplet_id);

            if let Some(err) = status.error {
                on_event(ProvisionEvent::Failed {
                    message: err.to_string(),
                });
                return MonitorOutcome::Error(err);
            }

            if status.image_ready && !status.image_installed {
                if !image_announced {
                    image_announced = true;
                    on_event(ProvisionEvent::ImageReady { image_id });
                }
                continue;
            }

            if status.machine_ready {
                on_event(ProvisionEvent::MachineReady {
                    address: status.address.clone(),
                });
                return MonitorOutcome::Success {
                    address: status.address,
                    image_id,
                    droplet_id,
                };
            }

            on_event(ProvisionEvent::Progress {
                status: status.status,
            });
        }
    }
}

const RESUME_FLAGS: [&str; 2] = ["--id", "--image"];

/// Command line that resumes a timed-out run
///
/// Prefers the droplet id, since resuming from it skips the image wait too.
/// Any id flag already on the command line is replaced.
pub fn resume_command(
    args: &[String],
    image_id: Option<u64>,
    droplet_id: Option<u64>,
) -> Option<String> {
    let (flag, id) = match (droplet_id, image_id) {
        (Some(id), _) => ("--id", id),
        (None, Some(id)) => ("--image", id),
        (None, None) => return None,
    };

    let mut kept: Vec<&str> = Vec::with_capacity(args.len() + 2);
    let mut iter = args.iter().map(String::as_str);
    while let Some(arg) = iter.next() {
        if RESUME_FLAGS.contains(&arg) {
            iter.next();
            continue;
        }
        let is_inline = arg
            .split_once('=')
            .is_some_and(|(name, _)| RESUME_FLAGS.contains(&name));
        if !is_inline {
            kept.push(arg);
        }
    }

    Some(format!("{} {} {}", kept.join(" "), flag, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    fn snapshot(status: &str) -> MachineStatus {
        MachineStatus {
            status: status.to_string(),
            ..MachineStatus::default()
        }
    }

    fn collect(
        statuses: Vec<MachineStatus>,
        deadline: Duration,
    ) -> (Vec<ProvisionEvent>, MonitorOutcome) {
        let (tx, rx) = mpsc::channel();
        for s in statuses {
            tx.send(s).unwrap();
        }
        drop(tx);
        let mut events = Vec::new();
        let outcome = ProvisionMonitor::new(deadline).wait(&rx, |e| events.push(e));
        (events, outcome)
    }

    #[test]
    fn image_ready_is_announced_once() {
        let image_ready = MachineStatus {
            image_ready: true,
            image_id: Some(5),
            ..snapshot("available")
        };
        let installed = MachineStatus {
            image_ready: true,
            image_installed: true,
            ..snapshot("new")
        };
        let active = MachineStatus {
            machine_ready: true,
            address: Some("203.0.113.5".to_string()),
            ..installed.clone()
        };

        let (events, outcome) = collect(
            vec![
                snapshot("pending"),
                image_ready.clone(),
                image_ready,
                installed,
                active,
            ],
            Duration::ZERO,
        );

        assert_eq!(
            events,
            vec![
                ProvisionEvent::Progress {
                    status: "pending".to_string()
                },
                ProvisionEvent::ImageReady { image_id: Some(5) },
                ProvisionEvent::Progress {
                    status: "new".to_string()
                },
                ProvisionEvent::MachineReady {
                    address: Some("203.0.113.5".to_string())
                },
            ]
        );
        assert_eq!(
            outcome,
            MonitorOutcome::Success {
                address: Some("203.0.113.5".to_string()),
                image_id: Some(5),
                droplet_id: None,
            }
        );
    }

    #[test]
    fn error_snapshot_ends_the_wait() {
        let err = ProviderError::Api {
            status: 422,
            message: "quota".to_string(),
        };
        let (events, outcome) = collect(
            vec![MachineStatus::failed(err.clone()), snapshot("never read")],
            Duration::ZERO,
        );

        assert_eq!(events.len(), 1);
        assert_eq!(outcome, MonitorOutcome::Error(err));
    }

    #[test]
    fn closed_stream_is_an_error() {
        let (_, outcome) = collect(vec![snapshot("new")], Duration::ZERO);
        assert_eq!(outcome, MonitorOutcome::Error(ProviderError::Stopped));
    }

    #[test]
    fn deadline_reports_known_ids() {
        let (tx, rx) = mpsc::channel();
        tx.send(MachineStatus {
            image_ready: true,
            image_id: Some(12),
            ..snapshot("available")
        })
        .unwrap();

        // Keep the sender alive past the deadline.
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(300));
            drop(tx);
        });

        let mut events = Vec::new();
        let outcome =
            ProvisionMonitor::new(Duration::from_millis(50)).wait(&rx, |e| events.push(e));
        handle.join().unwrap();

        assert_eq!(
            outcome,
            MonitorOutcome::TimedOut {
                image_id: Some(12),
                droplet_id: None
            }
        );
        assert_eq!(
            events.last(),
            Some(&ProvisionEvent::TimedOut {
                image_id: Some(12),
                droplet_id: None
            })
        );
    }

    #[test]
    fn zero_deadline_outlasts_a_slow_stream() {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            tx.send(snapshot("new")).unwrap();
            thread::sleep(Duration::from_millis(700));
            tx.send(MachineStatus {
                image_ready: true,
                image_installed: true,
                machine_ready: true,
                droplet_id: Some(21),
                address: Some("1.2.3.4".to_string()),
                ..snapshot("active")
            })
            .unwrap();
        });

        let outcome = ProvisionMonitor::new(Duration::ZERO).wait(&rx, |_| {});
        handle.join().unwrap();

        assert_eq!(
            outcome,
            MonitorOutcome::Success {
                address: Some("1.2.3.4".to_string()),
                image_id: None,
                droplet_id: Some(21),
            }
        );
    }

    #[test]
    fn timeout_can_be_non_fatal() {
        let outcome = MonitorOutcome::TimedOut {
            image_id: Some(3),
            droplet_id: None,
        };
        assert_eq!(outcome.clone().into_result(false).unwrap(), None);
        assert_eq!(
            outcome.into_result(true).unwrap_err().to_string(),
            "installation timeout (image 3)"
        );
    }

    #[test]
    fn success_without_address_is_an_error() {
        let outcome = MonitorOutcome::Success {
            address: None,
            image_id: None,
            droplet_id: Some(1),
        };
        assert!(outcome.into_result(true).is_err());
    }

    #[test]
    fn resume_command_prefers_droplet_id() {
        let args = vec!["apker".to_string(), "deploy".to_string()];
        assert_eq!(
            resume_command(&args, Some(3), Some(9)).as_deref(),
            Some("apker deploy --id 9")
        );
        assert_eq!(
            resume_command(&args, Some(3), None).as_deref(),
            Some("apker deploy --image 3")
        );
        assert_eq!(resume_command(&args, None, None), None);
    }

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn resume_command_replaces_existing_id_flags() {
        let args = argv(&["apker", "deploy", "--image", "31", "--timeout", "1m"]);
        assert_eq!(
            resume_command(&args, Some(31), None).as_deref(),
            Some("apker deploy --timeout 1m --image 31")
        );

        let args = argv(&["apker", "deploy", "--image=31", "--id", "4", "--no-hooks"]);
        assert_eq!(
            resume_command(&args, Some(31), Some(8)).as_deref(),
            Some("apker deploy --no-hooks --id 8")
        );
    }

    #[test]
    fn resumed_command_parses_again() {
        use crate::presentation::cli::{Cli, Commands};
        use clap::Parser;

        let args = argv(&["apker", "deploy", "--image", "31", "--timeout", "1m"]);
        let hint = resume_command(&args, Some(31), None).unwrap();

        let cli = Cli::try_parse_from(hint.split_whitespace()).unwrap();
        match cli.command {
            Commands::Deploy(deploy) => {
                assert_eq!(deploy.image, Some(31));
                assert_eq!(deploy.id, None);
            }
            _ => panic!("expected deploy"),
        }
    }
}
