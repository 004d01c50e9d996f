//! Deployment Executor Tests

use super::*;
use crate::domain::entities::CompiledStep;
use crate::domain::ports::{
    CommandOutput, DeployEvent, HookOutput, HookRunner, RemoteSession, SessionError,
};
use crate::domain::services::StepCompiler;
use crate::error::ApkerError;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;

// Mock implementations for testing

#[derive(Default)]
struct MockSession {
    commands: RefCell<Vec<String>>,
    uploads: RefCell<Vec<(String, String)>>,
    fail_matching: Option<&'static str>,
    output: &'static str,
}

impl RemoteSession for MockSession {
    fn run(&self, command: &str) -> Result<CommandOutput, SessionError> {
        self.commands.borrow_mut().push(command.to_string());
        match self.fail_matching {
            Some(needle) if command.contains(needle) => Ok(CommandOutput::failure(
                2,
                format!("fatal: {}", command).into_bytes(),
            )),
            _ => Ok(CommandOutput::success(self.output.as_bytes().to_vec())),
        }
    }

    fn upload(&self, local: &Path, remote: &str) -> Result<(), SessionError> {
        let content = std::fs::read_to_string(local).unwrap();
        self.uploads
            .borrow_mut()
            .push((remote.to_string(), content));
        Ok(())
    }
}

#[derive(Default)]
struct MockHooks {
    ran: RefCell<Vec<String>>,
    fail: bool,
    spawn_error: bool,
}

impl HookRunner for MockHooks {
    fn run(&self, command: &str) -> io::Result<HookOutput> {
        self.ran.borrow_mut().push(command.to_string());
        if self.spawn_error {
            return Err(io::Error::new(io::ErrorKind::NotFound, "sh not found"));
        }
        Ok(HookOutput {
            success: !self.fail,
            output: b"hook ran\n".to_vec(),
        })
    }
}

fn options() -> DeployOptions {
    DeployOptions::new("https://github.com/acme/web.git").with_hooks(LifecycleHooks {
        success: Some("notify ok".to_string()),
        failure: Some("notify fail".to_string()),
    })
}

fn user_steps(lines: &[&str]) -> Vec<CompiledStep> {
    StepCompiler::new().compile(lines).unwrap()
}

fn run(
    session: MockSession,
    hooks: MockHooks,
    options: &DeployOptions,
    steps: &[CompiledStep],
) -> (
    crate::error::ApkerResult<DeploymentReport>,
    Vec<DeployEvent>,
    MockSession,
    MockHooks,
) {
    let events = RefCell::new(Vec::new());
    let executor = DeploymentExecutor::new(session, hooks);
    let result = executor.execute(options, steps, &|e: DeployEvent| {
        events.borrow_mut().push(e)
    });
    let (session, hooks) = executor.into_parts();
    (result, events.into_inner(), session, hooks)
}

#[test]
fn prelude_runs_before_user_steps() {
    let (result, _, session, _) = run(
        MockSession::default(),
        MockHooks::default(),
        &options(),
        &user_steps(&["run make", "dir logs"]),
    );

    let report = result.unwrap();
    assert_eq!(report.prelude, 3);
    assert_eq!(report.user_steps(), 2);

    let commands = session.commands.into_inner();
    assert_eq!(commands.len(), 5);
    assert!(commands[0].starts_with("which git rsync"));
    assert!(commands[1].starts_with("rm -rf /tmp/apker && git clone"));
    assert!(commands[2].contains("apker.yaml"));
    assert_eq!(commands[3], "cd /tmp/apker && make");
    assert_eq!(commands[4], "cd /tmp/apker && mkdir -p 'logs'");
}

#[test]
fn every_step_has_one_start_and_one_finish() {
    let (_, events, _, _) = run(
        MockSession::default(),
        MockHooks::default(),
        &options(),
        &user_steps(&["run make"]),
    );

    let started = events
        .iter()
        .filter(|e| matches!(e, DeployEvent::StepStarted { .. }))
        .count();
    let finished = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                DeployEvent::StepSucceeded { .. } | DeployEvent::StepFailed { .. }
            )
        })
        .count();

    assert_eq!(started, 4);
    assert_eq!(finished, 4);
    assert_eq!(events[0], DeployEvent::Started { step_count: 4 });
    assert_eq!(
        events[events.len() - 2],
        DeployEvent::Completed {
            executed: 4,
            success: true
        }
    );
}

#[test]
fn first_failure_stops_the_run() {
    let session = MockSession {
        fail_matching: Some("make test"),
        ..MockSession::default()
    };

    let (result, events, session, _) = run(
        session,
        MockHooks::default(),
        &options(),
        &user_steps(&["run make", "run make test", "run make install"]),
    );

    let err = result.unwrap_err();
    match &err {
        ApkerError::RemoteExecution {
            label,
            command,
            output,
        } => {
            assert_eq!(label, "Running: run make test");
            assert_eq!(command, "cd /tmp/apker && make test");
            assert!(output.contains("fatal"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let commands = session.commands.into_inner();
    assert!(!commands.iter().any(|c| c.contains("make install")));

    assert!(events.contains(&DeployEvent::Completed {
        executed: 4,
        success: false
    }));
    assert!(matches!(
        events.iter().rev().find(|e| matches!(e, DeployEvent::StepFailed { .. })),
        Some(DeployEvent::StepFailed { index: 4, .. })
    ));
}

#[test]
fn failing_prelude_skips_user_steps() {
    let session = MockSession {
        fail_matching: Some("which git"),
        ..MockSession::default()
    };

    let (result, _, session, _) = run(
        session,
        MockHooks::default(),
        &options(),
        &user_steps(&["run make"]),
    );

    assert!(result.is_err());
    assert_eq!(session.commands.into_inner().len(), 1);
}

#[test]
fn success_hook_runs_after_success() {
    let (result, events, _, hooks) = run(
        MockSession::default(),
        MockHooks::default(),
        &options(),
        &user_steps(&["run make"]),
    );

    assert!(result.is_ok());
    assert_eq!(hooks.ran.into_inner(), vec!["notify ok".to_string()]);
    assert_eq!(
        events.last(),
        Some(&DeployEvent::HookSucceeded {
            label: "Event: success".to_string(),
            output: b"hook ran\n".to_vec(),
        })
    );
}

#[test]
fn success_hook_failure_is_an_error() {
    let hooks = MockHooks {
        fail: true,
        ..MockHooks::default()
    };

    let (result, _, _, _) = run(
        MockSession::default(),
        hooks,
        &options(),
        &user_steps(&["run make"]),
    );

    assert!(matches!(result, Err(ApkerError::Hook { .. })));
}

#[test]
fn failure_hook_errors_are_swallowed() {
    let session = MockSession {
        fail_matching: Some("make"),
        ..MockSession::default()
    };
    let hooks = MockHooks {
        spawn_error: true,
        ..MockHooks::default()
    };

    let (result, events, _, hooks) = run(session, hooks, &options(), &user_steps(&["run make"]));

    // The step failure wins, not the hook failure.
    assert!(matches!(result, Err(ApkerError::RemoteExecution { .. })));
    assert_eq!(hooks.ran.into_inner(), vec!["notify fail".to_string()]);
    assert!(matches!(
        events.last(),
        Some(DeployEvent::HookFailed { label, .. }) if label == "Event: failure"
    ));
}

#[test]
fn hooks_can_be_disabled() {
    let (_, _, _, hooks) = run(
        MockSession::default(),
        MockHooks::default(),
        &options().without_hooks(),
        &user_steps(&["run make"]),
    );

    assert!(hooks.ran.into_inner().is_empty());
}

#[test]
fn clone_credentials_never_reach_events() {
    let session = MockSession {
        fail_matching: Some("git clone"),
        ..MockSession::default()
    };
    let options = options().with_auth(Some("bot:s3cret".to_string()));

    let (result, events, session, _) = run(session, MockHooks::default(), &options, &[]);

    // The real command carries the token...
    assert!(session.commands.into_inner()[1].contains("bot:s3cret@github.com"));

    // ...nothing shown to the user does.
    let rendered = format!("{:?} {:?}", result.unwrap_err(), events);
    assert!(!rendered.contains("s3cret"));
    assert!(rendered.contains("***"));
}

#[test]
fn actions_script_is_uploaded_before_it_runs() {
    let mut actions = BTreeMap::new();
    actions.insert("migrate".to_string(), "./bin/migrate".to_string());

    let (result, _, session, _) = run(
        MockSession::default(),
        MockHooks::default(),
        &options().with_actions(actions),
        &[],
    );

    assert!(result.is_ok());
    let uploads = session.uploads.into_inner();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0, ACTIONS_SCRIPT);
    assert!(uploads[0].1.contains("./bin/migrate"));

    let commands = session.commands.into_inner();
    assert_eq!(
        commands.last().unwrap(),
        "bash /tmp/apker-actions.sh && rm -f /tmp/apker-actions.sh"
    );
}

#[test]
fn setup_commands_come_first() {
    let options = options().with_setup(vec!["apt-get install -y rsync".to_string()]);

    let (_, events, session, _) = run(
        MockSession::default(),
        MockHooks::default(),
        &options,
        &[],
    );

    assert_eq!(
        session.commands.into_inner()[0],
        "apt-get install -y rsync"
    );
    assert!(events.contains(&DeployEvent::StepSucceeded {
        index: 0,
        message: "Setup: apt-get install -y rsync".to_string(),
        output: Vec::new(),
    }));
}
