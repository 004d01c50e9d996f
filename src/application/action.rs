//! Run an installed action on a machine

use tracing::info;

use crate::domain::ports::{CommandOutput, RemoteSession};
use crate::domain::services::shell::quote;
use crate::domain::services::{validate_action_name, ACTIONS_DIR};
use crate::error::ApkerResult;

/// Remote command for an action, with its environment
///
/// `APKER_ACTION=1` is always last so an action can tell it was started
/// through apker.
pub fn action_command(name: &str, env: &[(String, String)]) -> ApkerResult<String> {
    validate_action_name(name)?;

    let mut assignments: Vec<String> = env
        .iter()
        .map(|(key, value)| format!("{}={}", key, quote(value)))
        .collect();
    assignments.push("APKER_ACTION=1".to_string());

    Ok(format!(
        "env {} bash -c {}",
        assignments.join(" "),
        quote(&format!("{}/{}", ACTIONS_DIR, name))
    ))
}

/// Run the action and return its output; a non-zero exit is not an error here
pub fn run_action<S: RemoteSession>(
    session: &S,
    name: &str,
    env: &[(String, String)],
) -> ApkerResult<CommandOutput> {
    let command = action_command(name, env)?;
    info!(action = name, "running action");
    Ok(session.run(&command)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::SessionError;
    use std::cell::RefCell;
    use std::path::Path;

    #[test]
    fn command_sets_env_and_marker() {
        let env = vec![
            ("DB".to_string(), "app".to_string()),
            ("NOTE".to_string(), "it's late".to_string()),
        ];
        assert_eq!(
            action_command("backup", &env).unwrap(),
            "env DB='app' NOTE='it'\\''s late' APKER_ACTION=1 bash -c '/usr/share/apker/bin/backup'"
        );
    }

    #[test]
    fn command_without_env() {
        assert_eq!(
            action_command("migrate", &[]).unwrap(),
            "env APKER_ACTION=1 bash -c '/usr/share/apker/bin/migrate'"
        );
    }

    #[test]
    fn traversal_names_are_rejected() {
        assert!(action_command("../../bin/sh", &[]).is_err());
    }

    struct Recorder(RefCell<Vec<String>>);

    impl RemoteSession for Recorder {
        fn run(&self, command: &str) -> Result<CommandOutput, SessionError> {
            self.0.borrow_mut().push(command.to_string());
            Ok(CommandOutput::failure(1, "no such action"))
        }

        fn upload(&self, _: &Path, _: &str) -> Result<(), SessionError> {
            Ok(())
        }
    }

    #[test]
    fn run_action_returns_failed_output() {
        let session = Recorder(RefCell::new(Vec::new()));
        let output = run_action(&session, "backup", &[]).unwrap();

        assert!(!output.is_success());
        assert_eq!(session.0.borrow().len(), 1);
    }
}
