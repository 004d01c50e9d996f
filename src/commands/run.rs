//! `apker run`

use anyhow::{bail, Result};

use apker::application::run_action;
use apker::domain::ports::{CommandOutput, SessionConnector};
use apker::domain::services::validate_action_name;
use apker::infrastructure::SshConnector;
use apker::presentation::factory::session_target;
use apker::presentation::SshArgs;

use crate::ui::blocks::header::CommandHeader;
use crate::ui::context::UiContext;
use crate::ui::primitives::icon::Icon;

fn exit_status(output: &CommandOutput) -> String {
    match output.exit_code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

pub fn cmd_run(
    action: &str,
    addr: &str,
    env: &[(String, String)],
    ssh: &SshArgs,
    ui: UiContext,
) -> Result<()> {
    validate_action_name(action)?;
    let target = session_target(ssh, addr);

    if !ui.json {
        let mut header = CommandHeader::new(Icon::Remote, format!("Apker Run: {}", action));
        header.add("Machine", target.destination());
        print!("{}", header.render(ui.color, ui.unicode));
    }

    let session = SshConnector.connect(&target)?;
    let output = run_action(&session, action, env)?;

    if ui.json {
        let _ = crate::ui::json::emit(serde_json::json!({
            "event": "action",
            "command": "run",
            "action": action,
            "exit_code": output.exit_code,
            "output": String::from_utf8_lossy(&output.combined()),
        }));
    } else {
        println!();
        print!("{}", String::from_utf8_lossy(&output.combined()));
    }

    if !output.is_success() {
        bail!("action '{}' ended with {}", action, exit_status(&output));
    }
    Ok(())
}
