//! Steps that run before the user's deploy steps
//!
//! setup commands, tooling check, checkout, config install and (when any
//! are declared) action installation.

use std::collections::BTreeMap;

use crate::domain::entities::{CompiledStep, StagedUpload};
use crate::domain::services::shell::quote;
use crate::domain::services::{validate_action_name, StepError, ACTIONS_DIR, WORK_DIR};

use super::options::DeployOptions;

/// Name of the config file inside the checkout
pub const CONFIG_FILE: &str = "apker.yaml";

/// Directory the config file is installed to on the machine
pub const CONFIG_DIR: &str = "/usr/share/apker";

/// Remote path of the generated action installer
pub const ACTIONS_SCRIPT: &str = "/tmp/apker-actions.sh";

const TOOLING_CHECK: &str = "which git rsync && git --version && rsync --version";

const HEREDOC_DELIMITER: &str = "APKER_ACTION_EOF";

pub fn build_prelude(options: &DeployOptions) -> Result<Vec<CompiledStep>, StepError> {
    let mut steps = Vec::with_capacity(options.setup.len() + 4);

    for command in &options.setup {
        steps.push(CompiledStep::new(
            format!("Running: {}", command),
            format!("Setup: {}", command),
            command.clone(),
        ));
    }

    steps.push(CompiledStep::new(
        "Checking git and rsync",
        "Tooling: git and rsync available",
        TOOLING_CHECK,
    ));

    let url = authenticated_url(&options.repository, options.auth.as_deref());
    let mut clone = CompiledStep::new(
        format!("Cloning {}", options.repository),
        format!("Cloned {}", options.repository),
        format!("rm -rf {} && git clone {} {}", WORK_DIR, quote(&url), WORK_DIR),
    );
    if let Some(auth) = &options.auth {
        clone = clone.with_secret(auth.clone());
    }
    steps.push(clone);

    steps.push(CompiledStep::new(
        format!("Installing {}", CONFIG_FILE),
        format!("Config: {}/{}", CONFIG_DIR, CONFIG_FILE),
        format!(
            "mkdir -p {dir} && cp {work}/{file} {dir}/{file}",
            dir = CONFIG_DIR,
            work = WORK_DIR,
            file = CONFIG_FILE
        ),
    ));

    if !options.actions.is_empty() {
        let script = actions_script(&options.actions)?;
        let names: Vec<&str> = options.actions.keys().map(String::as_str).collect();
        steps.push(
            CompiledStep::new(
                format!("Installing actions: {}", names.join(", ")),
                format!("Actions: {} installed", names.len()),
                format!("bash {0} && rm -f {0}", ACTIONS_SCRIPT),
            )
            .with_upload(StagedUpload {
                remote_path: ACTIONS_SCRIPT.to_string(),
                content: script,
            }),
        );
    }

    Ok(steps)
}

/// Put `user:token` into an https URL; other URLs are left alone
pub fn authenticated_url(repository: &str, auth: Option<&str>) -> String {
    match (auth, repository.strip_prefix("https://")) {
        (Some(auth), Some(rest)) if !auth.is_empty() => format!("https://{}@{}", auth, rest),
        _ => repository.to_string(),
    }
}

/// Shell script writing one executable per action
pub fn actions_script(actions: &BTreeMap<String, String>) -> Result<String, StepError> {
    let mut script = format!("#!/bin/bash\nset -e\nmkdir -p {}\n", ACTIONS_DIR);

    for (name, command) in actions {
        validate_action_name(name)?;
        let path = quote(&format!("{}/{}", ACTIONS_DIR, name));
        script.push_str(&format!(
            "cat > {path} <<'{eof}'\n#!/bin/bash\ncd {work}\n{command}\n{eof}\nchmod +x {path}\n",
            path = path,
            eof = HEREDOC_DELIMITER,
            work = WORK_DIR,
            command = command.trim_end(),
        ));
    }

    Ok(script)
}
