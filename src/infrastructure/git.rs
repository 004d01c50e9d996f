//! Read the project config straight from its git repository
//!
//! Used when `deploy` runs outside a checkout: a shallow clone into a temp
//! dir, then the file is read and the clone dropped.

use std::fs;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::application::deploy::authenticated_url;
use crate::domain::entities::REDACTED;
use crate::error::{ApkerError, ApkerResult};

pub fn fetch_file(repository: &str, auth: Option<&str>, file: &str) -> ApkerResult<String> {
    let fail = |message: String| {
        let message = match auth {
            Some(secret) if !secret.is_empty() => message.replace(secret, REDACTED),
            _ => message,
        };
        ApkerError::ConfigFetch {
            repository: repository.to_string(),
            file: file.to_string(),
            message,
        }
    };

    let checkout = tempfile::Builder::new().prefix("apker-").tempdir()?;
    let url = authenticated_url(repository, auth);

    debug!(%repository, "shallow clone for {}", file);
    let output = Command::new("git")
        .args(["clone", "--depth", "1", "--quiet", &url])
        .arg(checkout.path())
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .output()
        .map_err(|e| fail(format!("failed to start git: {}", e)))?;

    if !output.status.success() {
        return Err(fail(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    fs::read_to_string(checkout.path().join(file)).map_err(|e| fail(e.to_string()))
}
