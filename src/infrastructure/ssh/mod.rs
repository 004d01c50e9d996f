//! SSH Session Implementation
//!
//! Implements the RemoteSession port by shelling out to the system `ssh`
//! and `scp` binaries, one process per command.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::domain::ports::{
    CommandOutput, RemoteSession, SessionAuth, SessionConnector, SessionError, SessionTarget,
};

/// Seconds `ssh` waits for the TCP handshake
const CONNECT_TIMEOUT_SECS: u32 = 20;

/// Opens sessions by running a no-op command over ssh
#[derive(Debug, Clone, Copy, Default)]
pub struct SshConnector;

impl SessionConnector for SshConnector {
    type Session = SshSession;

    fn connect(&self, target: &SessionTarget) -> Result<SshSession, SessionError> {
        let session = SshSession::new(target.clone());
        let probe = session.run("true")?;

        if !probe.is_success() {
            return Err(SessionError::Connect {
                target: target.destination(),
                message: String::from_utf8_lossy(&probe.stderr).trim().to_string(),
            });
        }

        debug!(destination = %target.destination(), "ssh session established");
        Ok(session)
    }
}

/// Remote session backed by the `ssh` binary
#[derive(Debug, Clone)]
pub struct SshSession {
    target: SessionTarget,
}

impl SshSession {
    pub fn new(target: SessionTarget) -> Self {
        Self { target }
    }

    /// Options shared by `ssh` and `scp`
    fn common_options(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();

        if let SessionAuth::Key(key) = &self.target.auth {
            args.push("-i".into());
            args.push(key.clone().into_os_string());
            args.push("-o".into());
            args.push("IdentitiesOnly=yes".into());
        }

        for option in [
            "BatchMode=yes".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            format!("ConnectTimeout={}", CONNECT_TIMEOUT_SECS),
        ] {
            args.push("-o".into());
            args.push(option.into());
        }

        if let Some(known_hosts) = &self.target.known_hosts {
            let mut option = OsString::from("UserKnownHostsFile=");
            option.push(known_hosts);
            args.push("-o".into());
            args.push(option);
        }

        args
    }

    fn ssh_args(&self, command: &str) -> Vec<OsString> {
        let mut args = self.common_options();
        args.push("-p".into());
        args.push(self.target.port.to_string().into());
        args.push(self.target.destination().into());
        args.push("--".into());
        args.push(command.into());
        args
    }

    fn scp_args(&self, local: &Path, remote: &str) -> Vec<OsString> {
        let mut args = self.common_options();
        args.push("-q".into());
        args.push("-P".into());
        args.push(self.target.port.to_string().into());
        args.push(local.as_os_str().to_os_string());
        args.push(format!("{}:{}", self.target.destination(), remote).into());
        args
    }
}

impl RemoteSession for SshSession {
    fn run(&self, command: &str) -> Result<CommandOutput, SessionError> {
        let output = Command::new("ssh")
            .args(self.ssh_args(command))
            .stdin(Stdio::null())
            .output()
            .map_err(|source| SessionError::Spawn {
                program: "ssh".to_string(),
                source,
            })?;

        // 255 is ssh's own failure, not the remote command's
        if output.status.code() == Some(255) {
            return Err(SessionError::Connect {
                target: self.target.destination(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn upload(&self, local: &Path, remote: &str) -> Result<(), SessionError> {
        let output = Command::new("scp")
            .args(self.scp_args(local, remote))
            .stdin(Stdio::null())
            .output()
            .map_err(|source| SessionError::Spawn {
                program: "scp".to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(SessionError::Upload {
                local: local.to_path_buf(),
                remote: remote.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}
