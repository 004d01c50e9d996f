//! Remote Session Port
//!
//! A connected, authenticated session on the target machine. The deploy
//! executor is the only user of a session and drives it from one thread.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Output captured from one remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            exit_code: Some(code),
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stdout followed by stderr
    pub fn combined(&self) -> Vec<u8> {
        let mut out = self.stdout.clone();
        out.extend_from_slice(&self.stderr);
        out
    }
}

/// Transport-level failure (the command's own exit status is not an error here)
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to connect to {target}: {message}")]
    Connect { target: String, message: String },

    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to upload {local} to {remote}: {message}")]
    Upload {
        local: PathBuf,
        remote: String,
        message: String,
    },
}

/// Authentication material for a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAuth {
    /// Private key file
    Key(PathBuf),
    /// Whatever the local ssh agent offers
    Agent,
}

/// Where and as whom to connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTarget {
    pub user: String,
    pub address: String,
    pub port: u16,
    pub auth: SessionAuth,
    /// Known hosts file; the system default is used when unset
    pub known_hosts: Option<PathBuf>,
}

impl SessionTarget {
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.address)
    }
}

/// A connected remote session
pub trait RemoteSession {
    /// Run a command through the remote shell, blocking until it exits
    fn run(&self, command: &str) -> Result<CommandOutput, SessionError>;

    /// Copy a local file to a remote path
    fn upload(&self, local: &Path, remote: &str) -> Result<(), SessionError>;
}

/// Opens sessions
pub trait SessionConnector {
    type Session: RemoteSession;

    fn connect(&self, target: &SessionTarget) -> Result<Self::Session, SessionError>;
}
