//! Error types for Apker
//!
//! Library code returns `ApkerError`; the binary wraps it in `anyhow` at the
//! command boundary.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ports::{ProviderError, SessionError};
use crate::domain::services::StepError;

/// Result type alias for Apker operations
pub type ApkerResult<T> = Result<T, ApkerError>;

/// Main error type for Apker operations
#[derive(Error, Debug)]
pub enum ApkerError {
    /// Deploy steps or config values rejected before any remote action
    #[error("invalid config: {0}")]
    ConfigValidation(#[from] StepError),

    /// A required config value is missing or malformed
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    /// Config file could not be parsed
    #[error("failed to parse {file}: {message}")]
    ConfigParse { file: PathBuf, message: String },

    /// Config could not be fetched from the repository
    #[error("failed to fetch {file} from {repository}: {message}")]
    ConfigFetch {
        repository: String,
        file: String,
        message: String,
    },

    /// Provider call failed while provisioning
    #[error("provisioning failed: {0}")]
    Provision(#[from] ProviderError),

    /// Monitor deadline elapsed before the machine was ready
    #[error("installation timeout{}", resume_suffix(.image_id))]
    Timeout { image_id: Option<u64> },

    /// Remote command exited unsuccessfully; remaining steps were skipped
    #[error("step '{label}' failed: {command}")]
    RemoteExecution {
        label: String,
        command: String,
        output: String,
    },

    /// SSH transport failed (connect, spawn, upload)
    #[error("remote session error: {0}")]
    Session(#[from] SessionError),

    /// Local lifecycle hook failed
    #[error("hook '{command}' failed: {message}")]
    Hook { command: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn resume_suffix(image_id: &Option<u64>) -> String {
    match image_id {
        Some(id) => format!(" (image {})", id),
        None => String::new(),
    }
}
