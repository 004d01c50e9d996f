//! Use Case Factory
//!
//! Creates workers and executors with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use std::path::PathBuf;

use crate::application::deploy::DeploymentExecutor;
use crate::application::provision::{MachinePlan, ProvisionWorker};
use crate::config::Config;
use crate::domain::ports::{ProviderError, SessionAuth, SessionConnector, SessionTarget};
use crate::error::ApkerResult;
use crate::infrastructure::{DigitalOcean, ShellHookRunner, SshConnector, SshSession};

use super::cli::SshArgs;

/// Type alias for the concrete executor with all dependencies
pub type ConcreteDeploymentExecutor = DeploymentExecutor<SshSession, ShellHookRunner>;

/// Private key used when neither `--key` nor `--agent` is given
pub fn default_private_key() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ssh").join("id_rsa"))
}

/// Resolve SSH flags into a session target for `address`
pub fn session_target(ssh: &SshArgs, address: &str) -> SessionTarget {
    let auth = if ssh.agent {
        SessionAuth::Agent
    } else {
        match ssh.key.clone().or_else(default_private_key) {
            Some(key) => SessionAuth::Key(key),
            None => SessionAuth::Agent,
        }
    };

    SessionTarget {
        user: ssh.user.clone(),
        address: address.to_string(),
        port: ssh.port,
        auth,
        known_hosts: ssh.known_hosts.clone(),
    }
}

/// Create the provider client from config credentials
pub fn create_provider(config: &Config) -> Result<DigitalOcean, ProviderError> {
    DigitalOcean::new(config.provider.api_key().unwrap_or_default())
}

/// Create a provision worker for `plan`
pub fn create_worker(config: &Config, plan: MachinePlan) -> ApkerResult<ProvisionWorker<DigitalOcean>> {
    Ok(ProvisionWorker::new(create_provider(config)?, plan))
}

/// Connect to the machine and create an executor over that session
pub fn create_executor(target: &SessionTarget) -> ApkerResult<ConcreteDeploymentExecutor> {
    let session = SshConnector.connect(target)?;
    Ok(DeploymentExecutor::new(session, ShellHookRunner))
}
