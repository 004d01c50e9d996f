//! Configuration type definitions (`apker.yaml`)

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ApkerResult;

use super::loader::{self, ConfigWarning};

/// Provider the tool knows how to drive
pub const DEFAULT_PROVIDER: &str = "digitalocean";

/// Size used when nothing is configured and nobody can be asked
pub const DEFAULT_SIZE: &str = "s-1vcpu-1gb";

/// Region used when nothing is configured and nobody can be asked
pub const DEFAULT_REGION: &str = "nyc3";

/// Size shorthands accepted on the command line and in the config
pub fn expand_size_alias(size: &str) -> String {
    match size {
        "small" => DEFAULT_SIZE.to_string(),
        other => other.to_string(),
    }
}

/// Machine image configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Distribution slug (`ubuntu-22-04-x64`) or `http(s)://` image URL
    pub from: String,

    /// Distribution label for custom images
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Cloud provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub name: String,

    /// Provider credentials (`API_KEY` for DigitalOcean)
    pub credentials: BTreeMap<String, String>,

    /// SSH key ids or fingerprints registered with the provider
    pub ssh_keys: Vec<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_PROVIDER.to_string(),
            credentials: BTreeMap::new(),
            ssh_keys: Vec::new(),
        }
    }
}

impl ProviderConfig {
    pub fn api_key(&self) -> Option<&str> {
        self.credentials
            .get("API_KEY")
            .map(String::as_str)
            .filter(|k| !k.is_empty())
    }
}

/// Deployment configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Git repository to deploy when `--url` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    /// Commands run before the checkout
    pub setup: Vec<String>,

    /// Deploy step lines
    pub steps: Vec<String>,
}

/// Local commands run after a deployment
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: String,

    /// Project name, used for the default machine name
    pub name: String,

    pub image: ImageConfig,

    pub provider: ProviderConfig,

    pub deploy: DeployConfig,

    /// Action name to command, installed under `/usr/share/apker/bin`
    pub actions: BTreeMap<String, String>,

    pub events: EventsConfig,

    /// Credentials for private https repositories (`user:token`).
    /// Only ever set from `APKER_AUTH`.
    #[serde(skip)]
    pub repository_auth: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            name: String::new(),
            image: ImageConfig::default(),
            provider: ProviderConfig::default(),
            deploy: DeployConfig::default(),
            actions: BTreeMap::new(),
            events: EventsConfig::default(),
            repository_auth: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> ApkerResult<Self> {
        loader::load_with_warnings(path).map(|(config, _)| config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> ApkerResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str, origin: &Path) -> ApkerResult<(Self, Vec<ConfigWarning>)> {
        loader::parse_with_warnings(content, origin)
    }

    /// Machine name derived from the project name
    pub fn default_machine_name(&self) -> Option<String> {
        let name = self.name.trim();
        (!name.is_empty()).then(|| format!("apker-image-{}", name))
    }
}
