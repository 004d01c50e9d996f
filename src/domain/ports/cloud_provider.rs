//! Cloud Provider Port
//!
//! The provision worker talks to the provider only through this trait.
//! `infrastructure::providers` holds the DigitalOcean implementation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::value_objects::ImageRef;

/// Request for a custom image built from a URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageSpec {
    pub name: String,
    pub url: String,
    pub region: String,
    pub distribution: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Request for a new droplet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropletSpec {
    pub name: String,
    pub region: String,
    pub size: String,
    pub image: ImageRef,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ssh_keys: Vec<SshKeyRef>,
    pub tags: Vec<String>,
}

/// An SSH key registered with the provider, by numeric id or fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SshKeyRef {
    Id(u64),
    Fingerprint(String),
}

impl SshKeyRef {
    pub fn parse(key: &str) -> Self {
        let key = key.trim();
        match key.parse() {
            Ok(id) if key.bytes().all(|b| b.is_ascii_digit()) => SshKeyRef::Id(id),
            _ => SshKeyRef::Fingerprint(key.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub id: u64,
    pub name: String,
    pub status: String,
}

impl Image {
    pub fn is_available(&self) -> bool {
        self.status == "available"
    }
}

/// An IPv4 address assigned to a droplet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkAddress {
    pub ip_address: String,
    /// `public` or `private`
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Droplet {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub region: String,
    pub ipv4: Vec<NetworkAddress>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Droplet {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    /// First IPv4 address, preferring a public one
    pub fn first_ipv4(&self) -> Option<&str> {
        self.ipv4
            .iter()
            .find(|n| n.kind == "public")
            .or_else(|| self.ipv4.first())
            .map(|n| n.ip_address.as_str())
    }
}

/// A machine size offered by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct Size {
    pub slug: String,
    pub memory_mb: u64,
    pub vcpus: u64,
    pub disk_gb: u64,
    pub price_monthly: f64,
}

/// A datacenter region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub slug: String,
    pub name: String,
    pub available: bool,
}

/// Provider call failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The API answered with a non-success status
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    /// The request never got an answer (network, TLS, timeout)
    #[error("request failed: {0}")]
    Request(String),

    /// The answer could not be decoded
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The provider is not usable with the given configuration
    #[error("{0}")]
    Unsupported(String),

    /// The worker went away without reporting a final state
    #[error("provisioning stopped before the machine was ready")]
    Stopped,
}

/// Cloud provider client
pub trait CloudProvider: Send {
    fn create_image(&self, spec: &ImageSpec) -> Result<Image, ProviderError>;

    fn get_image(&self, id: u64) -> Result<Image, ProviderError>;

    fn create_droplet(&self, spec: &DropletSpec) -> Result<Droplet, ProviderError>;

    fn get_droplet(&self, id: u64) -> Result<Droplet, ProviderError>;

    /// Droplets carrying the given tag
    fn list_droplets(&self, tag: &str) -> Result<Vec<Droplet>, ProviderError>;

    fn list_sizes(&self) -> Result<Vec<Size>, ProviderError>;

    fn list_regions(&self) -> Result<Vec<Region>, ProviderError>;
}
