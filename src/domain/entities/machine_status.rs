//! Provisioning status snapshot

use crate::domain::ports::ProviderError;

/// Snapshot emitted by the provision worker on every observable change
///
/// A run ends with exactly one terminal snapshot: either `error` is set or
/// `machine_ready` is true.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineStatus {
    /// Raw provider status text (`new`, `pending`, `available`, `active`, ...)
    pub status: String,
    pub image_ready: bool,
    /// Set once the image is in use by a droplet
    pub image_installed: bool,
    pub machine_ready: bool,
    /// First IPv4 address assigned to the droplet
    pub address: Option<String>,
    pub error: Option<ProviderError>,
    pub image_id: Option<u64>,
    pub droplet_id: Option<u64>,
}

impl MachineStatus {
    pub fn failed(error: ProviderError) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.error.is_some() || self.machine_ready
    }
}
