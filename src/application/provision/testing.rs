//! Scripted provider for provisioning tests

use std::sync::{Arc, Mutex};

use crate::domain::ports::{
    CloudProvider, Droplet, DropletSpec, Image, ImageSpec, NetworkAddress, ProviderError, Region,
    Size,
};

#[derive(Default)]
struct Script {
    image_statuses: Vec<String>,
    droplet_statuses: Vec<String>,
    address_from: Option<(usize, String)>,
    fail_create_droplet: Option<String>,
    fail_droplet_poll_at: Option<usize>,
    image_polls: usize,
    droplet_polls: usize,
}

/// Provider that answers from a script and records every call
pub struct FakeProvider {
    script: Mutex<Script>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeProvider {
    pub const IMAGE_ID: u64 = 9001;
    pub const DROPLET_ID: u64 = 4242;

    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script::default()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn image_statuses(self, statuses: &[&str]) -> Self {
        self.script.lock().unwrap().image_statuses =
            statuses.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn droplet_statuses(self, statuses: &[&str]) -> Self {
        self.script.lock().unwrap().droplet_statuses =
            statuses.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Report `address` from the given (zero-based) droplet poll onwards
    pub fn address_from_poll(self, poll: usize, address: &str) -> Self {
        self.script.lock().unwrap().address_from = Some((poll, address.to_string()));
        self
    }

    pub fn fail_create_droplet(self, message: &str) -> Self {
        self.script.lock().unwrap().fail_create_droplet = Some(message.to_string());
        self
    }

    pub fn fail_droplet_poll_at(self, poll: usize) -> Self {
        self.script.lock().unwrap().fail_droplet_poll_at = Some(poll);
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn nth_or_last(list: &[String], n: usize, fallback: &str) -> String {
    list.get(n)
        .or_else(|| list.last())
        .cloned()
        .unwrap_or_else(|| fallback.to_string())
}

impl CloudProvider for FakeProvider {
    fn create_image(&self, spec: &ImageSpec) -> Result<Image, ProviderError> {
        self.record(format!("create_image {} {}", spec.name, spec.url));
        Ok(Image {
            id: Self::IMAGE_ID,
            name: spec.name.clone(),
            status: "NEW".to_string(),
        })
    }

    fn get_image(&self, id: u64) -> Result<Image, ProviderError> {
        self.record(format!("get_image {}", id));
        let mut script = self.script.lock().unwrap();
        let status = nth_or_last(&script.image_statuses, script.image_polls, "available");
        script.image_polls += 1;
        Ok(Image {
            id,
            name: "image".to_string(),
            status,
        })
    }

    fn create_droplet(&self, spec: &DropletSpec) -> Result<Droplet, ProviderError> {
        self.record(format!(
            "create_droplet image={} tags={}",
            serde_json::to_string(&spec.image).unwrap(),
            spec.tags.join(",")
        ));
        if let Some(message) = &self.script.lock().unwrap().fail_create_droplet {
            return Err(ProviderError::Api {
                status: 422,
                message: message.clone(),
            });
        }
        Ok(Droplet {
            id: Self::DROPLET_ID,
            name: spec.name.clone(),
            status: "new".to_string(),
            region: spec.region.clone(),
            ipv4: Vec::new(),
            created_at: None,
        })
    }

    fn get_droplet(&self, id: u64) -> Result<Droplet, ProviderError> {
        self.record(format!("get_droplet {}", id));
        let mut script = self.script.lock().unwrap();
        let poll = script.droplet_polls;
        script.droplet_polls += 1;

        if script.fail_droplet_poll_at == Some(poll) {
            return Err(ProviderError::Request("connection reset".to_string()));
        }

        let ipv4 = match &script.address_from {
            Some((from, address)) if poll >= *from => vec![NetworkAddress {
                ip_address: address.clone(),
                kind: "public".to_string(),
            }],
            _ => Vec::new(),
        };

        Ok(Droplet {
            id,
            name: "droplet".to_string(),
            status: nth_or_last(&script.droplet_statuses, poll, "active"),
            region: "nyc3".to_string(),
            ipv4,
            created_at: None,
        })
    }

    fn list_droplets(&self, tag: &str) -> Result<Vec<Droplet>, ProviderError> {
        self.record(format!("list_droplets {}", tag));
        Ok(Vec::new())
    }

    fn list_sizes(&self) -> Result<Vec<Size>, ProviderError> {
        Ok(Vec::new())
    }

    fn list_regions(&self) -> Result<Vec<Region>, ProviderError> {
        Ok(Vec::new())
    }
}
