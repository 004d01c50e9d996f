//! Provision worker
//!
//! Runs on its own thread and reports every provider observation as a
//! `MachineStatus` snapshot:
//!
//! ```text
//! CreatingImage? -> ImageReady -> CreatingDroplet? -> DropletPending -> DropletActive
//!        \______________\_______________\__________________\-----> Error
//! ```

use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::entities::MachineStatus;
use crate::domain::ports::{CloudProvider, DropletSpec, ImageSpec, ProviderError, SshKeyRef};
use crate::domain::value_objects::{ImageRef, ImageSource, ProvisionRequest};

/// Tags put on everything apker creates
pub const DEFAULT_TAGS: &[&str] = &["apker", "api"];

/// Delay between provider polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    pub image: Duration,
    pub droplet: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            // Custom images usually take minutes; no point asking more often.
            image: Duration::from_secs(12),
            droplet: Duration::from_secs(5),
        }
    }
}

impl PollIntervals {
    /// No delay at all (tests)
    pub fn immediate() -> Self {
        Self {
            image: Duration::ZERO,
            droplet: Duration::ZERO,
        }
    }
}

/// What to create at the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachinePlan {
    pub name: String,
    pub region: String,
    pub size: String,
    pub image: ImageSource,
    /// SSH key ids or fingerprints registered at the provider
    pub ssh_keys: Vec<String>,
}

/// Write side of the status stream
///
/// The worker only sends; closing the stream is up to whoever owns it.
#[derive(Debug, Clone)]
pub struct StatusSink {
    tx: Sender<MachineStatus>,
}

impl StatusSink {
    pub fn new(tx: Sender<MachineStatus>) -> Self {
        Self { tx }
    }

    /// Returns false once nobody is reading anymore
    fn emit(&self, status: MachineStatus) -> bool {
        self.tx.send(status).is_ok()
    }
}

/// Why the worker stopped before reaching an active droplet
enum Halt {
    /// An error snapshot was emitted
    Failed,
    /// The reader is gone (monitor timed out)
    Abandoned,
}

/// Drives provider calls for one provisioning run
pub struct ProvisionWorker<P> {
    provider: P,
    plan: MachinePlan,
    intervals: PollIntervals,
}

impl<P: CloudProvider> ProvisionWorker<P> {
    pub fn new(provider: P, plan: MachinePlan) -> Self {
        Self {
            provider,
            plan,
            intervals: PollIntervals::default(),
        }
    }

    pub fn with_intervals(mut self, intervals: PollIntervals) -> Self {
        self.intervals = intervals;
        self
    }

    /// Emit snapshots until the droplet is active or something fails
    pub fn run(&self, sink: &StatusSink, request: ProvisionRequest) {
        match self.drive(sink, request) {
            Ok(()) => info!("droplet is active"),
            Err(Halt::Failed) => debug!("provisioning stopped on error"),
            Err(Halt::Abandoned) => warn!("status reader went away; abandoning provisioning"),
        }
    }

    fn drive(&self, sink: &StatusSink, request: ProvisionRequest) -> Result<(), Halt> {
        let (image, image_id) = match request {
            ProvisionRequest::UseExistingDroplet(droplet_id) => {
                emit(sink, available_snapshot(None, Some(droplet_id)))?;
                return self.poll_droplet(sink, droplet_id, None, false);
            }
            ProvisionRequest::UseExistingImage(image_id) => {
                emit(sink, available_snapshot(Some(image_id), None))?;
                (ImageRef::Id(image_id), Some(image_id))
            }
            ProvisionRequest::CreateNew => match &self.plan.image {
                ImageSource::Custom { url, distribution } => {
                    let image_id = self.build_image(sink, url, distribution)?;
                    (ImageRef::Id(image_id), Some(image_id))
                }
                ImageSource::Distribution(slug) => (ImageRef::Slug(slug.clone()), None),
            },
        };

        let spec = DropletSpec {
            name: self.plan.name.clone(),
            region: self.plan.region.clone(),
            size: self.plan.size.clone(),
            image,
            ssh_keys: self.plan.ssh_keys.iter().map(|k| SshKeyRef::parse(k)).collect(),
            tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
        };

        let droplet = self
            .provider
            .create_droplet(&spec)
            .map_err(|e| fail(sink, e, image_id, None))?;
        info!(droplet_id = droplet.id, name = %droplet.name, "droplet created");

        self.poll_droplet(sink, droplet.id, image_id, true)
    }

    fn build_image(&self, sink: &StatusSink, url: &str, distribution: &str) -> Result<u64, Halt> {
        let spec = ImageSpec {
            name: self.plan.name.clone(),
            url: url.to_string(),
            region: self.plan.region.clone(),
            distribution: distribution.to_string(),
            description: "This image created by apker".to_string(),
            tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
        };

        let image = self
            .provider
            .create_image(&spec)
            .map_err(|e| fail(sink, e, None, None))?;
        info!(image_id = image.id, "custom image submitted");

        loop {
            pause(self.intervals.image);

            let image = self
                .provider
                .get_image(image.id)
                .map_err(|e| fail(sink, e, Some(image.id), None))?;
            debug!(image_id = image.id, status = %image.status, "image poll");

            let ready = image.is_available();
            emit(
                sink,
                MachineStatus {
                    status: image.status.clone(),
                    image_ready: ready,
                    image_id: Some(image.id),
                    ..MachineStatus::default()
                },
            )?;

            if ready {
                return Ok(image.id);
            }
        }
    }

    fn poll_droplet(
        &self,
        sink: &StatusSink,
        droplet_id: u64,
        image_id: Option<u64>,
        delay_first: bool,
    ) -> Result<(), Halt> {
        let mut first = true;

        loop {
            if delay_first || !first {
                pause(self.intervals.droplet);
            }
            first = false;

            let droplet = self
                .provider
                .get_droplet(droplet_id)
                .map_err(|e| fail(sink, e, image_id, Some(droplet_id)))?;
            debug!(droplet_id, status = %droplet.status, "droplet poll");

            let active = droplet.is_active();
            emit(
                sink,
                MachineStatus {
                    status: droplet.status.clone(),
                    image_ready: true,
                    image_installed: true,
                    machine_ready: active,
                    address: droplet.first_ipv4().map(str::to_string),
                    error: None,
                    image_id,
                    droplet_id: Some(droplet_id),
                },
            )?;

            if active {
                return Ok(());
            }
        }
    }
}

fn available_snapshot(image_id: Option<u64>, droplet_id: Option<u64>) -> MachineStatus {
    MachineStatus {
        status: "available".to_string(),
        image_ready: true,
        image_id,
        droplet_id,
        ..MachineStatus::default()
    }
}

fn emit(sink: &StatusSink, status: MachineStatus) -> Result<(), Halt> {
    if sink.emit(status) {
        Ok(())
    } else {
        Err(Halt::Abandoned)
    }
}

fn fail(
    sink: &StatusSink,
    error: ProviderError,
    image_id: Option<u64>,
    droplet_id: Option<u64>,
) -> Halt {
    warn!(error = %error, "provider call failed");
    let _ = sink.emit(MachineStatus {
        image_id,
        droplet_id,
        ..MachineStatus::failed(error)
    });
    Halt::Failed
}

fn pause(interval: Duration) {
    if !interval.is_zero() {
        thread::sleep(interval);
    }
}
