//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod cloud_provider;
pub mod deploy_events;
pub mod hook_runner;
pub mod remote_session;

pub use cloud_provider::{
    CloudProvider, Droplet, DropletSpec, Image, ImageSpec, NetworkAddress, ProviderError, Region,
    Size, SshKeyRef,
};
pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink};
pub use hook_runner::{HookOutput, HookRunner};
pub use remote_session::{
    CommandOutput, RemoteSession, SessionAuth, SessionConnector, SessionError, SessionTarget,
};
