//! Apker - build machine images and deploy git repositories onto them
//!
//! Provisions a DigitalOcean droplet (optionally from a custom image URL),
//! waits for it to come up, then runs the project's deploy steps over SSH.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use config::Config;
pub use domain::entities::{CompiledStep, MachineStatus};
pub use domain::services::{StepCompiler, StepError};
pub use domain::value_objects::ProvisionRequest;
pub use error::{ApkerError, ApkerResult};
