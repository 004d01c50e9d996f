//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `provision` - Background worker + monitor producing a ready machine
//! - `ConnectivityWaiter` - Waits for the SSH port
//! - `DeploymentExecutor` - Prelude and deploy steps over a remote session
//! - `list_machines` / `run_action` - The `list` and `run` commands

pub mod action;
pub mod connectivity;
pub mod deploy;
pub mod list;
pub mod provision;

pub use action::{action_command, run_action};
pub use connectivity::ConnectivityWaiter;
pub use deploy::{DeployOptions, DeploymentExecutor, DeploymentReport, LifecycleHooks};
pub use list::list_machines;
pub use provision::{
    provision, MachinePlan, MonitorOutcome, PollIntervals, ProvisionEvent, ProvisionWorker,
    ReadyMachine,
};
