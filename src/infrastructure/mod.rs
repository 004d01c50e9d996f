//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `providers/` - Cloud providers (DigitalOcean)
//! - `ssh/` - Remote sessions over the system `ssh`/`scp`
//! - `events/` - Event sinks (NDJSON)
//! - `hooks` - Local lifecycle hook runner
//! - `git` - Config fetch from a remote repository

pub mod events;
pub mod git;
pub mod hooks;
pub mod providers;
pub mod ssh;

// Re-export for convenience
pub use events::JsonEventSink;
pub use hooks::ShellHookRunner;
pub use providers::DigitalOcean;
pub use ssh::{SshConnector, SshSession};
