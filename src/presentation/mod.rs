//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Wiring use cases to their infrastructure dependencies
//!
//! ## Structure
//!
//! - `cli` - Argument definitions
//! - `factory` - Creates executors and workers with proper dependencies

pub mod cli;
pub mod factory;

pub use cli::{Cli, ColorWhen, Commands, DeployArgs, SshArgs};
