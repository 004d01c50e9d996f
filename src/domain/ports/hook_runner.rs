//! Lifecycle Hook Port
//!
//! Hooks are local shell commands run after the deployment finishes.

use std::io;

/// Result of a local hook command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookOutput {
    pub success: bool,
    /// Combined stdout and stderr
    pub output: Vec<u8>,
}

/// Runs hook commands on the local machine
pub trait HookRunner {
    fn run(&self, command: &str) -> io::Result<HookOutput>;
}
