//! Local lifecycle hook runner

use std::io;
use std::process::Command;

use crate::domain::ports::{HookOutput, HookRunner};

/// Runs hooks through `sh -c` in the current directory
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellHookRunner;

impl HookRunner for ShellHookRunner {
    fn run(&self, command: &str) -> io::Result<HookOutput> {
        let output = Command::new("sh").arg("-c").arg(command).output()?;

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);

        Ok(HookOutput {
            success: output.status.success(),
            output: combined,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_and_stderr() {
        let out = ShellHookRunner.run("echo out; echo err >&2").unwrap();
        assert!(out.success);
        assert_eq!(String::from_utf8_lossy(&out.output), "out\nerr\n");
    }

    #[test]
    fn reports_nonzero_exit() {
        let out = ShellHookRunner.run("exit 3").unwrap();
        assert!(!out.success);
    }
}
