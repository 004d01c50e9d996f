//! Compiled deploy step entity

use std::borrow::Cow;

/// Placeholder shown in place of a redacted secret
pub const REDACTED: &str = "***";

/// A file generated locally and uploaded before the step's command runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUpload {
    /// Remote destination path
    pub remote_path: String,
    /// File content
    pub content: String,
}

/// One executable unit of remote work
///
/// Produced by the step compiler (user steps) or the deploy prelude.
/// Immutable once built; order in the containing list is execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledStep {
    label: String,
    done_message: String,
    command: String,
    secret: Option<String>,
    upload: Option<StagedUpload>,
}

impl CompiledStep {
    pub fn new(
        label: impl Into<String>,
        done_message: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            done_message: done_message.into(),
            command: command.into(),
            secret: None,
            upload: None,
        }
    }

    /// Mark a substring of the command as secret
    ///
    /// The secret stays in `command()` but is masked everywhere else.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        if !secret.is_empty() {
            self.secret = Some(secret);
        }
        self
    }

    /// Attach a staged file uploaded right before the command runs
    pub fn with_upload(mut self, upload: StagedUpload) -> Self {
        self.upload = Some(upload);
        self
    }

    /// Progress message shown before execution
    pub fn label(&self) -> Cow<'_, str> {
        self.redact(&self.label)
    }

    /// Message shown after a successful execution
    pub fn done_message(&self) -> Cow<'_, str> {
        self.redact(&self.done_message)
    }

    /// The exact remote shell command
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The remote command with any secret masked
    pub fn display_command(&self) -> Cow<'_, str> {
        self.redact(&self.command)
    }

    pub fn upload(&self) -> Option<&StagedUpload> {
        self.upload.as_ref()
    }

    /// Mask the secret in arbitrary text (e.g. captured remote output)
    pub fn redact<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match &self.secret {
            Some(secret) if text.contains(secret.as_str()) => {
                Cow::Owned(text.replace(secret.as_str(), REDACTED))
            }
            _ => Cow::Borrowed(text),
        }
    }
}
