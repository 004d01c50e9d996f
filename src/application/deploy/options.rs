//! Deploy Options
//!
//! Everything the executor needs besides the session and the compiled
//! user steps.

use std::collections::BTreeMap;

/// Local commands run after the deployment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleHooks {
    pub success: Option<String>,
    pub failure: Option<String>,
}

/// Options for the deployment executor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployOptions {
    /// Git repository cloned into the work dir
    pub repository: String,
    /// `user:token` credentials embedded into https clone URLs
    pub auth: Option<String>,
    /// Commands run before anything else
    pub setup: Vec<String>,
    /// Action name to command
    pub actions: BTreeMap<String, String>,
    pub hooks: LifecycleHooks,
    /// Run lifecycle hooks at all (`--no-hooks` turns them off)
    pub run_hooks: bool,
}

impl DeployOptions {
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            run_hooks: true,
            ..Self::default()
        }
    }

    pub fn with_auth(mut self, auth: Option<String>) -> Self {
        self.auth = auth.filter(|a| !a.is_empty());
        self
    }

    pub fn with_setup(mut self, setup: Vec<String>) -> Self {
        self.setup = setup;
        self
    }

    pub fn with_actions(mut self, actions: BTreeMap<String, String>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_hooks(mut self, hooks: LifecycleHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn without_hooks(mut self) -> Self {
        self.run_hooks = false;
        self
    }
}
