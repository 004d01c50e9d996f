//! Deploy Result

/// Summary of a successful deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentReport {
    /// Steps executed, prelude included
    pub executed: usize,
    /// How many of those were prelude steps
    pub prelude: usize,
}

impl DeploymentReport {
    /// Steps that came from `deploy.steps`
    pub fn user_steps(&self) -> usize {
        self.executed.saturating_sub(self.prelude)
    }
}
