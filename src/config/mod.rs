//! Configuration module for Apker
//!
//! Resolution order, highest first:
//! 1. CLI flags
//! 2. Environment variables (APKER_*)
//! 3. Project config (`apker.yaml`)
//! 4. Interactive prompts, then built-in defaults

mod loader;
mod types;

pub use loader::{with_env_overrides, ConfigWarning};
pub use types::{
    expand_size_alias, Config, DeployConfig, EventsConfig, ImageConfig, ProviderConfig,
    DEFAULT_PROVIDER, DEFAULT_REGION, DEFAULT_SIZE,
};

use crate::domain::entities::CompiledStep;
use crate::domain::services::{validate_action_name, StepCompiler};
use crate::domain::value_objects::ImageSource;
use crate::error::{ApkerError, ApkerResult};

impl Config {
    /// Reject anything that would fail later on the machine
    ///
    /// Runs before any provider or SSH call.
    pub fn validate(&self) -> ApkerResult<()> {
        if self.image_source().is_none() {
            return Err(ApkerError::InvalidConfig {
                message: "image name or url is required (image.from)".to_string(),
            });
        }

        if self.provider.name != DEFAULT_PROVIDER {
            return Err(ApkerError::InvalidConfig {
                message: format!("unknown provider name: {}", self.provider.name),
            });
        }

        for name in self.actions.keys() {
            validate_action_name(name)?;
        }

        StepCompiler::new().check(&self.deploy.steps)?;
        Ok(())
    }

    /// Compile `deploy.steps`
    pub fn compile_steps(&self) -> ApkerResult<Vec<CompiledStep>> {
        Ok(StepCompiler::new().compile(&self.deploy.steps)?)
    }

    pub fn image_source(&self) -> Option<ImageSource> {
        ImageSource::parse(&self.image.from, self.image.distribution.as_deref())
    }
}
