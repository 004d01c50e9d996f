//! Deploy Module
//!
//! Runs the deployment on a ready machine.
//!
//! ## Structure
//!
//! - `options` - Configuration types (`DeployOptions`, `LifecycleHooks`)
//! - `prelude` - Steps prepended to every deployment
//! - `result` - Result types (`DeploymentReport`)
//! - `use_case` - Sequential executor (`DeploymentExecutor`)
//!
//! ## Usage
//!
//! ```ignore
//! use apker::application::deploy::{DeployOptions, DeploymentExecutor};
//!
//! let executor = DeploymentExecutor::new(session, ShellHookRunner);
//! let report = executor.execute(&DeployOptions::new(repo), &steps, &sink)?;
//! ```

mod options;
mod prelude;
mod result;
mod use_case;

pub use options::{DeployOptions, LifecycleHooks};
pub use prelude::{authenticated_url, build_prelude, ACTIONS_SCRIPT, CONFIG_DIR, CONFIG_FILE};
pub use result::DeploymentReport;
pub use use_case::DeploymentExecutor;

#[cfg(test)]
mod tests;
