pub mod deploy;
pub mod list;
pub mod prompts;
pub mod run;

use std::path::Path;

use anyhow::Result;
use apker::config::{with_env_overrides, Config};

use crate::ui::context::UiContext;
use crate::ui::output::print_config_warnings;

/// Load a local config file (with env overrides), printing unknown-key warnings
pub fn load_local_config(path: &Path, ui: &UiContext) -> Result<Config> {
    let (config, warnings) = Config::load_with_warnings(path)?;
    print_config_warnings(&warnings, ui);
    Ok(with_env_overrides(config))
}
