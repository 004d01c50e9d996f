//! `apker list`

use std::path::Path;

use anyhow::Result;

use apker::application::list_machines;
use apker::config::{with_env_overrides, Config};
use apker::presentation::factory::create_provider;

use crate::ui::context::UiContext;
use crate::ui::views::list::{machine_json, render_machine_list};

/// Credentials come from `apker.yaml` when present, otherwise from
/// `APKER_API_KEY` alone.
pub fn cmd_list(config_path: &Path, ui: UiContext) -> Result<()> {
    let config = if config_path.exists() {
        super::load_local_config(config_path, &ui)?
    } else {
        with_env_overrides(Config::default())
    };

    let provider = create_provider(&config)?;
    let droplets = list_machines(&provider)?;

    if ui.json {
        for droplet in &droplets {
            let _ = crate::ui::json::emit(machine_json(droplet));
        }
        return Ok(());
    }

    print!("{}", render_machine_list(&droplets, &ui));
    Ok(())
}
