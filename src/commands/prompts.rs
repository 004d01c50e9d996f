//! Interactive machine settings

use anyhow::Result;
use dialoguer::{Input, Select};

use apker::domain::ports::{Region, Size};

use crate::ui::context::UiContext;
use crate::ui::theme::prompt_theme;

fn size_label(size: &Size) -> String {
    format!(
        "{:<16} {} vCPU, {} MB, {} GB disk, ${:.0}/mo",
        size.slug, size.vcpus, size.memory_mb, size.disk_gb, size.price_monthly
    )
}

fn region_label(region: &Region) -> String {
    format!("{:<6} {}", region.slug, region.name)
}

fn index_of<'a>(mut slugs: impl Iterator<Item = &'a str>, wanted: &str) -> usize {
    slugs.position(|slug| slug == wanted).unwrap_or(0)
}

pub fn machine_name(default: &str, ui: &UiContext) -> Result<String> {
    let theme = prompt_theme(ui.color);
    let name: String = Input::with_theme(theme.as_ref())
        .with_prompt("Machine name")
        .default(default.to_string())
        .interact_text()?;
    Ok(name.trim().to_string())
}

/// Pick a size; `None` when the provider offered nothing to pick from
pub fn choose_size(sizes: &[Size], preferred: &str, ui: &UiContext) -> Result<Option<String>> {
    if sizes.is_empty() {
        return Ok(None);
    }
    let labels: Vec<String> = sizes.iter().map(size_label).collect();
    let theme = prompt_theme(ui.color);
    let selection = Select::with_theme(theme.as_ref())
        .with_prompt("Machine size")
        .items(&labels)
        .default(index_of(sizes.iter().map(|s| s.slug.as_str()), preferred))
        .interact()?;
    Ok(Some(sizes[selection].slug.clone()))
}

/// Pick one of the available regions
pub fn choose_region(regions: &[Region], preferred: &str, ui: &UiContext) -> Result<Option<String>> {
    let available: Vec<&Region> = regions.iter().filter(|r| r.available).collect();
    if available.is_empty() {
        return Ok(None);
    }
    let labels: Vec<String> = available.iter().map(|r| region_label(r)).collect();
    let theme = prompt_theme(ui.color);
    let selection = Select::with_theme(theme.as_ref())
        .with_prompt("Region")
        .items(&labels)
        .default(index_of(available.iter().map(|r| r.slug.as_str()), preferred))
        .interact()?;
    Ok(Some(available[selection].slug.clone()))
}
