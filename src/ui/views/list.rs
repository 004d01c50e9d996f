use apker::domain::ports::Droplet;

use crate::ui::blocks::header::CommandHeader;
use crate::ui::context::UiContext;
use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;

const COLUMNS: [&str; 6] = ["ID", "NAME", "STATUS", "ADDRESS", "REGION", "CREATED"];

fn row(droplet: &Droplet) -> [String; 6] {
    [
        droplet.id.to_string(),
        droplet.name.clone(),
        droplet.status.clone(),
        droplet.first_ipv4().unwrap_or("-").to_string(),
        droplet.region.clone(),
        droplet
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string()),
    ]
}

pub fn render_machine_list(droplets: &[Droplet], ui: &UiContext) -> String {
    let header = CommandHeader::new(Icon::Machine, format!("Apker Machines ({})", droplets.len()));
    let mut out = header.render(ui.color, ui.unicode);

    if droplets.is_empty() {
        out.push_str(&ColoredText::dim("  No machines found.").render(ui.color));
        out.push('\n');
        return out;
    }

    let rows: Vec<[String; 6]> = droplets.iter().map(row).collect();
    let mut widths = COLUMNS.map(str::len);
    for r in &rows {
        for (width, cell) in widths.iter_mut().zip(r.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        format!("  {}", padded.join("  ").trim_end())
    };

    let titles: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
    out.push_str(&ColoredText::dim(format_row(&titles)).render(ui.color));
    out.push('\n');
    for r in &rows {
        out.push_str(&format_row(r));
        out.push('\n');
    }
    out
}

pub fn machine_json(droplet: &Droplet) -> serde_json::Value {
    serde_json::json!({
        "event": "machine",
        "command": "list",
        "id": droplet.id,
        "name": droplet.name,
        "status": droplet.status,
        "address": droplet.first_ipv4(),
        "region": droplet.region,
        "created_at": droplet.created_at.map(|t| t.to_rfc3339()),
    })
}
