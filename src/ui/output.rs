use apker::config::ConfigWarning;

use crate::ui::context::UiContext;
use crate::ui::primitives::icon::Icon;

pub fn render_config_warning(w: &ConfigWarning, ui: &UiContext) -> String {
    let icon = Icon::Warning.colored(ui.color, ui.unicode);
    let mut out = match w.line {
        Some(line) => format!("{} Unknown config key '{}' in {}:{}", icon, w.key, w.file.display(), line),
        None => format!("{} Unknown config key '{}' in {}", icon, w.key, w.file.display()),
    };
    if let Some(suggestion) = &w.suggestion {
        out.push_str(&format!("\n   Did you mean '{}'?", suggestion));
    }
    out
}

pub fn print_config_warnings(warnings: &[ConfigWarning], ui: &UiContext) {
    if ui.json {
        for w in warnings {
            let _ = crate::ui::json::emit(serde_json::json!({
                "event": "config_warning",
                "key": w.key,
                "file": w.file.display().to_string(),
                "line": w.line,
                "suggestion": w.suggestion,
            }));
        }
        return;
    }

    for w in warnings {
        eprintln!("{}", render_config_warning(w, ui));
    }
}
