use crossterm::style::Color;
use dialoguer::theme::{ColorfulTheme, SimpleTheme, Theme};

/// Design tokens for the Apker CLI.
///
/// - Only 5 semantic colors (`colors::*`)
/// - All icons are sourced from this module
pub mod colors {
    use super::Color;

    /// #22C55E
    pub const SUCCESS: Color = Color::Green;
    /// #EF4444
    pub const ERROR: Color = Color::Red;
    /// #F59E0B
    pub const WARNING: Color = Color::Yellow;
    /// #06B6D4
    pub const INFO: Color = Color::Cyan;
    /// #6B7280
    pub const DIM: Color = Color::DarkGrey;
}

pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const ERROR: &str = "✗";
    pub const WARNING: &str = "⚠";
    pub const PROGRESS: &str = "●";
    pub const PENDING: &str = "○";
    pub const ARROW: &str = "↳";
    pub const WAIT: &str = "⌛";

    // Command identifiers (used in headers).
    pub const DEPLOY: &str = "📦";
    pub const MACHINE: &str = "🖥";
    pub const REMOTE: &str = "📡";
}

pub mod icons_ascii {
    pub const SUCCESS: &str = "[OK]";
    pub const ERROR: &str = "[FAIL]";
    pub const WARNING: &str = "[WARN]";
    pub const PROGRESS: &str = "[..]";
    pub const PENDING: &str = "[ ]";
    pub const ARROW: &str = "[>]";
    pub const WAIT: &str = "[WAIT]";

    pub const DEPLOY: &str = "[DEPLOY]";
    pub const MACHINE: &str = "[MACHINE]";
    pub const REMOTE: &str = "[REMOTE]";
}

/// Prompt theme matching the output color mode
pub fn prompt_theme(supports_color: bool) -> Box<dyn Theme> {
    if supports_color {
        Box::new(ColorfulTheme::default())
    } else {
        Box::new(SimpleTheme)
    }
}
