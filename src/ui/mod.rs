//! Terminal output for the apker binary
//!
//! Colors and icons come from `theme`; everything printed to the console is
//! rendered by a `views` function or `ConsoleView`. `--json` switches to
//! NDJSON on stdout.

pub mod context;
pub mod error;
pub mod json;
pub mod output;
pub mod terminal;
pub mod theme;

pub mod blocks {
    pub mod header;
}

pub mod primitives {
    pub mod icon;
    pub mod text;
}

pub mod views {
    pub mod deploy;
    pub mod list;
}
