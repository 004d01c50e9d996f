//! Apker CLI - provision a machine and deploy a git repository onto it
//!
//! Usage: apker <COMMAND>
//!
//! Commands:
//!   deploy  Provision a machine and run the deploy steps over SSH
//!   list    List machines created by apker
//!   run     Run an installed action on a machine

mod commands;
mod ui;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use apker::presentation::{Cli, Commands};

use crate::ui::context::UiContext;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ui = UiContext::new(cli.json, cli.verbose, cli.color);
    if let Err(err) = run(cli.command, ui) {
        crate::ui::error::print_error(&err, ui.json);
        std::process::exit(1);
    }
}

fn run(command: Commands, ui: UiContext) -> Result<()> {
    match command {
        Commands::Deploy(args) => commands::deploy::cmd_deploy(&args, ui),
        Commands::List { config } => commands::list::cmd_list(&config, ui),
        Commands::Run {
            action,
            addr,
            env,
            ssh,
        } => commands::run::cmd_run(&action, &addr, &env, &ssh, ui),
    }
}

/// Logs go to stderr so stdout stays clean for `--json`.
///
/// `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("apker={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
