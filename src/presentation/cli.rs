//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! ## Design Notes
//!
//! - Global flags (--json, --color, --verbose) are inherited by all subcommands
//! - Flags override `apker.yaml`, which overrides built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// Apker - build and deploy machine images from a git repository
#[derive(Parser, Debug)]
#[command(name = "apker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format for CI (NDJSON events)
    #[arg(long, global = true)]
    pub json: bool,

    /// Color output mode
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorWhen>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// SSH connection flags shared by `deploy` and `run`
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SshArgs {
    /// SSH user on the machine
    #[arg(long, default_value = "root")]
    pub user: String,

    /// Private key path (defaults to ~/.ssh/id_rsa; use --agent to skip)
    #[arg(short = 'i', long)]
    pub key: Option<PathBuf>,

    /// Authenticate with the local ssh agent instead of a key file
    #[arg(long, conflicts_with = "key")]
    pub agent: bool,

    /// known_hosts file (defaults to the ssh client's own)
    #[arg(long)]
    pub known_hosts: Option<PathBuf>,

    /// SSH port
    #[arg(long, default_value_t = 22)]
    pub port: u16,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct DeployArgs {
    /// Path to apker.yaml (fetched from the repository when missing)
    #[arg(short, long, default_value = "apker.yaml")]
    pub config: PathBuf,

    /// Machine name
    #[arg(long)]
    pub name: Option<String>,

    /// Machine size slug ("small" = s-1vcpu-1gb)
    #[arg(long)]
    pub size: Option<String>,

    /// Datacenter region slug
    #[arg(long, alias = "location")]
    pub region: Option<String>,

    /// Git repository to deploy
    #[arg(long, alias = "repo")]
    pub url: Option<String>,

    /// Time to wait for the machine (e.g. 90s, 10m); 0 waits forever
    #[arg(short, long, value_parser = parse_duration, default_value = "0s")]
    pub timeout: Duration,

    /// Exit successfully when the wait times out
    #[arg(long, alias = "nt")]
    pub no_timeout_error: bool,

    /// Deploy to an existing droplet
    #[arg(long)]
    pub id: Option<u64>,

    /// Create the droplet from an existing image
    #[arg(long)]
    pub image: Option<u64>,

    /// Skip events.success / events.failure
    #[arg(long)]
    pub no_hooks: bool,

    #[command(flatten)]
    pub ssh: SshArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provision a machine and deploy the repository onto it
    #[command(visible_alias = "dep")]
    Deploy(DeployArgs),

    /// List machines created by apker
    #[command(visible_alias = "ls")]
    List {
        /// Path to apker.yaml (for provider credentials)
        #[arg(short, long, default_value = "apker.yaml")]
        config: PathBuf,
    },

    /// Run an installed action on a machine
    Run {
        /// Action name
        action: String,

        /// Machine address
        #[arg(long, alias = "ip")]
        addr: String,

        /// Action environment (NAME=VALUE), repeatable
        #[arg(short, long = "env", value_parser = parse_env_pair)]
        env: Vec<(String, String)>,

        #[command(flatten)]
        ssh: SshArgs,
    },
}

fn parse_duration(value: &str) -> Result<Duration, String> {
    if value.trim() == "0" {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(value).map_err(|e| e.to_string())
}

fn parse_env_pair(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((name, val)) if is_env_name(name) => Ok((name.to_string(), val.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", value)),
    }
}

fn is_env_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
