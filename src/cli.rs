// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines the container and network subcommands and their shared arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "berth")]
#[command(about = "Translate loose container and network parameters into engine API arguments")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate container creation parameters
    Container {
        #[command(flatten)]
        args: TranslateArgs,
    },

    /// Translate network creation parameters
    Network {
        /// Network name for the engine request (with --bollard)
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        args: TranslateArgs,
    },
}

#[derive(Args)]
pub struct TranslateArgs {
    /// State file to read (defaults to berth.yml in the current directory)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Profile from the state file to apply
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Do not validate IP addresses and subnets
    #[arg(long)]
    pub no_validate_ip: bool,

    /// Keep the canonical value when an alias disagrees with it
    #[arg(long)]
    pub ignore_collisions: bool,

    /// Comma-separated fields to pass through untranslated
    #[arg(long, value_name = "FIELDS", conflicts_with = "skip_all")]
    pub skip_translate: Option<String>,

    /// Pass every field through untranslated
    #[arg(long)]
    pub skip_all: bool,

    /// Declared engine API version (MAJOR.MINOR)
    #[arg(long, value_name = "X.Y")]
    pub api_version: Option<String>,

    /// Print the engine request body instead of the canonical mapping
    #[arg(long)]
    pub bollard: bool,

    /// Fields as key=value; values are read as YAML
    #[arg(value_name = "KEY=VALUE")]
    pub fields: Vec<String>,
}
