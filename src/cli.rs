//! Command-line interface definition.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI entry point for the file and link provisioner.
#[derive(Parser, Debug)]
#[command(
    name = "bootfiles",
    about = "Materialize files and links from a provisioning manifest",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Resolve every entry but write nothing
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Destination root every manifest path is placed under
    #[arg(long, global = true, env = "BOOTFILES_ROOT", default_value = "/")]
    pub root: PathBuf,

    /// Write the run log here instead of the cache directory
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write every file and link in the manifest
    Apply(ApplyOpts),
    /// Resolve every entry without touching the destination
    Check(CheckOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Apply(_) => "apply",
            Self::Check(_) => "check",
            Self::Version => "version",
        }
    }
}

/// Options for the `apply` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ApplyOpts {
    /// Path to the TOML manifest
    #[arg(short, long)]
    pub config: PathBuf,

    /// Continue past entries that fail to write (resolution failures still abort)
    #[arg(short, long)]
    pub keep_going: bool,
}

/// Options for the `check` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CheckOpts {
    /// Path to the TOML manifest
    #[arg(short, long)]
    pub config: PathBuf,
}
