//! # CLI Interface
//!
//! Defines the command-line argument structure for `meridian-node` using
//! `clap` derive. Supports three subcommands: `init`, `validate` and
//! `version`.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Meridian validator node tooling.
///
/// Prepares a node home directory and runs the block admission rules
/// against blocks stored on disk.
#[derive(Parser, Debug)]
#[command(
    name = "meridian-node",
    about = "Meridian validator node tooling",
    version,
    propagate_version = true
)]
pub struct MeridianNodeCli {
    /// Log output format: "pretty" or "json".
    #[arg(long, global = true, env = "MERIDIAN_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the Meridian node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a node home: validator key, genesis file and validator
    /// history. Existing files are reused.
    Init(InitArgs),
    /// Check whether a block would be admitted on top of a chain state.
    Validate(ValidateArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Node home directory.
    #[arg(long, env = "MERIDIAN_HOME", default_value = "~/.meridian")]
    pub home: PathBuf,

    /// Chain id for a newly created genesis file. Derived from the
    /// validator address when omitted.
    #[arg(long)]
    pub chain_id: Option<String>,
}

/// Arguments for the `validate` subcommand.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Node home directory.
    #[arg(long, env = "MERIDIAN_HOME", default_value = "~/.meridian")]
    pub home: PathBuf,

    /// Candidate block (JSON).
    #[arg(long, short = 'b')]
    pub block: PathBuf,

    /// Chain state to validate against (JSON). Defaults to the genesis state.
    #[arg(long, short = 's')]
    pub state: Option<PathBuf>,

    /// Wall-clock reading to validate at (RFC 3339). Defaults to now.
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}
