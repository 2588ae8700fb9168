//! Clap derive structures for the `meshherd` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// meshherd -- offline maintenance for mesh controller databases
#[derive(Debug, Parser)]
#[command(
    name = "meshherd",
    version,
    about = "Inspect and maintain a mesh network controller database",
    long_about = "Reads and edits the newline-delimited JSON database that a meshherd\n\
        controller persists its devices and groups in.\n\n\
        Runs without a radio attached: commands that would need to reach\n\
        devices report those steps as failed and carry on.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration file (defaults to the platform config dir)
    #[arg(long, env = "MESHHERD_CONFIG_FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Database file (overrides the configuration)
    #[arg(long, short = 'd', env = "MESHHERD_DB_FILE", global = true)]
    pub database: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MESHHERD_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect the database file
    Db(DbArgs),

    /// List known devices
    #[command(alias = "dev")]
    Devices(DevicesArgs),

    /// Manage groups and their members
    #[command(alias = "g")]
    Groups(GroupsArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

// ── Database ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DbArgs {
    #[command(subcommand)]
    pub command: DbCommand,
}

#[derive(Debug, Subcommand)]
pub enum DbCommand {
    /// Show record counts per kind
    Inspect,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices and their endpoints
    #[command(alias = "ls")]
    List,
}

// ── Groups ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(subcommand)]
    pub command: GroupsCommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupsCommand {
    /// List groups
    #[command(alias = "ls")]
    List,

    /// Show one group with its members
    Show {
        /// Group address
        address: u16,
    },

    /// Create an empty group
    Create {
        /// Group address (1-65535)
        #[arg(allow_negative_numbers = true)]
        address: i64,
    },

    /// Remove a group from every member, then delete it
    #[command(alias = "rm")]
    Delete {
        /// Group address
        address: u16,
    },

    /// Add a device endpoint to a group
    AddMember(MemberArgs),

    /// Remove a device endpoint from a group
    RemoveMember(MemberArgs),
}

#[derive(Debug, Args)]
pub struct MemberArgs {
    /// Group address
    pub address: u16,

    /// IEEE address of the device (e.g. 0x00124b0001abcdef)
    #[arg(value_name = "IEEE")]
    pub ieee: String,

    /// Endpoint id on the device
    pub endpoint: u8,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show,

    /// Print the configuration file path
    Path,
}
