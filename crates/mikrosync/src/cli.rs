//! Clap derive structures for the `mikrosync` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// mikrosync -- poll a RouterOS router and print what it knows
#[derive(Debug, Parser)]
#[command(
    name = "mikrosync",
    version,
    about = "Poll RouterOS routers and reconcile their state",
    long_about = "Polls a RouterOS router over its REST API and keeps a normalized\n\
        snapshot of interfaces, client identity, NAT rules, resources,\n\
        firmware status and scripts.",
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
    /// Router profile to use
    #[arg(long, short = 'p', env = "MIKROSYNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Router URL (overrides profile)
    #[arg(long, short = 'r', env = "MIKROSYNC_ROUTER", global = true)]
    pub router: Option<String>,

    /// Username (overrides profile)
    #[arg(long, short = 'u', env = "MIKROSYNC_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password (overrides profile and keyring)
    #[arg(long, env = "MIKROSYNC_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MIKROSYNC_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "MIKROSYNC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "MIKROSYNC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Do not resolve client MAC/IP per interface
    #[arg(long, global = true)]
    pub no_arp: bool,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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
    /// Run one poll cycle and print the result
    #[command(alias = "snap", alias = "s")]
    Snapshot(SnapshotArgs),

    /// Keep polling and print a line per completed cycle
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Set a parameter on a matching menu entry
    Set(SetArgs),

    /// Run a script from /system/script
    RunScript(RunScriptArgs),

    /// Inspect configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Snapshot ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Section {
    All,
    Interfaces,
    Nat,
    Scripts,
    Resource,
    Firmware,
    Routerboard,
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Which part of the snapshot to print
    #[arg(value_enum, default_value = "all")]
    pub section: Section,

    /// Also run a firmware check before printing
    #[arg(long)]
    pub check_firmware: bool,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Fast cycle interval in seconds (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Stop after this many cycles
    #[arg(long, short = 'n')]
    pub count: Option<u64>,
}

// ── Write path ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Menu path, e.g. /interface
    pub path: String,

    /// Parameter to change
    pub param: String,

    /// New value
    pub value: String,

    /// Select the entry to change, as FIELD=VALUE (e.g. name=ether1)
    #[arg(long = "where", short = 'w', value_name = "FIELD=VALUE")]
    pub selector: String,
}

#[derive(Debug, Args)]
pub struct RunScriptArgs {
    /// Script name
    pub name: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,
    /// Show the effective configuration (passwords redacted)
    Show,
    /// List configured profiles
    Profiles,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}
