//! Clap derive structures for the `ruledns` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! `ruledns man` and `ruledns completions` render from this same tree.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ruledns -- keep Cloudflare DNS records in step with Page Rules
#[derive(Debug, Parser)]
#[command(
    name = "ruledns",
    version,
    about = "Reconcile Cloudflare Page Rules with zone DNS records",
    long_about = "Derives the proxied DNS records a zone's Page Rules need, compares them\n\
        with the live records, and creates or deletes records to close the gap.\n\n\
        Nothing is changed without confirmation unless --yes is given.",
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
    /// Account profile to use
    #[arg(long, short = 'p', env = "RULEDNS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Cloudflare API base URL (overrides profile)
    #[arg(long, env = "RULEDNS_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Cloudflare API token
    #[arg(long, env = "RULEDNS_API_TOKEN", global = true, hide_env_values = true)]
    pub api_token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "RULEDNS_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "RULEDNS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect and create Page Rules
    #[command(alias = "r")]
    Rules(RulesArgs),

    /// Work with redirect description files offline
    Redirects(RedirectsArgs),

    /// Check and fix the DNS records Page Rules depend on
    Dns(DnsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Render manual pages
    Man(ManArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ZoneArg {
    /// Zone apex name, e.g. example.com (defaults to the profile's default_zone)
    #[arg(long, short = 'z')]
    pub zone: Option<String>,
}

// ── Rules ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RulesCommand {
    /// List the zone's Page Rules in evaluation order
    #[command(alias = "ls")]
    List(ZoneArg),

    /// Export the zone's forwarding rules as a redirect description
    Export(ZoneArg),

    /// Create Page Rules for a redirect description file
    Apply {
        #[command(flatten)]
        zone: ZoneArg,

        /// Redirect description (JSON or YAML)
        #[arg(long, short = 'f')]
        file: PathBuf,

        /// Show the rules that would be created without creating them
        #[arg(long)]
        dry_run: bool,
    },
}

// ── Redirects ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RedirectsArgs {
    #[command(subcommand)]
    pub command: RedirectsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RedirectsCommand {
    /// Validate a description and print the Page Rules it produces
    Convert {
        /// Redirect description (JSON or YAML)
        #[arg(long, short = 'f')]
        file: PathBuf,
    },
}

// ── DNS ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DnsArgs {
    #[command(subcommand)]
    pub command: DnsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DnsCommand {
    /// Classify live records against what the Page Rules require
    Check {
        #[command(flatten)]
        zone: ZoneArg,

        /// Fail when two rules demand different records for one hostname
        #[arg(long)]
        strict: bool,
    },

    /// Create missing records and delete conflicting ones
    Fix {
        #[command(flatten)]
        zone: ZoneArg,

        /// Remediation strategy (prompted for when omitted)
        #[arg(long, short = 's')]
        strategy: Option<StrategyArg>,

        /// Show the plan without executing it
        #[arg(long)]
        dry_run: bool,

        /// Fail when two rules demand different records for one hostname
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    /// Delete conflicting records, create missing ones
    RequiredOnly,
    /// Delete every record that is not required (including MX/TXT)
    ReplaceAll,
    /// Change nothing
    Skip,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key: api_url, api_token_env, default_zone, placeholder_address, ca_cert, timeout
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the active profile's API token in the system keyring
    SetToken,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

// ── Man ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ManArgs {
    /// Write one page per subcommand into this directory instead of
    /// printing the top-level page to stdout
    #[arg(long)]
    pub dir: Option<PathBuf>,
}
