use std::path::PathBuf;

use clap::{Parser, Subcommand};
use temporal_engine::DefaultTimePolicy;

/// Resolve extracted date specs, search windows, and recurrences.
///
/// Every command reads a JSON document (a file path, or stdin when the path
/// is omitted or `-`) and prints JSON on stdout.
#[derive(Parser, Debug)]
#[command(name = "tempo", version, about)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "TEMPO_CONFIG")]
    pub config: Option<PathBuf>,

    /// IANA timezone (overrides the config file)
    #[arg(long, global = true, env = "TEMPO_TIMEZONE")]
    pub timezone: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a partial date spec into one instant
    Instant {
        /// Current time: RFC 3339 or local YYYY-MM-DDTHH:MM (default: system clock)
        #[arg(long)]
        now: Option<String>,

        /// Time of day when the date spec has none: keep, start-of-day, end-of-day
        #[arg(long)]
        policy: Option<DefaultTimePolicy>,

        /// JSON partial date spec
        input: Option<String>,
    },
    /// Resolve a search window from a reference spec and a target spec
    Window {
        /// Current time: RFC 3339 or local YYYY-MM-DDTHH:MM (default: system clock)
        #[arg(long)]
        now: Option<String>,

        /// Reference spec as inline JSON
        #[arg(long)]
        old: Option<String>,

        /// Target spec as inline JSON
        #[arg(long)]
        target: Option<String>,
    },
    /// Build provider-ready rule strings from a recurrence descriptor
    Recur {
        /// Cap on materialized occurrences
        #[arg(long)]
        max_occurrences: Option<u16>,

        /// JSON recurrence descriptor
        input: Option<String>,
    },
    /// Repeat an event window once per occurrence of a recurrence descriptor
    Windows {
        /// Start of the first window
        #[arg(long)]
        start: String,

        /// End of the first window
        #[arg(long)]
        end: String,

        /// Cap on materialized occurrences
        #[arg(long)]
        max_occurrences: Option<u16>,

        /// JSON recurrence descriptor
        input: Option<String>,
    },
    /// Resolve an event duration in minutes
    Duration {
        /// JSON duration hint
        input: Option<String>,
    },
}
