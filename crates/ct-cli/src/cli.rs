//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Attendance tracker for a roster of people at an activity.
///
/// Records check-in/check-out toggles per person and persists the
/// roster to a single database file.
#[derive(Debug, Parser)]
#[command(name = "ct", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Register a new person on the roster.
    Add {
        /// First name.
        first: String,

        /// Last name.
        last: String,

        /// Register under a fixed id (e.g., a hardware card id)
        /// instead of a generated one.
        #[arg(long)]
        id: Option<u64>,
    },

    /// Look up a person's id by name (case-insensitive).
    Find {
        /// First name.
        first: String,

        /// Last name.
        last: String,
    },

    /// Toggle a person between checked in and checked out.
    Toggle {
        /// The person's id.
        id: u64,
    },

    /// Manage the current activity.
    Activity {
        #[command(subcommand)]
        action: ActivityAction,
    },

    /// Show the last event for every person on the roster.
    Status,

    /// List the roster sorted by name, with full event histories.
    Roster {
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Check out everyone still checked in.
    CheckoutAll,

    /// Write the database file into a directory.
    Dump {
        /// Target directory; defaults to the configured data directory.
        dir: Option<PathBuf>,
    },

    /// Merge a database file from a directory into the roster.
    Load {
        /// Source directory; defaults to the configured data directory.
        dir: Option<PathBuf>,
    },

    /// Export the full event history as CSV.
    ///
    /// The target must already exist as a file.
    ExportCsv {
        /// Target CSV file.
        path: PathBuf,
    },
}

/// Actions on the current activity.
#[derive(Debug, Subcommand)]
pub enum ActivityAction {
    /// Set the current activity.
    Set {
        /// Activity name.
        name: String,

        /// Start time, RFC 3339 (e.g., 2026-08-30T18:00:00Z).
        #[arg(long)]
        start: String,

        /// End time, RFC 3339.
        #[arg(long)]
        end: String,
    },

    /// Show the current activity.
    Show,

    /// Clear the current activity.
    Clear,
}
