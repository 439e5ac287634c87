//! Command-line frontend for the check-in tracker.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{ActivityAction, Cli, Commands};
pub use config::Config;
