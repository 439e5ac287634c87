//! Subcommand implementations.

pub mod activity;
pub mod add;
pub mod checkout;
pub mod export;
pub mod find;
pub mod persist;
pub mod roster;
pub mod status;
pub mod toggle;
pub mod util;
