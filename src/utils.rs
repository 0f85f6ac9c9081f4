//! Utilities that are used across the `rnaqc` subcommands.

pub mod args;
pub mod formats;
pub mod output;
pub mod progress;
