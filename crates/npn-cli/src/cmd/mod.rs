//! Subcommand implementations.

pub mod clean;
pub mod install;
pub mod remove;
pub mod update;
