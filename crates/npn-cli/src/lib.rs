//! npn - the simple package manager for node
//!
//! Thin command surface over [`npn_core`]: argument parsing, subscriber
//! setup, and exit-code mapping live here; everything else is the engine's
//! business.
//!
//! # Exit codes
//!
//! | code | meaning                                  |
//! |------|------------------------------------------|
//! | 0    | full success                             |
//! | 1    | fatal install failure (incl. reserved commands) |
//! | 2    | no command given / usage error           |
//! | 3    | unknown command                          |
//! | 4    | download failed (non-200 archive answer) |

use clap::{Parser, Subcommand};

pub mod cmd;

/// Process exit codes; see the crate docs for the table.
pub mod exit {
    /// Full success.
    pub const SUCCESS: u8 = 0;
    /// Fatal install failure.
    pub const FAILURE: u8 = 1;
    /// No command given (or another usage error).
    pub const NO_COMMAND: u8 = 2;
    /// Unknown command.
    pub const UNKNOWN_COMMAND: u8 = 3;
    /// Archive download answered non-200.
    pub const DOWNLOAD_FAILED: u8 = 4;
}

/// Command-line interface definition.
#[derive(Debug, Parser)]
#[command(name = "npn")]
#[command(version, about = "npn - the simple package manager for node")]
#[command(
    after_help = "npn works best when packages reference urls like this:\n\
                  { \"npn\": \"gitlab:thann/npn#v0.0.1\" }"
)]
pub struct Cli {
    /// Registry base URL
    #[arg(long, env = "NPN_REGISTRY", global = true, default_value = npn_core::registry::DEFAULT_REGISTRY)]
    pub registry: String,

    /// Subcommand to run; absent means "show help and exit 2".
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install a package, or the whole project's dependencies
    #[command(visible_alias = "i")]
    Install {
        /// Package identifier (name/url); omit to install the current
        /// project's declared dependencies
        identifier: Option<String>,
    },
    /// Re-acquire a package with no pinned constraint
    Update {
        /// Package name
        name: Option<String>,
    },
    /// Remove a package (reserved)
    #[command(visible_alias = "rm")]
    Uninstall {
        /// Package name
        name: String,
    },
    /// Remove orphaned packages (reserved)
    Clean,
}
