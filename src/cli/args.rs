//! Defines the command-line arguments and subcommands for the gatenet CLI.
//!
//! Uses the `clap` crate with its "derive" feature for a declarative,
//! type-safe argument structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "gatenet",
    version,
    about = "Check circuit definition files and build their network model."
)]
pub struct GatenetArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a definition file, report every problem, and summarize.
    Check {
        /// The path to the circuit definition file.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Dump the symbol stream the scanner produces for a file.
    Tokens {
        /// The path to the circuit definition file.
        #[arg(required = true)]
        file: PathBuf,
    },
}
