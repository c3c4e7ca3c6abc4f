//! The gatenet command-line interface.
//!
//! This module is the entry point for all CLI commands and orchestrates the
//! core library functions.

use std::path::Path;
use std::{fs, process};

use clap::Parser as ClapParser;

use crate::cli::args::{Command, GatenetArgs};
use crate::cli::output::ConsoleSink;
use crate::names::Names;
use crate::network::Network;
use crate::parser::Parser;
use crate::scanner::{Scanner, SymbolKind};

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = GatenetArgs::parse();

    let result = match args.command {
        Command::Check { file } => handle_check(&file),
        Command::Tokens { file } => handle_tokens(&file),
    };

    match result {
        Ok(status) => process::exit(status),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    }
}

/// Handles the `check` subcommand: parse, report, summarize.
fn handle_check(path: &Path) -> Result<i32, Box<dyn std::error::Error>> {
    let source = fs::read_to_string(path)?;

    let mut names = Names::new();
    let mut network = Network::new();
    let mut sink = ConsoleSink::new();
    let mut parser = Parser::new(&source, &mut names, &mut network, &mut sink);
    let ok = parser.parse();
    let error_count = parser.error_count();
    drop(parser);

    output::print_summary(ok, error_count, &network);
    Ok(if ok { 0 } else { 1 })
}

/// Handles the `tokens` subcommand: dump the raw symbol stream.
fn handle_tokens(path: &Path) -> Result<i32, Box<dyn std::error::Error>> {
    let source = fs::read_to_string(path)?;

    let mut names = Names::new();
    let mut scanner = Scanner::new(&source, &mut names);
    loop {
        let symbol = scanner.get_symbol(&mut names);
        output::print_symbol(&symbol, &names);
        if symbol.kind == SymbolKind::Eof {
            return Ok(0);
        }
    }
}
