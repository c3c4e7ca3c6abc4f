//! Handles all user-facing output for the CLI.
//!
//! Centralizes diagnostic printing, the end-of-run summary, and the token
//! dump so every command presents results the same way.

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::names::Names;
use crate::network::Network;
use crate::scanner::{Symbol, SymbolKind};

/// Prints diagnostics to stderr as the parser emits them, with the message
/// line highlighted.
pub struct ConsoleSink {
    stream: StandardStream,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            stream: StandardStream::stderr(ColorChoice::Auto),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticSink for ConsoleSink {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        let rendered = diagnostic.to_string();
        let mut lines = rendered.lines();
        if let Some(first) = lines.next() {
            let _ = self
                .stream
                .set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
            let _ = writeln!(self.stream, "{}", first);
            let _ = self.stream.reset();
        }
        for line in lines {
            let _ = writeln!(self.stream, "{}", line);
        }
        let _ = writeln!(self.stream);
    }
}

/// Prints the end-of-run summary for `check`.
pub fn print_summary(ok: bool, error_count: usize, network: &Network) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    if ok {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
        let _ = writeln!(
            stdout,
            "Parsed OK: {} devices, {} connections, {} monitors",
            network.devices().len(),
            network.connections().len(),
            network.monitors().len()
        );
    } else {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
        let _ = writeln!(
            stdout,
            "{} error{} found",
            error_count,
            if error_count == 1 { "" } else { "s" }
        );
    }
    let _ = stdout.reset();
}

/// Prints one scanner symbol for the `tokens` command.
pub fn print_symbol(symbol: &Symbol, names: &Names) {
    let text = match (symbol.kind, symbol.id) {
        (SymbolKind::Keyword, Some(id)) | (SymbolKind::Name, Some(id)) => {
            names.get_string(id).unwrap_or("").to_string()
        }
        (SymbolKind::Number, Some(value)) => value.to_string(),
        _ => String::new(),
    };
    println!(
        "{}:{}\t{:?}\t{}",
        symbol.line, symbol.column, symbol.kind, text
    );
}
