//! The diagnostic taxonomy and reporting channel.
//!
//! Every problem the parser can detect, syntactic or semantic, is one
//! variant of [`ErrorKind`] with a fixed human message. A [`Diagnostic`]
//! pairs a kind with its source position and the verbatim source line;
//! rendering prints the message, the line number, the excerpt, and a caret
//! aligned under the offending column. Diagnostics flow through a
//! [`DiagnosticSink`], so the CLI can print them as they happen while tests
//! capture them in a buffer.

use std::fmt;

use thiserror::Error;

/// Every diagnostic the parser can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    // Syntactic.
    #[error("Expected a comma or semicolon")]
    ExpectedCommaOrSemicolon,
    #[error("Expected a semicolon")]
    ExpectedSemicolon,
    #[error("Expected a colon")]
    ExpectedColon,
    #[error("Expected an arrow")]
    ExpectedArrow,
    #[error("Expected a dot")]
    ExpectedDot,
    #[error("Did not expect a dot")]
    UnexpectedDot,
    #[error("Expected a device type")]
    ExpectedDeviceType,
    #[error("Expected a number")]
    ExpectedNumber,
    #[error("Invalid device name")]
    InvalidName,
    #[error("Expected DEVICES, CONNECT, MONITOR or END")]
    ExpectedSection,
    #[error("Expected 'END' keyword")]
    ExpectedEnd,
    #[error("Unrecognized character")]
    UnrecognizedCharacter,

    // Device qualifiers.
    #[error("Expected a bit (0 or 1)")]
    NotBit,
    #[error("Did not expect a parameter")]
    UnexpectedQualifier,
    #[error("Expected a number between 1 and 16 inclusive")]
    QualifierOutOfRange,
    #[error("Clock period must be non-zero")]
    ClockPeriodZero,

    // Connection semantics.
    #[error("Device has not been declared")]
    DeviceAbsent,
    #[error("Input is already connected")]
    InputAlreadyConnected,
    #[error("Cannot connect an input to an input")]
    InputToInput,
    #[error("Cannot connect an output to an output")]
    OutputToOutput,
    #[error("Port does not exist on this device")]
    PortAbsent,
    #[error("Invalid port for a DTYPE device")]
    InvalidDtypePort,
    #[error("Invalid port for an XOR device")]
    InvalidXorPort,
    #[error("Port is not an input port")]
    NotAnInputPort,
    #[error("Port number is out of range")]
    PortOutOfRange,
    #[error("Connection should not be made to SWITCH or CLOCK")]
    ConnectionToSwitchOrClock,

    // Monitor semantics.
    #[error("Signal is not an output")]
    NotAnOutput,
    #[error("Signal cannot be monitored twice")]
    AlreadyMonitored,
}

/// One reported problem: what went wrong and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    /// 1-based source line.
    pub line: usize,
    /// 1-based column, with tabs counted as 4 columns.
    pub column: usize,
    /// The verbatim source line the position refers to.
    pub excerpt: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Error on line {}: {}", self.line, self.kind)?;
        writeln!(f, "    {}", self.excerpt)?;
        write!(f, "    {}^", " ".repeat(self.column.saturating_sub(1)))
    }
}

/// Receives diagnostics as the parser emits them.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: &Diagnostic);
}

/// Collects diagnostics into a vector, for tests and programmatic callers.
#[derive(Debug, Default)]
pub struct DiagnosticBuffer {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.diagnostics.iter().map(|d| d.kind).collect()
    }
}

impl DiagnosticSink for DiagnosticBuffer {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }
}
