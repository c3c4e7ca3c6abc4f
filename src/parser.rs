//! The recursive-descent parser for circuit definition files.
//!
//! The parser pulls one symbol of lookahead from the scanner, drives the
//! section grammar, and issues exactly one circuit-builder call per
//! successful production. Builder result codes are translated into the
//! diagnostic taxonomy by explicit mapping functions, so callers observe a
//! single error vocabulary no matter which collaborator raised the problem.
//!
//! On any failure inside a list production the parser emits one diagnostic
//! and runs a panic-mode resynchronization scan: it discards symbols until a
//! comma (resume the next list element), a semicolon (list over, back to the
//! top level), a top-level keyword, or end of input. One malformed element
//! therefore never hides later, independent problems.
//!
//! Grammar (one-token lookahead, no backtracking):
//!
//! ```text
//! program        := section* END
//! section        := DEVICES device (',' device)* ';'
//!                 | CONNECT connection (',' connection)* ';'
//!                 | MONITOR monitor (',' monitor)* ';'
//! device         := NAME ':' device_type [number]
//! connection     := signal '>' NAME '.' input_port
//! signal         := NAME ['.' port]       -- '.' only on DTYPE, port Q|QBAR
//! monitor        := NAME ['.' port]
//! ```

use crate::diagnostics::{Diagnostic, DiagnosticSink, ErrorKind};
use crate::names::{NameId, Names};
use crate::network::{ConnectionError, DeviceError, DeviceKind, MonitorError, Network, Signal};
use crate::scanner::{kw, Scanner, Symbol, SymbolKind};

/// Which list production the parser is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Devices,
    Connect,
    Monitor,
    None,
}

/// A detected problem and the symbol the diagnostic caret should point at.
type Fault = (ErrorKind, Symbol);

/// Single-use parser bound to one source text.
pub struct Parser<'a> {
    names: &'a mut Names,
    network: &'a mut Network,
    sink: &'a mut dyn DiagnosticSink,
    scanner: Scanner<'a>,
    symbol: Symbol,
    section: Section,
    error_count: usize,
}

impl<'a> Parser<'a> {
    pub fn new(
        source: &'a str,
        names: &'a mut Names,
        network: &'a mut Network,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        let scanner = Scanner::new(source, &mut *names);
        let mut parser = Self {
            names,
            network,
            sink,
            scanner,
            symbol: Symbol {
                kind: SymbolKind::Eof,
                id: None,
                line: 1,
                column: 1,
            },
            section: Section::None,
            error_count: 0,
        };
        parser.advance();
        parser
    }

    /// Parses the whole definition, reporting every problem found.
    /// Returns true when the input produced no diagnostics.
    pub fn parse(&mut self) -> bool {
        loop {
            match (self.symbol.kind, self.symbol.id) {
                (SymbolKind::Eof, _) => {
                    // The body ended without END.
                    let at = self.symbol.clone();
                    self.report(ErrorKind::ExpectedEnd, &at);
                    break;
                }
                (SymbolKind::Keyword, Some(kw::DEVICES)) => {
                    self.section = Section::Devices;
                    self.advance();
                    self.parse_list(Self::device);
                }
                (SymbolKind::Keyword, Some(kw::CONNECT)) => {
                    self.section = Section::Connect;
                    self.advance();
                    self.parse_list(Self::connection);
                }
                (SymbolKind::Keyword, Some(kw::MONITOR)) => {
                    self.section = Section::Monitor;
                    self.advance();
                    self.parse_list(Self::monitor);
                }
                (SymbolKind::Keyword, Some(kw::END)) => {
                    self.advance();
                    if self.symbol.kind != SymbolKind::Eof {
                        let at = self.symbol.clone();
                        self.report(ErrorKind::ExpectedEnd, &at);
                    }
                    break;
                }
                _ => {
                    let at = self.symbol.clone();
                    self.error(ErrorKind::ExpectedSection, &at);
                }
            }
        }
        self.error_count == 0
    }

    /// Number of diagnostics emitted so far. Monotonically non-decreasing.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    // ------------------------------------------------------------------
    // List driver
    // ------------------------------------------------------------------

    /// Parses a comma-separated, semicolon-terminated list of elements.
    /// Shared by all three section productions; error recovery decides
    /// whether the list continues (stopped at a comma) or is over.
    fn parse_list(&mut self, element: fn(&mut Self) -> Result<(), Fault>) {
        loop {
            match element(self) {
                Ok(()) => match self.symbol.kind {
                    SymbolKind::Comma => {
                        self.advance();
                        continue;
                    }
                    SymbolKind::Semicolon => {
                        self.advance();
                        self.section = Section::None;
                        return;
                    }
                    _ => {
                        let at = self.symbol.clone();
                        self.error(ErrorKind::ExpectedCommaOrSemicolon, &at);
                    }
                },
                Err((kind, at)) => self.error(kind, &at),
            }
            // Recovery has run. A comma inside the list resumes with the
            // next element; anything else ends the section.
            if self.section != Section::None && self.symbol.kind == SymbolKind::Comma {
                self.advance();
                continue;
            }
            return;
        }
    }

    // ------------------------------------------------------------------
    // Productions
    // ------------------------------------------------------------------

    /// device := NAME ':' device_type [number]
    fn device(&mut self) -> Result<(), Fault> {
        let (name, _) = self.expect_name()?;
        self.advance();
        if self.symbol.kind != SymbolKind::Colon {
            return Err((ErrorKind::ExpectedColon, self.symbol.clone()));
        }
        self.advance();
        let kind = match (self.symbol.kind, self.symbol.id) {
            (SymbolKind::Keyword, Some(id)) => match DeviceKind::from_keyword(id) {
                Some(kind) => kind,
                None => return Err((ErrorKind::ExpectedDeviceType, self.symbol.clone())),
            },
            _ => return Err((ErrorKind::ExpectedDeviceType, self.symbol.clone())),
        };
        self.advance();
        // The qualifier is optional here; the builder decides whether this
        // device kind requires one and whether the value is in range.
        let (qualifier, at) = if self.symbol.kind == SymbolKind::Number {
            let at = self.symbol.clone();
            let value = self.symbol.id;
            self.advance();
            (value, at)
        } else {
            (None, self.symbol.clone())
        };
        self.network
            .make_device(name, kind, qualifier)
            .map_err(|error| (map_device_error(kind, error), at))
    }

    /// connection := signal '>' NAME '.' input_port
    fn connection(&mut self) -> Result<(), Fault> {
        let (source, _) = self.signal_source()?;
        if self.symbol.kind != SymbolKind::Arrow {
            return Err((ErrorKind::ExpectedArrow, self.symbol.clone()));
        }
        self.advance();
        let (target, at) = self.signal_target()?;
        self.network
            .make_connection(source.device, source.port, target.device, target.port)
            .map_err(|error| (map_connection_error(error), at))
    }

    /// monitor := NAME ['.' port]
    ///
    /// Purely syntactic; the builder validates that the signal names an
    /// output and is not already monitored.
    fn monitor(&mut self) -> Result<(), Fault> {
        let (device, at) = self.expect_name()?;
        self.advance();
        let port = if self.symbol.kind == SymbolKind::Dot {
            self.advance();
            match (self.symbol.kind, self.symbol.id) {
                (SymbolKind::Keyword | SymbolKind::Name, Some(id)) => {
                    self.advance();
                    Some(id)
                }
                _ => return Err((ErrorKind::NotAnOutput, self.symbol.clone())),
            }
        } else {
            None
        };
        self.network
            .make_monitor(device, port)
            .map_err(|error| (map_monitor_error(error), at))
    }

    /// The output side of a connection. Needs the device kind to decide dot
    /// legality: DTYPE outputs must name Q or QBAR, every other device has a
    /// single anonymous output and takes no dot.
    fn signal_source(&mut self) -> Result<(Signal, Symbol), Fault> {
        let (device, at) = self.expect_name()?;
        let Some(record) = self.network.get_device(device) else {
            return Err((ErrorKind::DeviceAbsent, at));
        };
        let kind = record.kind;
        self.advance();
        if kind == DeviceKind::Dtype {
            if self.symbol.kind != SymbolKind::Dot {
                return Err((ErrorKind::ExpectedDot, self.symbol.clone()));
            }
            self.advance();
            let port = match (self.symbol.kind, self.symbol.id) {
                (SymbolKind::Keyword, Some(id)) if id == kw::Q || id == kw::QBAR => id,
                _ => return Err((ErrorKind::InvalidDtypePort, self.symbol.clone())),
            };
            self.advance();
            Ok((
                Signal {
                    device,
                    port: Some(port),
                },
                at,
            ))
        } else {
            if self.symbol.kind == SymbolKind::Dot {
                return Err((ErrorKind::UnexpectedDot, self.symbol.clone()));
            }
            Ok((Signal { device, port: None }, at))
        }
    }

    /// The input side of a connection: a named input pin of a device that
    /// can accept one. SWITCH and CLOCK have no inputs at all and are
    /// rejected up front with their own diagnostic.
    fn signal_target(&mut self) -> Result<(Signal, Symbol), Fault> {
        let (device, at) = self.expect_name()?;
        let Some(record) = self.network.get_device(device) else {
            return Err((ErrorKind::DeviceAbsent, at));
        };
        let kind = record.kind;
        if matches!(kind, DeviceKind::Switch | DeviceKind::Clock) {
            return Err((ErrorKind::ConnectionToSwitchOrClock, at));
        }
        self.advance();
        if self.symbol.kind != SymbolKind::Dot {
            return Err((ErrorKind::ExpectedDot, self.symbol.clone()));
        }
        self.advance();
        let port_symbol = self.symbol.clone();
        let port = match (port_symbol.kind, port_symbol.id) {
            (SymbolKind::Keyword | SymbolKind::Name, Some(id)) => id,
            _ => return Err((ErrorKind::PortAbsent, port_symbol)),
        };
        let known = self
            .network
            .get_device(device)
            .is_some_and(|record| record.has_input(port));
        if !known {
            return Err((self.classify_bad_input_port(kind, port), port_symbol));
        }
        self.advance();
        Ok((
            Signal {
                device,
                port: Some(port),
            },
            at,
        ))
    }

    /// Explains why `port` is not an input pin of a device of `kind`.
    fn classify_bad_input_port(&self, kind: DeviceKind, port: NameId) -> ErrorKind {
        match kind {
            DeviceKind::Dtype => ErrorKind::InvalidDtypePort,
            DeviceKind::Xor => ErrorKind::InvalidXorPort,
            _ => {
                let is_numbered = self
                    .names
                    .get_string(port)
                    .is_some_and(|name| name.starts_with('I'));
                if is_numbered {
                    ErrorKind::PortOutOfRange
                } else {
                    ErrorKind::NotAnInputPort
                }
            }
        }
    }

    /// Checks that the lookahead is a user-defined name, without consuming.
    fn expect_name(&mut self) -> Result<(NameId, Symbol), Fault> {
        match (self.symbol.kind, self.symbol.id) {
            (SymbolKind::Name, Some(id)) => Ok((id, self.symbol.clone())),
            _ => Err((ErrorKind::InvalidName, self.symbol.clone())),
        }
    }

    // ------------------------------------------------------------------
    // Diagnostics and recovery
    // ------------------------------------------------------------------

    /// Loads the next symbol, surfacing unrecognized characters as
    /// diagnostics and skipping them. Productions never see `Invalid`.
    fn advance(&mut self) {
        loop {
            let symbol = self.scanner.get_symbol(self.names);
            if symbol.kind == SymbolKind::Invalid {
                self.report(ErrorKind::UnrecognizedCharacter, &symbol);
                continue;
            }
            self.symbol = symbol;
            return;
        }
    }

    /// Emits one diagnostic block and counts it. No recovery.
    fn report(&mut self, kind: ErrorKind, at: &Symbol) {
        self.error_count += 1;
        let diagnostic = Diagnostic {
            kind,
            line: at.line,
            column: at.column,
            excerpt: self.scanner.line_text(at.line).to_string(),
        };
        self.sink.emit(&diagnostic);
    }

    /// Emits one diagnostic and resynchronizes.
    fn error(&mut self, kind: ErrorKind, at: &Symbol) {
        self.report(kind, at);
        let missing_delimiter = matches!(
            kind,
            ErrorKind::ExpectedCommaOrSemicolon | ErrorKind::ExpectedSemicolon
        );
        self.recover(missing_delimiter);
    }

    /// Panic-mode resynchronization. Inspects the current symbol first, then
    /// discards until a stop symbol:
    ///
    /// - comma, while inside a list: return, lookahead on the comma, so the
    ///   list driver resumes with the next element;
    /// - semicolon: consume it, the list terminated normally;
    /// - top-level keyword: abort the section; when that cuts a list short
    ///   and the triggering error was not already about the missing
    ///   delimiter, add one "Expected a semicolon" diagnostic;
    /// - end of input: stop, the top level reports the missing END once.
    ///
    /// Every step either consumes a symbol or returns, so recovery always
    /// terminates.
    fn recover(&mut self, missing_delimiter: bool) {
        let in_list = self.section != Section::None;
        loop {
            match (self.symbol.kind, self.symbol.id) {
                (SymbolKind::Eof, _) => {
                    self.section = Section::None;
                    return;
                }
                (SymbolKind::Comma, _) if in_list => return,
                (SymbolKind::Semicolon, _) => {
                    self.advance();
                    self.section = Section::None;
                    return;
                }
                (SymbolKind::Keyword, Some(id)) if is_section_keyword(id) => {
                    self.section = Section::None;
                    if in_list && !missing_delimiter {
                        let at = self.symbol.clone();
                        self.report(ErrorKind::ExpectedSemicolon, &at);
                    }
                    return;
                }
                _ => self.advance(),
            }
        }
    }
}

fn is_section_keyword(id: NameId) -> bool {
    matches!(id, kw::DEVICES | kw::CONNECT | kw::MONITOR | kw::END)
}

/// Maps a builder device result onto a type-specific diagnostic.
fn map_device_error(kind: DeviceKind, error: DeviceError) -> ErrorKind {
    match (kind, error) {
        (DeviceKind::Switch, DeviceError::MissingQualifier)
        | (DeviceKind::Switch, DeviceError::InvalidQualifier) => ErrorKind::NotBit,
        (DeviceKind::Clock, DeviceError::InvalidQualifier) => ErrorKind::ClockPeriodZero,
        (_, DeviceError::MissingQualifier) => ErrorKind::ExpectedNumber,
        (_, DeviceError::InvalidQualifier) => ErrorKind::QualifierOutOfRange,
        (_, DeviceError::UnexpectedQualifier) => ErrorKind::UnexpectedQualifier,
    }
}

fn map_connection_error(error: ConnectionError) -> ErrorKind {
    match error {
        ConnectionError::DeviceAbsent => ErrorKind::DeviceAbsent,
        ConnectionError::InputAlreadyConnected => ErrorKind::InputAlreadyConnected,
        ConnectionError::InputToInput => ErrorKind::InputToInput,
        ConnectionError::PortAbsent => ErrorKind::PortAbsent,
        ConnectionError::OutputToOutput => ErrorKind::OutputToOutput,
    }
}

fn map_monitor_error(error: MonitorError) -> ErrorKind {
    match error {
        MonitorError::DeviceAbsent => ErrorKind::DeviceAbsent,
        MonitorError::NotAnOutput => ErrorKind::NotAnOutput,
        MonitorError::AlreadyMonitored => ErrorKind::AlreadyMonitored,
    }
}

/// Parses `source` into `network`, streaming diagnostics into `sink`.
/// Returns true when the definition is clean.
pub fn parse_definition(
    source: &str,
    names: &mut Names,
    network: &mut Network,
    sink: &mut dyn DiagnosticSink,
) -> bool {
    Parser::new(source, names, network, sink).parse()
}
