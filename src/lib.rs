//! gatenet: a definition-language front end for digital logic circuits.
//!
//! The crate reads a small textual description of a circuit (devices, their
//! wiring, and which signals to observe), builds an in-memory circuit model,
//! and reports every defect in the description with precise source
//! locations. Parsing is single-pass and batch-reporting: one malformed
//! clause never hides later, independent problems.

pub use crate::diagnostics::{Diagnostic, DiagnosticBuffer, DiagnosticSink, ErrorKind};
pub use crate::names::{NameId, Names};
pub use crate::network::{Connection, Device, DeviceKind, Network, Signal};
pub use crate::parser::{parse_definition, Parser};
pub use crate::scanner::{Scanner, Symbol, SymbolKind};

pub mod cli;
pub mod diagnostics;
pub mod names;
pub mod network;
pub mod parser;
pub mod scanner;
