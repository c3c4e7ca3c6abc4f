//! The scanner: turns circuit-definition source text into a symbol stream.
//!
//! Each call to [`Scanner::get_symbol`] yields the next classified token with
//! its 1-based line and column. The scanner skips runs of blanks, `# …` line
//! comments, and `@ … @` block comments, and keeps the position counters
//! accurate across all of them (a tab counts as 4 columns). After the end of
//! input it keeps returning `Eof` symbols.

use std::iter::Peekable;
use std::str::Chars;

use crate::names::Names;

/// Reserved words, registered with the name table in this exact order at
/// scanner construction, so their ids are the deterministic constants in
/// [`kw`] for every run.
pub const KEYWORDS: [&str; 34] = [
    "DEVICES", "CONNECT", "MONITOR", "END", "CLOCK", "SWITCH", "AND", "NAND", "OR", "NOR", "XOR",
    "DTYPE", "DATA", "CLK", "SET", "CLEAR", "Q", "QBAR", "I1", "I2", "I3", "I4", "I5", "I6", "I7",
    "I8", "I9", "I10", "I11", "I12", "I13", "I14", "I15", "I16",
];

/// Keyword ids, matching the registration order of [`KEYWORDS`].
pub mod kw {
    use crate::names::NameId;

    pub const DEVICES: NameId = 0;
    pub const CONNECT: NameId = 1;
    pub const MONITOR: NameId = 2;
    pub const END: NameId = 3;
    pub const CLOCK: NameId = 4;
    pub const SWITCH: NameId = 5;
    pub const AND: NameId = 6;
    pub const NAND: NameId = 7;
    pub const OR: NameId = 8;
    pub const NOR: NameId = 9;
    pub const XOR: NameId = 10;
    pub const DTYPE: NameId = 11;
    pub const DATA: NameId = 12;
    pub const CLK: NameId = 13;
    pub const SET: NameId = 14;
    pub const CLEAR: NameId = 15;
    pub const Q: NameId = 16;
    pub const QBAR: NameId = 17;
    /// First numbered input pin; pin `Ik` has id `I1 + (k - 1)`.
    pub const I1: NameId = 18;
    pub const I2: NameId = 19;
    pub const I3: NameId = 20;
    pub const I16: NameId = 33;
}

/// Classification of a lexical unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Comma,
    Semicolon,
    Colon,
    Arrow,
    Dot,
    Keyword,
    Number,
    Name,
    /// A character the scanner does not recognize. The parser reports it and
    /// skips it; grammar productions never see this kind.
    Invalid,
    Eof,
}

/// A classified token with its source position.
///
/// `id` holds the interned name id for `Keyword`/`Name` symbols and the
/// numeric value for `Number` symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub id: Option<usize>,
    pub line: usize,
    pub column: usize,
}

/// Single-pass, single-use character-to-symbol translator.
pub struct Scanner<'a> {
    source: &'a str,
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner over `source` and registers the keyword table with
    /// `names` so keyword ids are fixed before any user name is interned.
    pub fn new(source: &'a str, names: &mut Names) -> Self {
        for word in KEYWORDS {
            names.lookup(word);
        }
        Self {
            source,
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Translates the next run of characters into a symbol.
    pub fn get_symbol(&mut self, names: &mut Names) -> Symbol {
        self.skip_blanks_and_comments();

        let (line, column) = (self.line, self.column);
        let symbol = |kind, id| Symbol {
            kind,
            id,
            line,
            column,
        };

        match self.peek() {
            None => symbol(SymbolKind::Eof, None),
            Some(c) if c.is_ascii_alphabetic() => {
                let word = self.read_word();
                let kind = if KEYWORDS.contains(&word.as_str()) {
                    SymbolKind::Keyword
                } else {
                    SymbolKind::Name
                };
                symbol(kind, Some(names.lookup(&word)))
            }
            Some(c) if c.is_ascii_digit() => symbol(SymbolKind::Number, Some(self.read_number())),
            Some(',') => {
                self.advance();
                symbol(SymbolKind::Comma, None)
            }
            Some(';') => {
                self.advance();
                symbol(SymbolKind::Semicolon, None)
            }
            Some(':') => {
                self.advance();
                symbol(SymbolKind::Colon, None)
            }
            Some('>') => {
                self.advance();
                symbol(SymbolKind::Arrow, None)
            }
            Some('.') => {
                self.advance();
                symbol(SymbolKind::Dot, None)
            }
            Some(_) => {
                self.advance();
                symbol(SymbolKind::Invalid, None)
            }
        }
    }

    /// Returns the verbatim source line for a 1-based line number, for
    /// diagnostic excerpts. Out-of-range lines come back empty.
    pub fn line_text(&self, line: usize) -> &str {
        if line == 0 {
            return "";
        }
        self.source.lines().nth(line - 1).unwrap_or("")
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Consumes one character, keeping the line/column counters in step.
    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        match c {
            Some('\n') => {
                self.line += 1;
                self.column = 1;
            }
            Some('\t') => self.column += 4,
            Some(_) => self.column += 1,
            None => {}
        }
        c
    }

    fn skip_blanks_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('#') => {
                    // Line comment: runs to the newline, which the next
                    // iteration consumes and counts.
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('@') => {
                    // Block comment: everything up to the matching '@'. An
                    // unterminated comment swallows the rest of the input.
                    self.advance();
                    while let Some(c) = self.advance() {
                        if c == '@' {
                            break;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if !c.is_ascii_alphanumeric() {
                break;
            }
            word.push(c);
            self.advance();
        }
        word
    }

    fn read_number(&mut self) -> usize {
        let mut value: usize = 0;
        while let Some(c) = self.peek() {
            match c.to_digit(10) {
                Some(d) => {
                    value = value.saturating_mul(10).saturating_add(d as usize);
                    self.advance();
                }
                None => break,
            }
        }
        value
    }
}
