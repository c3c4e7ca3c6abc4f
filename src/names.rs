//! The name table: maps identifier strings to stable integer ids.
//!
//! Every user-defined name and reserved keyword in a circuit definition is
//! interned here exactly once. Ids are handed out in first-seen order and
//! stay stable for the lifetime of the table, so the scanner's keyword ids
//! are deterministic across runs.

use std::collections::HashMap;

/// A stable integer id for an interned name string.
pub type NameId = usize;

/// Bidirectional string⇄id table with first-seen insertion order.
#[derive(Debug, Default)]
pub struct Names {
    ids: HashMap<String, NameId>,
    strings: Vec<String>,
}

impl Names {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `name`, interning it if it is not present yet.
    /// Repeated lookups of the same string return the same id.
    pub fn lookup(&mut self, name: &str) -> NameId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.strings.len();
        self.strings.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    /// Returns the id for `name` without interning, or `None` if absent.
    pub fn query(&self, name: &str) -> Option<NameId> {
        self.ids.get(name).copied()
    }

    /// Returns the string for `id`, or `None` if the id was never issued.
    pub fn get_string(&self, id: NameId) -> Option<&str> {
        self.strings.get(id).map(String::as_str)
    }

    /// Number of interned names.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_interns_in_first_seen_order() {
        let mut names = Names::new();
        assert_eq!(names.lookup("SW1"), 0);
        assert_eq!(names.lookup("G1"), 1);
        assert_eq!(names.lookup("SW1"), 0);
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn query_does_not_intern() {
        let mut names = Names::new();
        assert_eq!(names.query("missing"), None);
        let id = names.lookup("present");
        assert_eq!(names.query("present"), Some(id));
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn get_string_round_trips() {
        let mut names = Names::new();
        let id = names.lookup("CLK1");
        assert_eq!(names.get_string(id), Some("CLK1"));
        assert_eq!(names.get_string(id + 1), None);
    }
}
