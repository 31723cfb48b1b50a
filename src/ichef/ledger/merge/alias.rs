use std::collections::HashMap;

use crate::ichef::ledger::schema::DEFAULT_ALIASES;

/// Symmetric column alias table.
///
/// Every pair is stored in both directions when it is registered, so a lookup
/// is a single map access regardless of which export version a name came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasMap {
    entries: HashMap<String, String>,
}

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias table covering the known POS export renames.
    pub fn pos_defaults() -> Self {
        let mut aliases = Self::new();
        for (left, right) in DEFAULT_ALIASES {
            aliases.insert(left, right);
        }
        aliases
    }

    /// Registers `left` and `right` as names for the same column.
    pub fn insert(&mut self, left: &str, right: &str) {
        let left = left.trim();
        let right = right.trim();
        if left.is_empty() || right.is_empty() || left == right {
            return;
        }
        self.entries.insert(left.to_string(), right.to_string());
        self.entries.insert(right.to_string(), left.to_string());
    }

    pub fn extend<'a, I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (left, right) in pairs {
            self.insert(left, right);
        }
    }

    /// Alternate name for `column`, if any.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries.get(column.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
