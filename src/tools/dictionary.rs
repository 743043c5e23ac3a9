//! Travel term dictionary.

use std::collections::HashMap;

/// Returned when a word has no entry.
pub const DEFINITION_NOT_FOUND: &str = "Definition not found.";

const BUILTIN_DEFINITIONS: [(&str, &str); 5] = [
    ("visa", "An official document allowing entry into a foreign country."),
    ("passport", "A government-issued document for international travel."),
    ("embassy", "An official office representing a country abroad."),
    ("layover", "A short stay between connecting flights."),
    ("customs", "Authorities controlling goods entering a country."),
];

/// Fixed lookup table of travel-related terms.
#[derive(Debug, Clone)]
pub struct Dictionary {
    definitions: HashMap<String, String>,
}

impl Dictionary {
    /// Dictionary with the built-in terms only.
    pub fn new() -> Self {
        Self {
            definitions: BUILTIN_DEFINITIONS
                .iter()
                .map(|(word, definition)| (word.to_string(), definition.to_string()))
                .collect(),
        }
    }

    /// Add or replace entries. Keys are normalized to lowercase.
    pub fn with_entries(mut self, entries: &HashMap<String, String>) -> Self {
        for (word, definition) in entries {
            self.definitions
                .insert(normalize(word), definition.clone());
        }
        self
    }

    /// Look up a word, case-insensitively.
    pub fn lookup(&self, word: &str) -> String {
        self.definitions
            .get(&normalize(word))
            .cloned()
            .unwrap_or_else(|| DEFINITION_NOT_FOUND.to_string())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}
