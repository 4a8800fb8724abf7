/*!
 * Static synonym dictionary.
 *
 * Maps a canonical key to a set of interchangeable terms. Two words are
 * synonyms when both appear in the same entry, either as the key or as a
 * member.
 */

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Default devotional vocabulary
const DEFAULT_ENTRIES: &[(&str, &[&str])] = &[
    ("lord", &["god", "master", "sovereign"]),
    ("father", &["dad", "creator"]),
    ("jesus", &["christ", "messiah", "savior", "saviour"]),
    ("holy spirit", &["spirit", "comforter", "helper"]),
    ("mankind", &["man", "humanity", "humankind"]),
];

/// Synonym dictionary keyed by canonical term
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymTable {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl SynonymTable {
    /// Create an empty table
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create the table with the built-in devotional vocabulary
    pub fn with_defaults() -> Self {
        let mut table = Self::empty();
        for (key, members) in DEFAULT_ENTRIES {
            table.add_entry(key, members.iter().copied());
        }
        table
    }

    /// Add an entry, extending the member set when the key already exists
    pub fn add_entry<I, S>(&mut self, key: &str, members: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = self.entries.entry(key.trim().to_lowercase()).or_default();
        for member in members {
            let member = member.as_ref().trim().to_lowercase();
            if !member.is_empty() {
                set.insert(member);
            }
        }
    }

    /// Merge entries from a key → members map
    pub fn extend_from(&mut self, extra: &HashMap<String, Vec<String>>) {
        for (key, members) in extra {
            self.add_entry(key, members);
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check whether two distinct words share an entry.
    ///
    /// Symmetric: `are_synonyms(a, b) == are_synonyms(b, a)`.
    pub fn are_synonyms(&self, a: &str, b: &str) -> bool {
        if a == b {
            return false;
        }

        self.entries.iter().any(|(key, members)| {
            let has_a = key == a || members.contains(a);
            let has_b = key == b || members.contains(b);
            has_a && has_b
        })
    }

    /// Canonical keys of every entry containing the word
    pub fn keys_for(&self, word: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(key, members)| key.as_str() == word || members.contains(word))
            .map(|(key, _)| key.as_str())
            .collect()
    }
}
