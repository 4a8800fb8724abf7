/*!
 * Text normalization for recall scoring.
 *
 * Turns free text (typed or transcribed) into an ordered sequence of
 * lowercase, punctuation-free word tokens.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Anything that is neither a word character nor whitespace
static NON_WORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\w\s]").expect("Invalid non-word regex")
});

/// A normalized word unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Wrap an already-normalized word.
    ///
    /// No normalization is applied; use [`normalize`] for raw text.
    pub fn new(word: impl Into<String>) -> Self {
        Self(word.into())
    }

    /// Borrow the token text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters in the token
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl Deref for Token {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Token {
    fn from(word: &str) -> Self {
        Self(word.to_string())
    }
}

impl From<String> for Token {
    fn from(word: String) -> Self {
        Self(word)
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<str> for Token {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Normalize text into a single space-separated string.
///
/// Lowercases, drops characters outside the word/space classes, collapses
/// whitespace runs and trims.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD_PATTERN.replace_all(&lowered, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize text into word tokens.
///
/// Empty or whitespace-only input yields an empty sequence.
pub fn normalize(text: &str) -> Vec<Token> {
    normalize_text(text)
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(Token::from)
        .collect()
}

/// Build tokens from words that are already normalized
pub fn tokens<S: AsRef<str>>(words: &[S]) -> Vec<Token> {
    words.iter().map(|w| Token::new(w.as_ref())).collect()
}
