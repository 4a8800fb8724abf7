/*!
 * Token equivalence for recall scoring.
 *
 * Two tokens are equivalent when they are identical, share an entry in the
 * synonym dictionary, or differ by a small number of edits. The allowed
 * edit distance scales with word length so short words need near-exact
 * matches.
 */

use serde::{Deserialize, Serialize};

use super::normalizer::Token;
use super::synonyms::SynonymTable;

/// Upper bound on tolerated typos regardless of word length
const MAX_TYPO_EDITS: usize = 2;

/// How a candidate token matched a reference token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Identical tokens
    Exact,
    /// Different tokens sharing a synonym entry
    Synonym,
    /// Different tokens within the typo bound
    Fuzzy,
}

/// Similarity of one token pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenSimilarity {
    /// Kind of equivalence
    pub kind: MatchKind,
    /// Graded score (0.0-1.0); exact and synonym matches score 1.0
    pub score: f32,
}

/// Decides whether two tokens should be treated as the same word
#[derive(Debug, Clone)]
pub struct SimilarityResolver {
    synonyms: SynonymTable,
}

impl Default for SimilarityResolver {
    fn default() -> Self {
        Self::new(SynonymTable::with_defaults())
    }
}

impl SimilarityResolver {
    /// Create a resolver over the given synonym table
    pub fn new(synonyms: SynonymTable) -> Self {
        Self { synonyms }
    }

    /// Synonym table in use
    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    /// Check whether `a` and `b` are equivalent.
    ///
    /// The typo bound is taken from the length of `a`.
    pub fn are_equivalent(&self, a: &str, b: &str) -> bool {
        self.classify(a, b).is_some()
    }

    /// Classify a token pair, or `None` when the tokens are unrelated
    pub fn classify(&self, a: &str, b: &str) -> Option<TokenSimilarity> {
        if a == b {
            return Some(TokenSimilarity { kind: MatchKind::Exact, score: 1.0 });
        }

        if self.synonyms.are_synonyms(a, b) {
            return Some(TokenSimilarity { kind: MatchKind::Synonym, score: 1.0 });
        }

        let distance = levenshtein_distance(a, b);
        if distance <= typo_bound(a) {
            return Some(TokenSimilarity {
                kind: MatchKind::Fuzzy,
                score: similarity_score(a, b, distance),
            });
        }

        None
    }

    /// Convenience wrapper over [`Self::classify`] for tokens
    pub fn classify_tokens(&self, candidate: &Token, reference: &Token) -> Option<TokenSimilarity> {
        self.classify(candidate.as_str(), reference.as_str())
    }
}

/// Maximum tolerated edits for a word: `min(2, floor(len / 3))`
pub fn typo_bound(word: &str) -> usize {
    MAX_TYPO_EDITS.min(word.chars().count() / 3)
}

/// Normalized similarity from an edit distance
fn similarity_score(a: &str, b: &str, distance: usize) -> f32 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (distance as f32 / max_len as f32)
}

/// Calculate Levenshtein distance between two strings
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr_row[0] = i;

        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };

            curr_row[j] = (prev_row[j] + 1)                  // deletion
                .min(curr_row[j - 1] + 1)                    // insertion
                .min(prev_row[j - 1] + cost);                // substitution
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}
