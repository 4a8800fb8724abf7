/*!
 * Greedy best-match alignment of a recalled passage against its reference.
 *
 * Candidate tokens are processed in input order; each claims the unassigned
 * reference token it is most similar to. Inserted or omitted words only
 * affect their own position instead of shifting every later word out of
 * place.
 */

use log::debug;
use serde::{Deserialize, Serialize};

use super::normalizer::{normalize, Token};
use super::similarity::{MatchKind, SimilarityResolver, TokenSimilarity};

/// Default minimum score for accepting a typo-tolerant match
pub const DEFAULT_FUZZY_THRESHOLD: f32 = 0.8;

/// A pair of words where the user's word stood in for the reference word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    /// Word the user produced
    pub used: String,
    /// Word expected by the reference
    pub reference: String,
}

impl WordPair {
    pub fn new(used: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            used: used.into(),
            reference: reference.into(),
        }
    }
}

/// Candidate token aligned to one reference position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    /// Index into the candidate sequence
    pub candidate_index: usize,
    /// How the tokens matched
    pub kind: MatchKind,
    /// Similarity credited to this position (0.0-1.0)
    pub score: f32,
}

/// Word-level comparison of a candidate against a reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// One flag per reference token, true when aligned
    pub match_mask: Vec<bool>,
    /// Alignment per reference token
    pub alignments: Vec<Option<Alignment>>,
    /// Reference tokens left unaligned, in reference order
    pub missing_words: Vec<Token>,
    /// Candidate tokens left unaligned, in candidate order
    pub extra_words: Vec<Token>,
    /// Dictionary synonyms accepted in place of the reference word
    pub synonyms_used: Vec<WordPair>,
    /// Misspellings accepted in place of the reference word
    pub fuzzy_matches: Vec<WordPair>,
    /// Percentage score (0-100)
    pub accuracy: u8,
}

impl ComparisonResult {
    /// Number of aligned reference tokens
    pub fn matched_count(&self) -> usize {
        self.match_mask.iter().filter(|m| **m).count()
    }

    /// Number of reference tokens
    pub fn reference_len(&self) -> usize {
        self.match_mask.len()
    }

    /// Every reference word recalled exactly, nothing extra
    pub fn is_perfect(&self) -> bool {
        self.accuracy == 100 && self.missing_words.is_empty() && self.extra_words.is_empty()
    }
}

/// Scores a candidate token sequence against a reference sequence
#[derive(Debug, Clone)]
pub struct AligningScorer {
    resolver: SimilarityResolver,
    fuzzy_threshold: f32,
}

impl Default for AligningScorer {
    fn default() -> Self {
        Self::new(SimilarityResolver::default(), DEFAULT_FUZZY_THRESHOLD)
    }
}

impl AligningScorer {
    /// Create a scorer with a custom resolver and fuzzy acceptance threshold
    pub fn new(resolver: SimilarityResolver, fuzzy_threshold: f32) -> Self {
        Self {
            resolver,
            fuzzy_threshold: fuzzy_threshold.clamp(0.0, 1.0),
        }
    }

    /// Resolver in use
    pub fn resolver(&self) -> &SimilarityResolver {
        &self.resolver
    }

    /// Minimum score for typo-tolerant matches
    pub fn fuzzy_threshold(&self) -> f32 {
        self.fuzzy_threshold
    }

    /// Normalize both texts and compare them
    pub fn compare_text(&self, candidate: &str, reference: &str) -> ComparisonResult {
        self.compare(&normalize(candidate), &normalize(reference))
    }

    /// Align `candidate` against `reference`.
    ///
    /// Never fails. An empty reference scores 0 with every candidate token
    /// reported as extra.
    pub fn compare(&self, candidate: &[Token], reference: &[Token]) -> ComparisonResult {
        let similarities = self.similarity_matrix(candidate, reference);

        let mut alignments: Vec<Option<Alignment>> = vec![None; reference.len()];
        let mut extra_words = Vec::new();

        for (candidate_index, row) in similarities.iter().enumerate() {
            match self.best_unassigned(row, &alignments) {
                Some((reference_index, similarity)) => {
                    debug!(
                        "Aligned '{}' -> '{}' ({:?}, {:.2})",
                        candidate[candidate_index], reference[reference_index], similarity.kind, similarity.score
                    );
                    alignments[reference_index] = Some(Alignment {
                        candidate_index,
                        kind: similarity.kind,
                        score: similarity.score,
                    });
                }
                None => extra_words.push(candidate[candidate_index].clone()),
            }
        }

        let mut missing_words = Vec::new();
        let mut synonyms_used = Vec::new();
        let mut fuzzy_matches = Vec::new();
        let mut credited = 0.0_f64;

        for (reference_index, alignment) in alignments.iter().enumerate() {
            let expected = &reference[reference_index];
            match alignment {
                None => missing_words.push(expected.clone()),
                Some(alignment) => {
                    credited += f64::from(alignment.score);
                    let used = candidate[alignment.candidate_index].to_string();
                    match alignment.kind {
                        MatchKind::Exact => {}
                        MatchKind::Synonym => synonyms_used.push(WordPair::new(used, expected.as_str())),
                        MatchKind::Fuzzy => fuzzy_matches.push(WordPair::new(used, expected.as_str())),
                    }
                }
            }
        }

        ComparisonResult {
            match_mask: alignments.iter().map(Option::is_some).collect(),
            alignments,
            missing_words,
            extra_words,
            synonyms_used,
            fuzzy_matches,
            accuracy: accuracy_percent(credited, reference.len()),
        }
    }

    /// Similarity for every (candidate, reference) pair
    fn similarity_matrix(&self, candidate: &[Token], reference: &[Token]) -> Vec<Vec<Option<TokenSimilarity>>> {
        candidate
            .iter()
            .map(|c| {
                reference
                    .iter()
                    .map(|r| self.resolver.classify_tokens(c, r))
                    .collect()
            })
            .collect()
    }

    /// Highest-scoring acceptable unassigned reference; earliest index wins ties
    fn best_unassigned(
        &self,
        row: &[Option<TokenSimilarity>],
        alignments: &[Option<Alignment>],
    ) -> Option<(usize, TokenSimilarity)> {
        let mut best: Option<(usize, TokenSimilarity)> = None;

        for (reference_index, similarity) in row.iter().enumerate() {
            if alignments[reference_index].is_some() {
                continue;
            }
            let Some(similarity) = similarity else {
                continue;
            };
            if !self.is_acceptable(similarity) {
                continue;
            }
            match best {
                Some((_, current)) if similarity.score <= current.score => {}
                _ => best = Some((reference_index, *similarity)),
            }
        }

        best
    }

    fn is_acceptable(&self, similarity: &TokenSimilarity) -> bool {
        match similarity.kind {
            MatchKind::Exact | MatchKind::Synonym => true,
            MatchKind::Fuzzy => similarity.score >= self.fuzzy_threshold,
        }
    }
}

/// `round(100 * credited / reference_len)`, 0 for an empty reference
fn accuracy_percent(credited: f64, reference_len: usize) -> u8 {
    if reference_len == 0 {
        return 0;
    }
    let percent = (100.0 * credited / reference_len as f64).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Compare with the default scorer
pub fn compare(candidate: &[Token], reference: &[Token]) -> ComparisonResult {
    AligningScorer::default().compare(candidate, reference)
}
