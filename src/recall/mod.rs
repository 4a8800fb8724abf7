/*!
 * Recall scoring engine.
 *
 * Compares what a user typed or said against the canonical text of a
 * passage, word by word:
 * - `normalizer`: lowercase, punctuation-free word tokens
 * - `synonyms`: static dictionary of interchangeable words
 * - `similarity`: exact / synonym / typo-tolerant token equivalence
 * - `scorer`: greedy best-match alignment and accuracy
 * - `highlight`: display-ready annotation of a comparison
 *
 * Everything here is synchronous, side-effect free and total.
 */

pub mod normalizer;
pub mod synonyms;
pub mod similarity;
pub mod scorer;
pub mod highlight;

pub use normalizer::{normalize, normalize_text, Token};
pub use synonyms::SynonymTable;
pub use similarity::{levenshtein_distance, MatchKind, SimilarityResolver};
pub use scorer::{compare, AligningScorer, Alignment, ComparisonResult, WordPair};
pub use highlight::{render, Highlight, HighlightCategory};
