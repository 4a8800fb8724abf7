/*!
 * Display-ready annotation of a comparison result.
 *
 * The main line follows reference order; words the user added that have no
 * place in the reference are appended at the end.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use super::normalizer::Token;
use super::scorer::ComparisonResult;
use super::similarity::MatchKind;

/// Display category of a highlighted word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HighlightCategory {
    /// Recalled exactly or through a synonym
    Correct,
    /// Recalled with a tolerated misspelling
    IncorrectFuzzy,
    /// Reference word the user left out
    Missing,
    /// Word the user added
    Extra,
}

impl HighlightCategory {
    /// Class name used in markup output
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::IncorrectFuzzy => "incorrect-fuzzy",
            Self::Missing => "missing",
            Self::Extra => "extra",
        }
    }

    /// ANSI color escape for terminal output
    fn ansi_color(&self) -> &'static str {
        match self {
            Self::Correct => "\x1B[1;32m",
            Self::IncorrectFuzzy => "\x1B[1;33m",
            Self::Missing => "\x1B[1;31;9m",
            Self::Extra => "\x1B[1;35m",
        }
    }
}

impl fmt::Display for HighlightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_class())
    }
}

/// One annotated word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    /// Word to display
    pub token: Token,
    /// How the word should be rendered
    pub category: HighlightCategory,
}

impl Highlight {
    fn new(token: Token, category: HighlightCategory) -> Self {
        Self { token, category }
    }
}

/// Annotate a comparison for display.
///
/// Aligned positions show the word the user produced; missing positions
/// show the reference word.
pub fn render(candidate: &[Token], reference: &[Token], result: &ComparisonResult) -> Vec<Highlight> {
    let mut highlights = Vec::with_capacity(reference.len() + result.extra_words.len());

    for (index, expected) in reference.iter().enumerate() {
        match result.alignments.get(index).copied().flatten() {
            Some(alignment) => {
                let shown = candidate
                    .get(alignment.candidate_index)
                    .unwrap_or(expected)
                    .clone();
                let category = match alignment.kind {
                    MatchKind::Exact | MatchKind::Synonym => HighlightCategory::Correct,
                    MatchKind::Fuzzy => HighlightCategory::IncorrectFuzzy,
                };
                highlights.push(Highlight::new(shown, category));
            }
            None => highlights.push(Highlight::new(expected.clone(), HighlightCategory::Missing)),
        }
    }

    highlights.extend(
        result
            .extra_words
            .iter()
            .map(|word| Highlight::new(word.clone(), HighlightCategory::Extra)),
    );

    highlights
}

/// Render highlights as span markup, one span per word
pub fn to_markup(highlights: &[Highlight]) -> String {
    highlights
        .iter()
        .map(|h| format!("<span class=\"{}\">{}</span>", h.category.css_class(), h.token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render highlights with ANSI colors for a terminal
pub fn to_ansi(highlights: &[Highlight]) -> String {
    highlights
        .iter()
        .map(|h| format!("{}{}\x1B[0m", h.category.ansi_color(), h.token))
        .collect::<Vec<_>>()
        .join(" ")
}
