/*!
 * Tests for the recall scoring engine
 */

use std::collections::HashMap;

use verserecall::app_config::ScoringConfig;
use verserecall::recall::highlight::{render, to_markup, HighlightCategory};
use verserecall::recall::{compare, normalize, AligningScorer, SimilarityResolver, WordPair};

use crate::common::{JOHN_3_16, PSALM_23_1};

#[test]
fn test_normalize_punctuatedText_shouldLowercaseAndSplit() {
    let words: Vec<String> = normalize("The LORD, my Shepherd!").iter().map(|t| t.to_string()).collect();
    assert_eq!(words, vec!["the", "lord", "my", "shepherd"]);
}

#[test]
fn test_normalize_whitespaceOnly_shouldBeEmpty() {
    assert!(normalize(" \t\n ").is_empty());
}

#[test]
fn test_compare_emptyCandidate_shouldMissEverything() {
    let reference = normalize(PSALM_23_1);
    let result = compare(&[], &reference);

    assert_eq!(result.accuracy, 0);
    assert_eq!(result.missing_words, reference);
    assert!(result.extra_words.is_empty());
}

#[test]
fn test_compare_identicalPassages_shouldScorePerfect() {
    for passage in [PSALM_23_1, JOHN_3_16] {
        let reference = normalize(passage);
        let result = compare(&reference, &reference);

        assert_eq!(result.accuracy, 100, "passage: {}", passage);
        assert!(result.missing_words.is_empty());
        assert!(result.extra_words.is_empty());
        assert!(result.synonyms_used.is_empty());
        assert!(result.is_perfect());
    }
}

#[test]
fn test_compare_synonym_shouldCountAsMatch() {
    let result = compare(&normalize("god is good"), &normalize("lord is good"));

    assert_eq!(result.accuracy, 100);
    assert_eq!(result.synonyms_used, vec![WordPair::new("god", "lord")]);
    assert!(result.fuzzy_matches.is_empty());
}

#[test]
fn test_areEquivalent_typoBound_shouldScaleWithLength() {
    let resolver = SimilarityResolver::default();
    assert!(resolver.are_equivalent("memorize", "memorise"));
    assert!(!resolver.are_equivalent("he", "we"));
}

#[test]
fn test_compare_calledTwice_shouldReturnSameResult() {
    let candidate = normalize("for god so loved the wrld that he gave");
    let reference = normalize(JOHN_3_16);
    assert_eq!(compare(&candidate, &reference), compare(&candidate, &reference));
}

#[test]
fn test_compare_reorderedWords_shouldStillAlign() {
    let result = compare(&normalize("my shepherd the lord is"), &normalize("the lord is my shepherd"));

    assert_eq!(result.accuracy, 100);
    assert!(result.match_mask.iter().all(|m| *m));
}

#[test]
fn test_compare_insertedWord_shouldOnlyAddExtra() {
    let result = compare(&normalize("the lord truly is my shepherd"), &normalize("the lord is my shepherd"));

    assert_eq!(result.accuracy, 100);
    assert_eq!(result.extra_words, normalize("truly"));
    assert!(!result.is_perfect());
}

#[test]
fn test_compare_omittedWord_shouldKeepLaterWordsMatched() {
    let result = compare(&normalize("the lord my shepherd"), &normalize("the lord is my shepherd"));

    assert_eq!(result.accuracy, 80);
    assert_eq!(result.match_mask, vec![true, true, false, true, true]);
    assert_eq!(result.missing_words, normalize("is"));
    assert_eq!(result.matched_count() + result.missing_words.len(), result.reference_len());
}

#[test]
fn test_compare_emptyReference_shouldReportExtras() {
    let result = compare(&normalize("hello there"), &[]);

    assert_eq!(result.accuracy, 0);
    assert_eq!(result.extra_words.len(), 2);
    assert!(result.match_mask.is_empty());
}

#[test]
fn test_compare_customThreshold_shouldAcceptLooserTypos() {
    let candidate = normalize("lard");
    let reference = normalize("lord");

    let strict = AligningScorer::default().compare(&candidate, &reference);
    let lenient = AligningScorer::new(SimilarityResolver::default(), 0.7).compare(&candidate, &reference);

    assert_eq!(strict.accuracy, 0);
    assert_eq!(lenient.accuracy, 75);
}

#[test]
fn test_scoringConfig_extraSynonyms_shouldReachScorer() {
    let mut extra = HashMap::new();
    extra.insert("shepherd".to_string(), vec!["pastor".to_string()]);
    let config = ScoringConfig {
        extra_synonyms: extra,
        ..ScoringConfig::default()
    };

    let result = config
        .build_scorer()
        .compare_text("The Lord is my pastor", "The LORD is my shepherd");

    assert_eq!(result.accuracy, 100);
    assert_eq!(result.synonyms_used, vec![WordPair::new("pastor", "shepherd")]);
}

#[test]
fn test_render_typoAndExtra_shouldCategorizeEachWord() {
    let candidate = normalize("the lord is my sheperd today");
    let reference = normalize("the lord is my shepherd");
    let result = compare(&candidate, &reference);
    let highlights = render(&candidate, &reference, &result);

    let categories: Vec<HighlightCategory> = highlights.iter().map(|h| h.category).collect();
    assert_eq!(
        categories,
        vec![
            HighlightCategory::Correct,
            HighlightCategory::Correct,
            HighlightCategory::Correct,
            HighlightCategory::Correct,
            HighlightCategory::IncorrectFuzzy,
            HighlightCategory::Extra,
        ]
    );
    assert_eq!(highlights[4].token.as_str(), "sheperd");
    assert_eq!(result.accuracy, 98);
}

#[test]
fn test_toMarkup_missingWord_shouldShowReferenceWord() {
    let candidate = normalize("the lord my shepherd");
    let reference = normalize("the lord is my shepherd");
    let result = compare(&candidate, &reference);

    let markup = to_markup(&render(&candidate, &reference, &result));
    assert!(markup.contains("<span class=\"missing\">is</span>"));
    assert!(markup.starts_with("<span class=\"correct\">the</span>"));
}
