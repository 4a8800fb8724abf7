/*!
 * Tests for practice evaluation and attempt history
 */

use chrono::Duration;

use verserecall::errors::StoreError;
use verserecall::practice::{PracticeRecorder, PracticeStats, DEFAULT_PASS_THRESHOLD};
use verserecall::recall::AligningScorer;
use verserecall::store::{AttemptStore, MemoryStore, MockStore};

use crate::common::{fixed_now, JOHN_3_16, PSALM_23_1};

fn recorder<S: AttemptStore>(store: S) -> PracticeRecorder<S> {
    PracticeRecorder::new(AligningScorer::default(), DEFAULT_PASS_THRESHOLD, store)
}

#[test]
fn test_evaluate_perfectRecall_shouldPraise() {
    let outcome = recorder(MemoryStore::new()).evaluate("the lord is my shepherd i shall not want", PSALM_23_1);

    assert!(outcome.passed);
    assert_eq!(outcome.feedback, "Great job! The verse matches perfectly!");
}

#[test]
fn test_evaluate_belowThreshold_shouldReportAccuracy() {
    let outcome = recorder(MemoryStore::new()).evaluate("for god so loved the world", JOHN_3_16);

    assert!(!outcome.passed);
    assert!(outcome.feedback.starts_with("Accuracy: "));
    assert!(outcome.mistakes.iter().all(|m| m.starts_with("missing ")));
}

#[test]
fn test_evaluate_customPassThreshold_shouldApply() {
    let lenient = PracticeRecorder::new(AligningScorer::default(), 50, MemoryStore::new());
    let outcome = lenient.evaluate("the lord is my", "the lord is my shepherd i shall not want");

    assert_eq!(outcome.comparison.accuracy, 44);
    assert!(!outcome.passed);

    let outcome = lenient.evaluate("the lord is my shepherd", "the lord is my shepherd i shall not want");
    assert_eq!(outcome.comparison.accuracy, 56);
    assert!(outcome.passed);
}

#[test]
fn test_recordAttempt_shouldKeepMistakesAndSpeechFlag() {
    let store = MemoryStore::new();
    let recorder = recorder(store.clone());

    tokio_test::block_on(async {
        let (outcome, attempt) = recorder
            .practice("u1", "ps23", "the lord is my sheperd", "the lord is my shepherd", true, fixed_now())
            .await
            .unwrap();

        assert_eq!(attempt.score, outcome.comparison.accuracy);
        assert!(attempt.used_speech_input);
        assert_eq!(attempt.mistakes, vec!["\"sheperd\" should be \"shepherd\"".to_string()]);

        let stored = store.query_attempts("u1", Some("ps23")).await.unwrap();
        assert_eq!(stored, vec![attempt]);
    });
}

#[tokio::test]
async fn test_recordAttempt_failingStore_shouldSurfaceWriteError() {
    let recorder = recorder(MockStore::failing());
    let outcome = recorder.evaluate("anything", PSALM_23_1);

    let result = recorder
        .record_attempt("u1", "ps23", "anything", &outcome, false, fixed_now())
        .await;

    assert!(matches!(result, Err(StoreError::WriteFailed(_))));
}

#[tokio::test]
async fn test_practiceStats_noAttempts_shouldBeEmpty() {
    let stats = recorder(MemoryStore::new()).practice_stats("u1", "ps23").await.unwrap();
    assert_eq!(stats, PracticeStats::default());
    assert_eq!(stats.pass_rate(), 0.0);
}

#[tokio::test]
async fn test_practiceStats_shouldUseLatestAttemptAsLast() {
    let recorder = recorder(MemoryStore::new());
    let now = fixed_now();

    recorder
        .practice("u1", "ps23", "the lord is my shepherd", "the lord is my shepherd", false, now)
        .await
        .unwrap();
    recorder
        .practice("u1", "ps23", "the lord", "the lord is my shepherd", false, now + Duration::hours(2))
        .await
        .unwrap();

    let stats = recorder.practice_stats("u1", "ps23").await.unwrap();
    assert_eq!(stats.attempts, 2);
    assert_eq!(stats.passed, 1);
    assert_eq!(stats.best_score, Some(100));
    assert_eq!(stats.last_score, Some(40));
    assert_eq!(stats.pass_rate(), 0.5);
}
