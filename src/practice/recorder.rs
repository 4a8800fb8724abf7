/*!
 * Practice evaluation and attempt history.
 */

use chrono::{DateTime, Utc};
use log::{debug, info};

use super::models::{PracticeAttempt, PracticeOutcome, PracticeStats};
use crate::errors::StoreError;
use crate::recall::{normalize, AligningScorer, ComparisonResult, MatchKind, Token};
use crate::store::AttemptStore;

/// Default minimum accuracy for an attempt to count as passed
pub const DEFAULT_PASS_THRESHOLD: u8 = 90;

const PERFECT_FEEDBACK: &str = "Great job! The verse matches perfectly!";

/// Scores recalls and keeps their history in an attempt store
#[derive(Debug, Clone)]
pub struct PracticeRecorder<S: AttemptStore> {
    scorer: AligningScorer,
    pass_threshold: u8,
    store: S,
}

impl<S: AttemptStore> PracticeRecorder<S> {
    pub fn new(scorer: AligningScorer, pass_threshold: u8, store: S) -> Self {
        Self {
            scorer,
            pass_threshold: pass_threshold.min(100),
            store,
        }
    }

    pub fn scorer(&self) -> &AligningScorer {
        &self.scorer
    }

    pub fn pass_threshold(&self) -> u8 {
        self.pass_threshold
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Score a recall without recording it
    pub fn evaluate(&self, candidate_text: &str, reference_text: &str) -> PracticeOutcome {
        let candidate = normalize(candidate_text);
        let reference = normalize(reference_text);
        let comparison = self.scorer.compare(&candidate, &reference);

        let passed = comparison.accuracy >= self.pass_threshold;
        let feedback = if comparison.is_perfect() {
            PERFECT_FEEDBACK.to_string()
        } else {
            format!("Accuracy: {}%", comparison.accuracy)
        };
        let mistakes = describe_mistakes(&candidate, &reference, &comparison);

        debug!(
            "Evaluated recall: {}% ({} mistake(s), passed: {})",
            comparison.accuracy,
            mistakes.len(),
            passed
        );

        PracticeOutcome {
            comparison,
            passed,
            feedback,
            mistakes,
        }
    }

    /// Persist an evaluated attempt
    pub async fn record_attempt(
        &self,
        user_id: &str,
        verse_id: &str,
        input_text: &str,
        outcome: &PracticeOutcome,
        used_speech_input: bool,
        now: DateTime<Utc>,
    ) -> Result<PracticeAttempt, StoreError> {
        let attempt = PracticeAttempt::from_outcome(user_id, verse_id, input_text, outcome, used_speech_input, now);
        self.store.put_attempt(&attempt).await?;

        info!(
            "Recorded attempt {} for verse {} at {}%",
            attempt.id, attempt.verse_id, attempt.score
        );
        Ok(attempt)
    }

    /// Evaluate a recall and record it in one step
    pub async fn practice(
        &self,
        user_id: &str,
        verse_id: &str,
        input_text: &str,
        reference_text: &str,
        used_speech_input: bool,
        now: DateTime<Utc>,
    ) -> Result<(PracticeOutcome, PracticeAttempt), StoreError> {
        let outcome = self.evaluate(input_text, reference_text);
        let attempt = self
            .record_attempt(user_id, verse_id, input_text, &outcome, used_speech_input, now)
            .await?;
        Ok((outcome, attempt))
    }

    /// Attempt history of a user for one passage
    pub async fn practice_stats(&self, user_id: &str, verse_id: &str) -> Result<PracticeStats, StoreError> {
        let attempts = self.store.query_attempts(user_id, Some(verse_id)).await?;
        Ok(PracticeStats::from_attempts(&attempts, self.pass_threshold))
    }
}

/// Human-readable mistakes in reference order, extras last.
///
/// Synonym substitutions are not mistakes.
pub fn describe_mistakes(candidate: &[Token], reference: &[Token], result: &ComparisonResult) -> Vec<String> {
    let mut mistakes = Vec::new();

    for (reference_word, alignment) in reference.iter().zip(&result.alignments) {
        match alignment {
            Some(alignment) if alignment.kind == MatchKind::Fuzzy => {
                if let Some(used) = candidate.get(alignment.candidate_index) {
                    mistakes.push(format!("\"{}\" should be \"{}\"", used, reference_word));
                }
            }
            Some(_) => {}
            None => mistakes.push(format!("missing \"{}\"", reference_word)),
        }
    }

    for extra in &result.extra_words {
        mistakes.push(format!("extra \"{}\"", extra));
    }

    mistakes
}
