/*!
 * Practice attempt records and evaluation outcomes.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::recall::ComparisonResult;

/// One recorded recall attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeAttempt {
    pub id: String,
    pub user_id: String,
    pub verse_id: String,
    /// Text as typed or transcribed, before normalization
    pub input_text: String,
    /// Accuracy reached, 0-100
    pub score: u8,
    /// Human-readable mistakes, see `PracticeOutcome::mistakes`
    pub mistakes: Vec<String>,
    pub used_speech_input: bool,
    pub timestamp: DateTime<Utc>,
}

impl PracticeAttempt {
    /// Build an attempt from an evaluated outcome
    pub fn from_outcome(
        user_id: &str,
        verse_id: &str,
        input_text: &str,
        outcome: &PracticeOutcome,
        used_speech_input: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            verse_id: verse_id.to_string(),
            input_text: input_text.to_string(),
            score: outcome.comparison.accuracy,
            mistakes: outcome.mistakes.clone(),
            used_speech_input,
            timestamp,
        }
    }
}

/// Result of evaluating one recall against its reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PracticeOutcome {
    pub comparison: ComparisonResult,
    /// Whether accuracy reached the pass threshold
    pub passed: bool,
    pub feedback: String,
    pub mistakes: Vec<String>,
}

/// Aggregate over a user's attempts at one passage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PracticeStats {
    pub attempts: usize,
    pub passed: usize,
    pub best_score: Option<u8>,
    pub last_score: Option<u8>,
    pub last_practiced: Option<DateTime<Utc>>,
}

impl PracticeStats {
    /// Fold attempts, oldest first, into stats
    pub fn from_attempts(attempts: &[PracticeAttempt], pass_threshold: u8) -> Self {
        let last = attempts.iter().max_by_key(|a| a.timestamp);

        Self {
            attempts: attempts.len(),
            passed: attempts.iter().filter(|a| a.score >= pass_threshold).count(),
            best_score: attempts.iter().map(|a| a.score).max(),
            last_score: last.map(|a| a.score),
            last_practiced: last.map(|a| a.timestamp),
        }
    }

    /// Share of passed attempts, 0.0 when there are none
    pub fn pass_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.passed as f64 / self.attempts as f64
        }
    }
}
