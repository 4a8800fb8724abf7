/*!
 * Database row models.
 *
 * Rows mirror the table columns (text timestamps, integer booleans) and
 * convert to and from the domain types.
 */

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::practice::models::PracticeAttempt;
use crate::rehearsal::models::RehearsalSchedule;

/// Format a timestamp for storage
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid timestamp: {}", value))?
        .with_timezone(&Utc))
}

fn parse_optional(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value.map(parse_timestamp).transpose()
}

/// Row of the `rehearsals` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RehearsalRecord {
    pub id: String,
    pub user_id: String,
    pub verse_id: String,
    pub reference: String,
    pub scheduled_date: String,
    pub completed: bool,
    pub completed_at: Option<String>,
    pub accuracy: Option<i64>,
    pub next_rehearsal_date: Option<String>,
    pub frequency_days: Option<i64>,
    pub recurring_id: Option<String>,
    pub created_at: String,
}

impl RehearsalRecord {
    /// Column list in the order `from_row` reads them
    pub const COLUMNS: &'static str = "id, user_id, verse_id, reference, scheduled_date, completed, completed_at, \
         accuracy, next_rehearsal_date, frequency_days, recurring_id, created_at";

    pub fn from_schedule(schedule: &RehearsalSchedule) -> Self {
        Self {
            id: schedule.id.clone(),
            user_id: schedule.user_id.clone(),
            verse_id: schedule.verse_id.clone(),
            reference: schedule.reference.clone(),
            scheduled_date: format_timestamp(&schedule.scheduled_date),
            completed: schedule.completed,
            completed_at: schedule.completed_at.as_ref().map(format_timestamp),
            accuracy: schedule.accuracy.map(i64::from),
            next_rehearsal_date: schedule.next_rehearsal_date.as_ref().map(format_timestamp),
            frequency_days: schedule.frequency_days.map(i64::from),
            recurring_id: schedule.recurring_id.clone(),
            created_at: format_timestamp(&schedule.created_at),
        }
    }

    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            verse_id: row.get(2)?,
            reference: row.get(3)?,
            scheduled_date: row.get(4)?,
            completed: row.get(5)?,
            completed_at: row.get(6)?,
            accuracy: row.get(7)?,
            next_rehearsal_date: row.get(8)?,
            frequency_days: row.get(9)?,
            recurring_id: row.get(10)?,
            created_at: row.get(11)?,
        })
    }

    pub fn into_schedule(self) -> Result<RehearsalSchedule> {
        let accuracy = self
            .accuracy
            .map(u8::try_from)
            .transpose()
            .context("Accuracy out of range")?;
        let frequency_days = self
            .frequency_days
            .map(u32::try_from)
            .transpose()
            .context("Frequency out of range")?;

        Ok(RehearsalSchedule {
            scheduled_date: parse_timestamp(&self.scheduled_date)?,
            completed_at: parse_optional(self.completed_at.as_deref())?,
            next_rehearsal_date: parse_optional(self.next_rehearsal_date.as_deref())?,
            created_at: parse_timestamp(&self.created_at)?,
            id: self.id,
            user_id: self.user_id,
            verse_id: self.verse_id,
            reference: self.reference,
            completed: self.completed,
            accuracy,
            frequency_days,
            recurring_id: self.recurring_id,
        })
    }
}

/// Row of the `practice_attempts` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub id: String,
    pub user_id: String,
    pub verse_id: String,
    pub input_text: String,
    pub score: i64,
    /// JSON array of strings
    pub mistakes: String,
    pub used_speech_input: bool,
    pub timestamp: String,
}

impl AttemptRecord {
    pub const COLUMNS: &'static str = "id, user_id, verse_id, input_text, score, mistakes, used_speech_input, timestamp";

    pub fn from_attempt(attempt: &PracticeAttempt) -> Result<Self> {
        Ok(Self {
            id: attempt.id.clone(),
            user_id: attempt.user_id.clone(),
            verse_id: attempt.verse_id.clone(),
            input_text: attempt.input_text.clone(),
            score: i64::from(attempt.score),
            mistakes: serde_json::to_string(&attempt.mistakes).context("Failed to encode mistakes")?,
            used_speech_input: attempt.used_speech_input,
            timestamp: format_timestamp(&attempt.timestamp),
        })
    }

    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            verse_id: row.get(2)?,
            input_text: row.get(3)?,
            score: row.get(4)?,
            mistakes: row.get(5)?,
            used_speech_input: row.get(6)?,
            timestamp: row.get(7)?,
        })
    }

    pub fn into_attempt(self) -> Result<PracticeAttempt> {
        Ok(PracticeAttempt {
            score: u8::try_from(self.score).context("Score out of range")?,
            mistakes: serde_json::from_str(&self.mistakes).context("Invalid mistakes column")?,
            timestamp: parse_timestamp(&self.timestamp)?,
            id: self.id,
            user_id: self.user_id,
            verse_id: self.verse_id,
            input_text: self.input_text,
            used_speech_input: self.used_speech_input,
        })
    }
}
