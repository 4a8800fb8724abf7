/*!
 * Rehearsal schedule records and the request/report types exchanged with
 * the scheduler.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::StoreError;

/// Lifecycle state of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Waiting to be rehearsed
    Scheduled,
    /// Rehearsed; terminal for the record
    Completed,
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleStatus::Scheduled => f.pad("scheduled"),
            ScheduleStatus::Completed => f.pad("completed"),
        }
    }
}

/// A planned rehearsal of one passage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RehearsalSchedule {
    /// Opaque record id
    pub id: String,
    /// Passage being rehearsed
    pub verse_id: String,
    /// Owner of the schedule
    pub user_id: String,
    /// Display label, e.g. "John 3:16"
    pub reference: String,
    /// When the rehearsal is due
    pub scheduled_date: DateTime<Utc>,
    /// Set once by completion
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Accuracy (0-100) recorded at completion
    pub accuracy: Option<u8>,
    /// Informational follow-up date computed at completion
    pub next_rehearsal_date: Option<DateTime<Utc>>,
    /// Days between occurrences of a recurring schedule
    pub frequency_days: Option<u32>,
    /// Shared by every record of one recurring batch
    pub recurring_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RehearsalSchedule {
    /// Create a pending record with a fresh id
    pub fn pending(
        user_id: &str,
        verse_id: &str,
        reference: &str,
        scheduled_date: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            verse_id: verse_id.to_string(),
            user_id: user_id.to_string(),
            reference: reference.to_string(),
            scheduled_date,
            completed: false,
            completed_at: None,
            accuracy: None,
            next_rehearsal_date: None,
            frequency_days: None,
            recurring_id: None,
            created_at,
        }
    }

    /// Attach recurring batch information
    pub fn with_recurrence(mut self, recurring_id: &str, frequency_days: u32) -> Self {
        self.recurring_id = Some(recurring_id.to_string());
        self.frequency_days = Some(frequency_days);
        self
    }

    /// Whether this record belongs to a fixed-frequency batch
    pub fn is_recurring(&self) -> bool {
        self.frequency_days.is_some()
    }

    /// Current lifecycle state
    pub fn status(&self) -> ScheduleStatus {
        if self.completed {
            ScheduleStatus::Completed
        } else {
            ScheduleStatus::Scheduled
        }
    }

    /// Apply a completion in place
    pub fn apply_completion(&mut self, update: &CompletionUpdate) {
        self.completed = true;
        self.completed_at = Some(update.completed_at);
        self.accuracy = Some(update.accuracy);
        self.next_rehearsal_date = Some(update.next_rehearsal_date);
    }
}

/// Fields merged into a schedule when it is completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionUpdate {
    pub completed_at: DateTime<Utc>,
    pub accuracy: u8,
    pub next_rehearsal_date: DateTime<Utc>,
}

/// Parameters for creating a schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub user_id: String,
    pub verse_id: String,
    /// Display label stored on every created record
    pub reference: String,
    /// First rehearsal of a newly added passage
    pub is_initial: bool,
    /// Explicit first date, overrides the computed one
    pub custom_date: Option<DateTime<Utc>>,
    /// Fixed recurrence in days; adaptive when absent or zero
    pub frequency_days: Option<u32>,
}

impl ScheduleRequest {
    /// Create an initial adaptive request
    pub fn new(user_id: &str, verse_id: &str, reference: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            verse_id: verse_id.to_string(),
            reference: reference.to_string(),
            is_initial: true,
            custom_date: None,
            frequency_days: None,
        }
    }

    pub fn initial(mut self, is_initial: bool) -> Self {
        self.is_initial = is_initial;
        self
    }

    pub fn on(mut self, date: DateTime<Utc>) -> Self {
        self.custom_date = Some(date);
        self
    }

    pub fn every(mut self, frequency_days: u32) -> Self {
        self.frequency_days = Some(frequency_days);
        self
    }

    /// Recurrence in days; zero means adaptive, like an absent frequency
    pub fn recurrence_days(&self) -> Option<u32> {
        self.frequency_days.filter(|days| *days > 0)
    }
}

/// Result of one write in a multi-step operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The record was persisted
    Written {
        schedule_id: String,
        scheduled_date: DateTime<Utc>,
    },
    /// The store rejected the record
    Failed {
        schedule_id: String,
        scheduled_date: DateTime<Utc>,
        error: StoreError,
    },
}

impl WriteOutcome {
    pub fn schedule_id(&self) -> &str {
        match self {
            WriteOutcome::Written { schedule_id, .. } | WriteOutcome::Failed { schedule_id, .. } => schedule_id,
        }
    }

    pub fn scheduled_date(&self) -> DateTime<Utc> {
        match self {
            WriteOutcome::Written { scheduled_date, .. } | WriteOutcome::Failed { scheduled_date, .. } => {
                *scheduled_date
            }
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written { .. })
    }

    pub fn error(&self) -> Option<&StoreError> {
        match self {
            WriteOutcome::Written { .. } => None,
            WriteOutcome::Failed { error, .. } => Some(error),
        }
    }
}

/// Per-step outcome of creating a schedule or a recurring batch.
///
/// Writes stop at the first failure; records after it are never attempted.
/// Records written before the failure stay persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleReport {
    /// Id of the first created record
    pub first_id: String,
    /// Shared id of a recurring batch
    pub recurring_id: Option<String>,
    /// Number of records the request called for
    pub planned: usize,
    /// One entry per attempted write, in creation order
    pub outcomes: Vec<WriteOutcome>,
}

impl ScheduleReport {
    /// Ids of every persisted record
    pub fn written_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_written())
            .map(WriteOutcome::schedule_id)
            .collect()
    }

    /// Whether every planned record was persisted
    pub fn is_complete(&self) -> bool {
        self.outcomes.len() == self.planned && self.outcomes.iter().all(WriteOutcome::is_written)
    }

    /// First store error, if any write failed
    pub fn failure(&self) -> Option<&StoreError> {
        self.outcomes.iter().find_map(WriteOutcome::error)
    }
}

/// Outcome of completing a schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    /// The completed schedule, as persisted
    pub schedule: RehearsalSchedule,
    /// Completions of the same passage before this one
    pub completed_count: usize,
    /// Follow-up date stored on the completed record
    pub next_rehearsal_date: DateTime<Utc>,
    /// Successor write for adaptive schedules; `None` for recurring ones
    pub successor: Option<WriteOutcome>,
}

impl CompletionReport {
    /// Whether the successor write was required and failed
    pub fn successor_failed(&self) -> bool {
        self.successor.as_ref().is_some_and(|o| !o.is_written())
    }
}
