/*!
 * In-memory persistence collaborator.
 */

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::{AttemptStore, ScheduleQuery, ScheduleStore};
use crate::errors::StoreError;
use crate::practice::models::PracticeAttempt;
use crate::rehearsal::models::{CompletionUpdate, RehearsalSchedule};

/// Store keeping every record in process memory.
///
/// Clones share the same underlying maps.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    schedules: Arc<RwLock<HashMap<String, RehearsalSchedule>>>,
    attempts: Arc<RwLock<Vec<PracticeAttempt>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored schedules
    pub fn schedule_count(&self) -> usize {
        self.schedules.read().len()
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn get_schedule(&self, id: &str) -> Result<Option<RehearsalSchedule>, StoreError> {
        Ok(self.schedules.read().get(id).cloned())
    }

    async fn put_schedule(&self, schedule: &RehearsalSchedule) -> Result<(), StoreError> {
        debug!("Storing schedule {} at {}", schedule.id, schedule.scheduled_date);
        self.schedules.write().insert(schedule.id.clone(), schedule.clone());
        Ok(())
    }

    async fn merge_completion(&self, id: &str, update: &CompletionUpdate) -> Result<(), StoreError> {
        let mut schedules = self.schedules.write();
        match schedules.get_mut(id) {
            Some(schedule) => {
                schedule.apply_completion(update);
                Ok(())
            }
            None => Err(StoreError::WriteFailed(format!("No schedule with id {}", id))),
        }
    }

    async fn query_schedules(&self, query: &ScheduleQuery) -> Result<Vec<RehearsalSchedule>, StoreError> {
        let schedules = self.schedules.read();
        Ok(query.apply(schedules.values().cloned()))
    }
}

#[async_trait]
impl AttemptStore for MemoryStore {
    async fn put_attempt(&self, attempt: &PracticeAttempt) -> Result<(), StoreError> {
        self.attempts.write().push(attempt.clone());
        Ok(())
    }

    async fn query_attempts(&self, user_id: &str, verse_id: Option<&str>) -> Result<Vec<PracticeAttempt>, StoreError> {
        let mut attempts: Vec<PracticeAttempt> = self
            .attempts
            .read()
            .iter()
            .filter(|a| a.user_id == user_id && verse_id.is_none_or(|v| a.verse_id == v))
            .cloned()
            .collect();
        attempts.sort_by_key(|a| a.timestamp);
        Ok(attempts)
    }
}
