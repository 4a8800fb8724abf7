/*!
 * Mock store implementations for testing.
 *
 * Wraps a `MemoryStore` and simulates collaborator failures:
 * - `MockStore::working()` - behaves like the memory store
 * - `MockStore::fail_writes_after(n)` - the first `n` writes succeed, later ones fail
 * - `MockStore::failing_reads()` - every read fails
 * - `MockStore::failing()` - every call fails
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{AttemptStore, MemoryStore, ScheduleQuery, ScheduleStore};
use crate::errors::StoreError;
use crate::practice::models::PracticeAttempt;
use crate::rehearsal::models::{CompletionUpdate, RehearsalSchedule};

/// Behavior mode for the mock store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Every call succeeds
    Working,
    /// Writes succeed until `successful_writes` have been accepted
    FailWritesAfter { successful_writes: usize },
    /// Reads fail, writes succeed
    FailingReads,
    /// Every call fails
    Failing,
}

/// Store that injects failures around an in-memory store
#[derive(Debug, Clone)]
pub struct MockStore {
    inner: MemoryStore,
    behavior: MockBehavior,
    write_count: Arc<AtomicUsize>,
}

impl MockStore {
    /// Create a mock store with the given behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            inner: MemoryStore::new(),
            behavior,
            write_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn fail_writes_after(successful_writes: usize) -> Self {
        Self::new(MockBehavior::FailWritesAfter { successful_writes })
    }

    pub fn failing_reads() -> Self {
        Self::new(MockBehavior::FailingReads)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Underlying store, for inspecting what was persisted
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    /// Number of write attempts so far, failed ones included
    pub fn write_attempts(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    fn check_read(&self) -> Result<(), StoreError> {
        match self.behavior {
            MockBehavior::FailingReads | MockBehavior::Failing => {
                Err(StoreError::ReadFailed("Simulated read failure".to_string()))
            }
            _ => Ok(()),
        }
    }

    fn check_write(&self) -> Result<(), StoreError> {
        let count = self.write_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Working | MockBehavior::FailingReads => Ok(()),
            MockBehavior::FailWritesAfter { successful_writes } if count < successful_writes => Ok(()),
            MockBehavior::FailWritesAfter { .. } | MockBehavior::Failing => Err(StoreError::WriteFailed(
                format!("Simulated write failure (write #{})", count + 1),
            )),
        }
    }
}

#[async_trait]
impl ScheduleStore for MockStore {
    async fn get_schedule(&self, id: &str) -> Result<Option<RehearsalSchedule>, StoreError> {
        self.check_read()?;
        self.inner.get_schedule(id).await
    }

    async fn put_schedule(&self, schedule: &RehearsalSchedule) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.put_schedule(schedule).await
    }

    async fn merge_completion(&self, id: &str, update: &CompletionUpdate) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.merge_completion(id, update).await
    }

    async fn query_schedules(&self, query: &ScheduleQuery) -> Result<Vec<RehearsalSchedule>, StoreError> {
        self.check_read()?;
        self.inner.query_schedules(query).await
    }
}

#[async_trait]
impl AttemptStore for MockStore {
    async fn put_attempt(&self, attempt: &PracticeAttempt) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.put_attempt(attempt).await
    }

    async fn query_attempts(&self, user_id: &str, verse_id: Option<&str>) -> Result<Vec<PracticeAttempt>, StoreError> {
        self.check_read()?;
        self.inner.query_attempts(user_id, verse_id).await
    }
}
