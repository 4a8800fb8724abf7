/*!
 * Persistence collaborators.
 *
 * The scheduler and the practice recorder only talk to the traits defined
 * here. Implementations:
 * - `memory`: process-local maps, used by tests and short-lived sessions
 * - `mock`: wraps the memory store and injects failures
 * - `crate::database::Repository`: SQLite
 */

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::practice::models::PracticeAttempt;
use crate::rehearsal::models::{CompletionUpdate, RehearsalSchedule};

pub mod memory;
pub mod mock;

pub use memory::MemoryStore;
pub use mock::{MockBehavior, MockStore};

/// Sort order for schedule queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleOrder {
    /// Earliest scheduled date first
    #[default]
    ScheduledAsc,
    /// Latest scheduled date first
    ScheduledDesc,
}

/// Filters for schedule queries; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleQuery {
    pub user_id: Option<String>,
    pub verse_id: Option<String>,
    pub completed: Option<bool>,
    pub recurring_id: Option<String>,
    pub order: ScheduleOrder,
    pub limit: Option<usize>,
}

impl ScheduleQuery {
    /// Every schedule of one user
    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            ..Self::default()
        }
    }

    pub fn verse(mut self, verse_id: &str) -> Self {
        self.verse_id = Some(verse_id.to_string());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn recurring(mut self, recurring_id: &str) -> Self {
        self.recurring_id = Some(recurring_id.to_string());
        self
    }

    pub fn order(mut self, order: ScheduleOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a schedule passes every filter
    pub fn matches(&self, schedule: &RehearsalSchedule) -> bool {
        self.user_id.as_ref().is_none_or(|u| *u == schedule.user_id)
            && self.verse_id.as_ref().is_none_or(|v| *v == schedule.verse_id)
            && self.completed.is_none_or(|c| c == schedule.completed)
            && self
                .recurring_id
                .as_ref()
                .is_none_or(|r| schedule.recurring_id.as_deref() == Some(r.as_str()))
    }

    /// Filter, sort and truncate an in-memory collection
    pub fn apply<I>(&self, schedules: I) -> Vec<RehearsalSchedule>
    where
        I: IntoIterator<Item = RehearsalSchedule>,
    {
        let mut selected: Vec<RehearsalSchedule> = schedules.into_iter().filter(|s| self.matches(s)).collect();

        selected.sort_by(|a, b| {
            let ordering = a.scheduled_date.cmp(&b.scheduled_date).then_with(|| a.created_at.cmp(&b.created_at));
            match self.order {
                ScheduleOrder::ScheduledAsc => ordering,
                ScheduleOrder::ScheduledDesc => ordering.reverse(),
            }
        });

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }

        selected
    }
}

/// Storage for rehearsal schedules
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Fetch one schedule by id
    async fn get_schedule(&self, id: &str) -> Result<Option<RehearsalSchedule>, StoreError>;

    /// Insert or replace a schedule
    async fn put_schedule(&self, schedule: &RehearsalSchedule) -> Result<(), StoreError>;

    /// Merge completion fields into an existing schedule
    async fn merge_completion(&self, id: &str, update: &CompletionUpdate) -> Result<(), StoreError>;

    /// Query schedules by filter, order and limit
    async fn query_schedules(&self, query: &ScheduleQuery) -> Result<Vec<RehearsalSchedule>, StoreError>;
}

/// Storage for practice attempts
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Persist an attempt
    async fn put_attempt(&self, attempt: &PracticeAttempt) -> Result<(), StoreError>;

    /// Attempts of a user, optionally for one passage, oldest first
    async fn query_attempts(&self, user_id: &str, verse_id: Option<&str>) -> Result<Vec<PracticeAttempt>, StoreError>;
}
