/*!
 * Rehearsal scheduler.
 *
 * Creates adaptive (spaced repetition) or recurring (fixed frequency)
 * schedules and completes them. Each schedule moves `Scheduled → Completed`
 * exactly once; completing an adaptive schedule spawns one successor.
 *
 * Writes are sequential and not transactional:
 * - a recurring batch stops at the first failed write, leaving the earlier
 *   records persisted
 * - completion and successor creation are separate writes, so a crash in
 *   between leaves a completed record without a successor
 * Both cases are reported to the caller instead of being rolled back.
 */

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use uuid::Uuid;

use super::models::{
    CompletionReport, CompletionUpdate, RehearsalSchedule, ScheduleReport, ScheduleRequest, WriteOutcome,
};
use crate::app_config::SchedulingConfig;
use crate::errors::ScheduleError;
use crate::store::{ScheduleQuery, ScheduleStore};

/// Longest accepted recurrence, one century
pub const MAX_FREQUENCY_DAYS: u32 = 36_500;

/// Drives schedule creation and completion against a store
#[derive(Debug, Clone)]
pub struct RehearsalScheduler<S: ScheduleStore> {
    store: S,
    config: SchedulingConfig,
}

impl<S: ScheduleStore> RehearsalScheduler<S> {
    /// Create a scheduler over a store
    pub fn new(store: S, config: SchedulingConfig) -> Self {
        Self { store, config }
    }

    /// Create a scheduler with the default interval table and batch size
    pub fn with_defaults(store: S) -> Self {
        Self::new(store, SchedulingConfig::default())
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Scheduling configuration in use
    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Create one adaptive schedule, or a recurring batch when the request
    /// carries a frequency.
    ///
    /// Fails only when the request is invalid or the first write is
    /// rejected; later failures in a batch are reported in the returned
    /// `ScheduleReport`.
    pub async fn schedule_rehearsal(
        &self,
        request: &ScheduleRequest,
        now: DateTime<Utc>,
    ) -> Result<ScheduleReport, ScheduleError> {
        validate_request(request)?;

        let first_date = self.first_date(request, now)?;
        let records = self.plan_records(request, first_date, now)?;
        let planned = records.len();
        let recurring_id = records[0].recurring_id.clone();
        let first_id = records[0].id.clone();

        let mut outcomes = Vec::with_capacity(planned);
        for (index, record) in records.iter().enumerate() {
            match self.store.put_schedule(record).await {
                Ok(()) => {
                    debug!("Scheduled {} for verse {} at {}", record.id, record.verse_id, record.scheduled_date);
                    outcomes.push(WriteOutcome::Written {
                        schedule_id: record.id.clone(),
                        scheduled_date: record.scheduled_date,
                    });
                }
                Err(error) if index == 0 => return Err(ScheduleError::StoreFailure(error)),
                Err(error) => {
                    warn!(
                        "Recurring batch {} stopped after {}/{} records: {}",
                        recurring_id.as_deref().unwrap_or("-"),
                        index,
                        planned,
                        error
                    );
                    outcomes.push(WriteOutcome::Failed {
                        schedule_id: record.id.clone(),
                        scheduled_date: record.scheduled_date,
                        error,
                    });
                    break;
                }
            }
        }

        info!(
            "Scheduled {} rehearsal(s) of '{}' starting {}",
            outcomes.iter().filter(|o| o.is_written()).count(),
            request.reference,
            first_date.format("%Y-%m-%d")
        );

        Ok(ScheduleReport {
            first_id,
            recurring_id,
            planned,
            outcomes,
        })
    }

    /// First scheduled date for a request
    fn first_date(&self, request: &ScheduleRequest, now: DateTime<Utc>) -> Result<DateTime<Utc>, ScheduleError> {
        if let Some(custom) = request.custom_date {
            return Ok(custom);
        }
        let delay = if request.is_initial {
            self.config.initial_delay_days
        } else {
            self.config.first_adaptive_interval()
        };
        shift_days(now, u64::from(delay))
    }

    /// Records to create for a request, in date order.
    ///
    /// Every date is computed before anything is written, so an
    /// unrepresentable batch is rejected as a whole.
    fn plan_records(
        &self,
        request: &ScheduleRequest,
        first_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<RehearsalSchedule>, ScheduleError> {
        let first = RehearsalSchedule::pending(&request.user_id, &request.verse_id, &request.reference, first_date, now);

        let Some(frequency) = request.recurrence_days() else {
            return Ok(vec![first]);
        };

        let recurring_id = Uuid::new_v4().to_string();
        let batch_size = self.config.recurring_batch_size.max(1);

        (0..batch_size)
            .map(|k| {
                let record = if k == 0 {
                    first.clone()
                } else {
                    let offset = u64::try_from(k)
                        .ok()
                        .and_then(|k| u64::from(frequency).checked_mul(k))
                        .ok_or_else(|| out_of_range(first_date, u64::MAX))?;
                    let date = shift_days(first_date, offset)?;
                    RehearsalSchedule::pending(&request.user_id, &request.verse_id, &request.reference, date, now)
                };
                Ok(record.with_recurrence(&recurring_id, frequency))
            })
            .collect()
    }

    // =========================================================================
    // Completion
    // =========================================================================

    /// Complete a schedule with the accuracy reached.
    ///
    /// Recurring schedules only record an informational next date, since
    /// their successors already exist. Adaptive schedules get one successor
    /// at `now + interval[min(completed, len - 1)]`.
    pub async fn complete_rehearsal(
        &self,
        schedule_id: &str,
        accuracy: u8,
        now: DateTime<Utc>,
    ) -> Result<CompletionReport, ScheduleError> {
        if accuracy > 100 {
            return Err(ScheduleError::InvalidRequest(format!(
                "Accuracy must be between 0 and 100, got {}",
                accuracy
            )));
        }

        let mut schedule = self
            .store
            .get_schedule(schedule_id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound(schedule_id.to_string()))?;

        if schedule.completed {
            return Err(ScheduleError::AlreadyCompleted(schedule_id.to_string()));
        }

        let completed_count = self.completed_count(&schedule).await?;

        let interval = match schedule.frequency_days {
            Some(frequency) => frequency,
            None => self.config.adaptive_interval(completed_count),
        };
        let next_rehearsal_date = shift_days(now, u64::from(interval))?;

        let update = CompletionUpdate {
            completed_at: now,
            accuracy,
            next_rehearsal_date,
        };
        self.store.merge_completion(&schedule.id, &update).await?;
        schedule.apply_completion(&update);

        info!(
            "Completed rehearsal {} of '{}' at {}%, next on {}",
            schedule.id,
            schedule.reference,
            accuracy,
            next_rehearsal_date.format("%Y-%m-%d")
        );

        let successor = if schedule.is_recurring() {
            None
        } else {
            Some(self.create_successor(&schedule, next_rehearsal_date, now).await)
        };

        Ok(CompletionReport {
            schedule,
            completed_count,
            next_rehearsal_date,
            successor,
        })
    }

    /// Completed schedules of the same user and passage
    async fn completed_count(&self, schedule: &RehearsalSchedule) -> Result<usize, ScheduleError> {
        let query = ScheduleQuery::for_user(&schedule.user_id)
            .verse(&schedule.verse_id)
            .completed(true);
        Ok(self.store.query_schedules(&query).await?.len())
    }

    async fn create_successor(
        &self,
        completed: &RehearsalSchedule,
        scheduled_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> WriteOutcome {
        let successor = RehearsalSchedule::pending(
            &completed.user_id,
            &completed.verse_id,
            &completed.reference,
            scheduled_date,
            now,
        );

        match self.store.put_schedule(&successor).await {
            Ok(()) => WriteOutcome::Written {
                schedule_id: successor.id,
                scheduled_date,
            },
            Err(error) => {
                warn!(
                    "Rehearsal {} completed but its successor could not be stored: {}",
                    completed.id, error
                );
                WriteOutcome::Failed {
                    schedule_id: successor.id,
                    scheduled_date,
                    error,
                }
            }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Every schedule of a user, earliest first
    pub async fn list_schedules(&self, user_id: &str) -> Result<Vec<RehearsalSchedule>, ScheduleError> {
        Ok(self.store.query_schedules(&ScheduleQuery::for_user(user_id)).await?)
    }

    /// Open schedules of a user due around `now`
    pub async fn due_today_for(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<RehearsalSchedule>, ScheduleError> {
        let open = self.open_schedules(user_id).await?;
        Ok(due_today(&open, now))
    }

    /// Open schedules of a user after `now`
    pub async fn upcoming_for(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<RehearsalSchedule>, ScheduleError> {
        let open = self.open_schedules(user_id).await?;
        Ok(upcoming(&open, now))
    }

    async fn open_schedules(&self, user_id: &str) -> Result<Vec<RehearsalSchedule>, ScheduleError> {
        let query = ScheduleQuery::for_user(user_id).completed(false);
        Ok(self.store.query_schedules(&query).await?)
    }
}

/// Open schedules with `scheduled_date` in `[now - 1 day, now + 1 day)`
pub fn due_today(schedules: &[RehearsalSchedule], now: DateTime<Utc>) -> Vec<RehearsalSchedule> {
    let window_start = now - Duration::days(1);
    let window_end = now + Duration::days(1);

    schedules
        .iter()
        .filter(|s| !s.completed && s.scheduled_date >= window_start && s.scheduled_date < window_end)
        .cloned()
        .collect()
}

/// Open schedules strictly after `now`
pub fn upcoming(schedules: &[RehearsalSchedule], now: DateTime<Utc>) -> Vec<RehearsalSchedule> {
    schedules
        .iter()
        .filter(|s| !s.completed && s.scheduled_date > now)
        .cloned()
        .collect()
}

/// `date + count` days, or `InvalidRequest` outside the representable range
fn shift_days(date: DateTime<Utc>, count: u64) -> Result<DateTime<Utc>, ScheduleError> {
    i64::try_from(count)
        .ok()
        .and_then(Duration::try_days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(|| out_of_range(date, count))
}

fn out_of_range(date: DateTime<Utc>, count: u64) -> ScheduleError {
    ScheduleError::InvalidRequest(format!(
        "{} plus {} days is outside the supported date range",
        date.format("%Y-%m-%d"),
        count
    ))
}

fn validate_request(request: &ScheduleRequest) -> Result<(), ScheduleError> {
    if request.user_id.trim().is_empty() {
        return Err(ScheduleError::InvalidRequest("user id is empty".to_string()));
    }
    if request.verse_id.trim().is_empty() {
        return Err(ScheduleError::InvalidRequest("verse id is empty".to_string()));
    }
    if let Some(frequency) = request.frequency_days.filter(|days| *days > MAX_FREQUENCY_DAYS) {
        return Err(ScheduleError::InvalidRequest(format!(
            "frequency of {} days exceeds the {} day maximum",
            frequency, MAX_FREQUENCY_DAYS
        )));
    }
    Ok(())
}
