/*!
 * Scheduler tests against the memory store and failing mock stores
 */

use chrono::{DateTime, Duration, Utc};

use verserecall::app_config::SchedulingConfig;
use verserecall::errors::{ScheduleError, StoreError};
use verserecall::rehearsal::{RehearsalScheduler, ScheduleRequest, ScheduleStatus, WriteOutcome};
use verserecall::store::{MemoryStore, MockStore, ScheduleQuery, ScheduleStore};

use crate::common::{fixed_now, memory_scheduler, mock_scheduler};

#[tokio::test]
async fn test_scheduleRehearsal_weeklyFrequency_shouldCreateTwelveRecordsSevenDaysApart() {
    let (scheduler, store) = memory_scheduler();
    let request = ScheduleRequest::new("u1", "jn3-16", "John 3:16").initial(false).every(7);

    let report = scheduler.schedule_rehearsal(&request, fixed_now()).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.planned, 12);
    let recurring_id = report.recurring_id.clone().expect("Batch should share a recurring id");

    let batch = store
        .query_schedules(&ScheduleQuery::default().recurring(&recurring_id))
        .await
        .unwrap();
    assert_eq!(batch.len(), 12);
    assert_eq!(batch[0].id, report.first_id);
    assert_eq!(batch[0].scheduled_date, fixed_now() + Duration::days(1));
    for pair in batch.windows(2) {
        assert_eq!(pair[1].scheduled_date - pair[0].scheduled_date, Duration::days(7));
    }
    assert!(batch.iter().all(|s| s.frequency_days == Some(7)));
    assert_eq!(store.schedule_count(), 12);
}

#[tokio::test]
async fn test_scheduleRehearsal_adaptive_shouldCreateSingleRecord() {
    let (scheduler, store) = memory_scheduler();
    let request = ScheduleRequest::new("u1", "ps23", "Psalm 23:1");

    let report = scheduler.schedule_rehearsal(&request, fixed_now()).await.unwrap();

    assert_eq!(report.planned, 1);
    assert!(report.recurring_id.is_none());
    let schedule = store.get_schedule(&report.first_id).await.unwrap().unwrap();
    assert_eq!(schedule.scheduled_date, fixed_now() + Duration::days(1));
    assert_eq!(schedule.status(), ScheduleStatus::Scheduled);
    assert!(!schedule.is_recurring());
}

#[tokio::test]
async fn test_scheduleRehearsal_customDate_shouldWin() {
    let (scheduler, store) = memory_scheduler();
    let date = fixed_now() + Duration::days(10);
    let request = ScheduleRequest::new("u1", "ps23", "Psalm 23:1").on(date).every(2);

    let report = scheduler.schedule_rehearsal(&request, fixed_now()).await.unwrap();

    let first = store.get_schedule(&report.first_id).await.unwrap().unwrap();
    assert_eq!(first.scheduled_date, date);
}

#[tokio::test]
async fn test_scheduleRehearsal_configuredBatchSize_shouldBeHonored() {
    let store = MemoryStore::new();
    let config = SchedulingConfig {
        recurring_batch_size: 3,
        ..SchedulingConfig::default()
    };
    let scheduler = RehearsalScheduler::new(store.clone(), config);

    let report = scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "v", "Romans 8:28").every(1), fixed_now())
        .await
        .unwrap();

    assert_eq!(report.written_ids().len(), 3);
    assert_eq!(store.schedule_count(), 3);
}

#[tokio::test]
async fn test_completeRehearsal_adaptive_shouldFollowIntervalTable() {
    let (scheduler, store) = memory_scheduler();
    let report = scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "ps23", "Psalm 23:1"), fixed_now())
        .await
        .unwrap();

    let expected = [1, 3, 7, 14, 30, 90, 90, 90];
    let mut current_id = report.first_id;

    for (round, days) in expected.iter().enumerate() {
        let now = fixed_now() + Duration::days(round as i64 * 100);
        let completion = scheduler.complete_rehearsal(&current_id, 95, now).await.unwrap();

        assert_eq!(completion.completed_count, round);
        assert_eq!(completion.next_rehearsal_date, now + Duration::days(*days), "round {}", round);

        let successor = completion.successor.expect("Adaptive completion should create a successor");
        assert!(successor.is_written());
        assert_eq!(successor.scheduled_date(), completion.next_rehearsal_date);
        current_id = successor.schedule_id().to_string();
    }

    assert_eq!(store.schedule_count(), expected.len() + 1);
}

#[tokio::test]
async fn test_completeRehearsal_shouldPersistCompletionFields() {
    let (scheduler, store) = memory_scheduler();
    let report = scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "ps23", "Psalm 23:1"), fixed_now())
        .await
        .unwrap();

    let now = fixed_now() + Duration::days(1);
    scheduler.complete_rehearsal(&report.first_id, 88, now).await.unwrap();

    let stored = store.get_schedule(&report.first_id).await.unwrap().unwrap();
    assert!(stored.completed);
    assert_eq!(stored.completed_at, Some(now));
    assert_eq!(stored.accuracy, Some(88));
    assert_eq!(stored.next_rehearsal_date, Some(now + Duration::days(1)));
}

#[tokio::test]
async fn test_completeRehearsal_recurring_shouldNotCreateSuccessor() {
    let (scheduler, store) = memory_scheduler();
    let report = scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "jn3-16", "John 3:16").every(14), fixed_now())
        .await
        .unwrap();

    let completion = scheduler
        .complete_rehearsal(&report.first_id, 100, fixed_now())
        .await
        .unwrap();

    assert!(completion.successor.is_none());
    assert_eq!(completion.next_rehearsal_date, fixed_now() + Duration::days(14));
    assert_eq!(store.schedule_count(), 12);
}

#[tokio::test]
async fn test_completeRehearsal_unknownId_shouldBeNotFound() {
    let (scheduler, _store) = memory_scheduler();
    let result = scheduler.complete_rehearsal("missing", 50, fixed_now()).await;
    assert!(matches!(result, Err(ScheduleError::NotFound(id)) if id == "missing"));
}

#[tokio::test]
async fn test_completeRehearsal_twice_shouldBeAlreadyCompleted() {
    let (scheduler, store) = memory_scheduler();
    let report = scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "ps23", "Psalm 23:1"), fixed_now())
        .await
        .unwrap();

    scheduler.complete_rehearsal(&report.first_id, 70, fixed_now()).await.unwrap();
    let second = scheduler.complete_rehearsal(&report.first_id, 90, fixed_now()).await;

    assert!(matches!(second, Err(ScheduleError::AlreadyCompleted(_))));
    assert_eq!(store.schedule_count(), 2);
}

#[tokio::test]
async fn test_completeRehearsal_accuracyAbove100_shouldBeInvalid() {
    let (scheduler, _store) = memory_scheduler();
    let result = scheduler.complete_rehearsal("any", 101, fixed_now()).await;
    assert!(matches!(result, Err(ScheduleError::InvalidRequest(_))));
}

#[tokio::test]
async fn test_dueToday_shouldSkipCompletedRecords() {
    let (scheduler, _store) = memory_scheduler();
    let now = fixed_now();
    let first = scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "a", "Psalm 23:1").on(now), now)
        .await
        .unwrap();
    scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "b", "John 3:16").on(now + Duration::hours(3)), now)
        .await
        .unwrap();
    scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u2", "c", "Romans 8:28").on(now), now)
        .await
        .unwrap();

    scheduler.complete_rehearsal(&first.first_id, 100, now).await.unwrap();

    let due = scheduler.due_today_for("u1", now).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].verse_id, "b");
    assert!(due.iter().all(|s| !s.completed));
}

#[tokio::test]
async fn test_upcoming_shouldIncludeSuccessors() {
    let (scheduler, _store) = memory_scheduler();
    let now = fixed_now();
    let report = scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "ps23", "Psalm 23:1").on(now), now)
        .await
        .unwrap();
    scheduler.complete_rehearsal(&report.first_id, 90, now).await.unwrap();

    let upcoming = scheduler.upcoming_for("u1", now).await.unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].scheduled_date, now + Duration::days(1));

    let all = scheduler.list_schedules("u1").await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[0].scheduled_date <= all[1].scheduled_date);
}

#[tokio::test]
async fn test_scheduleRehearsal_midBatchFailure_shouldReportPartialBatch() {
    let store = MockStore::fail_writes_after(5);
    let scheduler = mock_scheduler(store.clone());

    let report = scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "jn3-16", "John 3:16").every(7), fixed_now())
        .await
        .expect("Partial batches are reported, not raised");

    assert_eq!(report.planned, 12);
    assert_eq!(report.written_ids().len(), 5);
    assert!(!report.is_complete());
    assert!(matches!(report.failure(), Some(StoreError::WriteFailed(_))));
    assert!(matches!(report.outcomes.last(), Some(WriteOutcome::Failed { .. })));
    assert_eq!(store.inner().schedule_count(), 5);
    assert_eq!(store.write_attempts(), 6);
}

#[tokio::test]
async fn test_scheduleRehearsal_firstWriteFails_shouldBeStoreFailure() {
    let scheduler = mock_scheduler(MockStore::failing());

    let result = scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "ps23", "Psalm 23:1"), fixed_now())
        .await;

    assert!(matches!(result, Err(ScheduleError::StoreFailure(StoreError::WriteFailed(_)))));
}

#[tokio::test]
async fn test_completeRehearsal_successorWriteFails_shouldStillComplete() {
    // schedule, merge, then the successor write fails
    let store = MockStore::fail_writes_after(2);
    let scheduler = mock_scheduler(store.clone());

    let report = scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "ps23", "Psalm 23:1"), fixed_now())
        .await
        .unwrap();
    let completion = scheduler
        .complete_rehearsal(&report.first_id, 92, fixed_now())
        .await
        .unwrap();

    assert!(completion.successor_failed());
    let stored = store.inner().get_schedule(&report.first_id).await.unwrap().unwrap();
    assert!(stored.completed);
    assert_eq!(store.inner().schedule_count(), 1);
}

#[tokio::test]
async fn test_completeRehearsal_failingReads_shouldBeStoreFailure() {
    let scheduler = mock_scheduler(MockStore::failing_reads());

    let result = scheduler.complete_rehearsal("any", 80, fixed_now()).await;

    assert!(matches!(result, Err(ScheduleError::StoreFailure(StoreError::ReadFailed(_)))));
}

#[tokio::test]
async fn test_scheduleRehearsal_zeroFrequency_shouldFallBackToAdaptive() {
    let (scheduler, store) = memory_scheduler();

    let report = scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "ps23", "Psalm 23:1").every(0), fixed_now())
        .await
        .unwrap();

    assert_eq!(report.planned, 1);
    assert!(report.recurring_id.is_none());
    let schedule = store.get_schedule(&report.first_id).await.unwrap().unwrap();
    assert_eq!(schedule.frequency_days, None);
    assert!(!schedule.is_recurring());

    let completion = scheduler.complete_rehearsal(&report.first_id, 90, fixed_now()).await.unwrap();
    assert!(completion.successor.is_some());
}

#[tokio::test]
async fn test_scheduleRehearsal_initialFlag_shouldPickDelayOrFirstInterval() {
    let store = MemoryStore::new();
    let config = SchedulingConfig {
        initial_delay_days: 2,
        intervals_days: vec![5, 10, 20],
        ..SchedulingConfig::default()
    };
    let scheduler = RehearsalScheduler::new(store.clone(), config);

    let initial = scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "ps23", "Psalm 23:1"), fixed_now())
        .await
        .unwrap();
    let follow_up = scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "ps23", "Psalm 23:1").initial(false), fixed_now())
        .await
        .unwrap();

    let initial = store.get_schedule(&initial.first_id).await.unwrap().unwrap();
    let follow_up = store.get_schedule(&follow_up.first_id).await.unwrap().unwrap();
    assert_eq!(initial.scheduled_date, fixed_now() + Duration::days(2));
    assert_eq!(follow_up.scheduled_date, fixed_now() + Duration::days(5));
}

#[tokio::test]
async fn test_scheduleRehearsal_hugeFrequency_shouldBeInvalidWithoutWrites() {
    let store = MockStore::working();
    let scheduler = mock_scheduler(store.clone());

    let result = scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "ps23", "Psalm 23:1").every(100_000_000), fixed_now())
        .await;

    assert!(matches!(result, Err(ScheduleError::InvalidRequest(_))));
    assert_eq!(store.write_attempts(), 0);
}

#[tokio::test]
async fn test_scheduleRehearsal_batchPastLastDate_shouldBeInvalidWithoutWrites() {
    let store = MockStore::working();
    let scheduler = mock_scheduler(store.clone());
    let near_end = DateTime::<Utc>::MAX_UTC - Duration::days(3);

    let result = scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "ps23", "Psalm 23:1").on(near_end).every(7), fixed_now())
        .await;

    assert!(matches!(result, Err(ScheduleError::InvalidRequest(_))));
    assert_eq!(store.write_attempts(), 0);
}

#[tokio::test]
async fn test_completeRehearsal_nextDatePastLastDate_shouldLeaveRecordOpen() {
    let (scheduler, store) = memory_scheduler();
    let near_end = DateTime::<Utc>::MAX_UTC - Duration::days(3);
    let report = scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "ps23", "Psalm 23:1").on(near_end), fixed_now())
        .await
        .unwrap();

    let result = scheduler
        .complete_rehearsal(&report.first_id, 95, DateTime::<Utc>::MAX_UTC)
        .await;

    assert!(matches!(result, Err(ScheduleError::InvalidRequest(_))));
    let stored = store.get_schedule(&report.first_id).await.unwrap().unwrap();
    assert!(!stored.completed);
    assert_eq!(store.schedule_count(), 1);
}
