/*!
 * SQLite repository tests through the store traits
 */

use chrono::Duration;

use verserecall::database::{DatabaseConnection, Repository};
use verserecall::practice::PracticeRecorder;
use verserecall::recall::AligningScorer;
use verserecall::rehearsal::{RehearsalSchedule, RehearsalScheduler, ScheduleRequest};
use verserecall::store::{AttemptStore, ScheduleOrder, ScheduleQuery, ScheduleStore};

use crate::common::{fixed_now, init_logging, temp_database};

fn in_memory_repo() -> Repository {
    init_logging();
    Repository::new_in_memory().expect("Failed to create test repository")
}

#[tokio::test]
async fn test_putSchedule_shouldRoundTripEveryField() {
    let repo = in_memory_repo();
    let mut schedule = RehearsalSchedule::pending("u1", "jn3-16", "John 3:16", fixed_now(), fixed_now())
        .with_recurrence("batch-1", 7);
    schedule.completed = true;
    schedule.completed_at = Some(fixed_now() + Duration::minutes(5));
    schedule.accuracy = Some(93);
    schedule.next_rehearsal_date = Some(fixed_now() + Duration::days(7));

    repo.put_schedule(&schedule).await.unwrap();

    let stored = repo.get_schedule(&schedule.id).await.unwrap();
    assert_eq!(stored, Some(schedule));
}

#[tokio::test]
async fn test_getSchedule_unknownId_shouldBeNone() {
    let repo = in_memory_repo();
    assert_eq!(repo.get_schedule("missing").await.unwrap(), None);
}

#[tokio::test]
async fn test_querySchedules_shouldFilterOrderAndLimit() {
    let repo = in_memory_repo();
    let now = fixed_now();
    for (user, verse, days, completed) in [
        ("u1", "a", 3, false),
        ("u1", "a", 1, true),
        ("u1", "b", 2, false),
        ("u2", "a", 0, false),
    ] {
        let mut schedule = RehearsalSchedule::pending(user, verse, "Psalm 23:1", now + Duration::days(days), now);
        schedule.completed = completed;
        repo.put_schedule(&schedule).await.unwrap();
    }

    let u1 = repo.query_schedules(&ScheduleQuery::for_user("u1")).await.unwrap();
    let offsets: Vec<i64> = u1.iter().map(|s| (s.scheduled_date - now).num_days()).collect();
    assert_eq!(offsets, vec![1, 2, 3]);

    let open_a = repo
        .query_schedules(&ScheduleQuery::for_user("u1").verse("a").completed(false))
        .await
        .unwrap();
    assert_eq!(open_a.len(), 1);

    let latest = repo
        .query_schedules(&ScheduleQuery::for_user("u1").order(ScheduleOrder::ScheduledDesc).limit(1))
        .await
        .unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].scheduled_date, now + Duration::days(3));
}

#[tokio::test]
async fn test_scheduler_onRepository_shouldPersistRecurringBatch() {
    let repo = in_memory_repo();
    let scheduler = RehearsalScheduler::with_defaults(repo.clone());

    let report = scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "jn3-16", "John 3:16").every(7), fixed_now())
        .await
        .unwrap();

    assert!(report.is_complete());
    let stats = repo.stats().unwrap();
    assert_eq!(stats.rehearsal_count, 12);
    assert_eq!(stats.completed_count, 0);
}

#[tokio::test]
async fn test_scheduler_onRepository_shouldCountPriorCompletions() {
    let repo = in_memory_repo();
    let scheduler = RehearsalScheduler::with_defaults(repo.clone());

    let report = scheduler
        .schedule_rehearsal(&ScheduleRequest::new("u1", "ps23", "Psalm 23:1"), fixed_now())
        .await
        .unwrap();
    let first = scheduler.complete_rehearsal(&report.first_id, 80, fixed_now()).await.unwrap();
    let successor_id = first.successor.unwrap().schedule_id().to_string();
    let second = scheduler.complete_rehearsal(&successor_id, 85, fixed_now()).await.unwrap();

    assert_eq!(second.completed_count, 1);
    assert_eq!(second.next_rehearsal_date, fixed_now() + Duration::days(3));
    assert_eq!(repo.stats().unwrap().completed_count, 2);
}

#[tokio::test]
async fn test_attempts_shouldPersistInTimestampOrder() {
    let repo = in_memory_repo();
    let recorder = PracticeRecorder::new(AligningScorer::default(), 90, repo.clone());

    recorder
        .practice("u1", "ps23", "the lord", "the lord is my shepherd", false, fixed_now() + Duration::hours(1))
        .await
        .unwrap();
    recorder
        .practice("u1", "ps23", "the lord is my shepherd", "the lord is my shepherd", true, fixed_now())
        .await
        .unwrap();
    recorder
        .practice("u1", "jn3-16", "for god", "for god so loved", false, fixed_now())
        .await
        .unwrap();

    let attempts = repo.query_attempts("u1", Some("ps23")).await.unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].score, 100);
    assert!(attempts[0].used_speech_input);
    assert_eq!(attempts[1].mistakes.len(), 3);

    assert_eq!(repo.query_attempts("u1", None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_repository_onDisk_shouldSurviveReopen() {
    init_logging();
    let (_dir, path) = temp_database();

    let schedule = RehearsalSchedule::pending("u1", "ps23", "Psalm 23:1", fixed_now(), fixed_now());
    {
        let repo = Repository::new(DatabaseConnection::open(&path).unwrap());
        repo.put_schedule(&schedule).await.unwrap();
    }

    let reopened = Repository::new(DatabaseConnection::open(&path).unwrap());
    assert_eq!(reopened.get_schedule(&schedule.id).await.unwrap(), Some(schedule));
}
