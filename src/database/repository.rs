/*!
 * Repository layer for database operations.
 *
 * High-level async API over the SQLite tables. `Repository` also
 * implements the store traits, so the scheduler and the practice recorder
 * can run against it directly.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension};

use super::connection::{DatabaseConnection, DatabaseStats};
use super::models::{format_timestamp, AttemptRecord, RehearsalRecord};
use crate::errors::StoreError;
use crate::practice::models::PracticeAttempt;
use crate::rehearsal::models::{CompletionUpdate, RehearsalSchedule};
use crate::store::{AttemptStore, ScheduleOrder, ScheduleQuery, ScheduleStore};

/// Repository for database operations
#[derive(Clone, Debug)]
pub struct Repository {
    db: DatabaseConnection,
}

impl Repository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::open_default()?))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::open_in_memory()?))
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn stats(&self) -> Result<DatabaseStats> {
        self.db.stats()
    }

    // =========================================================================
    // Rehearsal Operations
    // =========================================================================

    /// Insert or replace a rehearsal row
    pub async fn upsert_rehearsal(&self, record: RehearsalRecord) -> Result<()> {
        self.db
            .with_conn_blocking(move |conn| {
                conn.execute(
                    r#"
                    INSERT OR REPLACE INTO rehearsals (
                        id, user_id, verse_id, reference, scheduled_date, completed, completed_at,
                        accuracy, next_rehearsal_date, frequency_days, recurring_id, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                    "#,
                    params![
                        record.id,
                        record.user_id,
                        record.verse_id,
                        record.reference,
                        record.scheduled_date,
                        record.completed,
                        record.completed_at,
                        record.accuracy,
                        record.next_rehearsal_date,
                        record.frequency_days,
                        record.recurring_id,
                        record.created_at,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Get a rehearsal row by ID
    pub async fn get_rehearsal(&self, id: &str) -> Result<Option<RehearsalRecord>> {
        let id = id.to_string();

        self.db
            .with_conn_blocking(move |conn| {
                let sql = format!("SELECT {} FROM rehearsals WHERE id = ?1", RehearsalRecord::COLUMNS);
                let record = conn.query_row(&sql, [&id], RehearsalRecord::from_row).optional()?;
                Ok(record)
            })
            .await
    }

    /// Set the completion columns of a rehearsal; returns the rows touched
    pub async fn mark_completed(&self, id: &str, update: CompletionUpdate) -> Result<usize> {
        let id = id.to_string();

        self.db
            .with_conn_blocking(move |conn| {
                let updated = conn.execute(
                    r#"
                    UPDATE rehearsals
                    SET completed = 1, completed_at = ?2, accuracy = ?3, next_rehearsal_date = ?4
                    WHERE id = ?1
                    "#,
                    params![
                        id,
                        format_timestamp(&update.completed_at),
                        i64::from(update.accuracy),
                        format_timestamp(&update.next_rehearsal_date),
                    ],
                )?;
                Ok(updated)
            })
            .await
    }

    /// Rehearsal rows matching a query
    pub async fn find_rehearsals(&self, query: &ScheduleQuery) -> Result<Vec<RehearsalRecord>> {
        let (sql, values) = build_rehearsal_query(query);
        debug!("Rehearsal query: {}", sql);

        self.db
            .with_conn_blocking(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let records = stmt
                    .query_map(params_from_iter(values), RehearsalRecord::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(records)
            })
            .await
    }

    // =========================================================================
    // Practice Attempt Operations
    // =========================================================================

    pub async fn insert_attempt(&self, record: AttemptRecord) -> Result<()> {
        self.db
            .with_conn_blocking(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO practice_attempts (
                        id, user_id, verse_id, input_text, score, mistakes, used_speech_input, timestamp
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    "#,
                    params![
                        record.id,
                        record.user_id,
                        record.verse_id,
                        record.input_text,
                        record.score,
                        record.mistakes,
                        record.used_speech_input,
                        record.timestamp,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Attempt rows of a user, optionally for one passage, oldest first
    pub async fn find_attempts(&self, user_id: &str, verse_id: Option<&str>) -> Result<Vec<AttemptRecord>> {
        let user_id = user_id.to_string();
        let verse_id = verse_id.map(str::to_string);

        self.db
            .with_conn_blocking(move |conn| {
                let sql = format!(
                    "SELECT {} FROM practice_attempts WHERE user_id = ?1 AND (?2 IS NULL OR verse_id = ?2) \
                     ORDER BY timestamp ASC",
                    AttemptRecord::COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let records = stmt
                    .query_map(params![user_id, verse_id], AttemptRecord::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(records)
            })
            .await
    }
}

/// SELECT statement and bound values for a schedule query
fn build_rehearsal_query(query: &ScheduleQuery) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();

    if let Some(user_id) = &query.user_id {
        values.push(Value::Text(user_id.clone()));
        clauses.push(format!("user_id = ?{}", values.len()));
    }
    if let Some(verse_id) = &query.verse_id {
        values.push(Value::Text(verse_id.clone()));
        clauses.push(format!("verse_id = ?{}", values.len()));
    }
    if let Some(completed) = query.completed {
        values.push(Value::Integer(i64::from(completed)));
        clauses.push(format!("completed = ?{}", values.len()));
    }
    if let Some(recurring_id) = &query.recurring_id {
        values.push(Value::Text(recurring_id.clone()));
        clauses.push(format!("recurring_id = ?{}", values.len()));
    }

    let mut sql = format!("SELECT {} FROM rehearsals", RehearsalRecord::COLUMNS);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    let direction = match query.order {
        ScheduleOrder::ScheduledAsc => "ASC",
        ScheduleOrder::ScheduledDesc => "DESC",
    };
    sql.push_str(&format!(" ORDER BY scheduled_date {0}, created_at {0}", direction));

    if let Some(limit) = query.limit {
        values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        sql.push_str(&format!(" LIMIT ?{}", values.len()));
    }

    (sql, values)
}

fn read_failed(error: anyhow::Error) -> StoreError {
    StoreError::ReadFailed(format!("{:#}", error))
}

fn write_failed(error: anyhow::Error) -> StoreError {
    StoreError::WriteFailed(format!("{:#}", error))
}

fn decode_schedule(record: RehearsalRecord) -> Result<RehearsalSchedule, StoreError> {
    let id = record.id.clone();
    record.into_schedule().map_err(|e| StoreError::Corrupt {
        id,
        message: format!("{:#}", e),
    })
}

#[async_trait]
impl ScheduleStore for Repository {
    async fn get_schedule(&self, id: &str) -> Result<Option<RehearsalSchedule>, StoreError> {
        self.get_rehearsal(id)
            .await
            .map_err(read_failed)?
            .map(decode_schedule)
            .transpose()
    }

    async fn put_schedule(&self, schedule: &RehearsalSchedule) -> Result<(), StoreError> {
        self.upsert_rehearsal(RehearsalRecord::from_schedule(schedule))
            .await
            .map_err(write_failed)
    }

    async fn merge_completion(&self, id: &str, update: &CompletionUpdate) -> Result<(), StoreError> {
        let updated = self.mark_completed(id, *update).await.map_err(write_failed)?;
        if updated == 0 {
            return Err(StoreError::WriteFailed(format!("No schedule with id {}", id)));
        }
        Ok(())
    }

    async fn query_schedules(&self, query: &ScheduleQuery) -> Result<Vec<RehearsalSchedule>, StoreError> {
        self.find_rehearsals(query)
            .await
            .map_err(read_failed)?
            .into_iter()
            .map(decode_schedule)
            .collect()
    }
}

#[async_trait]
impl AttemptStore for Repository {
    async fn put_attempt(&self, attempt: &PracticeAttempt) -> Result<(), StoreError> {
        let record = AttemptRecord::from_attempt(attempt).map_err(write_failed)?;
        self.insert_attempt(record).await.map_err(write_failed)
    }

    async fn query_attempts(&self, user_id: &str, verse_id: Option<&str>) -> Result<Vec<PracticeAttempt>, StoreError> {
        self.find_attempts(user_id, verse_id)
            .await
            .map_err(read_failed)?
            .into_iter()
            .map(|record| {
                let id = record.id.clone();
                record.into_attempt().map_err(|e| StoreError::Corrupt {
                    id,
                    message: format!("{:#}", e),
                })
            })
            .collect()
    }
}
