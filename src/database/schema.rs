/*!
 * Database schema definitions and migrations.
 *
 * Timestamps are stored as RFC 3339 text in UTC with millisecond
 * precision, so lexical order matches chronological order.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

const SCHEMA_VERSION_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_version (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        version INTEGER NOT NULL,
        updated_at TEXT NOT NULL
    );
"#;

const REHEARSALS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS rehearsals (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        verse_id TEXT NOT NULL,
        reference TEXT NOT NULL,
        scheduled_date TEXT NOT NULL,
        completed INTEGER NOT NULL DEFAULT 0,
        completed_at TEXT,
        accuracy INTEGER CHECK (accuracy BETWEEN 0 AND 100),
        next_rehearsal_date TEXT,
        frequency_days INTEGER CHECK (frequency_days > 0),
        recurring_id TEXT,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_rehearsals_user_date ON rehearsals(user_id, scheduled_date);
    CREATE INDEX IF NOT EXISTS idx_rehearsals_user_verse ON rehearsals(user_id, verse_id, completed);
    CREATE INDEX IF NOT EXISTS idx_rehearsals_recurring ON rehearsals(recurring_id);
"#;

const PRACTICE_ATTEMPTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS practice_attempts (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        verse_id TEXT NOT NULL,
        input_text TEXT NOT NULL,
        score INTEGER NOT NULL CHECK (score BETWEEN 0 AND 100),
        mistakes TEXT NOT NULL DEFAULT '[]',
        used_speech_input INTEGER NOT NULL DEFAULT 0,
        timestamp TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_attempts_user_verse ON practice_attempts(user_id, verse_id, timestamp);
"#;

/// Create or upgrade the schema
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Initializing database schema v{}", SCHEMA_VERSION);
        create_all_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!("Migrating database schema from v{} to v{}", current_version, SCHEMA_VERSION);
        migrate_schema(conn, current_version)?;
    } else {
        debug!("Database schema is up to date (v{})", current_version);
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> Result<i32> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )
        .context("Failed to check schema_version table existence")?;

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .unwrap_or(0);

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

fn create_all_tables(conn: &Connection) -> Result<()> {
    // WAL keeps readers unblocked during the sequential batch writes
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    conn.execute_batch(SCHEMA_VERSION_TABLE)?;
    conn.execute_batch(REHEARSALS_TABLE).context("Failed to create rehearsals table")?;
    conn.execute_batch(PRACTICE_ATTEMPTS_TABLE)
        .context("Failed to create practice_attempts table")?;

    Ok(())
}

fn migrate_schema(conn: &Connection, from_version: i32) -> Result<()> {
    let mut current = from_version;

    while current < SCHEMA_VERSION {
        match current {
            1 => {
                migrate_v1_to_v2(conn)?;
                current = 2;
            }
            _ => {
                return Err(anyhow::anyhow!("Unknown schema version: {}. Cannot migrate.", current));
            }
        }
    }

    set_schema_version(conn, SCHEMA_VERSION)?;
    info!("Schema migration completed to v{}", SCHEMA_VERSION);
    Ok(())
}

/// v1 only knew rehearsals
fn migrate_v1_to_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(PRACTICE_ATTEMPTS_TABLE)
        .context("Failed to add practice_attempts table")?;
    Ok(())
}
