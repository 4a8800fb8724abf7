/*!
 * SQLite handle shared by the rehearsal store and the practice history.
 *
 * One connection sits behind a mutex; async callers hop onto tokio's
 * blocking pool before touching it.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::schema;

/// `<data dir>/verserecall/verserecall.db`
const APP_DIR: &str = "verserecall";
const DB_FILE: &str = "verserecall.db";

const IN_MEMORY: &str = ":memory:";

/// Shared handle to the verserecall database
#[derive(Clone)]
pub struct DatabaseConnection {
    location: PathBuf,
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for DatabaseConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DatabaseConnection").field(&self.location).finish()
    }
}

impl DatabaseConnection {
    /// Open the rehearsal database in the user's data directory
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    /// Open the rehearsal database at `location`, creating the file,
    /// its directory and the tables as needed
    pub fn open<P: AsRef<Path>>(location: P) -> Result<Self> {
        let location = location.as_ref().to_path_buf();

        if let Some(dir) = location.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create directory for rehearsal database {:?}", dir))?;
        }

        info!("Using rehearsal database {:?}", location);
        let conn = Connection::open(&location)
            .with_context(|| format!("Cannot open rehearsal database {:?}", location))?;

        Self::prepared(location, conn)
    }

    /// Throwaway database living only as long as the handle
    pub fn open_in_memory() -> Result<Self> {
        debug!("Opening scratch rehearsal database in memory");
        let conn = Connection::open_in_memory().context("Cannot open in-memory rehearsal database")?;
        Self::prepared(PathBuf::from(IN_MEMORY), conn)
    }

    fn prepared(location: PathBuf, conn: Connection) -> Result<Self> {
        schema::initialize_schema(&conn)?;
        Ok(Self {
            location,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
            .context("No data directory to keep rehearsals in")?;

        Ok(data_dir.join(APP_DIR).join(DB_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.location
    }

    fn is_in_memory(&self) -> bool {
        self.location.as_os_str() == IN_MEMORY
    }

    /// Run `f` against the connection on the calling thread
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        f(&*self.conn.lock())
    }

    /// Run `f` against the connection on the blocking pool
    pub async fn with_conn_blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || f(&*conn.lock()))
            .await
            .context("Rehearsal database task panicked")?
    }

    /// How many rehearsals and attempts are stored, and the file size
    pub fn stats(&self) -> Result<DatabaseStats> {
        let file_size_bytes = if self.is_in_memory() {
            0
        } else {
            std::fs::metadata(&self.location).map(|meta| meta.len()).unwrap_or(0)
        };

        self.with_conn(|conn| {
            let scalar = |sql: &str| -> Result<i64> { Ok(conn.query_row(sql, [], |row| row.get(0))?) };

            Ok(DatabaseStats {
                rehearsal_count: scalar("SELECT COUNT(*) FROM rehearsals")?,
                completed_count: scalar("SELECT COUNT(*) FROM rehearsals WHERE completed = 1")?,
                attempt_count: scalar("SELECT COUNT(*) FROM practice_attempts")?,
                file_size_bytes,
            })
        })
    }
}

/// Stored rehearsals and practice attempts
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub rehearsal_count: i64,
    pub completed_count: i64,
    pub attempt_count: i64,
    pub file_size_bytes: u64,
}

impl DatabaseStats {
    pub fn open_count(&self) -> i64 {
        self.rehearsal_count - self.completed_count
    }
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rehearsals ({} open), {} practice attempts, {} KB on disk",
            self.rehearsal_count,
            self.open_count(),
            self.attempt_count,
            self.file_size_bytes / 1024
        )
    }
}
