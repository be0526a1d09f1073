//! SQLite handle shared by the action call and site repositories.
//!
//! Every write in this crate is a single statement, so one serialized
//! connection is enough; the schema is brought up to date on open.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use ankr_core::error::AnkrError;

use crate::migrations;

/// The ankr database. Cheap to share as `Arc<Database>`.
pub struct Database {
    conn: Mutex<Connection>,
}

const FILE_PRAGMAS: &str = "PRAGMA journal_mode = WAL;
     PRAGMA synchronous = NORMAL;
     PRAGMA foreign_keys = ON;
     PRAGMA busy_timeout = 5000;";

const MEMORY_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

impl Database {
    /// Open `ankr.db` (or any path), creating parent directories as needed.
    ///
    /// WAL lets the pump CLI read while a server holds the same file.
    pub fn new(path: &Path) -> Result<Self, AnkrError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(|e| {
            AnkrError::Storage(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let db = Self::migrated(conn, FILE_PRAGMAS)?;
        info!(path = %path.display(), "Database ready");
        Ok(db)
    }

    /// Fresh migrated database that lives only as long as this value.
    pub fn in_memory() -> Result<Self, AnkrError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AnkrError::Storage(format!("Failed to open in-memory db: {}", e)))?;
        Self::migrated(conn, MEMORY_PRAGMAS)
    }

    fn migrated(conn: Connection, pragmas: &str) -> Result<Self, AnkrError> {
        conn.execute_batch(pragmas)
            .map_err(|e| AnkrError::Storage(format!("Failed to set pragmas: {}", e)))?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Run `f` with exclusive use of the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, AnkrError>
    where
        F: FnOnce(&Connection) -> Result<T, AnkrError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| AnkrError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_database() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM action_calls", [], |row| row.get(0))
                .map_err(|e| AnkrError::Storage(e.to_string()))?;
            assert_eq!(count, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ankr.db");
        let db = Database::new(&path).unwrap();

        db.with_conn(|conn| {
            let mode: String = conn
                .query_row("PRAGMA journal_mode", [], |row| row.get(0))
                .map_err(|e| AnkrError::Storage(e.to_string()))?;
            assert_eq!(mode, "wal");
            Ok(())
        })
        .unwrap();

        assert!(path.exists());
    }
}
