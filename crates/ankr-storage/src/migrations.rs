//! Database schema migrations.
//!
//! Applies the initial schema: action_calls, activity_log, the site-content
//! tables (topics, notes, change_requests, site_settings), and the
//! schema_migrations bookkeeping table.

use rusqlite::Connection;
use tracing::info;

use ankr_core::error::AnkrError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), AnkrError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| AnkrError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| AnkrError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<(), AnkrError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS action_calls (
            id                  TEXT PRIMARY KEY NOT NULL,
            thread_id           TEXT,
            source_message_id   TEXT,
            requested_by        TEXT NOT NULL,
            action_name         TEXT NOT NULL,
            params              TEXT NOT NULL DEFAULT '{}',
            status              TEXT NOT NULL DEFAULT 'requested'
                                CHECK (status IN ('requested', 'acknowledged', 'executing',
                                                  'succeeded', 'failed', 'cancelled')),
            acknowledged_by     TEXT,
            executed_by         TEXT,
            executed_at         INTEGER,
            status_info         TEXT,
            created_at          INTEGER NOT NULL,
            updated_at          INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_action_calls_status_created
            ON action_calls (status, created_at ASC);

        CREATE INDEX IF NOT EXISTS idx_action_calls_thread
            ON action_calls (thread_id)
            WHERE thread_id IS NOT NULL;

        -- Best-effort audit trail; deliberately no foreign key.
        CREATE TABLE IF NOT EXISTS activity_log (
            id              TEXT PRIMARY KEY NOT NULL,
            action_call_id  TEXT NOT NULL,
            event           TEXT NOT NULL,
            detail          TEXT,
            created_at      INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_activity_log_action
            ON activity_log (action_call_id, created_at ASC);

        CREATE TABLE IF NOT EXISTS topics (
            id          TEXT PRIMARY KEY NOT NULL,
            title       TEXT NOT NULL,
            created_at  INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS notes (
            id          TEXT PRIMARY KEY NOT NULL,
            thread_id   TEXT,
            body        TEXT NOT NULL,
            created_at  INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS change_requests (
            id          TEXT PRIMARY KEY NOT NULL,
            field       TEXT NOT NULL,
            value       TEXT NOT NULL,
            note        TEXT,
            status      TEXT NOT NULL DEFAULT 'open'
                        CHECK (status IN ('open', 'applied', 'rejected')),
            created_at  INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_change_requests_status
            ON change_requests (status, created_at ASC);

        CREATE TABLE IF NOT EXISTS site_settings (
            key         TEXT PRIMARY KEY NOT NULL,
            value       TEXT NOT NULL,
            updated_at  INTEGER NOT NULL
        );

        INSERT INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| AnkrError::Storage(format!("Migration v1 failed: {}", e)))?;

    Ok(())
}
