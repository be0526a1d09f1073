//! Site-content tables written by the built-in action executors.
//!
//! Topics, notes, change requests, and key/value site settings. These are
//! plain CRUD helpers; none of them know about action call lifecycle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use ankr_core::error::AnkrError;
use ankr_core::types::now_millis;

use crate::db::Database;

/// A blog/content topic.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicRow {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// A free-text note, optionally tied to a conversation thread.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteRow {
    pub id: Uuid,
    pub thread_id: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A proposed change to a site field, awaiting review.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRequestRow {
    pub id: Uuid,
    pub field: String,
    pub value: String,
    pub note: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Repository over the site-content tables.
pub struct SiteRepository {
    db: Arc<Database>,
}

impl SiteRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a topic and return it.
    pub fn create_topic(&self, title: &str) -> Result<TopicRow, AnkrError> {
        let row = TopicRow {
            id: Uuid::new_v4(),
            title: title.to_string(),
            created_at: now_millis(),
        };
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO topics (id, title, created_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![row.id.to_string(), row.title, row.created_at.timestamp_millis()],
            )
            .map_err(|e| AnkrError::Storage(format!("Failed to create topic: {}", e)))?;
            Ok(())
        })?;
        Ok(row)
    }

    /// Whether a topic with this title (case-insensitive) already exists.
    pub fn topic_exists(&self, title: &str) -> Result<bool, AnkrError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM topics WHERE lower(title) = lower(?1)",
                    rusqlite::params![title],
                    |row| row.get(0),
                )
                .map_err(|e| AnkrError::Storage(e.to_string()))?;
            Ok(count > 0)
        })
    }

    /// Insert a note and return it.
    pub fn save_note(&self, thread_id: Option<&str>, body: &str) -> Result<NoteRow, AnkrError> {
        let row = NoteRow {
            id: Uuid::new_v4(),
            thread_id: thread_id.map(str::to_string),
            body: body.to_string(),
            created_at: now_millis(),
        };
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notes (id, thread_id, body, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    row.id.to_string(),
                    row.thread_id,
                    row.body,
                    row.created_at.timestamp_millis(),
                ],
            )
            .map_err(|e| AnkrError::Storage(format!("Failed to save note: {}", e)))?;
            Ok(())
        })?;
        Ok(row)
    }

    /// Count stored notes.
    pub fn note_count(&self) -> Result<u64, AnkrError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))
                .map_err(|e| AnkrError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }

    /// Insert an open change request and return it.
    pub fn create_change_request(
        &self,
        field: &str,
        value: &str,
        note: Option<&str>,
    ) -> Result<ChangeRequestRow, AnkrError> {
        let row = ChangeRequestRow {
            id: Uuid::new_v4(),
            field: field.to_string(),
            value: value.to_string(),
            note: note.map(str::to_string),
            status: "open".to_string(),
            created_at: now_millis(),
        };
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO change_requests (id, field, value, note, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    row.id.to_string(),
                    row.field,
                    row.value,
                    row.note,
                    row.status,
                    row.created_at.timestamp_millis(),
                ],
            )
            .map_err(|e| AnkrError::Storage(format!("Failed to create change request: {}", e)))?;
            Ok(())
        })?;
        Ok(row)
    }

    /// Open change requests, oldest first, optionally for a single field.
    pub fn open_change_requests(
        &self,
        field: Option<&str>,
    ) -> Result<Vec<ChangeRequestRow>, AnkrError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, field, value, note, status, created_at
                     FROM change_requests
                     WHERE status = 'open' AND (?1 IS NULL OR field = ?1)
                     ORDER BY created_at ASC, rowid ASC",
                )
                .map_err(|e| AnkrError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![field], |row| Ok(row_to_change_request(row)))
                .map_err(|e| AnkrError::Storage(e.to_string()))?;

            let mut result = Vec::new();
            for row in rows {
                result.push(row.map_err(|e| AnkrError::Storage(e.to_string()))??);
            }
            Ok(result)
        })
    }

    /// Read a site setting.
    pub fn get_setting(&self, key: &str) -> Result<Option<String>, AnkrError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM site_settings WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| AnkrError::Storage(e.to_string()))
        })
    }

    /// Insert or replace a site setting.
    pub fn put_setting(&self, key: &str, value: &str) -> Result<(), AnkrError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO site_settings (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                updated_at = excluded.updated_at",
                rusqlite::params![key, value, now_millis().timestamp_millis()],
            )
            .map_err(|e| AnkrError::Storage(format!("Failed to write setting: {}", e)))?;
            Ok(())
        })
    }
}

fn row_to_change_request(row: &rusqlite::Row<'_>) -> Result<ChangeRequestRow, AnkrError> {
    let get_err = |e: rusqlite::Error| AnkrError::Storage(e.to_string());
    let id: String = row.get(0).map_err(get_err)?;
    let created_at: i64 = row.get(5).map_err(get_err)?;

    Ok(ChangeRequestRow {
        id: Uuid::parse_str(&id).map_err(|e| AnkrError::Storage(format!("Invalid UUID: {}", e)))?,
        field: row.get(1).map_err(get_err)?,
        value: row.get(2).map_err(get_err)?,
        note: row.get(3).map_err(get_err)?,
        status: row.get(4).map_err(get_err)?,
        created_at: DateTime::from_timestamp_millis(created_at)
            .ok_or_else(|| AnkrError::Storage(format!("Invalid timestamp: {}", created_at)))?,
    })
}
