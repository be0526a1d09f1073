//! Action call persistence.
//!
//! [`ActionCallStore`] is the seam the lifecycle controller writes through;
//! [`ActionCallRepository`] is its SQLite implementation. All writes are
//! single-row and keyed by id.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use ankr_core::error::AnkrError;
use ankr_core::types::{ActionCall, ActionCallStatus, ActivityEntry};

use crate::db::Database;

/// Persistence operations required by the action lifecycle.
pub trait ActionCallStore: Send + Sync {
    /// Insert a new row. Fails if the id already exists.
    fn insert(&self, call: &ActionCall) -> Result<(), AnkrError>;

    /// Look up a row by id.
    fn find_by_id(&self, id: Uuid) -> Result<Option<ActionCall>, AnkrError>;

    /// Write the mutable lifecycle columns of an existing row.
    ///
    /// Identity, `params`, and `created_at` are never rewritten.
    fn update(&self, call: &ActionCall) -> Result<(), AnkrError>;

    /// Rows in the given status, oldest first (FIFO).
    fn oldest_with_status(
        &self,
        status: ActionCallStatus,
        limit: u32,
    ) -> Result<Vec<ActionCall>, AnkrError>;

    /// Rows optionally filtered by status, newest first.
    fn list(&self, status: Option<ActionCallStatus>, limit: u32)
        -> Result<Vec<ActionCall>, AnkrError>;

    /// Append an activity trail entry.
    fn record_activity(&self, entry: &ActivityEntry) -> Result<(), AnkrError>;
}

const SELECT_COLUMNS: &str = "SELECT id, thread_id, source_message_id, requested_by, action_name,
        params, status, acknowledged_by, executed_by, executed_at, status_info,
        created_at, updated_at
     FROM action_calls";

/// SQLite-backed action call repository.
pub struct ActionCallRepository {
    db: Arc<Database>,
}

impl ActionCallRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Activity entries for one action call, oldest first.
    pub fn activity_for(&self, action_call_id: Uuid) -> Result<Vec<ActivityEntry>, AnkrError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, action_call_id, event, detail, created_at
                     FROM activity_log
                     WHERE action_call_id = ?1
                     ORDER BY created_at ASC, rowid ASC",
                )
                .map_err(|e| AnkrError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![action_call_id.to_string()], |row| {
                    Ok(row_to_activity(row))
                })
                .map_err(|e| AnkrError::Storage(e.to_string()))?;

            let mut entries = Vec::new();
            for row in rows {
                entries.push(row.map_err(|e| AnkrError::Storage(e.to_string()))??);
            }
            Ok(entries)
        })
    }

    fn query_calls(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::types::ToSql],
    ) -> Result<Vec<ActionCall>, AnkrError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(sql)
                .map_err(|e| AnkrError::Storage(format!("Action call query prepare: {}", e)))?;

            let rows = stmt
                .query_map(params, |row| Ok(row_to_action_call(row)))
                .map_err(|e| AnkrError::Storage(format!("Action call query: {}", e)))?;

            let mut calls = Vec::new();
            for row in rows {
                calls.push(row.map_err(|e| AnkrError::Storage(e.to_string()))??);
            }
            Ok(calls)
        })
    }
}

impl ActionCallStore for ActionCallRepository {
    fn insert(&self, call: &ActionCall) -> Result<(), AnkrError> {
        let params = serde_json::to_string(&call.params)?;
        let status_info = call
            .status_info
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO action_calls (id, thread_id, source_message_id, requested_by,
                    action_name, params, status, acknowledged_by, executed_by, executed_at,
                    status_info, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                rusqlite::params![
                    call.id.to_string(),
                    call.thread_id,
                    call.source_message_id,
                    call.requested_by,
                    call.action_name,
                    params,
                    call.status.as_str(),
                    call.acknowledged_by,
                    call.executed_by,
                    call.executed_at.map(|t| t.timestamp_millis()),
                    status_info,
                    call.created_at.timestamp_millis(),
                    call.updated_at.timestamp_millis(),
                ],
            )
            .map_err(|e| AnkrError::Storage(format!("Failed to insert action call: {}", e)))?;
            Ok(())
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<ActionCall>, AnkrError> {
        self.db.with_conn(|conn| {
            let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
            let result = conn
                .query_row(&sql, rusqlite::params![id.to_string()], |row| {
                    Ok(row_to_action_call(row))
                })
                .optional()
                .map_err(|e| AnkrError::Storage(format!("Failed to fetch action call: {}", e)))?;

            result.transpose()
        })
    }

    fn update(&self, call: &ActionCall) -> Result<(), AnkrError> {
        let status_info = call
            .status_info
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.db.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE action_calls
                     SET status = ?2, acknowledged_by = ?3, executed_by = ?4,
                         executed_at = ?5, status_info = ?6, updated_at = ?7
                     WHERE id = ?1",
                    rusqlite::params![
                        call.id.to_string(),
                        call.status.as_str(),
                        call.acknowledged_by,
                        call.executed_by,
                        call.executed_at.map(|t| t.timestamp_millis()),
                        status_info,
                        call.updated_at.timestamp_millis(),
                    ],
                )
                .map_err(|e| AnkrError::Storage(format!("Failed to update action call: {}", e)))?;

            if changed == 0 {
                return Err(AnkrError::Storage(format!(
                    "Action call {} vanished during update",
                    call.id
                )));
            }
            Ok(())
        })
    }

    fn oldest_with_status(
        &self,
        status: ActionCallStatus,
        limit: u32,
    ) -> Result<Vec<ActionCall>, AnkrError> {
        let sql = format!(
            "{} WHERE status = ?1 ORDER BY created_at ASC, rowid ASC LIMIT ?2",
            SELECT_COLUMNS
        );
        self.query_calls(&sql, rusqlite::params![status.as_str(), limit as i64])
    }

    fn list(
        &self,
        status: Option<ActionCallStatus>,
        limit: u32,
    ) -> Result<Vec<ActionCall>, AnkrError> {
        match status {
            Some(status) => {
                let sql = format!(
                    "{} WHERE status = ?1 ORDER BY created_at DESC, rowid DESC LIMIT ?2",
                    SELECT_COLUMNS
                );
                self.query_calls(&sql, rusqlite::params![status.as_str(), limit as i64])
            }
            None => {
                let sql = format!(
                    "{} ORDER BY created_at DESC, rowid DESC LIMIT ?1",
                    SELECT_COLUMNS
                );
                self.query_calls(&sql, rusqlite::params![limit as i64])
            }
        }
    }

    fn record_activity(&self, entry: &ActivityEntry) -> Result<(), AnkrError> {
        let detail = entry
            .detail
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO activity_log (id, action_call_id, event, detail, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    entry.id.to_string(),
                    entry.action_call_id.to_string(),
                    entry.event,
                    detail,
                    entry.created_at.timestamp_millis(),
                ],
            )
            .map_err(|e| AnkrError::Storage(format!("Failed to record activity: {}", e)))?;
            Ok(())
        })
    }
}

fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>, AnkrError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| AnkrError::Storage(format!("Invalid timestamp: {}", millis)))
}

fn parse_uuid(raw: &str) -> Result<Uuid, AnkrError> {
    Uuid::parse_str(raw).map_err(|e| AnkrError::Storage(format!("Invalid UUID: {}", e)))
}

fn parse_json(raw: Option<String>) -> Result<Option<serde_json::Value>, AnkrError> {
    raw.map(|s| serde_json::from_str(&s)).transpose().map_err(AnkrError::from)
}

fn row_to_action_call(row: &rusqlite::Row<'_>) -> Result<ActionCall, AnkrError> {
    let get_err = |e: rusqlite::Error| AnkrError::Storage(e.to_string());

    let id: String = row.get(0).map_err(get_err)?;
    let params: String = row.get(5).map_err(get_err)?;
    let status: String = row.get(6).map_err(get_err)?;
    let executed_at: Option<i64> = row.get(9).map_err(get_err)?;
    let status_info: Option<String> = row.get(10).map_err(get_err)?;
    let created_at: i64 = row.get(11).map_err(get_err)?;
    let updated_at: i64 = row.get(12).map_err(get_err)?;

    Ok(ActionCall {
        id: parse_uuid(&id)?,
        thread_id: row.get(1).map_err(get_err)?,
        source_message_id: row.get(2).map_err(get_err)?,
        requested_by: row.get(3).map_err(get_err)?,
        action_name: row.get(4).map_err(get_err)?,
        params: serde_json::from_str(&params)?,
        status: status.parse().map_err(AnkrError::Storage)?,
        acknowledged_by: row.get(7).map_err(get_err)?,
        executed_by: row.get(8).map_err(get_err)?,
        executed_at: executed_at.map(millis_to_datetime).transpose()?,
        status_info: parse_json(status_info)?,
        created_at: millis_to_datetime(created_at)?,
        updated_at: millis_to_datetime(updated_at)?,
    })
}

fn row_to_activity(row: &rusqlite::Row<'_>) -> Result<ActivityEntry, AnkrError> {
    let get_err = |e: rusqlite::Error| AnkrError::Storage(e.to_string());

    let id: String = row.get(0).map_err(get_err)?;
    let action_call_id: String = row.get(1).map_err(get_err)?;
    let detail: Option<String> = row.get(3).map_err(get_err)?;
    let created_at: i64 = row.get(4).map_err(get_err)?;

    Ok(ActivityEntry {
        id: parse_uuid(&id)?,
        action_call_id: parse_uuid(&action_call_id)?,
        event: row.get(2).map_err(get_err)?,
        detail: parse_json(detail)?,
        created_at: millis_to_datetime(created_at)?,
    })
}
