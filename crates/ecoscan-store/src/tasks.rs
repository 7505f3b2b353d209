//! Scan task rows, written by the worker and polled by the client

use crate::connection::SqlitePool;
use crate::error::{StoreError, StoreResult};
use crate::ts;
use ecoscan_core::{ScanTask, TaskStatus};
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

/// Store for the `tasks` table
#[derive(Clone)]
pub struct TaskStore {
    pool: SqlitePool,
}

impl TaskStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a pending task
    pub fn create(&self, id: &str, user_id: i64) -> StoreResult<()> {
        self.pool.with_connection(|conn| {
            let now = ts::now();
            conn.execute(
                "INSERT INTO tasks (id, user_id, status, created_at, updated_at)
                 VALUES (?1, ?2, 'pending', ?3, ?3)",
                params![id, user_id, now],
            )?;
            debug!(task_id = id, user_id, "Created task");
            Ok(())
        })
    }

    pub fn mark_processing(&self, id: &str) -> StoreResult<()> {
        self.set_status(id, TaskStatus::Processing, None, None)
    }

    /// Store the response payload and mark the task completed
    pub fn complete(&self, id: &str, result: &serde_json::Value) -> StoreResult<()> {
        self.set_status(id, TaskStatus::Completed, Some(result.to_string()), None)
    }

    /// Record a failure message and mark the task failed
    pub fn fail(&self, id: &str, error: &str) -> StoreResult<()> {
        self.set_status(id, TaskStatus::Failed, None, Some(error.to_string()))
    }

    fn set_status(
        &self,
        id: &str,
        status: TaskStatus,
        result: Option<String>,
        error: Option<String>,
    ) -> StoreResult<()> {
        self.pool.with_connection(|conn| {
            let updated = conn.execute(
                "UPDATE tasks SET status = ?1, result = ?2, error = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![status.as_str(), result, error, ts::now(), id],
            )?;
            if updated == 0 {
                return Err(StoreError::NotFound(format!("task {}", id)));
            }
            debug!(task_id = id, status = %status, "Updated task");
            Ok(())
        })
    }

    /// Fetch a task, scoped to its owner; another user's id reads as absent
    pub fn get_for_user(&self, id: &str, user_id: i64) -> StoreResult<Option<ScanTask>> {
        self.pool.with_connection(|conn| {
            conn.query_row(
                "SELECT id, user_id, status, result, error, created_at, updated_at
                 FROM tasks WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                row_to_task,
            )
            .optional()
            .map_err(StoreError::from)?
            .transpose()
        })
    }
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<StoreResult<ScanTask>> {
    let status: String = row.get(2)?;
    let result: Option<String> = row.get(3)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;
    Ok((|| {
        let result = result
            .map(|json| {
                serde_json::from_str(&json)
                    .map_err(|e| StoreError::Serialization(format!("Bad result JSON: {}", e)))
            })
            .transpose()?;
        Ok(ScanTask {
            id: row.get(0)?,
            user_id: row.get(1)?,
            status: status
                .parse()
                .map_err(|e| StoreError::Serialization(format!("{}", e)))?,
            result,
            error: row.get(4)?,
            created_at: ts::parse(&created_at)?,
            updated_at: ts::parse(&updated_at)?,
        })
    })())
}
