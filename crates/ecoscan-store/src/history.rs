//! Scan history rows

use crate::connection::SqlitePool;
use crate::error::{StoreError, StoreResult};
use crate::ts;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use tracing::debug;

/// Fields for a new history row
#[derive(Debug, Clone)]
pub struct NewScanRecord {
    pub user_id: i64,
    pub product_name: String,
    pub health_score: i64,
    pub eco_score: i64,
    pub image_filename: Option<String>,
    /// Full `ProductAnalysis` JSON
    pub full_analysis: serde_json::Value,
}

/// A stored scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRecord {
    pub id: i64,
    pub user_id: i64,
    pub product_name: String,
    pub health_score: i64,
    pub eco_score: i64,
    pub image_filename: Option<String>,
    pub full_analysis: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Store for the `scan_history` table
#[derive(Clone)]
pub struct HistoryStore {
    pool: SqlitePool,
}

impl HistoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn insert(&self, record: NewScanRecord) -> StoreResult<i64> {
        self.pool.with_connection(|conn| {
            conn.execute(
                "INSERT INTO scan_history
                     (user_id, product_name, health_score, eco_score, image_filename,
                      full_analysis, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.user_id,
                    record.product_name,
                    record.health_score,
                    record.eco_score,
                    record.image_filename,
                    record.full_analysis.to_string(),
                    ts::now(),
                ],
            )?;
            let id = conn.last_insert_rowid();
            debug!(user_id = record.user_id, id, "Saved scan to history");
            Ok(id)
        })
    }

    /// All scans for one user, newest first
    pub fn list_for_user(&self, user_id: i64) -> StoreResult<Vec<ScanRecord>> {
        self.pool.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, product_name, health_score, eco_score, image_filename,
                        full_analysis, created_at
                 FROM scan_history
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt.query_map(params![user_id], row_to_record)?;

            let mut records = Vec::new();
            for row in rows {
                records.push(row??);
            }
            Ok(records)
        })
    }

    /// Delete all scans belonging to one user, returning the count
    pub fn clear_for_user(&self, user_id: i64) -> StoreResult<usize> {
        self.pool.with_connection(|conn| {
            let deleted = conn.execute(
                "DELETE FROM scan_history WHERE user_id = ?1",
                params![user_id],
            )?;
            debug!(user_id, deleted, "Cleared scan history");
            Ok(deleted)
        })
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<StoreResult<ScanRecord>> {
    let full_analysis: Option<String> = row.get(6)?;
    let created_at: String = row.get(7)?;
    Ok((|| {
        let full_analysis = match full_analysis {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| StoreError::Serialization(format!("Bad analysis JSON: {}", e)))?,
            None => serde_json::Value::Null,
        };
        Ok(ScanRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            product_name: row.get(2)?,
            health_score: row.get(3)?,
            eco_score: row.get(4)?,
            image_filename: row.get(5)?,
            full_analysis,
            created_at: ts::parse(&created_at)?,
        })
    })())
}
