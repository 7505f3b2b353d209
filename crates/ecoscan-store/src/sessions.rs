//! Server-side session tokens backing the auth cookie

use crate::connection::SqlitePool;
use crate::error::StoreResult;
use crate::ts;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::debug;

/// Store for the `sessions` table
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new session token for a user
    pub fn create(
        &self,
        token: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.pool.with_connection(|conn| {
            conn.execute(
                "INSERT INTO sessions (token, user_id, created_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![token, user_id, ts::now(), ts::format(expires_at)],
            )?;
            debug!(user_id, "Created session");
            Ok(())
        })
    }

    /// Resolve a token to a user id. Expired tokens are deleted on sight
    /// and treated as absent.
    pub fn resolve(&self, token: &str, now: DateTime<Utc>) -> StoreResult<Option<i64>> {
        self.pool.with_connection(|conn| {
            let row: Option<(i64, String)> = conn
                .query_row(
                    "SELECT user_id, expires_at FROM sessions WHERE token = ?1",
                    params![token],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let Some((user_id, expires_at)) = row else {
                return Ok(None);
            };

            if ts::parse(&expires_at)? <= now {
                conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
                debug!("Rejected expired session");
                return Ok(None);
            }

            Ok(Some(user_id))
        })
    }

    /// Delete a session (logout)
    pub fn delete(&self, token: &str) -> StoreResult<()> {
        self.pool.with_connection(|conn| {
            conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
            Ok(())
        })
    }

    /// Remove all expired sessions, returning how many were dropped
    pub fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        self.pool.with_connection(|conn| {
            let dropped = conn.execute(
                "DELETE FROM sessions WHERE expires_at <= ?1",
                params![ts::format(now)],
            )?;
            Ok(dropped)
        })
    }
}
