//! User accounts: creation, lookup and preference updates

use crate::connection::SqlitePool;
use crate::error::{StoreError, StoreResult};
use crate::ts;
use ecoscan_core::{User, UserPreferences};
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

/// Store for the `users` table
#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a user. Username and email collisions map to distinct errors
    /// so the API can report which one is taken.
    pub fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<User> {
        self.pool.with_connection(|conn| {
            let taken: Option<i64> = conn
                .query_row(
                    "SELECT id FROM users WHERE username = ?1",
                    params![username],
                    |row| row.get(0),
                )
                .optional()?;
            if taken.is_some() {
                return Err(StoreError::DuplicateUsername);
            }

            let taken: Option<i64> = conn
                .query_row(
                    "SELECT id FROM users WHERE email = ?1",
                    params![email],
                    |row| row.get(0),
                )
                .optional()?;
            if taken.is_some() {
                return Err(StoreError::DuplicateEmail);
            }

            let created_at = ts::now();
            conn.execute(
                "INSERT INTO users (username, email, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![username, email, password_hash, created_at],
            )?;
            let id = conn.last_insert_rowid();
            debug!(username, id, "Created user");

            Ok(User {
                id,
                username: username.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                preferences: UserPreferences::default(),
                created_at: ts::parse(&created_at)?,
            })
        })
    }

    pub fn get_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.pool.with_connection(|conn| {
            conn.query_row(
                "SELECT id, username, email, password_hash, health_conditions, allergies,
                        diet_type, ingredients_to_avoid, created_at
                 FROM users WHERE username = ?1",
                params![username],
                row_to_user,
            )
            .optional()
            .map_err(StoreError::from)?
            .transpose()
        })
    }

    pub fn get_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        self.pool.with_connection(|conn| {
            conn.query_row(
                "SELECT id, username, email, password_hash, health_conditions, allergies,
                        diet_type, ingredients_to_avoid, created_at
                 FROM users WHERE id = ?1",
                params![id],
                row_to_user,
            )
            .optional()
            .map_err(StoreError::from)?
            .transpose()
        })
    }

    /// Replace the preference profile for a user
    pub fn update_preferences(&self, user_id: i64, prefs: &UserPreferences) -> StoreResult<()> {
        self.pool.with_connection(|conn| {
            let updated = conn.execute(
                "UPDATE users SET health_conditions = ?1, allergies = ?2, diet_type = ?3,
                        ingredients_to_avoid = ?4
                 WHERE id = ?5",
                params![
                    prefs.health_conditions,
                    prefs.allergies,
                    prefs.diet_type,
                    prefs.ingredients_to_avoid,
                    user_id
                ],
            )?;
            if updated == 0 {
                return Err(StoreError::NotFound(format!("user {}", user_id)));
            }
            Ok(())
        })
    }
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<StoreResult<User>> {
    let created_at: String = row.get(8)?;
    Ok((|| {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            preferences: UserPreferences {
                health_conditions: row.get(4)?,
                allergies: row.get(5)?,
                diet_type: row.get(6)?,
                ingredients_to_avoid: row.get(7)?,
            },
            created_at: ts::parse(&created_at)?,
        })
    })())
}
