//! SQLite persistence for EcoScan.
//!
//! A single `SqlitePool` wraps the connection behind a mutex (WAL mode plus
//! short transactions makes a real pool unnecessary at this scale), and the
//! per-table stores borrow it by clone.

pub mod connection;
pub mod error;
pub mod history;
pub mod schema;
pub mod sessions;
pub mod tasks;
pub mod users;

pub use connection::SqlitePool;
pub use error::{StoreError, StoreResult};
pub use history::{HistoryStore, NewScanRecord, ScanRecord};
pub use sessions::SessionStore;
pub use tasks::TaskStore;
pub use users::UserStore;

/// Timestamp encoding for TEXT columns. Fixed-width RFC 3339 in UTC so that
/// lexicographic ordering matches chronological ordering.
pub(crate) mod ts {
    use crate::error::{StoreError, StoreResult};
    use chrono::{DateTime, SecondsFormat, Utc};

    pub fn format(dt: DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn now() -> String {
        format(Utc::now())
    }

    pub fn parse(s: &str) -> StoreResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::Serialization(format!("Bad timestamp {:?}: {}", s, e)))
    }
}

/// All stores bundled over one pool, the unit the web layer carries around
#[derive(Clone)]
pub struct Stores {
    pub users: UserStore,
    pub sessions: SessionStore,
    pub history: HistoryStore,
    pub tasks: TaskStore,
}

impl Stores {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            users: UserStore::new(pool.clone()),
            sessions: SessionStore::new(pool.clone()),
            history: HistoryStore::new(pool.clone()),
            tasks: TaskStore::new(pool),
        }
    }
}
