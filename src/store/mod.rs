//! Data access for users, sessions and posts. Every function takes the
//! shared connection pool; cross-request consistency is delegated to
//! SQLite's constraints and single-statement updates.

pub mod posts;
pub mod sessions;
pub mod users;

use chrono::{SecondsFormat, Utc};

/// Current time as a fixed-width RFC 3339 UTC string. Fixed fractional
/// precision keeps lexicographic order identical to chronological order.
pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
pub(crate) mod test_support {
    use r2d2::Pool;
    use r2d2_sqlite::SqliteConnectionManager;

    use crate::db;
    use crate::state::DbPool;

    pub fn test_pool() -> DbPool {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager).unwrap();
        let conn = pool.get().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        drop(conn);
        db::run_migrations(&pool).unwrap();
        pool
    }
}
