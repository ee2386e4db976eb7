//! Implements a SQLite backed secondary index store.
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use rusqlite::{Connection, OptionalExtension};
use time::OffsetDateTime;

use crate::{
    Error,
    stores::{IndexOp, IndexStore},
};

/// A source of the current time.
pub type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

/// Stores the index keyspace in its own SQLite database.
///
/// Every kind of value lives in its own table, keyed by the index key. Using a
/// separate database file lets the register and report services share one
/// index store from different processes.
#[derive(Clone)]
pub struct SQLiteIndexStore {
    connection: Arc<Mutex<Connection>>,
    clock: Clock,
}

impl SQLiteIndexStore {
    /// Create a new store for the SQLite `connection`, creating its tables if needed.
    ///
    /// # Errors
    /// Returns an [Error::IndexStoreError] if the tables cannot be created.
    pub fn new(connection: Connection) -> Result<Self, Error> {
        Self::with_clock(connection, Arc::new(OffsetDateTime::now_utc))
    }

    /// Create a new store that reads the current time from `clock` when
    /// checking and setting expiries.
    ///
    /// # Errors
    /// Returns an [Error::IndexStoreError] if the tables cannot be created.
    pub fn with_clock(connection: Connection, clock: Clock) -> Result<Self, Error> {
        create_index_tables(&connection).map_err(index_store_error)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            clock,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("Could not acquire index store lock: {error}");
            Error::DatabaseLockError
        })
    }

    fn now(&self) -> i64 {
        (self.clock)().unix_timestamp()
    }
}

impl Debug for SQLiteIndexStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SQLiteIndexStore")
            .field("connection", &self.connection)
            .finish_non_exhaustive()
    }
}

impl IndexStore for SQLiteIndexStore {
    fn apply(&self, ops: &[IndexOp]) -> Result<(), Error> {
        let connection = self.lock()?;
        let tx = connection
            .unchecked_transaction()
            .map_err(index_store_error)?;

        for op in ops {
            apply_op(&tx, op).map_err(index_store_error)?;
        }

        tx.commit().map_err(index_store_error)
    }

    fn hash_fields(&self, key: &str) -> Result<BTreeMap<String, String>, Error> {
        let connection = self.lock()?;

        connection
            .prepare("SELECT field, value FROM index_hash WHERE key = ?1")
            .and_then(|mut stmt| {
                let rows = stmt.query_map((key,), |row| Ok((row.get(0)?, row.get(1)?)))?;
                rows.collect()
            })
            .map_err(index_store_error)
    }

    fn sorted_set_score(&self, key: &str, member: &str) -> Result<Option<i64>, Error> {
        let connection = self.lock()?;

        connection
            .query_row(
                "SELECT score FROM index_sorted_set WHERE key = ?1 AND member = ?2",
                (key, member),
                |row| row.get(0),
            )
            .optional()
            .map_err(index_store_error)
    }

    fn set_members(&self, key: &str) -> Result<BTreeSet<String>, Error> {
        let connection = self.lock()?;

        connection
            .prepare("SELECT member FROM index_set WHERE key = ?1")
            .and_then(|mut stmt| {
                let rows = stmt.query_map((key,), |row| row.get(0))?;
                rows.collect()
            })
            .map_err(index_store_error)
    }

    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let now = self.now();
        let connection = self.lock()?;

        connection
            .query_row(
                "SELECT value FROM index_value \
                WHERE key = ?1 AND (expires_at IS NULL OR expires_at > ?2)",
                (key, now),
                |row| row.get(0),
            )
            .optional()
            .map_err(index_store_error)
    }

    fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<(), Error> {
        let ttl_seconds = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let expires_at = self.now().saturating_add(ttl_seconds);
        let connection = self.lock()?;

        connection
            .execute(
                "INSERT INTO index_value (key, value, expires_at) VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at",
                (key, value, expires_at),
            )
            .map(|_| ())
            .map_err(index_store_error)
    }
}

fn apply_op(connection: &Connection, op: &IndexOp) -> Result<(), rusqlite::Error> {
    match op {
        IndexOp::HashSet { key, fields } => {
            let mut stmt = connection.prepare(
                "INSERT INTO index_hash (key, field, value) VALUES (?1, ?2, ?3)
                ON CONFLICT(key, field) DO UPDATE SET value = excluded.value",
            )?;

            for (field, value) in fields {
                stmt.execute((key, field, value))?;
            }
        }
        IndexOp::SortedSetAdd { key, member, score } => {
            connection.execute(
                "INSERT INTO index_sorted_set (key, member, score) VALUES (?1, ?2, ?3)
                ON CONFLICT(key, member) DO UPDATE SET score = excluded.score",
                (key, member, score),
            )?;
        }
        IndexOp::SetAdd { key, member } => {
            connection.execute(
                "INSERT OR IGNORE INTO index_set (key, member) VALUES (?1, ?2)",
                (key, member),
            )?;
        }
        IndexOp::SetRemove { key, member } => {
            connection.execute(
                "DELETE FROM index_set WHERE key = ?1 AND member = ?2",
                (key, member),
            )?;
        }
    }

    Ok(())
}

fn create_index_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS index_hash (
                key TEXT NOT NULL,
                field TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (key, field)
                );
        CREATE TABLE IF NOT EXISTS index_sorted_set (
                key TEXT NOT NULL,
                member TEXT NOT NULL,
                score INTEGER NOT NULL,
                PRIMARY KEY (key, member)
                );
        CREATE INDEX IF NOT EXISTS idx_index_sorted_set_score ON index_sorted_set(key, score);
        CREATE TABLE IF NOT EXISTS index_set (
                key TEXT NOT NULL,
                member TEXT NOT NULL,
                PRIMARY KEY (key, member)
                );
        CREATE TABLE IF NOT EXISTS index_value (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER
                );",
    )
}

fn index_store_error(error: rusqlite::Error) -> Error {
    tracing::error!("an index store operation failed: {error}");
    Error::IndexStoreError(error.to_string())
}
