//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The assignment engine, intake workflow, and service call store methods;
//! they never execute SQL directly.

use crate::{error::CrmResult, model::Operator};
use rusqlite::{Connection, Row};
use std::time::Duration;

mod assignment;
mod contact;
mod lead;
mod operator;
mod source;

/// Writers wait this long for the database lock before giving up.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

pub struct CrmStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl CrmStore {
    pub fn open(path: &str) -> CrmResult<Self> {
        Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT_MS)
    }

    pub fn open_with_timeout(path: &str, busy_timeout_ms: u64) -> CrmResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> CrmResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Open another connection to the same database.
    /// For in-memory databases this returns a new, isolated database.
    pub fn reopen(&self) -> CrmResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> CrmResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    /// Run `f` while holding the database write lock.
    ///
    /// Uses `BEGIN IMMEDIATE`, so concurrent writers queue on the busy
    /// timeout instead of interleaving. Commits on `Ok`, rolls back on `Err`.
    pub fn with_write_lock<T, F>(&self, f: F) -> CrmResult<T>
    where
        F: FnOnce(&Self) -> CrmResult<T>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE;")?;
        match f(self) {
            Ok(value) => {
                if let Err(e) = self.conn.execute_batch("COMMIT;") {
                    let _ = self.conn.execute_batch("ROLLBACK;");
                    return Err(e.into());
                }
                Ok(value)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(e)
            }
        }
    }
}

/// Map the five operator columns starting at `offset`.
fn operator_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Operator> {
    Ok(Operator {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        is_active: row.get::<_, i32>(offset + 2)? != 0,
        max_load: row.get(offset + 3)?,
        current_load: row.get(offset + 4)?,
    })
}
