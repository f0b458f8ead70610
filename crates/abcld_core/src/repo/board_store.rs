//! Key-value store contracts for persisted board snapshots.
//!
//! # Responsibility
//! - Provide `load`/`save` of opaque text under a fixed key.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `save` overwrites in place; last writer wins.
//! - `load` of an unknown key is `Ok(None)`, not an error.

use crate::codec::CodecError;
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Codec(CodecError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Codec(err) => Some(err),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<CodecError> for StoreError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// Text key-value store the editor persists into.
pub trait BoardStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>>;
    fn save(&self, key: &str, text: &str) -> StoreResult<()>;
}

impl<S: BoardStore + ?Sized> BoardStore for &S {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, text: &str) -> StoreResult<()> {
        (**self).save(key, text)
    }
}

/// SQLite-backed store over the `kv_entries` table.
pub struct SqliteBoardStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBoardStore<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `DbError::SchemaNotReady` when the connection did not go through
    ///   `open_db`/`open_db_in_memory`.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let actual_version = current_user_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(DbError::SchemaNotReady {
                expected_version,
                actual_version,
            }
            .into());
        }
        Ok(Self { conn })
    }
}

impl BoardStore for SqliteBoardStore<'_> {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save(&self, key: &str, text: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, text],
        )?;
        Ok(())
    }
}

/// Process-local store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryBoardStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryBoardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BoardStore for MemoryBoardStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, text: &str) -> StoreResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), text.to_string());
        Ok(())
    }
}
