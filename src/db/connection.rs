use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info, warn};

use super::books::count_books;
use crate::error::StoreError;

/// Schema version written to `PRAGMA user_version` once the `books` table is
/// in place. Any older on-disk version is upgraded destructively.
pub const SCHEMA_VERSION: i64 = 1;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_millis(500);

const CREATE_BOOKS_TABLE: &str = "CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT,
    author TEXT,
    genre TEXT
)";

const DROP_BOOKS_TABLE: &str = "DROP TABLE IF EXISTS books";

/// Handle to the on-disk book catalog.
///
/// The store only remembers where the database lives. Each operation opens
/// its own connection through [`BookStore::with_conn`] and drops it before
/// returning, on success and on error alike, so no handle outlives a call.
///
/// There is no locking here: the store assumes a single writer issuing one
/// operation at a time. Sharing it between threads that write concurrently
/// needs a mutex around the store.
#[derive(Debug, Clone)]
pub struct BookStore {
    path: PathBuf,
    schema_version: i64,
}

impl BookStore {
    /// Open (creating if needed) the catalog at `path` and bring its schema to
    /// [`SCHEMA_VERSION`].
    ///
    /// An older schema is upgraded by dropping the `books` table and creating
    /// it again, which discards every stored book. A newer schema is refused
    /// with [`StoreError::SchemaTooNew`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open_with_schema_version(path, SCHEMA_VERSION)
    }

    pub(crate) fn open_with_schema_version<P: AsRef<Path>>(
        path: P,
        schema_version: i64,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let store = Self {
            path,
            schema_version,
        };
        store.with_conn(|_conn| Ok(()))?;
        debug!(path = %store.path.display(), "book store ready");
        Ok(store)
    }

    /// Delete the database file so the next `open` starts from an empty
    /// catalog. Missing files are fine.
    pub fn reset<P: AsRef<Path>>(path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(());
        }
        fs::remove_file(path).map_err(|source| StoreError::Reset {
            path: path.to_path_buf(),
            source,
        })?;
        warn!(path = %path.display(), "book database removed");
        Ok(())
    }

    /// Location of the backing SQLite file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against a freshly opened connection. The schema check runs on
    /// every acquisition so a file swapped out underneath us is handled the
    /// same way as at startup. The connection is dropped when this returns.
    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let mut conn = Connection::open(&self.path).map_err(|source| StoreError::Open {
            path: self.path.clone(),
            source,
        })?;
        conn.pragma_update(None, "synchronous", "FULL")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        migrate(&mut conn, self.schema_version)?;
        let value = f(&conn)?;
        Ok(value)
    }
}

/// Bring the `books` table to `target`. Version 0 means nothing of ours is
/// on disk yet. Anything between 0 and `target` is dropped and recreated.
fn migrate(conn: &mut Connection, target: i64) -> Result<(), StoreError> {
    let found: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if found == target {
        return Ok(());
    }
    if found > target {
        return Err(StoreError::SchemaTooNew {
            found,
            supported: target,
        });
    }

    let tx = conn.transaction()?;
    if found == 0 {
        info!(version = target, "creating books table");
    } else {
        let discarded = if books_table_exists(&tx)? {
            count_books(&tx)?
        } else {
            0
        };
        warn!(
            from = found,
            to = target,
            discarded,
            "schema upgrade drops the books table and every stored book"
        );
        tx.execute(DROP_BOOKS_TABLE, [])?;
    }
    tx.execute(CREATE_BOOKS_TABLE, [])?;
    tx.pragma_update(None, "user_version", target)?;
    tx.commit()?;

    Ok(())
}

fn books_table_exists(conn: &Connection) -> rusqlite::Result<bool> {
    let name: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'books'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(name.is_some())
}
