use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::connection::BookStore;
use crate::error::StoreError;
use crate::models::{Book, NewBook};

/// Rebuild a `Book` from a `SELECT id, title, author, genre` row. A NULL
/// genre stays `None`.
fn map_book_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        genre: row.get(3)?,
    })
}

/// An empty genre is written as NULL. Every other value is stored verbatim.
fn insert_book(conn: &Connection, book: &NewBook) -> rusqlite::Result<i64> {
    let genre = book.genre.as_deref().filter(|genre| !genre.is_empty());
    conn.execute(
        "INSERT INTO books (title, author, genre) VALUES (?1, ?2, ?3)",
        params![book.title, book.author, genre],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Every book ordered by title using SQLite's byte-wise BINARY collation, so
/// uppercase sorts before lowercase. Equal titles fall back to insertion order.
fn select_books(conn: &Connection) -> rusqlite::Result<Vec<Book>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, author, genre
         FROM books
         ORDER BY title ASC, id ASC",
    )?;

    let books = stmt
        .query_map([], map_book_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(books)
}

fn select_book(conn: &Connection, id: i64) -> rusqlite::Result<Option<Book>> {
    conn.query_row(
        "SELECT id, title, author, genre FROM books WHERE id = ?1",
        params![id],
        map_book_row,
    )
    .optional()
}

pub(super) fn count_books(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
}

impl BookStore {
    /// Insert a book and return the id SQLite assigned to it.
    ///
    /// Ids grow monotonically and are never handed out twice, even after a
    /// row disappears. The insert is a single statement, so on error nothing
    /// was written. The write is synced to disk before this returns.
    pub fn add(&self, book: &NewBook) -> Result<i64, StoreError> {
        let id = self.with_conn(|conn| insert_book(conn, book))?;
        debug!(id, title = %book.title, "book added");
        Ok(id)
    }

    /// Every stored book sorted by title. An empty catalog yields an empty
    /// vector.
    pub fn list_all(&self) -> Result<Vec<Book>, StoreError> {
        let books = self.with_conn(select_books)?;
        debug!(count = books.len(), "books listed");
        Ok(books)
    }

    /// Look up a single book. `Ok(None)` means no row has that id.
    pub fn get(&self, id: i64) -> Result<Option<Book>, StoreError> {
        let book = self.with_conn(|conn| select_book(conn, id))?;
        debug!(id, found = book.is_some(), "book lookup");
        Ok(book)
    }

    /// Number of stored books.
    pub fn count(&self) -> Result<i64, StoreError> {
        self.with_conn(count_books)
    }
}
