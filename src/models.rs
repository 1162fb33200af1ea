//! Domain models that mirror the `books` table and get passed between the
//! store and the TUI. They stay plain data holders so persistence and
//! presentation logic live elsewhere.

use std::fmt;

/// Text shown wherever a book has no genre recorded.
pub const MISSING_GENRE_LABEL: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A book as stored in the catalog. Instances only come out of the store, so
/// `id` is always the row id assigned on insert.
pub struct Book {
    /// Primary key from the database. Assigned once by the store and never
    /// reused, even after the row is gone.
    pub id: i64,
    pub title: String,
    pub author: String,
    /// `None` when no genre was recorded. An empty string is never stored.
    pub genre: Option<String>,
}

impl Book {
    /// Genre text for display, falling back to `N/A`.
    pub fn genre_label(&self) -> &str {
        self.genre.as_deref().unwrap_or(MISSING_GENRE_LABEL)
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.title, self.author)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A book that has not been persisted yet. It carries no id at all; the store
/// hands one back from `BookStore::add`.
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
}

impl NewBook {
    /// Build an unsaved book, collapsing a blank genre to `None`.
    pub fn new(title: impl Into<String>, author: impl Into<String>, genre: Option<&str>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            genre: normalize_genre(genre),
        }
    }
}

/// Trim the genre and treat blank input as "no genre".
pub fn normalize_genre(genre: Option<&str>) -> Option<String> {
    genre
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
