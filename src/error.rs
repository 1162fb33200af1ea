//! Error type for the persistence layer. The UI and binary wrap it in
//! `anyhow` with extra context; callers that care about the failure kind can
//! still match on the variants.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create data directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open SQLite database {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to remove SQLite database {path}")]
    Reset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "database schema version {found} is newer than supported version {supported}; \
         run with --reset to start a fresh catalog"
    )]
    SchemaTooNew { found: i64, supported: i64 },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
