//! Core library surface for the Book Library TUI application.
//!
//! The binary and the integration tests share these modules: the SQLite-backed
//! `BookStore`, the domain types, and the terminal front-end.
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;

/// The persistence layer: open a catalog, then add, list and look up books.
pub use db::{BookStore, SCHEMA_VERSION};

pub use error::StoreError;

/// The two domain types that other layers manipulate.
pub use models::{Book, NewBook};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
