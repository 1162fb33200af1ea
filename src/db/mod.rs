//! Persistence module split across logical submodules: `connection` owns the
//! file, connection scoping and schema lifecycle, `books` owns the queries.

mod books;
mod connection;

pub use connection::{BookStore, SCHEMA_VERSION};
