//! Command-line and environment configuration. Flags win over environment
//! variables, which win over the defaults under the user's home directory.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".book-library";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";
/// Log file written next to the database unless overridden.
const LOG_FILE_NAME: &str = "library.log";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Keep a personal catalog of books in the terminal",
    long_about = "A small terminal app that records books (title, author, optional genre) \
                  in a local SQLite file and lets you browse them sorted by title."
)]
pub struct Cli {
    #[arg(
        long = "db",
        env = "BOOK_LIBRARY_DB",
        value_name = "PATH",
        help = "SQLite file holding the catalog (default: ~/.book-library/library.sqlite)"
    )]
    pub db: Option<PathBuf>,

    #[arg(
        long = "log-file",
        env = "BOOK_LIBRARY_LOG",
        value_name = "PATH",
        help = "Where to write logs (default: library.log next to the database)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        default_value_t = false,
        help = "Delete the catalog database before starting"
    )]
    pub reset: bool,
}

/// Fully resolved settings the binary runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub reset: bool,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let db_path = match cli.db {
            Some(path) => path,
            None => default_db_path()?,
        };
        let log_path = cli
            .log_file
            .unwrap_or_else(|| db_path.with_file_name(LOG_FILE_NAME));

        Ok(Self {
            db_path,
            log_path,
            reset: cli.reset,
        })
    }
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
