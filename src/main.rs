//! Binary entry point: resolve configuration, start logging, open the catalog
//! and drive the Ratatui event loop until the user exits.
use anyhow::Context;
use clap::Parser;
use tracing::info;

use book_library::config::{Cli, Config};
use book_library::{logging, run_app, App, BookStore};

/// Returning a `Result` bubbles fatal initialization problems (an unreadable
/// database, a schema from a newer release) up to the terminal.
fn main() -> anyhow::Result<()> {
    let config = Config::from_cli(Cli::parse())?;
    logging::init(&config.log_path)?;
    info!(db = %config.db_path.display(), "starting book library");

    if config.reset {
        BookStore::reset(&config.db_path).context("failed to reset book database")?;
    }

    let store = BookStore::open(&config.db_path).context("failed to open book database")?;
    let books = store.list_all().context("failed to load books")?;

    let mut app = App::new(store, books);
    run_app(&mut app)
}
