//! Ratatui front-end for the book catalog: a sorted list, an add form and a
//! read-only detail view. All persistence goes through `BookStore`.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
