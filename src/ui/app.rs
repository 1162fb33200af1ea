use std::mem;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{error, info};

use crate::db::BookStore;
use crate::models::Book;

use super::forms::{BookField, BookForm};
use super::helpers::{centered_rect, describe_error};
use super::screens::{BookDetailScreen, BookListScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp / PageDown in the book list.
const PAGE_STEP: isize = 5;

/// High-level navigation states.
enum Screen {
    Books,
    Details(BookDetailScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    AddingBook(BookForm),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI. The store is the only
/// source of truth; `list` is just the last projection read from it.
pub struct App {
    store: BookStore,
    list: BookListScreen,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: BookStore, books: Vec<Book>) -> Self {
        Self {
            store,
            list: BookListScreen::new(books),
            screen: Screen::Books,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Feed one key press into the state machine. Returns `true` once the
    /// user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_add_book(code, form)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Books => match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    *exit = true;
                }
                KeyCode::Up => self.list.move_selection(-1),
                KeyCode::Down => self.list.move_selection(1),
                KeyCode::PageUp => self.list.move_selection(-PAGE_STEP),
                KeyCode::PageDown => self.list.move_selection(PAGE_STEP),
                KeyCode::Home => self.list.select_first(),
                KeyCode::End => self.list.select_last(),
                KeyCode::Enter => {
                    if let Some(id) = self.list.current_book().map(|book| book.id) {
                        self.clear_status();
                        self.open_details(id);
                    } else {
                        self.set_status("No book selected.", StatusKind::Error);
                    }
                }
                KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('+') => {
                    self.clear_status();
                    return Ok(Mode::AddingBook(BookForm::default()));
                }
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    self.clear_status();
                    let focus = self.list.current_book().map(|book| book.id);
                    self.reload_books(focus);
                }
                _ => {}
            },
            Screen::Details(ref details) => match code {
                KeyCode::Char('q') => {
                    *exit = true;
                }
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Left => {
                    let focus = Some(details.book.id);
                    self.screen = Screen::Books;
                    self.clear_status();
                    self.reload_books(focus);
                }
                _ => {}
            },
        }
        Ok(Mode::Normal)
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_book(&form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = describe_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingBook(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    /// Validate the form and persist it. Validation problems and store
    /// failures both come back as errors so the form stays open for a retry.
    fn save_new_book(&mut self, form: &BookForm) -> Result<()> {
        let book = form.parse_inputs()?;
        let id = match self.store.add(&book) {
            Ok(id) => id,
            Err(err) => {
                error!(error = %err, title = %book.title, "failed to save book");
                return Err(anyhow::Error::from(err).context("Failed to save book"));
            }
        };
        info!(id, title = %book.title, "book saved");
        self.reload_books(Some(id));
        self.set_status("Book saved", StatusKind::Info);
        Ok(())
    }

    /// Fetch the book fresh from the store and switch to its detail view. A
    /// book that vanished since the list was read is reported, not shown.
    fn open_details(&mut self, id: i64) {
        match self.store.get(id) {
            Ok(Some(book)) => {
                self.screen = Screen::Details(BookDetailScreen { book });
            }
            Ok(None) => {
                self.reload_books(None);
                self.set_status("Book not found", StatusKind::Error);
            }
            Err(err) => {
                error!(error = %err, id, "failed to load book");
                let err = anyhow::Error::from(err).context("Failed to load book");
                self.set_status(describe_error(&err), StatusKind::Error);
            }
        }
    }

    /// Re-read the sorted catalog. On failure the previous list stays on
    /// screen and the footer explains why.
    fn reload_books(&mut self, focus_id: Option<i64>) {
        match self.store.list_all().context("Failed to load books") {
            Ok(books) => self.list.set_books(books, focus_id),
            Err(err) => {
                error!(error = %err, "failed to reload books");
                self.set_status(describe_error(&err), StatusKind::Error);
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        // Too short for both: the content keeps the whole area.
        let (content_area, footer_area) = if area.height > FOOTER_HEIGHT {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(FOOTER_HEIGHT)])
                .split(area);
            (chunks[0], Some(chunks[1]))
        } else {
            (area, None)
        };

        match &self.screen {
            Screen::Books => self.draw_book_list(frame, content_area),
            Screen::Details(details) => self.draw_book_details(frame, content_area, details),
        }

        if let Some(footer_area) = footer_area {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::Normal => {}
        }
    }

    fn draw_book_list(&self, frame: &mut Frame, area: Rect) {
        let title = format!("Books ({})", self.list.books.len());

        if self.list.books.is_empty() {
            let message = Paragraph::new("No books yet. Press 'a' to add one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .list
            .books
            .iter()
            .map(|book| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        book.title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        book.author.clone(),
                        Style::default().fg(Color::Gray),
                    )),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(self.list.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_book_details(&self, frame: &mut Frame, area: Rect, details: &BookDetailScreen) {
        let book = &details.book;
        let label = Style::default().add_modifier(Modifier::BOLD);
        let genre_style = if book.genre.is_some() {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("Title: ", label),
                Span::raw(book.title.clone()),
            ]),
            Line::from(vec![
                Span::styled("Author: ", label),
                Span::raw(book.author.clone()),
            ]),
            Line::from(vec![
                Span::styled("Genre: ", label),
                Span::styled(book.genre_label().to_string(), genre_style),
            ]),
        ];

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Book Details"))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        match (&self.mode, &self.screen) {
            (Mode::AddingBook(_), _) => Line::from(vec![
                Span::styled("[Enter]", key),
                Span::raw(" Save  "),
                Span::styled("[Tab]", key),
                Span::raw(" Next field  "),
                Span::styled("[Esc]", key),
                Span::raw(" Cancel"),
            ]),
            (Mode::Normal, Screen::Books) => Line::from(vec![
                Span::styled("[Up/Down]", key),
                Span::raw(" Move  "),
                Span::styled("[Enter]", key),
                Span::raw(" Details  "),
                Span::styled("[a]", key),
                Span::raw(" Add  "),
                Span::styled("[r]", key),
                Span::raw(" Reload  "),
                Span::styled("[q]", key),
                Span::raw(" Quit"),
            ]),
            (Mode::Normal, Screen::Details(_)) => Line::from(vec![
                Span::styled("[Esc]", key),
                Span::raw(" Back  "),
                Span::styled("[q]", key),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line(BookField::Title),
            form.build_line(BookField::Author),
            form.build_line(BookField::Genre),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save, Tab to switch, Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let field = form.active;
        let prefix = field.label().len() as u16 + 2;
        let value_len = u16::try_from(form.value_len(field)).unwrap_or(u16::MAX);
        let last_column = inner.right().saturating_sub(1).max(inner.x);
        let cursor_x = inner
            .x
            .saturating_add(prefix)
            .saturating_add(value_len)
            .min(last_column);
        let cursor_y = inner.y.saturating_add(field.row());
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBook;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn temp_app() -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let store = BookStore::open(dir.path().join("library.sqlite")).unwrap();
        let books = store.list_all().unwrap();
        (dir, App::new(store, books))
    }

    fn press(app: &mut App, codes: &[KeyCode]) {
        for code in codes {
            assert!(!app.handle_key(*code).unwrap());
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, &[KeyCode::Char(ch)]);
        }
    }

    fn status_text(app: &App) -> Option<&str> {
        app.status.as_ref().map(|status| status.text.as_str())
    }

    fn rendered(app: &App) -> String {
        rendered_at(app, 80, 24)
    }

    fn rendered_at(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn add_book(app: &mut App, title: &str, author: &str, genre: &str) {
        press(app, &[KeyCode::Char('a')]);
        type_text(app, title);
        press(app, &[KeyCode::Tab]);
        type_text(app, author);
        press(app, &[KeyCode::Tab]);
        type_text(app, genre);
        press(app, &[KeyCode::Enter]);
    }

    #[test]
    fn adding_a_book_saves_it_and_selects_it() {
        let (_dir, mut app) = temp_app();

        add_book(&mut app, "Zed", "Anon", "");
        add_book(&mut app, "Alpha", "Anon", "Essays");

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(status_text(&app), Some("Book saved"));
        let titles: Vec<&str> = app.list.books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, ["Alpha", "Zed"]);
        assert_eq!(app.list.current_book().map(|b| b.title.as_str()), Some("Alpha"));

        let stored = app.store.list_all().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].genre, None);
    }

    #[test]
    fn missing_author_keeps_form_open_and_stores_nothing() {
        let (_dir, mut app) = temp_app();

        press(&mut app, &[KeyCode::Char('a')]);
        type_text(&mut app, "Dune");
        press(&mut app, &[KeyCode::Enter]);

        match &app.mode {
            Mode::AddingBook(form) => {
                assert_eq!(form.error.as_deref(), Some("Please enter both title and author"));
                assert_eq!(form.title, "Dune");
            }
            Mode::Normal => panic!("form should stay open"),
        }
        assert_eq!(app.store.count().unwrap(), 0);
    }

    #[test]
    fn escape_cancels_the_form() {
        let (_dir, mut app) = temp_app();

        press(&mut app, &[KeyCode::Char('a')]);
        type_text(&mut app, "Dune");
        press(&mut app, &[KeyCode::Esc]);

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.store.count().unwrap(), 0);
        assert_eq!(status_text(&app), Some("Add cancelled."));
    }

    #[test]
    fn store_failure_is_reported_and_form_kept() {
        let (_dir, mut app) = temp_app();
        app.store
            .with_conn(|conn| conn.execute("DROP TABLE books", []))
            .unwrap();

        add_book(&mut app, "Dune", "Frank Herbert", "");

        assert!(matches!(app.mode, Mode::AddingBook(_)));
        let status = status_text(&app).unwrap();
        assert!(status.starts_with("Failed to save book: "), "unexpected status: {status}");
        assert!(status.contains("no such table"), "unexpected status: {status}");
    }

    #[test]
    fn failed_save_message_is_in_the_error_chain() {
        let (_dir, mut app) = temp_app();
        app.store
            .with_conn(|conn| conn.execute("DROP TABLE books", []))
            .unwrap();
        let form = BookForm {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            ..BookForm::default()
        };

        let err = app.save_new_book(&form).unwrap_err();

        assert_eq!(err.to_string(), "Failed to save book");
    }

    #[test]
    fn details_show_na_for_missing_genre() {
        let (_dir, mut app) = temp_app();
        add_book(&mut app, "Emma", "Jane Austen", "");

        press(&mut app, &[KeyCode::Enter]);

        assert!(matches!(app.screen, Screen::Details(_)));
        let screen = rendered(&app);
        assert!(screen.contains("Title: Emma"));
        assert!(screen.contains("Author: Jane Austen"));
        assert!(screen.contains("Genre: N/A"));

        press(&mut app, &[KeyCode::Esc]);
        assert!(matches!(app.screen, Screen::Books));
    }

    #[test]
    fn details_for_a_vanished_book_report_not_found() {
        let (_dir, mut app) = temp_app();
        let id = app
            .store
            .add(&NewBook::new("Emma", "Jane Austen", None))
            .unwrap();
        app.reload_books(None);
        app.store
            .with_conn(|conn| conn.execute("DELETE FROM books WHERE id = ?1", [id]))
            .unwrap();

        press(&mut app, &[KeyCode::Enter]);

        assert!(matches!(app.screen, Screen::Books));
        assert_eq!(status_text(&app), Some("Book not found"));
        assert!(app.list.books.is_empty());
    }

    #[test]
    fn empty_catalog_renders_hint() {
        let (_dir, mut app) = temp_app();

        press(&mut app, &[KeyCode::Enter]);

        assert_eq!(status_text(&app), Some("No book selected."));
        assert!(rendered(&app).contains("No books yet"));
    }

    #[test]
    fn reload_failure_names_the_store_error() {
        let (_dir, mut app) = temp_app();
        app.store
            .with_conn(|conn| conn.execute("DROP TABLE books", []))
            .unwrap();

        press(&mut app, &[KeyCode::Char('r')]);

        let status = status_text(&app).unwrap();
        assert!(status.starts_with("Failed to load books: "), "unexpected status: {status}");
        assert!(status.contains("no such table"), "unexpected status: {status}");
    }

    #[test]
    fn detail_load_failure_names_the_store_error() {
        let (_dir, mut app) = temp_app();
        add_book(&mut app, "Emma", "Jane Austen", "");
        app.store
            .with_conn(|conn| conn.execute("DROP TABLE books", []))
            .unwrap();

        press(&mut app, &[KeyCode::Enter]);

        assert!(matches!(app.screen, Screen::Books));
        let status = status_text(&app).unwrap();
        assert!(status.starts_with("Failed to load book: "), "unexpected status: {status}");
        assert!(status.contains("no such table"), "unexpected status: {status}");
    }

    #[test]
    fn very_long_field_keeps_cursor_inside_form() {
        let (_dir, mut app) = temp_app();
        app.mode = Mode::AddingBook(BookForm {
            title: "x".repeat(65_530),
            ..BookForm::default()
        });

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();

        let cursor = terminal.get_cursor_position().unwrap();
        assert!(cursor.x < 80);
        assert!(cursor.y < 24);
    }

    #[test]
    fn short_terminal_skips_the_footer() {
        let (_dir, app) = temp_app();

        let screen = rendered_at(&app, 80, 3);

        assert!(screen.contains("Books (0)"));
        assert!(!screen.contains("Quit"));
    }

    #[test]
    fn q_quits_from_the_list() {
        let (_dir, mut app) = temp_app();

        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }
}
