use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::NewBook;

/// Shown when either required field is left blank.
pub(crate) const MISSING_FIELDS_MESSAGE: &str = "Please enter both title and author";

/// Form state for adding a book.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) genre: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

/// Enumerates the fields within the book form to drive focus management.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Genre,
}

impl BookField {
    /// Label rendered in front of the field value.
    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Genre => "Genre",
        }
    }

    /// Zero-based row of the field inside the form.
    pub(crate) fn row(self) -> u16 {
        match self {
            BookField::Title => 0,
            BookField::Author => 1,
            BookField::Genre => 2,
        }
    }

    fn required(self) -> bool {
        !matches!(self, BookField::Genre)
    }
}

impl BookForm {
    /// Cycle focus forward: title, author, genre, then back to title.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Genre,
            BookField::Genre => BookField::Title,
        };
    }

    /// Cycle focus backward.
    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Genre,
            BookField::Author => BookField::Title,
            BookField::Genre => BookField::Author,
        };
    }

    fn value(&self, field: BookField) -> &String {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Genre => &self.genre,
        }
    }

    fn value_mut(&mut self, field: BookField) -> &mut String {
        match field {
            BookField::Title => &mut self.title,
            BookField::Author => &mut self.author,
            BookField::Genre => &mut self.genre,
        }
    }

    /// Append a character to the active field. Control characters are
    /// rejected.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let field = self.active;
        self.value_mut(field).push(ch);
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Trim the inputs and turn them into a book ready for the store. A blank
    /// genre becomes `None`.
    pub(crate) fn parse_inputs(&self) -> Result<NewBook> {
        let title = self.title.trim();
        let author = self.author.trim();
        if title.is_empty() || author.is_empty() {
            return Err(anyhow!(MISSING_FIELDS_MESSAGE));
        }
        Ok(NewBook::new(title, author, Some(self.genre.as_str())))
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            if field.required() {
                "<required>".to_string()
            } else {
                "<optional>".to_string()
            }
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Return the character count for the requested field.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        self.value(field).chars().count()
    }
}
