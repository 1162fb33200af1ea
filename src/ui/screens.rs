use crate::models::Book;

/// The sorted catalog plus the highlighted row.
pub(crate) struct BookListScreen {
    pub(crate) books: Vec<Book>,
    pub(crate) selected: usize,
}

impl BookListScreen {
    pub(crate) fn new(books: Vec<Book>) -> Self {
        let mut screen = Self { books, selected: 0 };
        screen.ensure_in_bounds();
        screen
    }

    pub(crate) fn current_book(&self) -> Option<&Book> {
        self.books.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.books.is_empty() {
            return;
        }
        let len = self.books.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.books.len().saturating_sub(1);
    }

    /// Replace the books after a reload, keeping the highlight on `focus_id`
    /// when it is still present and otherwise clamping the old position.
    pub(crate) fn set_books(&mut self, books: Vec<Book>, focus_id: Option<i64>) {
        self.books = books;
        if let Some(id) = focus_id {
            if let Some(idx) = self.books.iter().position(|book| book.id == id) {
                self.selected = idx;
            }
        }
        self.ensure_in_bounds();
    }

    fn ensure_in_bounds(&mut self) {
        if self.books.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.books.len() {
            self.selected = self.books.len() - 1;
        }
    }
}

/// Detail view for a single book fetched by id.
pub(crate) struct BookDetailScreen {
    pub(crate) book: Book,
}
