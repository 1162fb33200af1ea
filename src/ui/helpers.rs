use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Message of the error directly beneath the outermost context. Deeper
/// causes are skipped: for SQLite failures the innermost link is a bare
/// result code, while the store error above it carries the SQLite text.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .nth(1)
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// One-line summary pairing the outermost context with the root cause, or
/// just the message when there is no chain.
pub(crate) fn describe_error(err: &Error) -> String {
    if err.chain().count() > 1 {
        format!("{err}: {}", surface_error(err))
    } else {
        err.to_string()
    }
}
