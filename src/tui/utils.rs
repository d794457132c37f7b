//! Layout helpers for the terminal user interface.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// A rectangle of `percent_x` by `percent_y` centred inside `r`.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// A rectangle hugging the right edge of `r`, `percent_x` wide.
pub fn right_drawer(percent_x: u16, r: Rect) -> Rect {
    let width = r.width.saturating_mul(percent_x) / 100;
    Rect::new(r.x + r.width - width, r.y, width, r.height)
}
