//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::{Priority, Status};

/// Brand accent, used for borders of the focused pane.
pub const EMERALD: Color = Color::Rgb(16, 185, 129);
/// In-progress cards and info notices.
pub const SKY: Color = Color::Rgb(59, 130, 246);
/// Medium priority.
pub const AMBER: Color = Color::Rgb(245, 158, 11);
/// High priority and error toasts.
pub const DARK_RED: Color = Color::Rgb(185, 28, 28);

pub fn status_color(status: Status) -> Color {
    match status {
        Status::Todo => Color::Gray,
        Status::InProgress => SKY,
        Status::Done => EMERALD,
    }
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => DARK_RED,
        Priority::Medium => AMBER,
        Priority::Low => Color::DarkGray,
    }
}
