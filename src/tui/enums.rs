//! Enumerations for TUI state management.

/// Which screen has the keyboard.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    Dashboard,
    NewTask,
    Chat,
    Help,
}

/// Where typed characters go while on the dashboard.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Focus {
    Content,
    Search,
}
