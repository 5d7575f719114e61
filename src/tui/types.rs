//! TUI type definitions for focus and actions.

/// Which part of the screen receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Episode list (navigation keys)
    List,
    /// Search input (text entry)
    Search,
}

/// Actions that can be returned from the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No action, continue running
    None,
    /// Quit the application
    Quit,
    /// The user selected the episode with this id
    Select(String),
}
