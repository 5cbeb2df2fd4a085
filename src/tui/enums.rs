//! Enumerations for TUI state management.

/// Which board is on screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ViewMode {
    /// Backlog and the seven day timelines.
    #[default]
    Plan,
    /// Backlog and the status columns.
    Kanban,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            ViewMode::Plan => ViewMode::Kanban,
            ViewMode::Kanban => ViewMode::Plan,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Plan => "PLAN",
            ViewMode::Kanban => "KANBAN",
        }
    }
}

/// Application state for the terminal user interface.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum AppState {
    #[default]
    Board,
    TaskDetail,
    AddTask,
    ConfirmDelete,
}
