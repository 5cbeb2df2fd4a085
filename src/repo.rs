//! Persistence boundary for the planner.
//!
//! The engine never stores anything itself; the planner calls a
//! [`TaskRepository`] for every change and keeps the returned records as the
//! authoritative ones.

use crate::error::Result;
use crate::grid::WeekKey;
use crate::task::{Task, TaskPatch};

/// Everything the planner needs for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerData {
    pub selected_week_start: WeekKey,
    pub backlog_order: Vec<u64>,
    pub kanban_order: Vec<u64>,
    pub tasks: Vec<Task>,
}

/// Storage operations scoped to a single user.
///
/// Implementations surface failures as errors and never retry.
pub trait TaskRepository {
    /// Load a user's planner, creating an empty profile on first use.
    fn load_planner_data(&mut self, user: &str) -> Result<PlannerData>;

    /// Create a backlog task with default fields.
    fn create_task(&mut self, user: &str, title: &str) -> Result<Task>;

    /// Merge `patch` into a task and return the stored record.
    fn update_task(&mut self, user: &str, id: u64, patch: &TaskPatch) -> Result<Task>;

    fn delete_task(&mut self, user: &str, id: u64) -> Result<()>;

    fn update_backlog_order(&mut self, user: &str, order: &[u64], week: WeekKey) -> Result<()>;

    fn update_kanban_order(&mut self, user: &str, order: &[u64], week: WeekKey) -> Result<()>;

    fn update_selected_week_start(&mut self, user: &str, week: WeekKey) -> Result<()>;
}
