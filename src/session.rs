//! Drag and resize session controller.
//!
//! One pointer gesture at a time is modelled as an explicit state machine:
//! `Idle -> Dragging -> Idle` or `Idle -> Resizing -> Idle`. Moves refresh a
//! preview computed by the placement engine; release recomputes the outcome
//! from the final pointer position and hands back a single [`Resolution`].
//! The controller never touches storage.

use tracing::debug;

use crate::fields::{Duration, Status};
use crate::grid::WeekKey;
use crate::placement::{self, Infeasible, ShiftPlan};
use crate::task::Task;

/// Pointer position in the surface's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

/// What lies under the pointer while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Timeline { day: u8, slot: i64 },
    Backlog { index: usize },
    Kanban { status: Status, index: usize },
    Nothing,
}

/// Hit testing supplied by whatever renders the board.
pub trait DropResolver {
    /// Resolve the element under `pointer`. `grab` is where the card was held,
    /// relative to its top-left corner, so timeline slots follow the card's top
    /// edge rather than the pointer.
    fn resolve(&self, pointer: Point, grab: Point, moving: u64) -> DropTarget;

    /// Height of one timeline slot in pointer units.
    fn slot_height(&self) -> f32;
}

/// Live feedback shown while a gesture is in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Timeline(ShiftPlan),
    Backlog { index: usize },
    Kanban { status: Status, index: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub task: u64,
    pub pointer: Point,
    /// Offset of the pointer from the card's top-left corner at pointer-down.
    pub grab: Point,
    /// Width and height of the card when it was picked up.
    pub card_size: Point,
    pub target: DropTarget,
    pub preview: Option<Preview>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeState {
    pub task: u64,
    pub start_y: f32,
    pub start_duration: Duration,
    pub duration: Duration,
    pub preview: Option<ShiftPlan>,
}

/// A state change the planner should commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Place(ShiftPlan),
    Resize(ShiftPlan),
    Unschedule { task: u64, index: usize },
    SetStatus { task: u64, status: Status, index: usize },
}

/// Outcome of releasing the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Commit(Mutation),
    Rejected { task: u64, reason: Infeasible },
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Session {
    #[default]
    Idle,
    Dragging(DragState),
    Resizing(ResizeState),
}

impl Session {
    pub fn is_idle(&self) -> bool {
        matches!(self, Session::Idle)
    }

    /// Task currently held by the pointer.
    pub fn active_task(&self) -> Option<u64> {
        match self {
            Session::Idle => None,
            Session::Dragging(d) => Some(d.task),
            Session::Resizing(r) => Some(r.task),
        }
    }

    /// Shift plan to draw as ghosts, if any.
    pub fn preview_plan(&self) -> Option<&ShiftPlan> {
        match self {
            Session::Dragging(DragState { preview: Some(Preview::Timeline(plan)), .. }) => Some(plan),
            Session::Resizing(ResizeState { preview: Some(plan), .. }) => Some(plan),
            _ => None,
        }
    }

    /// Pick up a card by its drag handle.
    pub fn begin_drag(&mut self, task: u64, pointer: Point, card_origin: Point, card_size: Point) -> bool {
        if !self.is_idle() {
            return false;
        }
        debug!(task, "drag started");
        *self = Session::Dragging(DragState {
            task,
            pointer,
            grab: Point::new(pointer.x - card_origin.x, pointer.y - card_origin.y),
            card_size,
            target: DropTarget::Nothing,
            preview: None,
        });
        true
    }

    /// Grab a scheduled card's resize handle. Backlog cards cannot be resized.
    pub fn begin_resize(&mut self, task: &Task, pointer_y: f32) -> bool {
        if !self.is_idle() || !task.is_scheduled() {
            return false;
        }
        debug!(task = task.id, "resize started");
        *self = Session::Resizing(ResizeState {
            task: task.id,
            start_y: pointer_y,
            start_duration: task.duration,
            duration: task.duration,
            preview: None,
        });
        true
    }

    /// Track the pointer and refresh the preview.
    pub fn pointer_move(&mut self, pointer: Point, resolver: &dyn DropResolver, tasks: &[Task], week: WeekKey) {
        match self {
            Session::Idle => {}
            Session::Dragging(drag) => {
                drag.pointer = pointer;
                drag.target = resolver.resolve(pointer, drag.grab, drag.task);
                drag.preview = match drag.target {
                    DropTarget::Timeline { day, slot } => {
                        placement::plan_drop(tasks, week, drag.task, day, slot)
                            .ok()
                            .map(Preview::Timeline)
                    }
                    DropTarget::Backlog { index } => Some(Preview::Backlog { index }),
                    DropTarget::Kanban { status, index } => Some(Preview::Kanban { status, index }),
                    DropTarget::Nothing => None,
                };
            }
            Session::Resizing(resize) => {
                resize.duration = placement::resize_duration(
                    resize.start_duration,
                    pointer.y - resize.start_y,
                    resolver.slot_height(),
                );
                resize.preview = if resize.duration == resize.start_duration {
                    None
                } else {
                    placement::plan_resize(tasks, resize.task, resize.duration).ok()
                };
            }
        }
    }

    /// Release the pointer. The session is always idle afterwards.
    pub fn pointer_up(
        &mut self,
        pointer: Point,
        resolver: &dyn DropResolver,
        tasks: &[Task],
        week: WeekKey,
    ) -> Resolution {
        let state = std::mem::take(self);
        let resolution = match state {
            Session::Idle => Resolution::Nothing,
            Session::Dragging(drag) => resolve_drop(&drag, pointer, resolver, tasks, week),
            Session::Resizing(resize) => resolve_resize(&resize, pointer, resolver, tasks),
        };
        debug!(?resolution, "pointer released");
        resolution
    }

    /// Abandon the gesture (Escape). Returns whether anything was cancelled.
    pub fn cancel(&mut self) -> bool {
        let was_active = !self.is_idle();
        if was_active {
            debug!(task = ?self.active_task(), "gesture cancelled");
        }
        *self = Session::Idle;
        was_active
    }
}

fn resolve_drop(
    drag: &DragState,
    pointer: Point,
    resolver: &dyn DropResolver,
    tasks: &[Task],
    week: WeekKey,
) -> Resolution {
    if !tasks.iter().any(|t| t.id == drag.task) {
        return Resolution::Nothing;
    }
    match resolver.resolve(pointer, drag.grab, drag.task) {
        DropTarget::Timeline { day, slot } => match placement::plan_drop(tasks, week, drag.task, day, slot) {
            Ok(plan) => Resolution::Commit(Mutation::Place(plan)),
            Err(reason) => Resolution::Rejected { task: drag.task, reason },
        },
        DropTarget::Backlog { index } => Resolution::Commit(Mutation::Unschedule { task: drag.task, index }),
        DropTarget::Kanban { status, index } => Resolution::Commit(Mutation::SetStatus {
            task: drag.task,
            status,
            index,
        }),
        DropTarget::Nothing => Resolution::Nothing,
    }
}

fn resolve_resize(resize: &ResizeState, pointer: Point, resolver: &dyn DropResolver, tasks: &[Task]) -> Resolution {
    if !tasks.iter().any(|t| t.id == resize.task) {
        return Resolution::Nothing;
    }
    let duration = placement::resize_duration(
        resize.start_duration,
        pointer.y - resize.start_y,
        resolver.slot_height(),
    );
    if duration == resize.start_duration {
        return Resolution::Nothing;
    }
    match placement::plan_resize(tasks, resize.task, duration) {
        Ok(plan) => Resolution::Commit(Mutation::Resize(plan)),
        Err(reason) => Resolution::Rejected { task: resize.task, reason },
    }
}
