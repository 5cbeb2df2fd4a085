//! Timeline placement and collision resolution.
//!
//! Given a snapshot of tasks, these functions decide where a task dropped or
//! resized on a day legally lands. Nothing here mutates state: the result is a
//! [`ShiftPlan`] describing every slot change, or an [`Infeasible`] reason.

use thiserror::Error;
use tracing::debug;

use crate::fields::Duration;
use crate::grid::{self, WeekKey, SLOT_MINUTES, TOTAL_SLOTS};
use crate::task::Task;

/// Why a placement cannot be made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Infeasible {
    #[error("task {task} is not in the current task set")]
    UnknownTask { task: u64 },
    #[error("task {task} is not on the timeline")]
    NotScheduled { task: u64 },
    #[error("the task is longer than the visible day")]
    TooLongForDay,
    #[error("no room after the overlapping task; it would run past the end of the day")]
    PushedPastDayEnd,
    #[error("task {task} would be pushed past the end of the day")]
    CascadeOverflow { task: u64 },
    #[error("the day has no free slot long enough")]
    NoFreeSlot,
}

/// New start slot for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPatch {
    pub task: u64,
    pub slot: u32,
}

/// Every slot change needed to place one task without overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftPlan {
    pub week: WeekKey,
    pub day: u8,
    /// Task being placed or resized.
    pub task: u64,
    /// Final start slot of `task`.
    pub slot: u32,
    /// Duration `task` will have once the plan is applied.
    pub duration: Duration,
    /// The moving task first, then every displaced neighbour.
    pub patches: Vec<SlotPatch>,
}

impl ShiftPlan {
    /// A plan that only sets the moving task's slot.
    fn single(week: WeekKey, day: u8, task: u64, slot: u32, duration: Duration) -> Self {
        ShiftPlan {
            week,
            day,
            task,
            slot,
            duration,
            patches: vec![SlotPatch { task, slot }],
        }
    }

    /// Neighbours displaced by this plan (the moving task excluded).
    pub fn displaced(&self) -> &[SlotPatch] {
        self.patches.get(1..).unwrap_or(&[])
    }
}

/// Placement request for [`build_stable_shift_plan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftRequest {
    pub task: u64,
    pub day: u8,
    pub desired_slot: i64,
    /// Duration to plan with instead of the task's current one (resize).
    pub duration: Option<Duration>,
    /// Week to place into instead of the selected one.
    pub week: Option<WeekKey>,
}

impl ShiftRequest {
    pub fn new(task: u64, day: u8, desired_slot: i64) -> Self {
        ShiftRequest {
            task,
            day,
            desired_slot,
            duration: None,
            week: None,
        }
    }
}

fn find_task(tasks: &[Task], id: u64) -> Result<&Task, Infeasible> {
    tasks
        .iter()
        .find(|t| t.id == id)
        .ok_or(Infeasible::UnknownTask { task: id })
}

/// Tasks other than `moving` placed on `day` of `week`.
fn day_neighbours(tasks: &[Task], week: WeekKey, day: u8, moving: u64) -> impl Iterator<Item = &Task> {
    tasks
        .iter()
        .filter(move |t| t.id != moving && t.slot_on(week, day).is_some())
}

/// Closest free start slot to `desired` for `moving` on `day`.
///
/// Searches outward one slot at a time, later before earlier at each distance.
/// Returns `None` when the day has no gap long enough.
pub fn find_nearest_available_slot(
    tasks: &[Task],
    week: WeekKey,
    moving: u64,
    day: u8,
    desired: i64,
) -> Option<u32> {
    let task = tasks.iter().find(|t| t.id == moving)?;
    let needed = grid::slots_needed(task.duration) as i64;
    let max_start = grid::max_start(task.duration)? as i64;
    let start = desired.clamp(0, max_start);

    let mut occupied = [false; TOTAL_SLOTS as usize];
    for other in day_neighbours(tasks, week, day, moving) {
        if let Some((from, to)) = other.slot_span() {
            for slot in from..to.min(TOTAL_SLOTS) {
                occupied[slot as usize] = true;
            }
        }
    }

    let fits = |s: i64| -> bool {
        (0..=max_start).contains(&s) && (s..s + needed).all(|i| !occupied[i as usize])
    };

    if fits(start) {
        return Some(start as u32);
    }
    for distance in 1..=TOTAL_SLOTS as i64 {
        if fits(start + distance) {
            return Some((start + distance) as u32);
        }
        if fits(start - distance) {
            return Some((start - distance) as u32);
        }
    }
    debug!(task = moving, day, desired, "no free slot on day");
    None
}

/// Place a task at `desired_slot`, pushing later tasks on the same day forward.
///
/// The moving task never starts inside another task; it is pushed to the end
/// of whatever it lands in. Every task starting at or after it is then packed
/// behind it in original order, keeping its own slot when there is already
/// room. If anything would run past the end of the day the whole plan fails.
pub fn build_stable_shift_plan(
    tasks: &[Task],
    selected_week: WeekKey,
    request: ShiftRequest,
) -> Result<ShiftPlan, Infeasible> {
    let moving = find_task(tasks, request.task)?;
    let duration = request.duration.unwrap_or(moving.duration);
    let week = request.week.unwrap_or(selected_week);
    let moving_slots = grid::slots_needed(duration);
    let moving_max_start = grid::max_start(duration).ok_or(Infeasible::TooLongForDay)?;

    let mut neighbours: Vec<&Task> = day_neighbours(tasks, week, request.day, request.task).collect();
    neighbours.sort_by_key(|t| t.schedule.as_ref().map_or(0, |s| s.slot));

    let mut start = request.desired_slot.clamp(0, moving_max_start as i64) as u32;
    for n in &neighbours {
        if let Some((from, to)) = n.slot_span() {
            if from < start && start < to {
                start = to;
            }
        }
    }
    if start > moving_max_start {
        debug!(task = request.task, start, "pushed past day end");
        return Err(Infeasible::PushedPastDayEnd);
    }

    let mut plan = ShiftPlan::single(week, request.day, request.task, start, duration);
    let mut cursor = start + moving_slots;
    for n in neighbours {
        let Some((original, _)) = n.slot_span() else { continue };
        if original < start {
            continue;
        }
        let next = original.max(cursor);
        let limit = grid::max_start(n.duration).ok_or(Infeasible::CascadeOverflow { task: n.id })?;
        if next > limit {
            debug!(task = request.task, blocked_by = n.id, "cascade overflow");
            return Err(Infeasible::CascadeOverflow { task: n.id });
        }
        if next != original {
            plan.patches.push(SlotPatch { task: n.id, slot: next });
        }
        cursor = next + grid::slots_needed(n.duration);
    }

    debug!(
        task = request.task,
        day = request.day,
        slot = start,
        displaced = plan.displaced().len(),
        "built shift plan"
    );
    Ok(plan)
}

/// Plan a drop: a stable shift if possible, else the nearest free slot.
pub fn plan_drop(
    tasks: &[Task],
    week: WeekKey,
    task: u64,
    day: u8,
    desired: i64,
) -> Result<ShiftPlan, Infeasible> {
    match build_stable_shift_plan(tasks, week, ShiftRequest::new(task, day, desired)) {
        Ok(plan) => Ok(plan),
        Err(err @ Infeasible::UnknownTask { .. }) => Err(err),
        Err(reason) => {
            let duration = find_task(tasks, task)?.duration;
            find_nearest_available_slot(tasks, week, task, day, desired)
                .map(|slot| ShiftPlan::single(week, day, task, slot, duration))
                .ok_or_else(|| {
                    debug!(task, %reason, "shift plan and nearest slot both failed");
                    Infeasible::NoFreeSlot
                })
        }
    }
}

/// Plan a resize of a scheduled task in place.
pub fn plan_resize(tasks: &[Task], task: u64, duration: Duration) -> Result<ShiftPlan, Infeasible> {
    let current = find_task(tasks, task)?;
    let Some(schedule) = current.schedule.as_ref() else {
        return Err(Infeasible::NotScheduled { task });
    };
    let request = ShiftRequest {
        task,
        day: schedule.day,
        desired_slot: schedule.slot as i64,
        duration: Some(duration),
        week: Some(schedule.week),
    };
    build_stable_shift_plan(tasks, schedule.week, request)
}

/// Duration after dragging a resize handle by `pixel_delta`.
///
/// Counts whole slots dragged; under half a slot leaves `start` untouched.
/// Otherwise the card's slot count changes by that many and the result is
/// clamped to the resize range.
pub fn resize_duration(start: Duration, pixel_delta: f32, slot_height: f32) -> Duration {
    if slot_height <= 0.0 || !pixel_delta.is_finite() {
        return start;
    }
    let delta_slots = (pixel_delta / slot_height).round() as i64;
    if delta_slots == 0 {
        return start;
    }
    let slots = grid::slots_needed(start) as i64 + delta_slots;
    let minutes = (slots * SLOT_MINUTES as i64).clamp(
        Duration::RESIZE_MIN.minutes() as i64,
        Duration::RESIZE_MAX.minutes() as i64,
    );
    Duration::from_minutes(minutes as u32).unwrap_or(start)
}
