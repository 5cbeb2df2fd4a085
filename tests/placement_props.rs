//! Property tests for the placement engine and ordering store.
//!
//! 1. A successful shift plan leaves the day free of overlaps and in bounds
//! 2. A shift plan never reorders tasks on the day
//! 3. The nearest free slot is at minimal distance, later slots winning ties
//! 4. Moving an id to its own index leaves an order unchanged
//! 5. Resizing or moving a task already on the day keeps 1 and 2

use proptest::prelude::*;
use weekplan::fields::Duration;
use weekplan::grid::{slots_needed, WeekKey, TOTAL_SLOTS};
use weekplan::order::reorder_to_index;
use weekplan::placement::{build_stable_shift_plan, find_nearest_available_slot, ShiftPlan, ShiftRequest};
use weekplan::task::{Schedule, Task};

const MOVING: u64 = 1_000;
const DAY: u8 = 2;

fn week() -> WeekKey {
    WeekKey::parse("2026-10-19").unwrap()
}

// ── Strategies ──────────────────────────────────────────────────────────

fn duration_strategy() -> impl Strategy<Value = Duration> {
    prop::sample::select(Duration::ALL.to_vec())
}

/// A day of non-overlapping tasks laid out left to right with random gaps,
/// plus an unscheduled task to move.
fn day_strategy() -> impl Strategy<Value = Vec<Task>> {
    (
        prop::collection::vec((duration_strategy(), 0u32..4), 0..12),
        duration_strategy(),
    )
        .prop_map(|(layout, moving_duration)| {
            let mut tasks = Vec::new();
            let mut cursor = 0;
            for (i, (duration, gap)) in layout.into_iter().enumerate() {
                let slot = cursor + gap;
                if slot + slots_needed(duration) > TOTAL_SLOTS {
                    break;
                }
                let mut t = Task::new(i as u64 + 1, format!("t{i}"));
                t.duration = duration;
                t.schedule = Some(Schedule::new(week(), DAY, slot));
                cursor = slot + slots_needed(duration);
                tasks.push(t);
            }
            let mut moving = Task::new(MOVING, "moving");
            moving.duration = moving_duration;
            tasks.push(moving);
            tasks
        })
}

/// A day with at least one placed task, one of which is picked to move or
/// resize, plus a new duration for it.
fn placed_strategy() -> impl Strategy<Value = (Vec<Task>, u64, Duration)> {
    (day_strategy(), any::<prop::sample::Index>(), duration_strategy())
        .prop_filter("needs a placed task", |(tasks, _, _)| tasks.len() > 1)
        .prop_map(|(mut tasks, pick, duration)| {
            tasks.retain(|t| t.id != MOVING);
            let id = tasks[pick.index(tasks.len())].id;
            (tasks, id, duration)
        })
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn apply(tasks: &[Task], plan: &ShiftPlan) -> Vec<Task> {
    let mut next = tasks.to_vec();
    for t in &mut next {
        if t.id == plan.task {
            t.duration = plan.duration;
            t.schedule = Some(Schedule::new(plan.week, plan.day, plan.slot));
        } else if let Some(p) = plan.patches.iter().find(|p| p.task == t.id) {
            if let Some(s) = t.schedule.as_mut() {
                s.slot = p.slot;
            }
        }
    }
    next
}

/// Occupied ranges on the day, sorted by start.
fn spans(tasks: &[Task]) -> Vec<(u64, u32, u32)> {
    let mut spans: Vec<(u64, u32, u32)> = tasks
        .iter()
        .filter_map(|t| {
            let slot = t.slot_on(week(), DAY)?;
            Some((t.id, slot, slot + slots_needed(t.duration)))
        })
        .collect();
    spans.sort_by_key(|s| s.1);
    spans
}

fn assert_no_overlap(after: &[(u64, u32, u32)]) -> Result<(), TestCaseError> {
    for pair in after.windows(2) {
        prop_assert!(pair[0].2 <= pair[1].1, "overlap: {:?}", pair);
    }
    for (_, _, end) in after {
        prop_assert!(*end <= TOTAL_SLOTS);
    }
    Ok(())
}

fn fits(tasks: &[Task], slot: i64, duration: Duration) -> bool {
    let end = slot + slots_needed(duration) as i64;
    slot >= 0
        && end <= TOTAL_SLOTS as i64
        && spans(tasks)
            .iter()
            .filter(|(id, _, _)| *id != MOVING)
            .all(|(_, from, to)| end <= *from as i64 || slot >= *to as i64)
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn shift_plan_leaves_day_without_overlaps(tasks in day_strategy(), desired in -5i64..45) {
        if let Ok(plan) = build_stable_shift_plan(&tasks, week(), ShiftRequest::new(MOVING, DAY, desired)) {
            let after = spans(&apply(&tasks, &plan));
            for pair in after.windows(2) {
                prop_assert!(pair[0].2 <= pair[1].1, "overlap: {:?}", pair);
            }
            for (_, _, end) in &after {
                prop_assert!(*end <= TOTAL_SLOTS);
            }
        }
    }

    #[test]
    fn shift_plan_keeps_relative_order(tasks in day_strategy(), desired in -5i64..45) {
        if let Ok(plan) = build_stable_shift_plan(&tasks, week(), ShiftRequest::new(MOVING, DAY, desired)) {
            let before: Vec<u64> = spans(&tasks).into_iter().map(|s| s.0).collect();
            let after: Vec<u64> = spans(&apply(&tasks, &plan))
                .into_iter()
                .map(|s| s.0)
                .filter(|id| *id != MOVING)
                .collect();
            prop_assert_eq!(before, after);
            for patch in plan.displaced() {
                let original = tasks.iter().find(|t| t.id == patch.task).unwrap();
                let slot = original.schedule.as_ref().unwrap().slot;
                prop_assert!(patch.slot > slot, "tasks only move later");
                prop_assert!(slot >= plan.slot, "tasks before the drop stay put");
            }
        }
    }

    #[test]
    fn nearest_slot_is_minimal_with_forward_ties(tasks in day_strategy(), desired in -5i64..45) {
        let duration = tasks.iter().find(|t| t.id == MOVING).unwrap().duration;
        let max_start = (TOTAL_SLOTS - slots_needed(duration)) as i64;
        let centre = desired.clamp(0, max_start);
        let feasible: Vec<i64> = (0..=max_start).filter(|s| fits(&tasks, *s, duration)).collect();

        match find_nearest_available_slot(&tasks, week(), MOVING, DAY, desired) {
            None => prop_assert!(feasible.is_empty()),
            Some(slot) => {
                let slot = slot as i64;
                prop_assert!(fits(&tasks, slot, duration));
                let best = feasible.iter().map(|s| (s - centre).abs()).min().unwrap();
                prop_assert_eq!((slot - centre).abs(), best);
                if slot < centre {
                    prop_assert!(!feasible.contains(&(centre + best)), "forward tie was free");
                }
            }
        }
    }

    #[test]
    fn resize_in_place_keeps_day_ordered((tasks, id, duration) in placed_strategy()) {
        let slot = tasks.iter().find_map(|t| if t.id == id { t.slot_on(week(), DAY) } else { None }).unwrap();
        let request = ShiftRequest {
            duration: Some(duration),
            week: Some(week()),
            ..ShiftRequest::new(id, DAY, slot as i64)
        };
        if let Ok(plan) = build_stable_shift_plan(&tasks, week(), request) {
            prop_assert_eq!(plan.duration, duration);
            let before: Vec<u64> = spans(&tasks).into_iter().map(|s| s.0).collect();
            let after = spans(&apply(&tasks, &plan));
            assert_no_overlap(&after)?;
            let after: Vec<u64> = after.into_iter().map(|s| s.0).collect();
            prop_assert_eq!(before, after);
        }
    }

    #[test]
    fn moving_a_placed_task_keeps_the_others_ordered((tasks, id, _) in placed_strategy(), desired in -5i64..45) {
        if let Ok(plan) = build_stable_shift_plan(&tasks, week(), ShiftRequest::new(id, DAY, desired)) {
            let others = |spans: Vec<(u64, u32, u32)>| -> Vec<u64> {
                spans.into_iter().map(|s| s.0).filter(|t| *t != id).collect()
            };
            let after = spans(&apply(&tasks, &plan));
            assert_no_overlap(&after)?;
            prop_assert_eq!(others(spans(&tasks)), others(after));
            for patch in plan.displaced() {
                let original = tasks.iter().find(|t| t.id == patch.task).unwrap();
                prop_assert!(patch.slot > original.schedule.as_ref().unwrap().slot, "tasks only move later");
            }
        }
    }

    #[test]
    fn reorder_to_own_index_is_identity(len in 1usize..20, pick in any::<prop::sample::Index>()) {
        let ids: Vec<u64> = (0..len as u64).map(|i| i * 7 + 3).collect();
        let index = pick.index(len);
        prop_assert_eq!(reorder_to_index(&ids, ids[index], index), ids);
    }
}

// ── Scenarios ───────────────────────────────────────────────────────────

#[test]
fn fully_booked_day_rejects_any_drop() {
    let mut tasks: Vec<Task> = (0..TOTAL_SLOTS)
        .map(|slot| {
            let mut t = Task::new(slot as u64 + 1, "busy");
            t.schedule = Some(Schedule::new(week(), DAY, slot));
            t
        })
        .collect();
    tasks.push(Task::new(MOVING, "moving"));
    for desired in [-1, 0, 17, 37, 50] {
        assert!(build_stable_shift_plan(&tasks, week(), ShiftRequest::new(MOVING, DAY, desired)).is_err());
        assert_eq!(find_nearest_available_slot(&tasks, week(), MOVING, DAY, desired), None);
    }
}
