//! Explicit display orders for the backlog and the kanban board.
//!
//! Orders are plain id lists persisted independently of task attributes. They
//! may be stale (ids of deleted tasks) or incomplete (tasks never placed), so
//! every read goes through [`sort_by_order`] and every write through
//! [`prune_order`].

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use crate::fields::Status;
use crate::task::Task;

/// Sort tasks by their position in `order`. Tasks missing from `order` follow,
/// newest first; equal timestamps keep their input order.
pub fn sort_by_order<'a>(tasks: impl IntoIterator<Item = &'a Task>, order: &[u64]) -> Vec<&'a Task> {
    let position: HashMap<u64, usize> = order
        .iter()
        .enumerate()
        .rev()
        .map(|(i, id)| (*id, i))
        .collect();
    let mut sorted: Vec<&Task> = tasks.into_iter().collect();
    sorted.sort_by_key(|t| match position.get(&t.id) {
        Some(&i) => (0, i, Reverse(0)),
        None => (1, 0, Reverse(t.created_at_utc)),
    });
    sorted
}

/// Move `moving` to `index` (clamped), inserting it if it was absent.
pub fn reorder_to_index(ids: &[u64], moving: u64, index: usize) -> Vec<u64> {
    let mut next: Vec<u64> = ids.iter().copied().filter(|id| *id != moving).collect();
    let index = index.min(next.len());
    next.insert(index, moving);
    next
}

/// Drop ids that no longer name a task, and repeated ids.
pub fn prune_order(order: &[u64], tasks: &[Task]) -> Vec<u64> {
    let live: HashSet<u64> = tasks.iter().map(|t| t.id).collect();
    let mut seen = HashSet::new();
    order
        .iter()
        .copied()
        .filter(|id| live.contains(id) && seen.insert(*id))
        .collect()
}

/// Unscheduled tasks in display order.
pub fn backlog_ids(tasks: &[Task], order: &[u64]) -> Vec<u64> {
    sort_by_order(tasks.iter().filter(|t| !t.is_scheduled()), order)
        .into_iter()
        .map(|t| t.id)
        .collect()
}

/// Tasks in one kanban column, in display order.
pub fn kanban_column_ids(tasks: &[Task], order: &[u64], status: Status) -> Vec<u64> {
    sort_by_order(tasks.iter().filter(|t| t.status == status), order)
        .into_iter()
        .map(|t| t.id)
        .collect()
}

/// Combined kanban order after moving `moving` into `status` at `index`.
///
/// Each column keeps its own relative order; only the target column is
/// reordered. Columns are concatenated in status order.
pub fn merge_kanban_order(
    tasks: &[Task],
    order: &[u64],
    moving: u64,
    status: Status,
    index: usize,
) -> Vec<u64> {
    let mut merged = Vec::with_capacity(tasks.len());
    for column in Status::ALL {
        let ids: Vec<u64> = sort_by_order(
            tasks.iter().filter(|t| {
                let effective = if t.id == moving { status } else { t.status };
                effective == column
            }),
            order,
        )
        .into_iter()
        .map(|t| t.id)
        .collect();
        if column == status {
            merged.extend(reorder_to_index(&ids, moving, index));
        } else {
            merged.extend(ids);
        }
    }
    merged
}

/// Vertical bounds of a displayed list item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemBounds {
    pub id: u64,
    pub top: f32,
    pub height: f32,
}

impl ItemBounds {
    pub fn midpoint(&self) -> f32 {
        self.top + self.height / 2.0
    }
}

/// Insertion index for a pointer at `pointer_y` over a rendered list.
///
/// The moving item is skipped so the index is relative to the list without it,
/// which is what [`reorder_to_index`] expects.
pub fn insertion_index(items: &[ItemBounds], pointer_y: f32, moving: u64) -> usize {
    let others = items.iter().filter(|b| b.id != moving);
    let mut count = 0;
    for item in others {
        if pointer_y < item.midpoint() {
            return count;
        }
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: u64, created: i64) -> Task {
        let mut t = Task::new(id, format!("t{id}"));
        t.created_at_utc = created;
        t
    }

    #[test]
    fn test_sort_by_order_listed_then_newest() {
        let tasks = vec![task(1, 10), task(2, 30), task(3, 20), task(4, 40)];
        let sorted: Vec<u64> = sort_by_order(&tasks, &[3, 1]).iter().map(|t| t.id).collect();
        assert_eq!(sorted, vec![3, 1, 4, 2]);
    }

    #[test]
    fn test_sort_by_order_ties_are_stable() {
        let tasks = vec![task(5, 10), task(6, 10), task(7, 10)];
        let sorted: Vec<u64> = sort_by_order(&tasks, &[99]).iter().map(|t| t.id).collect();
        assert_eq!(sorted, vec![5, 6, 7]);
    }

    #[test]
    fn test_reorder_to_index() {
        assert_eq!(reorder_to_index(&[1, 2, 3], 2, 0), vec![2, 1, 3]);
        assert_eq!(reorder_to_index(&[1, 2, 3], 1, 99), vec![2, 3, 1]);
        assert_eq!(reorder_to_index(&[1, 2, 3], 4, 1), vec![1, 4, 2, 3]);
        assert_eq!(reorder_to_index(&[], 4, 3), vec![4]);
    }

    #[test]
    fn test_reorder_no_op_is_identity() {
        let ids = [10, 20, 30, 40];
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(reorder_to_index(&ids, *id, i), ids.to_vec());
        }
    }

    #[test]
    fn test_prune_order() {
        let tasks = vec![task(1, 0), task(2, 0)];
        assert_eq!(prune_order(&[2, 9, 1, 2], &tasks), vec![2, 1]);
    }

    #[test]
    fn test_merge_kanban_order_keeps_other_columns() {
        let mut tasks = vec![task(1, 1), task(2, 2), task(3, 3), task(4, 4)];
        tasks[2].set_status(Status::Done);
        tasks[3].set_status(Status::Done);
        // Columns: NotStarted [1, 2], Done [4, 3]
        let order = vec![1, 2, 4, 3];
        let merged = merge_kanban_order(&tasks, &order, 2, Status::Done, 1);
        assert_eq!(merged, vec![1, 4, 2, 3]);
    }

    #[test]
    fn test_insertion_index_uses_midpoints_and_skips_moving() {
        let items = [
            ItemBounds { id: 1, top: 0.0, height: 3.0 },
            ItemBounds { id: 2, top: 3.0, height: 3.0 },
            ItemBounds { id: 3, top: 6.0, height: 3.0 },
        ];
        assert_eq!(insertion_index(&items, 0.5, 9), 0);
        assert_eq!(insertion_index(&items, 2.0, 9), 1);
        assert_eq!(insertion_index(&items, 5.0, 9), 2);
        assert_eq!(insertion_index(&items, 20.0, 9), 3);
        // Skipping item 2: item 3's midpoint is the second boundary.
        assert_eq!(insertion_index(&items, 5.0, 2), 1);
    }
}
