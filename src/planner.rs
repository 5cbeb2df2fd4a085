//! Planner: the in-memory snapshot of one user's tasks and every operation
//! that changes it.
//!
//! Each change is sent to the [`TaskRepository`] first and only reflected in
//! the snapshot once storage accepted it. Shift plans touch several tasks; they
//! are applied all-or-nothing, reverting already-stored patches if a later one
//! fails.

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{PlannerError, Result};
use crate::fields::{Duration, Status};
use crate::grid::WeekKey;
use crate::order;
use crate::placement::{self, ShiftPlan};
use crate::repo::{PlannerData, TaskRepository};
use crate::session::{Mutation, Resolution};
use crate::task::{normalise_link, Attachment, Schedule, Task, TaskPatch};

pub struct Planner<R: TaskRepository> {
    repo: R,
    user: String,
    data: PlannerData,
}

impl<R: TaskRepository> Planner<R> {
    /// Load `user`'s planner from `repo`.
    pub fn load(mut repo: R, user: impl Into<String>) -> Result<Self> {
        let user = user.into();
        let data = repo.load_planner_data(&user)?;
        info!(user = %user, tasks = data.tasks.len(), week = %data.selected_week_start, "planner loaded");
        Ok(Planner { repo, user, data })
    }

    /// Discard the snapshot and read it again from storage.
    pub fn reload(&mut self) -> Result<()> {
        self.data = self.repo.load_planner_data(&self.user)?;
        Ok(())
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn tasks(&self) -> &[Task] {
        &self.data.tasks
    }

    pub fn task(&self, id: u64) -> Option<&Task> {
        self.data.tasks.iter().find(|t| t.id == id)
    }

    pub fn selected_week(&self) -> WeekKey {
        self.data.selected_week_start
    }

    pub fn backlog_order(&self) -> &[u64] {
        &self.data.backlog_order
    }

    pub fn kanban_order(&self) -> &[u64] {
        &self.data.kanban_order
    }

    /// Unscheduled tasks in display order.
    pub fn backlog(&self) -> Vec<&Task> {
        order::sort_by_order(self.data.tasks.iter().filter(|t| !t.is_scheduled()), &self.data.backlog_order)
    }

    /// One kanban column in display order.
    pub fn kanban_column(&self, status: Status) -> Vec<&Task> {
        order::sort_by_order(self.data.tasks.iter().filter(|t| t.status == status), &self.data.kanban_order)
    }

    /// Tasks placed on `day` of the selected week, by slot.
    pub fn scheduled_on(&self, day: u8) -> Vec<&Task> {
        let week = self.selected_week();
        let mut tasks: Vec<&Task> = self
            .data
            .tasks
            .iter()
            .filter(|t| t.slot_on(week, day).is_some())
            .collect();
        tasks.sort_by_key(|t| t.schedule.as_ref().map_or(0, |s| s.slot));
        tasks
    }

    /// (completed, scheduled) counts for the selected week.
    pub fn week_progress(&self) -> (usize, usize) {
        let week = self.selected_week();
        let scheduled: Vec<&Task> = self
            .data
            .tasks
            .iter()
            .filter(|t| t.schedule.as_ref().is_some_and(|s| s.week == week))
            .collect();
        let done = scheduled.iter().filter(|t| t.is_completed()).count();
        (done, scheduled.len())
    }

    pub fn create_task(&mut self, title: &str) -> Result<Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(PlannerError::invalid("task title cannot be empty"));
        }
        let task = self.repo.create_task(&self.user, title)?;
        info!(id = task.id, "task created");
        self.data.tasks.push(task.clone());
        Ok(task)
    }

    /// Apply a partial update. Unknown ids are ignored (`Ok(None)`).
    ///
    /// A duration change on a scheduled task goes through the shift planner so
    /// it cannot overlap its neighbours.
    pub fn update_task(&mut self, id: u64, mut patch: TaskPatch) -> Result<Option<Task>> {
        let Some(task) = self.task(id) else {
            return Ok(None);
        };
        if patch.schedule.is_some() {
            return Err(PlannerError::invalid("placement changes go through schedule or unschedule"));
        }
        if let Some(duration) = patch.duration {
            if task.is_scheduled() {
                if duration != task.duration {
                    self.resize(id, duration)?;
                }
                patch.duration = None;
            }
        }
        if !patch.is_empty() {
            self.commit_patches(vec![(id, patch)])?;
        }
        Ok(self.task(id).cloned())
    }

    pub fn set_completed(&mut self, id: u64, completed: bool) -> Result<Option<Task>> {
        self.update_task(id, TaskPatch { completed: Some(completed), ..Default::default() })
    }

    /// Delete a task and prune it from both orders. Returns whether it existed.
    pub fn delete_task(&mut self, id: u64) -> Result<bool> {
        if self.task(id).is_none() {
            return Ok(false);
        }
        self.repo.delete_task(&self.user, id)?;
        self.data.tasks.retain(|t| t.id != id);
        info!(id, "task deleted");

        let week = self.selected_week();
        let backlog = order::prune_order(&self.data.backlog_order, &self.data.tasks);
        self.repo.update_backlog_order(&self.user, &backlog, week)?;
        self.data.backlog_order = backlog;
        let kanban = order::prune_order(&self.data.kanban_order, &self.data.tasks);
        self.repo.update_kanban_order(&self.user, &kanban, week)?;
        self.data.kanban_order = kanban;
        Ok(true)
    }

    /// Put a task in the backlog at `index`, clearing any placement.
    pub fn move_in_backlog(&mut self, id: u64, index: usize) -> Result<bool> {
        let Some(task) = self.task(id) else {
            return Ok(false);
        };
        if task.is_scheduled() {
            self.commit_patches(vec![(id, TaskPatch::schedule(None))])?;
        }
        let ids: Vec<u64> = order::backlog_ids(&self.data.tasks, &self.data.backlog_order);
        let next = order::prune_order(&order::reorder_to_index(&ids, id, index), &self.data.tasks);
        self.repo.update_backlog_order(&self.user, &next, self.selected_week())?;
        self.data.backlog_order = next;
        Ok(true)
    }

    /// Clear a task's placement and append it to the backlog.
    pub fn unschedule(&mut self, id: u64) -> Result<bool> {
        self.move_in_backlog(id, usize::MAX)
    }

    /// Move a task into a kanban column at `index`.
    pub fn move_to_status(&mut self, id: u64, status: Status, index: usize) -> Result<bool> {
        let Some(task) = self.task(id) else {
            return Ok(false);
        };
        if task.status != status {
            self.commit_patches(vec![(id, TaskPatch::status(status))])?;
        }
        let merged = order::merge_kanban_order(&self.data.tasks, &self.data.kanban_order, id, status, index);
        let next = order::prune_order(&merged, &self.data.tasks);
        self.repo.update_kanban_order(&self.user, &next, self.selected_week())?;
        self.data.kanban_order = next;
        Ok(true)
    }

    /// Place a task on the selected week, shifting later tasks or snapping to
    /// the nearest free slot.
    pub fn schedule_at(&mut self, id: u64, day: u8, slot: i64) -> Result<Option<ShiftPlan>> {
        if self.task(id).is_none() {
            return Ok(None);
        }
        let plan = placement::plan_drop(&self.data.tasks, self.selected_week(), id, day, slot)?;
        self.commit_plan(&plan)?;
        Ok(Some(plan))
    }

    /// Change a task's duration. Scheduled tasks stay within the resize range
    /// and push their neighbours.
    pub fn resize(&mut self, id: u64, duration: Duration) -> Result<Option<ShiftPlan>> {
        let Some(task) = self.task(id) else {
            return Ok(None);
        };
        if task.duration == duration {
            return Ok(None);
        }
        if !task.is_scheduled() {
            let patch = TaskPatch { duration: Some(duration), ..Default::default() };
            self.commit_patches(vec![(id, patch)])?;
            return Ok(None);
        }
        if !(Duration::RESIZE_MIN..=Duration::RESIZE_MAX).contains(&duration) {
            return Err(PlannerError::invalid(format!(
                "scheduled tasks take {} to {}",
                Duration::RESIZE_MIN,
                Duration::RESIZE_MAX
            )));
        }
        let plan = placement::plan_resize(&self.data.tasks, id, duration)?;
        self.commit_plan(&plan)?;
        Ok(Some(plan))
    }

    /// Commit the outcome of a drag or resize gesture. Returns whether anything changed.
    pub fn apply(&mut self, resolution: Resolution) -> Result<bool> {
        match resolution {
            Resolution::Nothing => Ok(false),
            Resolution::Rejected { task, reason } => {
                info!(task, %reason, "placement rejected");
                Err(reason.into())
            }
            Resolution::Commit(Mutation::Place(plan)) | Resolution::Commit(Mutation::Resize(plan)) => {
                if self.task(plan.task).is_none() {
                    return Ok(false);
                }
                self.commit_plan(&plan)?;
                Ok(true)
            }
            Resolution::Commit(Mutation::Unschedule { task, index }) => self.move_in_backlog(task, index),
            Resolution::Commit(Mutation::SetStatus { task, status, index }) => {
                self.move_to_status(task, status, index)
            }
        }
    }

    pub fn set_week(&mut self, week: WeekKey) -> Result<()> {
        self.repo.update_selected_week_start(&self.user, week)?;
        self.data.selected_week_start = week;
        Ok(())
    }

    pub fn shift_week(&mut self, weeks: i64) -> Result<()> {
        self.set_week(self.selected_week().shift(weeks))
    }

    pub fn go_to_current_week(&mut self) -> Result<()> {
        self.set_week(WeekKey::current())
    }

    /// Append a link. Returns false if the task already has it.
    pub fn add_link(&mut self, id: u64, raw: &str) -> Result<bool> {
        let link = normalise_link(raw).ok_or_else(|| PlannerError::invalid("link cannot be empty"))?;
        let Some(task) = self.task(id) else {
            return Ok(false);
        };
        if task.links.contains(&link) {
            return Ok(false);
        }
        let mut links = task.links.clone();
        links.push(link);
        self.commit_patches(vec![(id, TaskPatch { links: Some(links), ..Default::default() })])?;
        Ok(true)
    }

    pub fn remove_link(&mut self, id: u64, index: usize) -> Result<bool> {
        let Some(task) = self.task(id) else {
            return Ok(false);
        };
        if index >= task.links.len() {
            return Ok(false);
        }
        let mut links = task.links.clone();
        links.remove(index);
        self.commit_patches(vec![(id, TaskPatch { links: Some(links), ..Default::default() })])?;
        Ok(true)
    }

    /// Record a file as an attachment. Only metadata and the path are stored.
    pub fn attach(&mut self, id: u64, path: &Path) -> Result<Option<Attachment>> {
        let Some(task) = self.task(id) else {
            return Ok(None);
        };
        let meta = std::fs::metadata(path)?;
        if !meta.is_file() {
            return Err(PlannerError::invalid(format!("{} is not a file", path.display())));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let payload_ref = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf())
            .display()
            .to_string();
        let attachment = Attachment {
            id: task.attachments.iter().map(|a| a.id).max().unwrap_or(0) + 1,
            name,
            mime_type: guess_mime(path).to_string(),
            size: meta.len(),
            payload_ref,
        };
        let mut attachments = task.attachments.clone();
        attachments.push(attachment.clone());
        self.commit_patches(vec![(id, TaskPatch { attachments: Some(attachments), ..Default::default() })])?;
        Ok(Some(attachment))
    }

    pub fn detach(&mut self, id: u64, attachment: u64) -> Result<bool> {
        let Some(task) = self.task(id) else {
            return Ok(false);
        };
        if !task.attachments.iter().any(|a| a.id == attachment) {
            return Ok(false);
        }
        let attachments: Vec<Attachment> = task.attachments.iter().filter(|a| a.id != attachment).cloned().collect();
        self.commit_patches(vec![(id, TaskPatch { attachments: Some(attachments), ..Default::default() })])?;
        Ok(true)
    }

    /// Turn a shift plan into per-task patches and commit them together.
    fn commit_plan(&mut self, plan: &ShiftPlan) -> Result<()> {
        let mut patches = Vec::with_capacity(plan.patches.len());
        for p in &plan.patches {
            let Some(task) = self.task(p.task) else { continue };
            let patch = if p.task == plan.task {
                let schedule = match &task.schedule {
                    Some(s) if s.week == plan.week && s.day == plan.day => Schedule { slot: p.slot, ..s.clone() },
                    _ => Schedule::new(plan.week, plan.day, p.slot),
                };
                TaskPatch {
                    schedule: Some(Some(schedule)),
                    duration: (plan.duration != task.duration).then_some(plan.duration),
                    ..Default::default()
                }
            } else {
                let Some(current) = &task.schedule else { continue };
                TaskPatch::schedule(Some(Schedule { slot: p.slot, ..current.clone() }))
            };
            patches.push((p.task, patch));
        }
        self.commit_patches(patches)?;
        info!(
            task = plan.task,
            day = plan.day,
            slot = plan.slot,
            displaced = plan.displaced().len(),
            "shift plan committed"
        );
        Ok(())
    }

    /// Store every patch or none of them, then update the snapshot.
    fn commit_patches(&mut self, patches: Vec<(u64, TaskPatch)>) -> Result<()> {
        let mut stored: Vec<(u64, TaskPatch)> = Vec::with_capacity(patches.len());
        let mut updated: Vec<Task> = Vec::with_capacity(patches.len());
        for (id, patch) in &patches {
            let Some(current) = self.data.tasks.iter().find(|t| t.id == *id) else { continue };
            let inverse = patch.inverse_for(current);
            match self.repo.update_task(&self.user, *id, patch) {
                Ok(task) => {
                    stored.push((*id, inverse));
                    updated.push(task);
                }
                Err(err) => {
                    warn!(task = id, error = %err, reverted = stored.len(), "patch failed; reverting");
                    self.revert(stored);
                    return Err(err);
                }
            }
        }
        let expected: HashSet<u64> = patches.iter().map(|(id, _)| *id).collect();
        for task in updated {
            if !expected.contains(&task.id) {
                continue;
            }
            if let Some(slot) = self.data.tasks.iter_mut().find(|t| t.id == task.id) {
                *slot = task;
            }
        }
        Ok(())
    }

    fn revert(&mut self, stored: Vec<(u64, TaskPatch)>) {
        for (id, inverse) in stored.into_iter().rev() {
            if let Err(err) = self.repo.update_task(&self.user, id, &inverse) {
                warn!(task = id, error = %err, "could not revert patch");
            }
        }
    }
}

/// Best-effort MIME type from a file extension.
pub fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::JsonRepository;
    use crate::placement::{Infeasible, SlotPatch};

    /// Wraps a repository and fails the n-th `update_task` call.
    struct FlakyRepo {
        inner: JsonRepository,
        calls: usize,
        fail_on: Option<usize>,
    }

    impl TaskRepository for FlakyRepo {
        fn load_planner_data(&mut self, user: &str) -> Result<PlannerData> {
            self.inner.load_planner_data(user)
        }
        fn create_task(&mut self, user: &str, title: &str) -> Result<Task> {
            self.inner.create_task(user, title)
        }
        fn update_task(&mut self, user: &str, id: u64, patch: &TaskPatch) -> Result<Task> {
            self.calls += 1;
            if self.fail_on == Some(self.calls) {
                return Err(std::io::Error::other("disk unplugged").into());
            }
            self.inner.update_task(user, id, patch)
        }
        fn delete_task(&mut self, user: &str, id: u64) -> Result<()> {
            self.inner.delete_task(user, id)
        }
        fn update_backlog_order(&mut self, user: &str, order: &[u64], week: WeekKey) -> Result<()> {
            self.inner.update_backlog_order(user, order, week)
        }
        fn update_kanban_order(&mut self, user: &str, order: &[u64], week: WeekKey) -> Result<()> {
            self.inner.update_kanban_order(user, order, week)
        }
        fn update_selected_week_start(&mut self, user: &str, week: WeekKey) -> Result<()> {
            self.inner.update_selected_week_start(user, week)
        }
    }

    fn planner(dir: &Path) -> Planner<JsonRepository> {
        let mut p = Planner::load(JsonRepository::new(dir), "ada").unwrap();
        p.set_week(WeekKey::parse("2026-10-19").unwrap()).unwrap();
        p
    }

    #[test]
    fn test_create_rejects_blank_title() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = planner(dir.path());
        assert!(matches!(p.create_task("   "), Err(PlannerError::InvalidArgument { .. })));
        assert_eq!(p.create_task("  Plan week ").unwrap().title, "Plan week");
    }

    #[test]
    fn test_schedule_scenario_pushes_neighbour() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = planner(dir.path());
        let a = p.create_task("a").unwrap().id;
        let b = p.create_task("b").unwrap().id;
        let c = p.create_task("c").unwrap().id;
        p.resize(a, Duration::M60).unwrap();
        p.schedule_at(a, 0, 10).unwrap();
        p.schedule_at(b, 0, 12).unwrap();

        let plan = p.schedule_at(c, 0, 11).unwrap().unwrap();
        assert_eq!(plan.patches, vec![SlotPatch { task: c, slot: 12 }, SlotPatch { task: b, slot: 13 }]);
        let slots: Vec<(u64, u32)> = p
            .scheduled_on(0)
            .iter()
            .map(|t| (t.id, t.schedule.as_ref().unwrap().slot))
            .collect();
        assert_eq!(slots, vec![(a, 10), (c, 12), (b, 13)]);

        // The snapshot matches what was stored.
        let mut fresh = Planner::load(JsonRepository::new(dir.path()), "ada").unwrap();
        fresh.reload().unwrap();
        assert_eq!(fresh.tasks(), p.tasks());
    }

    #[test]
    fn test_failed_patch_reverts_earlier_ones() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = planner(dir.path());
        let a = p.create_task("a").unwrap().id;
        let b = p.create_task("b").unwrap().id;
        p.schedule_at(a, 2, 4).unwrap();
        p.schedule_at(b, 2, 5).unwrap();
        let before = p.tasks().to_vec();

        let repo = FlakyRepo { inner: JsonRepository::new(dir.path()), calls: 0, fail_on: Some(2) };
        let mut flaky = Planner::load(repo, "ada").unwrap();
        // Resizing `a` must move `b`; the second patch fails.
        let err = flaky.resize(a, Duration::M60).unwrap_err();
        assert!(matches!(err, PlannerError::Io(_)));
        assert_eq!(flaky.tasks(), before.as_slice());

        p.reload().unwrap();
        let stored: Vec<(u64, Duration, u32)> = p
            .tasks()
            .iter()
            .map(|t| (t.id, t.duration, t.schedule.as_ref().unwrap().slot))
            .collect();
        assert_eq!(stored, vec![(a, Duration::M30, 4), (b, Duration::M30, 5)]);
    }

    #[test]
    fn test_rejected_resolution_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = planner(dir.path());
        let a = p.create_task("a").unwrap().id;
        let before = p.tasks().to_vec();
        let result = p.apply(Resolution::Rejected { task: a, reason: Infeasible::NoFreeSlot });
        assert!(matches!(result, Err(PlannerError::Infeasible(Infeasible::NoFreeSlot))));
        assert_eq!(p.tasks(), before.as_slice());
    }

    #[test]
    fn test_stale_ids_are_no_ops() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = planner(dir.path());
        assert_eq!(p.update_task(77, TaskPatch::status(Status::Done)).unwrap(), None);
        assert!(!p.delete_task(77).unwrap());
        assert!(!p.move_in_backlog(77, 0).unwrap());
        assert_eq!(p.schedule_at(77, 0, 0).unwrap(), None);
        let placed = Resolution::Commit(Mutation::SetStatus { task: 77, status: Status::Done, index: 0 });
        assert!(!p.apply(placed).unwrap());
    }

    #[test]
    fn test_backlog_reorder_and_unschedule() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = planner(dir.path());
        let a = p.create_task("a").unwrap().id;
        let b = p.create_task("b").unwrap().id;
        let c = p.create_task("c").unwrap().id;
        p.move_in_backlog(a, 0).unwrap();
        p.move_in_backlog(b, 1).unwrap();
        p.move_in_backlog(c, 2).unwrap();
        let ids = |p: &Planner<JsonRepository>| p.backlog().iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(ids(&p), vec![a, b, c]);

        p.move_in_backlog(b, 0).unwrap();
        assert_eq!(ids(&p), vec![b, a, c]);

        p.schedule_at(a, 1, 0).unwrap();
        assert_eq!(ids(&p), vec![b, c]);
        p.move_in_backlog(a, 1).unwrap();
        assert!(!p.task(a).unwrap().is_scheduled());
        assert_eq!(ids(&p), vec![b, a, c]);
    }

    #[test]
    fn test_move_to_status_derives_completion_and_orders_column() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = planner(dir.path());
        let a = p.create_task("a").unwrap().id;
        let b = p.create_task("b").unwrap().id;
        p.move_to_status(a, Status::Done, 0).unwrap();
        p.move_to_status(b, Status::Done, 0).unwrap();
        assert!(p.task(b).unwrap().is_completed());
        let done: Vec<u64> = p.kanban_column(Status::Done).iter().map(|t| t.id).collect();
        assert_eq!(done, vec![b, a]);
        assert!(p.kanban_column(Status::NotStarted).is_empty());
    }

    #[test]
    fn test_delete_prunes_orders() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = planner(dir.path());
        let a = p.create_task("a").unwrap().id;
        let b = p.create_task("b").unwrap().id;
        p.move_in_backlog(a, 0).unwrap();
        p.move_to_status(a, Status::InProgress, 0).unwrap();
        assert!(p.delete_task(a).unwrap());
        assert!(!p.backlog_order().contains(&a));
        assert!(!p.kanban_order().contains(&a));
        assert_eq!(p.backlog_order(), &[b]);
    }

    #[test]
    fn test_week_progress_counts_selected_week() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = planner(dir.path());
        let a = p.create_task("a").unwrap().id;
        let b = p.create_task("b").unwrap().id;
        p.schedule_at(a, 0, 0).unwrap();
        p.schedule_at(b, 1, 0).unwrap();
        p.set_completed(a, true).unwrap();
        assert_eq!(p.week_progress(), (1, 2));
        p.shift_week(1).unwrap();
        assert_eq!(p.week_progress(), (0, 0));
    }

    #[test]
    fn test_update_duration_of_scheduled_task_uses_shift_plan() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = planner(dir.path());
        let a = p.create_task("a").unwrap().id;
        let b = p.create_task("b").unwrap().id;
        p.schedule_at(a, 3, 4).unwrap();
        p.schedule_at(b, 3, 5).unwrap();
        let patch = TaskPatch { duration: Some(Duration::M90), title: Some("A".into()), ..Default::default() };
        let updated = p.update_task(a, patch).unwrap().unwrap();
        assert_eq!(updated.title, "A");
        assert_eq!(updated.duration, Duration::M90);
        assert_eq!(p.task(b).unwrap().schedule.as_ref().unwrap().slot, 7);
    }

    #[test]
    fn test_scheduled_durations_stay_in_resize_range() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = planner(dir.path());
        let a = p.create_task("a").unwrap().id;
        let b = p.create_task("b").unwrap().id;
        p.update_task(b, TaskPatch { duration: Some(Duration::M15), ..Default::default() }).unwrap();
        assert_eq!(p.task(b).unwrap().duration, Duration::M15);

        p.schedule_at(a, 2, 4).unwrap();
        let short = TaskPatch { duration: Some(Duration::M15), ..Default::default() };
        assert!(matches!(p.update_task(a, short), Err(PlannerError::InvalidArgument { .. })));
        assert!(matches!(p.resize(a, Duration::M15), Err(PlannerError::InvalidArgument { .. })));
        assert_eq!(p.task(a).unwrap().duration, Duration::M30);
    }

    #[test]
    fn test_links_and_attachments() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = planner(dir.path());
        let a = p.create_task("a").unwrap().id;
        assert!(p.add_link(a, "example.com").unwrap());
        assert!(!p.add_link(a, "https://example.com").unwrap());
        assert!(p.add_link(a, "http://other.org").unwrap());
        assert!(p.remove_link(a, 0).unwrap());
        assert_eq!(p.task(a).unwrap().links, vec!["http://other.org".to_string()]);

        let file = dir.path().join("notes.md");
        std::fs::write(&file, "# hi").unwrap();
        let attachment = p.attach(a, &file).unwrap().unwrap();
        assert_eq!(attachment.mime_type, "text/markdown");
        assert_eq!(attachment.size, 4);
        assert!(p.detach(a, attachment.id).unwrap());
        assert!(p.task(a).unwrap().attachments.is_empty());
    }
}
