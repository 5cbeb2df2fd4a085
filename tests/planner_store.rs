//! Planner behaviour against the JSON repository in a temporary directory.

use std::path::Path;

use weekplan::db::JsonRepository;
use weekplan::error::{PlannerError, Result};
use weekplan::fields::{Duration, Status};
use weekplan::grid::WeekKey;
use weekplan::placement::{Infeasible, SlotPatch};
use weekplan::planner::Planner;
use weekplan::repo::{PlannerData, TaskRepository};
use weekplan::session::{Mutation, Resolution};
use weekplan::task::{Task, TaskPatch};

fn week() -> WeekKey {
    WeekKey::parse("2026-10-19").unwrap()
}

fn open(dir: &Path) -> Planner<JsonRepository> {
    let mut planner = Planner::load(JsonRepository::new(dir), "ada").unwrap();
    planner.set_week(week()).unwrap();
    planner
}

fn slot(planner: &Planner<impl TaskRepository>, id: u64) -> Option<u32> {
    planner.task(id)?.schedule.as_ref().map(|s| s.slot)
}

/// Repository whose n-th task update fails; every other call goes through.
struct FailingUpdate {
    inner: JsonRepository,
    calls: usize,
    fail_on: usize,
}

impl TaskRepository for FailingUpdate {
    fn load_planner_data(&mut self, user: &str) -> Result<PlannerData> {
        self.inner.load_planner_data(user)
    }
    fn create_task(&mut self, user: &str, title: &str) -> Result<Task> {
        self.inner.create_task(user, title)
    }
    fn update_task(&mut self, user: &str, id: u64, patch: &TaskPatch) -> Result<Task> {
        self.calls += 1;
        if self.calls == self.fail_on {
            return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into());
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

#[test]
fn drop_between_tasks_pushes_the_later_one() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = open(dir.path());
    let a = p.create_task("A").unwrap().id;
    let b = p.create_task("B").unwrap().id;
    let c = p.create_task("C").unwrap().id;
    p.resize(a, Duration::M60).unwrap();
    p.schedule_at(a, 4, 10).unwrap();
    p.schedule_at(b, 4, 12).unwrap();

    let plan = p.schedule_at(c, 4, 11).unwrap().unwrap();
    assert_eq!(plan.patches, vec![SlotPatch { task: c, slot: 12 }, SlotPatch { task: b, slot: 13 }]);
    assert_eq!((slot(&p, a), slot(&p, c), slot(&p, b)), (Some(10), Some(12), Some(13)));

    let reopened = open(dir.path());
    assert_eq!(reopened.tasks(), p.tasks());
}

#[test]
fn resize_into_free_space_moves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = open(dir.path());
    let a = p.create_task("A").unwrap().id;
    let b = p.create_task("B").unwrap().id;
    let c = p.create_task("C").unwrap().id;
    p.schedule_at(a, 0, 4).unwrap();
    p.schedule_at(b, 0, 7).unwrap();
    p.schedule_at(c, 0, 9).unwrap();

    let plan = p.resize(a, Duration::M90).unwrap().unwrap();
    assert!(plan.displaced().is_empty());
    assert_eq!((slot(&p, b), slot(&p, c)), (Some(7), Some(9)));

    // One more slot pushes B into the gap before C.
    let plan = p.resize(a, Duration::M120).unwrap().unwrap();
    assert_eq!(plan.displaced(), &[SlotPatch { task: b, slot: 8 }]);
    assert_eq!((slot(&p, b), slot(&p, c)), (Some(8), Some(9)));
}

#[test]
fn full_day_reports_infeasible_and_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = open(dir.path());
    for s in 0..weekplan::grid::TOTAL_SLOTS {
        let id = p.create_task(&format!("busy {s}")).unwrap().id;
        p.schedule_at(id, 6, s as i64).unwrap();
    }
    let extra = p.create_task("one more").unwrap().id;
    let before = p.tasks().to_vec();

    let err = p.schedule_at(extra, 6, 20).unwrap_err();
    assert!(matches!(err, PlannerError::Infeasible(Infeasible::NoFreeSlot)));
    assert_eq!(p.tasks(), before.as_slice());
}

#[test]
fn failed_commit_leaves_storage_as_it_was() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = open(dir.path());
    let a = p.create_task("A").unwrap().id;
    let b = p.create_task("B").unwrap().id;
    let c = p.create_task("C").unwrap().id;
    p.schedule_at(a, 1, 0).unwrap();
    p.schedule_at(b, 1, 1).unwrap();
    let on_disk = open(dir.path()).tasks().to_vec();

    // Dropping C at slot 0 needs three updates; the second one fails and the
    // first is reverted.
    let repo = FailingUpdate { inner: JsonRepository::new(dir.path()), calls: 0, fail_on: 2 };
    let mut flaky = Planner::load(repo, "ada").unwrap();
    let result = flaky.apply(Resolution::Commit(Mutation::Place(
        weekplan::placement::plan_drop(flaky.tasks(), week(), c, 1, 0).unwrap(),
    )));
    assert!(matches!(result, Err(PlannerError::Io(_))));

    let after = open(dir.path());
    let placement = |tasks: &[Task]| -> Vec<(u64, Option<u32>)> {
        tasks.iter().map(|t| (t.id, t.schedule.as_ref().map(|s| s.slot))).collect()
    };
    assert_eq!(placement(after.tasks()), placement(&on_disk));
    assert_eq!(placement(flaky.tasks()), placement(&on_disk));
}

#[test]
fn backlog_and_board_orders_survive_reload_and_deletion() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = open(dir.path());
    let a = p.create_task("a").unwrap().id;
    let b = p.create_task("b").unwrap().id;
    let c = p.create_task("c").unwrap().id;
    for (i, id) in [a, b, c].into_iter().enumerate() {
        p.move_in_backlog(id, i).unwrap();
    }
    p.move_in_backlog(b, 0).unwrap();
    let ids = |p: &Planner<JsonRepository>| p.backlog().iter().map(|t| t.id).collect::<Vec<_>>();
    assert_eq!(ids(&p), vec![b, a, c]);

    p.move_to_status(c, Status::InReview, 0).unwrap();
    p.move_to_status(a, Status::InReview, 0).unwrap();

    let mut reopened = open(dir.path());
    assert_eq!(ids(&reopened), vec![b, a, c]);
    let column: Vec<u64> = reopened.kanban_column(Status::InReview).iter().map(|t| t.id).collect();
    assert_eq!(column, vec![a, c]);

    reopened.delete_task(a).unwrap();
    let again = open(dir.path());
    assert!(!again.backlog_order().contains(&a));
    assert!(!again.kanban_order().contains(&a));
    assert_eq!(ids(&again), vec![b, c]);
}

#[test]
fn completed_flag_in_file_follows_status() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = open(dir.path());
    let a = p.create_task("a").unwrap().id;
    p.move_to_status(a, Status::Done, 0).unwrap();

    let path = JsonRepository::new(dir.path()).path_for("ada");
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"completed\": true"));

    // A hand-edited flag that disagrees with the status is ignored.
    std::fs::write(&path, raw.replace("\"completed\": true", "\"completed\": false")).unwrap();
    assert!(open(dir.path()).task(a).unwrap().is_completed());
}
