//! Task data structure and patch application.
//!
//! A task's completion is derived from its status, so the two can never
//! disagree. Every mutation goes through [`Task::apply_patch`], which is the
//! one place a "completed" request is translated into a status.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::*;
use crate::grid::{self, WeekKey};

/// A placement on the weekly timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub week: WeekKey,
    /// 0 = Monday .. 6 = Sunday.
    pub day: u8,
    /// 30-minute offset from the start of the visible day.
    pub slot: u32,
    #[serde(default)]
    pub timezone: String,
}

impl Schedule {
    pub fn new(week: WeekKey, day: u8, slot: u32) -> Self {
        Schedule {
            week,
            day,
            slot,
            timezone: grid::local_timezone_tag(),
        }
    }
}

/// File metadata attached to a task. The payload itself lives elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: u64,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub payload_ref: String,
}

/// A single planner item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub duration: Duration,
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub important: bool,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub status: Status,
    pub schedule: Option<Schedule>,
    /// Written for readers of the data file; recomputed from `status` on load.
    #[serde(default, skip_deserializing)]
    completed: bool,
    pub created_at_utc: i64,
    pub updated_at_utc: i64,
}

impl Task {
    /// A fresh backlog task with the default duration and status.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        let now = Utc::now().timestamp();
        Task {
            id,
            title: title.into(),
            duration: Duration::default(),
            due: None,
            urgent: false,
            important: false,
            notes: String::new(),
            links: Vec::new(),
            attachments: Vec::new(),
            status: Status::NotStarted,
            schedule: None,
            completed: false,
            created_at_utc: now,
            updated_at_utc: now,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Done
    }

    pub fn is_scheduled(&self) -> bool {
        self.schedule.is_some()
    }

    /// Placement of this task if it sits in `week` on `day`.
    pub fn slot_on(&self, week: WeekKey, day: u8) -> Option<u32> {
        self.schedule
            .as_ref()
            .filter(|s| s.week == week && s.day == day)
            .map(|s| s.slot)
    }

    /// Half-open slot range `[start, end)` occupied on the timeline.
    pub fn slot_span(&self) -> Option<(u32, u32)> {
        self.schedule
            .as_ref()
            .map(|s| (s.slot, s.slot.saturating_add(grid::slots_needed(self.duration))))
    }

    /// Whether the placement, if any, lies inside the week grid.
    pub fn has_valid_schedule(&self) -> bool {
        self.schedule.as_ref().map_or(true, |s| {
            s.day < grid::DAYS_PER_WEEK && grid::max_start(self.duration).is_some_and(|max| s.slot <= max)
        })
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
        self.completed = status == Status::Done;
    }

    /// Mark done, or reopen a done task as not started.
    pub fn set_completed(&mut self, completed: bool) {
        if completed {
            self.set_status(Status::Done);
        } else if self.status == Status::Done {
            self.set_status(Status::NotStarted);
        }
    }

    /// Re-derive the serialized completion flag after loading.
    pub(crate) fn sync_completed(&mut self) {
        self.completed = self.is_completed();
    }

    /// Merge a partial update into this task.
    pub fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(due) = patch.due {
            self.due = due;
        }
        if let Some(urgent) = patch.urgent {
            self.urgent = urgent;
        }
        if let Some(important) = patch.important {
            self.important = important;
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
        if let Some(links) = &patch.links {
            self.links = links.clone();
        }
        if let Some(attachments) = &patch.attachments {
            self.attachments = attachments.clone();
        }
        if let Some(schedule) = &patch.schedule {
            self.schedule = schedule.clone();
        }
        // An explicit status wins over a completion toggle in the same patch.
        match (patch.status, patch.completed) {
            (Some(status), _) => self.set_status(status),
            (None, Some(completed)) => self.set_completed(completed),
            (None, None) => self.sync_completed(),
        }
    }
}

/// Partial replacement of task fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub duration: Option<Duration>,
    pub due: Option<Option<NaiveDate>>,
    pub urgent: Option<bool>,
    pub important: Option<bool>,
    pub notes: Option<String>,
    pub links: Option<Vec<String>>,
    pub attachments: Option<Vec<Attachment>>,
    pub status: Option<Status>,
    pub completed: Option<bool>,
    pub schedule: Option<Option<Schedule>>,
}

impl TaskPatch {
    pub fn schedule(schedule: Option<Schedule>) -> Self {
        TaskPatch {
            schedule: Some(schedule),
            ..Default::default()
        }
    }

    pub fn status(status: Status) -> Self {
        TaskPatch {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    /// The patch that restores `task`'s values for every field this patch touches.
    pub fn inverse_for(&self, task: &Task) -> TaskPatch {
        TaskPatch {
            title: self.title.as_ref().map(|_| task.title.clone()),
            duration: self.duration.map(|_| task.duration),
            due: self.due.map(|_| task.due),
            urgent: self.urgent.map(|_| task.urgent),
            important: self.important.map(|_| task.important),
            notes: self.notes.as_ref().map(|_| task.notes.clone()),
            links: self.links.as_ref().map(|_| task.links.clone()),
            attachments: self.attachments.as_ref().map(|_| task.attachments.clone()),
            status: (self.status.is_some() || self.completed.is_some()).then_some(task.status),
            completed: None,
            schedule: self.schedule.as_ref().map(|_| task.schedule.clone()),
        }
    }
}

/// Normalise a user-entered link: trim and default to https.
pub fn normalise_link(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Some(trimmed.to_string())
    } else {
        Some(format!("https://{trimmed}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let t = Task::new(1, "Write report");
        assert_eq!(t.duration, Duration::M30);
        assert_eq!(t.status, Status::NotStarted);
        assert!(!t.is_completed());
        assert!(t.schedule.is_none());
    }

    #[test]
    fn test_schedule_bounds() {
        let week = WeekKey::parse("2026-10-19").unwrap();
        let mut t = Task::new(1, "late");
        t.duration = Duration::M60;
        t.schedule = Some(Schedule::new(week, 6, 36));
        assert!(t.has_valid_schedule());
        t.schedule = Some(Schedule::new(week, 6, 37));
        assert!(!t.has_valid_schedule());
        t.schedule = Some(Schedule::new(week, 7, 0));
        assert!(!t.has_valid_schedule());
        t.schedule = Some(Schedule::new(week, 0, u32::MAX));
        assert_eq!(t.slot_span(), Some((u32::MAX, u32::MAX)));
    }

    #[test]
    fn test_completion_follows_status() {
        let mut t = Task::new(1, "a");
        t.apply_patch(&TaskPatch { completed: Some(true), ..Default::default() });
        assert_eq!(t.status, Status::Done);
        assert!(t.is_completed());

        t.apply_patch(&TaskPatch { completed: Some(false), ..Default::default() });
        assert_eq!(t.status, Status::NotStarted);

        t.set_status(Status::Blocked);
        t.set_completed(false);
        assert_eq!(t.status, Status::Blocked);
    }

    #[test]
    fn test_explicit_status_beats_completed_flag() {
        let mut t = Task::new(1, "a");
        t.apply_patch(&TaskPatch {
            status: Some(Status::InReview),
            completed: Some(true),
            ..Default::default()
        });
        assert_eq!(t.status, Status::InReview);
        assert!(!t.is_completed());
    }

    #[test]
    fn test_completed_field_is_ignored_on_load() {
        let mut t = Task::new(7, "a");
        t.set_status(Status::Done);
        let mut json: serde_json::Value = serde_json::to_value(&t).unwrap();
        assert_eq!(json["completed"], true);
        json["completed"] = serde_json::Value::Bool(false);
        let mut back: Task = serde_json::from_value(json).unwrap();
        back.sync_completed();
        assert!(back.is_completed());
    }

    #[test]
    fn test_inverse_patch_restores_touched_fields() {
        let mut t = Task::new(3, "a");
        let before = t.clone();
        let week = WeekKey::parse("2026-10-19").unwrap();
        let patch = TaskPatch {
            duration: Some(Duration::M90),
            schedule: Some(Some(Schedule::new(week, 1, 4))),
            ..Default::default()
        };
        let inverse = patch.inverse_for(&t);
        t.apply_patch(&patch);
        assert_ne!(t, before);
        t.apply_patch(&inverse);
        assert_eq!(t, before);
    }

    #[test]
    fn test_normalise_link() {
        assert_eq!(normalise_link(" example.com "), Some("https://example.com".into()));
        assert_eq!(normalise_link("HTTP://x.io"), Some("HTTP://x.io".into()));
        assert_eq!(normalise_link("   "), None);
    }
}
