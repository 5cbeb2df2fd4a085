//! JSON file storage and display helpers.
//!
//! This module provides the on-disk `Database` for one user, the
//! [`JsonRepository`] that implements [`TaskRepository`] on top of it, and a
//! few formatting utilities shared by the CLI and the TUI.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{Datelike, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{PlannerError, Result};
use crate::grid::{self, WeekKey};
use crate::order::prune_order;
use crate::profile::Profile;
use crate::repo::{PlannerData, TaskRepository};
use crate::task::{Task, TaskPatch};

/// Contents of one user's data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub selected_week_start: WeekKey,
    #[serde(default)]
    pub backlog_order: Vec<u64>,
    #[serde(default)]
    pub kanban_order: Vec<u64>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Default for Database {
    fn default() -> Self {
        Database {
            selected_week_start: WeekKey::current(),
            backlog_order: Vec::new(),
            kanban_order: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

impl Database {
    /// Load from a JSON file. A missing file is an empty database; an unreadable
    /// one is an error so it is never silently overwritten.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Database::default());
        }
        let mut buf = String::new();
        File::open(path)?.read_to_string(&mut buf)?;
        let mut db: Database = serde_json::from_str(&buf)?;
        for task in &mut db.tasks {
            task.sync_completed();
            if !task.has_valid_schedule() {
                warn!(id = task.id, schedule = ?task.schedule, "placement outside the week grid; moved to backlog");
                task.schedule = None;
            }
        }
        Ok(db)
    }

    /// Save to a JSON file using an atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Generate the next available task ID.
    pub fn next_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Remove tasks and prune them from both orders.
    pub fn remove_ids(&mut self, ids: &HashSet<u64>) {
        self.tasks.retain(|t| !ids.contains(&t.id));
        self.backlog_order = prune_order(&self.backlog_order, &self.tasks);
        self.kanban_order = prune_order(&self.kanban_order, &self.tasks);
    }

    fn into_planner_data(self) -> PlannerData {
        PlannerData {
            selected_week_start: self.selected_week_start,
            backlog_order: self.backlog_order,
            kanban_order: self.kanban_order,
            tasks: self.tasks,
        }
    }
}

/// One JSON file per user inside a data directory.
#[derive(Debug, Clone)]
pub struct JsonRepository {
    dir: PathBuf,
}

impl JsonRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonRepository { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of `user`'s data file.
    pub fn path_for(&self, user: &str) -> PathBuf {
        Profile::new(user, &self.dir).file_path
    }

    /// Load, mutate and save a user's file in one step.
    fn with_db<T>(&self, user: &str, f: impl FnOnce(&mut Database) -> Result<T>) -> Result<T> {
        let path = self.path_for(user);
        let mut db = Database::load(&path)?;
        let out = f(&mut db)?;
        db.save(&path)?;
        Ok(out)
    }
}

impl TaskRepository for JsonRepository {
    fn load_planner_data(&mut self, user: &str) -> Result<PlannerData> {
        let path = self.path_for(user);
        let db = Database::load(&path)?;
        if !path.exists() {
            info!(user, path = %path.display(), "creating planner file");
            db.save(&path)?;
        }
        Ok(db.into_planner_data())
    }

    fn create_task(&mut self, user: &str, title: &str) -> Result<Task> {
        self.with_db(user, |db| {
            let task = Task::new(db.next_id(), title);
            db.tasks.push(task.clone());
            debug!(user, id = task.id, "task created");
            Ok(task)
        })
    }

    fn update_task(&mut self, user: &str, id: u64, patch: &TaskPatch) -> Result<Task> {
        self.with_db(user, |db| {
            let task = db.get_mut(id).ok_or(PlannerError::TaskNotFound { id })?;
            task.apply_patch(patch);
            task.updated_at_utc = Utc::now().timestamp();
            Ok(task.clone())
        })
    }

    fn delete_task(&mut self, user: &str, id: u64) -> Result<()> {
        self.with_db(user, |db| {
            db.remove_ids(&HashSet::from([id]));
            Ok(())
        })
    }

    fn update_backlog_order(&mut self, user: &str, order: &[u64], week: WeekKey) -> Result<()> {
        self.with_db(user, |db| {
            db.backlog_order = order.to_vec();
            db.selected_week_start = week;
            Ok(())
        })
    }

    fn update_kanban_order(&mut self, user: &str, order: &[u64], week: WeekKey) -> Result<()> {
        self.with_db(user, |db| {
            db.kanban_order = order.to_vec();
            db.selected_week_start = week;
            Ok(())
        })
    }

    fn update_selected_week_start(&mut self, user: &str, week: WeekKey) -> Result<()> {
        self.with_db(user, |db| {
            db.selected_week_start = week;
            Ok(())
        })
    }
}

/// Parse a due date: YYYY-MM-DD, "today", "tomorrow", "in Nd", "in Nw", or a weekday name.
pub fn parse_due_input(s: &str) -> Option<NaiveDate> {
    parse_due_relative_to(s, Local::now().date_naive())
}

fn parse_due_relative_to(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "eow" | "end of week" => {
            return Some(today + Duration::days(6 - today.weekday().num_days_from_monday() as i64))
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            return nd.trim().parse::<i64>().ok().map(|d| today + Duration::days(d));
        }
        if let Some(nw) = rest.strip_suffix('w') {
            return nw.trim().parse::<i64>().ok().map(|w| today + Duration::weeks(w));
        }
        return None;
    }

    if s.len() >= 3 && !s.starts_with(|c: char| c.is_ascii_digit()) {
        let target = grid::parse_day(&s)? as i64;
        let current = today.weekday().num_days_from_monday() as i64;
        return Some(today + Duration::days((target - current).rem_euclid(7)));
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let delta = (d - today).num_days();
            if delta == 0 {
                "today".into()
            } else if delta == 1 {
                "tomorrow".into()
            } else if delta > 1 {
                format!("in {delta}d")
            } else {
                format!("{}d late", -delta)
            }
        }
    }
}

/// Short placement label, e.g. "Tue 09:30", or "-" for backlog tasks.
pub fn format_placement(task: &Task) -> String {
    match &task.schedule {
        None => "-".into(),
        Some(s) => format!(
            "{} {}",
            &grid::DAY_NAMES[s.day.min(grid::DAYS_PER_WEEK - 1) as usize][..3],
            grid::short_time_label(s.slot)
        ),
    }
}

/// Eisenhower flags: "U" urgent, "I" important.
pub fn format_flags(task: &Task) -> String {
    let mut flags = String::new();
    if task.urgent {
        flags.push('U');
    }
    if task.important {
        flags.push('I');
    }
    if flags.is_empty() {
        flags.push('-');
    }
    flags
}

/// Print tasks as a table.
pub fn print_table(tasks: &[&Task], today: NaiveDate) {
    println!(
        "{:<5} {:<12} {:<6} {:<10} {:<10} {:<3} {}",
        "ID", "Status", "Dur", "When", "Due", "UI", "Title"
    );
    for t in tasks {
        println!(
            "{:<5} {:<12} {:<6} {:<10} {:<10} {:<3} {}",
            t.id,
            t.status.label(),
            t.duration.to_string(),
            format_placement(t),
            format_due_relative(t.due, today),
            format_flags(t),
            truncate(&t.title, 60),
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}
