//! Command implementations for the CLI interface.
//!
//! Each subcommand maps onto one or two [`Planner`] operations. Handlers print
//! their result and return errors to `main`, which reports them and picks the
//! exit code.

use std::path::{Path, PathBuf};

use chrono::{Local, TimeZone, Utc};
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::db::*;
use crate::error::{PlannerError, Result};
use crate::fields::*;
use crate::grid::{self, WeekKey};
use crate::planner::Planner;
use crate::profile::discover_profiles;
use crate::task::{Task, TaskPatch};
use crate::tui::run::run_tui;

/// The planner as used by the command line.
pub type Store = Planner<JsonRepository>;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive planner.
    Ui,

    /// Add a new backlog task.
    Add {
        /// Short title for the task.
        title: String,
        /// Length in minutes: 15, 30, 45, 60, 90, then every 30 up to 240.
        #[arg(long, value_parser = parse_duration_arg)]
        duration: Option<Duration>,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", "in Nd", or a weekday.
        #[arg(long)]
        due: Option<String>,
        /// Mark as urgent.
        #[arg(long)]
        urgent: bool,
        /// Mark as important.
        #[arg(long)]
        important: bool,
        /// Free-form notes.
        #[arg(long)]
        notes: Option<String>,
        /// Initial status.
        #[arg(long, value_enum)]
        status: Option<Status>,
    },

    /// List tasks.
    List {
        /// What to list.
        #[arg(long, value_enum, default_value_t = ListScope::Week)]
        scope: ListScope,
        /// Only tasks with this status.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Hide completed tasks.
        #[arg(long)]
        open: bool,
    },

    /// Show every field of a task.
    View { id: u64 },

    /// Update a task's fields.
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_parser = parse_duration_arg)]
        duration: Option<Duration>,
        #[arg(long)]
        due: Option<String>,
        /// Remove the due date.
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,
        #[arg(long)]
        urgent: Option<bool>,
        #[arg(long)]
        important: Option<bool>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Move a task to a kanban column.
    Status {
        id: u64,
        #[arg(value_enum)]
        status: Status,
        /// Position within the column (0 = top). Defaults to the bottom.
        #[arg(long)]
        index: Option<usize>,
    },

    /// Mark a task done.
    Done { id: u64 },

    /// Reopen a completed task.
    Reopen { id: u64 },

    /// Place a task on the selected week, pushing later tasks if needed.
    Schedule {
        id: u64,
        /// Day: mon..sun, a full name, or 0..6.
        day: String,
        /// Start time HH:MM between 05:00 and 23:30.
        time: String,
        /// Week to schedule in (any date in it). Also becomes the selected week.
        #[arg(long)]
        week: Option<String>,
    },

    /// Move a scheduled task back to the backlog.
    Unschedule {
        id: u64,
        /// Backlog position (0 = top). Defaults to the bottom.
        #[arg(long)]
        index: Option<usize>,
    },

    /// Change a task's duration, pushing later tasks if needed.
    Resize {
        id: u64,
        #[arg(value_parser = parse_duration_arg)]
        duration: Duration,
    },

    /// Move a backlog task to a new position.
    Reorder { id: u64, index: usize },

    /// Delete a task.
    Delete { id: u64 },

    /// Show or change the selected week.
    Week {
        /// "next", "prev", "current", or a date inside the week.
        target: Option<String>,
    },

    /// Manage a task's links.
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Attach a file reference to a task.
    Attach { id: u64, path: PathBuf },

    /// Remove an attachment from a task.
    Detach { id: u64, attachment: u64 },

    /// List users with a planner file.
    Users,

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum LinkAction {
    /// Add a link. A missing scheme becomes https://.
    Add { id: u64, url: String },
    /// Remove the link at a position shown by `view`.
    Rm { id: u64, index: usize },
}

fn require(planner: &Store, id: u64) -> Result<&Task> {
    planner.task(id).ok_or(PlannerError::TaskNotFound { id })
}

fn parse_due(s: &str) -> Result<chrono::NaiveDate> {
    parse_due_input(s).ok_or_else(|| PlannerError::invalid(format!("unrecognised due date '{s}'")))
}

/// Launch the terminal user interface.
pub fn cmd_ui(planner: Store) -> Result<()> {
    run_tui(planner)
}

/// Add a new task to the backlog.
#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    planner: &mut Store,
    title: String,
    duration: Option<Duration>,
    due: Option<String>,
    urgent: bool,
    important: bool,
    notes: Option<String>,
    status: Option<Status>,
) -> Result<()> {
    let due = due.as_deref().map(parse_due).transpose()?;
    let task = planner.create_task(&title)?;
    let patch = TaskPatch {
        duration: duration.filter(|d| *d != task.duration),
        due: due.map(Some),
        urgent: urgent.then_some(true),
        important: important.then_some(true),
        notes,
        ..Default::default()
    };
    if !patch.is_empty() {
        planner.update_task(task.id, patch)?;
    }
    if let Some(status) = status {
        planner.move_to_status(task.id, status, usize::MAX)?;
    }
    println!("Added task {}", task.id);
    Ok(())
}

/// List tasks for one scope.
pub fn cmd_list(planner: &Store, scope: ListScope, status: Option<Status>, open: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let keep = |t: &&Task| status.map_or(true, |s| t.status == s) && !(open && t.is_completed());
    match scope {
        ListScope::Backlog => {
            let tasks: Vec<&Task> = planner.backlog().into_iter().filter(keep).collect();
            println!("Backlog ({})", tasks.len());
            print_table(&tasks, today);
        }
        ListScope::Week => {
            println!("{}", planner.selected_week().label());
            let mut tasks = Vec::new();
            for day in 0..grid::DAYS_PER_WEEK {
                tasks.extend(planner.scheduled_on(day).into_iter().filter(keep));
            }
            print_table(&tasks, today);
            let (done, scheduled) = planner.week_progress();
            println!("\n{done}/{scheduled} scheduled tasks completed");
        }
        ListScope::Board => {
            for column in Status::ALL {
                if status.is_some_and(|s| s != column) || (open && column == Status::Done) {
                    continue;
                }
                let tasks = planner.kanban_column(column);
                println!("== {} ({}) ==", column.label(), tasks.len());
                print_table(&tasks, today);
                println!();
            }
        }
    }
    Ok(())
}

/// Print every field of a task.
pub fn cmd_view(planner: &Store, id: u64) -> Result<()> {
    let task = require(planner, id)?;
    let today = Local::now().date_naive();
    let timestamp = |ts: i64| {
        Utc.timestamp_opt(ts, 0)
            .single()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".into())
    };
    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Status:       {}", task.status);
    println!("Duration:     {}", task.duration);
    println!(
        "Due:          {}",
        match task.due {
            Some(d) => format!("{d} ({})", format_due_relative(Some(d), today)),
            None => "-".into(),
        }
    );
    println!("Flags:        {}", format_flags(task));
    match &task.schedule {
        Some(s) => println!(
            "Scheduled:    {} {} ({} {})",
            grid::DAY_NAMES[s.day.min(grid::DAYS_PER_WEEK - 1) as usize],
            grid::day_label(s.week, s.day),
            grid::time_label(s.slot),
            s.timezone
        ),
        None => println!("Scheduled:    - (backlog)"),
    }
    println!("Created UTC:  {}", timestamp(task.created_at_utc));
    println!("Updated UTC:  {}", timestamp(task.updated_at_utc));
    if task.links.is_empty() {
        println!("Links:        -");
    } else {
        println!("Links:");
        for (i, link) in task.links.iter().enumerate() {
            println!("  [{i}] {link}");
        }
    }
    if task.attachments.is_empty() {
        println!("Attachments:  -");
    } else {
        println!("Attachments:");
        for a in &task.attachments {
            println!("  #{} {} ({}, {} bytes) {}", a.id, a.name, a.mime_type, a.size, a.payload_ref);
        }
    }
    println!("Notes:\n{}", if task.notes.is_empty() { "-" } else { &task.notes });
    Ok(())
}

/// Update a task's fields.
#[allow(clippy::too_many_arguments)]
pub fn cmd_update(
    planner: &mut Store,
    id: u64,
    title: Option<String>,
    duration: Option<Duration>,
    due: Option<String>,
    clear_due: bool,
    urgent: Option<bool>,
    important: Option<bool>,
    notes: Option<String>,
) -> Result<()> {
    require(planner, id)?;
    if let Some(t) = &title {
        if t.trim().is_empty() {
            return Err(PlannerError::invalid("task title cannot be empty"));
        }
    }
    let due = if clear_due {
        Some(None)
    } else {
        due.as_deref().map(parse_due).transpose()?.map(Some)
    };
    let patch = TaskPatch {
        title: title.map(|t| t.trim().to_string()),
        duration,
        due,
        urgent,
        important,
        notes,
        ..Default::default()
    };
    if patch.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }
    planner.update_task(id, patch)?;
    println!("Updated {id}");
    Ok(())
}

/// Move a task to a kanban column.
pub fn cmd_status(planner: &mut Store, id: u64, status: Status, index: Option<usize>) -> Result<()> {
    require(planner, id)?;
    planner.move_to_status(id, status, index.unwrap_or(usize::MAX))?;
    println!("{id} -> {status}");
    Ok(())
}

/// Mark a task done, or reopen it.
pub fn cmd_set_completed(planner: &mut Store, id: u64, completed: bool) -> Result<()> {
    require(planner, id)?;
    planner.set_completed(id, completed)?;
    if completed {
        println!("Marked done.");
    } else {
        println!("Reopened {id}");
    }
    Ok(())
}

/// Place a task on a day and time of the selected week.
pub fn cmd_schedule(planner: &mut Store, id: u64, day: &str, time: &str, week: Option<String>) -> Result<()> {
    require(planner, id)?;
    let day = grid::parse_day(day).ok_or_else(|| PlannerError::invalid(format!("unrecognised day '{day}'")))?;
    let slot = grid::slot_from_time(time)
        .ok_or_else(|| PlannerError::invalid(format!("'{time}' is not a time between 05:00 and 23:30")))?;
    if let Some(week) = week {
        let week = WeekKey::parse(&week).ok_or_else(|| PlannerError::invalid(format!("unrecognised week '{week}'")))?;
        planner.set_week(week)?;
    }
    let Some(plan) = planner.schedule_at(id, day, slot as i64)? else {
        return Err(PlannerError::TaskNotFound { id });
    };
    println!(
        "Scheduled {id} on {} {} at {}",
        grid::DAY_NAMES[plan.day as usize],
        grid::day_label(plan.week, plan.day),
        grid::time_label(plan.slot)
    );
    for moved in plan.displaced() {
        println!("  moved {} to {}", moved.task, grid::time_label(moved.slot));
    }
    Ok(())
}

/// Move a task back to the backlog.
pub fn cmd_unschedule(planner: &mut Store, id: u64, index: Option<usize>) -> Result<()> {
    require(planner, id)?;
    match index {
        Some(index) => planner.move_in_backlog(id, index)?,
        None => planner.unschedule(id)?,
    };
    println!("Moved {id} to the backlog");
    Ok(())
}

/// Change a task's duration.
pub fn cmd_resize(planner: &mut Store, id: u64, duration: Duration) -> Result<()> {
    require(planner, id)?;
    let plan = planner.resize(id, duration)?;
    println!("{id} is now {duration}");
    for moved in plan.iter().flat_map(|p| p.displaced()) {
        println!("  moved {} to {}", moved.task, grid::time_label(moved.slot));
    }
    Ok(())
}

/// Move a backlog task to a new position.
pub fn cmd_reorder(planner: &mut Store, id: u64, index: usize) -> Result<()> {
    let task = require(planner, id)?;
    if task.is_scheduled() {
        return Err(PlannerError::invalid(format!("task {id} is scheduled; use unschedule --index")));
    }
    planner.move_in_backlog(id, index)?;
    println!("Moved {id} to position {index}");
    Ok(())
}

/// Delete a task.
pub fn cmd_delete(planner: &mut Store, id: u64) -> Result<()> {
    require(planner, id)?;
    planner.delete_task(id)?;
    println!("Deleted.");
    Ok(())
}

/// Change the selected week and print its agenda.
pub fn cmd_week(planner: &mut Store, target: Option<String>) -> Result<()> {
    match target.as_deref().map(str::trim) {
        None => {}
        Some("next") => planner.shift_week(1)?,
        Some("prev") | Some("previous") => planner.shift_week(-1)?,
        Some("current") | Some("today") => planner.go_to_current_week()?,
        Some(date) => {
            let week = WeekKey::parse(date).ok_or_else(|| PlannerError::invalid(format!("unrecognised week '{date}'")))?;
            planner.set_week(week)?;
        }
    }
    let week = planner.selected_week();
    println!("{}", week.label());
    for day in 0..grid::DAYS_PER_WEEK {
        let tasks = planner.scheduled_on(day);
        println!("\n{} {}", grid::DAY_NAMES[day as usize], grid::day_label(week, day));
        if tasks.is_empty() {
            println!("  -");
        }
        for t in tasks {
            let mark = if t.is_completed() { "x" } else { " " };
            println!("  [{mark}] {} {:>5} #{} {}", format_placement(t), t.duration.to_string(), t.id, truncate(&t.title, 50));
        }
    }
    Ok(())
}

/// Add or remove a link.
pub fn cmd_link(planner: &mut Store, action: LinkAction) -> Result<()> {
    match action {
        LinkAction::Add { id, url } => {
            require(planner, id)?;
            if planner.add_link(id, &url)? {
                println!("Linked.");
            } else {
                println!("Task {id} already has that link.");
            }
        }
        LinkAction::Rm { id, index } => {
            require(planner, id)?;
            if !planner.remove_link(id, index)? {
                return Err(PlannerError::invalid(format!("task {id} has no link [{index}]")));
            }
            println!("Removed link.");
        }
    }
    Ok(())
}

/// Record a file reference on a task.
pub fn cmd_attach(planner: &mut Store, id: u64, path: &Path) -> Result<()> {
    require(planner, id)?;
    if let Some(a) = planner.attach(id, path)? {
        println!("Attached #{} {} ({} bytes)", a.id, a.name, a.size);
    }
    Ok(())
}

/// Remove an attachment.
pub fn cmd_detach(planner: &mut Store, id: u64, attachment: u64) -> Result<()> {
    require(planner, id)?;
    if !planner.detach(id, attachment)? {
        return Err(PlannerError::invalid(format!("task {id} has no attachment #{attachment}")));
    }
    println!("Detached.");
    Ok(())
}

/// List every user with a planner file, marking the active one.
pub fn cmd_users(dir: &Path, current: &str) -> Result<()> {
    let profiles = discover_profiles(dir)?;
    if profiles.is_empty() {
        println!("No planners in {}", dir.display());
        return Ok(());
    }
    let current = crate::profile::sanitize_user_name(current);
    println!("{:<2} {:<20} {}", "", "User", "File");
    for p in profiles {
        let mark = if p.name == current { "*" } else { "" };
        println!("{:<2} {:<20} {}", mark, truncate(&p.name, 20), p.file_path.display());
    }
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
