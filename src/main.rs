//! `wp`: the weekplan command line.

use std::path::PathBuf;

use clap::Parser;
use tracing::error;

use weekplan::cli::Cli;
use weekplan::cmd::*;
use weekplan::db::JsonRepository;
use weekplan::error::Result;
use weekplan::logging;
use weekplan::planner::Planner;
use weekplan::profile::most_recent_profile;

fn main() {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return;
    }

    let dir = cli.dir.clone().unwrap_or_else(default_dir);
    if let Err(e) = logging::init(&dir) {
        eprintln!("Failed to set up {}: {e}", dir.display());
        std::process::exit(1);
    }
    let user = cli.user.clone().unwrap_or_else(|| default_user(&dir));

    if let Err(e) = run(cli.command, dir, &user) {
        error!(user = %user, error = %e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

/// `~/.weekplan`, or `./.weekplan` without a home directory.
fn default_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".weekplan")
}

/// Most recently used planner, else `$USER`, else "default".
fn default_user(dir: &std::path::Path) -> String {
    if let Ok(Some(profile)) = most_recent_profile(dir) {
        return profile.name;
    }
    std::env::var("USER")
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| "default".to_string())
}

fn run(command: Commands, dir: PathBuf, user: &str) -> Result<()> {
    let mut planner = match command {
        Commands::Users => return cmd_users(&dir, user),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            return Ok(());
        }
        _ => Planner::load(JsonRepository::new(dir), user)?,
    };
    match command {
        Commands::Users | Commands::Completions { .. } => Ok(()),
        Commands::Ui => cmd_ui(planner),

        Commands::Add { title, duration, due, urgent, important, notes, status } =>
            cmd_add(&mut planner, title, duration, due, urgent, important, notes, status),

        Commands::List { scope, status, open } => cmd_list(&planner, scope, status, open),

        Commands::View { id } => cmd_view(&planner, id),

        Commands::Update { id, title, duration, due, clear_due, urgent, important, notes } =>
            cmd_update(&mut planner, id, title, duration, due, clear_due, urgent, important, notes),

        Commands::Status { id, status, index } => cmd_status(&mut planner, id, status, index),

        Commands::Done { id } => cmd_set_completed(&mut planner, id, true),

        Commands::Reopen { id } => cmd_set_completed(&mut planner, id, false),

        Commands::Schedule { id, day, time, week } => cmd_schedule(&mut planner, id, &day, &time, week),

        Commands::Unschedule { id, index } => cmd_unschedule(&mut planner, id, index),

        Commands::Resize { id, duration } => cmd_resize(&mut planner, id, duration),

        Commands::Reorder { id, index } => cmd_reorder(&mut planner, id, index),

        Commands::Delete { id } => cmd_delete(&mut planner, id),

        Commands::Week { target } => cmd_week(&mut planner, target),

        Commands::Link { action } => cmd_link(&mut planner, action),

        Commands::Attach { id, path } => cmd_attach(&mut planner, id, &path),

        Commands::Detach { id, attachment } => cmd_detach(&mut planner, id, attachment),
    }
}
