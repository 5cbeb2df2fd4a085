//! # weekplan
//!
//! A weekly task planner for the terminal. Tasks live in a backlog, on a
//! seven-day timeline of 30-minute slots (05:00 to midnight), or in a kanban
//! status pipeline.
//!
//! The heart of the crate is the placement engine in [`placement`]: given a
//! task being dropped or resized on a day, it decides where the task lands and
//! how later tasks are pushed so nothing overlaps. [`session`] turns pointer
//! gestures into a single mutation, and [`planner::Planner`] commits that
//! mutation through a [`repo::TaskRepository`] all-or-nothing.
//!
//! ```bash
//! wp add "Write report" --duration 90m
//! wp schedule 1 tue 09:30
//! wp ui
//! ```
//!
//! Data is stored in `~/.weekplan/` as one JSON file per user.

pub mod cli;
pub mod cmd;
pub mod db;
pub mod error;
pub mod fields;
pub mod grid;
pub mod logging;
pub mod order;
pub mod placement;
pub mod planner;
pub mod profile;
pub mod repo;
pub mod session;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod board;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
}
