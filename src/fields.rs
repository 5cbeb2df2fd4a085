//! Enumerations and field types for planner tasks.
//!
//! This module defines the structured values a task carries: its kanban status
//! and its duration, which is restricted to a fixed set of minute values.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Kanban pipeline status, in board order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    #[serde(alias = "Not Started")]
    NotStarted,
    #[serde(alias = "In Progress")]
    InProgress,
    #[serde(alias = "Blocked")]
    Blocked,
    #[serde(alias = "In Review")]
    InReview,
    #[serde(alias = "Done")]
    Done,
}

impl Status {
    /// Every status in column order.
    pub const ALL: [Status; 5] = [
        Status::NotStarted,
        Status::InProgress,
        Status::Blocked,
        Status::InReview,
        Status::Done,
    ];

    /// Column position of this status.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::NotStarted => "Not Started",
            Status::InProgress => "In Progress",
            Status::Blocked => "Blocked",
            Status::InReview => "In Review",
            Status::Done => "Done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Allowed task lengths. Stored as plain minutes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(try_from = "u32", into = "u32")]
pub enum Duration {
    M15,
    #[default]
    M30,
    M45,
    M60,
    M90,
    M120,
    M150,
    M180,
    M210,
    M240,
}

impl Duration {
    pub const ALL: [Duration; 10] = [
        Duration::M15,
        Duration::M30,
        Duration::M45,
        Duration::M60,
        Duration::M90,
        Duration::M120,
        Duration::M150,
        Duration::M180,
        Duration::M210,
        Duration::M240,
    ];

    /// Shortest duration a resize gesture can produce.
    pub const RESIZE_MIN: Duration = Duration::M30;
    /// Longest duration a resize gesture can produce.
    pub const RESIZE_MAX: Duration = Duration::M240;

    pub fn minutes(self) -> u32 {
        match self {
            Duration::M15 => 15,
            Duration::M30 => 30,
            Duration::M45 => 45,
            Duration::M60 => 60,
            Duration::M90 => 90,
            Duration::M120 => 120,
            Duration::M150 => 150,
            Duration::M180 => 180,
            Duration::M210 => 210,
            Duration::M240 => 240,
        }
    }

    pub fn from_minutes(minutes: u32) -> Option<Duration> {
        Self::ALL.into_iter().find(|d| d.minutes() == minutes)
    }
}

impl TryFrom<u32> for Duration {
    type Error = String;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Duration::from_minutes(minutes).ok_or_else(|| {
            format!("unsupported duration {minutes} minutes")
        })
    }
}

impl From<Duration> for u32 {
    fn from(d: Duration) -> u32 {
        d.minutes()
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.minutes();
        match (m / 60, m % 60) {
            (0, mins) => write!(f, "{mins}m"),
            (h, 0) => write!(f, "{h}h"),
            (h, mins) => write!(f, "{h}h{mins}m"),
        }
    }
}

/// Parse a duration argument given in minutes ("90") for clap.
pub fn parse_duration_arg(s: &str) -> Result<Duration, String> {
    let minutes: u32 = s
        .trim()
        .trim_end_matches('m')
        .parse()
        .map_err(|_| format!("'{s}' is not a number of minutes"))?;
    let allowed: Vec<String> = Duration::ALL.iter().map(|d| d.minutes().to_string()).collect();
    Duration::from_minutes(minutes)
        .ok_or_else(|| format!("duration must be one of {}", allowed.join(", ")))
}

/// Which slice of tasks a listing shows.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ListScope {
    /// Unscheduled tasks in backlog order.
    Backlog,
    /// Tasks scheduled in the selected week, by day and slot.
    Week,
    /// Every task grouped by kanban column.
    Board,
}
