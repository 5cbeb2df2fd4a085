//! Per-user data files.
//!
//! Each user's planner lives in its own JSON file named
//! `<user_name>_planner.json` inside the data directory. This module handles
//! discovery, naming, and picking the most recently used user.

use std::fs;
use std::path::{Path, PathBuf};

const FILE_SUFFIX: &str = "_planner";

/// A user with their data file.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub display_name: String,
    pub file_path: PathBuf,
}

impl Profile {
    /// Profile for `display_name` inside `dir`.
    pub fn new(display_name: &str, dir: &Path) -> Self {
        let name = sanitize_user_name(display_name);
        let file_path = dir.join(format!("{name}{FILE_SUFFIX}.json"));
        Profile {
            name,
            display_name: display_name.to_string(),
            file_path,
        }
    }

    /// Recognise a profile from an existing data file.
    pub fn from_file(file_path: PathBuf) -> Option<Self> {
        if file_path.extension()?.to_str()? != "json" {
            return None;
        }
        let stem = file_path.file_stem()?.to_str()?;
        let name = stem.strip_suffix(FILE_SUFFIX)?;
        if name.is_empty() {
            return None;
        }
        Some(Profile {
            name: name.to_string(),
            display_name: name.replace('_', " "),
            file_path,
        })
    }
}

/// Lowercase, alphanumeric-and-underscore form of a user name, safe for file names.
pub fn sanitize_user_name(display_name: &str) -> String {
    display_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Every profile found in `dir`, sorted by name.
pub fn discover_profiles(dir: &Path) -> Result<Vec<Profile>, std::io::Error> {
    let mut profiles = Vec::new();
    if !dir.exists() {
        return Ok(profiles);
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            if let Some(profile) = Profile::from_file(path) {
                profiles.push(profile);
            }
        }
    }
    profiles.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(profiles)
}

/// The profile whose data file was modified last.
pub fn most_recent_profile(dir: &Path) -> Result<Option<Profile>, std::io::Error> {
    let mut most_recent: Option<(Profile, std::time::SystemTime)> = None;
    for profile in discover_profiles(dir)? {
        let Ok(modified) = fs::metadata(&profile.file_path).and_then(|m| m.modified()) else {
            continue;
        };
        match &most_recent {
            Some((_, current)) if *current >= modified => {}
            _ => most_recent = Some((profile, modified)),
        }
    }
    Ok(most_recent.map(|(profile, _)| profile))
}
