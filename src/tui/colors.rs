//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Status;

pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
pub const GOLD: Color = Color::Rgb(255, 215, 0);
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);
pub const SLATE: Color = Color::Rgb(60, 64, 72);

/// Card background for each status.
pub fn status_color(status: Status) -> Color {
    match status {
        Status::NotStarted => SLATE,
        Status::InProgress => Color::Blue,
        Status::Blocked => DARK_RED,
        Status::InReview => DARK_PURPLE,
        Status::Done => DARK_GREEN,
    }
}

/// Text color readable on `bg`.
pub fn text_on(bg: Color) -> Color {
    match bg {
        GOLD | Color::Cyan => Color::Rgb(20, 20, 20),
        _ => Color::White,
    }
}

/// Outline of the card being dragged.
pub const GHOST: Color = Color::Cyan;
/// Cards a preview would push.
pub const DISPLACED: Color = GOLD;
