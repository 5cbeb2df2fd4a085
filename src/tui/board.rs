//! Screen geometry recorded while drawing, used for mouse hit testing.
//!
//! Coordinates are terminal cells. One timeline row is one slot, so a pointer
//! row maps to a slot by subtracting the column's top row and adding the
//! current scroll offset.

use ratatui::layout::Rect;

use crate::fields::Status;
use crate::order::{insertion_index, ItemBounds};
use crate::session::{DropResolver, DropTarget, Point};

/// Centre of a terminal cell as a pointer position.
pub fn cell_point(column: u16, row: u16) -> Point {
    Point::new(column as f32 + 0.5, row as f32 + 0.5)
}

pub fn contains(area: Rect, p: Point) -> bool {
    p.x >= area.x as f32
        && p.x < (area.x + area.width) as f32
        && p.y >= area.y as f32
        && p.y < (area.y + area.height) as f32
}

/// A card drawn on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct CardHit {
    pub task: u64,
    /// Visible part of the card.
    pub area: Rect,
    /// Unclipped top-left corner; may lie above the visible area.
    pub origin: Point,
    /// Unclipped width and height.
    pub size: Point,
    /// Bottom row of a timeline card, when visible.
    pub resize_handle: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListArea {
    pub area: Rect,
    pub items: Vec<ItemBounds>,
}

/// Everything the last frame drew that the pointer can land on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoardGeometry {
    pub backlog: Option<ListArea>,
    /// Inner area of each day's timeline. Its first row is slot `scroll`.
    pub days: Vec<(u8, Rect)>,
    pub columns: Vec<(Status, ListArea)>,
    pub scroll: u32,
    pub cards: Vec<CardHit>,
}

impl BoardGeometry {
    /// Rows available to the timeline in the last frame.
    pub fn visible_slots(&self) -> u32 {
        self.days.first().map_or(0, |(_, area)| area.height as u32)
    }

    /// Topmost card under the pointer.
    pub fn card_at(&self, p: Point) -> Option<&CardHit> {
        self.cards.iter().rev().find(|c| contains(c.area, p))
    }

    /// Whether the pointer is on a card's resize handle.
    pub fn on_resize_handle(&self, card: &CardHit, p: Point) -> bool {
        card.resize_handle.is_some_and(|h| contains(h, p))
    }
}

impl DropResolver for BoardGeometry {
    fn resolve(&self, pointer: Point, grab: Point, moving: u64) -> DropTarget {
        for (day, area) in &self.days {
            if contains(*area, pointer) {
                let top = pointer.y - grab.y - area.y as f32;
                let slot = top.floor() as i64 + self.scroll as i64;
                return DropTarget::Timeline { day: *day, slot };
            }
        }
        if let Some(backlog) = &self.backlog {
            if contains(backlog.area, pointer) {
                let index = insertion_index(&backlog.items, pointer.y, moving);
                return DropTarget::Backlog { index };
            }
        }
        for (status, column) in &self.columns {
            if contains(column.area, pointer) {
                let index = insertion_index(&column.items, pointer.y, moving);
                return DropTarget::Kanban { status: *status, index };
            }
        }
        DropTarget::Nothing
    }

    fn slot_height(&self) -> f32 {
        1.0
    }
}
