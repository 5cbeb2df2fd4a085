//! Planner board.
//!
//! The plan view shows the backlog beside seven day timelines; the kanban view
//! shows the backlog beside the status columns. Mouse gestures run through a
//! [`Session`], and the geometry recorded while drawing tells it what lies
//! under the pointer.

use std::io;
use std::time::Duration as PollDuration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::warn;

use crate::db::{format_due_relative, format_flags, truncate};
use crate::error::PlannerError;
use crate::fields::{Duration, Status};
use crate::grid::{self, DAYS_PER_WEEK, TOTAL_SLOTS};
use crate::order::ItemBounds;
use crate::planner::Planner;
use crate::repo::TaskRepository;
use crate::session::{DropTarget, Point, Preview, Session};
use crate::task::Task;
use crate::tui::board::{cell_point, BoardGeometry, CardHit, ListArea};
use crate::tui::colors::*;
use crate::tui::enums::{AppState, ViewMode};
use crate::tui::input::InputField;

const LIST_CARD_HEIGHT: u16 = 2;
const LIST_CARD_STRIDE: u16 = 3;
const SCROLL_STEP: i64 = 6;
/// First visible slot on start-up (07:00).
const DEFAULT_SCROLL: u32 = 4;

const HELP: &str = "drag: move | drag ⇕: resize | Tab: view | [ ]: week | t: today | n: new | c: done | x: delete | Enter: details | PgUp/PgDn: scroll | q: quit";

/// How a timeline card is drawn.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum CardKind {
    Normal,
    /// Where the dragged task currently sits.
    Origin,
    /// Where the dragged task would land.
    Ghost,
    /// A neighbour the preview would push.
    Displaced,
}

#[derive(Clone, Copy, Debug)]
struct DayCard {
    task: u64,
    slot: u32,
    duration: Duration,
    kind: CardKind,
}

pub struct PlannerApp<R: TaskRepository> {
    planner: Planner<R>,
    view: ViewMode,
    state: AppState,
    session: Session,
    geometry: BoardGeometry,
    scroll: u32,
    selected: Option<u64>,
    /// Cell where the left button went down, to tell clicks from drags.
    press: Option<(u16, u16)>,
    input: InputField,
    status_message: String,
    should_quit: bool,
}

impl<R: TaskRepository> PlannerApp<R> {
    pub fn new(planner: Planner<R>) -> Self {
        PlannerApp {
            planner,
            view: ViewMode::default(),
            state: AppState::default(),
            session: Session::default(),
            geometry: BoardGeometry::default(),
            scroll: DEFAULT_SCROLL,
            selected: None,
            press: None,
            input: InputField::new(),
            status_message: String::new(),
            should_quit: false,
        }
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    fn report_error(&mut self, err: PlannerError) {
        if !matches!(err, PlannerError::Infeasible(_)) {
            warn!(error = %err, "ui action failed");
        }
        self.set_status_message(format!("Error: {err}"));
    }

    fn selected_task(&self) -> Option<&Task> {
        self.selected.and_then(|id| self.planner.task(id))
    }

    fn drag_preview(&self) -> Option<&Preview> {
        match &self.session {
            Session::Dragging(drag) => drag.preview.as_ref(),
            _ => None,
        }
    }

    fn scroll_by(&mut self, delta: i64) {
        let max = TOTAL_SLOTS.saturating_sub(self.geometry.visible_slots().max(1)) as i64;
        self.scroll = (self.scroll as i64 + delta).clamp(0, max) as u32;
    }

    fn change_week(&mut self, weeks: i64) {
        let result = if weeks == 0 {
            self.planner.go_to_current_week()
        } else {
            self.planner.shift_week(weeks)
        };
        if let Err(e) = result {
            self.report_error(e);
        }
    }

    fn toggle_selected_completion(&mut self) {
        let Some(task) = self.selected_task() else {
            self.set_status_message("Select a task first");
            return;
        };
        let (id, done) = (task.id, task.is_completed());
        match self.planner.set_completed(id, !done) {
            Ok(_) if done => self.set_status_message(format!("Reopened #{id}")),
            Ok(_) => self.set_status_message(format!("Completed #{id}")),
            Err(e) => self.report_error(e),
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.selected else { return };
        match self.planner.delete_task(id) {
            Ok(_) => {
                self.selected = None;
                self.set_status_message(format!("Deleted #{id}"));
            }
            Err(e) => self.report_error(e),
        }
    }

    /// Handle one terminal event, waiting briefly for it.
    fn handle_input(&mut self) -> io::Result<()> {
        if event::poll(PollDuration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                Event::Mouse(mouse) => self.handle_mouse(mouse),
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.state {
            AppState::Board => self.handle_board_key(key),
            AppState::AddTask => self.handle_add_key(key),
            AppState::TaskDetail => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                    self.state = AppState::Board;
                }
            }
            AppState::ConfirmDelete => {
                if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                    self.delete_selected();
                } else {
                    self.set_status_message("Delete cancelled");
                }
                self.state = AppState::Board;
            }
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            if self.session.cancel() {
                self.press = None;
                self.set_status_message("Cancelled");
            }
            return;
        }
        if !self.session.is_idle() {
            return;
        }
        self.clear_status_message();

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.should_quit = true,
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.view = self.view.toggle(),
            KeyCode::Char('[') => self.change_week(-1),
            KeyCode::Char(']') => self.change_week(1),
            KeyCode::Char('t') => self.change_week(0),
            KeyCode::Char('n') => {
                self.input = InputField::new();
                self.input.active = true;
                self.state = AppState::AddTask;
            }
            KeyCode::Char('c') => self.toggle_selected_completion(),
            KeyCode::Char('x') => {
                if self.selected_task().is_some() {
                    self.state = AppState::ConfirmDelete;
                } else {
                    self.set_status_message("Select a task first");
                }
            }
            KeyCode::Enter => {
                if self.selected_task().is_some() {
                    self.state = AppState::TaskDetail;
                }
            }
            KeyCode::PageUp => self.scroll_by(-SCROLL_STEP),
            KeyCode::PageDown => self.scroll_by(SCROLL_STEP),
            KeyCode::Char('h') | KeyCode::Char('?') => self.set_status_message(HELP),
            _ => {}
        }
    }

    fn handle_add_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input.take();
                self.state = AppState::Board;
            }
            KeyCode::Enter => {
                let title = self.input.take();
                self.state = AppState::Board;
                match self.planner.create_task(&title) {
                    Ok(task) => {
                        self.selected = Some(task.id);
                        self.set_status_message(format!("Added #{}", task.id));
                    }
                    Err(e) => self.report_error(e),
                }
            }
            KeyCode::Backspace => self.input.handle_backspace(),
            KeyCode::Delete => self.input.handle_delete(),
            KeyCode::Left => self.input.move_cursor_left(),
            KeyCode::Right => self.input.move_cursor_right(),
            KeyCode::Char(c) => self.input.handle_char(c),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.state != AppState::Board {
            return;
        }
        let p = cell_point(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.press = Some((mouse.column, mouse.row));
                self.pointer_down(p);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let week = self.planner.selected_week();
                self.session.pointer_move(p, &self.geometry, self.planner.tasks(), week);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.press.take() == Some((mouse.column, mouse.row)) {
                    // A click only selects.
                    self.session.cancel();
                } else {
                    self.pointer_up(p);
                }
            }
            MouseEventKind::ScrollUp if self.view == ViewMode::Plan => self.scroll_by(-1),
            MouseEventKind::ScrollDown if self.view == ViewMode::Plan => self.scroll_by(1),
            _ => {}
        }
    }

    fn pointer_down(&mut self, p: Point) {
        let Some(card) = self.geometry.card_at(p).cloned() else {
            self.selected = None;
            return;
        };
        self.selected = Some(card.task);
        self.clear_status_message();
        if self.geometry.on_resize_handle(&card, p) {
            if let Some(task) = self.planner.task(card.task) {
                self.session.begin_resize(task, p.y);
            }
        } else {
            self.session.begin_drag(card.task, p, card.origin, card.size);
        }
    }

    fn pointer_up(&mut self, p: Point) {
        let week = self.planner.selected_week();
        let resolution = self.session.pointer_up(p, &self.geometry, self.planner.tasks(), week);
        if let Err(e) = self.planner.apply(resolution) {
            self.report_error(e);
        }
    }

    /// Cards to draw on `day`, with any live preview applied.
    fn day_cards(&self, day: u8) -> Vec<DayCard> {
        let week = self.planner.selected_week();
        let plan = self.session.preview_plan().filter(|p| p.week == week);
        let mut cards = Vec::new();
        for task in self.planner.scheduled_on(day) {
            let Some(slot) = task.slot_on(week, day) else { continue };
            let mut card = DayCard { task: task.id, slot, duration: task.duration, kind: CardKind::Normal };
            if let Some(plan) = plan {
                if task.id == plan.task {
                    card.kind = CardKind::Origin;
                } else if let Some(patch) = plan.patches.iter().find(|p| p.task == task.id) {
                    card.slot = patch.slot;
                    card.kind = CardKind::Displaced;
                }
            }
            cards.push(card);
        }
        if let Some(plan) = plan.filter(|p| p.day == day) {
            cards.push(DayCard { task: plan.task, slot: plan.slot, duration: plan.duration, kind: CardKind::Ghost });
        }
        cards
    }

    /// Render the complete board.
    fn render(&mut self, f: &mut Frame) {
        self.geometry = BoardGeometry { scroll: self.scroll, ..Default::default() };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_header(f, chunks[0]);
        match self.view {
            ViewMode::Plan => self.render_plan(f, chunks[1]),
            ViewMode::Kanban => self.render_kanban(f, chunks[1]),
        }
        self.render_status_bar(f, chunks[2]);

        match self.state {
            AppState::Board => {}
            AppState::TaskDetail => self.render_task_detail_popup(f),
            AppState::AddTask => self.render_add_popup(f),
            AppState::ConfirmDelete => self.render_confirm_popup(f),
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let (done, scheduled) = self.planner.week_progress();
        let header = Line::from(vec![
            Span::styled("WEEKPLAN", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(format!("[{}]", self.view.label()), Style::default().fg(GOLD)),
            Span::raw("  "),
            Span::styled(
                self.planner.selected_week().label(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
            Span::raw(format!("  {}  {done}/{scheduled} done", self.planner.user())),
        ]);
        let block = Paragraph::new(header)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(block, area);
    }

    fn render_plan(&mut self, f: &mut Frame, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(20), Constraint::Length(6), Constraint::Min(0)])
            .split(area);
        self.render_backlog(f, cols[0]);

        let visible = area.height.saturating_sub(2) as u32;
        self.scroll = self.scroll.min(TOTAL_SLOTS.saturating_sub(visible));
        self.geometry.scroll = self.scroll;

        let day_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, DAYS_PER_WEEK as u32); DAYS_PER_WEEK as usize])
            .split(cols[2]);
        for day in 0..DAYS_PER_WEEK {
            self.render_day(f, day_areas[day as usize], day);
        }
        self.render_time_gutter(f, cols[1]);
    }

    fn render_time_gutter(&self, f: &mut Frame, area: Rect) {
        let rows = area.height.saturating_sub(2);
        let lines: Vec<Line> = (0..rows as u32)
            .map(|i| self.scroll + i)
            .map(|slot| {
                if slot < TOTAL_SLOTS && slot % 2 == 0 {
                    Line::from(grid::short_time_label(slot))
                } else {
                    Line::from("")
                }
            })
            .collect();
        let gutter = Rect::new(area.x, area.y + 1, area.width, rows);
        f.render_widget(Paragraph::new(lines).style(Style::default().fg(Color::DarkGray)), gutter);
    }

    fn render_day(&mut self, f: &mut Frame, area: Rect, day: u8) {
        let week = self.planner.selected_week();
        let is_today = week.day_of(Local::now().date_naive()) == Some(day);
        let is_target = matches!(self.drag_preview(), Some(Preview::Timeline(plan)) if plan.day == day);
        let border = if is_target {
            Style::default().fg(GHOST).add_modifier(Modifier::BOLD)
        } else if is_today {
            Style::default().fg(GOLD).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let title = format!("{} {}", &grid::DAY_NAMES[day as usize][..3], grid::day_label(week, day));
        let block = Block::default().borders(Borders::ALL).title(title).border_style(border);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let hours: Vec<Line> = (0..inner.height as u32)
            .map(|row| if (self.scroll + row) % 2 == 0 { Line::from("·") } else { Line::from("") })
            .collect();
        f.render_widget(Paragraph::new(hours).style(Style::default().fg(Color::DarkGray)), inner);

        self.geometry.days.push((day, inner));
        for card in self.day_cards(day) {
            self.render_timeline_card(f, inner, card);
        }
    }

    fn render_timeline_card(&mut self, f: &mut Frame, inner: Rect, card: DayCard) {
        let Some(task) = self.planner.task(card.task) else { return };
        let rows = grid::slots_needed(card.duration) as i64;
        let top = card.slot as i64 - self.scroll as i64;
        let bottom = top + rows;
        let visible_top = top.max(0);
        let visible_bottom = bottom.min(inner.height as i64);
        if visible_top >= visible_bottom {
            return;
        }
        let area = Rect::new(
            inner.x,
            inner.y + visible_top as u16,
            inner.width,
            (visible_bottom - visible_top) as u16,
        );

        let selected = self.selected == Some(task.id);
        let bg = status_color(task.status);
        let style = match card.kind {
            CardKind::Normal if selected => Style::default().bg(GOLD).fg(text_on(GOLD)).add_modifier(Modifier::BOLD),
            CardKind::Normal => Style::default().bg(bg).fg(text_on(bg)),
            CardKind::Origin => Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
            CardKind::Ghost => Style::default().bg(GHOST).fg(text_on(GHOST)).add_modifier(Modifier::BOLD),
            CardKind::Displaced => Style::default().bg(DISPLACED).fg(text_on(DISPLACED)),
        };
        let mark = if task.is_completed() { "✓ " } else { "" };
        let width = inner.width as usize;
        let lines: Vec<Line> = [
            format!("{mark}{} {}", grid::short_time_label(card.slot), task.title),
            format!("{} {}", card.duration, format_flags(task)),
        ]
        .into_iter()
        .skip((visible_top - top) as usize)
        .map(|l| Line::from(truncate(&l, width)))
        .collect();
        f.render_widget(Clear, area);
        f.render_widget(Paragraph::new(lines).style(style), area);

        if card.kind != CardKind::Normal {
            return;
        }
        let resize_handle = (bottom == visible_bottom).then(|| {
            if area.height > 1 {
                Rect::new(area.x, area.y + area.height - 1, area.width, 1)
            } else {
                let w = area.width.min(2);
                Rect::new(area.x + area.width - w, area.y, w, 1)
            }
        });
        if let Some(handle) = resize_handle {
            let marker = Paragraph::new("⇕").alignment(Alignment::Right).style(style);
            f.render_widget(marker, handle);
        }
        self.geometry.cards.push(CardHit {
            task: card.task,
            area,
            origin: Point::new(inner.x as f32, (inner.y as i64 + top) as f32),
            size: Point::new(inner.width as f32, rows as f32),
            resize_handle,
        });
    }

    fn render_backlog(&mut self, f: &mut Frame, area: Rect) {
        let ids: Vec<u64> = self.planner.backlog().iter().map(|t| t.id).collect();
        let insertion = match self.drag_preview() {
            Some(Preview::Backlog { index }) => Some(*index),
            _ => None,
        };
        let border = if insertion.is_some() {
            Style::default().fg(GHOST).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Backlog ({})", ids.len()))
            .border_style(border);
        let inner = block.inner(area);
        f.render_widget(block, area);
        let list = self.render_card_list(f, inner, &ids, insertion);
        self.geometry.backlog = Some(list);
    }

    fn render_kanban(&mut self, f: &mut Frame, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(20), Constraint::Min(0)])
            .split(area);
        self.render_backlog(f, cols[0]);

        let column_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, Status::ALL.len() as u32); Status::ALL.len()])
            .split(cols[1]);
        for (status, column_area) in Status::ALL.into_iter().zip(column_areas.iter()) {
            self.render_status_column(f, *column_area, status);
        }
    }

    fn render_status_column(&mut self, f: &mut Frame, area: Rect, status: Status) {
        let ids: Vec<u64> = self.planner.kanban_column(status).iter().map(|t| t.id).collect();
        let insertion = match self.drag_preview() {
            Some(Preview::Kanban { status: s, index }) if *s == status => Some(*index),
            _ => None,
        };
        let border = if insertion.is_some() {
            Style::default().fg(GHOST).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(status_color(status))
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{} ({})", status.label(), ids.len()))
            .border_style(border);
        let inner = block.inner(area);
        f.render_widget(block, area);
        let list = self.render_card_list(f, inner, &ids, insertion);
        self.geometry.columns.push((status, list));
    }

    /// Draw a vertical list of cards and record their bounds. `insertion` is
    /// counted without the card being dragged.
    fn render_card_list(&mut self, f: &mut Frame, inner: Rect, ids: &[u64], insertion: Option<usize>) -> ListArea {
        let moving = self.session.active_task();
        let bottom = inner.y + inner.height;
        let mut items = Vec::new();
        let mut row = inner.y + 1;
        let mut index = 0;
        for &id in ids {
            if row + LIST_CARD_HEIGHT > bottom {
                break;
            }
            let Some(task) = self.planner.task(id) else { continue };
            let is_moving = moving == Some(id);
            if !is_moving && insertion == Some(index) {
                render_insertion_marker(f, Rect::new(inner.x, row - 1, inner.width, 1));
            }
            let area = Rect::new(inner.x, row, inner.width, LIST_CARD_HEIGHT);
            self.render_list_card(f, area, task, is_moving);
            items.push(ItemBounds { id, top: row as f32, height: LIST_CARD_HEIGHT as f32 });
            self.geometry.cards.push(CardHit {
                task: id,
                area,
                origin: Point::new(area.x as f32, area.y as f32),
                size: Point::new(area.width as f32, area.height as f32),
                resize_handle: None,
            });
            if !is_moving {
                index += 1;
            }
            row += LIST_CARD_STRIDE;
        }
        if insertion.is_some_and(|i| i >= index) && row - 1 < bottom {
            render_insertion_marker(f, Rect::new(inner.x, row - 1, inner.width, 1));
        }
        ListArea { area: inner, items }
    }

    fn render_list_card(&self, f: &mut Frame, area: Rect, task: &Task, is_moving: bool) {
        let bg = status_color(task.status);
        let style = if is_moving {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
        } else if self.selected == Some(task.id) {
            Style::default().bg(GOLD).fg(text_on(GOLD)).add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(bg).fg(text_on(bg))
        };
        let today = Local::now().date_naive();
        let mark = if task.is_completed() { "✓ " } else { "" };
        let width = area.width as usize;
        let lines = vec![
            Line::from(truncate(&format!("{mark}#{} {}", task.id, task.title), width)),
            Line::from(truncate(
                &format!(
                    "{} | due {} | {}",
                    task.duration,
                    format_due_relative(task.due, today),
                    format_flags(task)
                ),
                width,
            )),
        ];
        f.render_widget(Paragraph::new(lines).style(style), area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match &self.session {
                Session::Idle => HELP.to_string(),
                Session::Dragging(drag) => match &drag.preview {
                    Some(Preview::Timeline(plan)) => format!(
                        "Drop #{} on {} {} at {}{} | Esc: cancel",
                        drag.task,
                        &grid::DAY_NAMES[plan.day as usize][..3],
                        grid::day_label(plan.week, plan.day),
                        grid::time_label(plan.slot),
                        match plan.displaced().len() {
                            0 => String::new(),
                            n => format!(", moving {n} later"),
                        }
                    ),
                    Some(Preview::Backlog { index }) => {
                        format!("Move #{} to backlog position {} | Esc: cancel", drag.task, index + 1)
                    }
                    Some(Preview::Kanban { status, index }) => {
                        format!("Move #{} to {} position {} | Esc: cancel", drag.task, status, index + 1)
                    }
                    None if matches!(drag.target, DropTarget::Timeline { .. }) => {
                        "No room on this day | Esc: cancel".to_string()
                    }
                    None => "Drag onto a day, the backlog or a column | Esc: cancel".to_string(),
                },
                Session::Resizing(resize) => {
                    let blocked = resize.preview.is_none() && resize.duration != resize.start_duration;
                    format!(
                        "Resize #{} to {}{} | Esc: cancel",
                        resize.task,
                        resize.duration,
                        if blocked { " (no room)" } else { "" }
                    )
                }
            }
        };
        let bar = Paragraph::new(text)
            .style(Style::default().bg(SLATE).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(bar, area);
    }

    fn render_task_detail_popup(&self, f: &mut Frame) {
        let Some(task) = self.selected_task() else { return };
        let area = popup_area(f.area(), 70, 70);
        f.render_widget(Clear, area);

        let today = Local::now().date_naive();
        let scheduled = match &task.schedule {
            Some(s) => format!(
                "{} {} at {} ({})",
                grid::DAY_NAMES[s.day.min(DAYS_PER_WEEK - 1) as usize],
                grid::day_label(s.week, s.day),
                grid::time_label(s.slot),
                s.timezone
            ),
            None => "- (backlog)".to_string(),
        };
        let mut lines = vec![
            Line::from(Span::styled(
                format!("Task #{}: {}", task.id, task.title),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("Status:     {}", task.status)),
            Line::from(format!("Duration:   {}", task.duration)),
            Line::from(format!("Due:        {}", format_due_relative(task.due, today))),
            Line::from(format!("Flags:      {}", format_flags(task))),
            Line::from(format!("Scheduled:  {scheduled}")),
        ];
        if !task.links.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from("Links:"));
            lines.extend(task.links.iter().map(|l| Line::from(format!("  {l}"))));
        }
        if !task.attachments.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from("Attachments:"));
            lines.extend(
                task.attachments
                    .iter()
                    .map(|a| Line::from(format!("  #{} {} ({} bytes)", a.id, a.name, a.size))),
            );
        }
        lines.push(Line::from(""));
        lines.push(Line::from("Notes:"));
        lines.push(Line::from(if task.notes.is_empty() { "-".to_string() } else { task.notes.clone() }));

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Task Details (Enter to close)")
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(status_color(task.status)).add_modifier(Modifier::BOLD));
        let popup = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .style(Style::default().bg(Color::Black));
        f.render_widget(popup, area);
    }

    fn render_add_popup(&self, f: &mut Frame) {
        let full = popup_area(f.area(), 50, 20);
        let area = Rect::new(full.x, full.y, full.width, 3);
        f.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("New task (Enter to add, Esc to cancel)")
            .border_style(Style::default().fg(GOLD));
        f.render_widget(Paragraph::new(self.input.value.as_str()).block(block), area);
        f.set_cursor_position((area.x + 1 + self.input.cursor as u16, area.y + 1));
    }

    fn render_confirm_popup(&self, f: &mut Frame) {
        let Some(task) = self.selected_task() else { return };
        let full = popup_area(f.area(), 50, 20);
        let area = Rect::new(full.x, full.y, full.width, 3);
        f.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Confirm")
            .border_style(Style::default().fg(DARK_RED));
        let text = format!("Delete #{} \"{}\"? y / n", task.id, truncate(&task.title, 30));
        f.render_widget(Paragraph::new(text).block(block).alignment(Alignment::Center), area);
    }

    /// Main event loop.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        while !self.should_quit {
            terminal.draw(|f| self.render(f))?;
            self.handle_input()?;
        }
        Ok(())
    }
}

fn render_insertion_marker(f: &mut Frame, area: Rect) {
    let line = "─".repeat(area.width as usize);
    f.render_widget(Paragraph::new(line).style(Style::default().fg(GHOST)), area);
}

/// Centred rectangle taking the given share of `area`.
fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = (area.width as u32 * percent_x as u32 / 100) as u16;
    let height = (area.height as u32 * percent_y as u32 / 100) as u16;
    Rect::new(area.x + (area.width - width) / 2, area.y + (area.height - height) / 2, width, height)
}
