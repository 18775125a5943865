use crate::calc::civil_time::{is_valid_date_input, is_valid_time_input};
use crate::calc::validation::{collect_warnings, Warning};
use crate::data::gateway::{self, EventSink, SubmitError};
use crate::data::venue::{Venue, VenueSource};
use crate::editor::present::{
    item_count_label, music_type_suggestions, present_service, service_label, ItemView,
    ServiceView,
};
use crate::editor::{assemble, CellRef, DetailField, EventForm, ItemField, ScheduleField};
use anyhow::Result;
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io::Stdout;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// Background of a service that was just moved
const FOCUS_BG: Color = Color::Rgb(40, 44, 52);

const WARN_COLOR: Color = Color::Indexed(208); // reddish-orange

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Details,
    Schedule,
    Music,
}

impl Pane {
    const ALL: [Pane; 3] = [Pane::Details, Pane::Schedule, Pane::Music];

    fn next(self) -> Pane {
        match self {
            Pane::Details => Pane::Schedule,
            Pane::Schedule => Pane::Music,
            Pane::Music => Pane::Details,
        }
    }

    fn prev(self) -> Pane {
        match self {
            Pane::Details => Pane::Music,
            Pane::Schedule => Pane::Details,
            Pane::Music => Pane::Schedule,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Pane::Details => "Details",
            Pane::Schedule => "Schedule",
            Pane::Music => "Music",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Normal,
    /// Typing into a header field.
    Detail(DetailField),
    /// Stepping through the fields of the selected schedule row.
    Schedule(ScheduleField),
    Rename(usize),
    /// The editing cell is open; keystrokes go straight into this field.
    Item(ItemField),
}

/// One selectable line of the music pane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MusicRow {
    Service(usize),
    Item(CellRef),
    /// The "N more" line under a truncated item list.
    More(usize),
}

impl MusicRow {
    fn service(self) -> usize {
        match self {
            MusicRow::Service(idx) | MusicRow::More(idx) => idx,
            MusicRow::Item(cell) => cell.category,
        }
    }
}

pub struct App {
    form: EventForm,
    venues: Vec<Venue>,
    /// Shown in place of the venue list when it couldn't be loaded.
    venue_error: Option<String>,
    sink: Arc<dyn EventSink>,
    token: String,
    pane: Pane,
    mode: Mode,
    input_buffer: String,
    detail_cursor: usize,
    schedule_cursor: usize,
    music_cursor: usize,
    suggestion_cursor: usize,
    /// Some while a submission is in flight. Doubles as the busy flag.
    submission: Option<Receiver<Result<(), SubmitError>>>,
    /// Last message for the status line (message, color). Cleared on next keypress.
    status: Option<(String, Color)>,
    submitted: bool,
}

impl App {
    pub fn new(
        form: EventForm,
        venue_source: &dyn VenueSource,
        sink: Arc<dyn EventSink>,
        token: String,
    ) -> Self {
        let (venues, venue_error) = match venue_source.list_venues() {
            Ok(venues) => (venues, None),
            Err(err) => {
                tracing::warn!("failed to load venues: {err:#}");
                (Vec::new(), Some(format!("Failed to load venues: {err:#}")))
            }
        };
        App {
            form,
            venues,
            venue_error,
            sink,
            token,
            pane: Pane::Details,
            mode: Mode::Normal,
            input_buffer: String::new(),
            detail_cursor: 0,
            schedule_cursor: 0,
            music_cursor: 0,
            suggestion_cursor: 0,
            submission: None,
            status: None,
            submitted: false,
        }
    }

    pub fn form(&self) -> &EventForm {
        &self.form
    }

    pub fn is_busy(&self) -> bool {
        self.submission.is_some()
    }

    /// True once the server has accepted the update.
    pub fn submitted(&self) -> bool {
        self.submitted
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(msg, _)| msg.as_str())
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        self.handle_key_at(code, modifiers, Instant::now())
    }

    /// Returns true when the editor should close.
    pub fn handle_key_at(&mut self, code: KeyCode, modifiers: KeyModifiers, now: Instant) -> bool {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match code {
                KeyCode::Char('c') => return self.request_quit(),
                KeyCode::Char('s') => {
                    if self.mode == Mode::Normal {
                        self.submit();
                    }
                    return false;
                }
                _ => {}
            }
        }

        match self.mode {
            Mode::Normal => return self.handle_normal_key(code, modifiers, now),
            Mode::Detail(field) => self.handle_detail_input(field, code),
            Mode::Schedule(field) => self.handle_schedule_input(field, code),
            Mode::Rename(idx) => self.handle_rename_input(idx, code),
            Mode::Item(field) => self.handle_item_input(field, code),
        }
        false
    }

    /// Expires the move highlight and collects a finished submission.
    /// Returns true when the editor should close.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.form.services.expire_focus(now);

        let Some(rx) = &self.submission else {
            return false;
        };
        match rx.try_recv() {
            Ok(Ok(())) => {
                self.submission = None;
                self.submitted = true;
                true
            }
            Ok(Err(err)) => {
                self.submission = None;
                self.status = Some((err.to_string(), Color::Red));
                false
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.submission = None;
                self.status = Some(("Submission stopped unexpectedly".to_string(), Color::Red));
                false
            }
        }
    }

    /// The worker dies with the process, so the editor stays open until it reports.
    fn request_quit(&mut self) -> bool {
        if self.is_busy() {
            self.status = Some((
                "Submission in progress, wait for it to finish".to_string(),
                Color::Yellow,
            ));
            return false;
        }
        true
    }

    fn submit(&mut self) {
        if self.is_busy() {
            self.status = Some(("Submission already in progress".to_string(), Color::Yellow));
            return;
        }
        let event = match assemble(&self.form) {
            Ok(event) => event,
            Err(err) => {
                self.status = Some((err.to_string(), Color::Red));
                return;
            }
        };
        let warnings = collect_warnings(&self.form);
        if !warnings.is_empty() {
            tracing::warn!(count = warnings.len(), "submitting with incomplete rows");
        }

        let (tx, rx) = mpsc::channel();
        let sink = Arc::clone(&self.sink);
        let slug = self.form.original_slug.clone();
        let token = self.token.clone();
        thread::spawn(move || {
            let outcome = gateway::submit(sink.as_ref(), &slug, &token, &event);
            let _ = tx.send(outcome);
        });
        self.submission = Some(rx);
        self.status = Some(("Saving...".to_string(), Color::Yellow));
    }

    fn handle_normal_key(&mut self, code: KeyCode, modifiers: KeyModifiers, now: Instant) -> bool {
        // Keep "Saving..." up while the worker runs
        if !self.is_busy() {
            self.status = None;
        }
        match code {
            KeyCode::Char('q') => return self.request_quit(),
            KeyCode::Tab => self.pane = self.pane.next(),
            KeyCode::BackTab => self.pane = self.pane.prev(),
            _ => match self.pane {
                Pane::Details => self.handle_details_key(code),
                Pane::Schedule => self.handle_schedule_key(code),
                Pane::Music => self.handle_music_key(code, modifiers, now),
            },
        }
        false
    }

    // ── Details ───────────────────────────────────────────────────────────────

    fn handle_details_key(&mut self, code: KeyCode) {
        let field = DetailField::ALL[self.detail_cursor];
        match code {
            KeyCode::Up => {
                if self.detail_cursor > 0 {
                    self.detail_cursor -= 1;
                }
            }
            KeyCode::Down => {
                if self.detail_cursor + 1 < DetailField::ALL.len() {
                    self.detail_cursor += 1;
                }
            }
            KeyCode::Left if field == DetailField::Venue => self.cycle_venue(false),
            KeyCode::Right if field == DetailField::Venue => self.cycle_venue(true),
            KeyCode::Enter | KeyCode::Char('e') if field != DetailField::Venue => {
                self.input_buffer = self.form.detail(field).to_string();
                self.mode = Mode::Detail(field);
            }
            _ => {}
        }
    }

    fn cycle_venue(&mut self, forward: bool) {
        let len = self.venues.len();
        if len == 0 {
            return;
        }
        let next = match self.venues.iter().position(|v| v.id == self.form.venue_id) {
            Some(pos) if forward => (pos + 1) % len,
            Some(pos) => (pos + len - 1) % len,
            None => 0,
        };
        let id = self.venues[next].id.clone();
        self.form.set_detail(DetailField::Venue, &id);
    }

    fn handle_detail_input(&mut self, field: DetailField, code: KeyCode) {
        match code {
            KeyCode::Char(c) => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Enter => {
                if field.is_date() && !is_valid_date_input(&self.input_buffer) {
                    self.status = Some(("Invalid date, use YYYY-MM-DD".to_string(), Color::Red));
                    return;
                }
                let value = std::mem::take(&mut self.input_buffer);
                self.form.set_detail(field, &value);
                self.status = None;
                self.mode = Mode::Normal;
            }
            KeyCode::Esc => {
                self.input_buffer.clear();
                self.status = None;
                self.mode = Mode::Normal;
            }
            _ => {}
        }
    }

    // ── Schedule ──────────────────────────────────────────────────────────────

    fn handle_schedule_key(&mut self, code: KeyCode) {
        let len = self.form.schedule.len();
        match code {
            KeyCode::Up => {
                if self.schedule_cursor > 0 {
                    self.schedule_cursor -= 1;
                }
            }
            KeyCode::Down => {
                if self.schedule_cursor + 1 < len {
                    self.schedule_cursor += 1;
                }
            }
            KeyCode::Char('a') => {
                self.schedule_cursor = self.form.schedule.add();
                self.begin_schedule_field(ScheduleField::Date);
            }
            KeyCode::Char('e') | KeyCode::Enter if self.schedule_cursor < len => {
                self.begin_schedule_field(ScheduleField::Date);
            }
            KeyCode::Delete | KeyCode::Char('x') => {
                if self.form.schedule.remove(self.schedule_cursor)
                    && self.schedule_cursor > 0
                    && self.schedule_cursor >= self.form.schedule.len()
                {
                    self.schedule_cursor -= 1;
                }
            }
            _ => {}
        }
    }

    fn begin_schedule_field(&mut self, field: ScheduleField) {
        self.input_buffer = self
            .form
            .schedule
            .get(self.schedule_cursor)
            .map(|entry| entry.field(field).to_string())
            .unwrap_or_default();
        self.mode = Mode::Schedule(field);
    }

    fn handle_schedule_input(&mut self, field: ScheduleField, code: KeyCode) {
        match code {
            KeyCode::Char(c) => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Enter => {
                let problem = match field {
                    ScheduleField::Date if !is_valid_date_input(&self.input_buffer) => {
                        Some("Invalid date, use YYYY-MM-DD")
                    }
                    ScheduleField::Time if !is_valid_time_input(&self.input_buffer) => {
                        Some("Invalid time, use HH:MM")
                    }
                    _ => None,
                };
                if let Some(problem) = problem {
                    self.status = Some((problem.to_string(), Color::Red));
                    return;
                }
                let value = std::mem::take(&mut self.input_buffer);
                self.form
                    .schedule
                    .set_field(self.schedule_cursor, field, value.trim());
                self.status = None;
                match field.next() {
                    Some(next) => self.begin_schedule_field(next),
                    None => self.mode = Mode::Normal,
                }
            }
            KeyCode::Esc => {
                self.input_buffer.clear();
                self.status = None;
                self.mode = Mode::Normal;
            }
            _ => {}
        }
    }

    // ── Music ─────────────────────────────────────────────────────────────────

    fn music_rows(&self) -> Vec<MusicRow> {
        let services = &self.form.services;
        let mut rows = Vec::new();
        for idx in 0..services.len() {
            rows.push(MusicRow::Service(idx));
            match present_service(services, idx) {
                Some(ServiceView::Truncated { preview, more, .. }) => {
                    rows.extend((0..preview.len()).map(|i| MusicRow::Item(CellRef::new(idx, i))));
                    if more > 0 {
                        rows.push(MusicRow::More(idx));
                    }
                }
                Some(ServiceView::Full { rows: items, .. }) => {
                    rows.extend((0..items.len()).map(|i| MusicRow::Item(CellRef::new(idx, i))));
                }
                _ => {}
            }
        }
        rows
    }

    fn current_music_row(&self) -> Option<MusicRow> {
        self.music_rows().get(self.music_cursor).copied()
    }

    /// Puts the cursor on `target`, or keeps it in range if that row is gone.
    fn select_music_row(&mut self, target: MusicRow) {
        let rows = self.music_rows();
        self.music_cursor = match rows.iter().position(|r| *r == target) {
            Some(pos) => pos,
            None => self.music_cursor.min(rows.len().saturating_sub(1)),
        };
    }

    fn handle_music_key(&mut self, code: KeyCode, modifiers: KeyModifiers, now: Instant) {
        let row = self.current_music_row();
        let service = row.map(MusicRow::service);
        let shifted = modifiers.contains(KeyModifiers::SHIFT);
        match code {
            KeyCode::Up if shifted => self.move_service(service, true, now),
            KeyCode::Down if shifted => self.move_service(service, false, now),
            KeyCode::Char('K') => self.move_service(service, true, now),
            KeyCode::Char('J') => self.move_service(service, false, now),
            KeyCode::Up => {
                if self.music_cursor > 0 {
                    self.music_cursor -= 1;
                }
            }
            KeyCode::Down => {
                if self.music_cursor + 1 < self.music_rows().len() {
                    self.music_cursor += 1;
                }
            }
            KeyCode::Char('A') => {
                let idx = self.form.services.add_category();
                self.begin_item_edit(CellRef::new(idx, 0));
            }
            KeyCode::Char('a') => {
                if let Some(idx) = service {
                    // The new item has to be on screen to be typed into
                    self.form.services.open_service(idx);
                    if let Some(item) = self.form.services.add_item(idx) {
                        self.begin_item_edit(CellRef::new(idx, item));
                    }
                }
            }
            KeyCode::Char('X') => {
                if let Some(idx) = service {
                    self.form.services.remove_category(idx);
                    self.select_music_row(MusicRow::Service(idx.saturating_sub(1)));
                }
            }
            KeyCode::Char('x') => {
                if let Some(MusicRow::Item(cell)) = row {
                    self.form.services.remove_item(cell.category, cell.item);
                    self.select_music_row(MusicRow::Item(cell));
                }
            }
            KeyCode::Enter => match row {
                Some(MusicRow::Service(idx)) => {
                    self.form.services.toggle_service_expanded(idx);
                    self.select_music_row(MusicRow::Service(idx));
                }
                Some(MusicRow::Item(cell)) => self.begin_item_edit(cell),
                Some(MusicRow::More(idx)) => {
                    self.form.services.toggle_category_expanded(idx);
                }
                None => {}
            },
            KeyCode::Char('o') => {
                if let Some(idx) = service {
                    self.form.services.open_service(idx);
                    self.select_music_row(MusicRow::Service(idx));
                }
            }
            KeyCode::Char('c') => {
                if let Some(idx) = service {
                    self.form.services.toggle_category_expanded(idx);
                    self.select_music_row(MusicRow::Service(idx));
                }
            }
            KeyCode::Char('r') => {
                if let Some(idx) = service {
                    if let Some(category) = self.form.services.get(idx) {
                        self.input_buffer = category.name.clone();
                        self.mode = Mode::Rename(idx);
                    }
                }
            }
            _ => {}
        }
    }

    fn move_service(&mut self, service: Option<usize>, up: bool, now: Instant) {
        let Some(idx) = service else {
            return;
        };
        let moved = if up {
            self.form.services.move_category_up(idx, now)
        } else {
            self.form.services.move_category_down(idx, now)
        };
        if moved {
            let dest = if up { idx - 1 } else { idx + 1 };
            self.select_music_row(MusicRow::Service(dest));
        }
    }

    fn begin_item_edit(&mut self, cell: CellRef) {
        if self.form.services.set_editing_cell(cell) {
            self.suggestion_cursor = 0;
            self.mode = Mode::Item(ItemField::Title);
            self.select_music_row(MusicRow::Item(cell));
        }
    }

    fn finish_item_edit(&mut self, cell: CellRef) {
        self.form.services.toggle_typeahead(cell, false);
        self.form.services.clear_editing_cell();
        self.mode = Mode::Normal;
        self.select_music_row(MusicRow::Item(cell));
    }

    fn handle_item_input(&mut self, field: ItemField, code: KeyCode) {
        let Some(cell) = self.form.services.view().editing() else {
            self.mode = Mode::Normal;
            return;
        };
        let mut value = self
            .form
            .services
            .item(cell)
            .map(|item| field.read(item).to_string())
            .unwrap_or_default();
        let typeahead = self.form.services.view().is_typeahead_open(cell);

        match code {
            KeyCode::Char(_) | KeyCode::Backspace => {
                match code {
                    KeyCode::Char(c) => value.push(c),
                    _ => {
                        value.pop();
                    }
                }
                self.form.services.set_item_field(cell, field, &value);
                if field == ItemField::Type {
                    self.form.services.toggle_typeahead(cell, true);
                    self.suggestion_cursor = 0;
                }
            }
            KeyCode::Tab => {
                let next = field.next();
                self.form
                    .services
                    .toggle_typeahead(cell, next == ItemField::Type);
                self.suggestion_cursor = 0;
                self.mode = Mode::Item(next);
            }
            KeyCode::Up if typeahead => {
                self.suggestion_cursor = self.suggestion_cursor.saturating_sub(1);
            }
            KeyCode::Down if typeahead => {
                if self.suggestion_cursor + 1 < music_type_suggestions(&value).len() {
                    self.suggestion_cursor += 1;
                }
            }
            KeyCode::Enter if typeahead && field == ItemField::Type => {
                if let Some(choice) = music_type_suggestions(&value).get(self.suggestion_cursor) {
                    self.form.services.set_item_field(cell, ItemField::Type, choice);
                }
                self.form.services.toggle_typeahead(cell, false);
            }
            KeyCode::Enter | KeyCode::Esc => self.finish_item_edit(cell),
            _ => {}
        }
    }

    fn handle_rename_input(&mut self, idx: usize, code: KeyCode) {
        match code {
            KeyCode::Char(c) => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Enter => {
                let name = std::mem::take(&mut self.input_buffer);
                self.form.services.rename_category(idx, name.trim());
                self.mode = Mode::Normal;
            }
            KeyCode::Esc => {
                self.input_buffer.clear();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    pub fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // pane tabs
                Constraint::Min(8),    // active pane
                Constraint::Length(3), // status + key hints
            ])
            .split(f.area());

        self.render_tabs(f, chunks[0]);
        let warnings = collect_warnings(&self.form);
        match self.pane {
            Pane::Details => self.render_details(f, chunks[1]),
            Pane::Schedule => self.render_schedule(f, chunks[1], &warnings),
            Pane::Music => self.render_music(f, chunks[1], &warnings),
        }
        self.render_status(f, chunks[2], &warnings);
    }

    fn render_tabs(&self, f: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        for pane in Pane::ALL {
            let style = if pane == self.pane {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(format!(" {} ", pane.title()), style));
            spans.push(Span::raw("│"));
        }
        let title = format!(" Editing {} ", self.form.original_slug);
        let p = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(p, area);
    }

    fn venue_label(&self) -> String {
        if let Some(err) = &self.venue_error {
            return format!("{}  ({err})", self.form.venue_id);
        }
        match self.venues.iter().find(|v| v.id == self.form.venue_id) {
            Some(venue) => format!("◂ {} ▸", venue.name),
            None if self.form.venue_id.is_empty() => "◂ (none) ▸".to_string(),
            None => format!("◂ {} ▸", self.form.venue_id),
        }
    }

    fn render_details(&self, f: &mut Frame, area: Rect) {
        let rows: Vec<Row> = DetailField::ALL
            .iter()
            .map(|&field| {
                let label = if field.is_required() {
                    format!("{} *", field.label())
                } else {
                    field.label().to_string()
                };
                let value = match self.mode {
                    Mode::Detail(editing) if editing == field => format!("{}_", self.input_buffer),
                    _ if field == DetailField::Venue => self.venue_label(),
                    _ => self.form.detail(field).to_string(),
                };
                Row::new(vec![Cell::from(label), Cell::from(value)])
            })
            .collect();

        let mut table_state = TableState::default();
        table_state.select(Some(self.detail_cursor));
        let table = Table::new(rows, [Constraint::Length(14), Constraint::Min(20)])
            .block(Block::default().borders(Borders::ALL).title(" Details "))
            .row_highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_stateful_widget(table, area, &mut table_state);
    }

    fn render_schedule(&self, f: &mut Frame, area: Rect, warnings: &[Warning]) {
        let header = Row::new(vec![
            Cell::from("#").style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from("Date").style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from("Time").style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from("Description").style(Style::default().add_modifier(Modifier::BOLD)),
        ]);

        let rows: Vec<Row> = self
            .form
            .schedule
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let field_text = |field: ScheduleField| match self.mode {
                    Mode::Schedule(editing) if editing == field && i == self.schedule_cursor => {
                        format!("{}_", self.input_buffer)
                    }
                    _ => entry.field(field).to_string(),
                };
                let mut description = field_text(ScheduleField::Description);
                let warning = Warning::ScheduleIncomplete { row: i };
                let row_style = if warnings.contains(&warning) {
                    description.push_str(&format!("  ⚠ {warning}"));
                    Style::default().fg(WARN_COLOR)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(format!("{}", i + 1)),
                    Cell::from(field_text(ScheduleField::Date)),
                    Cell::from(field_text(ScheduleField::Time)),
                    Cell::from(description),
                ])
                .style(row_style)
            })
            .collect();

        let mut table_state = TableState::default();
        if !self.form.schedule.is_empty() {
            table_state.select(Some(self.schedule_cursor));
        }
        let table = Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Length(12),
                Constraint::Length(7),
                Constraint::Min(20),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Schedule ({})  times in {} ",
            self.form.schedule.len(),
            self.form.timezone
        )))
        .row_highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );
        f.render_stateful_widget(table, area, &mut table_state);
    }

    fn render_music(&self, f: &mut Frame, area: Rect, warnings: &[Warning]) {
        let rows: Vec<Row> = self
            .music_rows()
            .into_iter()
            .map(|row| self.music_row_view(row, warnings))
            .collect();

        let mut table_state = TableState::default();
        if !rows.is_empty() {
            table_state.select(Some(self.music_cursor));
        }
        let table = Table::new(rows, [Constraint::Min(20)])
            .block(Block::default().borders(Borders::ALL).title(" Music "))
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        f.render_stateful_widget(table, area, &mut table_state);
    }

    fn music_row_view(&self, row: MusicRow, warnings: &[Warning]) -> Row<'static> {
        let services = &self.form.services;
        match row {
            MusicRow::Service(idx) => {
                let Some(category) = services.get(idx) else {
                    return Row::new(vec![Cell::from("")]);
                };
                let mut text = match present_service(services, idx) {
                    Some(ServiceView::Summary {
                        name,
                        item_count,
                        preview,
                        more,
                    }) => {
                        let titles: Vec<String> = preview.iter().map(|i| i.display_line()).collect();
                        let mut line = format!("▸ {name}  ({})", item_count_label(item_count));
                        if !titles.is_empty() {
                            line.push_str(&format!("  {}", titles.join("; ")));
                        }
                        if more > 0 {
                            line.push_str(&format!("  +{more} more"));
                        }
                        line
                    }
                    _ => format!("▾ {}", service_label(category)),
                };
                if let Mode::Rename(editing) = self.mode {
                    if editing == idx {
                        text = format!("▾ {}_", self.input_buffer);
                    }
                }
                let mut style = Style::default().add_modifier(Modifier::BOLD);
                if services.view().focused() == Some(idx) {
                    style = style.bg(FOCUS_BG).fg(Color::Yellow);
                }
                let warning = Warning::ServiceUnnamed { service: idx };
                let mut lines = vec![Line::from(Span::styled(text, style))];
                if warnings.contains(&warning) {
                    lines.push(warning_line(&warning, 2));
                }
                let height = lines.len() as u16;
                Row::new(vec![Cell::from(Text::from(lines))]).height(height)
            }
            MusicRow::Item(cell) => {
                let Some(item) = services.item(cell) else {
                    return Row::new(vec![Cell::from("")]);
                };
                let warning = Warning::ItemUntitled {
                    service: cell.category,
                    item: cell.item,
                };
                let mut lines = Vec::new();
                let editing = match present_service(services, cell.category) {
                    Some(ServiceView::Full { mut rows, .. }) if cell.item < rows.len() => {
                        match rows.swap_remove(cell.item) {
                            ItemView::Editing { suggestions, .. } => Some(suggestions),
                            ItemView::Collapsed(_) => None,
                        }
                    }
                    _ => None,
                };
                match editing {
                    Some(suggestions) => {
                        let active = match self.mode {
                            Mode::Item(field) => Some(field),
                            _ => None,
                        };
                        for field in ItemField::ALL {
                            let marker = if active == Some(field) { "›" } else { " " };
                            let cursor = if active == Some(field) { "_" } else { "" };
                            lines.push(Line::from(format!(
                                "   {marker} {}: {}{cursor}",
                                field.label(),
                                field.read(item)
                            )));
                        }
                        for (i, choice) in suggestions.unwrap_or_default().iter().enumerate() {
                            let style = if i == self.suggestion_cursor {
                                Style::default().fg(Color::Black).bg(Color::Cyan)
                            } else {
                                Style::default().fg(Color::Cyan)
                            };
                            lines.push(Line::from(Span::styled(format!("        {choice}"), style)));
                        }
                    }
                    None => lines.push(Line::from(format!("    • {}", item.display_line()))),
                }
                if warnings.contains(&warning) {
                    lines.push(warning_line(&warning, 6));
                }
                let height = lines.len() as u16;
                Row::new(vec![Cell::from(Text::from(lines))]).height(height)
            }
            MusicRow::More(idx) => {
                let more = match present_service(services, idx) {
                    Some(ServiceView::Truncated { more, .. }) => more,
                    _ => 0,
                };
                Row::new(vec![Cell::from(Span::styled(
                    format!("    … {more} more (Enter to show all)"),
                    Style::default().fg(Color::DarkGray),
                ))])
            }
        }
    }

    fn render_status(&self, f: &mut Frame, area: Rect, warnings: &[Warning]) {
        let first = match &self.status {
            Some((msg, color)) => Line::from(Span::styled(msg.clone(), Style::default().fg(*color))),
            None if !warnings.is_empty() => Line::from(Span::styled(
                format!("{} row(s) need attention; they are still submitted", warnings.len()),
                Style::default().fg(WARN_COLOR),
            )),
            None => Line::from(""),
        };
        let hints = match (self.mode, self.pane) {
            (Mode::Item(ItemField::Type), _) => "type to filter  ↑↓=choose  Enter=accept/done  Tab=next field",
            (Mode::Item(_), _) => "Tab=next field  Enter/Esc=done",
            (Mode::Normal, Pane::Details) => "↑↓=move  Enter/e=edit  ←→=venue  Tab=pane  Ctrl+S=save  q=quit",
            (Mode::Normal, Pane::Schedule) => "↑↓=move  a=add  Enter/e=edit  Del/x=delete  Tab=pane  Ctrl+S=save  q=quit",
            (Mode::Normal, Pane::Music) => {
                "A/a=add service/item  X/x=remove  K/J=move  Enter=toggle  o=open all  c=all items  r=rename  Ctrl+S=save"
            }
            _ => "Enter=confirm  Esc=cancel",
        };
        let p = Paragraph::new(vec![
            first,
            Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray))),
        ])
        .block(Block::default().borders(Borders::TOP));
        f.render_widget(p, area);
    }
}

fn warning_line(warning: &Warning, indent: usize) -> Line<'static> {
    Line::from(Span::styled(
        format!("{}⚠ {warning}", " ".repeat(indent)),
        Style::default().fg(WARN_COLOR),
    ))
}

// ── App event loop ────────────────────────────────────────────────────────────

pub fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;
        if event::poll(Duration::from_millis(16))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key.code, key.modifiers) {
                    break;
                }
            }
        }
        if app.tick(Instant::now()) {
            break;
        }
    }
    Ok(())
}
