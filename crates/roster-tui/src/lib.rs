// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use roster_app::{
    InputScheduler, Record, STATUS_OPTIONS, SortKey, Status, TableCommand, TableEvent, TableState,
    VirtualWindow, WindowConfig, format_date,
};
use std::io;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const IDLE_TICK: Duration = Duration::from_millis(120);
const ROW_MARKER: &str = "›";

/// Source of the record set shown in the table.
pub trait AppRuntime {
    fn load_records(&mut self) -> Result<Vec<Record>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum InputMode {
    #[default]
    Nav,
    Search,
    StartDate,
    EndDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavAction {
    MoveRow(isize),
    MoveViewport(isize),
    JumpFirstRow,
    JumpLastRow,
    OpenSearch,
    CycleStatusFilter,
    EditStartDate,
    EditEndDate,
    SortBy(SortKey),
    NextPage,
    PrevPage,
    SetRowStatus(Status),
    ClearFilters,
    Reload,
    Quit,
}

#[derive(Debug, Default)]
struct ViewData {
    mode: InputMode,
    search_input: String,
    date_input: String,
    selected_row: usize,
    status: Option<String>,
}

pub fn run_app<R: AppRuntime>(state: &mut TableState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let mut scheduler = InputScheduler::new(state.settings());

    let mut result = Ok(());
    loop {
        let now = Instant::now();
        release_due_commands(state, &mut scheduler, &mut view_data, now);
        request_more_rows(state, &mut scheduler, &mut view_data, now);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let timeout = poll_timeout(scheduler.next_deadline(), Instant::now());
        let has_event = match event::poll(timeout).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if !has_event {
            continue;
        }
        match event::read().context("read event") {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                let now = Instant::now();
                if handle_key_event(state, runtime, &mut view_data, &mut scheduler, now, key) {
                    break;
                }
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    scheduler.cancel_all();
    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn poll_timeout(deadline: Option<Instant>, now: Instant) -> Duration {
    match deadline {
        Some(deadline) => deadline.saturating_duration_since(now).min(IDLE_TICK),
        None => IDLE_TICK,
    }
}

fn release_due_commands(
    state: &mut TableState,
    scheduler: &mut InputScheduler,
    view_data: &mut ViewData,
    now: Instant,
) {
    for command in scheduler.poll(now) {
        // A trailing load-more can outlive the condition that armed it.
        if command == TableCommand::LoadMore && !state.wants_more_rows() {
            continue;
        }
        apply_command(state, scheduler, view_data, command);
    }
}

fn request_more_rows(
    state: &mut TableState,
    scheduler: &mut InputScheduler,
    view_data: &mut ViewData,
    now: Instant,
) {
    if !state.wants_more_rows() {
        return;
    }
    if let Some(command) = scheduler.near_bottom(now) {
        apply_command(state, scheduler, view_data, command);
    }
}

fn apply_command(
    state: &mut TableState,
    scheduler: &mut InputScheduler,
    view_data: &mut ViewData,
    command: TableCommand,
) {
    for event in state.dispatch(command) {
        match event {
            TableEvent::WindowReset => {
                view_data.selected_row = 0;
                scheduler.cancel_scroll();
            }
            TableEvent::PageChanged(page) => {
                view_data.status = Some(format!("page {page}"));
            }
            TableEvent::RecordUpdated(id) => {
                view_data.status = Some(format!("record {id} updated"));
            }
            TableEvent::ValidationFailed(message) => {
                view_data.status = Some(message);
            }
            TableEvent::CeilingGrown(ceiling) => {
                debug!(ceiling, "rows revealed");
            }
            TableEvent::QueryChanged | TableEvent::Scrolled(_) => {}
        }
    }
    clamp_selected_row(state, view_data);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut TableState,
    runtime: &mut R,
    view_data: &mut ViewData,
    scheduler: &mut InputScheduler,
    now: Instant,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match view_data.mode {
        InputMode::Search => {
            handle_search_key(state, view_data, scheduler, now, key);
            false
        }
        InputMode::StartDate | InputMode::EndDate => {
            handle_date_key(state, view_data, scheduler, key);
            false
        }
        InputMode::Nav => {
            let Some(action) = nav_action_for_key(key) else {
                return false;
            };
            apply_nav_action(state, runtime, view_data, scheduler, now, action)
        }
    }
}

fn nav_action_for_key(key: KeyEvent) -> Option<NavAction> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(NavAction::MoveRow(1)),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(NavAction::MoveRow(-1)),
        (KeyCode::PageDown, _) => Some(NavAction::MoveViewport(1)),
        (KeyCode::PageUp, _) => Some(NavAction::MoveViewport(-1)),
        (KeyCode::Char('d'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(NavAction::MoveViewport(1))
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(NavAction::MoveViewport(-1))
        }
        (KeyCode::Char('g'), _) | (KeyCode::Home, _) => Some(NavAction::JumpFirstRow),
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => Some(NavAction::JumpLastRow),
        (KeyCode::Char('/'), _) => Some(NavAction::OpenSearch),
        (KeyCode::Char('s'), _) => Some(NavAction::CycleStatusFilter),
        (KeyCode::Char('f'), _) => Some(NavAction::EditStartDate),
        (KeyCode::Char('t'), _) => Some(NavAction::EditEndDate),
        (KeyCode::Char(digit @ '1'..='5'), _) => {
            let index = digit as usize - '1' as usize;
            SortKey::ALL.get(index).copied().map(NavAction::SortBy)
        }
        (KeyCode::Char('n'), _) | (KeyCode::Right, _) => Some(NavAction::NextPage),
        (KeyCode::Char('p'), _) | (KeyCode::Left, _) => Some(NavAction::PrevPage),
        (KeyCode::Char('a'), _) => Some(NavAction::SetRowStatus(Status::Active)),
        (KeyCode::Char('i'), _) => Some(NavAction::SetRowStatus(Status::Invited)),
        (KeyCode::Char('b'), _) => Some(NavAction::SetRowStatus(Status::Blocked)),
        (KeyCode::Char('c'), KeyModifiers::NONE) => Some(NavAction::ClearFilters),
        (KeyCode::Char('R'), _) => Some(NavAction::Reload),
        (KeyCode::Char('q'), _) => Some(NavAction::Quit),
        _ => None,
    }
}

fn apply_nav_action<R: AppRuntime>(
    state: &mut TableState,
    runtime: &mut R,
    view_data: &mut ViewData,
    scheduler: &mut InputScheduler,
    now: Instant,
    action: NavAction,
) -> bool {
    match action {
        NavAction::MoveRow(delta) => move_selection(state, view_data, scheduler, now, delta),
        NavAction::MoveViewport(direction) => {
            let step = viewport_rows(state.settings().window) as isize;
            move_selection(state, view_data, scheduler, now, direction * step);
        }
        NavAction::JumpFirstRow => {
            move_selection(state, view_data, scheduler, now, isize::MIN / 2);
        }
        NavAction::JumpLastRow => {
            move_selection(state, view_data, scheduler, now, isize::MAX / 2);
        }
        NavAction::OpenSearch => {
            // A pending search is newer than the applied one.
            if !scheduler.search_pending() {
                view_data.search_input = state.query().search.clone();
            }
            view_data.mode = InputMode::Search;
        }
        NavAction::CycleStatusFilter => {
            let next = Status::cycle_filter(state.query().status_filter);
            apply_command(
                state,
                scheduler,
                view_data,
                TableCommand::SetStatusFilter(next),
            );
        }
        NavAction::EditStartDate => {
            view_data.date_input = state
                .query()
                .date_range
                .start
                .map(format_date)
                .unwrap_or_default();
            view_data.mode = InputMode::StartDate;
        }
        NavAction::EditEndDate => {
            view_data.date_input = state
                .query()
                .date_range
                .end
                .map(format_date)
                .unwrap_or_default();
            view_data.mode = InputMode::EndDate;
        }
        NavAction::SortBy(key) => {
            apply_command(state, scheduler, view_data, TableCommand::SortBy(key));
        }
        NavAction::NextPage => {
            apply_command(state, scheduler, view_data, TableCommand::NextPage);
        }
        NavAction::PrevPage => {
            apply_command(state, scheduler, view_data, TableCommand::PrevPage);
        }
        NavAction::SetRowStatus(status) => {
            let Some(id) = selected_record(state, view_data).map(|record| record.id.clone())
            else {
                view_data.status = Some("no row selected".to_owned());
                return false;
            };
            apply_command(
                state,
                scheduler,
                view_data,
                TableCommand::UpdateStatus { id, status },
            );
        }
        NavAction::ClearFilters => {
            scheduler.cancel_search();
            view_data.search_input.clear();
            apply_command(state, scheduler, view_data, TableCommand::ClearFilters);
            view_data.status = Some("filters cleared".to_owned());
        }
        NavAction::Reload => reload_records(state, runtime, view_data, scheduler),
        NavAction::Quit => return true,
    }
    false
}

fn handle_search_key(
    state: &mut TableState,
    view_data: &mut ViewData,
    scheduler: &mut InputScheduler,
    now: Instant,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Enter, _) => {
            if let Some(command) = scheduler.flush_search() {
                apply_command(state, scheduler, view_data, command);
            }
            view_data.mode = InputMode::Nav;
        }
        (KeyCode::Esc, _) => {
            view_data.mode = InputMode::Nav;
        }
        (KeyCode::Backspace, _) => {
            view_data.search_input.pop();
            scheduler.search_input(now, view_data.search_input.clone());
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.search_input.clear();
            scheduler.search_input(now, String::new());
        }
        (KeyCode::Char(ch), modifiers)
            if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT =>
        {
            view_data.search_input.push(ch);
            scheduler.search_input(now, view_data.search_input.clone());
        }
        _ => {}
    }
}

fn handle_date_key(
    state: &mut TableState,
    view_data: &mut ViewData,
    scheduler: &mut InputScheduler,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Enter, _) => {
            let raw = Some(std::mem::take(&mut view_data.date_input));
            let command = match view_data.mode {
                InputMode::StartDate => TableCommand::SetStartDate(raw),
                _ => TableCommand::SetEndDate(raw),
            };
            view_data.mode = InputMode::Nav;
            apply_command(state, scheduler, view_data, command);
        }
        (KeyCode::Esc, _) => {
            view_data.date_input.clear();
            view_data.mode = InputMode::Nav;
        }
        (KeyCode::Backspace, _) => {
            view_data.date_input.pop();
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.date_input.clear();
        }
        (KeyCode::Char(ch), modifiers)
            if (ch.is_ascii_digit() || ch == '-')
                && (modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) =>
        {
            view_data.date_input.push(ch);
        }
        _ => {}
    }
}

fn reload_records<R: AppRuntime>(
    state: &mut TableState,
    runtime: &mut R,
    view_data: &mut ViewData,
    scheduler: &mut InputScheduler,
) {
    let result = runtime
        .load_records()
        .and_then(|records| state.replace_records(records));
    match result {
        Ok(_) => {
            scheduler.cancel_scroll();
            view_data.selected_row = 0;
            view_data.status = Some(format!("reloaded {} records", state.records().len()));
        }
        Err(error) => {
            warn!(error = %error, "reload failed");
            view_data.status = Some(format!("reload failed: {error}"));
        }
    }
}

/// Moves the cursor within the revealed rows and scrolls so it stays inside
/// the viewport. Scroll ticks go through the throttle.
fn move_selection(
    state: &mut TableState,
    view_data: &mut ViewData,
    scheduler: &mut InputScheduler,
    now: Instant,
    delta: isize,
) {
    let revealed = state.window().revealed_len(state.page_rows().len());
    if revealed == 0 {
        view_data.selected_row = 0;
        return;
    }
    let target = view_data.selected_row.saturating_add_signed(delta);
    view_data.selected_row = target.min(revealed - 1);

    let config = state.settings().window;
    let offset = scroll_offset_for_row(
        state.window().scroll_offset_px,
        view_data.selected_row,
        config,
    );
    if let Some(command) = scheduler.scroll_input(now, offset) {
        apply_command(state, scheduler, view_data, command);
    }
}

fn clamp_selected_row(state: &TableState, view_data: &mut ViewData) {
    let revealed = state.window().revealed_len(state.page_rows().len());
    view_data.selected_row = view_data.selected_row.min(revealed.saturating_sub(1));
}

/// Offset that keeps `row` fully inside the viewport, moving as little as
/// possible from `current`.
fn scroll_offset_for_row(current: u64, row: usize, config: WindowConfig) -> u64 {
    let top = VirtualWindow::row_top_px(row, config);
    let bottom = top + u64::from(config.row_height);
    let viewport = u64::from(config.container_height);
    if top < current {
        top
    } else if bottom > current + viewport {
        bottom.saturating_sub(viewport)
    } else {
        current
    }
}

fn viewport_rows(config: WindowConfig) -> usize {
    (config.container_height / config.row_height.max(1)).max(1) as usize
}

fn selected_record<'a>(state: &'a TableState, view_data: &ViewData) -> Option<&'a Record> {
    let revealed = state.window().revealed_len(state.page_rows().len());
    if view_data.selected_row >= revealed {
        return None;
    }
    state.page_rows().get(view_data.selected_row)
}

fn render(frame: &mut ratatui::Frame<'_>, state: &TableState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let stats = Paragraph::new(stats_line(state))
        .block(Block::default().title("roster").borders(Borders::ALL));
    frame.render_widget(stats, layout[0]);

    let filters = Paragraph::new(filter_line(state, view_data))
        .block(Block::default().title("filters").borders(Borders::ALL));
    frame.render_widget(filters, layout[1]);

    render_table(frame, layout[2], state, view_data);

    let footer = Paragraph::new(vec![
        Line::from(state.view().summary.label()),
        Line::from(Span::styled(
            status_text(view_data),
            Style::default().fg(Color::Yellow),
        )),
    ])
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, layout[3]);
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &TableState,
    view_data: &ViewData,
) {
    let sort = state.query().sort;
    let header_cells = std::iter::once(Cell::from(""))
        .chain(SortKey::ALL.iter().map(|key| {
            Cell::from(header_label(*key, sort.indicator(*key))).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        }))
        .collect::<Vec<_>>();
    let header = Row::new(header_cells);

    let rows = state.visible_rows().map(|(index, record)| {
        let selected = index == view_data.selected_row;
        let mut row_style = Style::default();
        if selected {
            row_style = row_style.bg(Color::DarkGray);
        }
        let option = record.about.status.option();
        let status_style = hex_color(option.color)
            .map(|color| Style::default().fg(color))
            .unwrap_or_default();
        Row::new(vec![
            Cell::from(if selected { ROW_MARKER } else { "" }),
            Cell::from(record.about.name.clone()),
            Cell::from(record.about.email.clone()),
            Cell::from(format_date(record.details.date)),
            Cell::from(record.details.invited_by.clone()),
            Cell::from(option.label).style(status_style),
        ])
        .style(row_style)
    });

    let widths = [
        Constraint::Length(1),
        Constraint::Min(14),
        Constraint::Min(22),
        Constraint::Length(12),
        Constraint::Min(12),
        Constraint::Length(10),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(state))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn header_label(key: SortKey, indicator: &str) -> String {
    if indicator.is_empty() {
        key.label().to_owned()
    } else {
        format!("{} {indicator}", key.label())
    }
}

fn table_title(state: &TableState) -> String {
    let rows = state.page_rows().len();
    let revealed = state.window().revealed_len(rows);
    let range = state.window_range();
    if range.is_empty() {
        return "no rows".to_owned();
    }
    format!(
        "rows {}-{} of {revealed} shown ({rows} on page)",
        range.start_index + 1,
        range.end_index
    )
}

fn stats_line(state: &TableState) -> Line<'static> {
    let stats = state.view().stats;
    let mut spans = vec![Span::raw(format!("total {}", stats.total))];
    for option in STATUS_OPTIONS {
        let percent = match option.status {
            Status::Active => stats.active_pct,
            Status::Invited => stats.invited_pct,
            Status::Blocked => stats.blocked_pct,
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!(
                "{} {} ({percent}%)",
                option.label,
                stats.count(option.status)
            ),
            hex_color(option.color)
                .map(|color| Style::default().fg(color))
                .unwrap_or_default(),
        ));
    }
    Line::from(spans)
}

fn filter_line(state: &TableState, view_data: &ViewData) -> Line<'static> {
    let query = state.query();
    let search = match view_data.mode {
        InputMode::Search => format!("/{}_", view_data.search_input),
        _ => query.search.clone(),
    };
    let status = query
        .status_filter
        .map(|status| status.option().label)
        .unwrap_or("all");
    let dates = match view_data.mode {
        InputMode::StartDate => format!("from {}_", view_data.date_input),
        InputMode::EndDate => format!("to {}_", view_data.date_input),
        InputMode::Nav | InputMode::Search => query.date_range.display(),
    };

    let mut spans = vec![Span::raw(format!(
        "search: {search}  status: {status}  dates: {dates}"
    ))];
    if let Some(error) = state.date_error() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            error.to_owned(),
            Style::default().fg(Color::Red),
        ));
    }
    Line::from(spans)
}

fn status_text(view_data: &ViewData) -> String {
    let hints = match view_data.mode {
        InputMode::Nav => {
            "j/k pg g/G | / search s status f/t dates 1-5 sort | n/p page | a/i/b row | c clear R reload q"
        }
        InputMode::Search => "type to search | enter apply | esc back",
        InputMode::StartDate | InputMode::EndDate => {
            "YYYY-MM-DD | enter apply (blank clears) | esc cancel"
        }
    };
    match &view_data.status {
        Some(status) => format!("{status} | {hints}"),
        None => hints.to_owned(),
    }
}

/// Parses `#RGB` or `#RRGGBB`.
fn hex_color(code: &str) -> Option<Color> {
    let digits = code.strip_prefix('#')?;
    let channel = |hex: &str| u8::from_str_radix(hex, 16).ok();
    match digits.len() {
        3 => {
            let mut expanded = digits.chars().map(|ch| {
                let pair = format!("{ch}{ch}");
                channel(&pair)
            });
            let r = expanded.next()??;
            let g = expanded.next()??;
            let b = expanded.next()??;
            Some(Color::Rgb(r, g, b))
        }
        6 => Some(Color::Rgb(
            channel(digits.get(0..2)?)?,
            channel(digits.get(2..4)?)?,
            channel(digits.get(4..6)?)?,
        )),
        _ => None,
    }
}
