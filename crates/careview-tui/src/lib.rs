// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use careview_app::{
    AppCommand, AppMode, AppState, BasicsSummary, DisplayRow, Invitation, InvitationId, PersonId,
    PersonRecord, RosterColumn, RosterView, SortDirection, TabKind,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::format_description;

const SORT_ARROW_ASC: &str = " ↑";
const SORT_ARROW_DESC: &str = " ↓";
const SEARCH_LABEL: &str = "Patient List";

/// Seam between the UI and whatever supplies roster data. Every method is
/// synchronous; a call finishes before the next input event is handled.
pub trait AppRuntime {
    fn load_people(&mut self) -> Result<Vec<PersonRecord>>;
    fn load_invitations(&mut self) -> Result<Vec<Invitation>>;
    fn accept_invitation(&mut self, invitation_id: InvitationId) -> Result<PersonId>;
    fn dismiss_invitation(&mut self, invitation_id: InvitationId) -> Result<()>;
    fn load_basics(&mut self, person_id: PersonId) -> Result<BasicsSummary>;
    fn show_names_default(&mut self) -> Result<Option<bool>>;
    fn set_show_names_default(&mut self, show: bool) -> Result<()>;
    fn set_start_tab_default(&mut self, tab: TabKind) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BasicsPane {
    person_name: String,
    link: String,
    summary: BasicsSummary,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    roster: RosterView,
    search_input: String,
    selected_row: usize,
    selected_col: usize,
    invitations: Vec<Invitation>,
    invitation_cursor: usize,
    basics: Option<BasicsPane>,
    help_visible: bool,
    status_token: u64,
}

impl ViewData {
    fn selected_column(&self) -> RosterColumn {
        RosterColumn::ALL[self.selected_col.min(RosterColumn::ALL.len() - 1)]
    }

    fn selected_person(&self) -> Option<&DisplayRow> {
        self.roster.visible_rows().get(self.selected_row)
    }

    fn clamp_cursors(&mut self) {
        let row_count = self.roster.visible_rows().len();
        self.selected_row = self.selected_row.min(row_count.saturating_sub(1));
        self.invitation_cursor = self
            .invitation_cursor
            .min(self.invitations.len().saturating_sub(1));
    }
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    match runtime.show_names_default() {
        Ok(Some(show)) => view_data.roster.set_show_names(show),
        Ok(None) => {}
        Err(error) => {
            state.dispatch(AppCommand::SetStatus(format!("load failed: {error}")));
        }
    }

    if let Err(error) = refresh_view_data(runtime, &mut view_data) {
        state.dispatch(AppCommand::SetStatus(format!("load failed: {error}")));
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    // The active tab is where the next launch starts.
    if result.is_ok() {
        result = runtime.set_start_tab_default(state.active_tab);
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status_token += 1;
    state.dispatch(AppCommand::SetStatus(message.into()));
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn refresh_view_data<R: AppRuntime>(runtime: &mut R, view_data: &mut ViewData) -> Result<()> {
    let people = runtime.load_people()?;
    view_data.roster.set_people(people);
    view_data.invitations = runtime.load_invitations()?;
    view_data.clamp_cursors();
    Ok(())
}

/// Returns true when the app should exit.
fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if view_data.help_visible {
        view_data.help_visible = false;
        return false;
    }

    match state.mode {
        AppMode::Search => {
            handle_search_key(state, view_data, key);
            false
        }
        AppMode::Nav => handle_nav_key(state, runtime, view_data, internal_tx, key),
    }
}

fn handle_search_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Backspace => {
            view_data.search_input.pop();
            let needle = view_data.search_input.clone();
            view_data.roster.change_filter(&needle);
            view_data.clamp_cursors();
        }
        KeyCode::Char(ch) => {
            view_data.search_input.push(ch);
            let needle = view_data.search_input.clone();
            view_data.roster.change_filter(&needle);
            view_data.clamp_cursors();
        }
        _ => {}
    }
}

fn handle_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => {
            state.dispatch(AppCommand::NextTab);
        }
        KeyCode::BackTab => {
            state.dispatch(AppCommand::PrevTab);
        }
        KeyCode::Char('?') => {
            view_data.help_visible = true;
        }
        KeyCode::Char('r') => {
            match refresh_view_data(runtime, view_data) {
                Ok(()) => emit_status(state, view_data, internal_tx, "roster refreshed"),
                Err(error) => {
                    emit_status(state, view_data, internal_tx, format!("load failed: {error}"));
                }
            }
        }
        _ => match state.active_tab {
            TabKind::Patients => {
                handle_patients_key(state, runtime, view_data, internal_tx, key);
            }
            TabKind::Invitations => {
                handle_invitations_key(state, runtime, view_data, internal_tx, key);
            }
            TabKind::Basics => {}
        },
    }
    false
}

fn handle_patients_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => move_roster_cursor(view_data, 1),
        KeyCode::Up | KeyCode::Char('k') => move_roster_cursor(view_data, -1),
        KeyCode::Char('g') => view_data.selected_row = 0,
        KeyCode::Char('G') => {
            view_data.selected_row = view_data.roster.visible_rows().len().saturating_sub(1);
        }
        KeyCode::Left => {
            view_data.selected_col = view_data.selected_col.saturating_sub(1);
        }
        KeyCode::Right => {
            view_data.selected_col = (view_data.selected_col + 1).min(RosterColumn::ALL.len() - 1);
        }
        KeyCode::Char('/') => {
            state.dispatch(AppCommand::EnterSearch);
        }
        KeyCode::Char('s') => {
            let column = view_data.selected_column();
            let direction = view_data.roster.cycle_sort(column);
            let label = match direction {
                SortDirection::Asc => "asc",
                SortDirection::Desc => "desc",
            };
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("sort {} {label}", column.header()),
            );
        }
        KeyCode::Char('n') => {
            let show = view_data.roster.toggle_show_names();
            view_data.clamp_cursors();
            if let Err(error) = runtime.set_show_names_default(show) {
                emit_status(state, view_data, internal_tx, format!("save failed: {error}"));
                return;
            }
            let label = if show { "names shown" } else { "names hidden" };
            emit_status(state, view_data, internal_tx, label);
        }
        KeyCode::Enter => open_basics(state, runtime, view_data, internal_tx),
        _ => {}
    }
}

fn move_roster_cursor(view_data: &mut ViewData, delta: isize) {
    let row_count = view_data.roster.visible_rows().len();
    if row_count == 0 {
        view_data.selected_row = 0;
        return;
    }
    let current = view_data.selected_row as isize;
    let next = (current + delta).clamp(0, row_count as isize - 1);
    view_data.selected_row = next as usize;
}

fn open_basics<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(row) = view_data.selected_person() else {
        emit_status(state, view_data, internal_tx, "no patient selected");
        return;
    };
    let person_id = row.person.id;
    let person_name = row.full_name.clone();
    let link = row.link.clone();

    match runtime.load_basics(person_id) {
        Ok(summary) => {
            view_data.basics = Some(BasicsPane {
                person_name: person_name.clone(),
                link,
                summary,
            });
            state.dispatch(AppCommand::SelectTab(TabKind::Basics));
            emit_status(state, view_data, internal_tx, format!("basics: {person_name}"));
        }
        Err(error) => {
            emit_status(state, view_data, internal_tx, format!("load failed: {error}"));
        }
    }
}

fn handle_invitations_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            if !view_data.invitations.is_empty() {
                view_data.invitation_cursor =
                    (view_data.invitation_cursor + 1).min(view_data.invitations.len() - 1);
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_data.invitation_cursor = view_data.invitation_cursor.saturating_sub(1);
        }
        KeyCode::Char('a') => {
            let Some(invitation) = view_data.invitations.get(view_data.invitation_cursor) else {
                emit_status(state, view_data, internal_tx, "no invitation selected");
                return;
            };
            let invitation_id = invitation.id;
            let creator = invitation.creator_name.clone();

            match runtime.accept_invitation(invitation_id) {
                Ok(_person_id) => {
                    // Reloading the roster here resets the people table to
                    // the fresh unsorted, unfiltered list.
                    if let Err(error) = refresh_view_data(runtime, view_data) {
                        emit_status(
                            state,
                            view_data,
                            internal_tx,
                            format!("load failed: {error}"),
                        );
                        return;
                    }
                    emit_status(
                        state,
                        view_data,
                        internal_tx,
                        format!("accepted invitation from {creator}"),
                    );
                }
                Err(error) => {
                    emit_status(
                        state,
                        view_data,
                        internal_tx,
                        format!("accept failed: {error}"),
                    );
                }
            }
        }
        KeyCode::Char('d') => {
            let Some(invitation) = view_data.invitations.get(view_data.invitation_cursor) else {
                emit_status(state, view_data, internal_tx, "no invitation selected");
                return;
            };
            let invitation_id = invitation.id;
            let creator = invitation.creator_name.clone();

            match runtime.dismiss_invitation(invitation_id) {
                Ok(()) => {
                    view_data.invitations.retain(|invite| invite.id != invitation_id);
                    view_data.clamp_cursors();
                    emit_status(
                        state,
                        view_data,
                        internal_tx,
                        format!("dismissed invitation from {creator}"),
                    );
                }
                Err(error) => {
                    emit_status(
                        state,
                        view_data,
                        internal_tx,
                        format!("dismiss failed: {error}"),
                    );
                }
            }
        }
        _ => {}
    }
}

fn render(frame: &mut Frame<'_>, state: &AppState, view_data: &ViewData) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_tabs(frame, state, chunks[0]);
    match state.active_tab {
        TabKind::Patients => render_patients(frame, state, view_data, chunks[1]),
        TabKind::Invitations => render_invitations(frame, view_data, chunks[1]),
        TabKind::Basics => render_basics(frame, view_data, chunks[1]),
    }
    render_status(frame, state, chunks[2]);

    if view_data.help_visible {
        render_help(frame, frame.area());
    }
}

fn render_tabs(frame: &mut Frame<'_>, state: &AppState, area: Rect) {
    let titles: Vec<String> = TabKind::ALL
        .iter()
        .map(|tab| tab.label().to_owned())
        .collect();
    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider("|");
    frame.render_widget(tabs, area);
}

fn render_patients(frame: &mut Frame<'_>, state: &AppState, view_data: &ViewData, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    frame.render_widget(
        Paragraph::new(search_bar_line(state, view_data)),
        chunks[0],
    );

    let rows = view_data.roster.visible_rows();
    let header_cells = RosterColumn::ALL.iter().map(|column| {
        Cell::from(header_label_for_column(&view_data.roster, *column)).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells);

    let body = rows.iter().enumerate().map(|(row_index, row)| {
        let selected = row_index == view_data.selected_row;
        let cells = RosterColumn::ALL.iter().enumerate().map(|(col_index, column)| {
            let text = match column {
                RosterColumn::FullName => row.full_name.clone(),
                RosterColumn::Birthday => row.birthday_display.clone(),
                RosterColumn::LastUpload => row.last_upload.clone(),
            };
            let mut style = Style::default();
            if matches!(column, RosterColumn::FullName) {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            if selected {
                style = style.bg(Color::DarkGray);
            }
            if selected && col_index == view_data.selected_col {
                style = Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD);
            }
            Cell::from(text).style(style)
        });
        Row::new(cells.collect::<Vec<_>>())
    });

    let widths = [
        Constraint::Min(24),
        Constraint::Min(14),
        Constraint::Min(14),
    ];
    let table = Table::new(body, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(patients_title(view_data))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, chunks[1]);
}

fn search_bar_line(state: &AppState, view_data: &ViewData) -> String {
    let toggle = if view_data.roster.show_names() {
        "Hide Names"
    } else {
        "Show Names"
    };
    let input = if state.mode == AppMode::Search {
        format!("search: {}_", view_data.search_input)
    } else if view_data.search_input.is_empty() {
        "search: (press / to filter)".to_owned()
    } else {
        format!("search: {}", view_data.search_input)
    };
    format!("{SEARCH_LABEL} | {input} | [{toggle}: n]")
}

fn patients_title(view_data: &ViewData) -> String {
    let mut parts = vec![format!("patients r:{}", view_data.roster.visible_rows().len())];
    if view_data.roster.searching() {
        parts.push("search on".to_owned());
    }
    if !view_data.roster.show_names() {
        parts.push("names hidden".to_owned());
    }
    parts.join(" | ")
}

fn header_label_for_column(roster: &RosterView, column: RosterColumn) -> String {
    let mut label = column.header().to_owned();
    match roster.sort_indicator(column) {
        Some(SortDirection::Asc) => label.push_str(SORT_ARROW_ASC),
        Some(SortDirection::Desc) => label.push_str(SORT_ARROW_DESC),
        None => {}
    }
    label
}

fn render_invitations(frame: &mut Frame<'_>, view_data: &ViewData, area: Rect) {
    if view_data.invitations.is_empty() {
        let message = Paragraph::new("no pending invitations").block(
            Block::default()
                .title("invitations r:0")
                .borders(Borders::ALL),
        );
        frame.render_widget(message, area);
        return;
    }

    let header = Row::new(
        ["FROM", "EMAIL", "RECEIVED", "NOTE"].map(|label| {
            Cell::from(label).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        }),
    );

    let body = view_data
        .invitations
        .iter()
        .enumerate()
        .map(|(row_index, invitation)| {
            let mut style = Style::default();
            if row_index == view_data.invitation_cursor {
                style = style.bg(Color::DarkGray);
            }
            Row::new([
                Cell::from(invitation.creator_name.clone()),
                Cell::from(invitation.creator_email.clone()),
                Cell::from(format_received_date(invitation.created_at)),
                Cell::from(invitation.context.clone()),
            ])
            .style(style)
        });

    let widths = [
        Constraint::Min(18),
        Constraint::Min(24),
        Constraint::Min(12),
        Constraint::Min(24),
    ];
    let table = Table::new(body, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(format!(
                    "invitations r:{} | a accept | d dismiss",
                    view_data.invitations.len()
                ))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn render_basics(frame: &mut Frame<'_>, view_data: &ViewData, area: Rect) {
    let Some(pane) = &view_data.basics else {
        let message = Paragraph::new("select a patient and press enter to open basics").block(
            Block::default().title("basics").borders(Borders::ALL),
        );
        frame.render_widget(message, area);
        return;
    };

    let block = Block::default()
        .title(format!("basics | {} | {}", pane.person_name, pane.link))
        .borders(Borders::ALL);

    if pane.summary.is_missing() {
        let message = Paragraph::new(missing_basics_message()).block(block);
        frame.render_widget(message, area);
        return;
    }

    let mut lines = vec![pane.summary.title(), String::new()];
    for section in &pane.summary.sections {
        lines.push(format!("{:<14} {}", section.kind.label(), section.count));
    }
    lines.push(String::new());
    lines.push(match pane.summary.latest_upload {
        Some(timestamp) => format!("last upload: {}", format_upload_time(timestamp)),
        None => "last upload: never".to_owned(),
    });

    let body = Paragraph::new(lines.join("\n")).block(block);
    frame.render_widget(body, area);
}

fn missing_basics_message() -> String {
    [
        "The basics view shows a summary of recent device activity,",
        "but no device data has been uploaded yet.",
        "",
        "Upload some device data, then press r to refresh.",
    ]
    .join("\n")
}

fn render_status(frame: &mut Frame<'_>, state: &AppState, area: Rect) {
    let text = match &state.status_line {
        Some(message) => message.clone(),
        None => "? help | / search | tab views | q quit".to_owned(),
    };
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn render_help(frame: &mut Frame<'_>, area: Rect) {
    let width = area.width.min(52);
    let height = area.height.min(14);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    let text = "\
tab/shift-tab: switch view\n\
j/k or arrows: move | g/G first/last\n\
left/right: pick column | s: sort column\n\
/: search names | n: hide or show names\n\
enter: open basics for patient\n\
a/d: accept or dismiss invitation\n\
r: refresh from the data service\n\
q: quit\n\
\n\
any key closes this help";
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text).block(Block::default().title("help").borders(Borders::ALL)),
        popup,
    );
}

fn format_received_date(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

fn format_upload_time(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(&format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_default()
}
