//! Main application logic for the terminal user interface.
//!
//! `App` owns the task store and everything the dashboard needs on top of it:
//! per-view cursors, the new-task form, the chat session and a status line. Key
//! events are dispatched by screen, then by view; rendering reads the store's
//! derived views and never mutates it.

use std::io;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table,
        TableState, Tabs, Wrap,
    },
    Frame, Terminal,
};
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::chat::{post_chat, ChatReply, ChatSession, Role};
use crate::display::{
    empty_state_message, format_due_relative, render_detail, task_count_line, truncate,
};
use crate::error::ApiError;
use crate::fields::{Status, ViewType};
use crate::store::TaskStore;
use crate::task::{project_name, Task};
use crate::tui::{
    colors::{priority_color, status_color, AMBER, DARK_RED, EMERALD, SKY},
    enums::{AppState, Focus},
    input::InputField,
    task_form::{
        TaskForm, ASSIGNEE_FIELD, DESCRIPTION_FIELD, DUE_FIELD, PRIORITY_FIELD, PROJECT_FIELD,
        STATUS_FIELD, TITLE_FIELD,
    },
    utils::{centered_rect, right_drawer},
};
use crate::views::{
    board_view, calendar_view, drop_on_column, first_of_month, list_view, next_month, prev_month,
};

pub struct App {
    store: TaskStore,
    client: ApiClient,
    today: NaiveDate,
    state: AppState,
    focus: Focus,
    search: InputField,
    list_selected: usize,
    board_column: usize,
    board_card: usize,
    calendar_month: NaiveDate,
    calendar_cursor: NaiveDate,
    /// Which of the cursor day's listed tasks Enter opens.
    calendar_card: usize,
    form: TaskForm,
    chat: ChatSession,
    chat_input: InputField,
    chat_rx: Option<Receiver<Result<ChatReply, ApiError>>>,
    confirm_delete: bool,
    status_message: String,
}

impl App {
    pub fn new(store: TaskStore, client: ApiClient, today: NaiveDate) -> Self {
        let search = InputField::with_value(store.search_query());
        App {
            store,
            client,
            today,
            state: AppState::Dashboard,
            focus: Focus::Content,
            search,
            list_selected: 0,
            board_column: 0,
            board_card: 0,
            calendar_month: first_of_month(today),
            calendar_cursor: today,
            calendar_card: 0,
            form: TaskForm::new(),
            chat: ChatSession::new(),
            chat_input: InputField::new(),
            chat_rx: None,
            confirm_delete: false,
            status_message: String::new(),
        }
    }

    fn current_column(&self) -> Status {
        Status::ALL[self.board_column.min(Status::ALL.len() - 1)]
    }

    /// Keep every cursor inside the collection it points into.
    fn clamp_selection(&mut self) {
        let list_len = list_view(&self.store).len();
        self.list_selected = self.list_selected.min(list_len.saturating_sub(1));
        let column_len = board_view(&self.store).column(self.current_column()).len();
        self.board_card = self.board_card.min(column_len.saturating_sub(1));
        let day_len = self.calendar_day_len();
        self.calendar_card = self.calendar_card.min(day_len.saturating_sub(1));
    }

    /// Id of the task under the cursor of the active view.
    fn highlighted_task_id(&self) -> Option<String> {
        match self.store.view_type() {
            ViewType::List => list_view(&self.store)
                .get(self.list_selected)
                .map(|t| t.id.clone()),
            ViewType::Board => board_view(&self.store)
                .column(self.current_column())
                .get(self.board_card)
                .map(|t| t.id.clone()),
            ViewType::Calendar => calendar_view(&self.store, self.calendar_month, self.today)
                .day(self.calendar_cursor)
                .and_then(|day| day.tasks.get(self.calendar_card))
                .map(|t| t.id.clone()),
        }
    }

    fn set_view(&mut self, view: ViewType) {
        self.store.set_view_type(view);
        self.clamp_selection();
    }

    fn sync_search(&mut self) {
        self.store.set_search_query(self.search.value.clone());
        self.list_selected = 0;
        self.board_card = 0;
        self.calendar_card = 0;
    }

    fn move_calendar_cursor(&mut self, forward: bool, days: u64) {
        let moved = if forward {
            self.calendar_cursor.checked_add_days(Days::new(days))
        } else {
            self.calendar_cursor.checked_sub_days(Days::new(days))
        };
        if let Some(date) = moved {
            self.set_calendar_cursor(date);
        }
    }

    fn set_calendar_cursor(&mut self, date: NaiveDate) {
        self.calendar_cursor = date;
        self.calendar_month = first_of_month(date);
        self.calendar_card = 0;
    }

    /// Number of tasks listed in the cursor day's cell.
    fn calendar_day_len(&self) -> usize {
        calendar_view(&self.store, self.calendar_month, self.today)
            .day(self.calendar_cursor)
            .map_or(0, |day| day.tasks.len())
    }

    /// Handle one key event. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        self.status_message.clear();

        match self.state {
            AppState::Dashboard => self.handle_dashboard_input(key.code, key.modifiers),
            AppState::NewTask => self.handle_form_input(key.code),
            AppState::Chat => self.handle_chat_input(key.code),
            AppState::Help => {
                self.state = AppState::Dashboard;
                false
            }
        }
    }

    fn handle_dashboard_input(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if self.store.is_detail_open() {
            self.handle_drawer_input(code);
            return false;
        }
        if self.focus == Focus::Search {
            self.handle_search_input(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('/') => self.focus = Focus::Search,
            KeyCode::Tab => self.set_view(self.store.view_type().next()),
            KeyCode::Char('1') => self.set_view(ViewType::List),
            KeyCode::Char('2') => self.set_view(ViewType::Board),
            KeyCode::Char('3') => self.set_view(ViewType::Calendar),
            KeyCode::Char('n') => {
                self.form.reset();
                self.state = AppState::NewTask;
            }
            KeyCode::Char('c') => self.state = AppState::Chat,
            KeyCode::Char('?') => self.state = AppState::Help,
            _ => match self.store.view_type() {
                ViewType::List => self.handle_list_input(code),
                ViewType::Board => self.handle_board_input(code, modifiers),
                ViewType::Calendar => self.handle_calendar_input(code),
            },
        }
        false
    }

    fn handle_search_input(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.focus = Focus::Content,
            KeyCode::Esc => {
                self.search.clear();
                self.sync_search();
                self.focus = Focus::Content;
            }
            KeyCode::Backspace => {
                self.search.handle_backspace();
                self.sync_search();
            }
            KeyCode::Delete => {
                self.search.handle_delete();
                self.sync_search();
            }
            KeyCode::Left => self.search.move_cursor_left(),
            KeyCode::Right => self.search.move_cursor_right(),
            KeyCode::Char(c) => {
                self.search.handle_char(c);
                self.sync_search();
            }
            _ => {}
        }
    }

    fn open_highlighted(&mut self) {
        if let Some(id) = self.highlighted_task_id() {
            debug!(task_id = %id, "opening task detail");
            self.store.open_detail(id);
            self.confirm_delete = false;
        }
    }

    fn handle_list_input(&mut self, code: KeyCode) {
        let len = list_view(&self.store).len();
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.list_selected = self.list_selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.list_selected + 1 < len {
                    self.list_selected += 1;
                }
            }
            KeyCode::Enter => self.open_highlighted(),
            _ => {}
        }
    }

    fn handle_board_input(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let shifting = modifiers.contains(KeyModifiers::CONTROL)
            || modifiers.contains(KeyModifiers::SHIFT);
        match code {
            KeyCode::Left | KeyCode::Right if shifting => {
                let target = if code == KeyCode::Left {
                    self.board_column.checked_sub(1)
                } else {
                    Some(self.board_column + 1).filter(|c| *c < Status::ALL.len())
                };
                let (Some(target), Some(id)) = (target, self.highlighted_task_id()) else {
                    return;
                };
                let status = Status::ALL[target];
                if drop_on_column(&mut self.store, &id, status) {
                    self.board_column = target;
                    self.board_card = board_view(&self.store)
                        .column(status)
                        .iter()
                        .position(|t| t.id == id)
                        .unwrap_or(0);
                    self.status_message = format!("Moved to {}", status.label());
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.board_column = self.board_column.saturating_sub(1);
                self.clamp_selection();
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.board_column + 1 < Status::ALL.len() {
                    self.board_column += 1;
                }
                self.clamp_selection();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.board_card = self.board_card.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.board_card += 1;
                self.clamp_selection();
            }
            KeyCode::Enter => self.open_highlighted(),
            _ => {}
        }
    }

    fn handle_calendar_input(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left => self.move_calendar_cursor(false, 1),
            KeyCode::Right => self.move_calendar_cursor(true, 1),
            KeyCode::Up => self.move_calendar_cursor(false, 7),
            KeyCode::Down => self.move_calendar_cursor(true, 7),
            KeyCode::Char('[') => self.set_calendar_cursor(prev_month(self.calendar_month)),
            KeyCode::Char(']') => self.set_calendar_cursor(next_month(self.calendar_month)),
            KeyCode::Char('t') => self.set_calendar_cursor(self.today),
            KeyCode::Char('j') => {
                if self.calendar_card + 1 < self.calendar_day_len() {
                    self.calendar_card += 1;
                }
            }
            KeyCode::Char('k') => self.calendar_card = self.calendar_card.saturating_sub(1),
            KeyCode::Enter => self.open_highlighted(),
            _ => {}
        }
    }

    fn handle_drawer_input(&mut self, code: KeyCode) {
        let Some(task) = self.store.selected_task() else {
            // Stale selection: the drawer shows nothing, so any key dismisses it.
            self.store.close_detail();
            return;
        };
        let id = task.id.clone();
        let status = task.status;

        if self.confirm_delete {
            self.confirm_delete = false;
            if matches!(code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                self.store.remove(&id);
                self.store.close_detail();
                self.clamp_selection();
                self.status_message = "Task deleted".to_string();
                info!(task_id = %id, "task deleted from dashboard");
            } else {
                self.status_message = "Delete cancelled".to_string();
            }
            return;
        }

        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.store.close_detail(),
            KeyCode::Left | KeyCode::Right => {
                let n = Status::ALL.len();
                let idx = status.column_index();
                let next = if code == KeyCode::Right { (idx + 1) % n } else { (idx + n - 1) % n };
                let new_status = Status::ALL[next];
                self.store.update_status(&id, new_status);
                self.clamp_selection();
                self.status_message = format!("Status set to {}", new_status.label());
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                self.confirm_delete = true;
                self.status_message = "Delete this task? (y/n)".to_string();
            }
            _ => {}
        }
    }

    fn handle_form_input(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => {
                self.form.reset();
                self.state = AppState::Dashboard;
            }
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.prev_field(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Left | KeyCode::Right => {
                let forward = code == KeyCode::Right;
                match self.form.current_input() {
                    Some(input) if forward => input.move_cursor_right(),
                    Some(input) => input.move_cursor_left(),
                    None => self.form.cycle(forward),
                }
            }
            KeyCode::Backspace => {
                if let Some(input) = self.form.current_input() {
                    input.handle_backspace();
                }
            }
            KeyCode::Delete => {
                if let Some(input) = self.form.current_input() {
                    input.handle_delete();
                }
            }
            KeyCode::Char(c) => match self.form.current_input() {
                Some(input) => input.handle_char(c),
                None if c == ' ' => self.form.cycle(true),
                None => {}
            },
            _ => {}
        }
        false
    }

    fn submit_form(&mut self) {
        if !self.form.can_submit() {
            self.status_message = "Title is required".to_string();
            return;
        }
        match self.form.build(&self.store, self.today) {
            Ok(task) => {
                let title = task.title.clone();
                if self.store.add(task) {
                    info!(%title, "task created from dashboard");
                    self.status_message = format!("Created \"{title}\"");
                    self.form.reset();
                    self.state = AppState::Dashboard;
                    self.clamp_selection();
                } else {
                    self.status_message = "A task with that id already exists".to_string();
                }
            }
            Err(msg) => self.status_message = msg,
        }
    }

    fn handle_chat_input(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => {
                self.chat.dismiss_toast();
                self.state = AppState::Dashboard;
            }
            KeyCode::Enter => self.send_chat(),
            KeyCode::Backspace => self.chat_input.handle_backspace(),
            KeyCode::Delete => self.chat_input.handle_delete(),
            KeyCode::Left => self.chat_input.move_cursor_left(),
            KeyCode::Right => self.chat_input.move_cursor_right(),
            KeyCode::Char(c) => self.chat_input.handle_char(c),
            _ => {}
        }
        false
    }

    /// Start a chat round-trip on a worker thread; the reply is picked up by
    /// `poll_chat`.
    fn send_chat(&mut self) {
        let Some(request) = self.chat.begin(&self.chat_input.value) else {
            return;
        };
        self.chat_input.clear();
        let (tx, rx) = mpsc::channel();
        let client = self.client.clone();
        thread::spawn(move || {
            let _ = tx.send(post_chat(&client, &request));
        });
        self.chat_rx = Some(rx);
    }

    /// Fold a finished chat round-trip, if any, into the session.
    pub fn poll_chat(&mut self) {
        let Some(rx) = &self.chat_rx else {
            return;
        };
        match rx.try_recv() {
            Ok(outcome) => {
                self.chat.finish(outcome);
                self.chat_rx = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.chat.abandon();
                self.chat_rx = None;
            }
        }
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(self.handle_key(key));
            }
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        let view = self.store.view_type();
        let selected = ViewType::ALL.iter().position(|v| *v == view).unwrap_or(0);
        let tabs = Tabs::new(ViewType::ALL.iter().map(|v| v.label()))
            .select(selected)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled("TaskFlow", Style::default().add_modifier(Modifier::BOLD))),
            )
            .highlight_style(Style::default().fg(EMERALD).add_modifier(Modifier::BOLD));
        f.render_widget(tabs, chunks[0]);

        let searching = self.focus == Focus::Search;
        let search_text = if self.search.value.is_empty() && !searching {
            Span::styled("Search tasks...  (/)", Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(self.search.value.as_str())
        };
        let border = if searching { EMERALD } else { Color::Gray };
        let search = Paragraph::new(Line::from(search_text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Search")
                .border_style(Style::default().fg(border)),
        );
        f.render_widget(search, chunks[1]);
        if searching {
            f.set_cursor_position((chunks[1].x + 1 + self.search.cursor as u16, chunks[1].y + 1));
        }
    }

    fn render_empty(&self, f: &mut Frame, area: Rect) {
        let message = Paragraph::new(empty_state_message(self.store.search_query()))
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(message, area);
    }

    fn render_list(&self, f: &mut Frame, area: Rect) {
        let tasks = list_view(&self.store);
        if tasks.is_empty() {
            self.render_empty(f, area);
            return;
        }

        let header_cells = ["Title", "Status", "Priority", "Due", "Project", "Assignee"]
            .map(|h| Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().bg(EMERALD).fg(Color::Black))
        .height(1);

        let rows: Vec<Row> = tasks
            .iter()
            .map(|t| {
                let mut title = t.title.clone();
                if !t.labels.is_empty() {
                    title.push_str(&format!(" [{}]", t.labels.join(",")));
                }
                let due_style = match t.due_date {
                    Some(d) if d < self.today && t.status != Status::Done => {
                        Style::default().fg(DARK_RED)
                    }
                    _ => Style::default(),
                };
                Row::new(vec![
                    Cell::from(title),
                    Cell::from(t.status.label()).style(Style::default().fg(status_color(t.status))),
                    Cell::from(t.priority.label())
                        .style(Style::default().fg(priority_color(t.priority))),
                    Cell::from(format_due_relative(t.due_date, self.today)).style(due_style),
                    Cell::from(project_cell(t)),
                    Cell::from(
                        t.assignee
                            .as_ref()
                            .map(|a| a.name.clone())
                            .unwrap_or_else(|| "-".into()),
                    ),
                ])
            })
            .collect();

        let widths = [
            Constraint::Min(24),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Length(18),
            Constraint::Length(14),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        let mut state = TableState::default().with_selected(Some(self.list_selected));
        f.render_stateful_widget(table, area, &mut state);
    }

    fn render_board(&self, f: &mut Frame, area: Rect) {
        let board = board_view(&self.store);
        if board.total() == 0 {
            self.render_empty(f, area);
            return;
        }

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(area);

        for ((status, tasks), column_area) in board.iter().zip(columns.iter()) {
            let focused = status == self.current_column();
            let items: Vec<ListItem> = if tasks.is_empty() {
                vec![ListItem::new(Span::styled(
                    "Drop tasks here",
                    Style::default().fg(Color::DarkGray),
                ))]
            } else {
                tasks
                    .iter()
                    .map(|t| {
                        let width = column_area.width.saturating_sub(4) as usize;
                        let mut meta = vec![Span::styled(
                            t.priority.label(),
                            Style::default().fg(priority_color(t.priority)),
                        )];
                        if t.due_date.is_some() {
                            let due = format_due_relative(t.due_date, self.today);
                            meta.push(Span::raw(format!("  {due}")));
                        }
                        if let Some(a) = &t.assignee {
                            meta.push(Span::raw(format!("  {}", a.avatar)));
                        }
                        ListItem::new(vec![
                            Line::from(Span::styled(
                                truncate(&t.title, width),
                                Style::default().add_modifier(Modifier::BOLD),
                            )),
                            Line::from(meta),
                            Line::from(""),
                        ])
                    })
                    .collect()
            };

            let border = if focused { EMERALD } else { status_color(status) };
            let list = List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!("{} ({})", status.label(), tasks.len()))
                        .border_style(Style::default().fg(border)),
                )
                .highlight_style(Style::default().bg(Color::DarkGray));

            let mut state = ListState::default();
            if focused && !tasks.is_empty() {
                state.select(Some(self.board_card));
            }
            f.render_stateful_widget(list, *column_area, &mut state);
        }
    }

    fn render_calendar(&self, f: &mut Frame, area: Rect) {
        let month = calendar_view(&self.store, self.calendar_month, self.today);
        let weeks: Vec<_> = month.weeks().collect();

        let mut constraints = vec![Constraint::Length(1), Constraint::Length(1)];
        constraints.extend(weeks.iter().map(|_| Constraint::Ratio(1, weeks.len() as u32)));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let title = Line::from(vec![
            Span::styled(
                month.month.format("%B %Y").to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled("   [ prev  ] next  t today", Style::default().fg(Color::DarkGray)),
        ]);
        f.render_widget(Paragraph::new(title).alignment(Alignment::Center), rows[0]);

        let day_columns = || {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(1, 7); 7])
        };
        let header_cells = day_columns().split(rows[1]);
        let weekdays = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
        for (name, cell) in weekdays.iter().zip(header_cells.iter()) {
            f.render_widget(
                Paragraph::new(*name)
                    .alignment(Alignment::Center)
                    .style(Style::default().add_modifier(Modifier::BOLD)),
                *cell,
            );
        }

        for (week, row) in weeks.iter().zip(rows.iter().skip(2)) {
            let cells = day_columns().split(*row);
            for (day, cell) in week.iter().zip(cells.iter()) {
                let width = cell.width.saturating_sub(2) as usize;
                let on_cursor = day.date == self.calendar_cursor;
                let mut lines: Vec<Line> = day
                    .tasks
                    .iter()
                    .enumerate()
                    .map(|(i, t)| {
                        let mut style = Style::default().fg(status_color(t.status));
                        if on_cursor && i == self.calendar_card {
                            style = style.add_modifier(Modifier::REVERSED);
                        }
                        Line::from(Span::styled(truncate(&t.title, width), style))
                    })
                    .collect();
                if day.overflow > 0 {
                    lines.push(Line::from(Span::styled(
                        format!("+{} more", day.overflow),
                        Style::default().fg(Color::DarkGray),
                    )));
                }

                let number_style = if day.is_today {
                    Style::default().fg(EMERALD).add_modifier(Modifier::BOLD)
                } else if day.in_month {
                    Style::default()
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                let border = if on_cursor {
                    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(Span::styled(day.date.format("%-d").to_string(), number_style));
                f.render_widget(Paragraph::new(lines).block(block), *cell);
            }
        }
    }

    fn render_drawer(&self, f: &mut Frame, area: Rect) {
        // A missing id renders no drawer at all.
        let Some(task) = self.store.selected_task() else {
            return;
        };
        let drawer = right_drawer(45, area);
        f.render_widget(Clear, drawer);

        let mut lines: Vec<Line> = vec![
            Line::from(Span::styled(
                task.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        lines.extend(
            render_detail(task, self.today)
                .lines()
                .map(|l| Line::from(l.to_string())),
        );
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "←/→ change status   d delete   Esc close",
            Style::default().fg(Color::DarkGray),
        )));

        let detail = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Task Details")
                    .border_style(Style::default().fg(EMERALD)),
            );
        f.render_widget(detail, drawer);
    }

    fn render_form(&self, f: &mut Frame, area: Rect) {
        let popup = centered_rect(60, 70, area);
        f.render_widget(Clear, popup);

        let fields: [(usize, &str, String); 7] = [
            (TITLE_FIELD, "Title", self.form.title.value.clone()),
            (DESCRIPTION_FIELD, "Description", self.form.description.value.clone()),
            (STATUS_FIELD, "Status", self.form.selected_status().label().to_string()),
            (PRIORITY_FIELD, "Priority", self.form.selected_priority().label().to_string()),
            (ASSIGNEE_FIELD, "Assignee", self.form.assignee_label()),
            (PROJECT_FIELD, "Project", self.form.project_label().to_string()),
            (DUE_FIELD, "Due date", self.form.due.value.clone()),
        ];

        let mut lines = Vec::new();
        for (field, label, value) in &fields {
            let current = self.form.current_field == *field;
            let label_style = if current {
                Style::default().fg(EMERALD).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let value = if self.form.is_text_field() || !current {
                value.clone()
            } else {
                format!("< {value} >")
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{label:<13}"), label_style),
                Span::raw(value),
            ]));
        }
        lines.push(Line::from(""));
        let submit_style = if self.form.can_submit() {
            Style::default().fg(EMERALD).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        lines.push(Line::from(vec![
            Span::styled("[Enter] Create task", submit_style),
            Span::styled(
                "   Tab next field  ←/→ change  Esc cancel",
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            "Due date: YYYY-MM-DD, today, tomorrow, in 3d, in 2w",
            Style::default().fg(Color::DarkGray),
        )));

        let form = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("New Task")
                .border_style(Style::default().fg(EMERALD)),
        );
        f.render_widget(form, popup);

        let cursor = match self.form.current_field {
            TITLE_FIELD => Some(self.form.title.cursor),
            DESCRIPTION_FIELD => Some(self.form.description.cursor),
            DUE_FIELD => Some(self.form.due.cursor),
            _ => None,
        };
        if let Some(cursor) = cursor {
            f.set_cursor_position((
                popup.x + 1 + 13 + cursor as u16,
                popup.y + 1 + self.form.current_field as u16,
            ));
        }
    }

    fn render_chat(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(area);

        let mut lines: Vec<Line> = Vec::new();
        for message in self.chat.messages() {
            let (who, color) = match message.role {
                Role::User => ("You", SKY),
                Role::Assistant => ("Assistant", EMERALD),
            };
            lines.push(Line::from(Span::styled(
                who,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            lines.extend(message.content.lines().map(|l| Line::from(l.to_string())));
            lines.push(Line::from(""));
        }
        if self.chat.is_loading() {
            lines.push(Line::from(Span::styled(
                "Assistant is thinking...",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }
        let visible = chunks[0].height.saturating_sub(2) as usize;
        let scroll = lines.len().saturating_sub(visible) as u16;
        let transcript = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .block(Block::default().borders(Borders::ALL).title("AI Assistant"));
        f.render_widget(transcript, chunks[0]);

        let input = Paragraph::new(self.chat_input.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Message (Enter to send, Esc to close)")
                .border_style(Style::default().fg(EMERALD)),
        );
        f.render_widget(input, chunks[1]);
        f.set_cursor_position((chunks[1].x + 1 + self.chat_input.cursor as u16, chunks[1].y + 1));
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let popup = centered_rect(60, 70, area);
        f.render_widget(Clear, popup);
        let bindings = [
            ("Tab / 1 2 3", "Switch between list, board and calendar"),
            ("/", "Search by title or description (Esc clears)"),
            ("↑/↓", "Move selection"),
            ("Enter", "Open task details"),
            ("←/→", "Board: change column; Calendar: change day"),
            ("Ctrl+←/→", "Board: move task to the neighbouring column"),
            ("[ ] t", "Calendar: previous/next month, today"),
            ("j/k", "Calendar: pick a task within the selected day"),
            ("n", "New task"),
            ("c", "Chat with the AI assistant"),
            ("q / Esc", "Quit"),
        ];
        let lines: Vec<Line> = bindings
            .iter()
            .map(|(key, what)| {
                Line::from(vec![
                    Span::styled(
                        format!("{key:<14}"),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(*what),
                ])
            })
            .collect();
        let help = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help (any key to close)"),
        );
        f.render_widget(help, popup);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let (text, bg) = if let Some(toast) = self.chat.toast() {
            (toast.to_string(), DARK_RED)
        } else if !self.status_message.is_empty() {
            (self.status_message.clone(), EMERALD)
        } else {
            let hint = match self.state {
                AppState::Dashboard if self.focus == Focus::Search => {
                    "Search: Enter to confirm, Esc to clear"
                }
                AppState::Dashboard => "n new  / search  Tab view  c chat  ? help  q quit",
                AppState::NewTask => "New Task",
                AppState::Chat => "Chat",
                AppState::Help => "Help",
            };
            (hint.to_string(), EMERALD)
        };
        let status = Paragraph::new(text)
            .style(Style::default().bg(bg).fg(Color::Black))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Draw the whole screen.
    pub fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.area());

        if self.state == AppState::Chat {
            let body = chunks[0].union(chunks[2]);
            self.render_chat(f, body);
            self.render_status_bar(f, chunks[3]);
            return;
        }

        self.render_header(f, chunks[0]);
        let count = Paragraph::new(task_count_line(self.store.visible_tasks().len()))
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(count, chunks[1]);

        match self.store.view_type() {
            ViewType::List => self.render_list(f, chunks[2]),
            ViewType::Board => self.render_board(f, chunks[2]),
            ViewType::Calendar => self.render_calendar(f, chunks[2]),
        }
        if self.store.is_detail_open() {
            self.render_drawer(f, chunks[2]);
        }

        match self.state {
            AppState::NewTask => self.render_form(f, chunks[2]),
            AppState::Help => self.render_help(f, chunks[2]),
            _ => {}
        }
        self.render_status_bar(f, chunks[3]);
    }

    /// Main event loop: draw, wait briefly for a key, pick up chat replies.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            self.poll_chat();
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

fn project_cell(task: &Task) -> String {
    task.project_id
        .as_deref()
        .map(|id| project_name(id).unwrap_or(id).to_string())
        .unwrap_or_else(|| "-".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::task::TaskPatch;
    use ratatui::backend::TestBackend;
    use std::time::Instant;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn app() -> App {
        App::new(TaskStore::with_seed(), ApiClient::new("http://127.0.0.1:9", None), today())
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!press(&mut app, KeyCode::Char('x')));
    }

    #[test]
    fn test_view_switching() {
        let mut app = app();
        assert_eq!(app.store.view_type(), ViewType::List);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.store.view_type(), ViewType::Board);
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.store.view_type(), ViewType::Calendar);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.store.view_type(), ViewType::List);
    }

    #[test]
    fn test_search_filters_live_and_esc_clears() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "API");
        assert_eq!(app.store.search_query(), "API");
        assert_eq!(app.store.visible_tasks().len(), 1);
        // 'q' goes to the search box, not quit.
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.store.search_query(), "APIq");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.store.search_query(), "");
        assert_eq!(app.store.visible_tasks().len(), 2);
    }

    #[test]
    fn test_list_enter_opens_drawer_and_status_cycles() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.selected_task_id(), Some("2"));

        press(&mut app, KeyCode::Right);
        assert_eq!(app.store.get("2").unwrap().status, Status::Done);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.store.get("2").unwrap().status, Status::Todo);

        press(&mut app, KeyCode::Esc);
        assert!(!app.store.is_detail_open());
        assert_eq!(app.state, AppState::Dashboard);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('n'));
        assert!(app.store.get("1").is_some());
        assert!(app.store.is_detail_open());

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.store.get("1").is_none());
        assert!(!app.store.is_detail_open());
        assert_eq!(app.store.len(), 1);
    }

    #[test]
    fn test_board_move_card_follows_task() {
        let mut app = app();
        press(&mut app, KeyCode::Char('2'));
        app.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::CONTROL));
        assert_eq!(app.store.get("1").unwrap().status, Status::InProgress);
        assert_eq!(app.current_column(), Status::InProgress);
        assert_eq!(app.highlighted_task_id().as_deref(), Some("1"));

        // No column to the right of Done.
        app.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::CONTROL));
        app.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::CONTROL));
        assert_eq!(app.store.get("1").unwrap().status, Status::Done);
        assert_eq!(app.current_column(), Status::Done);
    }

    #[test]
    fn test_new_task_form() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.state, AppState::NewTask);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::NewTask);
        assert_eq!(app.status_message, "Title is required");
        assert_eq!(app.store.len(), 2);

        type_text(&mut app, "Record demo");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::Dashboard);
        assert_eq!(app.store.len(), 3);
        let created = app.store.tasks().last().unwrap();
        assert_eq!(created.title, "Record demo");
        assert_eq!(created.status, Status::Todo);
    }

    #[test]
    fn test_calendar_navigation_and_open() {
        let mut store = TaskStore::with_seed();
        store.update(
            "1",
            TaskPatch {
                due_date: Some(Some(today())),
                ..Default::default()
            },
        );
        let mut app = App::new(store, ApiClient::new("http://127.0.0.1:9", None), today());
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.calendar_month, NaiveDate::from_ymd_opt(2026, 11, 1).unwrap());
        press(&mut app, KeyCode::Left);
        assert_eq!(app.calendar_month, NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        press(&mut app, KeyCode::Char('t'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.selected_task_id(), Some("1"));
    }

    #[test]
    fn test_calendar_opens_every_listed_task_of_a_day() {
        let due = TaskPatch {
            due_date: Some(Some(today())),
            ..Default::default()
        };
        let mut store = TaskStore::with_seed();
        store.update("1", due.clone());
        store.update("2", due);
        let mut app = App::new(store, ApiClient::new("http://127.0.0.1:9", None), today());
        press(&mut app, KeyCode::Char('3'));

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.selected_task_id(), Some("2"));
        press(&mut app, KeyCode::Esc);

        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.selected_task_id(), Some("1"));
        press(&mut app, KeyCode::Esc);

        // Moving to another day starts again from its first task.
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.selected_task_id(), Some("1"));
    }

    #[test]
    fn test_form_rejects_out_of_range_due_date() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Far future");
        for _ in 0..6 {
            press(&mut app, KeyCode::Tab);
        }
        type_text(&mut app, "in 99999999999999d");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::NewTask);
        assert!(app.status_message.starts_with("Unrecognised due date"));
        assert_eq!(app.store.len(), 2);
    }

    #[test]
    fn test_render_views() {
        let mut app = app();
        let list = screen(&app);
        assert!(list.contains("Design initial mockup"));
        assert!(list.contains("2 tasks in total"));
        assert!(list.contains("Platform Redesign"));

        press(&mut app, KeyCode::Char('2'));
        let board = screen(&app);
        assert!(board.contains("To Do (1)"));
        assert!(board.contains("In Progress (1)"));
        assert!(board.contains("Done (0)"));

        press(&mut app, KeyCode::Char('3'));
        assert!(screen(&app).contains("October 2026"));
    }

    #[test]
    fn test_render_empty_search_state() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "zzz");
        let text = screen(&app);
        assert!(text.contains("0 tasks in total"));
        assert!(text.contains("couldn't find any tasks"));
    }

    #[test]
    fn test_stale_selection_renders_no_drawer() {
        let mut store = TaskStore::with_seed();
        store.open_detail("99");
        let mut app = App::new(store, ApiClient::new("http://127.0.0.1:9", None), today());
        assert!(!screen(&app).contains("Task Details"));
        press(&mut app, KeyCode::Enter);
        assert!(!app.store.is_detail_open());
    }

    #[test]
    fn test_chat_failure_surfaces_toast() {
        let mut app = app();
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.state, AppState::Chat);
        press(&mut app, KeyCode::Enter);
        assert!(!app.chat.is_loading());

        type_text(&mut app, "hello");
        press(&mut app, KeyCode::Enter);
        assert!(app.chat.is_loading());

        let deadline = Instant::now() + Duration::from_secs(20);
        while app.chat.is_loading() && Instant::now() < deadline {
            app.poll_chat();
            thread::sleep(Duration::from_millis(20));
        }
        assert!(!app.chat.is_loading());
        assert_eq!(app.chat.toast(), Some(crate::chat::ERROR_TOAST));
        assert!(screen(&app).contains(crate::chat::ERROR_TOAST));
    }
}
