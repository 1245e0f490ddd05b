use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use klarity_core::{
    ghosts_added_message, Assistant, Board, Priority, TagTone, Task, TaskStatus, User,
    GHOST_SCAN_CONTEXT,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::collections::HashSet;
use std::io::{self, Stdout};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use crate::ai_worker::{self, AiEvent, AiRequest};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Speaker {
    User,
    Klarity,
}

#[derive(Clone, Debug)]
struct Msg {
    speaker: Speaker,
    content: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Mode {
    Board,
    Adding(String),
    Prompt(String),
}

/// Board screen state. Terminal-free so key handling can be tested.
pub struct App {
    board: Board,
    user: User,
    today: NaiveDate,
    lane: usize,
    row: usize,
    mode: Mode,
    transcript: Vec<Msg>,
    pending: HashSet<u64>,
    next_request: u64,
    outbox: Vec<AiRequest>,
    quit: bool,
}

impl App {
    pub fn new(board: Board, user: User, today: NaiveDate) -> Self {
        Self {
            board,
            user,
            today,
            lane: 0,
            row: 0,
            mode: Mode::Board,
            transcript: vec![Msg {
                speaker: Speaker::Klarity,
                content: "Press / to ask Klarity, g to scan for ghost tasks, b for your morning brief.".to_string(),
            }],
            pending: HashSet::new(),
            next_request: 0,
            outbox: Vec::new(),
            quit: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn is_thinking(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Requests queued since the last call.
    pub fn take_requests(&mut self) -> Vec<AiRequest> {
        std::mem::take(&mut self.outbox)
    }

    fn lane_status(&self) -> TaskStatus {
        TaskStatus::LANES[self.lane]
    }

    fn cursor_task_id(&self) -> Option<String> {
        self.board
            .lane(self.lane_status())
            .get(self.row)
            .map(|t| t.id.clone())
    }

    fn clamp_row(&mut self) {
        let len = self.board.lane(self.lane_status()).len();
        self.row = self.row.min(len.saturating_sub(1));
    }

    /// Put the cursor on `id` wherever it now sits.
    fn follow(&mut self, id: &str) {
        if let Some(task) = self.board.get(id) {
            self.lane = task.status.lane_index();
            self.row = self
                .board
                .lane(task.status)
                .iter()
                .position(|t| t.id == id)
                .unwrap_or(0);
        }
    }

    fn enqueue(&mut self, make: impl FnOnce(u64) -> AiRequest) {
        self.next_request += 1;
        let id = self.next_request;
        self.pending.insert(id);
        self.outbox.push(make(id));
    }

    fn say(&mut self, speaker: Speaker, content: impl Into<String>) {
        self.transcript.push(Msg {
            speaker,
            content: content.into(),
        });
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match self.mode.clone() {
            Mode::Board => self.handle_board_key(code),
            Mode::Adding(mut buf) => match code {
                KeyCode::Esc => self.mode = Mode::Board,
                KeyCode::Enter => {
                    let status = self.lane_status();
                    if let Some(id) = self.board.create_task(status, &buf, self.today, Some(self.user.id.clone())) {
                        self.follow(&id);
                    }
                    self.mode = Mode::Board;
                }
                KeyCode::Backspace => {
                    buf.pop();
                    self.mode = Mode::Adding(buf);
                }
                KeyCode::Char(c) => {
                    buf.push(c);
                    self.mode = Mode::Adding(buf);
                }
                _ => {}
            },
            Mode::Prompt(mut buf) => match code {
                KeyCode::Esc => self.mode = Mode::Board,
                KeyCode::Enter => {
                    let message = buf.trim().to_string();
                    if !message.is_empty() {
                        self.say(Speaker::User, message.clone());
                        let tasks = self.board.tasks().to_vec();
                        let user = self.user.clone();
                        self.enqueue(|request_id| AiRequest::Chat { request_id, message, tasks, user });
                    }
                    self.mode = Mode::Board;
                }
                KeyCode::Backspace => {
                    buf.pop();
                    self.mode = Mode::Prompt(buf);
                }
                KeyCode::Char(c) => {
                    buf.push(c);
                    self.mode = Mode::Prompt(buf);
                }
                _ => {}
            },
        }
    }

    fn handle_board_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Left | KeyCode::Char('h') => {
                self.lane = self.lane.saturating_sub(1);
                self.clamp_row();
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.lane = (self.lane + 1).min(TaskStatus::LANES.len() - 1);
                self.clamp_row();
            }
            KeyCode::Up | KeyCode::Char('k') => self.row = self.row.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                self.row += 1;
                self.clamp_row();
            }
            // Drag the task one lane over.
            KeyCode::Char('<') | KeyCode::Char('>') => {
                let Some(id) = self.cursor_task_id() else { return };
                let target = if code == KeyCode::Char('<') {
                    self.lane.checked_sub(1)
                } else {
                    Some(self.lane + 1).filter(|l| *l < TaskStatus::LANES.len())
                };
                if let Some(target) = target {
                    self.board.move_task(&id, TaskStatus::LANES[target]);
                    self.follow(&id);
                }
            }
            KeyCode::Char(' ') => {
                if let Some(id) = self.cursor_task_id() {
                    self.board.advance(&id);
                    self.follow(&id);
                }
            }
            KeyCode::Enter => match (self.board.selected().map(|t| t.id.clone()), self.cursor_task_id()) {
                (Some(open), Some(cur)) if open == cur => self.board.close_detail(),
                (_, Some(cur)) => {
                    self.board.select(&cur);
                }
                _ => {}
            },
            KeyCode::Esc => self.board.close_detail(),
            KeyCode::Char('a') => self.mode = Mode::Adding(String::new()),
            KeyCode::Char('/') => self.mode = Mode::Prompt(String::new()),
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.cursor_task_id() {
                    self.board.delete_task(&id);
                    self.clamp_row();
                }
            }
            KeyCode::Char('y') => {
                if let Some(id) = self.cursor_task_id() {
                    self.board.promote_ghost(&id);
                    self.follow(&id);
                }
            }
            KeyCode::Char('n') => {
                if let Some(id) = self.cursor_task_id() {
                    if self.board.get(&id).is_some_and(Task::is_ghost) {
                        self.board.dismiss_ghost(&id);
                        self.clamp_row();
                    }
                }
            }
            KeyCode::Char('g') => {
                self.say(Speaker::User, "Scan for ghost tasks");
                self.enqueue(|request_id| AiRequest::GhostScan {
                    request_id,
                    context: GHOST_SCAN_CONTEXT.to_string(),
                });
            }
            KeyCode::Char('b') => {
                let tasks = self.board.tasks().to_vec();
                let user = self.user.clone();
                self.enqueue(|request_id| AiRequest::Brief { request_id, tasks, user });
            }
            KeyCode::Char('p') => {
                let next = match self.board.filter().priority {
                    None => Some(Priority::Low),
                    Some(Priority::Critical) => None,
                    Some(p) => Priority::ALL.iter().copied().find(|q| *q > p),
                };
                self.board.set_priority_filter(next);
                self.clamp_row();
            }
            KeyCode::Char('m') => {
                let mine = match self.board.filter().assignee {
                    Some(_) => None,
                    None => Some(self.user.id.clone()),
                };
                self.board.set_assignee_filter(mine);
                self.clamp_row();
            }
            KeyCode::Char('c') => {
                self.board.clear_filters();
                self.clamp_row();
            }
            _ => {}
        }
    }

    pub fn apply_event(&mut self, ev: AiEvent) {
        let request_id = ev.request_id();
        match ev {
            AiEvent::Started { .. } => return,
            AiEvent::Reply { text, .. } => self.say(Speaker::Klarity, text),
            AiEvent::Ghosts { drafts, .. } => {
                let ids = self
                    .board
                    .add_ghost_tasks(drafts, Some(self.user.id.clone()), self.today);
                info!(count = ids.len(), "ghost tasks added");
                self.say(Speaker::Klarity, ghosts_added_message(ids.len()));
                self.clamp_row();
            }
            AiEvent::Brief { brief, .. } => {
                let text = format!(
                    "{} {} {}",
                    brief.headline, brief.tasks.narrative, brief.tasks.count_label
                );
                self.say(Speaker::Klarity, text);
            }
        }
        self.pending.remove(&request_id);
    }
}

pub fn run_board(app: App, assistant: Arc<Assistant>) -> Result<()> {
    let (req_tx, req_rx) = mpsc::unbounded_channel();
    let (ev_tx, ev_rx) = std::sync::mpsc::channel();
    tokio::spawn(ai_worker::run_worker(assistant, req_rx, ev_tx));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = board_loop(&mut terminal, app, &req_tx, &ev_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn board_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut app: App,
    req_tx: &mpsc::UnboundedSender<AiRequest>,
    ev_rx: &std::sync::mpsc::Receiver<AiEvent>,
) -> Result<()> {
    loop {
        while let Ok(ev) = ev_rx.try_recv() {
            app.apply_event(ev);
        }

        terminal.draw(|f| draw(f, &app))?;

        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                app.handle_key(key.code);
            }
        }

        for req in app.take_requests() {
            // Worker gone means the runtime is shutting down.
            if req_tx.send(req).is_err() {
                return Ok(());
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}

fn tone_color(tone: Option<TagTone>) -> Color {
    match tone {
        Some(TagTone::Bug) => Color::Red,
        Some(TagTone::Feature) => Color::Blue,
        Some(TagTone::Design) => Color::Magenta,
        _ => Color::Gray,
    }
}

fn task_line(task: &Task, today: NaiveDate, focused: bool) -> Line<'static> {
    let mut spans = Vec::new();
    if task.is_ghost() {
        let pct = task.ai_confidence().map(|c| (c.value() * 100.0).round() as u32).unwrap_or(0);
        spans.push(Span::styled(
            format!("✦ {}% ", pct),
            Style::default().fg(Color::Magenta),
        ));
    }
    match task.priority {
        Priority::Critical => spans.push(Span::styled("!! ", Style::default().fg(Color::Red))),
        Priority::High => spans.push(Span::styled("! ", Style::default().fg(Color::Yellow))),
        _ => {}
    }

    let mut title_style = if task.is_ghost() {
        Style::default().fg(Color::Magenta).add_modifier(Modifier::ITALIC)
    } else {
        Style::default()
    };
    if focused {
        title_style = title_style.add_modifier(Modifier::REVERSED);
    }
    spans.push(Span::styled(task.title.clone(), title_style));

    if let Some(tag) = task.tags.first() {
        spans.push(Span::styled(
            format!(" [{}]", tag),
            Style::default().fg(tone_color(task.badge_tone())),
        ));
    }
    let due_style = if task.is_overdue(today) {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    spans.push(Span::styled(format!(" {}", task.due_date.format("%b %d")), due_style));
    Line::from(spans)
}

fn draw(f: &mut Frame, app: &App) {
    let size = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(8),
            Constraint::Length(3),
        ])
        .split(size);

    draw_header(f, app, chunks[0]);
    draw_lanes(f, app, chunks[1]);
    draw_bottom(f, app, chunks[2]);
    draw_input(f, app, chunks[3]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let filter = app.board.filter();
    let mut spans = vec![Span::styled(
        "Klarity",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::raw(format!("  {}  ", app.user.name)));
    if let Some(p) = filter.priority {
        spans.push(Span::styled(format!("priority:{} ", p.as_str().to_lowercase()), Style::default().fg(Color::Cyan)));
    }
    if filter.assignee.is_some() {
        spans.push(Span::styled("mine ", Style::default().fg(Color::Cyan)));
    }
    if app.is_thinking() {
        spans.push(Span::styled("thinking…", Style::default().fg(Color::Magenta)));
    }
    let header = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_lanes(f: &mut Frame, app: &App, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);
    let counts = app.board.lane_counts();

    for (i, status) in TaskStatus::LANES.iter().enumerate() {
        let focused_lane = i == app.lane;
        let lines: Vec<Line> = app
            .board
            .lane(*status)
            .iter()
            .enumerate()
            .map(|(row, t)| task_line(t, app.today, focused_lane && row == app.row))
            .collect();

        let border = if focused_lane {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!("{} ({})", status.label(), counts[i]));
        f.render_widget(Paragraph::new(Text::from(lines)).block(block).wrap(Wrap { trim: true }), cols[i]);
    }
}

fn draw_bottom(f: &mut Frame, app: &App, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let detail = match app.board.selected() {
        Some(t) => {
            let mut lines = vec![
                Line::from(Span::styled(t.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
                Line::raw(format!(
                    "{} · {} · due {}",
                    t.status.label(),
                    t.priority.as_str().to_lowercase(),
                    t.due_date
                )),
                Line::raw(format!("tags: {}", t.tags.join(", "))),
                Line::raw(format!(
                    "subtasks: {}% of {} · activity: {}",
                    t.progress_percent(),
                    t.subtasks.len(),
                    t.activities().len()
                )),
            ];
            if let Some(d) = &t.description {
                lines.push(Line::raw(d.clone()));
            }
            if t.is_ghost() {
                lines.push(Line::from(Span::styled(
                    "AI suggestion: y accept · n dismiss",
                    Style::default().fg(Color::Magenta),
                )));
            }
            Text::from(lines)
        }
        None => Text::from(vec![
            Line::styled("Enter open · space advance · < > move · a add · d delete", Style::default().fg(Color::Gray)),
            Line::styled("p priority · m mine · c clear filters · q quit", Style::default().fg(Color::Gray)),
        ]),
    };
    f.render_widget(
        Paragraph::new(detail)
            .block(Block::default().borders(Borders::ALL).title("task"))
            .wrap(Wrap { trim: false }),
        cols[0],
    );

    let visible = (area.height as usize).saturating_sub(2);
    let start = app.transcript.len().saturating_sub(visible);
    let lines: Vec<Line> = app.transcript[start..]
        .iter()
        .map(|m| {
            let (tag, color) = match m.speaker {
                Speaker::User => ("you", Color::Cyan),
                Speaker::Klarity => ("klarity", Color::Magenta),
            };
            Line::from(vec![
                Span::styled(format!("{}: ", tag), Style::default().fg(color)),
                Span::raw(m.content.clone()),
            ])
        })
        .collect();
    f.render_widget(
        Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL).title("assistant"))
            .wrap(Wrap { trim: false }),
        cols[1],
    );
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let (title, text) = match &app.mode {
        Mode::Board => ("keys", "/ ask · g ghost scan · b brief".to_string()),
        Mode::Adding(buf) => ("new task", buf.clone()),
        Mode::Prompt(buf) => ("message", buf.clone()),
    };
    let input = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(Color::White));
    f.render_widget(input, area);
}
