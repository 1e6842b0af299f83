use std::{io, thread};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use serde_json::Value;
use simshell_core::{AppConfig, Catalog, Controller, Location, Outcome, Selection, Session};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const DEFAULT_TITLE: &str = "SimShell";
const METERS: [(&str, &str, &str); 5] = [
    ("⚡", "Energy", "energy"),
    ("💧", "Water", "water"),
    ("💵", "Money", "money"),
    ("⚠️", "Risk", "risk"),
    ("⭐", "Reputation", "reputation"),
];

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    selection_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            selection_fg: Color::White,
        }
    }
}

/// Terminal input the event loop reacts to.
enum AppEvent {
    Key(KeyEvent),
    Resize,
}

/// Key bindings resolved against the current location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Up,
    Down,
    First,
    Last,
    Activate,
    Jump(usize),
    Back,
    Quit,
}

fn command_for(key: &KeyEvent, location: Location) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Command::Quit),
            _ => None,
        };
    }
    let at_root = location == Location::AtRoot;
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Command::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Command::Down),
        KeyCode::Home => Some(Command::First),
        KeyCode::End => Some(Command::Last),
        KeyCode::Enter => Some(Command::Activate),
        KeyCode::Char(ch @ '1'..='9') => ch
            .to_digit(10)
            .map(|digit| Command::Jump(digit as usize - 1)),
        KeyCode::Backspace | KeyCode::Left if !at_root => Some(Command::Back),
        KeyCode::Esc if !at_root => Some(Command::Back),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') if at_root => Some(Command::Quit),
        _ => None,
    }
}

/// Terminal frontend driving a [`Controller`].
pub struct SimShellApp<'m> {
    config: AppConfig,
    catalog: Catalog,
    controller: Controller<'m>,
    state: UiState,
    theme: Theme,
}

impl<'m> SimShellApp<'m> {
    pub fn new(config: AppConfig, catalog: Catalog, controller: Controller<'m>) -> Self {
        Self {
            config,
            catalog,
            controller,
            state: UiState::default(),
            theme: Theme::default(),
        }
    }

    /// Show `message` in the info panel before the first frame.
    pub fn notify(&mut self, message: impl Into<String>) {
        self.controller.notify(message);
    }

    /// Run the UI until a quit request ([`Outcome::Exit`]) or until terminal
    /// input ends ([`Outcome::Continue`]).
    pub async fn run(&mut self) -> Result<Outcome> {
        self.state
            .set_status(session_status(&self.catalog, self.controller.session()));

        let mut guard = TerminalGuard::enter()?;
        let result = self.event_loop(guard.terminal_mut()).await;
        guard.leave()?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<Outcome> {
        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        forward_input(event_tx).context("failed to start input thread")?;

        let outcome = loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break Outcome::Exit;
            }
            match event_rx.recv().await {
                Some(AppEvent::Key(key)) => self.handle_key(key),
                Some(AppEvent::Resize) => {}
                None => {
                    warn!("Terminal input closed");
                    break Outcome::Continue;
                }
            }
        };
        info!(?outcome, "Session ended");
        Ok(outcome)
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let location = self.controller.state().location;
        let Some(command) = command_for(&key, location) else {
            return;
        };
        let total = self.controller.view().options.len();
        match command {
            Command::Up => self.state.move_cursor(-1, total),
            Command::Down => self.state.move_cursor(1, total),
            Command::First => self.state.cursor = 0,
            Command::Last => self.state.cursor = total.saturating_sub(1),
            Command::Activate => self.activate(self.state.cursor),
            Command::Jump(index) if index < total => {
                self.state.cursor = index;
                self.activate(index);
            }
            Command::Jump(_) => {}
            Command::Back => {
                let outcome = self.controller.select(Selection::Back);
                self.apply(outcome, location);
            }
            Command::Quit => {
                let outcome = self.controller.shutdown(self.config.autosave_on_quit);
                self.apply(outcome, location);
            }
        }
    }

    fn activate(&mut self, index: usize) {
        let location = self.controller.state().location;
        let outcome = self.controller.select_index(index);
        self.apply(outcome, location);
    }

    fn apply(&mut self, outcome: Outcome, previous: Location) {
        if self.controller.state().location != previous {
            debug!(from = ?previous, to = ?self.controller.state().location, "Location changed");
            self.state.cursor = 0;
        }
        if outcome == Outcome::Exit {
            self.state.should_quit = true;
        }
    }

    fn title(&self) -> &str {
        self.catalog
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_TITLE)
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(4)])
            .split(area);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[0]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(METERS.len() as u16 + 2),
            ])
            .split(columns[1]);

        self.render_info(frame, columns[0]);
        self.render_selector(frame, right[0]);
        self.render_resources(frame, right[1]);
        self.render_status(frame, rows[1]);
    }

    fn render_info(&self, frame: &mut Frame, area: Rect) {
        let view = self.controller.view();
        let lines: Vec<Line> = view.info.lines().map(Line::from).collect();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                self.title().to_string(),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_selector(&mut self, frame: &mut Frame, area: Rect) {
        let view = self.controller.view();
        self.state.clamp_cursor(view.options.len());

        let items: Vec<ListItem> = view
            .options
            .iter()
            .enumerate()
            .map(|(idx, option)| {
                let style = if option.selection == Selection::Back {
                    Style::default().fg(self.theme.muted)
                } else {
                    Style::default().fg(self.theme.primary_fg)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{} ", idx + 1), Style::default().fg(self.theme.muted)),
                    Span::styled(option.label.clone(), style),
                ]))
            })
            .collect();

        let mut list_state = ListState::default();
        if !view.options.is_empty() {
            list_state.select(Some(self.state.cursor));
        }
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(view.title))
            .highlight_style(
                Style::default()
                    .bg(self.theme.selection_bg)
                    .fg(self.theme.selection_fg)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_resources(&self, frame: &mut Frame, area: Rect) {
        let session = self.controller.session();
        let lines: Vec<Line> = METERS
            .iter()
            .map(|(icon, label, key)| {
                let value = session
                    .progress(key)
                    .map(|value| match value {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    })
                    .unwrap_or_else(|| "0".to_string());
                Line::from(format!("{icon} {label}: {value}"))
            })
            .collect();
        let paragraph =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Resources"));
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let hint = match self.controller.state().location {
            Location::AtRoot => "↑/↓ move • Enter select • 1-9 jump • q quit",
            Location::InSubmenu(_) => "↑/↓ move • Enter select • 1-9 jump • Backspace back",
        };
        let paragraph = Paragraph::new(vec![
            Line::from(self.state.status.clone()),
            Line::from(Span::styled(hint, Style::default().fg(self.theme.muted))),
        ])
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

/// Raw mode plus alternate screen, undone on [`TerminalGuard::leave`] or drop.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    active: bool,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enter raw mode")?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err).context("failed to enter alternate screen");
        }
        let mut guard = Self {
            terminal: Terminal::new(CrosstermBackend::new(stdout))
                .context("failed to create terminal")?,
            active: true,
        };
        guard.terminal.hide_cursor()?;
        guard.terminal.clear()?;
        Ok(guard)
    }

    fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<io::Stdout>> {
        &mut self.terminal
    }

    fn leave(mut self) -> Result<()> {
        self.active = false;
        self.restore()
    }

    fn restore(&mut self) -> Result<()> {
        self.terminal.show_cursor()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .context("failed to leave alternate screen")?;
        disable_raw_mode().context("failed to disable raw mode")
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = self.restore();
        }
    }
}

/// Forward key presses and resizes until the receiver is dropped or reading fails.
fn forward_input(sender: mpsc::Sender<AppEvent>) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("input".into())
        .spawn(move || {
            while let Ok(event) = event::read() {
                let forwarded = match event {
                    Event::Key(key) => AppEvent::Key(key),
                    Event::Resize(..) => AppEvent::Resize,
                    _ => continue,
                };
                if sender.blocking_send(forwarded).is_err() {
                    break;
                }
            }
        })
}

/// Status line shown when the UI opens.
fn session_status(catalog: &Catalog, session: &Session) -> String {
    let started = session
        .document()
        .created_at_utc()
        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "Loaded {} data keys • save: {} • started {started}",
        catalog.len(),
        session.store().path().display()
    )
}

struct UiState {
    cursor: usize,
    status: String,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            cursor: 0,
            status: "Ready".to_string(),
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn move_cursor(&mut self, delta: isize, total: usize) {
        if total == 0 {
            self.cursor = 0;
            return;
        }
        let idx = (self.cursor as isize + delta).clamp(0, total as isize - 1);
        self.cursor = idx as usize;
    }

    fn clamp_cursor(&mut self, total: usize) {
        if self.cursor >= total {
            self.cursor = total.saturating_sub(1);
        }
    }
}
