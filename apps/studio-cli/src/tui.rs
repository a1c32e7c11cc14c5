//! Terminal User Interface for the interactive studio.
//!
//! Provides a ratatui-based TUI with one tab per department. Users pick or
//! create a project, run the active department, add manager notes for the
//! writer, send scripts back and export the final screenplay.

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use std::io;
use studio_core::{ProjectSummary, Session, Stage, Studio, StudioError};

/// Application state for the studio TUI
struct StudioApp {
    /// Projects shown in the side list, newest first
    projects: Vec<ProjectSummary>,

    /// Index of the highlighted project
    selected: usize,

    /// The open project, if any
    session: Option<Session>,

    /// Stage tab being viewed
    view: Stage,

    /// Current input mode
    mode: InputMode,

    /// Text being typed into the input line
    input: String,

    /// Manager notes handed to the writer on the next pass
    notes: String,

    /// Raw editor response from the last malformed review
    raw_response: Option<String>,

    /// Status message
    status: Status,

    /// Whether the app should exit
    should_quit: bool,
}

/// Input modes for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    /// Keys are commands
    Normal,

    /// Typing a new project idea
    Idea,

    /// Typing manager notes
    Notes,

    /// Help screen
    Help,
}

/// Status line severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Status {
    kind: StatusKind,
    text: String,
}

impl Status {
    fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Warning,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

/// Work requested by a key press, carried out against the studio
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Create a project from an idea
    Create(String),
    /// Open a project by id
    Open(i64),
    /// Run the primary action of the active stage
    Primary,
    /// Send the script back to the writer
    SendBack,
    /// Export the script
    Export,
}

const HINTS: &str = "r run  n new  m notes  b send back  e export  Enter open  Tab view  h help  q quit";

impl StudioApp {
    /// Creates a new studio app
    fn new(projects: Vec<ProjectSummary>) -> Self {
        Self {
            projects,
            selected: 0,
            session: None,
            view: Stage::Research,
            mode: InputMode::Normal,
            input: String::new(),
            notes: String::new(),
            raw_response: None,
            status: Status::info(HINTS),
            should_quit: false,
        }
    }

    /// Handle keyboard input
    fn handle_input(&mut self, key: KeyCode) -> Option<Command> {
        match self.mode {
            InputMode::Normal => self.handle_normal(key),
            InputMode::Idea | InputMode::Notes => self.handle_text(key),
            InputMode::Help => {
                if matches!(key, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h')) {
                    self.mode = InputMode::Normal;
                    self.status = Status::info(HINTS);
                }
                None
            }
        }
    }

    fn handle_normal(&mut self, key: KeyCode) -> Option<Command> {
        match key {
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Char('h') | KeyCode::Char('?') => {
                self.mode = InputMode::Help;
                self.status = Status::info("Viewing help - press 'q' to go back");
                None
            }
            KeyCode::Char('n') => {
                self.mode = InputMode::Idea;
                self.input.clear();
                self.status = Status::info("Type the story idea, Enter to create, Esc to cancel");
                None
            }
            KeyCode::Char('m') => {
                self.mode = InputMode::Notes;
                self.input = self.notes.clone();
                self.status = Status::info("Type manager notes, Enter to keep, Esc to cancel");
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.projects.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Enter => self.projects.get(self.selected).map(|p| Command::Open(p.id)),
            KeyCode::Tab | KeyCode::Right => {
                self.view = Stage::ALL[(self.view.index() + 1) % Stage::ALL.len()];
                None
            }
            KeyCode::BackTab | KeyCode::Left => {
                let len = Stage::ALL.len();
                self.view = Stage::ALL[(self.view.index() + len - 1) % len];
                None
            }
            KeyCode::Char('r') => Some(Command::Primary),
            KeyCode::Char('b') => Some(Command::SendBack),
            KeyCode::Char('e') => Some(Command::Export),
            _ => None,
        }
    }

    fn handle_text(&mut self, key: KeyCode) -> Option<Command> {
        match key {
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                self.input.clear();
                self.status = Status::info(HINTS);
                None
            }
            KeyCode::Backspace => {
                self.input.pop();
                None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                None
            }
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.input);
                let mode = std::mem::replace(&mut self.mode, InputMode::Normal);
                if mode == InputMode::Notes {
                    self.notes = text;
                    self.status = Status::info("Manager notes saved for the next writing pass");
                    return None;
                }
                Some(Command::Create(text))
            }
            _ => None,
        }
    }

    /// Text shown while a command runs
    fn busy_text(&self, command: &Command) -> String {
        match command {
            Command::Create(_) => "Creating project...".to_string(),
            Command::Open(id) => format!("Opening project {}...", id),
            Command::Primary => match &self.session {
                Some(session) => format!("{} at work...", session.stage.label()),
                None => "Working...".to_string(),
            },
            Command::SendBack => "Sending back to the writer...".to_string(),
            Command::Export => "Exporting...".to_string(),
        }
    }

    /// Makes `session` the open project. Notes and the unparsed editor
    /// response belong to one project and are dropped on a switch.
    fn switch_to(&mut self, session: Session) {
        let previous = self.session.as_ref().map(|s| s.project.id);
        if previous != Some(session.project.id) {
            self.notes.clear();
            self.raw_response = None;
        }
        self.session = Some(session);
    }

    /// Shows an error on the status line, as a warning when nothing was
    /// attempted.
    fn report(&mut self, err: &StudioError) {
        self.raw_response = err.raw_response().map(str::to_string);
        self.status = if err.is_warning() {
            Status::warning(format!("Warning: {}", err))
        } else {
            Status::error(format!("Error: {}", err))
        };
    }
}

/// Carries out a command against the studio and updates the app.
async fn execute_command(studio: &Studio, app: &mut StudioApp, command: Command) {
    let result = match command {
        Command::Create(idea) => match studio.start_project(&idea) {
            Ok(session) => {
                let id = session.project.id;
                app.view = session.stage;
                app.switch_to(session);
                refresh_projects(studio, app);
                app.selected = app.projects.iter().position(|p| p.id == id).unwrap_or(0);
                Ok(format!("Created project {}", id))
            }
            Err(e) => Err(e),
        },
        Command::Open(id) => match studio.open_project(id) {
            Ok(session) => {
                let message = format!("Opened project {} in {}", id, session.stage);
                app.switch_to(session);
                Ok(message)
            }
            Err(e) => Err(e),
        },
        Command::Primary => match app.session.as_mut() {
            Some(session) => run_primary(studio, session, &app.notes).await,
            None => Err(StudioError::MissingPrerequisite("open project")),
        },
        Command::SendBack => match app.session.as_mut() {
            Some(session) => studio
                .send_back(session)
                .map(|_| "Sent back to the writer's room".to_string()),
            None => Err(StudioError::MissingPrerequisite("open project")),
        },
        Command::Export => match app.session.as_ref() {
            Some(session) => studio
                .export_script(session, None)
                .map(|path| format!("Exported script to {}", path.display())),
            None => Err(StudioError::MissingPrerequisite("open project")),
        },
    };

    match result {
        Ok(message) => {
            if let Some(session) = &app.session {
                app.view = session.stage;
            }
            app.raw_response = None;
            app.status = Status::info(message);
        }
        Err(err) => {
            tracing::warn!(error = %err, "studio action failed");
            app.report(&err);
        }
    }
}

async fn run_primary(
    studio: &Studio,
    session: &mut Session,
    notes: &str,
) -> studio_core::Result<String> {
    match session.stage {
        Stage::Research => studio
            .run_research(session)
            .await
            .map(|_| "Research brief ready".to_string()),
        Stage::Drafting => studio
            .write_script(session, notes)
            .await
            .map(|_| "Draft ready for the editor".to_string()),
        Stage::Review => studio.run_review(session).await.map(|verdict| {
            if verdict.approved {
                format!("Approved with {}/10", verdict.score)
            } else {
                format!("Scored {}/10, not approved", verdict.score)
            }
        }),
        Stage::Production => studio
            .generate_storyboard(session)
            .await
            .map(|_| "Storyboards ready".to_string()),
    }
}

fn refresh_projects(studio: &Studio, app: &mut StudioApp) {
    match studio.list_projects() {
        Ok(projects) => {
            app.projects = projects;
            if app.selected >= app.projects.len() {
                app.selected = app.projects.len().saturating_sub(1);
            }
        }
        Err(err) => app.report(&err),
    }
}

/// Run the interactive studio TUI
pub async fn run_studio_tui(studio: &Studio, project: Option<i64>) -> Result<()> {
    let projects = studio.list_projects().context("Failed to list projects")?;
    let mut app = StudioApp::new(projects);
    if let Some(warning) = studio.init_warning() {
        app.status = Status::error(format!("Agents unavailable: {}", warning));
    }
    if let Some(id) = project {
        app.selected = app.projects.iter().position(|p| p.id == id).unwrap_or(0);
        execute_command(studio, &mut app, Command::Open(id)).await;
    }

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Run the event loop
    let result = run_app(&mut terminal, studio, &mut app).await;

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Run the main application loop
async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    studio: &Studio,
    app: &mut StudioApp,
) -> Result<()> {
    loop {
        terminal
            .draw(|f| ui(f, app))
            .map_err(|e| anyhow::anyhow!("Failed to draw UI: {}", e))?;

        // Poll for events with timeout
        if event::poll(std::time::Duration::from_millis(100)).context("Failed to poll events")?
            && let Event::Key(key) = event::read().context("Failed to read event")?
        {
            // Only process key press events (not release)
            if key.kind == KeyEventKind::Press
                && let Some(command) = app.handle_input(key.code)
            {
                // Input stays blocked until the command finishes
                app.status = Status::info(app.busy_text(&command));
                terminal
                    .draw(|f| ui(f, app))
                    .map_err(|e| anyhow::anyhow!("Failed to draw UI: {}", e))?;
                execute_command(studio, app, command).await;
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Render the UI
fn ui(frame: &mut Frame, app: &StudioApp) {
    let editing = matches!(app.mode, InputMode::Idea | InputMode::Notes);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                           // Title
            Constraint::Length(3),                           // Stage tabs
            Constraint::Min(10),                             // Content
            Constraint::Length(if editing { 3 } else { 0 }), // Input line
            Constraint::Length(3),                           // Status bar
        ])
        .split(frame.area());

    render_title(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);

    if app.mode == InputMode::Help {
        render_help_view(frame, chunks[2]);
    } else {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(chunks[2]);
        render_projects(frame, app, body[0]);
        render_stage_view(frame, app, body[1]);
    }

    if editing {
        let title = if app.mode == InputMode::Idea {
            "New Idea"
        } else {
            "Manager Notes"
        };
        let input = Paragraph::new(app.input.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(input, chunks[3]);
    }

    // Render status bar
    let color = match app.status.kind {
        StatusKind::Info => Color::Green,
        StatusKind::Warning => Color::Yellow,
        StatusKind::Error => Color::Red,
    };
    let status = Paragraph::new(app.status.text.as_str())
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(status, chunks[4]);
}

fn render_title(frame: &mut Frame, app: &StudioApp, area: Rect) {
    let mut spans = vec![Span::styled(
        "Story Studio",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(session) = &app.session {
        spans.push(Span::raw(" - "));
        spans.push(Span::styled(
            session.project.name.as_str(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!("  [{}]", session.stage)));
    }
    let title = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

fn render_tabs(frame: &mut Frame, app: &StudioApp, area: Rect) {
    let active = app.session.as_ref().map(|s| s.stage);
    let titles: Vec<Line> = Stage::ALL
        .iter()
        .map(|stage| {
            if Some(*stage) == active {
                Line::from(format!("* {}", stage.label()))
            } else {
                Line::from(stage.label())
            }
        })
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.view.index())
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL).title("Departments"));
    frame.render_widget(tabs, area);
}

fn render_projects(frame: &mut Frame, app: &StudioApp, area: Rect) {
    let items: Vec<ListItem> = app
        .projects
        .iter()
        .map(|p| ListItem::new(format!("{}. {}", p.id, p.name)))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Projects"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(if app.projects.is_empty() {
        None
    } else {
        Some(app.selected)
    });
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the viewed department
fn render_stage_view(frame: &mut Frame, app: &StudioApp, area: Rect) {
    let Some(session) = &app.session else {
        let empty = Paragraph::new("Press 'n' to start a project or Enter to open one.")
            .block(Block::default().borders(Borders::ALL).title(app.view.label()))
            .wrap(Wrap { trim: false });
        frame.render_widget(empty, area);
        return;
    };

    let project = &session.project;
    let mut lines: Vec<Line> = Vec::new();
    match app.view {
        Stage::Research => {
            push_section(&mut lines, "Idea", &project.original_idea);
            push_section(&mut lines, "Research Brief", &project.research_brief);
        }
        Stage::Drafting => {
            push_section(&mut lines, "Research Brief", &project.research_brief);
            push_section(&mut lines, "Editor Feedback", &project.editor_feedback);
            push_section(&mut lines, "Manager Notes", &app.notes);
        }
        Stage::Review => {
            push_section(&mut lines, "Script", &project.script_content);
            if project.has_been_reviewed() {
                let verdict = format!(
                    "Score: {}/10   Approved: {}   Reviews: {}",
                    project.editor_score,
                    if project.is_approved { "yes" } else { "no" },
                    project.review_count
                );
                push_section(&mut lines, "Verdict", &verdict);
                push_section(&mut lines, "Critique", &project.editor_feedback);
            }
            if session.can_send_back() {
                lines.push(Line::from(Span::styled(
                    "Press 'b' to send the script back to the writer.",
                    Style::default().fg(Color::Yellow),
                )));
            }
            if let Some(raw) = &app.raw_response {
                push_section(&mut lines, "Unparsed Editor Response", raw);
            }
        }
        Stage::Production => {
            push_section(&mut lines, "Storyboard", &project.storyboard_output);
        }
    }
    if lines.is_empty() {
        lines.push(Line::from("Nothing here yet."));
    }

    let content = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(app.view.label()))
        .wrap(Wrap { trim: false });
    frame.render_widget(content, area);
}

fn push_section(lines: &mut Vec<Line<'static>>, title: &str, body: &str) {
    if body.is_empty() {
        return;
    }
    lines.push(Line::from(Span::styled(
        title.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.extend(body.lines().map(|line| Line::from(line.to_string())));
    lines.push(Line::from(""));
}

/// Render the help view
fn render_help_view(frame: &mut Frame, area: Rect) {
    let help_text = Text::from(vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts:",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("  r          - Run the active department"),
        Line::from("  n          - Start a new project from an idea"),
        Line::from("  m          - Edit manager notes for the writer"),
        Line::from("  b          - Send an unapproved script back to the writer"),
        Line::from("  e          - Export the script to screenplay_final.txt"),
        Line::from("  Up/Down    - Select a project"),
        Line::from("  Enter      - Open the selected project"),
        Line::from("  Tab/Left/Right - Switch department view"),
        Line::from("  h          - Show this help screen"),
        Line::from("  q          - Quit the TUI"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Departments:",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("  1. Research Dept  - turns the idea into a brief"),
        Line::from("  2. Writer's Room  - writes the screenplay"),
        Line::from("  3. Editor's Desk  - scores and approves or critiques"),
        Line::from("  4. Art Dept       - draws storyboards for the approved script"),
    ]);

    let help = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: false });
    frame.render_widget(help, area);
}
