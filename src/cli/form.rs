use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    prelude::CrosstermBackend,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::cell::Cell;
use std::io;

use crate::chat::{ChatSession, TurnOutcome, MISSING_CREDENTIAL_MESSAGE};
use crate::core::model::{self, ModelId, MODELS};

// ─── Colors ──────────────────────────────────────────

const BG: Color = Color::Rgb(15, 15, 25);
const SURFACE: Color = Color::Rgb(30, 30, 45);
const BORDER: Color = Color::Rgb(50, 50, 70);
const TEXT: Color = Color::Rgb(210, 210, 225);
const DIM: Color = Color::Rgb(90, 90, 110);
const ACCENT: Color = Color::Rgb(140, 80, 255);
const GREEN: Color = Color::Rgb(80, 200, 120);
const YELLOW: Color = Color::Rgb(230, 190, 60);
const CYAN: Color = Color::Rgb(80, 200, 220);
const RED: Color = Color::Rgb(230, 80, 80);

const HISTORY_PAGE: u16 = 5;

// ─── State ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    ApiKey,
    Model,
    Message,
    Send,
    Export,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Self::ApiKey => Self::Model,
            Self::Model => Self::Message,
            Self::Message => Self::Send,
            Self::Send => Self::Export,
            Self::Export => Self::ApiKey,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::ApiKey => Self::Export,
            Self::Model => Self::ApiKey,
            Self::Message => Self::Model,
            Self::Send => Self::Message,
            Self::Export => Self::Send,
        }
    }
}

/// Single-line text input with a byte-offset cursor on char boundaries.
#[derive(Debug, Default)]
struct InputField {
    text: String,
    cursor: usize,
}

impl InputField {
    fn with_text(text: String) -> Self {
        let cursor = text.len();
        Self { text, cursor }
    }

    fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.text[..self.cursor]
                .chars()
                .last()
                .map(|c| c.len_utf8())
                .unwrap_or(1);
            self.cursor -= prev;
            self.text.remove(self.cursor);
        }
    }

    fn left(&mut self) {
        if self.cursor > 0 {
            let prev = self.text[..self.cursor]
                .chars()
                .last()
                .map(|c| c.len_utf8())
                .unwrap_or(1);
            self.cursor -= prev;
        }
    }

    fn right(&mut self) {
        if self.cursor < self.text.len() {
            let next = self.text[self.cursor..]
                .chars()
                .next()
                .map(|c| c.len_utf8())
                .unwrap_or(1);
            self.cursor += next;
        }
    }

    fn home(&mut self) {
        self.cursor = 0;
    }

    fn end(&mut self) {
        self.cursor = self.text.len();
    }

    fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn cursor_column(&self) -> u16 {
        self.text[..self.cursor].chars().count() as u16
    }
}

struct FormState {
    api_key: InputField,
    show_key: bool,
    model_idx: usize,
    message: InputField,
    focus: Focus,
    reply: String,
    reply_failed: bool,
    history: String,
    export_path: Option<String>,
    status: Option<(String, bool)>,
    history_scroll: u16,
    history_max_scroll: Cell<u16>,
}

impl FormState {
    fn new(session: &ChatSession, api_key: Option<String>, model: &ModelId) -> Self {
        let focus = if api_key.is_some() {
            Focus::Message
        } else {
            Focus::ApiKey
        };
        let status = if model::get_model(model).is_none() {
            let fallback = model::default_model();
            Some((
                format!("Model '{model}' is not in the list, using {}", fallback.id),
                true,
            ))
        } else {
            None
        };
        Self {
            api_key: InputField::with_text(api_key.unwrap_or_default()),
            show_key: false,
            model_idx: model::position(model),
            message: InputField::default(),
            focus,
            reply: String::new(),
            reply_failed: false,
            history: session.formatted_history(),
            export_path: None,
            status,
            history_scroll: 0,
            history_max_scroll: Cell::new(0),
        }
    }

    fn model_id(&self) -> ModelId {
        MODELS[self.model_idx].model_id()
    }

    fn cycle_model(&mut self, forward: bool) {
        let n = MODELS.len();
        self.model_idx = if forward {
            (self.model_idx + 1) % n
        } else {
            (self.model_idx + n - 1) % n
        };
    }

    fn current_scroll(&self) -> u16 {
        self.history_scroll.min(self.history_max_scroll.get())
    }

    fn input_mut(&mut self) -> Option<&mut InputField> {
        match self.focus {
            Focus::ApiKey => Some(&mut self.api_key),
            Focus::Message => Some(&mut self.message),
            _ => None,
        }
    }
}

// ─── Entry ───────────────────────────────────────────

/// Full-screen form: key and model fields, a message box, Send and Export
/// buttons, the latest reply and the whole transcript.
pub async fn run(
    mut session: ChatSession,
    api_key: Option<String>,
    preset_model: Option<ModelId>,
) -> Result<()> {
    let model = super::initial_model(session.config(), preset_model);
    let mut state = FormState::new(&session, api_key, &model);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = form_loop(&mut terminal, &mut session, &mut state).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn form_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &mut ChatSession,
    state: &mut FormState,
) -> Result<()> {
    loop {
        terminal.draw(|f| form_ui(f, state))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Esc, _) => {
                return Ok(());
            }
            (KeyCode::Char('v'), KeyModifiers::CONTROL) => {
                state.show_key = !state.show_key;
            }
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => {
                submit(terminal, session, state).await?;
            }
            (KeyCode::Char('x'), KeyModifiers::CONTROL) => {
                export(session, state);
            }
            (KeyCode::Tab, _) => state.focus = state.focus.next(),
            (KeyCode::BackTab, _) => state.focus = state.focus.prev(),
            (KeyCode::PageUp, _) => {
                state.history_scroll = state.current_scroll().saturating_sub(HISTORY_PAGE);
            }
            (KeyCode::PageDown, _) => {
                state.history_scroll = state
                    .current_scroll()
                    .saturating_add(HISTORY_PAGE)
                    .min(state.history_max_scroll.get());
            }
            (KeyCode::Enter, _) => match state.focus {
                Focus::Message | Focus::Send => submit(terminal, session, state).await?,
                Focus::Export => export(session, state),
                Focus::Model => state.cycle_model(true),
                Focus::ApiKey => state.focus = Focus::Message,
            },
            (KeyCode::Left, _) if state.focus == Focus::Model => state.cycle_model(false),
            (KeyCode::Right, _) if state.focus == Focus::Model => state.cycle_model(true),
            (code, modifiers) => {
                let Some(field) = state.input_mut() else {
                    continue;
                };
                match (code, modifiers) {
                    (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => field.insert(c),
                    (KeyCode::Backspace, _) => field.backspace(),
                    (KeyCode::Left, _) => field.left(),
                    (KeyCode::Right, _) => field.right(),
                    (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => field.home(),
                    (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => field.end(),
                    _ => {}
                }
                if state.focus == Focus::ApiKey {
                    state.status = None;
                }
            }
        }
    }
}

async fn submit(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &mut ChatSession,
    state: &mut FormState,
) -> Result<()> {
    state.status = Some(("Waiting for reply...".into(), false));
    terminal.draw(|f| form_ui(f, state))?;

    let api_key = state.api_key.text.trim().to_string();
    let model = state.model_id();
    let message = state.message.text.clone();
    state.export_path = None;

    match session.submit(Some(api_key.as_str()), &model, &message).await {
        TurnOutcome::MissingCredential => {
            state.reply = MISSING_CREDENTIAL_MESSAGE.to_string();
            state.reply_failed = true;
            state.status = Some((MISSING_CREDENTIAL_MESSAGE.to_string(), true));
            state.focus = Focus::ApiKey;
        }
        TurnOutcome::Completed(turn) => {
            state.reply = session
                .transcript()
                .last_reply()
                .unwrap_or_default()
                .to_string();
            state.reply_failed = turn.is_error();
            state.status = if turn.is_error() {
                Some(("Request failed".into(), true))
            } else {
                None
            };
            state.history = turn.history;
            state.history_scroll = u16::MAX;
            state.message.clear();
            state.focus = Focus::Message;
        }
    }
    Ok(())
}

fn export(session: &ChatSession, state: &mut FormState) {
    match session.export() {
        Ok(path) => {
            state.export_path = Some(path.display().to_string());
            state.status = None;
        }
        Err(e) => {
            tracing::warn!(error = %e, "export failed");
            state.status = Some((format!("Export failed: {e}"), true));
        }
    }
}

// ─── Rendering ───────────────────────────────────────

fn field_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused { ACCENT } else { BORDER };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
}

/// Stars with the last four characters visible. Keys of eight characters
/// or fewer are hidden entirely.
fn masked(key: &str) -> String {
    let len = key.chars().count();
    let visible = if len > 8 { 4 } else { 0 };
    let tail: String = key.chars().skip(len - visible).collect();
    format!("{}{}", "*".repeat(len - visible), tail)
}

fn form_ui(f: &mut Frame, state: &FormState) {
    let area = f.area();
    f.render_widget(
        Paragraph::new("").style(Style::default().bg(BG).fg(TEXT)),
        area,
    );

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(3), // API key + model
            Constraint::Length(3), // Message
            Constraint::Length(1), // Buttons
            Constraint::Length(8), // Reply
            Constraint::Min(5),    // History
            Constraint::Length(1), // Status / export
            Constraint::Length(1), // Hints
        ])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            " Prompt Creator",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(DIM),
        ),
    ]));
    f.render_widget(title, rows[0]);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    // API key
    let key_text = if state.show_key {
        state.api_key.text.clone()
    } else {
        masked(&state.api_key.text)
    };
    let key_input = Paragraph::new(key_text.as_str())
        .style(Style::default().fg(TEXT).bg(SURFACE))
        .block(field_block("API Key", state.focus == Focus::ApiKey));
    f.render_widget(key_input, top[0]);

    // Model selector
    let choice = &MODELS[state.model_idx];
    let model_line = Line::from(vec![
        Span::styled("\u{25c2} ", Style::default().fg(DIM)),
        Span::styled(choice.name, Style::default().fg(YELLOW)),
        Span::styled(format!("  ({})", choice.id), Style::default().fg(DIM)),
        Span::styled(" \u{25b8}", Style::default().fg(DIM)),
    ]);
    f.render_widget(
        Paragraph::new(model_line)
            .style(Style::default().bg(SURFACE))
            .block(field_block("Model", state.focus == Focus::Model)),
        top[1],
    );

    // Message
    f.render_widget(
        Paragraph::new(state.message.text.as_str())
            .style(Style::default().fg(TEXT).bg(SURFACE))
            .block(field_block("Message", state.focus == Focus::Message)),
        rows[2],
    );

    // Buttons
    let button = |label: &'static str, focused: bool| {
        let style = if focused {
            Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(100, 60, 200))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        };
        Span::styled(label, style)
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(" "),
            button("[ Send ]", state.focus == Focus::Send),
            Span::raw("  "),
            button("[ Export History ]", state.focus == Focus::Export),
        ])),
        rows[3],
    );

    // Latest reply
    let reply_style = if state.reply_failed {
        Style::default().fg(RED)
    } else {
        Style::default().fg(TEXT)
    };
    f.render_widget(
        Paragraph::new(state.reply.as_str())
            .style(reply_style)
            .wrap(Wrap { trim: false })
            .block(field_block("Reply", false)),
        rows[4],
    );

    // History
    let history = Paragraph::new(state.history.as_str())
        .style(Style::default().fg(TEXT))
        .wrap(Wrap { trim: false })
        .block(field_block("Chat History", false));
    let rendered_rows = u16::try_from(history.line_count(rows[5].width)).unwrap_or(u16::MAX);
    state
        .history_max_scroll
        .set(rendered_rows.saturating_sub(rows[5].height));
    f.render_widget(history.scroll((state.current_scroll(), 0)), rows[5]);

    // Status / export path
    let status = match (&state.status, &state.export_path) {
        (Some((msg, true)), _) => Line::from(Span::styled(
            format!(" \u{26a0} {msg}"),
            Style::default().fg(RED),
        )),
        (Some((msg, false)), _) => Line::from(Span::styled(
            format!(" {msg}"),
            Style::default().fg(YELLOW),
        )),
        (None, Some(path)) => Line::from(vec![
            Span::styled(" \u{2713} Saved ", Style::default().fg(GREEN)),
            Span::styled(path.as_str(), Style::default().fg(TEXT)),
        ]),
        (None, None) => Line::from(""),
    };
    f.render_widget(Paragraph::new(status), rows[6]);

    // Hints
    let hint = |k: &'static str, d: &'static str| {
        [
            Span::styled(k, Style::default().fg(CYAN)),
            Span::styled(d, Style::default().fg(DIM)),
        ]
    };
    let mut spans = Vec::new();
    for (k, d) in [
        (" Tab", ": next field  "),
        ("Ctrl+S", ": send  "),
        ("Ctrl+X", ": export  "),
        ("Ctrl+V", ": show key  "),
        ("PgUp/PgDn", ": scroll  "),
        ("Esc", ": quit"),
    ] {
        spans.extend(hint(k, d));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), rows[7]);

    // Cursor
    let (field, rect) = match state.focus {
        Focus::ApiKey => (&state.api_key, top[0]),
        Focus::Message => (&state.message, rows[2]),
        _ => return,
    };
    let cursor_x = rect.x + 1 + field.cursor_column();
    f.set_cursor_position((
        cursor_x.min(rect.x + rect.width.saturating_sub(2)),
        rect.y + 1,
    ));
}
