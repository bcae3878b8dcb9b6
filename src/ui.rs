use crate::history::{CommandHistory, complete};
use crate::portfolio::Portfolio;
use crate::protocol::StreamEvent;
use crate::session::ConversationSession;
use crate::tools::{ParamKind, list_tools};
use crate::ui_state::{UiState, UiStateStore};
use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, size};
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};
use ratatui::{Frame, Terminal, TerminalOptions, Viewport};
use std::io;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};

type TuiTerminal = Terminal<CrosstermBackend<io::Stdout>>;
type UiResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const INPUT_HEIGHT: u16 = 6;
const GREETING: &str = "Neural interface online. I have root access to this page. \
    Try 'Deploy a demo agent' or press Tab for suggestions.";

// Restores terminal settings even if the loop exits early.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Self {
        Self
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = io::stdout().flush();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessage {
    User(String),
    Agent(String),
    ToolUse {
        name: String,
        input: String,
    },
    ToolResult {
        content: String,
        is_error: bool,
    },
    Overlay(String),
    Info(String),
}

#[derive(Debug, Clone)]
struct LineSpec {
    text: String,
    style: Style,
}

impl LineSpec {
    fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

fn labelled(header: &str, body: &str, color: Color) -> Vec<LineSpec> {
    let header_style = Style::default().fg(color).add_modifier(Modifier::BOLD);
    let body_style = Style::default().fg(color);
    let mut lines = vec![LineSpec::new(header, header_style)];
    for line in body.lines() {
        lines.push(LineSpec::new(format!("  {}", line), body_style));
    }
    lines
}

impl ChatMessage {
    fn line_specs(&self) -> Vec<LineSpec> {
        match self {
            ChatMessage::User(msg) => labelled("You:", msg, Color::Blue),
            ChatMessage::Agent(msg) => labelled("Agent:", msg, Color::Yellow),
            ChatMessage::ToolUse { name, input } => {
                let header_style = Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD);
                let input_str = Self::truncate(input, 200, "...");
                vec![LineSpec::new(
                    format!("tool: {}({})", name, input_str),
                    header_style,
                )]
            }
            ChatMessage::ToolResult { content, is_error } => {
                let style = if *is_error {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default().fg(Color::Cyan)
                };
                let content_str = Self::truncate(content, 300, "...");
                vec![LineSpec::new(format!("→ {}", content_str), style)]
            }
            ChatMessage::Overlay(line) => vec![LineSpec::new(
                format!("  │ {}", line),
                Style::default().fg(Color::Green),
            )],
            ChatMessage::Info(msg) => msg
                .lines()
                .map(|line| {
                    LineSpec::new(
                        format!("ℹ {}", line),
                        Style::default()
                            .fg(Color::Gray)
                            .add_modifier(Modifier::ITALIC),
                    )
                })
                .collect(),
        }
    }

    fn to_text(&self) -> Text<'static> {
        let lines = self
            .line_specs()
            .into_iter()
            .map(|spec| Line::from(Span::styled(spec.text, spec.style)))
            .collect::<Vec<_>>();
        Text::from(lines)
    }

    fn rendered_height(&self, width: u16) -> u16 {
        let width = width.max(1) as usize;
        let total: usize = self
            .line_specs()
            .iter()
            .map(|spec| spec.text.chars().count().max(1).div_ceil(width))
            .sum();
        total as u16
    }

    fn truncate(value: &str, max: usize, suffix: &str) -> String {
        match value.char_indices().nth(max) {
            Some((end, _)) => format!("{}{}", &value[..end], suffix),
            None => value.to_string(),
        }
    }
}

impl From<StreamEvent> for ChatMessage {
    fn from(event: StreamEvent) -> Self {
        match event {
            StreamEvent::User { text } => ChatMessage::User(text),
            StreamEvent::ToolCall { name, input } => ChatMessage::ToolUse {
                name,
                input: serde_json::to_string(&input).unwrap_or_default(),
            },
            StreamEvent::ToolResult { content, is_error } => {
                ChatMessage::ToolResult { content, is_error }
            }
            StreamEvent::Reply { text } => ChatMessage::Agent(text),
        }
    }
}

#[derive(Debug)]
pub enum UiEvent {
    Session(StreamEvent),
    /// The submitted message is done, with the rejection reason if the
    /// session refused it.
    Settled(Option<String>),
    /// The session event stream skipped this many events.
    Missed(u64),
}

/// Turns successive store snapshots into chat lines about the overlay:
/// when it opens, changes status, logs, and closes.
#[derive(Debug, Default)]
struct OverlayFeed {
    id: Option<u64>,
    label: Option<String>,
    printed: usize,
}

impl OverlayFeed {
    fn update(&mut self, state: &UiState) -> Vec<ChatMessage> {
        let mut out = Vec::new();
        let current = state.overlay.as_ref();

        if current.map(|o| o.id) != self.id {
            if let Some(label) = self.label.take() {
                out.push(ChatMessage::Info(format!("{} closed", label)));
            }
            if let Some(overlay) = current {
                out.push(ChatMessage::Info(format!("[{}]", overlay.kind.label())));
            }
            self.id = current.map(|o| o.id);
            self.label = current.map(|o| o.kind.label());
            self.printed = 0;
        }

        if let Some(overlay) = current {
            for line in overlay.log.iter().skip(self.printed) {
                out.push(ChatMessage::Overlay(line.clone()));
            }
            self.printed = overlay.log.len();

            let label = overlay.kind.label();
            if self.label.as_deref() != Some(label.as_str()) {
                out.push(ChatMessage::Info(format!("[{}]", label)));
                self.label = Some(label);
            }
        }

        out
    }
}

struct InputBuffer {
    lines: Vec<String>,
    cursor_x: usize,
    cursor_y: usize,
}

// Byte offset of the `chars`-th character.
fn byte_index(line: &str, chars: usize) -> usize {
    line.char_indices()
        .nth(chars)
        .map_or(line.len(), |(index, _)| index)
}

impl InputBuffer {
    fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    fn clear(&mut self) {
        self.lines = vec![String::new()];
        self.cursor_x = 0;
        self.cursor_y = 0;
    }

    /// Replaces the content and puts the cursor at the end.
    fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        self.cursor_y = self.lines.len() - 1;
        self.cursor_x = self.line_len(self.cursor_y);
    }

    fn line_len(&self, y: usize) -> usize {
        self.lines[y].chars().count()
    }

    fn insert_char(&mut self, c: char) {
        let line = &mut self.lines[self.cursor_y];
        let at = byte_index(line, self.cursor_x);
        line.insert(at, c);
        self.cursor_x += 1;
    }

    fn delete_char(&mut self) {
        if self.cursor_x > 0 {
            let line = &mut self.lines[self.cursor_y];
            let at = byte_index(line, self.cursor_x - 1);
            line.remove(at);
            self.cursor_x -= 1;
        } else if self.cursor_y > 0 {
            let prev_line = self.lines.remove(self.cursor_y);
            self.cursor_y -= 1;
            self.cursor_x = self.line_len(self.cursor_y);
            self.lines[self.cursor_y].push_str(&prev_line);
        }
    }

    fn new_line(&mut self) {
        let line = &self.lines[self.cursor_y];
        let remaining: String = line.chars().skip(self.cursor_x).collect();
        self.lines[self.cursor_y] = line.chars().take(self.cursor_x).collect();
        self.lines.insert(self.cursor_y + 1, remaining);
        self.cursor_y += 1;
        self.cursor_x = 0;
    }

    fn move_left(&mut self) {
        if self.cursor_x > 0 {
            self.cursor_x -= 1;
        } else if self.cursor_y > 0 {
            self.cursor_y -= 1;
            self.cursor_x = self.line_len(self.cursor_y);
        }
    }

    fn move_right(&mut self) {
        if self.cursor_x < self.line_len(self.cursor_y) {
            self.cursor_x += 1;
        } else if !self.on_last_line() {
            self.cursor_y += 1;
            self.cursor_x = 0;
        }
    }

    fn move_up(&mut self) {
        if self.cursor_y > 0 {
            self.cursor_y -= 1;
            self.cursor_x = self.cursor_x.min(self.line_len(self.cursor_y));
        }
    }

    fn move_down(&mut self) {
        if !self.on_last_line() {
            self.cursor_y += 1;
            self.cursor_x = self.cursor_x.min(self.line_len(self.cursor_y));
        }
    }

    fn on_first_line(&self) -> bool {
        self.cursor_y == 0
    }

    fn on_last_line(&self) -> bool {
        self.cursor_y + 1 >= self.lines.len()
    }

    fn to_string(&self) -> String {
        self.lines.join("\n")
    }

    fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.is_empty())
    }

    fn render(&self) -> Text<'static> {
        if self.is_empty() {
            return Text::from(Span::styled(
                "Type a command...",
                Style::default().fg(Color::DarkGray),
            ));
        }
        Text::from(
            self.lines
                .iter()
                .map(|l| Line::from(l.clone()))
                .collect::<Vec<_>>(),
        )
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// `#rrggbb` or `#rgb` to a terminal color.
fn parse_hex_color(value: &str) -> Option<Color> {
    let hex = value.trim().strip_prefix('#').filter(|hex| hex.is_ascii())?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(Color::Rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => {
            let mut rgb = hex.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
            Some(Color::Rgb(rgb.next()??, rgb.next()??, rgb.next()??))
        }
        _ => None,
    }
}

fn tool_listing() -> String {
    let mut out = String::from("Available tools:");
    for tool in list_tools() {
        let params = tool
            .parameters()
            .into_iter()
            .map(|param| {
                let kind = match &param.kind {
                    ParamKind::String => "string".to_string(),
                    ParamKind::Number => "number".to_string(),
                    ParamKind::Boolean => "boolean".to_string(),
                    ParamKind::Enum(values) => values.join("|"),
                };
                let optional = if param.required { "" } else { "?" };
                format!("{}{}: {}", param.name, optional, kind)
            })
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("\n  {}({})", tool.name, params));
    }
    out
}

pub struct App {
    owner: String,
    input: InputBuffer,
    history: CommandHistory,
    should_quit: bool,
    sender: mpsc::Sender<UiEvent>,
    receiver: mpsc::Receiver<UiEvent>,
    pending: bool,
    session: Arc<ConversationSession>,
    store: UiStateStore,
    state: watch::Receiver<UiState>,
    overlay_feed: OverlayFeed,
}

impl App {
    pub fn new(portfolio: &Portfolio) -> Self {
        let (sender, receiver) = mpsc::channel(100);
        forward_session_events(portfolio.session().subscribe(), sender.clone());

        Self {
            owner: portfolio.owner().to_string(),
            input: InputBuffer::new(),
            history: CommandHistory::new(),
            should_quit: false,
            sender,
            receiver,
            pending: false,
            session: Arc::clone(portfolio.session()),
            store: portfolio.store().clone(),
            state: portfolio.store().subscribe(),
            overlay_feed: OverlayFeed::default(),
        }
    }

    fn draw(&mut self, f: &mut Frame) {
        let area = f.area();
        let (border, title) = {
            let state = self.state.borrow();
            let border = parse_hex_color(&state.theme.primary_color).unwrap_or(Color::DarkGray);
            let mut title = format!(
                " {}'s portfolio [{}]",
                self.owner,
                state.theme.layout.as_str()
            );
            if let Some(overlay) = &state.overlay {
                title.push_str(&format!(" [{}]", overlay.kind.label()));
            }
            let esc = if state.overlay.is_some() { "close" } else { "quit" };
            title.push_str(&format!(" Enter send, Tab complete, Esc {} ", esc));
            if self.pending {
                title.push_str("[Thinking...] ");
            }
            (border, title)
        };

        let input_paragraph = Paragraph::new(self.input.render())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(border)),
            )
            .wrap(Wrap { trim: false });

        f.render_widget(input_paragraph, area);

        let cursor_x = (self.input.cursor_x + 1) as u16;
        let cursor_y = self.input.cursor_y as u16;
        let x = (area.x + cursor_x).min(area.x + area.width - 2);
        let y = (area.y + 1 + cursor_y).min(area.y + area.height - 2);
        f.set_cursor_position((x, y));
    }

    fn append_message(&mut self, terminal: &mut TuiTerminal, message: ChatMessage) -> UiResult<()> {
        let width = terminal.size()?.width;
        let height = message.rendered_height(width).saturating_add(1);
        let mut text = message.to_text();
        text.extend(Text::raw("\n"));
        // Insert above the inline viewport so the log stays in scrollback.
        terminal.insert_before(height, |buf| {
            let paragraph = Paragraph::new(text).wrap(Wrap { trim: false });
            paragraph.render(buf.area, buf);
        })?;
        Ok(())
    }

    fn sync_state(&mut self, terminal: &mut TuiTerminal) -> UiResult<()> {
        if !self.state.has_changed().unwrap_or(false) {
            return Ok(());
        }
        let state = self.state.borrow_and_update().clone();
        for message in self.overlay_feed.update(&state) {
            self.append_message(terminal, message)?;
        }
        Ok(())
    }

    fn submit(&mut self, terminal: &mut TuiTerminal) -> UiResult<()> {
        let msg = self.input.to_string();
        if msg.trim().is_empty() {
            return Ok(());
        }

        if msg.trim() == "/tools" {
            self.history.record(msg);
            self.input.clear();
            return self.append_message(terminal, ChatMessage::Info(tool_listing()));
        }

        if self.pending || self.session.is_busy() {
            return self.append_message(
                terminal,
                ChatMessage::Info("Still working on the previous command.".to_string()),
            );
        }

        self.history.record(msg.clone());
        self.input.clear();
        self.dispatch(msg);
        Ok(())
    }

    fn dispatch(&mut self, msg: String) {
        self.pending = true;
        let session = Arc::clone(&self.session);
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let rejection = session.send_user_message(&msg).await.err();
            let _ = sender
                .send(UiEvent::Settled(rejection.map(|e| e.to_string())))
                .await;
        });
    }

    /// Applies one event to the app and returns the chat line it produces.
    /// Only `Settled` ends the wait, since session events can be skipped.
    fn apply(&mut self, event: UiEvent) -> Option<ChatMessage> {
        match event {
            UiEvent::Session(event) => Some(event.into()),
            UiEvent::Settled(rejection) => {
                self.pending = false;
                rejection.map(|reason| ChatMessage::Info(format!("Rejected: {}", reason)))
            }
            UiEvent::Missed(count) => Some(ChatMessage::Info(format!(
                "Display fell behind; {} session events were skipped.",
                count
            ))),
        }
    }

    fn handle_events(&mut self, terminal: &mut TuiTerminal) -> UiResult<bool> {
        while let Ok(event) = self.receiver.try_recv() {
            if let Some(message) = self.apply(event) {
                self.append_message(terminal, message)?;
            }
        }

        self.sync_state(terminal)?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
                {
                    self.should_quit = true;
                    return Ok(false);
                }

                match key.code {
                    KeyCode::Esc => {
                        if !self.store.close_overlay() {
                            self.should_quit = true;
                            return Ok(false);
                        }
                    }
                    KeyCode::Enter => {
                        if key.modifiers.contains(KeyModifiers::SHIFT) {
                            self.input.new_line();
                        } else {
                            self.submit(terminal)?;
                        }
                    }
                    KeyCode::Tab => {
                        if let Some(suggestion) = complete(&self.input.to_string()) {
                            self.input.set_text(suggestion);
                        }
                    }
                    KeyCode::Char(c) => {
                        self.input.insert_char(c);
                    }
                    KeyCode::Backspace => {
                        self.input.delete_char();
                    }
                    KeyCode::Left => {
                        self.input.move_left();
                    }
                    KeyCode::Right => {
                        self.input.move_right();
                    }
                    KeyCode::Up => {
                        if self.input.on_first_line() {
                            if let Some(previous) = self.history.previous_entry() {
                                self.input.set_text(previous);
                            }
                        } else {
                            self.input.move_up();
                        }
                    }
                    KeyCode::Down => {
                        if self.input.on_last_line() && self.history.is_browsing() {
                            if let Some(next) = self.history.next_entry() {
                                self.input.set_text(next);
                            }
                        } else {
                            self.input.move_down();
                        }
                    }
                    KeyCode::Home => {
                        self.input.cursor_x = 0;
                    }
                    KeyCode::End => {
                        self.input.cursor_x = self.input.line_len(self.input.cursor_y);
                    }
                    _ => {}
                }
            }
        }

        Ok(true)
    }
}

fn forward_session_events(
    mut events: broadcast::Receiver<StreamEvent>,
    sender: mpsc::Sender<UiEvent>,
) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if sender.send(UiEvent::Session(event)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    if sender.send(UiEvent::Missed(count)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Runs the inline chat UI until the user quits. Blocks the calling thread,
/// which must be inside a tokio runtime.
pub fn run_tui(portfolio: &Portfolio) -> UiResult<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    let (_, rows) = size()?;
    if rows > 0 {
        // Push existing screen content into scrollback without clearing it.
        for _ in 0..rows {
            writeln!(stdout)?;
        }
        stdout.flush()?;
    }
    execute!(stdout, MoveTo(0, 0))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::with_options(
        backend,
        TerminalOptions {
            viewport: Viewport::Inline(INPUT_HEIGHT),
        },
    )?;

    let mut app = App::new(portfolio);

    let _guard = TerminalGuard::new();

    app.append_message(&mut terminal, ChatMessage::Agent(GREETING.to_string()))?;
    terminal.draw(|f| app.draw(f))?;

    while !app.should_quit {
        if !app.handle_events(&mut terminal)? {
            break;
        }

        terminal.draw(|f| app.draw(f))?;

        std::thread::sleep(Duration::from_millis(10));
    }

    disable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::inference::InferenceReply;
    use crate::testing::ScriptedInference;
    use crate::ui_state::{DeploymentStatus, EnvKind, OverlayKind};
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        config: Config,
    }

    fn portfolio(reply: &str) -> Portfolio {
        let config = Harness::parse_from(["portfolio", "--api-key", ""]).config;
        let client = Arc::new(ScriptedInference::new());
        client.push(Ok(InferenceReply::Text(reply.to_string())));
        Portfolio::with_client(&config, client).unwrap()
    }

    #[test]
    fn input_buffer_shift_enter_inserts_new_line() {
        let mut buffer = InputBuffer::new();
        for ch in "hello".chars() {
            buffer.insert_char(ch);
        }
        buffer.new_line();
        for ch in "world".chars() {
            buffer.insert_char(ch);
        }

        assert_eq!(buffer.to_string(), "hello\nworld");
        assert_eq!(buffer.lines.len(), 2);
        assert_eq!(buffer.cursor_y, 1);
    }

    #[test]
    fn input_buffer_edits_multibyte_text() {
        let mut buffer = InputBuffer::new();
        buffer.set_text("héllo");
        buffer.move_left();
        buffer.move_left();
        buffer.move_left();
        buffer.delete_char();
        buffer.insert_char('e');

        assert_eq!(buffer.to_string(), "hello");
        assert_eq!(buffer.cursor_x, 2);
    }

    #[test]
    fn hex_colors_parse_in_both_forms() {
        assert_eq!(parse_hex_color("#22d3ee"), Some(Color::Rgb(0x22, 0xd3, 0xee)));
        assert_eq!(parse_hex_color("#fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(parse_hex_color("cyan"), None);
        assert_eq!(parse_hex_color("#12345"), None);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(ChatMessage::truncate("ééééé", 3, "..."), "ééé...");
        assert_eq!(ChatMessage::truncate("short", 10, "..."), "short");
    }

    #[test]
    fn overlay_feed_reports_open_log_status_and_close() {
        let store = UiStateStore::new();
        let mut feed = OverlayFeed::default();

        let id = store
            .set_overlay(Some(OverlayKind::DeploymentConsole {
                env: EnvKind::Agent,
                status: DeploymentStatus::Deploying,
            }))
            .unwrap();
        assert_eq!(
            feed.update(&store.get_state()),
            vec![ChatMessage::Info("[deploy:agent (deploying)]".to_string())]
        );

        store.append_overlay_log(id, "step one".to_string());
        store.set_deployment_status(id, DeploymentStatus::Active);
        assert_eq!(
            feed.update(&store.get_state()),
            vec![
                ChatMessage::Overlay("step one".to_string()),
                ChatMessage::Info("[deploy:agent (active)]".to_string()),
            ]
        );
        assert!(feed.update(&store.get_state()).is_empty());

        store.close_overlay();
        assert_eq!(
            feed.update(&store.get_state()),
            vec![ChatMessage::Info("deploy:agent (active) closed".to_string())]
        );
    }

    #[test]
    fn tool_listing_marks_optional_parameters() {
        let listing = tool_listing();
        assert!(listing.contains("navigate_to_section(sectionId: experience|skills|homelab|contact|hero)"));
        assert!(listing.contains("duration?: number"));
    }

    #[tokio::test]
    async fn settling_ends_the_wait_even_without_a_reply_event() {
        let portfolio = portfolio("hi there");
        let mut app = App::new(&portfolio);

        app.dispatch("hello".to_string());
        assert!(app.pending);

        // Session events are ignored here, as if the forwarder had lagged past them.
        loop {
            match app.receiver.recv().await {
                Some(event @ UiEvent::Settled(_)) => {
                    assert_eq!(app.apply(event), None);
                    break;
                }
                Some(_) => continue,
                None => panic!("event channel closed"),
            }
        }
        assert!(!app.pending);
        assert!(!portfolio.session().is_busy());
    }

    #[tokio::test]
    async fn skipped_events_are_reported_without_ending_the_wait() {
        let portfolio = portfolio("unused");
        let mut app = App::new(&portfolio);
        app.pending = true;

        let message = app.apply(UiEvent::Missed(4));

        assert!(matches!(message, Some(ChatMessage::Info(text)) if text.contains("4 session events")));
        assert!(app.pending);

        let message = app.apply(UiEvent::Settled(Some("message is empty".to_string())));
        assert_eq!(
            message,
            Some(ChatMessage::Info("Rejected: message is empty".to_string()))
        );
        assert!(!app.pending);
    }
}
