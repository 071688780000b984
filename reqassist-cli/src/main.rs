//! CLI entry point for reqassist

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use indicatif::{ProgressBar, ProgressStyle};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{backend::CrosstermBackend, Terminal};
use reqassist_client::{ApiClient, ChatReply, ClientError};
use reqassist_core::config::{Config, ConfigLoader};
use reqassist_core::logging::init_logging;
use reqassist_core::session::{ChatPhase, ChatSession, MessageId, Role, SessionStore};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

mod format;

#[derive(Parser)]
#[command(name = "reqassist")]
#[command(about = "A terminal client for the requirements assistant")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the interactive chat
    Chat,
    /// Send a single message and print the reply
    Send {
        /// Message to send
        #[arg(short, long)]
        message: String,
    },
    /// Print the persisted chat history
    History,
    /// Clear the chat history
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show configuration and session status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_loader = if let Some(dir) = cli.config_dir {
        ConfigLoader::with_dir(dir)
    } else {
        ConfigLoader::new()
    };
    let config = config_loader.load()?;
    let _guard = init_logging(&config.logging);

    match cli.command {
        Commands::Chat => {
            info!("Starting interactive chat");
            run_chat(&config).await?;
        }
        Commands::Send { message } => {
            info!("Sending one-shot message");
            run_send(&config, &message).await?;
        }
        Commands::History => {
            run_history(&config)?;
        }
        Commands::Clear { yes } => {
            run_clear(&config, yes)?;
        }
        Commands::Status => {
            run_status(&config, &config_loader)?;
        }
    }

    Ok(())
}

/// Expand tilde in path
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn open_session(config: &Config) -> ChatSession {
    let store = SessionStore::new(expand_tilde(&config.session.dir));
    ChatSession::open(store)
}

/// Send one message and print the reply
async fn run_send(config: &Config, message: &str) -> Result<()> {
    let mut session = open_session(config);

    let Some(pending) = session.submit(message)? else {
        println!("{}", style("Nothing to send.").yellow());
        return Ok(());
    };

    let client = ApiClient::new(Some(config.api.base_url.clone()));
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message("Analyzing requirements...");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = client.chat(message.trim()).await;
    spinner.finish_and_clear();

    match result {
        Ok(reply) => {
            session.resolve_ok(reply.response.clone(), reply.stats.clone())?;
            println!("{}", style("Response:").bold());
            println!("{}", reply.response);
            if let Some(stats) = &reply.stats {
                println!("{}", style(format::stats_line(stats)).dim());
            }
            Ok(())
        }
        Err(e) => {
            session.resolve_err(pending, e.to_string())?;
            anyhow::bail!("Failed to get response: {}", e);
        }
    }
}

/// Print the persisted history
fn run_history(config: &Config) -> Result<()> {
    let session = open_session(config);

    if session.messages().is_empty() {
        println!("{}", style("No chat history.").dim());
        return Ok(());
    }

    for message in session.messages() {
        let timestamp = message
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M");
        let label = match message.role {
            Role::User => style("user").cyan(),
            Role::Bot => style("bot ").green(),
        };
        println!("{} {} {}", style(timestamp).dim(), label, message.content);
        if let Some(stats) = &message.stats {
            println!("                       {}", style(format::stats_line(stats)).dim());
        }
    }

    Ok(())
}

/// Clear the persisted history
fn run_clear(config: &Config, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt("Clear the chat history?")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Clear cancelled.");
            return Ok(());
        }
    }

    let mut session = open_session(config);
    session.clear()?;
    println!("{}", style("Chat history cleared.").green());
    Ok(())
}

/// Show configuration and session status
fn run_status(config: &Config, loader: &ConfigLoader) -> Result<()> {
    let store = SessionStore::new(expand_tilde(&config.session.dir));
    let message_count = store.load().len();

    println!("{}", style("Reqassist Status").bold().cyan());
    println!("  Config directory: {}", loader.config_dir().display());
    println!("  Endpoint: {}", config.api.base_url);
    println!("  History file: {}", store.path().display());
    println!("  Messages: {}", message_count);

    Ok(())
}

struct ChatApp {
    session: ChatSession,
    endpoint: String,
    input: String,
    scroll: u16,
    should_quit: bool,
}

impl ChatApp {
    fn new(session: ChatSession, endpoint: String) -> Self {
        Self {
            session,
            endpoint,
            input: String::new(),
            scroll: 0,
            should_quit: false,
        }
    }

    fn timeline_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        for message in self.session.messages() {
            let timestamp = message
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%H:%M")
                .to_string();
            match message.role {
                Role::User => {
                    let mut spans =
                        vec![Span::styled("[user] ", Style::default().fg(Color::Cyan))];
                    for segment in format::split_tokens(&message.content) {
                        match segment {
                            format::Segment::Plain(text) => spans.push(Span::raw(text)),
                            format::Segment::Token(text) => spans.push(Span::styled(
                                text,
                                Style::default()
                                    .fg(Color::Yellow)
                                    .add_modifier(Modifier::BOLD),
                            )),
                        }
                    }
                    spans.push(Span::styled(
                        format!("  {}", timestamp),
                        Style::default().fg(Color::DarkGray),
                    ));
                    lines.push(Line::from(spans));
                }
                Role::Bot => {
                    lines.push(Line::from(vec![
                        Span::styled("[bot] ", Style::default().fg(Color::Green)),
                        Span::raw(message.content.clone()),
                        Span::styled(
                            format!("  {}", timestamp),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ]));
                    if let Some(stats) = &message.stats {
                        lines.push(Line::from(Span::styled(
                            format!("       {}", format::stats_line(stats)),
                            Style::default().fg(Color::Blue),
                        )));
                    }
                }
            }
        }

        if self.session.is_sending() {
            lines.push(Line::from(Span::styled(
                "[bot] Analyzing requirements...",
                Style::default().fg(Color::DarkGray),
            )));
        }

        lines
    }

    fn footer_line(&self) -> Line<'static> {
        match self.session.phase() {
            ChatPhase::Error(message) => Line::from(Span::styled(
                format!("error: {}", message),
                Style::default().fg(Color::Red),
            )),
            _ => Line::from(Span::styled(
                "Enter send | /clear reset | /quit or Esc exit",
                Style::default().fg(Color::DarkGray),
            )),
        }
    }
}

/// Run the interactive chat
async fn run_chat(config: &Config) -> Result<()> {
    let session = open_session(config);
    let client = ApiClient::new(Some(config.api.base_url.clone()));

    // One request at a time: the session's sending phase guards submits,
    // the worker resolves each request back through the outcome channel.
    let (request_tx, mut request_rx) = mpsc::unbounded_channel::<(MessageId, String)>();
    let (outcome_tx, mut outcome_rx) =
        mpsc::unbounded_channel::<(MessageId, Result<ChatReply, ClientError>)>();

    tokio::spawn(async move {
        while let Some((pending, text)) = request_rx.recv().await {
            let result = client.chat(&text).await;
            if outcome_tx.send((pending, result)).is_err() {
                break;
            }
        }
    });

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = ChatApp::new(session, config.api.base_url.clone());
    loop {
        while let Ok((pending, outcome)) = outcome_rx.try_recv() {
            match outcome {
                Ok(reply) => app.session.resolve_ok(reply.response, reply.stats)?,
                Err(e) => app.session.resolve_err(pending, e.to_string())?,
            }
        }

        terminal.draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(1),
                    Constraint::Length(3),
                    Constraint::Length(1),
                ])
                .split(frame.area());

            let status = match app.session.phase() {
                ChatPhase::Idle => "idle",
                ChatPhase::Sending => "sending",
                ChatPhase::Error(_) => "error",
            };
            let status_line = format!("endpoint: {} | status: {}", app.endpoint, status);
            frame.render_widget(
                Paragraph::new(status_line).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("requirements assistant"),
                ),
                chunks[0],
            );

            let timeline = Paragraph::new(app.timeline_lines())
                .block(Block::default().borders(Borders::ALL).title("conversation"))
                .wrap(Wrap { trim: false })
                .scroll((app.scroll, 0));
            frame.render_widget(timeline, chunks[1]);

            frame.render_widget(
                Paragraph::new(app.input.clone())
                    .block(Block::default().borders(Borders::ALL).title("input"))
                    .wrap(Wrap { trim: false }),
                chunks[2],
            );
            frame.render_widget(Paragraph::new(app.footer_line()), chunks[3]);
            frame.set_cursor_position((chunks[2].x + 1 + app.input.len() as u16, chunks[2].y + 1));
        })?;

        if event::poll(Duration::from_millis(60))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.should_quit = true;
                    }
                    KeyCode::Esc => app.should_quit = true,
                    KeyCode::PageUp | KeyCode::Up => {
                        app.scroll = app.scroll.saturating_sub(1);
                    }
                    KeyCode::PageDown | KeyCode::Down => {
                        app.scroll = app.scroll.saturating_add(1);
                    }
                    KeyCode::Enter => {
                        let content = app.input.trim().to_string();
                        if content == "/quit" {
                            app.should_quit = true;
                        } else if content == "/clear" {
                            app.session.clear()?;
                            app.input.clear();
                            app.scroll = 0;
                        } else if let Some(pending) = app.session.submit(&content)? {
                            app.input.clear();
                            app.scroll = app.scroll.saturating_add(1);
                            let _ = request_tx.send((pending, content));
                        }
                    }
                    KeyCode::Backspace => {
                        app.input.pop();
                    }
                    KeyCode::Char(ch) => {
                        app.input.push(ch);
                    }
                    _ => {}
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
