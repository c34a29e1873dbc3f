//! Interactive Twitch bridge console.
//!
//! The bridge runtime runs on the tokio executor while rustyline reads
//! operator input on a blocking thread. Events from the integration and
//! adapter diagnostics are printed as they arrive.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use colored::{Color, Colorize};
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};
use tokio::sync::mpsc;

use rc_core::channel_history::{ChannelHistoryStore, RecentChannels};
use rc_core::chat::ChatMessage;
use rc_core::event_log::{LogEntry, Severity};
use rc_core::session::{ChatIntegration, ConnectionState, IntegrationEvent};
use rc_execution::{BridgeRuntime, ConsoleCommand, DiagnosticEvent};
use rc_infrastructure::{CommandFileBridge, FileKeyValueStore, TwitchIrcRelay};

use super::Context;
use super::info;

const CONSOLE_WORDS: [&str; 7] = [
    "connect",
    "disconnect",
    "channels",
    "status",
    "commands",
    "help",
    "quit",
];

/// One line typed at the console.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConsoleInput {
    /// `connect`, `connect <channel>` or `connect <n>` for the n-th recent channel
    Connect(Option<String>),
    Disconnect,
    Channels,
    Status,
    Commands,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_console_line(line: &str) -> ConsoleInput {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return ConsoleInput::Empty;
    };
    match word.to_lowercase().as_str() {
        "connect" | "join" => ConsoleInput::Connect(parts.next().map(str::to_string)),
        "disconnect" | "leave" => ConsoleInput::Disconnect,
        "channels" => ConsoleInput::Channels,
        "status" => ConsoleInput::Status,
        "commands" => ConsoleInput::Commands,
        "help" | "?" => ConsoleInput::Help,
        "quit" | "exit" => ConsoleInput::Quit,
        _ => ConsoleInput::Unknown(word.to_string()),
    }
}

/// Turns a `connect` argument into a channel name.
///
/// No argument means the most recent channel; a small number picks from the
/// recent list. Anything else is taken as a channel name.
fn resolve_channel(arg: Option<&str>, recent: &RecentChannels) -> Option<String> {
    match arg {
        None => recent.most_recent().map(str::to_string),
        Some(arg) => match arg.parse::<usize>() {
            Ok(n) if n >= 1 && n <= recent.len() => Some(recent.as_slice()[n - 1].clone()),
            _ => Some(arg.to_string()),
        },
    }
}

/// Sender name colour: moderators green, subscribers purple, others blue.
fn name_color(message: &ChatMessage) -> Color {
    if message.tags.is_moderator() {
        Color::Green
    } else if message.tags.has_badge("subscriber") {
        Color::Magenta
    } else {
        Color::Blue
    }
}

/// What the renderer last saw; read by the input thread.
#[derive(Debug, Clone)]
struct ConsoleState {
    status: ConnectionState,
    recent: RecentChannels,
}

impl Default for ConsoleState {
    fn default() -> Self {
        Self {
            status: ConnectionState::Disconnected,
            recent: RecentChannels::new(),
        }
    }
}

#[derive(Clone)]
struct ConsoleHelper;

impl Helper for ConsoleHelper {}

impl Completer for ConsoleHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if line.contains(' ') {
            return Ok((0, Vec::new()));
        }
        let candidates = CONSOLE_WORDS
            .iter()
            .filter(|word| word.starts_with(line))
            .map(|word| Pair {
                display: word.to_string(),
                replacement: word.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ConsoleHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        match parse_console_line(line) {
            ConsoleInput::Unknown(_) | ConsoleInput::Empty => Borrowed(line),
            _ => Owned(line.bright_cyan().to_string()),
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ConsoleHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.is_empty() || line.contains(' ') {
            return None;
        }
        CONSOLE_WORDS
            .iter()
            .find(|word| word.starts_with(line) && word.len() > line.len())
            .map(|word| word[line.len()..].to_string())
    }
}

impl Validator for ConsoleHelper {}

fn print_help() {
    println!("{}", "Console commands".bright_magenta().bold());
    println!("  {}   join a channel (no argument: most recent)", "connect [channel|n]".bright_cyan());
    println!("  {}            leave the current channel", "disconnect".bright_cyan());
    println!("  {}              recently joined channels", "channels".bright_cyan());
    println!("  {}                connection status", "status".bright_cyan());
    println!("  {}              chat commands viewers can use", "commands".bright_cyan());
    println!("  {}                  stop the bridge and exit", "quit".bright_cyan());
}

fn print_channels(recent: &[String]) {
    if recent.is_empty() {
        println!("{}", "No recent channels".bright_black());
        return;
    }
    for (index, channel) in recent.iter().enumerate() {
        println!("  {}. #{}", index + 1, channel);
    }
}

fn print_status(status: &ConnectionState) {
    let line = match status {
        ConnectionState::Disconnected => status.label().to_string(),
        ConnectionState::Connecting { channel, .. } => format!("{} #{}", status.label(), channel),
        ConnectionState::Connected { channel } => format!("{} to #{}", status.label(), channel),
    };
    let line = format!("Status: {}", line);
    match status {
        ConnectionState::Connected { .. } => println!("{}", line.bright_green()),
        ConnectionState::Connecting { .. } => println!("{}", line.yellow()),
        ConnectionState::Disconnected => println!("{}", line.bright_black()),
    }
}

fn print_log_entry(entry: &LogEntry) {
    let line = format!(
        "[{}] {}",
        entry.timestamp.with_timezone(&chrono::Local).format("%H:%M:%S"),
        entry.message
    );
    match entry.severity {
        Severity::Success => println!("{}", line.green()),
        Severity::Error => println!("{}", line.red()),
        Severity::Warning => println!("{}", line.yellow()),
        Severity::Info => println!("{}", line.bright_black()),
    }
}

fn print_diagnostic(event: &DiagnosticEvent) {
    let line = format!("! {}", event.message);
    if event.level == "ERROR" {
        eprintln!("{}", line.red());
    } else {
        eprintln!("{}", line.yellow());
    }
}

async fn render(
    mut events: mpsc::UnboundedReceiver<IntegrationEvent>,
    mut diagnostics: Option<mpsc::UnboundedReceiver<DiagnosticEvent>>,
    state: Arc<Mutex<ConsoleState>>,
) {
    loop {
        let diagnostic = async {
            match diagnostics.as_mut() {
                Some(rx) => rx.recv().await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    IntegrationEvent::Log(entry) => print_log_entry(&entry),
                    IntegrationEvent::Chat(message) => {
                        println!(
                            "{} {}",
                            format!("{}:", message.display_name())
                                .color(name_color(&message))
                                .bold(),
                            message.content.bright_white()
                        );
                    }
                    IntegrationEvent::StatusChanged(status) => {
                        print_status(&status);
                        if let Ok(mut state) = state.lock() {
                            state.status = status;
                        }
                    }
                    IntegrationEvent::RecentChannelsChanged(recent) => {
                        if let Ok(mut state) = state.lock() {
                            state.recent = RecentChannels::from_vec(recent);
                        }
                    }
                }
            }
            Some(event) = diagnostic => print_diagnostic(&event),
        }
    }
}

/// Reads operator input until `quit` or end of input. Runs on a blocking thread.
fn read_console(
    commands: mpsc::UnboundedSender<ConsoleCommand>,
    state: Arc<Mutex<ConsoleState>>,
) -> Result<()> {
    let mut rl: Editor<ConsoleHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ConsoleHelper));

    let snapshot = || state.lock().map(|s| s.clone()).unwrap_or_default();

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let input = parse_console_line(&line);
                if input != ConsoleInput::Empty {
                    let _ = rl.add_history_entry(line.as_str());
                }
                let command = match input {
                    ConsoleInput::Connect(arg) => {
                        match resolve_channel(arg.as_deref(), &snapshot().recent) {
                            Some(channel) => ConsoleCommand::Connect(channel),
                            None => {
                                println!("{}", "Please enter a channel name".yellow());
                                continue;
                            }
                        }
                    }
                    ConsoleInput::Disconnect => ConsoleCommand::Disconnect,
                    ConsoleInput::Quit => break,
                    ConsoleInput::Channels => {
                        print_channels(snapshot().recent.as_slice());
                        continue;
                    }
                    ConsoleInput::Status => {
                        print_status(&snapshot().status);
                        continue;
                    }
                    ConsoleInput::Commands => {
                        info::chat_commands();
                        continue;
                    }
                    ConsoleInput::Help => {
                        print_help();
                        continue;
                    }
                    ConsoleInput::Empty => continue,
                    ConsoleInput::Unknown(word) => {
                        println!("{}", format!("Unknown console command: {} (try `help`)", word).bright_black());
                        continue;
                    }
                };
                if commands.send(command).is_err() {
                    break;
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(err) => return Err(anyhow!("Console input failed: {}", err)),
        }
    }

    let _ = commands.send(ConsoleCommand::Shutdown);
    Ok(())
}

pub async fn run(
    ctx: &Context,
    channel: Option<String>,
    diagnostics: Option<mpsc::UnboundedReceiver<DiagnosticEvent>>,
) -> Result<()> {
    let (relay, relay_events) = TwitchIrcRelay::with_channel(ctx.config.twitch.clone());
    let bridge = CommandFileBridge::new(ctx.paths.command_file());
    let history = ChannelHistoryStore::new(Arc::new(FileKeyValueStore::new(
        ctx.paths.local_storage_file(),
    )));

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let integration = ChatIntegration::new(history).with_observer(events_tx);
    let runtime = BridgeRuntime::new(
        integration,
        Arc::new(relay),
        Arc::new(bridge),
        relay_events,
        commands_rx,
    );

    let state = Arc::new(Mutex::new(ConsoleState::default()));
    let renderer = tokio::spawn(render(events_rx, diagnostics, state.clone()));
    let runtime_task = tokio::spawn(runtime.run());

    println!("{}", "=== RetroChallenges Twitch bridge ===".bright_magenta().bold());
    println!(
        "{}",
        format!(
            "Bridge commands go to {}. Type 'help' for console commands.",
            ctx.paths.command_file().display()
        )
        .bright_black()
    );
    println!();

    if let Some(channel) = channel {
        let _ = commands_tx.send(ConsoleCommand::Connect(channel));
    }

    let console = tokio::task::spawn_blocking(move || read_console(commands_tx, state));
    let console_result = console.await?;

    let integration = runtime_task.await?;
    tracing::info!(
        "[Console] Bridge stopped after {} log entries",
        integration.event_log().len()
    );
    // Closes the observer channel so the renderer drains and exits.
    drop(integration);
    let _ = renderer.await;

    println!("{}", "Goodbye!".bright_green());
    console_result
}

pub async fn list_channels(ctx: &Context) -> Result<()> {
    let history = ChannelHistoryStore::new(Arc::new(FileKeyValueStore::new(
        ctx.paths.local_storage_file(),
    )));
    let recent = history.load().await;
    print_channels(recent.as_slice());
    Ok(())
}
