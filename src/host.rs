//! Terminal host
//!
//! Stands in for the page: stdin lines are selections or `:` commands, stdout is the
//! display surface. Logging goes to stderr. A selection that itself starts with `:` is
//! written with a doubled colon (`::)` translates `:)`).

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::core::session::{SessionConfig, TranslatorSession};
use crate::core::storage::{KeyValueStore, MemoryStore, RedbStore};
use crate::core::translator::languages::LANGUAGES;
use crate::core::translator::ReqwestTransport;
use crate::shared::emit::{emit_event, ChannelSurface};
use crate::shared::error::{AppError, AppResult};
use crate::shared::events::DisplaySurface;
use crate::shared::settings::AppSettings;
use crate::shared::types::HistoryEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    Selection(String),
    SwitchLanguage(String),
    SetSource(String),
    ShowHistory,
    ClearHistory,
    TogglePanel,
    HidePanel,
    ListLanguages,
    Quit,
    Unknown(String),
}

impl HostCommand {
    /// Lines starting with `:` are commands, `::` escapes a leading colon, anything else is a selection
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.starts_with("::") {
            return HostCommand::Selection(trimmed[1..].to_string());
        }
        let Some(command) = trimmed.strip_prefix(':') else {
            return HostCommand::Selection(line.to_string());
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::to_string);

        match (name, arg) {
            ("lang" | "to", Some(code)) => HostCommand::SwitchLanguage(code),
            ("from", Some(code)) => HostCommand::SetSource(code),
            ("history", None) => HostCommand::ShowHistory,
            ("clear", None) => HostCommand::ClearHistory,
            ("toggle", None) => HostCommand::TogglePanel,
            ("hide", None) => HostCommand::HidePanel,
            ("langs", None) => HostCommand::ListLanguages,
            ("quit" | "q", None) => HostCommand::Quit,
            _ => HostCommand::Unknown(command.to_string()),
        }
    }
}

/// Prints display updates to stdout
pub struct TerminalSurface;

impl TerminalSurface {
    fn print(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", text);
        let _ = out.flush();
    }
}

impl DisplaySurface for TerminalSurface {
    fn show_translation(&self, original: &str, translated: &str) {
        self.print(&format!("{}\n  => {}", original, translated));
    }

    fn show_error(&self, message: &str) {
        self.print(&format!("! {}", message));
    }

    fn render_history(&self, entries: &[HistoryEntry]) {
        self.print(&format!("  ({} in history)", entries.len()));
    }
}

fn format_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "History is empty".to_string();
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{:>2}. {} => {}", i + 1, entry.original, entry.translated))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Default)]
pub struct HostOptions {
    pub config_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub target_lang: Option<String>,
    pub source_lang: Option<String>,
    pub in_memory: bool,
}

/// Load settings, apply env and CLI overrides, validate
pub async fn resolve_settings(options: &HostOptions) -> AppResult<AppSettings> {
    let mut settings = match &options.config_path {
        Some(path) => AppSettings::load_from(path).await?,
        None => AppSettings::load().await?,
    };
    settings.apply_env_overrides();

    if let Some(target) = &options.target_lang {
        settings.preferences.default_target_lang = target.clone();
    }
    if let Some(source) = &options.source_lang {
        settings.preferences.default_source_lang = source.clone();
    }

    settings.validate()?;
    Ok(settings)
}

fn open_store(options: &HostOptions) -> AppResult<Arc<dyn KeyValueStore>> {
    if options.in_memory {
        return Ok(Arc::new(MemoryStore::new()));
    }
    let data_dir = match &options.data_dir {
        Some(dir) => dir.clone(),
        None => AppSettings::get_data_dir()?,
    };
    Ok(Arc::new(RedbStore::open(&data_dir.join("history.redb"))?))
}

pub async fn run(options: HostOptions) -> AppResult<()> {
    let settings = resolve_settings(&options).await?;
    let store = open_store(&options)?;
    let transport = ReqwestTransport::new(Duration::from_secs(settings.api.timeout_secs))
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

    // Display updates from translation tasks are printed from this loop only
    let surface = TerminalSurface;
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let session = Arc::new(TranslatorSession::new(
        SessionConfig::from_settings(&settings),
        Arc::new(transport),
        store,
        Arc::new(ChannelSurface::new(events_tx)),
    ));

    let mut tasks = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            Some(event) = events.recv() => {
                emit_event(&surface, event);
                continue;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };

        match HostCommand::parse(&line) {
            HostCommand::Selection(text) => {
                let session = Arc::clone(&session);
                tasks.spawn(async move {
                    session.handle_selection(&text).await;
                });
            }
            HostCommand::SwitchLanguage(code) => {
                let session = Arc::clone(&session);
                tasks.spawn(async move {
                    session.switch_language(&code).await;
                });
            }
            HostCommand::SetSource(code) => {
                if let Err(e) = session.set_source_language(&code) {
                    surface.show_error(&e.user_message());
                }
            }
            HostCommand::ShowHistory => surface.print(&format_history(&session.history())),
            HostCommand::ClearHistory => {
                if let Err(e) = session.clear_history() {
                    error!("[Host] Failed to clear history: {}", e);
                }
            }
            HostCommand::TogglePanel => {
                let visible = session.toggle_panel();
                surface.print(if visible { "Panel shown" } else { "Panel hidden" });
            }
            HostCommand::HidePanel => session.hide_panel(),
            HostCommand::ListLanguages => {
                let listing = LANGUAGES
                    .iter()
                    .map(|(code, name)| format!("{:<4} {}", code, name))
                    .collect::<Vec<_>>()
                    .join("\n");
                surface.print(&listing);
            }
            HostCommand::Quit => break,
            HostCommand::Unknown(command) => surface.show_error(&format!("Unknown command: {}", command)),
        }

        // Reap finished translations so the set does not grow unbounded
        while tasks.try_join_next().is_some() {}
    }

    while tasks.join_next().await.is_some() {}
    while let Ok(event) = events.try_recv() {
        emit_event(&surface, event);
    }
    info!("[Host] Input closed, exiting");
    Ok(())
}
