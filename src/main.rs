//! Undercover - a pass-the-device social deduction word game
//!
//! Civilians share a secret word, the undercover gets a close cousin of it,
//! Mr. White gets nothing. Give clues, vote, find the infiltrators.

mod app;
mod config;
mod game;
mod storage;
mod tui;

use anyhow::{Context, Result};
use app::{AppCoordinator, Session};
use config::AppConfig;
use crossterm::event::{self, Event, KeyEventKind};
use directories::ProjectDirs;
use game::words::{CommandProvider, WordPairProvider, WordSource};
use std::path::PathBuf;
use std::time::Duration;
use storage::{NameHistory, Storage};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tui::Tui;

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env();
    setup_logging(&config)?;

    let session = build_session(&config);
    let mut coordinator = AppCoordinator::new(session);

    let mut terminal = Tui::new()?;
    terminal.enter()?;

    let poll_rate = Duration::from_millis(250);
    loop {
        terminal.draw(|frame| tui::render(frame, &coordinator))?;

        if event::poll(poll_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    coordinator.on_key(key.code);
                }
            }
        }

        if coordinator.should_quit {
            break;
        }
    }

    tracing::info!("bye");
    // Terminal cleanup happens automatically via Tui::drop
    Ok(())
}

fn build_session(config: &AppConfig) -> Session {
    let live = config
        .word_command
        .as_deref()
        .and_then(CommandProvider::from_command_line)
        .map(|provider| Box::new(provider) as Box<dyn WordPairProvider>);
    if live.is_some() {
        tracing::info!("using external word generator");
    }
    let words = WordSource::new(live);

    let storage = match &config.data_dir {
        Some(dir) => Storage::open_in(dir),
        None => Storage::open(),
    };
    let history = match storage {
        Ok(storage) => Some(Box::new(storage) as Box<dyn NameHistory>),
        Err(e) => {
            tracing::warn!("name history disabled: {}", e);
            None
        }
    };

    let session = match config.seed {
        Some(seed) => Session::with_seed(words, history, seed),
        None => Session::new(words, history),
    };
    session.with_default_setup(config.setup.clone())
}

/// Log to a file only; the terminal belongs to the UI.
fn setup_logging(config: &AppConfig) -> Result<()> {
    let log_dir = match &config.log_dir {
        Some(dir) => dir.clone(),
        None => default_log_dir(),
    };
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "undercover.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    // Keep the writer alive for the whole process
    std::mem::forget(guard);

    tracing::info!("logging to {}", log_dir.display());
    Ok(())
}

fn default_log_dir() -> PathBuf {
    ProjectDirs::from("", "", "undercover")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("undercover-logs"))
}
