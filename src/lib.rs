pub mod types;
pub mod config;
pub mod error;
pub mod seeding;
pub mod domain;
pub mod score;
pub mod classify;
pub mod thread;
pub mod codec;
pub mod store;
pub mod startgg;
pub mod normalize;
pub mod service;
pub mod report;

use config::*;
use error::{Result, UpsetError};
use service::{load_thread, UpsetService};
use startgg::{event_slug_from_link, FileSource, MatchSource, StartggClient};
use store::JsonFileStore;

use chrono::Local;
use clap::Parser;
use std::{fs, path::PathBuf, time::Duration};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::writer::MakeWriterExt, EnvFilter};

// ── CLI ────────────────────────────────────────────────────────────────

/// Builds an upset thread for a start.gg event.
#[derive(Parser, Debug)]
#[command(name = "upset-thread")]
#[command(version)]
pub struct Cli {
    /// Event slug or start.gg event URL, e.g. tournament/genesis-9/event/melee-singles
    #[arg(long)]
    pub slug: String,

    /// Thread title; defaults to the event slug
    #[arg(long)]
    pub title: Option<String>,

    /// Read sets from a saved JSON file instead of the API
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Character roster JSON to use with --file
    #[arg(long, requires = "file")]
    pub characters: Option<PathBuf>,

    /// Videogame slug for character names
    #[arg(long)]
    pub game: Option<String>,

    /// Store file path
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Write the Markdown report here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Render what is already stored without fetching
    #[arg(long, conflicts_with = "file")]
    pub from_store: bool,
}

// ── Entry point ────────────────────────────────────────────────────────

fn init_tracing() -> WorkerGuard {
    let logs_dir = logs_dir();
    fs::create_dir_all(&logs_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "app.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking.and(std::io::stderr))
        .with_ansi(false)
        .init();
    guard
}

pub fn run() -> Result<()> {
    load_env_file();
    let cli = Cli::parse();
    let _guard = init_tracing();
    info!("upset-thread starting");
    run_with(cli)
}

pub fn run_with(cli: Cli) -> Result<()> {
    let mut config = load_config_inner().map_err(UpsetError::Config)?;
    if let Some(game) = cli.game.as_ref() {
        config.game_title = game.clone();
    }

    let slug = event_slug_from_link(&cli.slug)
        .ok_or_else(|| UpsetError::Config(format!("not a start.gg event slug: {}", cli.slug)))?;
    let title = cli.title.clone().unwrap_or_else(|| slug.clone());
    let store_path = cli
        .store
        .clone()
        .unwrap_or_else(|| resolve_repo_path(&config.store_path));
    let store = JsonFileStore::open(store_path)?;
    info!(slug = %slug, store = %store.path().display(), game = %config.game_title, "processing event");

    let thread = if cli.from_store {
        load_thread(&store, &slug, &title)?
    } else {
        let (source, page_delay): (Box<dyn MatchSource>, Duration) = match cli.file.as_ref() {
            Some(path) => (
                Box::new(FileSource::new(path.clone(), cli.characters.clone())) as Box<dyn MatchSource>,
                Duration::ZERO,
            ),
            None => {
                log_env_warnings(&config);
                let client = StartggClient::from_config(&config).map_err(UpsetError::Config)?;
                (Box::new(client) as Box<dyn MatchSource>, Duration::from_millis(config.page_delay_ms))
            }
        };
        UpsetService::new(&store, source.as_ref(), &config.game_title, page_delay).process(&slug, &title)?
    };

    let markdown = report::to_markdown(&thread, &Local::now());
    match cli.output.as_ref() {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, markdown)?;
            info!(path = %path.display(), items = thread.len(), "wrote upset thread");
        }
        None => print!("{markdown}"),
    }
    Ok(())
}
