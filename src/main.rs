//! Main entry point for the episode-browser application.

use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use episode_browser::browser::EpisodeBrowser;
use episode_browser::config::Config;
use episode_browser::error::{AppError, Result};
use episode_browser::pagination::Interval;
use episode_browser::storage::{FileStore, KeyValueStore, MemoryStore};
use episode_browser::tui::{Action, App, draw, poll_event};
use episode_browser::types::{Series, SeriesSource};
use log::{debug, info, warn};
use ratatui::prelude::*;
use std::fs;
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Command-line arguments for the episode-browser application.
#[derive(Parser, Debug)]
#[command(
    name = "episode-browser",
    version,
    about = "Browse the episodes of a series in the terminal",
    long_about = "Search, page through and pick episodes of a series loaded from a JSON file, \
                  remembering watched episodes and layout per series."
)]
struct Args {
    /// Series file: a JSON series object or a bare array of episodes
    series_file: PathBuf,

    /// Series identifier (overrides the id in the series file)
    #[arg(short, long)]
    series_id: Option<String>,

    /// Episode id selected on startup
    #[arg(short = 'e', long)]
    selected: Option<String>,

    /// Store file (overrides config and the platform data directory)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Keep all state in memory
    #[arg(long)]
    no_persist: bool,

    /// Interval shown on startup, as START-END indices (e.g. 100-199)
    #[arg(short, long)]
    interval: Option<Interval>,

    /// Episodes per interval (overrides config)
    #[arg(short, long)]
    page_size: Option<usize>,

    /// Log verbosity level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short, long, default_value_t = 1)]
    log: u8,
}

/// Read a series file.
fn load_series(path: &Path) -> Result<Series> {
    if !path.exists() {
        return Err(AppError::NotFound(format!(
            "series file '{}'",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)?;
    let source: SeriesSource = serde_json::from_str(&content)?;
    Ok(source.into())
}

/// Open the persistent store, falling back to memory when it can't be used.
fn open_store(args: &Args, config: &Config) -> Box<dyn KeyValueStore> {
    if args.no_persist {
        return Box::new(MemoryStore::new());
    }

    let path = match (&args.store, &config.storage_path) {
        (Some(path), _) => Ok(path.clone()),
        (None, Some(path)) => Ok(PathBuf::from(path)),
        (None, None) => FileStore::default_path(),
    };

    match path.map_err(AppError::from).and_then(FileStore::open) {
        Ok(store) => {
            debug!("Using store {}", store.path().display());
            Box::new(store)
        }
        Err(e) => {
            warn!("Failed to open store: {}. State will not be saved.", e);
            Box::new(MemoryStore::new())
        }
    }
}

/// Initialize the terminal for TUI rendering.
fn init_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to its original state.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    Ok(())
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.log {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    debug!("Log level set to {:?}", log_level);

    // Load config
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config: {}. Using defaults.", e);
        Config::new()
    });

    let series = match load_series(&args.series_file) {
        Ok(series) => series,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let series_id = args.series_id.clone().or_else(|| series.id.clone());
    if series_id.is_none() {
        info!("No series id; watched episodes and layout will not be saved");
    }

    let page_size = args.page_size.unwrap_or(config.page_size);
    let store = open_store(&args, &config);
    let mut browser =
        EpisodeBrowser::with_page_size(series_id, series.episodes.clone(), store, page_size);
    if let Some(interval) = args.interval {
        if !browser.set_interval(interval) {
            warn!("Interval {} is not one of the available intervals", interval);
        }
    }

    let mut app = App::new(browser, &series, &config);
    if args.selected.is_some() {
        app.set_selected(args.selected.clone());
    }

    let mut terminal = init_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| draw(f, app))?;
        app.sync_scroll();

        if let Some(Event::Key(key)) = poll_event(Duration::from_millis(100))? {
            let had_status = app.status_message.is_some();

            match app.handle_input(key) {
                Action::Quit => break,
                Action::Select(id) => {
                    if let Some(episode) = app.browser.episodes().iter().find(|e| e.id == id) {
                        let message = format!("Playing {}", episode.to_display());
                        info!("{}", message);
                        app.set_status(&message);
                    }
                }
                Action::None => {
                    if had_status {
                        app.clear_status();
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
