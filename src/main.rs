//! tiltmaze - Terminal Tilt-Maze Puzzle
//!
//! Roll the ball over every goal. The game saves itself when the terminal loses focus, on quit,
//! and when the process is told to hang up or terminate.

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use std::fs::File;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tiltmaze::config::Config;
use tiltmaze::input::spawn_input_thread;
use tiltmaze::ui::{ColorTheme, TerminalUI};
use tiltmaze::Application;

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Parser)]
#[command(
    name = "tiltmaze",
    version = tiltmaze::VERSION,
    about = "Roll a ball through a maze from your terminal",
    long_about = "tiltmaze is a terminal tilt-maze puzzle. Swipe with the mouse or use the \
                  arrow keys to roll the ball; progress is saved when the terminal loses \
                  focus and when you quit."
)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to keep the saved game
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Discard any saved game and start from the first maze
    #[arg(long)]
    fresh: bool,

    /// Write log output to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    // stderr is hidden behind the alternate screen, so without a file only warnings matter
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        None => env_logger::init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(snapshot) = cli.snapshot {
        config.snapshot_path = Some(snapshot);
    }

    let theme = if config.monochrome {
        ColorTheme::monochrome()
    } else {
        ColorTheme::default()
    };
    let ui_renderer = Box::new(TerminalUI::with_theme(theme)?);
    let mut app = Application::new(&config, ui_renderer, cli.fresh)?;

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let shutdown = Arc::new(AtomicBool::new(false));
    let input_thread = spawn_input_thread(
        tx,
        Arc::clone(&shutdown),
        INPUT_POLL_INTERVAL,
        config.gesture(),
    );

    let outcome = app.run(rx).await;

    shutdown.store(true, Ordering::SeqCst);
    if input_thread.join().is_err() {
        warn!("input thread panicked");
    }

    outcome?;
    Ok(())
}
