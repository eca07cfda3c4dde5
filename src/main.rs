mod app;
mod confetti;
mod config;
mod error;
mod journey;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::App;
use config::AppConfig;
use journey::{LAST_STAGE, STAGES};
use ui::layout::JourneyLayout;

#[derive(Parser, Debug)]
#[command(name = "guest-journey")]
#[command(version)]
#[command(about = "An interactive walkthrough of the guest messaging journey")]
struct Args {
    /// Stage to start on (0 = booked ... 5 = post-departure)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=LAST_STAGE as i64))]
    stage: Option<u8>,

    /// Use this config file instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the stage catalog as JSON and exit
    #[arg(short, long)]
    list: bool,

    /// Don't draw confetti
    #[arg(long)]
    no_confetti: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let args = Args::parse();

    // Handle CLI-only commands
    if args.list {
        println!("{}", serde_json::to_string_pretty(&STAGES)?);
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if let Some(stage) = args.stage {
        config.start_stage = stage as usize;
    }
    config.validate().context("Invalid configuration")?;

    ui::init_theme(&config.theme);

    run_tui(&config, !args.no_confetti)
}

/// Log to a file under the cache dir; the TUI owns stdout
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match open_log_file() {
        Some(file) => registry
            .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
            .init(),
        None => registry.with(fmt::layer().with_writer(io::stderr)).init(),
    }
}

fn open_log_file() -> Option<File> {
    let dir = dirs::cache_dir()?.join("guest-journey");
    std::fs::create_dir_all(&dir).ok()?;
    File::options()
        .create(true)
        .append(true)
        .open(dir.join("guest-journey.log"))
        .ok()
}

fn run_tui(config: &AppConfig, confetti: bool) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    tracing::info!(stage = config.start_stage, "Starting guest journey");

    // Create app state
    let mut app = App::new(config, confetti);

    // Main loop
    let result = run_app(&mut terminal, &mut app, config.tick_rate());

    // Cancel outstanding effects before the terminal goes away
    drop(app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    tracing::info!("Guest journey closed");
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    let layout = JourneyLayout::new(Rect::new(0, 0, size.width, size.height));
                    app.handle_mouse(mouse, &layout);
                }
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }

        // Apply any reveal / confetti effects that came due
        app.tick();
    }
}
