mod action;
mod app;
mod browser;
mod cities;
mod config;
mod detail;
mod error;
mod event;
mod loader;
mod route;
mod tui;
mod types;
mod ui;
mod view;
mod weather;

use std::fs::{self, File};
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::cities::{CitySource, OpenDataSoft};
use crate::config::Config;
use crate::error::AppError;
use crate::event::Event;
use crate::route::Route;
use crate::tui::EventHandler;
use crate::weather::{OpenWeather, Unconfigured, WeatherProvider};

/// Browse world cities and check their weather
#[derive(Debug, Parser)]
#[command(name = "cityscope", version, about)]
struct Cli {
    /// Initial search term for the city list
    #[arg(short, long, default_value = "")]
    search: String,

    /// Route to open at startup, e.g. `/weather/Tokyo`
    #[arg(short, long, default_value = "/")]
    route: String,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Log to a file under the cache dir so output doesn't tear the terminal.
/// Falls back to stderr when the file can't be created.
fn log_writer() -> BoxMakeWriter {
    let file = dirs::cache_dir()
        .map(|dir| dir.join("cityscope"))
        .and_then(|dir| {
            fs::create_dir_all(&dir).ok()?;
            File::create(dir.join("cityscope.log")).ok()
        });

    match file {
        Some(file) => BoxMakeWriter::new(Mutex::new(file)),
        None => BoxMakeWriter::new(std::io::stderr),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(log_writer()),
        )
        .init();

    let root = Route::parse(&cli.route)
        .ok_or_else(|| AppError::Config(format!("Unknown route: {}", cli.route)))?;

    let config = Config::load(cli.config.as_deref())?;
    let timeout = config.request_timeout();

    let cities: Arc<dyn CitySource> = Arc::new(OpenDataSoft::new(&config.cities, timeout)?);

    // Without a key the city list still works; weather screens show the failure
    let mut startup_error = None;
    let weather: Arc<dyn WeatherProvider> = match config.weather.resolve_api_key() {
        Ok(api_key) => Arc::new(OpenWeather::new(&config.weather.base_url, api_key, timeout)?),
        Err(err) => {
            tracing::warn!(error = %err, "weather disabled");
            let provider: Arc<dyn WeatherProvider> = Arc::new(Unconfigured::new(&err));
            startup_error = Some(err);
            provider
        }
    };

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    tracing::info!(route = %root, "starting");
    let result = run(cities, weather, root, &cli.search, startup_error).await;

    tui::restore()?;

    result
}

async fn run(
    cities: Arc<dyn CitySource>,
    weather: Arc<dyn WeatherProvider>,
    root: Route,
    search: &str,
    startup_error: Option<AppError>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut app = App::new(cities, weather, action_tx.clone(), root, search);
    if let Some(err) = startup_error {
        action_tx.send(err.into())?;
    }

    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(render_rate);

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
