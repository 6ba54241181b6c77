//! relplan-tui - terminal viewer for release plans.
//!
//! Fetches the release plan (epics, features, sprints) from the backend
//! API and renders it as a date-scaled timeline with a shared time axis.
//! A filter bar re-queries the backend and redraws the chart wholesale.

mod api;
mod app;
mod config;
mod models;
mod scale;
mod theme;
mod timeline;
mod ui;

use std::fs::File;
use std::io::{self, stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use simplelog::{LevelFilter, WriteLogger};
use tokio::sync::mpsc;

use api::{ApiClient, ApiCommand, ApiMessage};
use app::App;
use config::Config;

/// How long the event loop waits for input before redrawing.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Main entry point. Initialization is explicit and ordered: config, then
/// logging, then terminal and client; any failure aborts before the first
/// render.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install().ok();

    let config = Config::load().context("Failed to load configuration")?;
    init_logging(&config)?;

    // The first CLI argument overrides the configured base URL.
    let args: Vec<String> = std::env::args().collect();
    let base_url = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| config.base_url.clone());

    log::info!("starting release plan viewer against {}", base_url);
    run_tui(&config, base_url).await
}

/// Developer-facing logs go to a file; the TUI owns the terminal.
fn init_logging(config: &Config) -> Result<()> {
    let file = File::create(&config.log_file)
        .with_context(|| format!("Failed to create log file {}", config.log_file))?;
    WriteLogger::init(LevelFilter::Debug, simplelog::Config::default(), file)
        .context("Failed to initialize logger")
}

/// Run the TUI application.
async fn run_tui(config: &Config, base_url: String) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Create communication channels
    let (api_tx, mut api_rx) = mpsc::channel::<ApiMessage>(32);
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<ApiCommand>(32);

    // Create API client and spawn worker task
    let api_client = ApiClient::new(base_url, config.request_timeout_secs)?;
    let api_task = tokio::spawn(async move {
        run_api_worker(api_client, api_tx, &mut cmd_rx).await;
    });

    // Kick off the initial probe and fetch
    cmd_tx.send(ApiCommand::CheckConnection).await.ok();
    cmd_tx.send(ApiCommand::RefreshPlan).await.ok();

    // Create application state
    let mut app = App::new();

    // Main event loop
    let result = run_event_loop(&mut terminal, &mut app, &mut api_rx, &cmd_tx).await;

    // Cleanup
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    api_task.abort();

    result
}

/// Run the API worker task. Commands are processed strictly one at a time,
/// so a second filter submission queues behind the first and the last
/// submitted request determines the final chart.
async fn run_api_worker(
    client: ApiClient,
    tx: mpsc::Sender<ApiMessage>,
    rx: &mut mpsc::Receiver<ApiCommand>,
) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            ApiCommand::RefreshPlan => match client.fetch_release_plan().await {
                Ok(plan) => {
                    tx.send(ApiMessage::PlanLoaded(plan)).await.ok();
                }
                Err(e) => {
                    tx.send(ApiMessage::Error(format!("Failed to fetch release plan: {}", e)))
                        .await
                        .ok();
                }
            },
            ApiCommand::ApplyFilters(request) => match client.customize_view(&request).await {
                Ok(plan) => {
                    tx.send(ApiMessage::PlanLoaded(plan)).await.ok();
                }
                Err(e) => {
                    tx.send(ApiMessage::Error(format!("Failed to apply filters: {}", e)))
                        .await
                        .ok();
                }
            },
            ApiCommand::CheckConnection => {
                let connected = client
                    .test_connection()
                    .await
                    .map(|probe| probe.is_success())
                    .unwrap_or(false);
                tx.send(ApiMessage::ConnectionStatus(connected)).await.ok();
            }
            ApiCommand::Shutdown => {
                break;
            }
        }
    }
}

/// Run the main event loop.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    api_rx: &mut mpsc::Receiver<ApiMessage>,
    cmd_tx: &mpsc::Sender<ApiCommand>,
) -> Result<()> {
    loop {
        // Render the UI
        terminal.draw(|frame| ui::render(frame, app))?;

        // Drain API messages (non-blocking). A burst of responses applies
        // in arrival order; the plan is replaced wholesale each time.
        while let Ok(msg) = api_rx.try_recv() {
            app.handle_api_message(msg);
        }

        // Handle input events with a timeout so messages keep draining
        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    if let Some(cmd) = app.handle_key(key) {
                        cmd_tx.send(cmd).await.ok();
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
