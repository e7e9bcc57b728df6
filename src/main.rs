mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use battlesnake_api::client::BattlesnakeApi;
use crossterm::event::{self as crossterm_event, Event, KeyEventKind};
use crossterm::{cursor, execute, terminal};
use log::{error, info};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(cli) = handle_cli_args() else {
        return Ok(());
    };

    better_panic::install();

    tui_logger::init_logger(log::LevelFilter::Trace)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    let mut settings = AppSettings::load();
    settings.admin |= cli.admin;

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    let client = BattlesnakeApi::with_base_url(&settings.api_base);
    info!("using tournament service at {}", client.base_url());
    let app = Arc::new(Mutex::new(App::new(settings, network_req_tx.clone())));

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Load players and the remembered tournament on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();

    Ok(())
}

struct CliArgs {
    admin: bool,
}

/// Returns `None` when the process should exit without starting the UI.
fn handle_cli_args() -> Option<CliArgs> {
    let mut cli = CliArgs { admin: false };
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", usage_text());
                return None;
            }
            "-V" | "--version" => {
                println!("snakebracket {}", env!("CARGO_PKG_VERSION"));
                return None;
            }
            "--admin" => cli.admin = true,
            _ => {
                eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
                std::process::exit(2);
            }
        }
    }
    Some(cli)
}

fn usage_text() -> &'static str {
    "snakebracket - Battlesnake tournament bracket viewer

Usage:
  snakebracket [--admin]
  snakebracket --help
  snakebracket --version

Options:
  --admin   Start with tournament controls unlocked

Environment:
  SNAKEBRACKET_API          Tournament service base URL (default https://bs-api.desperate.dk/api)
  SNAKEBRACKET_POLL_SECS    Seconds between refreshes while a round is running (default 5)
  SNAKEBRACKET_STATE_FILE   Where the last tournament id is remembered
  SNAKEBRACKET_SPACING      Bracket layout: uniform or midpoint (default uniform)
  SNAKEBRACKET_LOG          Log level: error, warn, info, debug, trace (default info)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            else => break,
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let requests = app.lock().await.startup_requests();
            dispatch(network_requests, requests).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    if let NetworkResponse::LoadingStateChanged { loading_state } = response {
        *loading = loading_state;
        return true;
    }
    if let NetworkResponse::Failed { operation, message } = &response {
        error!("{}: {message}", operation.failure_label());
    }

    let follow_up = app.lock().await.on_network_response(response);
    dispatch(network_requests, follow_up).await;
    !loading.is_loading
}

async fn dispatch(network_requests: &mpsc::Sender<NetworkRequest>, requests: Vec<NetworkRequest>) {
    for request in requests {
        if network_requests.send(request).await.is_err() {
            error!("network worker is gone, dropping request");
            break;
        }
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    Some(UiEvent::KeyPressed(key_event))
                }
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
