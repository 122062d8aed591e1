use std::fs::OpenOptions;
use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tidewatch::TidewatchError;
use tidewatch::api::ApiClient;
use tidewatch::config::{AppConfig, fetch_config};
use tidewatch::format::AmountFormatter;
use tidewatch::poller::Poller;
use tidewatch::runtime::Dispatcher;
use tidewatch::session::{KeychainVault, MemoryVault, SessionStore, TokenVault};
use tidewatch::tls::build_tls_config;
use tidewatch::tui::event::{spawn_event_reader, spawn_tick_timer};
use tidewatch::tui::{self, Action, AddressRequest, App, Message};

/// UI housekeeping interval.
const UI_TICK_MS: u64 = 250;

#[tokio::main]
async fn main() -> Result<(), TidewatchError> {
    let app_config = fetch_config()?;
    init_logging(&app_config)?;

    let tls_config = build_tls_config(app_config.api.ca_cert.as_deref())?;
    let api = ApiClient::new(app_config.api.base_url.clone(), tls_config)?;
    info!(base_url = api.base_url(), "starting deposit console");

    let vault: Box<dyn TokenVault> = if app_config.use_keychain {
        Box::new(KeychainVault)
    } else {
        Box::new(MemoryVault::default())
    };
    let session = SessionStore::restore(vault);
    let mut app = App::new(
        session,
        Poller::new(app_config.poll_interval),
        AmountFormatter::new(app_config.assets),
        app_config.display,
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let export_dir = std::env::current_dir()?;
    let dispatcher = Dispatcher::new(api, tx.clone(), export_dir);

    // A restored session goes straight to the deposit screen.
    if app.session.has_session() {
        dispatcher.dispatch_all(
            &mut app,
            vec![
                Action::StartPolling,
                Action::LoadAddress(AddressRequest::Current),
            ],
        );
    }

    tui::install_panic_hook();
    let mut terminal = tui::setup_terminal()?;
    spawn_event_reader(tx.clone());
    spawn_tick_timer(tx, UI_TICK_MS);

    let result = run(&mut terminal, &mut app, &dispatcher, &mut rx).await;

    app.poller.stop();
    tui::restore_terminal(&mut terminal)?;
    if let Err(ref e) = result {
        error!(error = %e, "deposit console exited with an error");
    }
    result
}

/// Control loop: draw, wait for a message, apply it, run its actions.
async fn run(
    terminal: &mut tui::Tui,
    app: &mut App,
    dispatcher: &Dispatcher,
    rx: &mut mpsc::UnboundedReceiver<Message>,
) -> Result<(), TidewatchError> {
    terminal.draw(|frame| tui::render(frame, app))?;

    while let Some(message) = rx.recv().await {
        let actions = tui::update(app, message);
        dispatcher.dispatch_all(app, actions);
        if app.should_quit {
            break;
        }
        terminal.draw(|frame| tui::render(frame, app))?;
    }

    info!("deposit console stopped");
    Ok(())
}

/// Sends tracing output to the configured log file, since stdout belongs
/// to the terminal UI. Filtered by `RUST_LOG` (default `info`).
fn init_logging(app_config: &AppConfig) -> Result<(), TidewatchError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&app_config.log_file)
        .map_err(|e| {
            TidewatchError::Config(format!(
                "cannot open log file {}: {e}",
                app_config.log_file.display()
            ))
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
