//! Event handling for the TUI.
//!
//! Terminal input, poller ticks and finished network requests all arrive
//! as [`Message`]s on one channel. [`update`] applies a message to the
//! [`App`] and returns the [`Action`]s that need I/O; the runtime executes
//! those and reports back with further messages.

use std::time::Duration;

use chrono::Local;
use crossterm::event::{
    Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::Result;
use crate::models::{DepositAddress, DepositRecord, LoginResponse, Selection};

use super::app::{App, AuthField, AuthMode, Screen};

/// Events that can occur in the terminal.
#[derive(Debug)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// Terminal was resized.
    Resize(u16, u16),
    /// Periodic tick for UI housekeeping.
    Tick,
}

/// The three ways of obtaining a deposit address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressRequest {
    /// Best-effort lookup of an already assigned address. Silent on failure.
    Current,
    /// Explicit get-or-create.
    Ensure,
    /// Explicit rotation to a fresh address.
    Rotate,
}

impl AddressRequest {
    /// Background requests never alert.
    pub fn is_background(self) -> bool {
        matches!(self, Self::Current)
    }

    fn failure_title(self) -> &'static str {
        match self {
            Self::Current | Self::Ensure => "Failed to get deposit address",
            Self::Rotate => "Failed to refresh address",
        }
    }
}

/// Messages that update application state.
#[derive(Debug)]
pub enum Message {
    /// Input event from terminal.
    Input(Event),
    /// Deposit refresh tick, stamped with the poller generation.
    PollTick(u64),

    /// Login request finished.
    LoginFinished(Result<LoginResponse>),
    /// Registration request finished.
    RegisterFinished(Result<()>),
    /// Address request finished.
    AddressLoaded {
        request: AddressRequest,
        /// Session epoch the request was issued under.
        epoch: u64,
        /// Selection the request was issued for.
        selection: Selection,
        result: Result<DepositAddress>,
    },
    /// Pending-deposit fetch finished.
    PendingLoaded {
        epoch: u64,
        result: Result<Vec<DepositRecord>>,
    },
    /// History fetch finished.
    HistoryLoaded {
        epoch: u64,
        result: Result<Vec<DepositRecord>>,
    },
}

/// Actions that require external handling (network, timers, files).
pub enum Action {
    Login {
        username: String,
        password: Zeroizing<String>,
    },
    Register {
        username: String,
        email: String,
        password: Zeroizing<String>,
    },
    /// Request an address for the current selection.
    LoadAddress(AddressRequest),
    /// Fetch pending deposits and history once, right now.
    FetchDeposits,
    StartPolling,
    StopPolling,
    /// Write the current address QR code to disk.
    ExportQr,
}

/// Spawns a task that forwards terminal events to a channel.
pub fn spawn_event_reader(tx: mpsc::UnboundedSender<Message>) {
    tokio::spawn(async move {
        let mut events = EventStream::new();
        while let Some(event) = events.next().await {
            let message = match event {
                Ok(CrosstermEvent::Key(key)) => Message::Input(Event::Key(key)),
                Ok(CrosstermEvent::Resize(w, h)) => Message::Input(Event::Resize(w, h)),
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, "terminal event stream failed");
                    break;
                }
            };
            if tx.send(message).is_err() {
                break;
            }
        }
    });
}

/// Spawns a task that sends periodic UI tick events.
pub fn spawn_tick_timer(tx: mpsc::UnboundedSender<Message>, interval_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
        loop {
            interval.tick().await;
            if tx.send(Message::Input(Event::Tick)).is_err() {
                break;
            }
        }
    });
}

/// Updates application state based on a message.
pub fn update(app: &mut App, message: Message) -> Vec<Action> {
    match message {
        Message::Input(event) => handle_input(app, event),
        Message::PollTick(generation) => {
            if !app.poller.accepts(generation) {
                debug!(generation, "dropping stale poll tick");
                return Vec::new();
            }
            if app.session.has_session() && app.session.active_address().is_some() {
                vec![Action::FetchDeposits]
            } else {
                Vec::new()
            }
        }
        Message::LoginFinished(Ok(response)) => {
            app.busy = false;
            app.auth_form.password.clear();
            app.reset_deposits();
            if let Err(e) = app.session.set_session(&response.token, &response.username) {
                warn!(error = %e, "session token not persisted");
                app.show_notice("Signed in, but the session will not survive a restart");
            }
            vec![Action::StartPolling, Action::LoadAddress(AddressRequest::Current)]
        }
        Message::LoginFinished(Err(e)) => {
            app.busy = false;
            app.show_alert("Login failed", e.to_string());
            Vec::new()
        }
        Message::RegisterFinished(Ok(())) => {
            app.busy = false;
            app.auth_form.mode = AuthMode::Login;
            app.auth_form.focus = AuthField::Username;
            app.auth_form.password.clear();
            app.show_notice("Registration successful, please log in");
            Vec::new()
        }
        Message::RegisterFinished(Err(e)) => {
            app.busy = false;
            app.show_alert("Registration failed", e.to_string());
            Vec::new()
        }
        Message::AddressLoaded {
            request,
            epoch,
            selection,
            result,
        } => handle_address(app, request, epoch, selection, result),
        Message::PendingLoaded { epoch, result } => {
            if epoch != app.session.epoch() {
                return Vec::new();
            }
            match result {
                Ok(records) => {
                    app.pending = records;
                    app.last_refresh = Some(Local::now());
                }
                Err(e) => warn!(error = %e, "failed to load pending deposits"),
            }
            Vec::new()
        }
        Message::HistoryLoaded { epoch, result } => {
            if epoch != app.session.epoch() {
                return Vec::new();
            }
            match result {
                Ok(records) => {
                    app.history = records;
                    app.last_refresh = Some(Local::now());
                }
                Err(e) => warn!(error = %e, "failed to load deposit history"),
            }
            Vec::new()
        }
    }
}

/// Applies a finished address request.
fn handle_address(
    app: &mut App,
    request: AddressRequest,
    epoch: u64,
    selection: Selection,
    result: Result<DepositAddress>,
) -> Vec<Action> {
    if epoch != app.session.epoch() {
        debug!(?request, "dropping address response from a previous session");
        return Vec::new();
    }
    if !request.is_background() {
        app.busy = false;
    }
    if selection != app.selection {
        debug!(?request, "dropping address response for an outdated selection");
        return Vec::new();
    }

    match result {
        Ok(address) => {
            info!(address = %address.address, chain = address.chain.as_str(), "deposit address loaded");
            app.session.set_active_address(address.address.clone());
            app.address = Some(address);
            if request == AddressRequest::Rotate {
                app.show_notice("New address generated");
            }
            vec![Action::FetchDeposits]
        }
        Err(e) if request.is_background() => {
            debug!(error = %e, "no current deposit address");
            app.address = None;
            Vec::new()
        }
        Err(e) => {
            app.show_alert(request.failure_title(), e.to_string());
            Vec::new()
        }
    }
}

/// Handles input events and updates application state.
fn handle_input(app: &mut App, event: Event) -> Vec<Action> {
    match event {
        Event::Key(key) => handle_key(app, key),
        Event::Resize(_, _) => Vec::new(),
        Event::Tick => {
            app.clear_stale_notice();
            Vec::new()
        }
    }
}

/// Handles key press events.
fn handle_key(app: &mut App, key: KeyEvent) -> Vec<Action> {
    if key.kind != KeyEventKind::Press {
        return Vec::new();
    }

    // Global keys
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Vec::new();
    }

    // An alert swallows every key until dismissed.
    if app.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.alert = None;
        }
        return Vec::new();
    }

    match app.screen() {
        Screen::Auth => handle_auth_keys(app, key),
        Screen::Deposit => handle_deposit_keys(app, key),
    }
}

/// Handles keys on the login / registration screen.
fn handle_auth_keys(app: &mut App, key: KeyEvent) -> Vec<Action> {
    let form = &mut app.auth_form;
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            form.toggle_mode();
        }
        KeyCode::Tab | KeyCode::Down => form.cycle_focus(false),
        KeyCode::BackTab | KeyCode::Up => form.cycle_focus(true),
        KeyCode::Enter => return submit_auth(app),
        KeyCode::Char(c) => form.focused_input().insert(c),
        KeyCode::Backspace => form.focused_input().backspace(),
        KeyCode::Delete => form.focused_input().delete(),
        KeyCode::Left => form.focused_input().move_left(),
        KeyCode::Right => form.focused_input().move_right(),
        KeyCode::Home => form.focused_input().move_home(),
        KeyCode::End => form.focused_input().move_end(),
        _ => {}
    }
    Vec::new()
}

/// Validates the auth form and issues a login or registration.
fn submit_auth(app: &mut App) -> Vec<Action> {
    if app.busy {
        return Vec::new();
    }
    let form = &app.auth_form;
    let username = form.username.as_str().trim().to_string();
    let password = Zeroizing::new(form.password.as_str().to_string());

    let action = match form.mode {
        AuthMode::Login => {
            if username.is_empty() || password.is_empty() {
                app.show_notice("Username and password are required");
                return Vec::new();
            }
            Action::Login { username, password }
        }
        AuthMode::Register => {
            let email = form.email.as_str().trim().to_string();
            if username.is_empty() || email.is_empty() || password.is_empty() {
                app.show_notice("Username, email and password are required");
                return Vec::new();
            }
            Action::Register {
                username,
                email,
                password,
            }
        }
    };
    app.busy = true;
    vec![action]
}

/// Handles keys on the deposit screen.
fn handle_deposit_keys(app: &mut App, key: KeyEvent) -> Vec<Action> {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            Vec::new()
        }
        KeyCode::Char('g') => explicit_address(app, AddressRequest::Ensure),
        KeyCode::Char('r') => explicit_address(app, AddressRequest::Rotate),
        KeyCode::Char('c') => {
            app.selection.chain = app.selection.chain.next();
            app.address = None;
            vec![Action::LoadAddress(AddressRequest::Current)]
        }
        KeyCode::Char('t') => {
            app.cycle_token();
            app.address = None;
            vec![Action::LoadAddress(AddressRequest::Current)]
        }
        KeyCode::Char('f') => {
            if app.session.active_address().is_some() {
                vec![Action::FetchDeposits]
            } else {
                app.show_notice("Get a deposit address first");
                Vec::new()
            }
        }
        KeyCode::Char('x') => vec![Action::ExportQr],
        KeyCode::Char('L') => logout(app),
        _ => Vec::new(),
    }
}

fn explicit_address(app: &mut App, request: AddressRequest) -> Vec<Action> {
    if app.busy {
        return Vec::new();
    }
    app.busy = true;
    vec![Action::LoadAddress(request)]
}

/// Ends the session and returns to the auth screen.
fn logout(app: &mut App) -> Vec<Action> {
    if let Err(e) = app.session.clear_session() {
        warn!(error = %e, "failed to remove stored session token");
    }
    app.reset_deposits();
    app.busy = false;
    app.auth_form.password.clear();
    vec![Action::StopPolling]
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::DisplayConfig;
    use crate::format::AmountFormatter;
    use crate::models::{Chain, DepositStatus};
    use crate::poller::Poller;
    use crate::session::{MemoryVault, SessionStore};
    use crate::view::DepositListView;

    fn app_with_session() -> App {
        let session = SessionStore::restore(Box::new(MemoryVault::with_token("jwt")));
        App::new(
            session,
            Poller::new(Duration::from_secs(5)),
            AmountFormatter::default(),
            DisplayConfig::default(),
        )
    }

    fn app_without_session() -> App {
        let session = SessionStore::restore(Box::new(MemoryVault::default()));
        App::new(
            session,
            Poller::new(Duration::from_secs(5)),
            AmountFormatter::default(),
            DisplayConfig::default(),
        )
    }

    fn address(addr: &str) -> DepositAddress {
        DepositAddress {
            address: addr.to_string(),
            chain: Chain::Sepolia,
            token_address: None,
            qr_code_data: None,
        }
    }

    fn record(id: &str, status: DepositStatus) -> DepositRecord {
        DepositRecord {
            id: id.to_string(),
            transaction_hash: format!("0x{id}"),
            wallet_address: None,
            amount: "1000000000000000000".to_string(),
            token_address: None,
            status,
            confirmations: 0,
            block_number: None,
            created_at: "2024-01-15T10:30:00".to_string(),
            processed_at: None,
            explorer_url: None,
        }
    }

    fn key(code: KeyCode) -> Message {
        Message::Input(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn loaded(app: &App, request: AddressRequest, result: Result<DepositAddress>) -> Message {
        Message::AddressLoaded {
            request,
            epoch: app.session.epoch(),
            selection: app.selection.clone(),
            result,
        }
    }

    fn api_error(message: &str) -> crate::TidewatchError {
        crate::TidewatchError::Api {
            status: 400,
            message: message.to_string(),
        }
    }

    #[test]
    fn rotate_replaces_address_and_fetches_immediately() {
        let mut app = app_with_session();
        let msg = loaded(&app, AddressRequest::Ensure, Ok(address("0xold")));
        update(&mut app, msg);

        let msg = loaded(&app, AddressRequest::Rotate, Ok(address("0xnew")));
        let actions = update(&mut app, msg);

        assert_eq!(app.address.as_ref().unwrap().address, "0xnew");
        assert_eq!(app.session.active_address(), Some("0xnew"));
        assert!(matches!(actions.as_slice(), [Action::FetchDeposits]));
        assert!(app.notice.is_some());
        assert!(app.alert.is_none());
    }

    #[test]
    fn background_address_failure_hides_panel_silently() {
        let mut app = app_with_session();
        app.address = Some(address("0xold"));
        let msg = loaded(&app, AddressRequest::Current, Err(api_error("No active wallet")));
        let actions = update(&mut app, msg);

        assert!(actions.is_empty());
        assert!(app.address.is_none());
        assert!(app.alert.is_none());
    }

    #[test]
    fn explicit_address_failure_alerts() {
        let mut app = app_with_session();
        app.busy = true;
        let msg = loaded(&app, AddressRequest::Rotate, Err(api_error("wallet limit")));
        update(&mut app, msg);

        let alert = app.alert.as_ref().unwrap();
        assert_eq!(alert.title, "Failed to refresh address");
        assert_eq!(alert.message, "wallet limit");
        assert!(!app.busy);
    }

    #[test]
    fn address_for_previous_selection_is_dropped() {
        let mut app = app_with_session();
        let msg = Message::AddressLoaded {
            request: AddressRequest::Current,
            epoch: app.session.epoch(),
            selection: Selection::native(Chain::Mainnet),
            result: Ok(address("0xmainnet")),
        };
        assert!(update(&mut app, msg).is_empty());
        assert!(app.address.is_none());
        assert!(app.session.active_address().is_none());
    }

    #[test]
    fn failed_poll_keeps_previous_snapshot() {
        let mut app = app_with_session();
        let epoch = app.session.epoch();
        update(
            &mut app,
            Message::PendingLoaded {
                epoch,
                result: Ok(vec![record("a", DepositStatus::Pending)]),
            },
        );
        update(
            &mut app,
            Message::HistoryLoaded {
                epoch,
                result: Ok(vec![record("b", DepositStatus::Credited)]),
            },
        );
        let before = (app.pending_view(), app.history_view());

        update(
            &mut app,
            Message::PendingLoaded {
                epoch,
                result: Err(api_error("boom")),
            },
        );
        update(
            &mut app,
            Message::HistoryLoaded {
                epoch,
                result: Err(api_error("boom")),
            },
        );

        assert_eq!((app.pending_view(), app.history_view()), before);
        assert!(app.alert.is_none());
    }

    #[test]
    fn snapshots_are_replaced_not_merged() {
        let mut app = app_with_session();
        let epoch = app.session.epoch();
        update(
            &mut app,
            Message::PendingLoaded {
                epoch,
                result: Ok(vec![
                    record("a", DepositStatus::Pending),
                    record("b", DepositStatus::Confirming),
                ]),
            },
        );
        update(
            &mut app,
            Message::PendingLoaded {
                epoch,
                result: Ok(vec![record("c", DepositStatus::Confirmed)]),
            },
        );
        assert_eq!(app.pending.len(), 1);
        assert_eq!(app.pending[0].id, "c");
    }

    #[test]
    fn responses_from_a_previous_session_are_dropped() {
        let mut app = app_with_session();
        let old_epoch = app.session.epoch();
        update(&mut app, key(KeyCode::Char('L')));

        update(
            &mut app,
            Message::PendingLoaded {
                epoch: old_epoch,
                result: Ok(vec![record("a", DepositStatus::Pending)]),
            },
        );
        assert!(app.pending.is_empty());
        assert!(matches!(app.pending_view(), DepositListView::Empty(_)));
    }

    #[test]
    fn tick_without_running_poller_is_ignored() {
        let mut app = app_with_session();
        app.session.set_active_address("0xabc");
        assert!(update(&mut app, Message::PollTick(0)).is_empty());
    }

    #[tokio::test]
    async fn tick_requires_session_and_address() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = app_with_session();
        app.poller.start(tx);

        assert!(update(&mut app, Message::PollTick(1)).is_empty());

        app.session.set_active_address("0xabc");
        let actions = update(&mut app, Message::PollTick(1));
        assert!(matches!(actions.as_slice(), [Action::FetchDeposits]));

        // Tick from an older generation.
        assert!(update(&mut app, Message::PollTick(0)).is_empty());
        app.poller.stop();
    }

    #[tokio::test]
    async fn tick_without_session_is_ignored() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = app_without_session();
        app.poller.start(tx);
        app.session.set_active_address("0xabc");

        assert!(app.poller.accepts(1));
        assert!(update(&mut app, Message::PollTick(1)).is_empty());
        app.poller.stop();
    }

    #[test]
    fn late_address_from_previous_session_keeps_request_in_flight() {
        let mut app = app_with_session();
        update(&mut app, key(KeyCode::Char('r')));
        let old_epoch = app.session.epoch();

        update(&mut app, key(KeyCode::Char('L')));
        app.session.set_session("jwt2", "alice").unwrap();
        let actions = update(&mut app, key(KeyCode::Char('g')));
        assert_eq!(actions.len(), 1);
        assert!(app.busy);

        let selection = app.selection.clone();
        update(
            &mut app,
            Message::AddressLoaded {
                request: AddressRequest::Rotate,
                epoch: old_epoch,
                selection,
                result: Ok(address("0xold")),
            },
        );

        assert!(app.busy);
        assert!(app.address.is_none());
        assert!(update(&mut app, key(KeyCode::Char('r'))).is_empty());
    }

    #[test]
    fn login_success_starts_polling_and_loads_address() {
        let mut app = app_without_session();
        assert_eq!(app.screen(), Screen::Auth);

        let actions = update(
            &mut app,
            Message::LoginFinished(Ok(LoginResponse {
                token: "jwt".to_string(),
                username: "alice".to_string(),
                message: None,
            })),
        );

        assert_eq!(app.screen(), Screen::Deposit);
        assert_eq!(app.session.username(), Some("alice"));
        assert!(matches!(
            actions.as_slice(),
            [
                Action::StartPolling,
                Action::LoadAddress(AddressRequest::Current)
            ]
        ));
    }

    #[test]
    fn login_failure_alerts_and_stays_on_auth() {
        let mut app = app_without_session();
        app.busy = true;
        update(&mut app, Message::LoginFinished(Err(api_error("Invalid credentials"))));
        assert_eq!(app.screen(), Screen::Auth);
        assert_eq!(app.alert.as_ref().unwrap().message, "Invalid credentials");
        assert!(!app.busy);
    }

    #[test]
    fn logout_stops_polling_and_clears_state() {
        let mut app = app_with_session();
        app.session.set_active_address("0xabc");
        app.address = Some(address("0xabc"));
        app.pending = vec![record("a", DepositStatus::Pending)];

        let actions = update(&mut app, key(KeyCode::Char('L')));

        assert!(matches!(actions.as_slice(), [Action::StopPolling]));
        assert_eq!(app.screen(), Screen::Auth);
        assert!(app.address.is_none());
        assert!(app.pending.is_empty());
    }

    #[test]
    fn alert_blocks_keys_until_dismissed() {
        let mut app = app_with_session();
        app.show_alert("Error", "boom");

        assert!(update(&mut app, key(KeyCode::Char('g'))).is_empty());
        assert!(app.alert.is_some());
        assert!(!app.busy);

        update(&mut app, key(KeyCode::Enter));
        assert!(app.alert.is_none());
        let actions = update(&mut app, key(KeyCode::Char('g')));
        assert!(matches!(
            actions.as_slice(),
            [Action::LoadAddress(AddressRequest::Ensure)]
        ));
    }

    #[test]
    fn explicit_requests_do_not_stack() {
        let mut app = app_with_session();
        assert_eq!(update(&mut app, key(KeyCode::Char('r'))).len(), 1);
        assert!(update(&mut app, key(KeyCode::Char('r'))).is_empty());
    }

    #[test]
    fn changing_chain_reloads_address_silently() {
        let mut app = app_with_session();
        app.address = Some(address("0xabc"));
        let actions = update(&mut app, key(KeyCode::Char('c')));
        assert_eq!(app.selection.chain, Chain::Mainnet);
        assert!(app.address.is_none());
        assert!(matches!(
            actions.as_slice(),
            [Action::LoadAddress(AddressRequest::Current)]
        ));
    }

    #[test]
    fn login_form_requires_fields() {
        let mut app = app_without_session();
        for c in "alice".chars() {
            update(&mut app, key(KeyCode::Char(c)));
        }
        assert!(update(&mut app, key(KeyCode::Enter)).is_empty());
        assert!(app.notice.is_some());

        update(&mut app, key(KeyCode::Tab));
        for c in "hunter2".chars() {
            update(&mut app, key(KeyCode::Char(c)));
        }
        let actions = update(&mut app, key(KeyCode::Enter));
        match actions.as_slice() {
            [Action::Login { username, password }] => {
                assert_eq!(username, "alice");
                assert_eq!(password.as_str(), "hunter2");
            }
            _ => panic!("expected a login action"),
        }
        assert!(app.busy);
    }

    #[test]
    fn register_success_returns_to_login() {
        let mut app = app_without_session();
        app.auth_form.toggle_mode();
        app.busy = true;
        update(&mut app, Message::RegisterFinished(Ok(())));
        assert_eq!(app.auth_form.mode, AuthMode::Login);
        assert!(app.alert.is_none());
        assert!(!app.busy);
        assert_eq!(
            app.notice.as_ref().unwrap().message,
            "Registration successful, please log in"
        );
    }
}
