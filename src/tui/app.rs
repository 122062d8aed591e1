//! Application state for the TUI.
//!
//! [`App`] is owned by the control loop and is the only mutable state in
//! the program. Network results arrive as messages and replace snapshots
//! wholesale; nothing is patched incrementally.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use crate::config::DisplayConfig;
use crate::format::AmountFormatter;
use crate::models::{DepositAddress, DepositRecord, Selection};
use crate::poller::Poller;
use crate::session::SessionStore;
use crate::tui::input::TextInput;
use crate::view::{self, DepositListView, RenderContext};

/// How long a status-bar notice stays visible.
const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Central application state container.
pub struct App {
    // -- Session --
    pub session: SessionStore,
    /// Background deposit refresh timer.
    pub poller: Poller,

    // -- Deposit State --
    /// Chain and asset addresses are requested for.
    pub selection: Selection,
    /// Address shown in the address panel; `None` hides the panel.
    pub address: Option<DepositAddress>,
    /// Latest successful pending-deposit snapshot.
    pub pending: Vec<DepositRecord>,
    /// Latest successful history snapshot.
    pub history: Vec<DepositRecord>,
    /// When the last snapshot arrived.
    pub last_refresh: Option<DateTime<Local>>,

    // -- Presentation --
    pub formatter: AmountFormatter,
    pub display: DisplayConfig,

    // -- UI State --
    pub auth_form: AuthForm,
    /// Modal alert; blocks input until dismissed.
    pub alert: Option<Alert>,
    /// Transient status-bar message.
    pub notice: Option<Notice>,
    /// An explicit request is in flight.
    pub busy: bool,

    // -- Internal --
    /// Flag to signal application should quit.
    pub should_quit: bool,
}

impl App {
    /// Creates the application state around a restored session.
    pub fn new(
        session: SessionStore,
        poller: Poller,
        formatter: AmountFormatter,
        display: DisplayConfig,
    ) -> Self {
        Self {
            session,
            poller,
            selection: Selection::default(),
            address: None,
            pending: Vec::new(),
            history: Vec::new(),
            last_refresh: None,
            formatter,
            display,
            auth_form: AuthForm::default(),
            alert: None,
            notice: None,
            busy: false,
            should_quit: false,
        }
    }

    /// Returns the screen to show; the deposit screen requires a session.
    pub fn screen(&self) -> Screen {
        if self.session.has_session() {
            Screen::Deposit
        } else {
            Screen::Auth
        }
    }

    /// Shows a blocking alert.
    pub fn show_alert(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.alert = Some(Alert {
            title: title.into(),
            message: message.into(),
        });
    }

    /// Shows a transient notice in the status bar.
    pub fn show_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice {
            message: message.into(),
            timestamp: Instant::now(),
        });
    }

    /// Clears notices older than five seconds.
    pub fn clear_stale_notice(&mut self) {
        if let Some(ref notice) = self.notice
            && notice.timestamp.elapsed() > NOTICE_TTL
        {
            self.notice = None;
        }
    }

    /// Forgets every deposit-related value. Used on logout.
    pub fn reset_deposits(&mut self) {
        self.address = None;
        self.pending.clear();
        self.history.clear();
        self.last_refresh = None;
    }

    /// Moves to the next token in the registry, wrapping back to native.
    pub fn cycle_token(&mut self) {
        let tokens = self.formatter.assets().tokens();
        let next = match &self.selection.token {
            None => tokens.first(),
            Some(current) => tokens
                .iter()
                .position(|t| t.address.eq_ignore_ascii_case(current))
                .and_then(|pos| tokens.get(pos + 1)),
        };
        self.selection.token = next.map(|t| t.address.clone());
    }

    /// Display label of the selected asset.
    pub fn asset_label(&self) -> String {
        self.formatter.assets().label(self.selection.token.as_deref())
    }

    fn render_context(&self) -> RenderContext<'_> {
        RenderContext {
            formatter: &self.formatter,
            confirmation_target: self.display.confirmation_target,
        }
    }

    /// Builds the pending list from the current snapshot.
    pub fn pending_view(&self) -> DepositListView {
        view::pending_list(&self.pending, self.render_context())
    }

    /// Builds the history list from the current snapshot.
    pub fn history_view(&self) -> DepositListView {
        view::history_list(&self.history, self.render_context())
    }
}

/// Top-level screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Login / registration forms.
    Auth,
    /// Address panel and deposit lists.
    Deposit,
}

/// Which auth form is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

/// Fields of the auth forms, in tab order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthField {
    #[default]
    Username,
    Email,
    Password,
}

/// Login and registration form state.
#[derive(Clone, Debug, Default)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub focus: AuthField,
    pub username: TextInput,
    pub email: TextInput,
    pub password: TextInput,
}

impl AuthForm {
    /// Fields visible in the current mode.
    pub fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            AuthMode::Login => &[AuthField::Username, AuthField::Password],
            AuthMode::Register => &[AuthField::Username, AuthField::Email, AuthField::Password],
        }
    }

    /// Moves focus forward (or backward) through the visible fields.
    pub fn cycle_focus(&mut self, backward: bool) {
        let fields = self.fields();
        let pos = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if backward {
            pos.checked_sub(1).unwrap_or(fields.len() - 1)
        } else {
            (pos + 1) % fields.len()
        };
        self.focus = fields[next];
    }

    /// Switches between login and registration.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.focus = AuthField::Username;
        self.password.clear();
    }

    /// Returns the input that has focus.
    pub fn focused_input(&mut self) -> &mut TextInput {
        match self.focus {
            AuthField::Username => &mut self.username,
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
        }
    }
}

/// Modal alert contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

/// Status-bar message with timestamp for auto-clear.
#[derive(Clone, Debug)]
pub struct Notice {
    pub message: String,
    pub timestamp: Instant,
}
