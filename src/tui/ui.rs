//! Main UI rendering coordinator.

use ratatui::Frame;

use super::app::{App, Screen};
use super::components::alert;
use super::screens::{auth, deposit};

/// Renders the entire application UI.
pub fn render(frame: &mut Frame, app: &App) {
    match app.screen() {
        Screen::Auth => auth::render(frame, app),
        Screen::Deposit => deposit::render(frame, app),
    }

    if let Some(ref pending_alert) = app.alert {
        alert::render(frame, pending_alert);
    }
}
