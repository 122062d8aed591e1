//! Executes the [`Action`]s produced by [`update`](crate::tui::update).
//!
//! Network actions are spawned as one-shot tokio tasks that report back on
//! the message channel, stamped with the session epoch and selection they
//! were issued under. Timer and file actions run inline.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::Result;
use crate::api::ApiClient;
use crate::models::DepositAddress;
use crate::tui::{Action, AddressRequest, App, Message};

/// Runs actions against the backend and the poller.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    api: ApiClient,
    tx: mpsc::UnboundedSender<Message>,
    /// Directory QR codes are exported to.
    export_dir: PathBuf,
}

impl Dispatcher {
    pub fn new(api: ApiClient, tx: mpsc::UnboundedSender<Message>, export_dir: PathBuf) -> Self {
        Self {
            api,
            tx,
            export_dir,
        }
    }

    /// Runs every action in order.
    pub fn dispatch_all(&self, app: &mut App, actions: Vec<Action>) {
        for action in actions {
            self.dispatch(app, action);
        }
    }

    /// Runs a single action.
    pub fn dispatch(&self, app: &mut App, action: Action) {
        match action {
            Action::StartPolling => app.poller.start(self.tx.clone()),
            Action::StopPolling => app.poller.stop(),
            Action::Login { username, password } => {
                let api = self.api.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = api.login(&username, &password).await;
                    let _ = tx.send(Message::LoginFinished(result));
                });
            }
            Action::Register {
                username,
                email,
                password,
            } => {
                let api = self.api.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = api.register(&username, &email, &password).await;
                    let _ = tx.send(Message::RegisterFinished(result));
                });
            }
            Action::LoadAddress(request) => self.load_address(app, request),
            Action::FetchDeposits => self.fetch_deposits(app),
            Action::ExportQr => {
                let exported = app
                    .address
                    .as_ref()
                    .map(|address| export_qr(address, &self.export_dir));
                match exported {
                    Some(Ok(path)) => {
                        app.show_notice(format!("QR code saved to {}", path.display()))
                    }
                    Some(Err(e)) => app.show_alert("QR export failed", e.to_string()),
                    None => app.show_notice("No deposit address to export"),
                }
            }
        }
    }

    fn load_address(&self, app: &mut App, request: AddressRequest) {
        let Some(token) = app.session.credential().map(|t| Zeroizing::new(t.to_string())) else {
            app.busy = false;
            return;
        };
        let api = self.api.clone();
        let tx = self.tx.clone();
        let selection = app.selection.clone();
        let epoch = app.session.epoch();

        tokio::spawn(async move {
            let result = match request {
                AddressRequest::Current => api.current_address(&token, &selection).await,
                AddressRequest::Ensure => api.get_or_create_address(&token, &selection).await,
                AddressRequest::Rotate => api.refresh_address(&token, &selection).await,
            };
            let _ = tx.send(Message::AddressLoaded {
                request,
                epoch,
                selection,
                result,
            });
        });
    }

    /// Fetches pending deposits and history concurrently. Each list is
    /// applied independently when its response arrives.
    fn fetch_deposits(&self, app: &App) {
        let Some(token) = app.session.credential() else {
            return;
        };
        let epoch = app.session.epoch();

        let api = self.api.clone();
        let tx = self.tx.clone();
        let pending_token = Zeroizing::new(token.to_string());
        tokio::spawn(async move {
            let result = api.pending_deposits(&pending_token).await;
            let _ = tx.send(Message::PendingLoaded { epoch, result });
        });

        let api = self.api.clone();
        let tx = self.tx.clone();
        let history_token = Zeroizing::new(token.to_string());
        tokio::spawn(async move {
            let result = api.deposit_history(&history_token).await;
            let _ = tx.send(Message::HistoryLoaded { epoch, result });
        });
    }
}

/// Writes the address QR code to `<dir>/<address>.png`.
///
/// # Errors
///
/// Returns an error if the address has no PNG QR code or the file cannot
/// be written.
pub fn export_qr(address: &DepositAddress, dir: &Path) -> Result<PathBuf> {
    let png = address.qr_png()?;
    let path = dir.join(format!("{}.png", address.address));
    std::fs::write(&path, png).map_err(|e| {
        warn!(path = %path.display(), error = %e, "failed to write QR code");
        e
    })?;
    info!(path = %path.display(), "exported QR code");
    Ok(path)
}
