//! Deposit console for a custodial wallet backend.
//!
//! Signs a depositor in, shows the deposit address for the selected chain
//! and asset, and keeps the pending and completed deposit lists fresh by
//! polling the backend while a session is active.

pub mod api;
pub mod assets;
pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod poller;
pub mod runtime;
pub mod session;
pub mod tls;
pub mod tui;
pub mod view;

pub use error::{Result, TidewatchError};
