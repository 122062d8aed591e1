//! Full-screen layouts, one per [`Screen`](crate::tui::app::Screen).

pub mod auth;
pub mod deposit;
