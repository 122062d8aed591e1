//! Terminal user interface for the deposit console.
//!
//! A Ratatui front end with two screens: sign-in and the deposit view
//! (address panel plus pending and history lists).

pub mod app;
pub mod components;
pub mod event;
pub mod input;
pub mod screens;
pub mod terminal;
pub mod ui;

pub use app::App;
pub use event::{Action, AddressRequest, Event, Message, update};
pub use terminal::{Tui, install_panic_hook, restore_terminal, setup_terminal};
pub use ui::render;
