//! Reusable UI components.

pub mod alert;
pub mod deposit_list;
pub mod status_bar;
