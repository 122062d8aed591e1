//! Deposit screen: address panel, asset selector and the two lists.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::tui::app::App;
use crate::tui::components::deposit_list::{self, ListKind};
use crate::tui::components::status_bar;

/// Renders the deposit screen.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let address_height = if app.address.is_some() { 5 } else { 0 };
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),              // Status bar
            Constraint::Length(1),              // Asset selector
            Constraint::Length(address_height), // Address panel
            Constraint::Percentage(50),         // Pending deposits
            Constraint::Min(6),                 // History
            Constraint::Length(1),              // Keybindings help
        ])
        .split(area);

    status_bar::render(frame, main_layout[0], app);
    render_selector(frame, main_layout[1], app);
    render_address(frame, main_layout[2], app);

    deposit_list::render(
        frame,
        main_layout[3],
        "Pending Deposits",
        ListKind::Pending,
        &app.pending_view(),
    );
    deposit_list::render(
        frame,
        main_layout[4],
        "Deposit History",
        ListKind::History,
        &app.history_view(),
    );

    render_keybindings(frame, main_layout[5]);
}

/// Renders the chain / asset selector line.
fn render_selector(frame: &mut Frame, area: Rect, app: &App) {
    let line = Line::from(vec![
        Span::raw(" Chain: "),
        Span::styled(
            app.selection.chain.label(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("   Asset: "),
        Span::styled(
            app.asset_label(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]);

    let para = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(para, area);
}

/// Renders the deposit address panel. Hidden when no address is loaded.
fn render_address(frame: &mut Frame, area: Rect, app: &App) {
    let Some(ref address) = app.address else {
        return;
    };

    let block = Block::default()
        .title(" Deposit Address ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let qr_hint = if address.qr_code_data.is_some() {
        "[x] save QR code"
    } else {
        "No QR code"
    };
    let text = vec![
        Line::from(Span::styled(
            address.address.as_str(),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::raw(format!("{} on {}  ", app.asset_label(), address.chain.label())),
            Span::styled(qr_hint, Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(Span::styled(
            "Only send this asset on this chain to the address above.",
            Style::default().fg(Color::Yellow),
        )),
    ];

    let para = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(para, area);
}

fn render_keybindings(frame: &mut Frame, area: Rect) {
    let help = "[g]et address [r]new address [c]hain [t]oken [x]QR [f]refresh [L]logout [q]quit";

    let para = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(para, area);
}
