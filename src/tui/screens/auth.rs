//! Login and registration screen.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::tui::app::{App, AuthField, AuthMode};
use crate::tui::components::status_bar;

/// Renders the auth screen.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status bar
            Constraint::Min(12),   // Form
            Constraint::Length(1), // Keybindings help
        ])
        .split(area);

    status_bar::render(frame, main_layout[0], app);
    render_form(frame, main_layout[1], app);
    render_keybindings(frame, main_layout[2], app);
}

fn render_form(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.auth_form;
    let fields = form.fields();

    let height = fields.len() as u16 * 3 + 4;
    let [column] = Layout::horizontal([Constraint::Length(50_u16.min(area.width))])
        .flex(Flex::Center)
        .areas(area);
    let [form_area] = Layout::vertical([Constraint::Length(height.min(column.height))])
        .flex(Flex::Center)
        .areas(column);

    let title = match form.mode {
        AuthMode::Login => " Sign in ",
        AuthMode::Register => " Create account ",
    };
    let block = Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(form_area);
    frame.render_widget(block, form_area);

    let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Length(1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(inner);

    for (field, row) in fields.iter().zip(rows.iter()) {
        render_field(frame, *row, app, *field);
    }

    let submit = match (form.mode, app.busy) {
        (_, true) => "Please wait...",
        (AuthMode::Login, false) => "[Enter] Login",
        (AuthMode::Register, false) => "[Enter] Register",
    };
    if let Some(row) = rows.last() {
        let para = Paragraph::new(Line::from(Span::styled(
            submit,
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(para, *row);
    }
}

fn render_field(frame: &mut Frame, area: Rect, app: &App, field: AuthField) {
    let form = &app.auth_form;
    let (label, input, secret) = match field {
        AuthField::Username => (" Username ", &form.username, false),
        AuthField::Email => (" Email ", &form.email, false),
        AuthField::Password => (" Password ", &form.password, true),
    };
    let is_focused = form.focus == field && app.alert.is_none();

    let border_style = if is_focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .title(label)
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    frame.render_widget(Paragraph::new(input.display(secret)), inner);

    if is_focused {
        let cursor_x = inner.x + input.cursor_column(secret).min(inner.width.saturating_sub(1));
        frame.set_cursor_position((cursor_x, inner.y));
    }
}

fn render_keybindings(frame: &mut Frame, area: Rect, app: &App) {
    let help = match app.auth_form.mode {
        AuthMode::Login => "[Tab]next field [Enter]login [Ctrl-R]create account [Esc]quit",
        AuthMode::Register => "[Tab]next field [Enter]register [Ctrl-R]back to login [Esc]quit",
    };

    let para = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(para, area);
}
