//! Status bar component.

use std::time::Duration;

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::poller::PollerState;
use crate::tui::app::App;

/// Renders the status bar.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let (poll_label, poll_color) = match app.poller.state() {
        PollerState::Running => (
            format!(" Polling {} ", period_label(app.poller.period())),
            Color::Green,
        ),
        PollerState::Stopped => (" Stopped ".to_string(), Color::Yellow),
    };

    let user_span = match app.session.username() {
        Some(name) => Span::styled(format!(" {name} "), Style::default().fg(Color::Cyan)),
        None if app.session.has_session() => {
            Span::styled(" Signed in ", Style::default().fg(Color::Cyan))
        }
        None => Span::styled(" Signed out ", Style::default().fg(Color::DarkGray)),
    };

    let refresh_span = match app.last_refresh {
        Some(at) => Span::raw(format!(" Updated {} ", at.format("%H:%M:%S"))),
        None => Span::styled(" Not updated ", Style::default().fg(Color::DarkGray)),
    };

    let notice_span = match app.notice {
        Some(ref notice) => Span::styled(
            format!(" {} ", notice.message),
            Style::default().fg(Color::White),
        ),
        None if app.busy => Span::styled(" Working... ", Style::default().fg(Color::Yellow)),
        None => Span::raw(""),
    };

    let line = Line::from(vec![
        Span::styled(poll_label, Style::default().fg(poll_color)),
        Span::raw("│"),
        user_span,
        Span::raw("│"),
        refresh_span,
        Span::raw("│"),
        notice_span,
    ]);

    let para = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(para, area);
}

/// Whole seconds as `5s`, anything finer as `1500ms`.
fn period_label(period: Duration) -> String {
    let millis = period.as_millis();
    if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{millis}ms")
    }
}
