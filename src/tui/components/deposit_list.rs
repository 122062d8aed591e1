//! Deposit table component shared by the pending and history panels.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::view::{DepositListView, DepositRow};

/// Columns that differ between the two lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListKind {
    Pending,
    History,
}

/// Renders a deposit list inside a titled block.
pub fn render(frame: &mut Frame, area: Rect, title: &str, kind: ListKind, view: &DepositListView) {
    let block = Block::default()
        .title(format!(" {title} ({}) ", view.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let rows = match view {
        DepositListView::Empty(placeholder) => {
            let para = Paragraph::new(*placeholder)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(para, area);
            return;
        }
        DepositListView::Rows(rows) => rows,
    };

    let (header, widths) = match kind {
        ListKind::Pending => (
            vec!["Amount", "Status", "Tx Hash", "Conf", "Block", "Created", "Explorer"],
            vec![
                Constraint::Length(24),
                Constraint::Length(12),
                Constraint::Length(24),
                Constraint::Length(7),
                Constraint::Length(10),
                Constraint::Length(19),
                Constraint::Min(8),
            ],
        ),
        ListKind::History => (
            vec![
                "Amount",
                "Status",
                "Tx Hash",
                "Conf",
                "Block",
                "Created",
                "Completed",
                "Explorer",
            ],
            vec![
                Constraint::Length(24),
                Constraint::Length(12),
                Constraint::Length(24),
                Constraint::Length(7),
                Constraint::Length(10),
                Constraint::Length(19),
                Constraint::Length(19),
                Constraint::Min(8),
            ],
        ),
    };
    let header = Row::new(header).style(
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::BOLD),
    );

    let table = Table::new(rows.iter().map(|row| table_row(row, kind)), widths)
        .header(header)
        .block(block)
        .column_spacing(1);
    frame.render_widget(table, area);
}

fn table_row(row: &DepositRow, kind: ListKind) -> Row<'_> {
    let status = Cell::from(Span::styled(
        row.status_caption.as_str(),
        Style::default()
            .fg(Color::Black)
            .bg(badge_color(&row.status_class)),
    ));
    let explorer = match row.explorer_url.as_deref() {
        Some(url) => Cell::from(Span::styled(
            url,
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
        )),
        None => Cell::from(Span::styled("No link", Style::default().fg(Color::DarkGray))),
    };

    let mut cells = vec![
        Cell::from(row.amount.as_str()),
        status,
        Cell::from(row.tx_hash.as_str()),
        Cell::from(row.confirmations.as_str()),
        Cell::from(row.block.as_str()),
        Cell::from(row.created.as_str()),
    ];
    if kind == ListKind::History {
        cells.push(Cell::from(row.completed.as_deref().unwrap_or_default()));
    }
    cells.push(explorer);
    Row::new(cells)
}

/// Badge background for a lower-case status class.
fn badge_color(status_class: &str) -> Color {
    match status_class {
        "pending" => Color::Yellow,
        "confirming" => Color::LightBlue,
        "confirmed" => Color::Cyan,
        "credited" => Color::Green,
        "failed" => Color::Red,
        _ => Color::Gray,
    }
}
