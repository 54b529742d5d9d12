//! Header and issue tree rendering.

use super::icons;
use super::layout::fit_line_to_width;
use super::status::StatusConfigurable;
use crate::tui::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Draw the header: app title, loading spinner, and the filter line.
pub fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        " treetop ",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    if app.is_loading {
        spans.push(Span::styled(
            format!("{} fetching… ", app.spinner_char()),
            Style::default().fg(Color::Yellow),
        ));
    } else if let Some(at) = app.last_refresh {
        spans.push(Span::styled(
            format!("refreshed {} ", at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if app.filter_entry || app.tree.filter_active() {
        let label = if app.search_all { "search" } else { "filter" };
        spans.push(Span::styled(
            format!("│ {label}: "),
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::styled(
            app.tree.filter.clone(),
            Style::default().fg(Color::Yellow),
        ));
        if app.filter_entry {
            spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
        }
    }

    let block = Block::default().borders(Borders::BOTTOM);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(fit_line_to_width(Line::from(spans), inner.width as usize)),
        inner,
    );
}

/// Draw the visible tree rows with cursor highlight and scrolling.
pub fn draw_tree(f: &mut Frame, app: &App, area: Rect) {
    let height = area.height as usize;
    let width = area.width as usize;
    if height == 0 || width == 0 {
        return;
    }

    if app.rows.is_empty() {
        let text = if app.tree.filter_active() {
            "  no issues match the filter"
        } else if app.is_loading {
            "  loading…"
        } else {
            "  no issues"
        };
        f.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray))),
            area,
        );
        return;
    }

    // Keep the cursor inside the viewport.
    let offset = if app.tree.cursor < height {
        0
    } else {
        app.tree.cursor + 1 - height
    };

    let lines: Vec<Line> = app
        .rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, row)| {
            let line = render_row(app, row, i == app.tree.cursor);
            fit_line_to_width(line, width)
        })
        .collect();

    f.render_widget(Paragraph::new(lines), area);
}

fn render_row<'a>(app: &'a App, row: &crate::engine::VisibleRow, selected: bool) -> Line<'a> {
    let node = app.forest.node(row.node);
    let record = &node.record;

    let mut spans: Vec<Span> = Vec::new();
    spans.push(Span::raw("  ".repeat(row.depth + 1)));

    let marker = if !row.has_children {
        icons::LEAF
    } else if row.expanded {
        icons::EXPANDED
    } else {
        icons::COLLAPSED
    };
    spans.push(Span::styled(
        format!("{marker} "),
        Style::default().fg(Color::DarkGray),
    ));

    let status = record.status.status_config();
    spans.push(Span::styled(format!("{} ", status.icon), status.style));

    spans.push(Span::styled(
        format!("{} ", record.id),
        Style::default().fg(Color::DarkGray),
    ));

    let title_style = if record.status.is_terminal() {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(Color::White)
    };
    spans.push(Span::styled(record.title.clone(), title_style));

    if !row.expanded && row.has_children {
        let count = node.children.len();
        spans.push(Span::styled(
            format!(" [{count}]"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if row.hidden_children > 0 {
        spans.push(Span::styled(
            format!(" (+{} hidden)", row.hidden_children),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if node.blocked_by_unresolved {
        spans.push(Span::styled(
            format!(" {}", icons::FLAG_BLOCKED),
            Style::default().fg(Color::Red),
        ));
    }
    if node.has_active_descendant && !record.is_active() {
        spans.push(Span::styled(
            format!(" {}", icons::FLAG_ACTIVE),
            Style::default().fg(Color::Green),
        ));
    }
    if node.has_ready_descendant && !node.is_ready() {
        spans.push(Span::styled(
            format!(" {}", icons::FLAG_READY),
            Style::default().fg(Color::Cyan),
        ));
    }

    let mut line = Line::from(spans);
    if selected {
        line.style = Style::default().add_modifier(Modifier::REVERSED);
    }
    line
}
