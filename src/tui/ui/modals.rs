//! Modal popup rendering (help, detail, status menu, text input, delete).

use super::icons;
use super::layout::{fit_lines_to_area, popup_rect, truncate_with_ellipsis};
use super::status::{generate_status_legend, StatusConfigurable};
use crate::data::{IssueRecord, Status};
use crate::tui::app::ModalState;
use crate::tui::App;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn keyboard_shortcuts() -> Vec<&'static str> {
    vec![
        "",
        "  NAVIGATION",
        "  ──────────",
        "  j/k, ↓/↑     Move cursor",
        "  gg / G       Jump to top / bottom",
        "  Ctrl+d/u     Page down / up",
        "",
        "  TREE",
        "  ────",
        "  Space, Tab   Toggle expand (all copies of the issue)",
        "  l / h        Expand-or-descend / collapse-or-ascend",
        "  z            Collapse everything",
        "",
        "  SEARCH",
        "  ──────",
        "  /            Filter by title (ancestors kept for context)",
        "  Ctrl+/       Fuzzy search across id, title, labels",
        "  Enter        Keep the filter applied",
        "  Esc          Clear the filter",
        "",
        "  ISSUES",
        "  ──────",
        "  Enter        Open detail view",
        "  s            Change status",
        "  a / x        Add / remove label",
        "  n / N        New sub-issue / new top-level issue",
        "  b / B        Add / remove a blocking dependency",
        "  D            Delete (asks first)",
        "",
        "  OTHER",
        "  ─────",
        "  r            Refresh now",
        "  ?            This help",
        "  q            Quit",
    ]
}

/// Draw the help popup.
pub fn draw_help_popup(f: &mut Frame) {
    let area = popup_rect(65, 85, 46, 12, f.area());
    f.render_widget(Clear, area);

    let mut lines: Vec<Line> = Vec::new();
    for line in keyboard_shortcuts() {
        lines.push(Line::from(line));
    }
    for line in generate_status_legend() {
        lines.push(Line::from(line));
    }
    lines.push(Line::from(Span::styled(
        "  Esc: close",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    let lines = fit_lines_to_area(lines, inner, 1);
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .style(Style::default().fg(Color::White)),
        area,
    );
}

fn issue_line<'a>(record: &'a IssueRecord, selected: bool) -> Line<'a> {
    let status = record.status.status_config();
    let prefix = if selected {
        Span::styled("  ▸ ", Style::default().fg(Color::Cyan))
    } else {
        Span::raw("    ")
    };
    let mut line = Line::from(vec![
        prefix,
        Span::styled(format!("{} ", status.icon), status.style),
        Span::styled(
            format!("{} ", record.id),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(record.title.as_str()),
    ]);
    if selected {
        line.style = Style::default().add_modifier(Modifier::BOLD);
    }
    line
}

/// Draw the issue detail modal.
pub fn draw_detail_modal(f: &mut Frame, app: &App) {
    let Some(issue) = app.detail_issue() else {
        return;
    };
    let area = popup_rect(75, 85, 50, 14, f.area());
    f.render_widget(Clear, area);

    let status = issue.status.status_config();
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{} ", status.icon), status.style),
        Span::styled(
            issue.title.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(
            format!(
                "{} · {} · {}",
                issue.status.display_name(),
                issue.priority,
                issue.created_at.format("%Y-%m-%d")
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    if !issue.labels.is_empty() {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!("{} {}", icons::ICON_LABELS, issue.labels.join(", ")),
                Style::default().fg(Color::Yellow),
            ),
        ]));
    }

    if let Some(desc) = &issue.description {
        lines.push(Line::from(""));
        for raw in desc.lines() {
            lines.push(Line::from(format!("  {raw}")));
        }
    }

    let children = app.detail_children();
    if !children.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  Sub-issues ({})", children.len()),
            Style::default().fg(Color::Cyan),
        )));
        for (i, child) in children.iter().enumerate() {
            lines.push(issue_line(child, app.detail_child_idx == Some(i)));
        }
    }

    let blockers = app.detail_blockers();
    if !blockers.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {} Blocked by ({})", icons::ICON_BLOCKERS, blockers.len()),
            Style::default().fg(Color::Red),
        )));
        for blocker in &blockers {
            lines.push(issue_line(blocker, false));
        }
    }

    let dependents = app.detail_dependents();
    if !dependents.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {} Blocks ({})", icons::ICON_DEPENDENTS, dependents.len()),
            Style::default().fg(Color::Yellow),
        )));
        for dependent in &dependents {
            lines.push(issue_line(dependent, false));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  j/k: select sub-issue | Enter: open | p: parent | Esc: back",
        Style::default().fg(Color::DarkGray),
    )));

    // Scroll offset, clamped to the content length.
    let skip = app.detail_scroll.min(lines.len().saturating_sub(1));
    let lines: Vec<Line> = lines.into_iter().skip(skip).collect();

    let depth = app.detail_stack.len();
    let title = if depth > 0 {
        format!(" {} (depth {}) ", issue.id, depth)
    } else {
        format!(" {} ", issue.id)
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    let lines = fit_lines_to_area(lines, inner, 1);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Draw the status-change menu.
pub fn draw_status_menu(f: &mut Frame, app: &App) {
    let area = popup_rect(30, 30, 30, 9, f.area());
    f.render_widget(Clear, area);

    let current = app.detail_issue().map(|r| r.status.clone());
    let mut lines: Vec<Line> = vec![Line::from("")];
    for (i, status) in Status::all_known().enumerate() {
        let config = status.status_config();
        let marker = if Some(&status) == current.as_ref() {
            "●"
        } else {
            " "
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", i + 1), Style::default().fg(Color::Cyan)),
            Span::styled(format!("{} ", config.icon), config.style),
            Span::raw(format!("{} ", status.display_name())),
            Span::styled(marker, Style::default().fg(Color::Green)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  1-5: set | Esc: cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
        .title(" Set status ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    let lines = fit_lines_to_area(lines, inner, 1);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Draw the single-line text input modal.
pub fn draw_input_modal(f: &mut Frame, app: &App) {
    let ModalState::Input { purpose, buffer } = &app.modal else {
        return;
    };
    let area = popup_rect(50, 20, 40, 5, f.area());
    f.render_widget(Clear, area);

    let lines = vec![
        Line::from(vec![
            Span::raw("  "),
            Span::raw(buffer.as_str()),
            Span::styled("█", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(Span::styled(
            "  Enter: submit | Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .title(format!(" {} ", purpose.prompt()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Draw the delete confirmation modal.
pub fn draw_confirm_delete(f: &mut Frame, app: &App) {
    let Some(issue) = app.detail_issue() else {
        return;
    };
    let area = popup_rect(45, 20, 40, 6, f.area());
    f.render_widget(Clear, area);

    let title = truncate_with_ellipsis(&issue.title, area.width.saturating_sub(6) as usize);
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("  Delete "),
            Span::styled(issue.id.clone(), Style::default().fg(Color::Cyan)),
            Span::raw("?"),
        ]),
        Line::from(Span::styled(
            format!("  {title}"),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "  y: delete | n/Esc: keep",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .title(" Confirm delete ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    f.render_widget(Paragraph::new(lines).block(block), area);
}
