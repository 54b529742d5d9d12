//! Status configuration and status bar rendering.

use super::icons;
use crate::data::{Priority, Status};
use crate::tui::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Unified status configuration - single source of truth for icon and style.
pub struct StatusConfig {
    pub icon: &'static str,
    pub style: Style,
}

/// Trait for types that can provide their display configuration (icon + style).
pub trait StatusConfigurable {
    fn status_config(&self) -> StatusConfig;
}

impl StatusConfigurable for Status {
    fn status_config(&self) -> StatusConfig {
        match self {
            Status::Open => StatusConfig {
                icon: icons::STATUS_OPEN,
                style: Style::default().fg(Color::Cyan),
            },
            Status::InProgress => StatusConfig {
                icon: icons::STATUS_IN_PROGRESS,
                style: Style::default().fg(Color::Green),
            },
            Status::Blocked => StatusConfig {
                icon: icons::STATUS_BLOCKED,
                style: Style::default().fg(Color::Red),
            },
            Status::Deferred => StatusConfig {
                icon: icons::STATUS_DEFERRED,
                style: Style::default().fg(Color::DarkGray),
            },
            Status::Closed => StatusConfig {
                icon: icons::STATUS_CLOSED,
                style: Style::default().fg(Color::Magenta),
            },
            Status::Unknown(_) => StatusConfig {
                icon: icons::STATUS_UNKNOWN,
                style: Style::default().fg(Color::DarkGray),
            },
        }
    }
}

impl StatusConfigurable for Priority {
    fn status_config(&self) -> StatusConfig {
        match self.0 {
            0 => StatusConfig {
                icon: "▮▮▮",
                style: Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            },
            1 => StatusConfig {
                icon: "▮▮╌",
                style: Style::default().fg(Color::Yellow),
            },
            2 => StatusConfig {
                icon: "▮╌╌",
                style: Style::default().fg(Color::Cyan),
            },
            _ => StatusConfig {
                icon: "╌╌╌",
                style: Style::default().fg(Color::DarkGray),
            },
        }
    }
}

/// Generate the status legend for the help popup.
pub fn generate_status_legend() -> Vec<&'static str> {
    vec![
        "",
        "  ISSUE STATUS",
        "  ────────────",
        "  ○  Open         Ready or waiting to start",
        "  ◑  In Progress  Currently being worked on",
        "  ⊘  Blocked      Marked blocked in the store",
        "  ◔  Deferred     Intentionally parked",
        "  ●  Closed       Completed",
        "  ◌  (other)      Unrecognized store status",
        "",
        "  ROW MARKERS",
        "  ───────────",
        "  ⊘  Blocked by an unresolved dependency",
        "  ◆  In-progress work somewhere in the subtree",
        "  ▹  Unblocked open work somewhere in the subtree",
        "",
    ]
}

/// Draw the status bar at the bottom of the screen.
pub fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let width = area.width as usize;

    let left = if let Some(toast) = &app.toast {
        let style = if toast.error {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };
        Span::styled(format!(" {} ", toast.text), style)
    } else if app.filter_entry {
        let text = if width >= 55 {
            " Type to filter | Enter: keep | Esc: clear "
        } else {
            " Filter "
        };
        Span::styled(text, Style::default().fg(Color::Yellow))
    } else {
        let text = if width >= 100 {
            " j/k: nav | Space: fold | Enter: details | /: filter | s: status | n: new | r: refresh | ?: help "
        } else if width >= 60 {
            " j/k:nav Space:fold Enter:details /:filter ?:help "
        } else {
            " ? help "
        };
        Span::styled(text, Style::default().fg(Color::DarkGray))
    };

    let mut right_parts: Vec<String> = Vec::new();
    if let Some(delta) = &app.last_delta {
        right_parts.push(delta.summary());
    } else if !app.forest.is_empty() {
        right_parts.push(format!("{} issues", app.forest.len()));
    }
    let rejected = app.forest.stats.rejected_edges();
    if rejected > 0 {
        right_parts.push(format!("⚠ {rejected} edges ignored"));
    }
    if app.forest.stats.duplicate_ids > 0 {
        right_parts.push(format!("⚠ {} duplicate ids", app.forest.stats.duplicate_ids));
    }
    let right_text = format!(" {} ", right_parts.join(" │ "));

    let left_width = super::layout::display_width(left.content.as_ref());
    let right_width = super::layout::display_width(&right_text);
    let gap = width.saturating_sub(left_width + right_width);

    let line = Line::from(vec![
        left,
        Span::raw(" ".repeat(gap)),
        Span::styled(right_text, Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
