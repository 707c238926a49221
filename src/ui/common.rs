//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, help overlay
//! and a few layout helpers.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::format::{format_count, format_percent};
use crate::data::HealthStatus;

/// Render the header bar with cluster health overview.
///
/// Displays: status indicator, online/offline node counts, leader, transfers.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        let line = Line::from(vec![
            Span::styled(" CLUSTERWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Loading..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let summary = &data.summary;

    // Overall status: any offline node is a warning, no online node is critical
    let health = if summary.node_count > 0 && summary.online_count == 0 {
        HealthStatus::Critical
    } else if summary.offline_count > 0 {
        HealthStatus::Warning
    } else {
        HealthStatus::Healthy
    };

    let dim = Style::default().add_modifier(Modifier::DIM);

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.status_style(health)),
        Span::styled("CLUSTERWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(summary.online_count.to_string(), Style::default().fg(app.theme.healthy)),
        Span::raw(" online "),
        if summary.offline_count > 0 {
            Span::styled(
                summary.offline_count.to_string(),
                Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", dim)
        },
        Span::raw(" offline │ "),
        Span::styled(
            summary.node_count.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" nodes │ leader "),
        Span::styled(summary.leader.clone(), Style::default().fg(app.theme.highlight)),
        Span::raw(" │ "),
        Span::raw(format!("{} req", format_count(summary.total_requests))),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL.iter().map(|v| Line::from(tab_title(*v))).collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

fn tab_title(view: View) -> String {
    format!("{}:{}", view.index() + 1, view.label())
}

/// Which tab sits under a column of the tab bar.
///
/// Each title is padded by one space on both sides and tabs are separated
/// by a one-column divider.
pub fn tab_at(column: u16) -> Option<View> {
    let mut start = 0u16;
    for view in View::ALL {
        let width = tab_title(view).chars().count() as u16 + 2;
        if column < start + width {
            return Some(view);
        }
        start += width + 1;
    }
    None
}

/// Render the status bar at the bottom.
///
/// Shows: source, time since last update, available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(ref err) = app.load_error {
        let suffix = if app.data.is_some() { "showing last snapshot" } else { "r:retry" };
        let paragraph = Paragraph::new(format!(" Error: {} | {} | q:quit", err, suffix))
            .style(Style::default().fg(app.theme.critical));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref data) = app.data {
        let elapsed = data.last_updated.elapsed();

        let controls = if app.filter_active {
            "Type to search | Enter:apply Esc:cancel"
        } else {
            match app.current_view {
                View::Overview | View::Dashboard => "y:copy id Tab:switch e:export ?:help q:quit",
                View::Nodes => "/:search Enter:details d:drain X:shutdown y:copy ?:help q:quit",
                View::Transfers => "/:search s:sort p:pause x:cancel y:copy ?:help q:quit",
            }
        };

        format!(
            " {} | Updated {:.1}s ago | {}",
            app.source_description(),
            elapsed.as_secs_f64(),
            controls,
        )
    } else {
        format!(" Loading from {}... | q:quit", app.source_description())
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Filter text for view titles: typing, applied, or nothing.
pub fn filter_info(app: &App) -> String {
    if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    }
}

/// Bordered block in the theme's style.
pub fn themed_block(title: impl Into<Line<'static>>, app: &App) -> Block<'static> {
    Block::default()
        .title(title.into())
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

/// Horizontal usage gauge colored by the app's thresholds.
///
/// `percent` must already be clamped to `0..=100`.
pub fn usage_gauge(label: &str, percent: f64, app: &App) -> Gauge<'static> {
    let level = app.thresholds.level(percent);
    Gauge::default()
        .gauge_style(app.theme.status_style(level).bg(app.theme.track))
        .ratio((percent / 100.0).clamp(0.0, 1.0))
        .label(format!("{} {}", label, format_percent(percent)))
}

/// A rectangle of at most `width` x `height` centered in `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(ratatui::layout::Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width)])
        .flex(ratatui::layout::Flex::Center)
        .areas(row);
    rect
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  1-4         Jump to view"),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Nodes & Transfers"),
        Line::from("  /           Start filter/search"),
        Line::from("  c           Clear filter"),
        Line::from("  Enter       Node details"),
        Line::from("  d / X       Drain / shutdown node"),
        Line::from("  s / S       Sort column / direction"),
        Line::from("  p / x       Pause / cancel transfer"),
        Line::from(""),
        section(" General"),
        Line::from("  y           Copy selected id"),
        Line::from("  r           Reload data"),
        Line::from("  e           Export to JSON"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let height = help_text.len() as u16 + 2;
    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_area = centered_rect(44, height, area);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
