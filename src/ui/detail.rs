//! Detail overlay rendering.
//!
//! Displays a modal overlay with detailed information about the selected node.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use super::common::{centered_rect, themed_block, usage_gauge};
use crate::app::App;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 40;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 14;

/// Render the node detail as a modal overlay.
///
/// Shows address, status, usage gauges and the models loaded on the node.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(node) = app.selected_node() else {
        return;
    };

    let overlay_width = (area.width * 80 / 100).clamp(MIN_OVERLAY_WIDTH, 90);
    let overlay_height = (area.height * 80 / 100).clamp(MIN_OVERLAY_HEIGHT, 30);
    let overlay_area = centered_rect(overlay_width, overlay_height, area);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(format!(" Node {} ", node.id))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let [info, gauges, models, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(inner);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let is_leader = data_leader(app) == Some(node.id.as_str());
    let health = node.usage_health(&app.thresholds);
    let info_lines = vec![
        Line::from(vec![Span::raw(" Address: "), Span::styled(node.address.clone(), bold)]),
        Line::from(vec![
            Span::raw(" Status:  "),
            Span::styled(
                node.status.label().to_string(),
                app.theme.node_status_style(&node.status),
            ),
            Span::raw(if is_leader { "  (leader)" } else { "" }),
        ]),
        Line::from(vec![
            Span::raw(" Health:  "),
            Span::styled(health.symbol(), app.theme.status_style(health)),
        ]),
    ];
    frame.render_widget(Paragraph::new(info_lines), info);

    let gauge_rows = Layout::vertical([Constraint::Length(1); 3]).split(gauges);
    frame.render_widget(usage_gauge("CPU", node.cpu, app), gauge_rows[0]);
    frame.render_widget(usage_gauge("Memory", node.memory, app), gauge_rows[1]);
    frame.render_widget(usage_gauge("Bandwidth", node.bandwidth, app), gauge_rows[2]);

    let title = format!(" Models ({}) ", node.model_count());
    if node.models.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "  No models loaded",
            Style::default().add_modifier(Modifier::DIM),
        ))
        .block(themed_block(title, app));
        frame.render_widget(empty, models);
    } else {
        let items: Vec<ListItem> =
            node.models.iter().map(|m| ListItem::new(format!(" {}", m))).collect();
        frame.render_widget(List::new(items).block(themed_block(title, app)), models);
    }

    let footer_line = Paragraph::new(Line::from(vec![Span::styled(
        " Esc:close ↑/↓:next node y:copy id d:drain X:shutdown ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer_line, footer);
}

fn data_leader(app: &App) -> Option<&str> {
    app.data.as_ref().map(|d| d.summary.leader.as_str())
}

#[cfg(test)]
mod tests {
    use crate::app::tests::loaded_app;
    use crate::app::View;
    use crate::ui::tests::render_app;

    #[test]
    fn test_overlay_shows_selected_node() {
        let mut app = loaded_app();
        app.set_view(View::Nodes);
        app.select_next();
        app.enter_detail();
        assert!(app.show_detail_overlay);

        let text = render_app(&mut app, 100, 30);
        assert!(text.contains("Node node-b"));
        assert!(text.contains("Address: 10.0.0.2:8080"));
        assert!(text.contains("No models loaded"));
    }

    #[test]
    fn test_overlay_marks_leader() {
        let mut app = loaded_app();
        app.set_view(View::Nodes);
        app.enter_detail();

        let text = render_app(&mut app, 100, 30);
        assert!(text.contains("(leader)"));
    }
}
