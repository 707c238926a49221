//! Node grid: one card per node with status badge, usage gauges and actions.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::common::{filter_info, themed_block, usage_gauge};
use crate::app::App;
use crate::data::NodeData;

/// Preferred card width, including borders.
const CARD_WIDTH: u16 = 36;
/// Card height, including borders.
const CARD_HEIGHT: u16 = 8;

/// Render the Nodes view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let nodes = app.filtered_nodes();
    let selected = app.selected_node_index.min(nodes.len().saturating_sub(1));

    let position_info = if nodes.is_empty() {
        String::new()
    } else {
        format!(" [{}/{}]", selected + 1, nodes.len())
    };
    let title = format!(
        " Nodes ({}/{}){}{} ",
        nodes.len(),
        data.nodes.len(),
        filter_info(app),
        position_info
    );

    let block = themed_block(title, app);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if nodes.is_empty() {
        let message = if data.nodes.is_empty() {
            "No nodes reported"
        } else {
            "No nodes match filter"
        };
        let paragraph = Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(paragraph, inner);
        return;
    }

    let (columns, visible_rows) = grid_size(inner);
    let selected_row = selected / columns;
    let first_row = selected_row.saturating_sub(visible_rows.saturating_sub(1));

    let row_areas =
        Layout::vertical(vec![Constraint::Length(CARD_HEIGHT); visible_rows]).split(inner);
    for (row_offset, row_area) in row_areas.iter().enumerate() {
        let row = first_row + row_offset;
        let col_areas = Layout::horizontal(vec![Constraint::Fill(1); columns]).split(*row_area);
        for (col, card_area) in col_areas.iter().enumerate() {
            let index = row * columns + col;
            let Some(node) = nodes.get(index) else {
                return;
            };
            render_card(frame, app, node, index == selected, *card_area);
        }
    }
}

/// Cards per row and visible rows for the given inner area. Both are at least 1.
pub fn grid_size(area: Rect) -> (usize, usize) {
    let columns = (area.width / CARD_WIDTH).max(1) as usize;
    let rows = (area.height / CARD_HEIGHT).max(1) as usize;
    (columns, rows)
}

fn render_card(frame: &mut Frame, app: &App, node: &NodeData, selected: bool, area: Rect) {
    let border_style = if selected {
        Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.border)
    };

    let title = Line::from(vec![
        Span::styled(format!(" {} ", node.id), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("● {} ", node.status.label()),
            app.theme.node_status_style(&node.status),
        ),
    ]);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [address, cpu, memory, bandwidth, footer] =
        Layout::vertical([Constraint::Length(1); 5]).areas(inner);

    let dim = Style::default().add_modifier(Modifier::DIM);
    frame.render_widget(Paragraph::new(Span::styled(node.address.clone(), dim)), address);
    frame.render_widget(usage_gauge("CPU", node.cpu, app), cpu);
    frame.render_widget(usage_gauge("MEM", node.memory, app), memory);
    frame.render_widget(usage_gauge("BW", node.bandwidth, app), bandwidth);

    let mut spans = vec![Span::raw(format!("Models: {}", node.model_count()))];
    if selected {
        spans.push(Span::styled("  d:drain X:shutdown ⏎:details", dim));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), footer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{loaded_app, ScriptedSource};
    use crate::app::View;
    use crate::data::Thresholds;
    use crate::source::{DashboardSnapshot, Node, NodeUsage};
    use crate::ui::tests::render_app;
    use crate::ui::Theme;

    #[test]
    fn test_grid_size() {
        assert_eq!(grid_size(Rect::new(0, 0, 110, 20)), (3, 2));
        assert_eq!(grid_size(Rect::new(0, 0, 10, 3)), (1, 1));
    }

    #[test]
    fn test_cards_show_status_and_address() {
        let mut app = loaded_app();
        app.set_view(View::Nodes);
        let text = render_app(&mut app, 120, 30);

        assert!(text.contains("node-a"));
        assert!(text.contains("● online"));
        assert!(text.contains("● offline"));
        assert!(text.contains("10.0.0.2:8080"));
        assert!(text.contains("Nodes (3/3)"));
        assert!(text.contains("d:drain"));
    }

    #[test]
    fn test_cards_fall_back_and_clamp() {
        let snapshot = DashboardSnapshot {
            nodes: vec![Node {
                usage: Some(NodeUsage {
                    cpu: Some(250.0),
                    memory: Some(-10.0),
                    bandwidth: None,
                }),
                ..Default::default()
            }],
            ..Default::default()
        };
        let source = ScriptedSource {
            snapshots: vec![snapshot],
            error: None,
        };
        let mut app = App::new(Box::new(source), Thresholds::default(), Theme::dark());
        app.reload_data();
        app.set_view(View::Nodes);

        let text = render_app(&mut app, 80, 24);
        assert!(text.contains("Unknown"));
        assert!(text.contains("CPU 100%"));
        assert!(text.contains("MEM 0%"));
        assert!(text.contains("BW 0%"));
    }

    #[test]
    fn test_empty_filter_message() {
        let mut app = loaded_app();
        app.set_view(View::Nodes);
        app.filter_text = "nothing-matches".to_string();
        let text = render_app(&mut app, 80, 24);
        assert!(text.contains("No nodes match filter"));
    }
}
