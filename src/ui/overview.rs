//! Cluster overview: identity, aggregate counts and resource gauges.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use super::common::{themed_block, usage_gauge};
use crate::app::App;
use crate::data::format::{format_count, format_latency, format_percent};
use crate::data::ClusterData;

/// Render the Overview view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let [identity, cards, gauges, nodes] = Layout::vertical([
        Constraint::Length(6),
        Constraint::Length(4),
        Constraint::Length(5),
        Constraint::Min(3),
    ])
    .areas(area);

    render_identity(frame, app, data, identity);
    render_cards(frame, app, data, cards);
    render_gauges(frame, app, data, gauges);
    render_node_list(frame, app, data, nodes);
}

/// Node id, leader, cluster status and peer count.
pub fn render_identity(frame: &mut Frame, app: &App, data: &ClusterData, area: Rect) {
    let summary = &data.summary;
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let leader = if summary.is_leader() {
        Span::styled(format!("{} (this node)", summary.leader), bold.fg(app.theme.highlight))
    } else {
        Span::styled(summary.leader.clone(), bold)
    };

    let lines = vec![
        Line::from(vec![Span::raw(" Node ID:  "), Span::styled(summary.node_id.clone(), bold)]),
        Line::from(vec![Span::raw(" Leader:   "), leader]),
        Line::from(vec![Span::raw(" Status:   "), Span::raw(summary.status.clone())]),
        Line::from(vec![
            Span::raw(" Peers:    "),
            Span::styled(summary.peer_count.to_string(), bold),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(themed_block(" Cluster ", app));
    frame.render_widget(paragraph, area);
}

/// A row of stat cards: nodes, online, offline, models, requests, latency.
pub fn render_cards(frame: &mut Frame, app: &App, data: &ClusterData, area: Rect) {
    let summary = &data.summary;
    let online_style = Style::default().fg(app.theme.healthy);
    let offline_style = if summary.offline_count > 0 {
        Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let cards: [(&str, String, String, Style); 6] = [
        ("Nodes", summary.node_count.to_string(), String::new(), Style::default()),
        (
            "Online",
            summary.online_count.to_string(),
            format_percent(summary.online_percent()),
            online_style,
        ),
        ("Offline", summary.offline_count.to_string(), String::new(), offline_style),
        ("Models", summary.model_count.to_string(), String::new(), Style::default()),
        ("Requests", format_count(summary.total_requests), String::new(), Style::default()),
        ("Latency", format_latency(summary.avg_latency), "avg".to_string(), Style::default()),
    ];

    let areas = Layout::horizontal([Constraint::Fill(1); 6]).split(area);
    for ((title, value, detail, style), card_area) in cards.into_iter().zip(areas.iter()) {
        let lines = vec![
            Line::from(Span::styled(format!(" {}", value), style.add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(
                format!(" {}", detail),
                Style::default().add_modifier(Modifier::DIM),
            )),
        ];
        let paragraph = Paragraph::new(lines).block(themed_block(format!(" {} ", title), app));
        frame.render_widget(paragraph, *card_area);
    }
}

/// Cluster-wide CPU, memory and network gauges.
pub fn render_gauges(frame: &mut Frame, app: &App, data: &ClusterData, area: Rect) {
    let block = themed_block(" Resources ", app);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([Constraint::Length(1); 3]).split(inner);
    let gauges = [
        ("CPU", data.metrics.cpu),
        ("Memory", data.metrics.memory),
        ("Network", data.metrics.network),
    ];
    for ((label, value), row) in gauges.into_iter().zip(rows.iter()) {
        frame.render_widget(usage_gauge(label, value, app), *row);
    }
}

/// Compact per-node status list.
fn render_node_list(frame: &mut Frame, app: &App, data: &ClusterData, area: Rect) {
    let header = Row::new(vec!["Node", "Address", "Status", "Models"]).style(app.theme.header);

    let rows: Vec<Row> = data
        .nodes
        .iter()
        .map(|n| {
            Row::new(vec![
                Cell::from(n.id.clone()),
                Cell::from(n.address.clone()),
                Cell::from(n.status.label().to_string())
                    .style(app.theme.node_status_style(&n.status)),
                Cell::from(n.model_count().to_string()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Length(6),
    ];

    let title = format!(" Nodes ({}) ", data.nodes.len());
    let table = Table::new(rows, widths).header(header).block(themed_block(title, app));
    frame.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use crate::app::tests::loaded_app;
    use crate::ui::tests::render_app;

    #[test]
    fn test_overview_shows_counts_and_identity() {
        let mut app = loaded_app();
        let text = render_app(&mut app, 100, 30);

        assert!(text.contains("Node ID:  node-a"));
        assert!(text.contains("node-a (this node)"));
        // Online / offline cards
        assert!(text.contains("Online"));
        assert!(text.contains(" 2 "));
        assert!(text.contains("67%"));
        assert!(text.contains("Offline"));
    }
}
