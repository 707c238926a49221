//! Dashboard: overview aggregates plus real-time CPU, memory and network charts.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Sparkline},
    Frame,
};

use super::common::themed_block;
use super::overview;
use crate::app::App;
use crate::data::format::{format_percent, NOT_AVAILABLE};
use crate::data::history::MAX_HISTORY_SIZE;
use crate::data::{ClusterData, Metric};

/// Render the Dashboard view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let [cards, charts, activity] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(5),
        Constraint::Length(3),
    ])
    .areas(area);

    overview::render_cards(frame, app, data, cards);

    let chart_areas = Layout::horizontal([Constraint::Fill(1); 3]).split(charts);
    for (metric, chart_area) in [Metric::Cpu, Metric::Memory, Metric::Network]
        .into_iter()
        .zip(chart_areas.iter())
    {
        render_chart(frame, app, metric, *chart_area);
    }

    render_activity(frame, app, data, activity);
}

/// One sparkline with the latest and peak value in its title.
fn render_chart(frame: &mut Frame, app: &App, metric: Metric, area: Rect) {
    let latest = app.history.latest(metric).unwrap_or(0.0);
    let peak = app
        .history
        .peak(metric)
        .map(format_percent)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let title = Line::from(vec![
        Span::raw(format!(" {} ", metric.label())),
        Span::styled(
            format_percent(latest),
            app.theme.status_style(app.thresholds.level(latest)),
        ),
        Span::styled(
            format!(" peak {} ", peak),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    // Newest samples on the right, limited to what fits
    let series = app.history.sparkline(metric);
    let width = area.width.saturating_sub(2) as usize;
    let visible: Vec<u64> = series[series.len().saturating_sub(width)..].to_vec();

    let sparkline = Sparkline::default()
        .block(themed_block(title, app))
        .data(&visible)
        .max(100)
        .style(Style::default().fg(app.theme.highlight));
    frame.render_widget(sparkline, area);
}

/// Request rate and transfer activity.
fn render_activity(frame: &mut Frame, app: &App, data: &ClusterData, area: Rect) {
    let rate = app
        .history
        .request_rate()
        .map(|r| format!("{:.1} req/s", r))
        .unwrap_or_else(|| "- req/s".to_string());
    let counts = &data.transfer_counts;

    let line = Line::from(vec![
        Span::raw(" Requests: "),
        Span::styled(rate, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("   Transfers: "),
        Span::styled(format!("{} active", counts.active), Style::default().fg(app.theme.highlight)),
        Span::raw(", "),
        Span::styled(
            format!("{} completed", counts.completed),
            Style::default().fg(app.theme.healthy),
        ),
        Span::raw(", "),
        Span::styled(format!("{} failed", counts.failed), Style::default().fg(app.theme.critical)),
        Span::styled(
            format!("   {}/{} samples", app.history.len(), MAX_HISTORY_SIZE),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(themed_block(" Activity ", app)), area);
}

#[cfg(test)]
mod tests {
    use crate::app::tests::loaded_app;
    use crate::app::View;
    use crate::ui::tests::render_app;

    #[test]
    fn test_dashboard_shows_charts_and_counts() {
        let mut app = loaded_app();
        app.set_view(View::Dashboard);
        let text = render_app(&mut app, 120, 30);

        assert!(text.contains(" CPU "));
        assert!(text.contains(" Memory "));
        assert!(text.contains(" Network "));
        assert!(text.contains("1 active"));
        assert!(text.contains("1 completed"));
        assert!(text.contains("1 failed"));
        assert!(text.contains("1/60 samples"));
    }
}
