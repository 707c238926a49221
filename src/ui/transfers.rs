//! Transfers view rendering.
//!
//! Displays status badge counts and a sortable table of model transfers
//! with progress bars, speed and ETA.

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use super::common::{filter_info, themed_block};
use crate::app::App;
use crate::data::duration::format_eta;
use crate::data::format::{format_percent, format_speed, truncate};
use crate::data::{TransferData, TransferStatus};

/// Width of the text progress bar, in cells.
const PROGRESS_WIDTH: usize = 10;

/// Column to sort by in the Transfers view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferSortColumn {
    /// Active first, then failed, completed, others.
    #[default]
    Status,
    Model,
    Progress,
    Speed,
    Eta,
}

impl TransferSortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            TransferSortColumn::Status => TransferSortColumn::Model,
            TransferSortColumn::Model => TransferSortColumn::Progress,
            TransferSortColumn::Progress => TransferSortColumn::Speed,
            TransferSortColumn::Speed => TransferSortColumn::Eta,
            TransferSortColumn::Eta => TransferSortColumn::Status,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransferSortColumn::Status => "status",
            TransferSortColumn::Model => "model",
            TransferSortColumn::Progress => "progress",
            TransferSortColumn::Speed => "speed",
            TransferSortColumn::Eta => "eta",
        }
    }
}

/// Sort transfers by the given column and direction.
///
/// Missing speeds sort as slowest and missing ETAs as longest. Ties are
/// broken by id so the order is stable between refreshes.
pub fn sort_transfers_by(
    transfers: &mut [&TransferData],
    column: TransferSortColumn,
    ascending: bool,
) {
    transfers.sort_by(|a, b| {
        let primary = match column {
            TransferSortColumn::Status => a.status.cmp(&b.status),
            TransferSortColumn::Model => a.model_name.cmp(&b.model_name),
            TransferSortColumn::Progress => a.progress.total_cmp(&b.progress),
            TransferSortColumn::Speed => {
                a.speed.unwrap_or(-1.0).total_cmp(&b.speed.unwrap_or(-1.0))
            }
            TransferSortColumn::Eta => a
                .eta
                .unwrap_or(f64::INFINITY)
                .total_cmp(&b.eta.unwrap_or(f64::INFINITY)),
        };

        let primary = if ascending { primary } else { primary.reverse() };

        if primary == Ordering::Equal {
            a.id.cmp(&b.id)
        } else {
            primary
        }
    });
}

/// Screen rows above and below the transfer rows: header, tabs, badges,
/// table borders, column header and status bar.
const TABLE_CHROME_ROWS: u16 = super::CONTENT_START_ROW + 5;

/// Number of transfer rows visible on a screen of the given height.
pub fn visible_rows(screen_height: u16) -> usize {
    screen_height.saturating_sub(TABLE_CHROME_ROWS) as usize
}

/// First visible row when `selected` must stay on screen.
///
/// The table scrolls just far enough to keep the selection on its last row.
pub fn scroll_offset(selected: usize, visible: usize) -> usize {
    selected.saturating_sub(visible.saturating_sub(1))
}

/// Text progress bar for a clamped percentage, e.g. `████░░░░░░`.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Render the Transfers view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let [badges_area, table_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).areas(area);

    render_badges(frame, app, badges_area);

    let transfers = app.sorted_transfers();
    let selected = app.selected_transfer_index.min(transfers.len().saturating_sub(1));

    let header = Row::new(vec![
        Cell::from(""),
        Cell::from("ID"),
        Cell::from(format_header("Model", TransferSortColumn::Model, app)),
        Cell::from("Peer"),
        Cell::from(format_header("Status", TransferSortColumn::Status, app)),
        Cell::from(format_header("Progress", TransferSortColumn::Progress, app)),
        Cell::from(format_header("Speed", TransferSortColumn::Speed, app)),
        Cell::from(format_header("ETA", TransferSortColumn::Eta, app)),
        Cell::from("Actions"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = transfers
        .iter()
        .map(|t| {
            let status_style = app.theme.transfer_status_style(&t.status);
            let bar_style = match t.status {
                TransferStatus::Failed => Style::default().fg(app.theme.critical),
                TransferStatus::Completed => Style::default().fg(app.theme.healthy),
                _ => Style::default().fg(app.theme.highlight),
            };

            Row::new(vec![
                Cell::from(t.kind.arrow()),
                Cell::from(truncate(&t.id, 14)),
                Cell::from(t.model_name.clone()),
                Cell::from(truncate(&t.peer_id, 14)),
                Cell::from(t.status.label().to_string()).style(status_style),
                Cell::from(Line::from(vec![
                    Span::styled(progress_bar(t.progress, PROGRESS_WIDTH), bar_style),
                    Span::raw(format!(" {:>4}", format_percent(t.progress))),
                ])),
                Cell::from(format_speed(t.speed)),
                Cell::from(format_eta(t.eta)),
                Cell::from(if t.status == TransferStatus::Active {
                    "p:pause x:cancel"
                } else {
                    ""
                })
                .style(Style::default().add_modifier(Modifier::DIM)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Length(10),
        Constraint::Length(PROGRESS_WIDTH as u16 + 6),
        Constraint::Length(11),
        Constraint::Length(7),
        Constraint::Length(16),
    ];

    let sort_dir = if app.transfer_sort_ascending { "↑" } else { "↓" };
    let position_info = if transfers.is_empty() {
        String::new()
    } else {
        format!(" [{}/{}]", selected + 1, transfers.len())
    };
    let title = format!(
        " Transfers ({}/{}) [s:sort {}{}]{}{} ",
        transfers.len(),
        data.transfers.len(),
        app.transfer_sort_column.label(),
        sort_dir,
        filter_info(app),
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(themed_block(title, app))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !transfers.is_empty() {
        // Table body: minus borders and the column header
        let visible = table_area.height.saturating_sub(3) as usize;
        state = state
            .with_offset(scroll_offset(selected, visible))
            .with_selected(Some(selected));
    }

    frame.render_stateful_widget(table, table_area, &mut state);
}

/// Status badge counts above the table.
fn render_badges(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };
    let counts = &data.transfer_counts;
    let badge = |text: String, status: TransferStatus| {
        let style = app.theme.transfer_status_style(&status).add_modifier(Modifier::REVERSED);
        Span::styled(text, style)
    };

    let line = Line::from(vec![
        Span::raw(format!(" {} total  ", counts.total)),
        badge(format!(" {} active ", counts.active), TransferStatus::Active),
        Span::raw("  "),
        badge(format!(" {} completed ", counts.completed), TransferStatus::Completed),
        Span::raw("  "),
        badge(format!(" {} failed ", counts.failed), TransferStatus::Failed),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn format_header(name: &str, col: TransferSortColumn, app: &App) -> Span<'static> {
    if app.transfer_sort_column == col {
        let arrow = if app.transfer_sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{loaded_app, ScriptedSource};
    use crate::app::View;
    use crate::data::Thresholds;
    use crate::source::{DashboardSnapshot, Transfer};
    use crate::ui::tests::render_app;
    use crate::ui::Theme;

    fn ids(app: &App) -> Vec<String> {
        app.sorted_transfers().iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 10), "░░░░░░░░░░");
        assert_eq!(progress_bar(40.0, 10), "████░░░░░░");
        assert_eq!(progress_bar(100.0, 10), "██████████");
        assert_eq!(progress_bar(180.0, 10), "██████████");
        assert_eq!(progress_bar(-5.0, 4), "░░░░");
    }

    #[test]
    fn test_scroll_offset_keeps_selection_visible() {
        assert_eq!(scroll_offset(0, 5), 0);
        assert_eq!(scroll_offset(4, 5), 0);
        assert_eq!(scroll_offset(7, 5), 3);
        assert_eq!(scroll_offset(3, 0), 3);
        assert_eq!(visible_rows(24), 17);
        assert_eq!(visible_rows(4), 0);
    }

    #[test]
    fn test_scrolled_table_shows_selection() {
        let snapshot = DashboardSnapshot {
            transfers: (0..10)
                .map(|i| Transfer {
                    id: Some(format!("t-{:02}", i)),
                    status: Some("active".into()),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };
        let source = ScriptedSource { snapshots: vec![snapshot], error: None };
        let mut app = App::new(Box::new(source), Thresholds::default(), Theme::dark());
        app.reload_data();
        app.set_view(View::Transfers);
        app.select_last();

        // 12 rows leave room for 5 transfers
        let text = render_app(&mut app, 120, 12);
        assert!(text.contains("t-09"));
        assert!(text.contains("t-05"));
        assert!(!text.contains("t-04"));
    }

    #[test]
    fn test_sort_by_status_then_progress() {
        let mut app = loaded_app();
        app.set_view(View::Transfers);
        // Active, failed, completed
        assert_eq!(ids(&app), vec!["t-2", "t-3", "t-1"]);

        app.transfer_sort_column = TransferSortColumn::Progress;
        assert_eq!(ids(&app), vec!["t-3", "t-2", "t-1"]);

        app.toggle_sort_direction();
        assert_eq!(ids(&app), vec!["t-1", "t-2", "t-3"]);
    }

    #[test]
    fn test_sort_missing_eta_last() {
        let snapshot = DashboardSnapshot {
            transfers: vec![
                Transfer { id: Some("slow".into()), eta: None, ..Default::default() },
                Transfer { id: Some("fast".into()), eta: Some(5.0), ..Default::default() },
            ],
            ..Default::default()
        };
        let source = ScriptedSource { snapshots: vec![snapshot], error: None };
        let mut app = App::new(Box::new(source), Thresholds::default(), Theme::dark());
        app.reload_data();
        app.transfer_sort_column = TransferSortColumn::Eta;
        assert_eq!(ids(&app), vec!["fast", "slow"]);
    }

    #[test]
    fn test_badges_match_counts() {
        let mut app = loaded_app();
        app.set_view(View::Transfers);
        let text = render_app(&mut app, 120, 24);

        assert!(text.contains("3 total"));
        assert!(text.contains(" 1 active "));
        assert!(text.contains(" 1 completed "));
        assert!(text.contains(" 1 failed "));
        assert!(text.contains("Transfers (3/3)"));
    }

    #[test]
    fn test_rows_fall_back_and_clamp() {
        let snapshot = DashboardSnapshot {
            transfers: vec![Transfer {
                status: Some("active".into()),
                progress: Some(150.0),
                ..Default::default()
            }],
            ..Default::default()
        };
        let source = ScriptedSource { snapshots: vec![snapshot], error: None };
        let mut app = App::new(Box::new(source), Thresholds::default(), Theme::dark());
        app.reload_data();
        app.set_view(View::Transfers);

        let text = render_app(&mut app, 120, 24);
        assert!(text.contains("██████████ 100%"));
        assert!(text.contains("Unknown"));
        assert!(text.contains("N/A"));
    }
}
