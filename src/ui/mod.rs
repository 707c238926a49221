//! Terminal UI rendering using ratatui.
//!
//! This module contains all the view-specific rendering logic for the TUI.
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`overview`]: Cluster identity, node counts and resource gauges
//! - [`dashboard`]: Overview cards plus real-time CPU/memory/network charts
//! - [`nodes`]: Grid of node cards with usage gauges and actions
//! - [`transfers`]: Sortable transfer table with progress bars and badges
//! - [`spinner`]: Loading indicator shown until the first snapshot
//! - [`detail`]: Modal overlay showing detailed node information
//! - [`common`]: Shared components (header, tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! [`draw`] lays out every frame:
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (overview/dashboard/nodes/transfers) │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - spinner::render (until data arrives)
//!    - detail::render_overlay
//!    - common::render_help
//! ```

pub mod common;
pub mod dashboard;
pub mod detail;
pub mod nodes;
pub mod overview;
pub mod spinner;
pub mod theme;
pub mod transfers;

pub use spinner::LoadingSpinner;
pub use theme::Theme;
pub use transfers::TransferSortColumn;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, View};

/// Minimum terminal width for a usable display.
pub const MIN_WIDTH: u16 = 60;
/// Minimum terminal height for a usable display.
pub const MIN_HEIGHT: u16 = 12;

/// Row where view content starts (after header and tabs).
pub const CONTENT_START_ROW: u16 = 2;

/// Draw one frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        render_too_small(frame, area);
        return;
    }

    if app.is_loading() && app.spinner_fullscreen && app.load_error.is_none() {
        spinner::render(frame, app, area);
        return;
    }

    let [header, tabs, content, status] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(8),
        Constraint::Length(1),
    ])
    .areas(area);

    common::render_header(frame, app, header);
    common::render_tabs(frame, app, tabs);

    if app.is_loading() {
        spinner::render(frame, app, content);
    } else {
        match app.current_view {
            View::Overview => overview::render(frame, app, content),
            View::Dashboard => dashboard::render(frame, app, content),
            View::Nodes => nodes::render(frame, app, content),
            View::Transfers => transfers::render(frame, app, content),
        }
    }

    common::render_status_bar(frame, app, status);

    if app.show_detail_overlay {
        detail::render_overlay(frame, app, area);
    }

    if app.show_help {
        common::render_help(frame, app, area);
    }
}

fn render_too_small(frame: &mut Frame, area: Rect) {
    let msg = format!(
        "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
        area.width, area.height, MIN_WIDTH, MIN_HEIGHT
    );
    let paragraph = Paragraph::new(msg)
        .alignment(Alignment::Center)
        .style(Style::default().fg(ratatui::style::Color::Yellow));
    let centered = common::centered_rect(area.width, 5, area);
    frame.render_widget(paragraph, centered);
}
