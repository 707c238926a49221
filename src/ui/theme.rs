//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

use crate::config::ThemeChoice;
use crate::data::{HealthStatus, NodeStatus, TransferStatus};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for warning-level usage and in-between states.
    pub warning: Color,
    /// Color for critical usage, offline nodes and failed transfers.
    pub critical: Color,
    /// Color for healthy usage, online nodes and completed transfers.
    pub healthy: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Unfilled part of gauges and progress bars.
    pub track: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows and cards.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            track: Color::DarkGray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            track: Color::Gray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Resolve a configured choice. Only `Auto` queries the terminal.
    pub fn from_choice(choice: ThemeChoice) -> Self {
        match choice {
            ThemeChoice::Auto => Self::auto_detect(),
            ThemeChoice::Dark => Self::dark(),
            ThemeChoice::Light => Self::light(),
        }
    }

    /// Get style for a health status
    pub fn status_style(&self, status: HealthStatus) -> Style {
        match status {
            HealthStatus::Healthy => Style::default().fg(self.healthy),
            HealthStatus::Warning => Style::default().fg(self.warning),
            HealthStatus::Critical => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
        }
    }

    /// Badge color for a node status.
    pub fn node_status_style(&self, status: &NodeStatus) -> Style {
        match status {
            NodeStatus::Online | NodeStatus::Ready => Style::default().fg(self.healthy),
            NodeStatus::Loading => Style::default().fg(self.warning),
            NodeStatus::Offline => Style::default().fg(self.critical).add_modifier(Modifier::BOLD),
            NodeStatus::Other(_) | NodeStatus::Unknown => {
                Style::default().add_modifier(Modifier::DIM)
            }
        }
    }

    /// Badge color for a transfer status.
    pub fn transfer_status_style(&self, status: &TransferStatus) -> Style {
        match status {
            TransferStatus::Active => Style::default().fg(self.highlight),
            TransferStatus::Completed => Style::default().fg(self.healthy),
            TransferStatus::Failed => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
            TransferStatus::Other(_) | TransferStatus::Unknown => {
                Style::default().add_modifier(Modifier::DIM)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_choices() {
        assert_eq!(Theme::from_choice(ThemeChoice::Dark).highlight, Color::Cyan);
        assert_eq!(Theme::from_choice(ThemeChoice::Light).highlight, Color::Blue);
    }

    #[test]
    fn test_status_colors() {
        let theme = Theme::dark();
        assert_eq!(theme.node_status_style(&NodeStatus::Online).fg, Some(Color::Green));
        assert_eq!(theme.node_status_style(&NodeStatus::Offline).fg, Some(Color::Red));
        assert_eq!(theme.transfer_status_style(&TransferStatus::Failed).fg, Some(Color::Red));
        assert_eq!(theme.status_style(HealthStatus::Warning).fg, Some(Color::Yellow));
    }
}
