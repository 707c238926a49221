//! Loading spinner shown until the first snapshot arrives.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Widget},
    Frame,
};

use super::common::centered_rect;
use crate::app::App;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// A busy indicator with a message, optionally covering the whole area.
#[derive(Debug, Clone)]
pub struct LoadingSpinner<'a> {
    frame: usize,
    message: &'a str,
    fullscreen: bool,
    style: Style,
}

impl<'a> LoadingSpinner<'a> {
    pub fn new(message: &'a str) -> Self {
        Self {
            frame: 0,
            message,
            fullscreen: false,
            style: Style::default(),
        }
    }

    /// Animation step; wraps around.
    pub fn frame(mut self, frame: usize) -> Self {
        self.frame = frame;
        self
    }

    /// Clear everything under `area` before drawing.
    pub fn fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    fn glyph(&self) -> &'static str {
        FRAMES[self.frame % FRAMES.len()]
    }
}

impl Widget for LoadingSpinner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.fullscreen {
            Clear.render(area, buf);
        }

        let line = Line::from(vec![
            Span::styled(self.glyph(), self.style.add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            Span::raw(self.message),
        ]);
        let width = line.width() as u16;
        let target = centered_rect(width, 1, area);
        Paragraph::new(line).alignment(Alignment::Center).render(target, buf);
    }
}

/// Render the spinner for the app's current source.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let message = format!("Loading {}...", app.source_description());
    let spinner = LoadingSpinner::new(&message)
        .frame(app.spinner_frame)
        .fullscreen(app.spinner_fullscreen)
        .style(Style::default().fg(app.theme.highlight));
    frame.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::tests::buffer_text;

    #[test]
    fn test_spinner_renders_message() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 30, 3));
        LoadingSpinner::new("Loading nodes").render(buf.area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("⠋ Loading nodes"));
        // Centered on the middle row
        assert!(text.lines().nth(1).unwrap().contains("Loading nodes"));
    }

    #[test]
    fn test_spinner_frames_wrap() {
        let spinner = LoadingSpinner::new("x").frame(FRAMES.len() + 1);
        assert_eq!(spinner.glyph(), FRAMES[1]);
    }

    #[test]
    fn test_fullscreen_clears_area() {
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::with_lines(["#".repeat(30), "#".repeat(30), "#".repeat(30)]);

        LoadingSpinner::new("wait").render(area, &mut buf);
        assert!(buffer_text(&buf).starts_with('#'));

        LoadingSpinner::new("wait").fullscreen(true).render(area, &mut buf);
        assert!(!buffer_text(&buf).contains('#'));
    }
}
