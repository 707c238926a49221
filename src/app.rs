//! Application state and navigation logic.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::clipboard::{ClipboardSink, Osc52Clipboard};
use crate::data::export::write_export;
use crate::data::{ClusterData, History, NodeData, Thresholds, TransferData};
use crate::source::DataSource;
use crate::ui::transfers::{sort_transfers_by, TransferSortColumn};
use crate::ui::Theme;

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Default file written by the export action.
pub const DEFAULT_EXPORT_PATH: &str = "cluster_export.json";

/// The current view/tab in the TUI.
///
/// Node detail is shown as an overlay (controlled by `App::show_detail_overlay`)
/// rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Cluster identity and aggregate health.
    Overview,
    /// Aggregates plus real-time metric charts.
    Dashboard,
    /// Grid of node cards.
    Nodes,
    /// Table of model transfers.
    Transfers,
}

impl View {
    /// All views in tab order.
    pub const ALL: [View; 4] = [View::Overview, View::Dashboard, View::Nodes, View::Transfers];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Overview => View::Dashboard,
            View::Dashboard => View::Nodes,
            View::Nodes => View::Transfers,
            View::Transfers => View::Overview,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Overview => View::Transfers,
            View::Dashboard => View::Overview,
            View::Nodes => View::Dashboard,
            View::Transfers => View::Nodes,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Dashboard => "Dashboard",
            View::Nodes => "Nodes",
            View::Transfers => "Transfers",
        }
    }

    /// Position in the tab bar.
    pub fn index(&self) -> usize {
        match self {
            View::Overview => 0,
            View::Dashboard => 1,
            View::Nodes => 2,
            View::Transfers => 3,
        }
    }
}

/// Node and transfer controls that the backend does not expose yet.
///
/// Triggering one only reports it in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubAction {
    Drain,
    Shutdown,
    Pause,
    Cancel,
}

impl StubAction {
    pub fn label(&self) -> &'static str {
        match self {
            StubAction::Drain => "Drain",
            StubAction::Shutdown => "Shutdown",
            StubAction::Pause => "Pause",
            StubAction::Cancel => "Cancel",
        }
    }

    /// View the action belongs to.
    fn view(&self) -> View {
        match self {
            StubAction::Drain | StubAction::Shutdown => View::Nodes,
            StubAction::Pause | StubAction::Cancel => View::Transfers,
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub data: Option<ClusterData>,
    pub history: History,
    pub load_error: Option<String>,
    pub thresholds: Thresholds,

    // Navigation state
    pub selected_node_index: usize,
    pub selected_transfer_index: usize,

    // Sorting (Transfers view)
    pub transfer_sort_column: TransferSortColumn,
    pub transfer_sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,
    pub spinner_fullscreen: bool,
    pub spinner_frame: usize,

    clipboard: Box<dyn ClipboardSink>,
    pub export_path: PathBuf,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App with the given data source, thresholds and theme.
    pub fn new(source: Box<dyn DataSource>, thresholds: Thresholds, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Overview,
            show_help: false,
            show_detail_overlay: false,
            source,
            data: None,
            history: History::new(),
            load_error: None,
            thresholds,
            selected_node_index: 0,
            selected_transfer_index: 0,
            transfer_sort_column: TransferSortColumn::default(),
            transfer_sort_ascending: true,
            filter_text: String::new(),
            filter_active: false,
            theme,
            spinner_fullscreen: false,
            spinner_frame: 0,
            clipboard: Box::new(Osc52Clipboard),
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            status_message: None,
        }
    }

    /// Replace the clipboard used by copy actions.
    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardSink>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Cover the whole screen with the spinner while loading.
    pub fn with_spinner_fullscreen(mut self, fullscreen: bool) -> Self {
        self.spinner_fullscreen = fullscreen;
        self
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// True until the first snapshot arrives.
    pub fn is_loading(&self) -> bool {
        self.data.is_none()
    }

    /// Advance animations. Called once per frame.
    pub fn tick(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Poll the data source for new data.
    ///
    /// Returns true if new data was received. A source error is recorded
    /// in `load_error` but never discards the last good snapshot.
    pub fn reload_data(&mut self) -> bool {
        if let Some(snapshot) = self.source.poll() {
            let data = ClusterData::from_snapshot(&snapshot);
            debug!(
                nodes = data.summary.node_count,
                online = data.summary.online_count,
                transfers = data.transfer_counts.total,
                "snapshot received"
            );

            // Record history before updating
            self.history.record(&data);
            self.data = Some(data);
            self.load_error = None;
            self.clamp_selection();
            return true;
        }

        if let Some(err) = self.source.error() {
            let message = err.to_string();
            if self.load_error.as_deref() != Some(message.as_str()) {
                warn!(source = %self.source.description(), error = %message, "source error");
            }
            self.load_error = Some(message);
        }
        false
    }

    fn clamp_selection(&mut self) {
        let nodes = self.filtered_nodes().len();
        let transfers = self.sorted_transfers().len();
        self.selected_node_index = self.selected_node_index.min(nodes.saturating_sub(1));
        self.selected_transfer_index = self.selected_transfer_index.min(transfers.saturating_sub(1));
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        self.show_detail_overlay = false;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        match self.current_view {
            View::Nodes => {
                let max = self.filtered_nodes().len().saturating_sub(1);
                self.selected_node_index = (self.selected_node_index + n).min(max);
            }
            View::Transfers => {
                let max = self.sorted_transfers().len().saturating_sub(1);
                self.selected_transfer_index = (self.selected_transfer_index + n).min(max);
            }
            View::Overview | View::Dashboard => {}
        }
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        match self.current_view {
            View::Nodes => self.selected_node_index = self.selected_node_index.saturating_sub(n),
            View::Transfers => {
                self.selected_transfer_index = self.selected_transfer_index.saturating_sub(n)
            }
            View::Overview | View::Dashboard => {}
        }
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        match self.current_view {
            View::Nodes => self.selected_node_index = 0,
            View::Transfers => self.selected_transfer_index = 0,
            View::Overview | View::Dashboard => {}
        }
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        match self.current_view {
            View::Nodes => {
                self.selected_node_index = self.filtered_nodes().len().saturating_sub(1);
            }
            View::Transfers => {
                self.selected_transfer_index = self.sorted_transfers().len().saturating_sub(1);
            }
            View::Overview | View::Dashboard => {}
        }
    }

    /// Nodes matching the filter (id or address), in snapshot order.
    pub fn filtered_nodes(&self) -> Vec<&NodeData> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        data.nodes
            .iter()
            .filter(|n| self.matches_filter(&n.id) || self.matches_filter(&n.address))
            .collect()
    }

    /// Transfers matching the filter (id, model or peer), in sort order.
    pub fn sorted_transfers(&self) -> Vec<&TransferData> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        let mut transfers: Vec<&TransferData> = data
            .transfers
            .iter()
            .filter(|t| {
                self.matches_filter(&t.id)
                    || self.matches_filter(&t.model_name)
                    || self.matches_filter(&t.peer_id)
            })
            .collect();
        sort_transfers_by(&mut transfers, self.transfer_sort_column, self.transfer_sort_ascending);
        transfers
    }

    /// The node under the cursor in the Nodes view.
    pub fn selected_node(&self) -> Option<&NodeData> {
        self.filtered_nodes().get(self.selected_node_index).copied()
    }

    /// The transfer under the cursor in the Transfers view.
    pub fn selected_transfer(&self) -> Option<&TransferData> {
        self.sorted_transfers().get(self.selected_transfer_index).copied()
    }

    /// Open the detail overlay for the currently selected node.
    pub fn enter_detail(&mut self) {
        if self.current_view == View::Nodes && self.selected_node().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlay first, then return to the Overview.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
            return;
        }
        if self.current_view != View::Overview {
            self.current_view = View::Overview;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column (Transfers view).
    pub fn cycle_sort(&mut self) {
        if self.current_view == View::Transfers {
            self.transfer_sort_column = self.transfer_sort_column.next();
        }
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        if self.current_view == View::Transfers {
            self.transfer_sort_ascending = !self.transfer_sort_ascending;
        }
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
        self.clamp_selection();
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.clamp_selection();
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
        self.clamp_selection();
    }

    /// Case-insensitive substring match against the current filter.
    pub fn matches_filter(&self, text: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        text.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    /// Text the copy action would put on the clipboard for the current view.
    pub fn copy_target(&self) -> Option<String> {
        match self.current_view {
            View::Nodes => self.selected_node().map(|n| n.id.clone()),
            View::Transfers => self.selected_transfer().map(|t| t.id.clone()),
            View::Overview | View::Dashboard => {
                self.data.as_ref().map(|d| d.summary.node_id.clone())
            }
        }
    }

    /// Copy the selected id to the clipboard and report the result.
    pub fn copy_selected(&mut self) {
        let Some(text) = self.copy_target() else {
            self.set_status_message("Nothing to copy".to_string());
            return;
        };
        match self.clipboard.copy(&text) {
            Ok(()) => self.set_status_message(format!("Copied {}", text)),
            Err(e) => {
                warn!(error = %e, "clipboard write failed");
                self.set_status_message(format!("Copy failed: {}", e));
            }
        }
    }

    /// Report a node or transfer control that has no backend handler.
    pub fn stub_action(&mut self, action: StubAction) {
        if self.current_view != action.view() {
            return;
        }
        let target = match action.view() {
            View::Nodes => self.selected_node().map(|n| n.id.clone()),
            _ => self.selected_transfer().map(|t| t.id.clone()),
        };
        let Some(target) = target else {
            return;
        };
        info!(action = action.label(), target = %target, "stub action requested");
        self.set_status_message(format!(
            "{} {}: not available from this dashboard",
            action.label(),
            target
        ));
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref data) = self.data else {
            anyhow::bail!("No data to export");
        };
        write_export(data, path)?;
        info!(path = %path.display(), "exported cluster state");
        Ok(())
    }

    /// Export to the configured path and report the result.
    pub fn export(&mut self) {
        let path = self.export_path.clone();
        match self.export_state(&path) {
            Ok(()) => self.set_status_message(format!("Exported to {}", path.display())),
            Err(e) => self.set_status_message(format!("Export failed: {}", e)),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::source::{
        ChannelSource, ClusterStatus, DashboardSnapshot, Node, SourceError, Transfer,
    };

    /// A source that returns queued snapshots and an optional error.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedSource {
        pub snapshots: Vec<DashboardSnapshot>,
        pub error: Option<SourceError>,
    }

    impl DataSource for ScriptedSource {
        fn poll(&mut self) -> Option<DashboardSnapshot> {
            if self.snapshots.is_empty() {
                None
            } else {
                Some(self.snapshots.remove(0))
            }
        }

        fn description(&self) -> &str {
            "scripted"
        }

        fn error(&self) -> Option<SourceError> {
            self.error.clone()
        }
    }

    fn node(id: &str, address: &str, status: &str) -> Node {
        Node {
            id: Some(id.to_string()),
            address: Some(address.to_string()),
            status: Some(status.to_string()),
            ..Default::default()
        }
    }

    fn transfer(id: &str, model: &str, status: &str, progress: f64) -> Transfer {
        Transfer {
            id: Some(id.to_string()),
            model_name: Some(model.to_string()),
            status: Some(status.to_string()),
            progress: Some(progress),
            ..Default::default()
        }
    }

    pub(crate) fn sample_snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            cluster_status: Some(ClusterStatus {
                node_id: Some("node-a".to_string()),
                leader: Some("node-a".to_string()),
                status: Some("healthy".to_string()),
                ..Default::default()
            }),
            nodes: vec![
                node("node-a", "10.0.0.1:8080", "online"),
                node("node-b", "10.0.0.2:8080", "offline"),
                node("node-c", "10.0.0.3:8080", "online"),
            ],
            transfers: vec![
                transfer("t-1", "llama2", "completed", 100.0),
                transfer("t-2", "mistral", "active", 40.0),
                transfer("t-3", "phi", "failed", 10.0),
            ],
            metrics: None,
        }
    }

    pub(crate) fn loaded_app() -> App {
        let source = ScriptedSource {
            snapshots: vec![sample_snapshot()],
            error: None,
        };
        let mut app = App::new(Box::new(source), Thresholds::default(), Theme::dark());
        app.reload_data();
        app
    }

    #[test]
    fn test_view_cycle() {
        for view in View::ALL {
            assert_eq!(view.next().prev(), view);
        }
        assert_eq!(View::Transfers.next(), View::Overview);
        assert_eq!(View::Nodes.index(), 2);
    }

    #[test]
    fn test_loading_until_first_snapshot() {
        let (_tx, source) = ChannelSource::create("test");
        let app = App::new(Box::new(source), Thresholds::default(), Theme::dark());
        assert!(app.is_loading());

        let app = loaded_app();
        assert!(!app.is_loading());
        assert_eq!(app.history.len(), 1);
    }

    #[test]
    fn test_error_keeps_last_snapshot() {
        let mut app = loaded_app();
        app.source = Box::new(ScriptedSource {
            snapshots: Vec::new(),
            error: Some(SourceError::Closed),
        });

        assert!(!app.reload_data());
        assert!(app.data.is_some());
        assert_eq!(app.load_error.as_deref(), Some("Connection closed"));
    }

    #[test]
    fn test_filter_nodes_by_id_or_address() {
        let mut app = loaded_app();
        app.filter_text = "node-b".to_string();
        assert_eq!(app.filtered_nodes().len(), 1);

        app.filter_text = "10.0.0.3".to_string();
        let nodes = app.filtered_nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "node-c");
    }

    #[test]
    fn test_filter_transfers_by_model() {
        let mut app = loaded_app();
        app.filter_text = "MISTRAL".to_string();
        let transfers = app.sorted_transfers();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].id, "t-2");
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut app = loaded_app();
        app.set_view(View::Nodes);
        app.select_last();
        assert_eq!(app.selected_node_index, 2);
        app.select_next();
        assert_eq!(app.selected_node_index, 2);

        app.filter_push('a');
        app.filter_push('-');
        assert_eq!(app.selected_node_index, 0);
    }

    #[test]
    fn test_sort_cycles_only_in_transfers() {
        let mut app = loaded_app();
        let initial = app.transfer_sort_column;
        app.cycle_sort();
        assert_eq!(app.transfer_sort_column, initial);

        app.set_view(View::Transfers);
        app.cycle_sort();
        assert_ne!(app.transfer_sort_column, initial);
    }

    #[test]
    fn test_copy_selected_per_view() {
        let clipboard = MemoryClipboard::new();
        let mut app = loaded_app().with_clipboard(Box::new(clipboard.clone()));

        app.copy_selected();
        assert_eq!(clipboard.last().as_deref(), Some("node-a"));

        app.set_view(View::Nodes);
        app.select_next();
        app.copy_selected();
        assert_eq!(clipboard.last().as_deref(), Some("node-b"));
        assert_eq!(app.get_status_message(), Some("Copied node-b"));

        app.set_view(View::Transfers);
        app.copy_selected();
        assert_eq!(clipboard.contents().len(), 3);
    }

    #[test]
    fn test_copy_without_data() {
        let clipboard = MemoryClipboard::new();
        let source = Box::new(ScriptedSource::default());
        let mut app = App::new(source, Thresholds::default(), Theme::dark())
            .with_clipboard(Box::new(clipboard.clone()));
        app.copy_selected();
        assert!(clipboard.contents().is_empty());
        assert_eq!(app.get_status_message(), Some("Nothing to copy"));
    }

    #[test]
    fn test_stub_actions_only_report() {
        let mut app = loaded_app();
        app.stub_action(StubAction::Drain);
        assert!(app.get_status_message().is_none());

        app.set_view(View::Nodes);
        app.stub_action(StubAction::Drain);
        let message = app.get_status_message().unwrap();
        assert!(message.starts_with("Drain node-a"));
        assert_eq!(app.data.as_ref().unwrap().summary.online_count, 2);
    }

    #[test]
    fn test_detail_overlay_only_for_nodes() {
        let mut app = loaded_app();
        app.enter_detail();
        assert!(!app.show_detail_overlay);

        app.set_view(View::Nodes);
        app.enter_detail();
        assert!(app.show_detail_overlay);

        app.go_back();
        assert!(!app.show_detail_overlay);
        app.go_back();
        assert_eq!(app.current_view, View::Overview);
    }

    #[test]
    fn test_export_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded_app();
        app.export_path = dir.path().join("out.json");
        app.export();

        let written = std::fs::read_to_string(&app.export_path).unwrap();
        assert!(written.contains("\"online_count\": 2"));
        assert!(app.get_status_message().unwrap().starts_with("Exported to"));
    }

    #[test]
    fn test_export_without_data_fails() {
        let source = Box::new(ScriptedSource::default());
        let app = App::new(source, Thresholds::default(), Theme::dark());
        assert!(app.export_state(Path::new("unused.json")).is_err());
    }
}
