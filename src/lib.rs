//! # clusterwatch
//!
//! A terminal dashboard and library for watching a distributed inference cluster.
//!
//! The crate receives cluster snapshots (node list, model transfers, cluster
//! status and metrics) from a source such as a JSON file, a network stream,
//! an in-process channel or the cluster's REST API, and renders them in an
//! interactive terminal UI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(counts,  │    │(views,  │    │         │ │
//! │  └────┬────┘    │ history) │    │ spinner)│    └─────────┘ │
//! │       │         └──────────┘    └─────────┘                │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── File | Stream | Channel | Http              │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation and user interaction
//! - **[`source`]**: The [`DataSource`] trait and its implementations
//! - **[`data`]**: Converts raw snapshots into [`ClusterData`] with counts,
//!   clamped percentages and "Unknown" fallbacks; keeps metric history
//! - **[`ui`]**: ratatui rendering of the Overview, Dashboard, Nodes and
//!   Transfers views plus the loading spinner
//! - **[`config`]** / **[`logging`]**: Settings file, environment overrides
//!   and file logging
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a JSON snapshot file
//! clusterwatch --file cluster.json
//!
//! # Poll the cluster admin API
//! clusterwatch --url http://localhost:8080
//!
//! # Read newline-delimited snapshots over TCP
//! clusterwatch --connect localhost:9090
//! ```
//!
//! ### As a library with a channel source
//!
//! ```
//! use clusterwatch::{App, ChannelSource, Theme, Thresholds};
//!
//! let (tx, source) = ChannelSource::create("in-process");
//! let app = App::new(Box::new(source), Thresholds::default(), Theme::dark());
//! assert!(app.is_loading());
//! ```
//!
//! ### As a library with a stream source
//!
//! ```no_run
//! use std::io::Cursor;
//! use clusterwatch::{App, StreamSource, Theme, Thresholds};
//!
//! # tokio_test::block_on(async {
//! // In practice, use a TcpStream
//! let stream = Cursor::new(b"{\"nodes\": []}\n".to_vec());
//! let source = StreamSource::spawn(stream, "example");
//! let app = App::new(Box::new(source), Thresholds::default(), Theme::dark());
//! # });
//! ```

pub mod app;
pub mod clipboard;
pub mod config;
pub mod data;
pub mod events;
pub mod logging;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use clipboard::ClipboardSink;
pub use crate::config::{Settings, ThemeChoice};
pub use data::{
    ClusterData, HealthStatus, NodeData, NodeStatus, Thresholds, TransferData, TransferStatus,
};
pub use source::{
    ChannelSource, DashboardSnapshot, DataSource, FileSource, HttpSource, SourceError,
    StreamSource,
};
pub use ui::Theme;
