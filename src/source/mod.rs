//! Data source abstraction for receiving cluster snapshots.
//!
//! This module provides a trait-based abstraction for receiving dashboard
//! snapshots from various places: a JSON file, a newline-delimited JSON
//! stream, an in-process channel, or the cluster's REST API.

mod channel;
mod error;
mod file;
mod http;
mod snapshot;
mod stream;

pub use channel::ChannelSource;
pub use error::SourceError;
pub use file::FileSource;
pub use http::{Collector, Endpoints, HttpSource};
pub use snapshot::{
    decode_update, ClusterMetrics, ClusterStatus, DashboardSnapshot, Node, NodeUsage, Peers,
    SnapshotPatch, SnapshotUpdate, Transfer,
};
pub use stream::StreamSource;

use std::fmt::Debug;

/// Trait for receiving cluster snapshots from various sources.
///
/// # Example
///
/// ```
/// use clusterwatch::{DataSource, FileSource};
///
/// let mut source = FileSource::new("cluster.json");
/// if let Some(snapshot) = source.poll() {
///     println!("Got {} nodes", snapshot.nodes.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest snapshot.
    ///
    /// Returns `Some(snapshot)` if new data is available, `None` otherwise.
    /// This method must not block.
    fn poll(&mut self) -> Option<DashboardSnapshot>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// The error from the most recent poll, if any.
    fn error(&self) -> Option<SourceError>;
}
