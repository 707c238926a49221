//! Channel-based data source.
//!
//! Receives snapshots via a tokio watch channel. This is useful when the
//! snapshots are produced in-process (an embedding application, or the
//! HTTP poller) and pushed rather than polled from a file.

use tokio::sync::watch;

use super::{DashboardSnapshot, DataSource, SourceError};

/// A data source that receives snapshots via a channel.
///
/// # Example
///
/// ```
/// use clusterwatch::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("in-process");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<DashboardSnapshot>,
    description: String,
    /// Track if we've returned the initial value yet
    initial_returned: bool,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// * `receiver` - The receiving end of a watch channel
    /// * `source_description` - Where the snapshots come from
    pub fn new(receiver: watch::Receiver<DashboardSnapshot>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            initial_returned: false,
        }
    }

    /// Create a channel pair for sending snapshots to a ChannelSource.
    ///
    /// Returns (sender, source).
    pub fn create(source_description: &str) -> (watch::Sender<DashboardSnapshot>, Self) {
        let (tx, rx) = watch::channel(DashboardSnapshot::default());
        (tx, Self::new(rx, source_description))
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<DashboardSnapshot> {
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        if self.receiver.has_changed().unwrap_or(false) {
            Some(self.receiver.borrow_and_update().clone())
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<SourceError> {
        // Producers report their own failures; a closed channel still
        // leaves the last snapshot readable.
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Node;

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");

        // Initially returns the default (empty) snapshot
        let snapshot = source.poll().expect("initial snapshot");
        assert!(snapshot.nodes.is_empty());

        // No change, so poll returns None
        assert!(source.poll().is_none());

        let new_snapshot = DashboardSnapshot {
            nodes: vec![Node {
                id: Some("node-1".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        tx.send(new_snapshot).unwrap();

        let snapshot = source.poll().expect("updated snapshot");
        assert_eq!(snapshot.nodes.len(), 1);
    }

    #[test]
    fn test_channel_source_description() {
        let (_tx, source) = ChannelSource::create("in-process");
        assert_eq!(source.description(), "channel: in-process");
        assert!(source.error().is_none());
    }
}
