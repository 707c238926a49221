//! Stream-based data source.
//!
//! Receives snapshots from an async byte stream, such as a TCP connection
//! to the cluster's dashboard feed.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{decode_update, DashboardSnapshot, DataSource, SourceError};

type ErrorSlot = Arc<Mutex<Option<SourceError>>>;

fn set_error(slot: &ErrorSlot, error: Option<SourceError>) {
    if let Ok(mut guard) = slot.lock() {
        *guard = error;
    }
}

/// Merges one raw message into `current` and forwards the result.
///
/// Returns false once the receiving side has gone away.
async fn forward(
    bytes: &[u8],
    current: &mut DashboardSnapshot,
    tx: &mpsc::Sender<DashboardSnapshot>,
    errors: &ErrorSlot,
) -> bool {
    match decode_update(bytes) {
        Ok(update) => {
            set_error(errors, None);
            if current.apply(update) {
                return tx.send(current.clone()).await.is_ok();
            }
            true
        }
        Err(e) => {
            debug!(error = %e, "skipping undecodable message");
            set_error(errors, Some(e.into()));
            true
        }
    }
}

/// A data source that receives snapshots from an async stream.
///
/// This source spawns a background task that reads newline-delimited JSON
/// from the provided async reader. Each line is either a full snapshot or a
/// `{type, data}` envelope; envelopes are merged into the last snapshot
/// before it is handed to `poll()`.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use clusterwatch::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"{}\n";
/// let stream = Cursor::new(data.to_vec());
/// let source = StreamSource::spawn(stream, "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<DashboardSnapshot>,
    description: String,
    last_error: ErrorSlot,
}

impl StreamSource {
    /// Spawn a background task that reads from the given async reader.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);
        let last_error: ErrorSlot = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();
        let desc = description.to_string();

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();
            let mut current = DashboardSnapshot::default();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        info!(source = %desc, "stream closed");
                        set_error(&error_handle, Some(SourceError::Closed));
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        if !forward(trimmed.as_bytes(), &mut current, &tx, &error_handle).await {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(source = %desc, error = %e, "stream read failed");
                        set_error(&error_handle, Some(e.into()));
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            last_error,
        }
    }

    /// Create a StreamSource from a channel of raw JSON messages.
    ///
    /// Each message is one snapshot or envelope, without framing.
    pub fn from_bytes_channel(mut rx: mpsc::Receiver<Vec<u8>>, description: &str) -> Self {
        let (tx, snapshot_rx) = mpsc::channel(16);
        let last_error: ErrorSlot = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();

        tokio::spawn(async move {
            let mut current = DashboardSnapshot::default();
            while let Some(bytes) = rx.recv().await {
                if !forward(&bytes, &mut current, &tx, &error_handle).await {
                    break;
                }
            }
        });

        Self {
            receiver: snapshot_rx,
            description: format!("stream: {}", description),
            last_error,
        }
    }
}

impl DataSource for StreamSource {
    fn poll(&mut self) -> Option<DashboardSnapshot> {
        // Drain to the newest snapshot; intermediate ones are stale
        let mut latest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(snapshot) => latest = Some(snapshot),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    if let Ok(mut guard) = self.last_error.lock() {
                        guard.get_or_insert(SourceError::Disconnected);
                    }
                    break;
                }
            }
        }
        latest
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<SourceError> {
        self.last_error.lock().ok().and_then(|guard| guard.clone())
    }
}
