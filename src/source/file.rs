//! File-based data source.
//!
//! Polls a JSON file for dashboard snapshots.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};

use super::{decode_update, DashboardSnapshot, DataSource, SourceError};

/// A data source that reads dashboard snapshots from a JSON file.
///
/// The file may hold either a full snapshot or a single `{type, data}`
/// envelope, which is merged into the last snapshot read.
///
/// The source tracks the file's modification time and only returns
/// new data when the file has been updated.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<SourceError>,
    last_modified: Option<SystemTime>,
    current: DashboardSnapshot,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            last_modified: None,
            current: DashboardSnapshot::default(),
        }
    }

    /// Returns the path being monitored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    /// Keep `error` as the last error. Returns true (and warns) only when it
    /// differs from the previous one.
    fn record_error(&mut self, error: SourceError) -> bool {
        let is_new = self.last_error.as_ref() != Some(&error);
        if is_new {
            warn!(path = %self.path.display(), error = %error, "failed to read snapshot file");
        } else {
            debug!(path = %self.path.display(), "snapshot file still unreadable");
        }
        self.last_error = Some(error);
        is_new
    }

    fn read_file(&mut self) -> Result<DashboardSnapshot, SourceError> {
        let content = fs::read(&self.path)?;
        let update = decode_update(&content)?;
        let mut next = self.current.clone();
        next.apply(update);
        Ok(next)
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<DashboardSnapshot> {
        let current_modified = self.get_modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,        // First poll, always read
            (Some(_), None) => false, // File disappeared, keep what we have
            (Some(last), Some(current)) => current > last,
        };

        if !file_changed {
            return None;
        }

        match self.read_file() {
            Ok(snapshot) => {
                debug!(path = %self.path.display(), nodes = snapshot.nodes.len(), "snapshot read");
                self.last_error = None;
                self.last_modified = current_modified;
                self.current = snapshot.clone();
                Some(snapshot)
            }
            Err(e) => {
                // Skip the same broken file until it changes again
                if current_modified.is_some() {
                    self.last_modified = current_modified;
                }
                self.record_error(e);
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<SourceError> {
        self.last_error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, Write};
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "cluster_status": { "node_id": "node-a", "peers": 2 },
            "nodes": [
                { "id": "node-a", "status": "online" },
                { "id": "node-b", "status": "offline" }
            ]
        }"#
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/cluster.json");
        assert_eq!(source.path(), Path::new("/tmp/cluster.json"));
        assert_eq!(source.description(), "file: /tmp/cluster.json");
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_poll_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());

        let snapshot = source.poll().expect("first poll returns data");
        assert_eq!(snapshot.nodes.len(), 2);

        // Second poll without file change should return None
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_file_source_detects_changes() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());
        let _ = source.poll();

        std::thread::sleep(std::time::Duration::from_millis(10));
        file.rewind().unwrap();
        file.as_file().set_len(0).unwrap();
        writeln!(file, r#"{{"nodes": [{{"id": "node-z"}}]}}"#).unwrap();
        file.flush().unwrap();

        // Low mtime resolution on some filesystems can hide the change
        if let Some(s) = source.poll() {
            assert_eq!(s.nodes[0].id.as_deref(), Some("node-z"));
        }
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent/path/cluster.json");

        assert!(source.poll().is_none());
        let err = source.error().expect("error recorded");
        assert!(matches!(err, SourceError::Read(_)));
        assert!(err.to_string().contains("Read error"));
    }

    #[test]
    fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut source = FileSource::new(file.path());

        assert!(source.poll().is_none());
        assert!(matches!(source.error(), Some(SourceError::Parse(_))));

        // Unchanged broken file is not re-read; the error stays visible
        assert!(source.poll().is_none());
        assert!(matches!(source.error(), Some(SourceError::Parse(_))));
    }

    #[test]
    fn test_repeated_error_reported_once() {
        let mut source = FileSource::new("/nonexistent/path/cluster.json");

        assert!(source.record_error(SourceError::Read("gone".to_string())));
        assert!(!source.record_error(SourceError::Read("gone".to_string())));
        assert!(source.record_error(SourceError::Parse("bad".to_string())));

        // A missing file keeps failing with the same error
        assert!(source.poll().is_none());
        let first = source.error();
        assert!(source.poll().is_none());
        assert_eq!(source.error(), first);
    }
}
