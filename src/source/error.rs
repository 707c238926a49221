//! Errors reported by snapshot sources.

use thiserror::Error;

/// Why a source could not deliver a snapshot.
///
/// Sources keep the most recent error and surface it through
/// [`DataSource::error`](super::DataSource::error) so the status bar can show
/// it next to the last good data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Reading from the file or socket failed.
    #[error("Read error: {0}")]
    Read(String),

    /// The payload was not a valid snapshot.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The backend API answered with an error or could not be reached.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The remote end closed the connection.
    #[error("Connection closed")]
    Closed,

    /// The producer side of the source went away.
    #[error("Stream disconnected")]
    Disconnected,
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Read(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Http(err.to_string())
        }
    }
}
