//! Display data derived from cluster snapshots.
//!
//! ## Submodules
//!
//! - [`cluster`]: Counts, clamped percentages and status enums ([`ClusterData`])
//! - [`duration`]: Refresh interval parsing and ETA formatting
//! - [`export`]: JSON export of the current state
//! - [`format`]: Display strings and "Unknown" / "N/A" fallbacks
//! - [`history`]: Real-time metric history for the dashboard sparklines
//!
//! ## Data Flow
//!
//! ```text
//! DashboardSnapshot (raw JSON)
//!        │
//!        ▼
//! ClusterData::from_snapshot()
//!        │
//!        ├──▶ NodeData / TransferData (parsed, clamped, with fallbacks)
//!        │
//!        └──▶ History::record() (for sparklines)
//! ```

pub mod cluster;
pub mod duration;
pub mod export;
pub mod format;
pub mod history;

pub use cluster::{
    ClusterData, ClusterSummary, HealthStatus, MetricsSample, NodeData, NodeStatus, Thresholds,
    TransferCounts, TransferData, TransferKind, TransferStatus,
};
pub use history::{History, Metric};
