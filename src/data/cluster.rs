//! Display data derived from a cluster snapshot.
//!
//! This module turns a raw [`DashboardSnapshot`] into values the views can
//! render directly: counts, clamped percentages, parsed status enums and
//! "Unknown" fallbacks. Nothing here fails; malformed input degrades to
//! defaults.

use std::time::Instant;

use super::format::{clamp_percent, or_unknown};
use crate::source::{ClusterMetrics, DashboardSnapshot, Node, Transfer};

/// Usage thresholds for gauge colors, in percent.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Usage at or above this is shown as a warning.
    pub usage_warning: f64,
    /// Usage at or above this is shown as critical.
    pub usage_critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            usage_warning: 70.0,
            usage_critical: 90.0,
        }
    }
}

impl Thresholds {
    /// Health level for a clamped usage percentage.
    pub fn level(&self, percent: f64) -> HealthStatus {
        if percent >= self.usage_critical {
            HealthStatus::Critical
        } else if percent >= self.usage_warning {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }
}

/// Health status used for color thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "OK",
            HealthStatus::Warning => "WARN",
            HealthStatus::Critical => "CRIT",
        }
    }
}

/// Node lifecycle status as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeStatus {
    Online,
    Offline,
    Ready,
    Loading,
    /// Any other reported value, kept verbatim.
    Other(String),
    Unknown,
}

impl NodeStatus {
    /// Parse the wire value. Matching is exact, so only `online` counts as online.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("online") => NodeStatus::Online,
            Some("offline") => NodeStatus::Offline,
            Some("ready") => NodeStatus::Ready,
            Some("loading") => NodeStatus::Loading,
            Some(s) if !s.trim().is_empty() => NodeStatus::Other(s.to_string()),
            _ => NodeStatus::Unknown,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            NodeStatus::Online => "online",
            NodeStatus::Offline => "offline",
            NodeStatus::Ready => "ready",
            NodeStatus::Loading => "loading",
            NodeStatus::Other(s) => s,
            NodeStatus::Unknown => "Unknown",
        }
    }
}

/// Direction of a model transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferKind {
    Download,
    Upload,
    Other(String),
    Unknown,
}

impl TransferKind {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("download") => TransferKind::Download,
            Some("upload") => TransferKind::Upload,
            Some(s) if !s.trim().is_empty() => TransferKind::Other(s.to_string()),
            _ => TransferKind::Unknown,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TransferKind::Download => "download",
            TransferKind::Upload => "upload",
            TransferKind::Other(s) => s,
            TransferKind::Unknown => "Unknown",
        }
    }

    /// Arrow glyph for the table.
    pub fn arrow(&self) -> &'static str {
        match self {
            TransferKind::Download => "↓",
            TransferKind::Upload => "↑",
            _ => "·",
        }
    }
}

/// Lifecycle of a model transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStatus {
    Active,
    Completed,
    Failed,
    Other(String),
    Unknown,
}

impl TransferStatus {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("active") => TransferStatus::Active,
            Some("completed") => TransferStatus::Completed,
            Some("failed") => TransferStatus::Failed,
            Some(s) if !s.trim().is_empty() => TransferStatus::Other(s.to_string()),
            _ => TransferStatus::Unknown,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TransferStatus::Active => "active",
            TransferStatus::Completed => "completed",
            TransferStatus::Failed => "failed",
            TransferStatus::Other(s) => s,
            TransferStatus::Unknown => "Unknown",
        }
    }

    /// Sort rank: active first, then failed, completed, everything else.
    fn rank(&self) -> u8 {
        match self {
            TransferStatus::Active => 0,
            TransferStatus::Failed => 1,
            TransferStatus::Completed => 2,
            TransferStatus::Other(_) => 3,
            TransferStatus::Unknown => 4,
        }
    }
}

impl PartialOrd for TransferStatus {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TransferStatus {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank()).then_with(|| self.label().cmp(other.label()))
    }
}

/// CPU, memory and network usage at one point in time, in clamped percent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricsSample {
    pub cpu: f64,
    pub memory: f64,
    pub network: f64,
}

/// A node ready for display.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub id: String,
    pub address: String,
    pub status: NodeStatus,
    pub cpu: f64,
    pub memory: f64,
    pub bandwidth: f64,
    pub models: Vec<String>,
}

impl NodeData {
    fn from_node(node: &Node) -> Self {
        let usage = node.usage.as_ref();
        Self {
            id: or_unknown(node.id.as_deref()),
            address: or_unknown(node.address.as_deref()),
            status: NodeStatus::parse(node.status.as_deref()),
            cpu: clamp_percent(usage.and_then(|u| u.cpu)),
            memory: clamp_percent(usage.and_then(|u| u.memory)),
            bandwidth: clamp_percent(usage.and_then(|u| u.bandwidth)),
            models: node.models.clone(),
        }
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Worst usage level across the three gauges.
    pub fn usage_health(&self, thresholds: &Thresholds) -> HealthStatus {
        [self.cpu, self.memory, self.bandwidth]
            .into_iter()
            .map(|v| thresholds.level(v))
            .max()
            .unwrap_or(HealthStatus::Healthy)
    }
}

/// A transfer ready for display.
#[derive(Debug, Clone)]
pub struct TransferData {
    pub id: String,
    pub model_name: String,
    pub kind: TransferKind,
    pub status: TransferStatus,
    /// Clamped to 0-100.
    pub progress: f64,
    /// Bytes per second, if reported.
    pub speed: Option<f64>,
    /// Seconds remaining, if reported.
    pub eta: Option<f64>,
    pub peer_id: String,
}

impl TransferData {
    fn from_transfer(transfer: &Transfer) -> Self {
        Self {
            id: or_unknown(transfer.id.as_deref()),
            model_name: or_unknown(transfer.model_name.as_deref()),
            kind: TransferKind::parse(transfer.kind.as_deref()),
            status: TransferStatus::parse(transfer.status.as_deref()),
            progress: clamp_percent(transfer.progress),
            speed: transfer.speed.filter(|s| s.is_finite() && *s >= 0.0),
            eta: transfer.eta.filter(|s| s.is_finite() && *s >= 0.0),
            peer_id: or_unknown(transfer.peer_id.as_deref()),
        }
    }
}

/// Badge counts for the transfers view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferCounts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub failed: usize,
}

impl TransferCounts {
    pub fn from_transfers(transfers: &[TransferData]) -> Self {
        let count = |status: TransferStatus| transfers.iter().filter(|t| t.status == status).count();
        Self {
            total: transfers.len(),
            active: count(TransferStatus::Active),
            completed: count(TransferStatus::Completed),
            failed: count(TransferStatus::Failed),
        }
    }
}

/// Cluster identity and aggregate counts for the overview cards.
#[derive(Debug, Clone)]
pub struct ClusterSummary {
    pub node_id: String,
    pub leader: String,
    pub status: String,
    pub peer_count: u64,
    pub node_count: usize,
    pub online_count: usize,
    pub offline_count: usize,
    pub model_count: usize,
    pub total_requests: u64,
    /// Milliseconds.
    pub avg_latency: f64,
}

impl ClusterSummary {
    /// Online nodes as a percentage of all nodes; 0 when there are none.
    pub fn online_percent(&self) -> f64 {
        if self.node_count == 0 {
            0.0
        } else {
            self.online_count as f64 / self.node_count as f64 * 100.0
        }
    }

    /// True when this node is the leader.
    pub fn is_leader(&self) -> bool {
        self.node_id != super::format::UNKNOWN && self.node_id == self.leader
    }
}

/// Complete display data for one snapshot.
#[derive(Debug, Clone)]
pub struct ClusterData {
    pub summary: ClusterSummary,
    pub nodes: Vec<NodeData>,
    pub transfers: Vec<TransferData>,
    pub transfer_counts: TransferCounts,
    pub metrics: MetricsSample,
    pub last_updated: Instant,
}

impl ClusterData {
    /// Derive display data from a snapshot.
    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Self {
        let nodes: Vec<NodeData> = snapshot.nodes.iter().map(NodeData::from_node).collect();
        let transfers: Vec<TransferData> =
            snapshot.transfers.iter().map(TransferData::from_transfer).collect();

        let status = snapshot.cluster_status.as_ref();
        let raw_metrics =
            snapshot.metrics.as_ref().or_else(|| status.and_then(|s| s.metrics.as_ref()));

        let online_count = nodes.iter().filter(|n| n.status == NodeStatus::Online).count();
        let summary = ClusterSummary {
            node_id: or_unknown(status.and_then(|s| s.node_id.as_deref())),
            leader: or_unknown(status.and_then(|s| s.leader.as_deref())),
            status: or_unknown(status.and_then(|s| s.status.as_deref())),
            peer_count: status.and_then(|s| s.peers.as_ref()).map_or(0, |p| p.count()),
            node_count: nodes.len(),
            online_count,
            offline_count: nodes.len() - online_count,
            model_count: nodes.iter().map(NodeData::model_count).sum(),
            total_requests: raw_metrics
                .and_then(|m| m.total_requests)
                .filter(|v| v.is_finite() && *v > 0.0)
                .map_or(0, |v| v as u64),
            avg_latency: raw_metrics
                .and_then(|m| m.avg_latency)
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(0.0),
        };

        let metrics = Self::sample(raw_metrics, &nodes);

        Self {
            summary,
            transfer_counts: TransferCounts::from_transfers(&transfers),
            nodes,
            transfers,
            metrics,
            last_updated: Instant::now(),
        }
    }

    /// Resource sample: reported cluster metrics, falling back to the mean of
    /// node usage for any value the backend left out.
    fn sample(metrics: Option<&ClusterMetrics>, nodes: &[NodeData]) -> MetricsSample {
        let pick = |reported: Option<f64>, fallback: f64| match reported {
            Some(v) if !v.is_nan() => clamp_percent(Some(v)),
            _ => fallback,
        };

        MetricsSample {
            cpu: pick(metrics.and_then(|m| m.cpu_usage), mean(nodes, |n| n.cpu)),
            memory: pick(metrics.and_then(|m| m.memory_usage), mean(nodes, |n| n.memory)),
            network: pick(metrics.and_then(|m| m.network_usage), mean(nodes, |n| n.bandwidth)),
        }
    }

    /// Find a node by id.
    pub fn node(&self, id: &str) -> Option<&NodeData> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

fn mean(nodes: &[NodeData], f: impl Fn(&NodeData) -> f64) -> f64 {
    if nodes.is_empty() {
        0.0
    } else {
        nodes.iter().map(f).sum::<f64>() / nodes.len() as f64
    }
}
