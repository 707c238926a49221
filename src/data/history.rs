//! Real-time metrics history for the dashboard mini-charts.

use std::collections::VecDeque;
use std::time::Instant;

use super::cluster::ClusterData;

/// Maximum number of samples to keep per series.
pub const MAX_HISTORY_SIZE: usize = 60;

/// Which resource series to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cpu,
    Memory,
    Network,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Cpu => "CPU",
            Metric::Memory => "Memory",
            Metric::Network => "Network",
        }
    }
}

/// Tracks resource usage over time.
///
/// Records one sample per received snapshot so the dashboard can draw
/// CPU, memory and network sparklines and a request rate.
#[derive(Debug, Clone, Default)]
pub struct History {
    cpu: VecDeque<f64>,
    memory: VecDeque<f64>,
    network: VecDeque<f64>,
    requests: VecDeque<u64>,
    timestamps: VecDeque<Instant>,
}

fn push_bounded<T>(series: &mut VecDeque<T>, value: T) {
    series.push_back(value);
    if series.len() > MAX_HISTORY_SIZE {
        series.pop_front();
    }
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new data snapshot.
    pub fn record(&mut self, data: &ClusterData) {
        push_bounded(&mut self.cpu, data.metrics.cpu);
        push_bounded(&mut self.memory, data.metrics.memory);
        push_bounded(&mut self.network, data.metrics.network);
        push_bounded(&mut self.requests, data.summary.total_requests);
        push_bounded(&mut self.timestamps, data.last_updated);
    }

    /// Number of recorded samples.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    fn series(&self, metric: Metric) -> &VecDeque<f64> {
        match metric {
            Metric::Cpu => &self.cpu,
            Metric::Memory => &self.memory,
            Metric::Network => &self.network,
        }
    }

    /// Series values as whole percentages, oldest first, for a sparkline.
    pub fn sparkline(&self, metric: Metric) -> Vec<u64> {
        self.series(metric).iter().map(|v| v.round() as u64).collect()
    }

    /// Most recent value of a series.
    pub fn latest(&self, metric: Metric) -> Option<f64> {
        self.series(metric).back().copied()
    }

    /// Highest value currently in the window.
    pub fn peak(&self, metric: Metric) -> Option<f64> {
        self.series(metric).iter().copied().reduce(f64::max)
    }

    /// Requests per second between the last two samples.
    ///
    /// Returns None if there's not enough history, or if the counter went
    /// backwards (backend restart).
    pub fn request_rate(&self) -> Option<f64> {
        if self.requests.len() < 2 || self.timestamps.len() < 2 {
            return None;
        }

        let current = *self.requests.back()?;
        let previous = *self.requests.get(self.requests.len() - 2)?;
        let delta = current.checked_sub(previous)?;

        let current_time = self.timestamps.back()?;
        let previous_time = self.timestamps.get(self.timestamps.len() - 2)?;
        let elapsed = current_time.duration_since(*previous_time).as_secs_f64();

        if elapsed > 0.0 {
            Some(delta as f64 / elapsed)
        } else {
            None
        }
    }
}
