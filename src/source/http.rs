//! HTTP polling data source.
//!
//! Queries the cluster's admin REST API on an interval and assembles the
//! responses into a [`DashboardSnapshot`].
//!
//! ## Endpoints
//!
//! - `GET /api/v1/cluster/status`: cluster identity and metrics (required)
//! - `GET /api/v1/nodes`: `{"nodes": {"<id>": {...}}}` or `{"nodes": [...]}` (required)
//! - `GET /api/v1/transfers`: `{"transfers": [...]}` (optional)
//! - `GET /api/v1/metrics`: flat real-time metrics (optional)
//!
//! Optional endpoints that fail are logged and left empty so an older
//! backend without a transfer manager still shows nodes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Client;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{
    ChannelSource, ClusterMetrics, ClusterStatus, DashboardSnapshot, DataSource, SnapshotPatch,
    SourceError,
};

/// Request timeout for each endpoint.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Paths of the admin API endpoints, relative to the base URL.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub cluster_status: String,
    pub nodes: String,
    pub transfers: String,
    pub metrics: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            cluster_status: "/api/v1/cluster/status".to_string(),
            nodes: "/api/v1/nodes".to_string(),
            transfers: "/api/v1/transfers".to_string(),
            metrics: "/api/v1/metrics".to_string(),
        }
    }
}

/// Fetches one snapshot from the admin API.
#[derive(Debug, Clone)]
pub struct Collector {
    client: Client,
    base_url: String,
    endpoints: Endpoints,
}

impl Collector {
    /// Create a collector for the given base URL (e.g. `http://10.0.0.1:8080`).
    pub fn new(base_url: &str, endpoints: Endpoints) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoints,
        })
    }

    /// Collect a full snapshot.
    pub async fn collect(&self) -> Result<DashboardSnapshot, SourceError> {
        let status: ClusterStatus =
            serde_json::from_value(self.get_json(&self.endpoints.cluster_status).await?)?;
        let nodes = list_patch(self.get_json(&self.endpoints.nodes).await?, "nodes")?
            .nodes
            .unwrap_or_default();

        let transfers = match self.get_json(&self.endpoints.transfers).await {
            Ok(value) => list_patch(value, "transfers")?.transfers.unwrap_or_default(),
            Err(e) => {
                debug!(error = %e, "transfers endpoint unavailable");
                Vec::new()
            }
        };

        let metrics = match self.get_json(&self.endpoints.metrics).await {
            Ok(value) => serde_json::from_value::<ClusterMetrics>(value).ok(),
            Err(e) => {
                debug!(error = %e, "metrics endpoint unavailable");
                None
            }
        };

        Ok(DashboardSnapshot {
            cluster_status: Some(status),
            nodes,
            transfers,
            metrics,
        })
    }

    async fn get_json(&self, path: &str) -> Result<Value, SourceError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::Http(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}

/// Accepts `{"<key>": [...]}`, an id-keyed `{"<key>": {...}}` or a bare array.
fn list_patch(value: Value, key: &str) -> Result<SnapshotPatch, SourceError> {
    let value = if value.is_array() {
        let mut map = Map::new();
        map.insert(key.to_string(), value);
        Value::Object(map)
    } else {
        value
    };
    Ok(serde_json::from_value(value)?)
}

/// A data source that polls the cluster admin API in the background.
///
/// Must be created inside a tokio runtime.
#[derive(Debug)]
pub struct HttpSource {
    inner: ChannelSource,
    description: String,
    last_error: Arc<Mutex<Option<SourceError>>>,
    received_any: bool,
}

impl HttpSource {
    /// Spawn the polling task.
    pub fn spawn(base_url: &str, interval: Duration) -> Result<Self, SourceError> {
        Self::spawn_with(Collector::new(base_url, Endpoints::default())?, interval)
    }

    /// Spawn the polling task with a preconfigured collector.
    pub fn spawn_with(collector: Collector, interval: Duration) -> Result<Self, SourceError> {
        let description = format!("http: {}", collector.base_url);
        let (tx, rx) = watch::channel(DashboardSnapshot::default());
        let last_error = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();

        info!(url = %collector.base_url, ?interval, "polling cluster API");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let result = collector.collect().await;
                let error = match result {
                    Ok(snapshot) => {
                        if tx.send(snapshot).is_err() {
                            break;
                        }
                        None
                    }
                    Err(e) => {
                        warn!(error = %e, "cluster API poll failed");
                        Some(e)
                    }
                };
                if let Ok(mut guard) = error_handle.lock() {
                    *guard = error;
                }
            }
        });

        Ok(Self {
            inner: ChannelSource::new(rx, &description),
            description,
            last_error,
            received_any: false,
        })
    }
}

impl DataSource for HttpSource {
    fn poll(&mut self) -> Option<DashboardSnapshot> {
        let snapshot = self.inner.poll()?;
        // The watch channel starts with an empty placeholder; wait for the
        // first real poll so the loading spinner stays up until then.
        if !self.received_any && snapshot == DashboardSnapshot::default() {
            return None;
        }
        self.received_any = true;
        Some(snapshot)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<SourceError> {
        self.last_error.lock().ok().and_then(|guard| guard.clone())
    }
}
