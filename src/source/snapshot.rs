//! Wire types for cluster snapshots.
//!
//! These types match the JSON shapes served by the cluster's admin API and
//! pushed over its WebSocket feed. Every field is optional: a value that is
//! missing or has the wrong JSON type deserializes to `None` (or an empty
//! list) instead of failing the whole snapshot, so the views can fall back
//! to "Unknown" / 0 for that field alone.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A complete point-in-time copy of backend state.
///
/// Accepts both snake_case and the camelCase keys used by the web dashboard
/// (`clusterStatus`, `realTimeMetrics`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(
        default,
        alias = "clusterStatus",
        deserialize_with = "lenient::object",
        skip_serializing_if = "Option::is_none"
    )]
    pub cluster_status: Option<ClusterStatus>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub nodes: Vec<Node>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub transfers: Vec<Transfer>,

    /// Real-time metrics sample. Takes precedence over `cluster_status.metrics`.
    #[serde(
        default,
        alias = "realTimeMetrics",
        deserialize_with = "lenient::object",
        skip_serializing_if = "Option::is_none"
    )]
    pub metrics: Option<ClusterMetrics>,
}

/// Identity and health of the cluster as seen by the queried node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterStatus {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub leader: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "lenient::peers", skip_serializing_if = "Option::is_none")]
    pub peers: Option<Peers>,

    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ClusterMetrics>,
}

/// Peers are reported either as a bare count or as a list of peer ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Peers {
    Count(u64),
    List(Vec<String>),
}

impl Peers {
    /// Number of peers regardless of representation.
    pub fn count(&self) -> u64 {
        match self {
            Peers::Count(n) => *n,
            Peers::List(ids) => ids.len() as u64,
        }
    }
}

/// Aggregate request and resource metrics.
///
/// `avgLatency` is in milliseconds. Usage values are percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterMetrics {
    #[serde(
        default,
        rename = "totalRequests",
        alias = "total_requests",
        alias = "requests_processed",
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_requests: Option<f64>,

    #[serde(
        default,
        rename = "avgLatency",
        alias = "avg_latency",
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub avg_latency: Option<f64>,

    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub cpu_usage: Option<f64>,

    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<f64>,

    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub network_usage: Option<f64>,
}

/// A cluster member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// One of `online`, `offline`, `ready`, `loading`; anything else is kept verbatim.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub usage: Option<NodeUsage>,

    /// Model names. Entries may be plain strings or objects with a `name`.
    #[serde(default, deserialize_with = "lenient::models")]
    pub models: Vec<String>,
}

/// Per-node resource usage, in percent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeUsage {
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,

    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub memory: Option<f64>,

    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<f64>,
}

/// A model transfer between this node and a peer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(
        default,
        alias = "model",
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub model_name: Option<String>,

    /// `download` or `upload`.
    #[serde(
        default,
        rename = "type",
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,

    /// `active`, `completed` or `failed`.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Percent complete, nominally 0-100.
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,

    /// Bytes per second.
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,

    /// Seconds remaining.
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub eta: Option<f64>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub peer_id: Option<String>,
}

/// A change to apply to the current snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotUpdate {
    /// Replace everything.
    Full(DashboardSnapshot),
    /// Replace only the parts that are present.
    Patch(SnapshotPatch),
    /// Status change for a single node, inserted if not yet known.
    NodeStatus {
        node_id: String,
        status: Option<String>,
    },
    /// Keep-alive with no state.
    Heartbeat,
    /// An envelope type this viewer does not display.
    Ignored(String),
}

/// Partial snapshot carried by a WebSocket-style envelope.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SnapshotPatch {
    #[serde(default, alias = "clusterStatus", deserialize_with = "lenient::object")]
    pub cluster_status: Option<ClusterStatus>,

    #[serde(default, deserialize_with = "lenient::optional_list")]
    pub nodes: Option<Vec<Node>>,

    #[serde(default, deserialize_with = "lenient::optional_list")]
    pub transfers: Option<Vec<Transfer>>,

    #[serde(default, alias = "realTimeMetrics", deserialize_with = "lenient::object")]
    pub metrics: Option<ClusterMetrics>,
}

impl SnapshotPatch {
    fn is_empty(&self) -> bool {
        self.cluster_status.is_none()
            && self.nodes.is_none()
            && self.transfers.is_none()
            && self.metrics.is_none()
    }
}

impl DashboardSnapshot {
    /// Apply an update. Returns true if the snapshot changed.
    pub fn apply(&mut self, update: SnapshotUpdate) -> bool {
        match update {
            SnapshotUpdate::Full(snapshot) => {
                *self = snapshot;
                true
            }
            SnapshotUpdate::Patch(patch) => {
                let changed = !patch.is_empty();
                if let Some(status) = patch.cluster_status {
                    self.cluster_status = Some(status);
                }
                if let Some(nodes) = patch.nodes {
                    self.nodes = nodes;
                }
                if let Some(transfers) = patch.transfers {
                    self.transfers = transfers;
                }
                if let Some(metrics) = patch.metrics {
                    self.metrics = Some(metrics);
                }
                changed
            }
            SnapshotUpdate::NodeStatus { node_id, status } => {
                match self.nodes.iter_mut().find(|n| n.id.as_deref() == Some(node_id.as_str())) {
                    Some(node) => node.status = status,
                    None => self.nodes.push(Node {
                        id: Some(node_id),
                        status,
                        ..Default::default()
                    }),
                }
                true
            }
            SnapshotUpdate::Heartbeat | SnapshotUpdate::Ignored(_) => false,
        }
    }
}

/// Decode one message: either a full snapshot or a `{type, data}` envelope.
///
/// Fails only when the input is not valid JSON or is not an object.
pub fn decode_update(bytes: &[u8]) -> Result<SnapshotUpdate, serde_json::Error> {
    let value: Value = serde_json::from_slice(bytes)?;
    if !value.is_object() {
        return Err(serde::de::Error::custom("expected a JSON object"));
    }

    let envelope_kind = value.get("type").and_then(Value::as_str).map(str::to_owned);
    let Some(kind) = envelope_kind else {
        return serde_json::from_value(value).map(SnapshotUpdate::Full);
    };

    let data = value.get("data").cloned().unwrap_or(Value::Null);
    let update = match kind.as_str() {
        "cluster_update" => {
            let inner = unwrap_key(data, "dashboard");
            if has_any_key(&inner, &["cluster_status", "clusterStatus", "nodes", "transfers"]) {
                SnapshotUpdate::Patch(serde_json::from_value(inner)?)
            } else {
                SnapshotUpdate::Patch(SnapshotPatch {
                    cluster_status: lenient::from_value(inner),
                    ..Default::default()
                })
            }
        }
        "node_update" => match text_field(&data, "node_id") {
            Some(node_id) => SnapshotUpdate::NodeStatus {
                node_id,
                status: text_field(&data, "status"),
            },
            None => SnapshotUpdate::Patch(SnapshotPatch {
                nodes: lenient::list_from_value(unwrap_key(data, "nodes")),
                ..Default::default()
            }),
        },
        "transfer_update" => SnapshotUpdate::Patch(SnapshotPatch {
            transfers: lenient::list_from_value(unwrap_key(data, "transfers")),
            ..Default::default()
        }),
        "metrics_update" => SnapshotUpdate::Patch(SnapshotPatch {
            metrics: lenient::from_value(unwrap_key(data, "metrics")),
            ..Default::default()
        }),
        "heartbeat" | "pong" | "welcome" => SnapshotUpdate::Heartbeat,
        _ => SnapshotUpdate::Ignored(kind.clone()),
    };

    Ok(update)
}

fn unwrap_key(value: Value, key: &str) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key(key) => map.remove(key).unwrap_or(Value::Null),
        other => other,
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn has_any_key(value: &Value, keys: &[&str]) -> bool {
    value.as_object().is_some_and(|map| keys.iter().any(|k| map.contains_key(*k)))
}

mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::Peers;

    pub(super) fn from_value<T: DeserializeOwned>(value: Value) -> Option<T> {
        if value.is_object() {
            serde_json::from_value(value).ok()
        } else {
            None
        }
    }

    /// Items of an array, or the values of an id-keyed map.
    ///
    /// Map entries without their own `id` take the key as id.
    pub(super) fn list_from_value<T: DeserializeOwned>(value: Value) -> Option<Vec<T>> {
        match value {
            Value::Array(items) => {
                Some(items.into_iter().filter_map(|v| serde_json::from_value(v).ok()).collect())
            }
            Value::Object(map) => Some(
                map.into_iter()
                    .filter_map(|(key, v)| serde_json::from_value(keyed(key, v)).ok())
                    .collect(),
            ),
            _ => None,
        }
    }

    fn keyed(key: String, value: Value) -> Value {
        match value {
            Value::Object(mut entry) => {
                entry.entry("id").or_insert(Value::String(key));
                Value::Object(entry)
            }
            other => other,
        }
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    pub fn object<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(from_value(Value::deserialize(d)?))
    }

    pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(list_from_value(Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn optional_list<'de, D, T>(d: D) -> Result<Option<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(list_from_value(Value::deserialize(d)?))
    }

    pub fn peers<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Peers>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_u64().map(Peers::Count),
            Value::Array(items) => Some(Peers::List(
                items
                    .into_iter()
                    .map(|v| match v {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
            )),
            _ => None,
        })
    }

    pub fn models<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        let Value::Array(items) = Value::deserialize(d)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Object(map) => map
                    .get("name")
                    .or_else(|| map.get("id"))
                    .and_then(Value::as_str)
                    .map(str::to_owned),
                _ => None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_snapshot() {
        let json = r#"{
            "clusterStatus": {
                "node_id": "node-a",
                "leader": "node-b",
                "status": "healthy",
                "peers": ["node-b", "node-c"],
                "metrics": {
                    "totalRequests": 1200,
                    "avgLatency": 35.5,
                    "cpu_usage": 41.0,
                    "memory_usage": 62.5,
                    "network_usage": 12
                }
            },
            "nodes": [
                {
                    "id": "node-a",
                    "address": "10.0.0.1:8080",
                    "status": "online",
                    "usage": { "cpu": 40, "memory": 60, "bandwidth": 10 },
                    "models": ["llama2:7b", { "name": "phi3:mini" }]
                }
            ],
            "transfers": [
                {
                    "id": "t-1",
                    "model_name": "llama2:7b",
                    "type": "download",
                    "status": "active",
                    "progress": 75,
                    "speed": 1048576,
                    "eta": 30,
                    "peer_id": "node-b"
                }
            ]
        }"#;

        let snapshot: DashboardSnapshot = serde_json::from_str(json).unwrap();

        let status = snapshot.cluster_status.as_ref().unwrap();
        assert_eq!(status.node_id.as_deref(), Some("node-a"));
        assert_eq!(status.peers.as_ref().unwrap().count(), 2);
        let metrics = status.metrics.as_ref().unwrap();
        assert_eq!(metrics.total_requests, Some(1200.0));
        assert_eq!(metrics.network_usage, Some(12.0));

        assert_eq!(snapshot.nodes.len(), 1);
        assert_eq!(snapshot.nodes[0].models, vec!["llama2:7b", "phi3:mini"]);

        let transfer = &snapshot.transfers[0];
        assert_eq!(transfer.kind.as_deref(), Some("download"));
        assert_eq!(transfer.progress, Some(75.0));
    }

    #[test]
    fn test_malformed_fields_degrade_to_none() {
        let json = r#"{
            "cluster_status": { "node_id": null, "peers": 3, "metrics": "bogus" },
            "nodes": [
                { "id": "n1", "usage": { "cpu": "abc", "memory": "55.5" } },
                "not a node"
            ],
            "transfers": { "unexpected": true }
        }"#;

        let snapshot: DashboardSnapshot = serde_json::from_str(json).unwrap();

        let status = snapshot.cluster_status.unwrap();
        assert!(status.node_id.is_none());
        assert!(status.metrics.is_none());
        assert_eq!(status.peers, Some(Peers::Count(3)));

        assert_eq!(snapshot.nodes.len(), 1);
        let usage = snapshot.nodes[0].usage.as_ref().unwrap();
        assert!(usage.cpu.is_none());
        assert_eq!(usage.memory, Some(55.5));

        assert!(snapshot.transfers.is_empty());
    }

    #[test]
    fn test_empty_object_is_valid_snapshot() {
        let snapshot: DashboardSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot, DashboardSnapshot::default());
    }

    #[test]
    fn test_decode_full_snapshot() {
        let update = decode_update(br#"{"nodes":[{"id":"n1"}]}"#).unwrap();
        match update {
            SnapshotUpdate::Full(s) => assert_eq!(s.nodes.len(), 1),
            other => panic!("expected full snapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_node_update_envelope() {
        let line = br#"{"type":"node_update","data":{"nodes":[{"id":"n1"},{"id":"n2"}]},"timestamp":"2024-01-01T00:00:00Z"}"#;
        let update = decode_update(line).unwrap();

        let mut snapshot = DashboardSnapshot {
            transfers: vec![Transfer::default()],
            ..Default::default()
        };
        assert!(snapshot.apply(update));
        assert_eq!(snapshot.nodes.len(), 2);
        // Untouched parts survive a partial update
        assert_eq!(snapshot.transfers.len(), 1);
    }

    #[test]
    fn test_nodes_keyed_by_id() {
        let json = r#"{"nodes": {
            "n1": {"id": "n1", "status": "online"},
            "n2": {"address": "10.0.0.2:8080", "status": "offline"}
        }}"#;
        let snapshot: DashboardSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[0].status.as_deref(), Some("online"));
        // Key fills in a missing id
        assert_eq!(snapshot.nodes[1].id.as_deref(), Some("n2"));
    }

    #[test]
    fn test_single_node_status_envelope() {
        let mut snapshot = DashboardSnapshot {
            nodes: vec![Node {
                id: Some("n1".to_string()),
                status: Some("online".to_string()),
                address: Some("10.0.0.1:8080".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };

        let line = br#"{"type":"node_update","data":{"node_id":"n1","status":"offline","timestamp":"2024-01-01T00:00:00Z"}}"#;
        assert!(snapshot.apply(decode_update(line).unwrap()));
        assert_eq!(snapshot.nodes.len(), 1);
        assert_eq!(snapshot.nodes[0].status.as_deref(), Some("offline"));
        assert_eq!(snapshot.nodes[0].address.as_deref(), Some("10.0.0.1:8080"));

        let line = br#"{"type":"node_update","data":{"node_id":"n7","status":"online"}}"#;
        assert!(snapshot.apply(decode_update(line).unwrap()));
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[1].id.as_deref(), Some("n7"));
        assert_eq!(snapshot.nodes[1].status.as_deref(), Some("online"));
    }

    #[test]
    fn test_decode_cluster_update_with_dashboard_wrapper() {
        let line = br#"{"type":"cluster_update","data":{"dashboard":{"clusterStatus":{"leader":"n9"}}}}"#;
        let update = decode_update(line).unwrap();

        let mut snapshot = DashboardSnapshot::default();
        snapshot.apply(update);
        assert_eq!(snapshot.cluster_status.unwrap().leader.as_deref(), Some("n9"));
    }

    #[test]
    fn test_decode_bare_cluster_status_envelope() {
        let line = br#"{"type":"cluster_update","data":{"node_id":"n1","peers":4}}"#;
        let mut snapshot = DashboardSnapshot::default();
        snapshot.apply(decode_update(line).unwrap());

        let status = snapshot.cluster_status.unwrap();
        assert_eq!(status.node_id.as_deref(), Some("n1"));
        assert_eq!(status.peers.unwrap().count(), 4);
    }

    #[test]
    fn test_metrics_update_envelope() {
        let line = br#"{"type":"metrics_update","data":{"metrics":{"cpu_usage":12.5}}}"#;
        let mut snapshot = DashboardSnapshot::default();
        assert!(snapshot.apply(decode_update(line).unwrap()));
        assert_eq!(snapshot.metrics.unwrap().cpu_usage, Some(12.5));
    }

    #[test]
    fn test_heartbeat_and_unknown_do_not_change_snapshot() {
        let mut snapshot = DashboardSnapshot::default();
        assert!(!snapshot.apply(decode_update(br#"{"type":"heartbeat","data":{}}"#).unwrap()));
        let ignored = decode_update(br#"{"type":"inference_update","data":{}}"#).unwrap();
        assert_eq!(ignored, SnapshotUpdate::Ignored("inference_update".to_string()));
        assert!(!snapshot.apply(ignored));
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        assert!(decode_update(b"not json").is_err());
        assert!(decode_update(b"[1, 2]").is_err());
    }
}
