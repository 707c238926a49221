//! JSON export of the current cluster state.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde_json::{json, Map, Value};

use super::cluster::ClusterData;

/// Build the export document: a summary plus one row per node and transfer.
pub fn export_json(data: &ClusterData) -> Value {
    let summary = &data.summary;
    let counts = &data.transfer_counts;

    let mut export = Map::new();

    export.insert(
        "summary".to_string(),
        json!({
            "node_id": summary.node_id,
            "leader": summary.leader,
            "status": summary.status,
            "peer_count": summary.peer_count,
            "node_count": summary.node_count,
            "online_count": summary.online_count,
            "offline_count": summary.offline_count,
            "model_count": summary.model_count,
            "transfers": {
                "total": counts.total,
                "active": counts.active,
                "completed": counts.completed,
                "failed": counts.failed,
            },
            "metrics": {
                "cpu": data.metrics.cpu,
                "memory": data.metrics.memory,
                "network": data.metrics.network,
                "total_requests": summary.total_requests,
                "avg_latency_ms": summary.avg_latency,
            },
        }),
    );

    let nodes: Vec<Value> = data
        .nodes
        .iter()
        .map(|n| {
            json!({
                "id": n.id,
                "address": n.address,
                "status": n.status.label(),
                "cpu": n.cpu,
                "memory": n.memory,
                "bandwidth": n.bandwidth,
                "models": n.models,
            })
        })
        .collect();
    export.insert("nodes".to_string(), Value::Array(nodes));

    let transfers: Vec<Value> = data
        .transfers
        .iter()
        .map(|t| {
            json!({
                "id": t.id,
                "model_name": t.model_name,
                "type": t.kind.label(),
                "status": t.status.label(),
                "progress": t.progress,
                "speed": t.speed,
                "eta": t.eta,
                "peer_id": t.peer_id,
            })
        })
        .collect();
    export.insert("transfers".to_string(), Value::Array(transfers));

    Value::Object(export)
}

/// Write the export document to `path` as pretty-printed JSON.
pub fn write_export(data: &ClusterData, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&export_json(data))?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ClusterStatus, DashboardSnapshot, Node, Peers, Transfer};

    fn sample() -> ClusterData {
        ClusterData::from_snapshot(&DashboardSnapshot {
            cluster_status: Some(ClusterStatus {
                node_id: Some("n1".to_string()),
                leader: Some("n1".to_string()),
                peers: Some(Peers::Count(2)),
                ..Default::default()
            }),
            nodes: vec![
                Node {
                    id: Some("n1".to_string()),
                    status: Some("online".to_string()),
                    models: vec!["llama2".to_string()],
                    ..Default::default()
                },
                Node {
                    id: Some("n2".to_string()),
                    status: Some("offline".to_string()),
                    ..Default::default()
                },
            ],
            transfers: vec![Transfer {
                id: Some("t1".to_string()),
                status: Some("failed".to_string()),
                progress: Some(140.0),
                ..Default::default()
            }],
            metrics: None,
        })
    }

    #[test]
    fn test_export_summary() {
        let value = export_json(&sample());
        let summary = &value["summary"];
        assert_eq!(summary["node_count"], 2);
        assert_eq!(summary["online_count"], 1);
        assert_eq!(summary["offline_count"], 1);
        assert_eq!(summary["peer_count"], 2);
        assert_eq!(summary["leader"], "n1");
        assert_eq!(summary["transfers"]["failed"], 1);
        assert_eq!(summary["transfers"]["active"], 0);
    }

    #[test]
    fn test_export_rows_use_display_values() {
        let value = export_json(&sample());
        assert_eq!(value["nodes"][0]["models"][0], "llama2");
        assert_eq!(value["nodes"][1]["address"], "Unknown");
        assert_eq!(value["transfers"][0]["progress"], 100.0);
        assert_eq!(value["transfers"][0]["model_name"], "Unknown");
        assert!(value["transfers"][0]["eta"].is_null());
    }

    #[test]
    fn test_write_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        write_export(&sample(), &path).unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["summary"]["online_count"], 1);
    }
}
