//! Typed shapes for the admin API responses. Decoding goes through serde
//! so a contract drift surfaces as a malformed-response error with the
//! offending URL, not a panic deep inside a report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use couchctl_core::sample::TimeSeriesSample;
use couchctl_core::shard::ShardMap;

/// `GET /_membership` on a cluster host.
#[derive(Debug, Clone, Deserialize)]
pub struct Membership {
    #[serde(default)]
    pub all_nodes: Vec<String>,
    pub cluster_nodes: Vec<String>,
}

/// `GET /<db>/_shards`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShardsResponse {
    pub shards: ShardMap,
}

/// `GET /_api/v2/monitoring/<metric>_srv?...&format=json`.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringResponse {
    pub target_responses: Vec<TargetSeries>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetSeries {
    #[serde(default)]
    pub target: String,
    pub datapoints: Vec<TimeSeriesSample>,
}

/// Per-database statistics from `GET /<db>`.
#[derive(Debug, Clone, Deserialize)]
pub struct DbStats {
    pub doc_count: u64,
    pub doc_del_count: u64,
    pub sizes: DbSizes,
}

/// The API reports a null active size for small or freshly-created
/// databases; the external size is the usable stand-in.
#[derive(Debug, Clone, Deserialize)]
pub struct DbSizes {
    pub active: Option<u64>,
    #[serde(default)]
    pub external: Option<u64>,
    pub file: u64,
}

impl DbSizes {
    pub fn effective_active(&self) -> u64 {
        self.active.or(self.external).unwrap_or(0)
    }
}

/// One entry of `GET /_active_tasks`.
#[derive(Debug, Clone, Deserialize)]
pub struct ActiveTask {
    #[serde(rename = "type")]
    pub kind: TaskKind,
    #[serde(default)]
    pub changes_pending: Option<i64>,
    #[serde(default)]
    pub total_changes: Option<i64>,
    #[serde(default)]
    pub changes_done: Option<i64>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub node: Option<String>,
}

impl ActiveTask {
    /// Changes this task still has to process. Replication tasks report a
    /// pending counter directly; everything else exposes total/done.
    pub fn pending(&self) -> i64 {
        match self.kind {
            TaskKind::Replication => self.changes_pending.unwrap_or(0),
            _ => self.total_changes.unwrap_or(0) - self.changes_done.unwrap_or(0),
        }
    }
}

/// Server-side background job types surfaced by the status API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Indexer,
    Replication,
    SearchIndexer,
    ViewCompaction,
    DatabaseCompaction,
    #[serde(other)]
    Other,
}

impl TaskKind {
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::Indexer => "indexer",
            TaskKind::Replication => "replication",
            TaskKind::SearchIndexer => "search_indexer",
            TaskKind::ViewCompaction => "view_compaction",
            TaskKind::DatabaseCompaction => "database_compaction",
            TaskKind::Other => "other",
        }
    }
}

/// `GET /<db>/_all_docs` with a caller-chosen row shape.
#[derive(Debug, Clone, Deserialize)]
pub struct AllDocs<R> {
    #[serde(default)]
    pub total_rows: Option<u64>,
    pub rows: Vec<R>,
}

/// Row of the design-document listing (`startkey="_design/"`).
#[derive(Debug, Clone, Deserialize)]
pub struct DesignRow {
    pub id: String,
}

/// Row of the conflict scan (`include_docs=true&conflicts=true`).
#[derive(Debug, Clone, Deserialize)]
pub struct ScanRow {
    pub id: String,
    #[serde(default)]
    pub doc: Option<ScanDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanDoc {
    #[serde(rename = "_conflicts", default)]
    pub conflicts: Vec<String>,
}

/// Row of `GET /_replicator/_all_docs`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplicatorRow {
    pub id: String,
    pub value: RevValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RevValue {
    pub rev: String,
}

/// A design document, reduced to the index groups the reports care about.
#[derive(Debug, Clone, Deserialize)]
pub struct DesignDoc {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub views: BTreeMap<String, ViewDef>,
    #[serde(default)]
    pub indexes: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub st_indexes: BTreeMap<String, serde_json::Value>,
}

impl DesignDoc {
    /// Design doc name without the `_design/` prefix.
    pub fn short_name(&self) -> &str {
        self.id.strip_prefix("_design/").unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewDef {
    #[serde(default)]
    pub reduce: Option<String>,
    #[serde(default)]
    pub options: Option<serde_json::Value>,
}

impl ViewDef {
    /// Report flavor: Query (reduce + options), Map/R (reduce), Map.
    pub fn flavor(&self) -> &'static str {
        match (&self.reduce, &self.options) {
            (Some(_), Some(_)) => "Query",
            (Some(_), None) => "Map/R",
            _ => "Map",
        }
    }
}

/// `GET /<db>/_design/<ddoc>/_info`.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewInfoResponse {
    pub view_index: ViewIndex,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewIndex {
    pub sizes: FileSizes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileSizes {
    pub file: u64,
}

/// `GET /<db>/_design/<ddoc>/_search_info/<index>`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchInfoResponse {
    pub search_index: IndexDisk,
}

/// `GET /<db>/_design/<ddoc>/_geo_info/<index>`.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoInfoResponse {
    pub geo_index: IndexDisk,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexDisk {
    pub disk_size: u64,
}

/// Document inserted into `_replicator` by the replicate command.
#[derive(Debug, Clone, Serialize)]
pub struct ReplicationDoc {
    pub _id: String,
    pub name: String,
    pub source: String,
    pub target: String,
    pub create_target: bool,
    pub continuous: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_decode() {
        let m: Membership = serde_json::from_str(
            r#"{"all_nodes":["dbcore@db1.meadow.x.net"],
                "cluster_nodes":["dbcore@db1.meadow.x.net","dbcore@db2.meadow.x.net"]}"#,
        )
        .unwrap();
        assert_eq!(m.cluster_nodes.len(), 2);
    }

    #[test]
    fn test_monitoring_decode_with_null_values() {
        let m: MonitoringResponse = serde_json::from_str(
            r#"{"target_responses":[{"target":"disk_use",
                "datapoints":[[null,0],[5.0,10],[7.0,20],[null,30]]}]}"#,
        )
        .unwrap();
        let points = &m.target_responses[0].datapoints;
        assert_eq!(points.len(), 4);
        assert_eq!(points[2].value, Some(7.0));
    }

    #[test]
    fn test_db_sizes_null_active_falls_back_to_external() {
        let s: DbStats = serde_json::from_str(
            r#"{"doc_count":10,"doc_del_count":2,
                "sizes":{"active":null,"external":123,"file":456}}"#,
        )
        .unwrap();
        assert_eq!(s.sizes.effective_active(), 123);

        let s: DbStats = serde_json::from_str(
            r#"{"doc_count":10,"doc_del_count":2,
                "sizes":{"active":99,"external":123,"file":456}}"#,
        )
        .unwrap();
        assert_eq!(s.sizes.effective_active(), 99);
    }

    #[test]
    fn test_active_task_pending() {
        let rep: ActiveTask = serde_json::from_str(
            r#"{"type":"replication","changes_pending":42}"#,
        )
        .unwrap();
        assert_eq!(rep.pending(), 42);

        let idx: ActiveTask = serde_json::from_str(
            r#"{"type":"indexer","total_changes":100,"changes_done":60}"#,
        )
        .unwrap();
        assert_eq!(idx.kind, TaskKind::Indexer);
        assert_eq!(idx.pending(), 40);
    }

    #[test]
    fn test_unknown_task_kind_is_other() {
        let t: ActiveTask = serde_json::from_str(r#"{"type":"shard_splitting"}"#).unwrap();
        assert_eq!(t.kind, TaskKind::Other);
    }

    #[test]
    fn test_view_flavors() {
        let q: ViewDef =
            serde_json::from_str(r#"{"reduce":"_count","options":{"def":{}}}"#).unwrap();
        assert_eq!(q.flavor(), "Query");
        let mr: ViewDef = serde_json::from_str(r#"{"reduce":"_sum"}"#).unwrap();
        assert_eq!(mr.flavor(), "Map/R");
        let m: ViewDef = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(m.flavor(), "Map");
    }

    #[test]
    fn test_design_doc_short_name() {
        let d: DesignDoc = serde_json::from_str(r#"{"_id":"_design/search"}"#).unwrap();
        assert_eq!(d.short_name(), "search");
        assert!(d.views.is_empty());
    }

    #[test]
    fn test_replication_doc_wire_shape() {
        let doc = ReplicationDoc {
            _id: "alldbs-orders".into(),
            name: "alldbs-orders".into(),
            source: "https://a:pw@a.example.com/orders".into(),
            target: "https://b:pw@b.example.com/orders".into(),
            create_target: true,
            continuous: false,
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["_id"], "alldbs-orders");
        assert_eq!(json["create_target"], true);
    }
}
