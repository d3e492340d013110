use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use couchctl_core::sample::TimeSeriesSample;
use couchctl_core::shard::ShardMap;
use couchctl_core::{Error, Result};

use crate::auth::Credentials;
use crate::schema::{
    ActiveTask, AllDocs, DbStats, DesignDoc, DesignRow, GeoInfoResponse, Membership,
    MonitoringResponse, ReplicationDoc, ReplicatorRow, ScanRow, SearchInfoResponse,
    ShardsResponse, ViewInfoResponse,
};

/// Public DNS domain of the hosted service; hosts are `<account>.<domain>`.
pub const DEFAULT_DOMAIN: &str = "cloudant.com";

/// Node disk metrics exposed by the monitoring API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskMetric {
    Use,
    Free,
}

impl DiskMetric {
    pub fn series_name(&self) -> &'static str {
        match self {
            DiskMetric::Use => "node_disk_use_srv",
            DiskMetric::Free => "node_disk_free_srv",
        }
    }

    /// Short label for report and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            DiskMetric::Use => "disk_use",
            DiskMetric::Free => "disk_free",
        }
    }
}

/// Blocking client for the admin REST API. Credentials ride along as a
/// pre-built Authorization header on every request; any status outside
/// {200, 201, 202} is fatal to the run.
pub struct ApiClient {
    http: reqwest::blocking::Client,
    domain: String,
    credentials: Credentials,
}

impl ApiClient {
    pub fn new(domain: &str, credentials: Credentials) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("couchctl/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            domain: domain.to_string(),
            credentials,
        })
    }

    fn url(&self, host: &str, path: &str) -> String {
        format!("https://{}.{}{}", host, self.domain, path)
    }

    fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        debug!(url = %url, "GET");
        let resp = self
            .http
            .get(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", self.credentials.header_value())
            .send()
            .map_err(|e| Error::Transport {
                url: url.clone(),
                detail: e.to_string(),
            })?;
        let resp = check_status(&url, resp)?;
        resp.json::<T>().map_err(|e| Error::MalformedResponse {
            context: url,
            detail: e.to_string(),
        })
    }

    fn post_json<B: Serialize>(&self, url: String, body: &B) -> Result<()> {
        debug!(url = %url, "POST");
        let resp = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", self.credentials.header_value())
            .json(body)
            .send()
            .map_err(|e| Error::Transport {
                url: url.clone(),
                detail: e.to_string(),
            })?;
        check_status(&url, resp).map(|_| ())
    }

    fn delete(&self, url: String) -> Result<()> {
        debug!(url = %url, "DELETE");
        let resp = self
            .http
            .delete(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", self.credentials.header_value())
            .send()
            .map_err(|e| Error::Transport {
                url: url.clone(),
                detail: e.to_string(),
            })?;
        check_status(&url, resp).map(|_| ())
    }

    // ---- Cluster ----

    /// Member node list of a cluster.
    pub fn membership(&self, cluster: &str) -> Result<Membership> {
        self.get_json(self.url(cluster, "/_membership"))
    }

    /// One disk metric series for one node, via the monitoring API.
    pub fn disk_series(
        &self,
        account: &str,
        cluster: &str,
        node: &str,
        metric: DiskMetric,
    ) -> Result<Vec<TimeSeriesSample>> {
        let url = self.url(
            account,
            &format!(
                "/_api/v2/monitoring/{}?cluster={}&format=json&node={}",
                metric.series_name(),
                cluster,
                node
            ),
        );
        let resp: MonitoringResponse = self.get_json(url.clone())?;
        resp.target_responses
            .into_iter()
            .next()
            .map(|series| series.datapoints)
            .ok_or_else(|| Error::MalformedResponse {
                context: url,
                detail: "empty target_responses".into(),
            })
    }

    // ---- Databases ----

    /// Shard-range to owning-node map of a database.
    pub fn shard_map(&self, account: &str, db: &str) -> Result<ShardMap> {
        let resp: ShardsResponse = self.get_json(self.url(account, &format!("/{}/_shards", db)))?;
        Ok(resp.shards)
    }

    pub fn db_stats(&self, account: &str, db: &str) -> Result<DbStats> {
        self.get_json(self.url(account, &format!("/{}", db)))
    }

    pub fn all_dbs(&self, account: &str) -> Result<Vec<String>> {
        self.get_json(self.url(account, "/_all_dbs"))
    }

    pub fn active_tasks(&self, account: &str) -> Result<Vec<ActiveTask>> {
        self.get_json(self.url(account, "/_active_tasks"))
    }

    // ---- Design documents & indexes ----

    /// Ids of all design documents in a database.
    pub fn design_rows(&self, account: &str, db: &str) -> Result<Vec<DesignRow>> {
        let resp: AllDocs<DesignRow> = self.get_json(self.url(
            account,
            &format!("/{}/_all_docs?startkey=\"_design/\"&endkey=\"_design0\"", db),
        ))?;
        Ok(resp.rows)
    }

    /// Fetch a design document by its full id (`_design/<name>`).
    pub fn design_doc(&self, account: &str, db: &str, id: &str) -> Result<DesignDoc> {
        self.get_json(self.url(account, &format!("/{}/{}", db, id)))
    }

    /// On-disk size of a design document's view group.
    pub fn view_group_size(&self, account: &str, db: &str, ddoc: &str) -> Result<u64> {
        let resp: ViewInfoResponse =
            self.get_json(self.url(account, &format!("/{}/_design/{}/_info", db, ddoc)))?;
        Ok(resp.view_index.sizes.file)
    }

    pub fn search_index_size(
        &self,
        account: &str,
        db: &str,
        ddoc: &str,
        index: &str,
    ) -> Result<u64> {
        let resp: SearchInfoResponse = self.get_json(self.url(
            account,
            &format!("/{}/_design/{}/_search_info/{}", db, ddoc, index),
        ))?;
        Ok(resp.search_index.disk_size)
    }

    pub fn geo_index_size(&self, account: &str, db: &str, ddoc: &str, index: &str) -> Result<u64> {
        let resp: GeoInfoResponse = self.get_json(self.url(
            account,
            &format!("/{}/_design/{}/_geo_info/{}", db, ddoc, index),
        ))?;
        Ok(resp.geo_index.disk_size)
    }

    /// One batch of the conflict scan.
    pub fn scan_batch(
        &self,
        account: &str,
        db: &str,
        limit: usize,
        skip: usize,
    ) -> Result<AllDocs<ScanRow>> {
        self.get_json(self.url(
            account,
            &format!(
                "/{}/_all_docs?include_docs=true&conflicts=true&limit={}&skip={}",
                db, limit, skip
            ),
        ))
    }

    // ---- Replication ----

    pub fn replicator_rows(&self, account: &str) -> Result<Vec<ReplicatorRow>> {
        let resp: AllDocs<ReplicatorRow> =
            self.get_json(self.url(account, "/_replicator/_all_docs"))?;
        Ok(resp.rows)
    }

    pub fn insert_replication(&self, account: &str, doc: &ReplicationDoc) -> Result<()> {
        self.post_json(self.url(account, "/_replicator"), doc)
    }

    pub fn delete_replicator_doc(&self, account: &str, id: &str, rev: &str) -> Result<()> {
        self.delete(self.url(account, &format!("/_replicator/{}?rev={}", id, rev)))
    }
}

fn check_status(
    url: &str,
    resp: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response> {
    let status = resp.status().as_u16();
    if matches!(status, 200 | 201 | 202) {
        Ok(resp)
    } else {
        Err(Error::Http {
            status,
            url: url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_is_send_and_sync() {
        // Workers on the pool share one client behind an Arc
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ApiClient>();
    }

    #[test]
    fn test_url_shape() {
        let client =
            ApiClient::new(DEFAULT_DOMAIN, Credentials::basic("acme", "pw")).unwrap();
        assert_eq!(
            client.url("acme", "/_all_dbs"),
            "https://acme.cloudant.com/_all_dbs"
        );
        assert_eq!(
            client.url("meadow", "/_membership"),
            "https://meadow.cloudant.com/_membership"
        );
    }

    #[test]
    fn test_disk_metric_names() {
        assert_eq!(DiskMetric::Use.series_name(), "node_disk_use_srv");
        assert_eq!(DiskMetric::Free.series_name(), "node_disk_free_srv");
        assert_eq!(DiskMetric::Free.label(), "disk_free");
    }
}
