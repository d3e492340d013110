use std::time::Duration;

/// Error taxonomy shared across the workspace. Every variant is fatal:
/// the CLI prints the message and exits non-zero, nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The API answered with a status outside {200, 201, 202}.
    #[error("HTTP {status} for {url}")]
    Http { status: u16, url: String },

    /// The request never produced a response (DNS, TLS, connect, read).
    #[error("request to {url} failed: {detail}")]
    Transport { url: String, detail: String },

    /// A monitoring series held no usable numeric window.
    #[error("no data in {metric} series for node {node}")]
    NoData { node: String, metric: String },

    /// Missing credentials or malformed startup environment.
    #[error("{0}")]
    Config(String),

    /// More shard ranges than single-character display codes.
    #[error("{count} shard ranges exceed the {max} available display codes")]
    CapacityExceeded { count: usize, max: usize },

    /// The response decoded, but its shape contradicts the API contract.
    #[error("malformed response from {context}: {detail}")]
    MalformedResponse { context: String, detail: String },

    /// The worker-pool deadline elapsed before the batch finished.
    #[error("batch abandoned after {waited:?}")]
    Timeout { waited: Duration },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_status_and_url() {
        let e = Error::Http {
            status: 503,
            url: "https://x.example.com/_membership".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("_membership"));
    }

    #[test]
    fn test_no_data_names_node_and_metric() {
        let e = Error::NoData {
            node: "db7".into(),
            metric: "disk_use".into(),
        };
        assert_eq!(e.to_string(), "no data in disk_use series for node db7");
    }
}
