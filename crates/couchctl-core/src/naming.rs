use crate::error::{Error, Result};

/// Erlang-style node prefix on every internal hostname, e.g.
/// `dbcore@db3.meadow.internal.example.net`.
pub const NODE_PREFIX: &str = "dbcore@";

/// Reduce a fully-qualified internal node name to its short display name.
///
/// Strips the `dbcore@` prefix and everything from `.<cluster>.` onward,
/// so `dbcore@db3.meadow.foo.net` with cluster `meadow` becomes `db3`.
/// Names that don't carry the expected decoration pass through unchanged.
pub fn strip_node_name(full: &str, cluster: &str) -> String {
    let name = full.strip_prefix(NODE_PREFIX).unwrap_or(full);
    let marker = format!(".{}.", cluster);
    match name.find(&marker) {
        Some(idx) => name[..idx].to_string(),
        None => name.to_string(),
    }
}

/// Numeric node id for reports sorted by node number.
///
/// `db12` → 12. Fails when the short name carries no trailing number,
/// which means the membership response named a host outside the fleet's
/// naming scheme.
pub fn node_number(short: &str) -> Result<u32> {
    let digits = short.trim_start_matches(|c: char| !c.is_ascii_digit());
    digits.parse().map_err(|_| Error::MalformedResponse {
        context: "node name".into(),
        detail: format!("no numeric id in {:?}", short),
    })
}

/// Recover the cluster name from a fully-qualified node hostname.
///
/// Internal hostnames follow `<node>.<cluster>.<internal domain...>`; the
/// cluster is the second dot component.
pub fn cluster_from_node(fqdn: &str) -> Result<String> {
    let host = fqdn.rsplit('@').next().unwrap_or(fqdn);
    let mut parts = host.split('.');
    let (node, cluster) = (parts.next(), parts.next());
    match (node, cluster, parts.next()) {
        (Some(_), Some(cluster), Some(_)) => Ok(cluster.to_string()),
        _ => Err(Error::MalformedResponse {
            context: "node hostname".into(),
            detail: format!("cannot derive cluster from {:?}", fqdn),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_node_name() {
        assert_eq!(
            strip_node_name("dbcore@db3.meadow.couch.example.net", "meadow"),
            "db3"
        );
        assert_eq!(
            strip_node_name("dbcore@db12.meadow.couch.example.net", "meadow"),
            "db12"
        );
    }

    #[test]
    fn test_strip_node_name_without_decoration() {
        assert_eq!(strip_node_name("db3", "meadow"), "db3");
    }

    #[test]
    fn test_strip_node_name_wrong_cluster_keeps_tail() {
        // Suffix only stripped when it names the queried cluster
        assert_eq!(
            strip_node_name("dbcore@db3.other.couch.example.net", "meadow"),
            "db3.other.couch.example.net"
        );
    }

    #[test]
    fn test_node_number() {
        assert_eq!(node_number("db12").unwrap(), 12);
        assert_eq!(node_number("db001").unwrap(), 1);
        assert!(node_number("gateway").is_err());
    }

    #[test]
    fn test_cluster_from_node() {
        assert_eq!(
            cluster_from_node("dbcore@db1.meadow.couch.example.net").unwrap(),
            "meadow"
        );
        assert_eq!(
            cluster_from_node("db1.meadow.example.net").unwrap(),
            "meadow"
        );
        assert!(cluster_from_node("db1").is_err());
        assert!(cluster_from_node("db1.meadow").is_err());
    }
}
