use std::collections::BTreeMap;

use anyhow::{Context, Result};

use couchctl_api::ApiClient;
use couchctl_core::naming::strip_node_name;
use couchctl_core::shard::ShardTable;

/// Shard distribution balance for one database, or the range legend.
pub fn cmd_shards(
    client: &ApiClient,
    account: &str,
    cluster: &str,
    database: &str,
    legend: bool,
) -> Result<()> {
    let membership = client
        .membership(cluster)
        .with_context(|| format!("cannot resolve members of cluster {}", cluster))?;
    let shard_map = client
        .shard_map(account, database)
        .with_context(|| format!("cannot fetch shard map of {}", database))?;
    let table = ShardTable::build(&shard_map)?;

    println!();
    println!(
        " Distribution of shards for database {} on cluster: {}",
        database, cluster
    );
    println!(
        " Unique shards (Q): {}  Replica setting (N): {}",
        table.unique_shards(),
        table.replication_factor()
    );

    if legend {
        print_legend(&table);
        return Ok(());
    }

    // Seed every member node so idle nodes still get a line
    let mut distribution: BTreeMap<String, Vec<char>> = membership
        .cluster_nodes
        .iter()
        .map(|full| (strip_node_name(full, cluster), Vec::new()))
        .collect();
    for (range, owners) in &shard_map {
        let Some(code) = table.code_for(range) else {
            continue;
        };
        for owner in owners {
            let node = strip_node_name(owner, cluster);
            distribution.entry(node).or_default().push(code);
        }
    }

    println!(" Shard distribution balance:");
    for (node, codes) in &distribution {
        if codes.is_empty() {
            println!(" {}: < None >", node);
        } else {
            let joined: String = codes.iter().collect();
            println!(" {}: {} ({})", node, joined, joined.chars().count());
        }
    }
    println!();
    Ok(())
}

pub(crate) fn print_legend(table: &ShardTable) {
    println!(" Shard range:        Code:");
    for (range, code) in table.legend() {
        println!(" {}: {}", range, code);
    }
    println!(" ---");
}
