use std::sync::Arc;

use anyhow::{Context, Result};

use couchctl_api::client::DiskMetric;
use couchctl_api::{ApiClient, pool};
use couchctl_core::Error;
use couchctl_core::disk::{DiskRow, DiskState, DiskTotals, TotalsRow, sign_prefix};
use couchctl_core::naming::strip_node_name;
use couchctl_core::sample::{TimeSeriesSample, valid_window};

/// Per-node disk usage and growth, one line per node plus a TOTAL line.
pub fn cmd_disk(client: ApiClient, account: &str, cluster: &str) -> Result<()> {
    let membership = client
        .membership(cluster)
        .with_context(|| format!("cannot resolve members of cluster {}", cluster))?;
    let nodes: Vec<String> = membership
        .cluster_nodes
        .iter()
        .map(|full| strip_node_name(full, cluster))
        .collect();

    let client = Arc::new(client);
    let account = account.to_string();
    let cluster_name = cluster.to_string();
    let mut states = pool::map_parallel(nodes, pool::BATCH_DEADLINE, move |node| {
        let state = node_disk_state(&client, &account, &cluster_name, &node)?;
        Ok((node, state))
    })?;
    // Workers finish in arbitrary order; the report is sorted by node
    states.sort_by(|a, b| a.0.cmp(&b.0));

    println!();
    println!(
        "Disk usage on the {} nodes of cluster: {}",
        states.len(),
        cluster
    );
    let mut totals = DiskTotals::default();
    for (node, state) in &states {
        totals.add(state);
        print_row(&DiskRow::new(node.clone(), state));
    }
    println!();
    print_totals(&totals.summarize());
    println!();
    Ok(())
}

/// Fetch both metric series for one node and reduce them to a DiskState.
fn node_disk_state(
    client: &ApiClient,
    account: &str,
    cluster: &str,
    node: &str,
) -> couchctl_core::Result<DiskState> {
    let used = client.disk_series(account, cluster, node, DiskMetric::Use)?;
    let free = client.disk_series(account, cluster, node, DiskMetric::Free)?;
    let used_window = window_or_no_data(&used, node, DiskMetric::Use)?;
    let free_window = window_or_no_data(&free, node, DiskMetric::Free)?;
    Ok(DiskState::from_windows(used_window, free_window))
}

fn window_or_no_data(
    series: &[TimeSeriesSample],
    node: &str,
    metric: DiskMetric,
) -> couchctl_core::Result<(TimeSeriesSample, TimeSeriesSample)> {
    valid_window(series).ok_or_else(|| Error::NoData {
        node: node.to_string(),
        metric: metric.label().to_string(),
    })
}

fn print_row(row: &DiskRow) {
    let d = &row.delta;
    let sign = sign_prefix(d.change_mb);
    let trailer = match d.percent_change {
        Some(p) => format!("({}{:>4.1}% in {}min)", sign, p.abs(), d.elapsed_minutes),
        None => format!("( N/A in {}min)", d.elapsed_minutes),
    };
    println!(
        "{:<5}- Used:{:>7}GB ({:>4.1}%){} Change:{}{:>5}MB {}",
        row.node,
        row.gb_used,
        d.percent_full,
        row.full_tag(),
        sign,
        d.change_mb.abs(),
        trailer
    );
}

fn print_totals(t: &TotalsRow) {
    let sign = sign_prefix(t.change_gb);
    let trailer = match t.percent_change {
        Some(p) => format!("({}{:>4.1}% in {}min)", sign, p.abs(), t.elapsed_minutes),
        None => format!("( N/A in {}min)", t.elapsed_minutes),
    };
    println!(
        "TOTAL: Used:{:>7}GB ({:>4.1}%)  Change:{}{:>5}GB {}",
        t.gb_used,
        t.percent_full,
        sign,
        t.change_gb.abs(),
        trailer
    );
}
