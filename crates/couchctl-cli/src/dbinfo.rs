use std::collections::BTreeMap;
use std::time::Instant;

use anyhow::{Context, Result, bail};

use couchctl_api::ApiClient;
use couchctl_api::schema::DbStats;
use couchctl_core::format::{count_pretty, data_size_pretty, pretty_time};
use couchctl_core::naming::{cluster_from_node, node_number, strip_node_name};
use couchctl_core::shard::{ShardMap, ShardTable, range_trim};

use crate::display::{ShardRow, render_table};
use crate::shards::print_legend;
use crate::ui;

/// Disk overhead assumed per deleted-doc tombstone: a couple hundred
/// bytes of JSON plus storage slack.
const TOMBSTONE_BYTES: u64 = 200;

/// Conflict-scan sizing. The ratio is seconds-per-document measured on a
/// reference corpus of ~4 KB documents.
const SCAN_BATCH: usize = 10_000;
const TIME_ESTIMATE_RATIO: f64 = (4.0 * 60.0) / 144_250.0;
const SOFT_SECS: f64 = 120.0;
const HARD_SECS: f64 = 3600.0;
const SOFT_BYTES: u64 = 50 * 1024 * 1024;
const HARD_BYTES: u64 = 1024 * 1024 * 1024;

/// Optional report sections toggled from the command line.
pub struct Sections {
    pub shards: bool,
    pub legend: bool,
    pub indexes: bool,
    pub conflicts: bool,
    pub verbose: bool,
}

pub fn cmd_dbinfo(
    client: &ApiClient,
    account: &str,
    database: &str,
    sections: Sections,
) -> Result<()> {
    let shard_map = client
        .shard_map(account, database)
        .with_context(|| format!("cannot fetch shard map of {}", database))?;
    let stats = client
        .db_stats(account, database)
        .with_context(|| format!("cannot fetch stats of {}", database))?;

    if stats.doc_count == 0 && !sections.shards {
        ui::info("Database exists, but is empty. Exiting");
        return Ok(());
    }

    print_summary(account, database, &shard_map, &stats)?;

    if sections.indexes {
        print_indexes(client, account, database, sections.verbose)?;
    }
    if sections.conflicts {
        scan_conflicts(client, account, database, &stats)?;
    }
    if sections.shards {
        print_shard_section(client, database, &shard_map, sections.legend)?;
    }
    Ok(())
}

fn print_summary(
    account: &str,
    database: &str,
    shard_map: &ShardMap,
    stats: &DbStats,
) -> Result<()> {
    let table = ShardTable::build(shard_map)?;

    println!();
    println!(
        " Summary Info for Database: \"{}\"  In Account: \"{}\"",
        database, account
    );
    println!(
        " Unique shards (Q): {}  Replica setting (N): {}",
        table.unique_shards(),
        table.replication_factor()
    );
    println!(
        " JSON Document Count: {} with {} deleted doc 'tombstones'",
        count_pretty(stats.doc_count),
        count_pretty(stats.doc_del_count)
    );
    println!(
        " JSON Data size: {} operating, {} on disk",
        data_size_pretty(stats.sizes.effective_active() as f64),
        data_size_pretty(stats.sizes.file as f64)
    );
    println!(
        " Estimated space overhead from tombstones: {}",
        data_size_pretty((stats.doc_del_count * TOMBSTONE_BYTES) as f64)
    );
    if stats.doc_count > 0 {
        let percent_overhead = stats.doc_del_count as f64 / stats.doc_count as f64 * 100.0;
        println!(
            " Estimated primary index overhead from tombstones: {} %",
            (percent_overhead * 100.0).round() / 100.0
        );
    }
    println!();
    Ok(())
}

fn print_indexes(client: &ApiClient, account: &str, database: &str, verbose: bool) -> Result<()> {
    let rows = client
        .design_rows(account, database)
        .with_context(|| format!("cannot list design documents of {}", database))?;

    let mut totals: BTreeMap<&str, u64> = BTreeMap::from([("Views", 0), ("Search", 0), ("Geo", 0)]);

    println!("Design documents:");
    for row in rows {
        let ddoc = client.design_doc(account, database, &row.id)?;
        let name = ddoc.short_name().to_string();
        println!(
            " \"{}\" {}",
            name,
            "-".repeat(50usize.saturating_sub(name.len()))
        );

        if !ddoc.views.is_empty() {
            let size = client.view_group_size(account, database, &name)?;
            if size > 0 {
                println!("  Views: {}", data_size_pretty(size as f64));
            }
            *totals.entry("Views").or_default() += size;
            if verbose {
                for (view_name, def) in &ddoc.views {
                    println!("    {:<8}:  \"{}\"", def.flavor(), view_name);
                }
            }
        }
        for index_name in ddoc.indexes.keys() {
            let size = client.search_index_size(account, database, &name, index_name)?;
            *totals.entry("Search").or_default() += size;
            println!(
                "  Search: \"{}\"  {}",
                index_name,
                data_size_pretty(size as f64)
            );
        }
        for geo_name in ddoc.st_indexes.keys() {
            let size = client.geo_index_size(account, database, &name, geo_name)?;
            *totals.entry("Geo").or_default() += size;
            println!("  Geo: \"{}\"  {}", geo_name, data_size_pretty(size as f64));
        }
    }

    println!();
    println!(" Total index sizes across database:");
    for (label, total) in &totals {
        println!("{:>7}: {:>10}", label, data_size_pretty(*total as f64));
    }
    println!();
    Ok(())
}

/// Walk `_all_docs` with conflicts included, counting `_conflicts`
/// entries. Big databases get an estimate and a chance to back out; huge
/// ones are refused with a pointer to the view-based approach.
fn scan_conflicts(client: &ApiClient, account: &str, database: &str, stats: &DbStats) -> Result<()> {
    let doc_count = stats.doc_count;
    let db_size = stats.sizes.effective_active();
    let est_secs = doc_count as f64 * TIME_ESTIMATE_RATIO;

    if est_secs > HARD_SECS || db_size > HARD_BYTES {
        println!(
            " A conflict scan of \"{}\" would need an estimated {} of bandwidth and {} to complete.",
            database,
            data_size_pretty(db_size as f64),
            pretty_time(est_secs)
        );
        println!(" Create a view emitting conflicted revisions instead of scanning.");
        return Ok(());
    }
    if est_secs > SOFT_SECS || db_size > SOFT_BYTES {
        ui::warn(&format!(
            "Conflict scan will need {} of bandwidth and take about {}",
            data_size_pretty(db_size as f64),
            pretty_time(est_secs)
        ));
        if !ui::confirm("Are you sure?") {
            return Ok(());
        }
    }

    println!("    Scanning for conflicts. Progress:");
    let bar = ui::scan_bar(doc_count);
    let start = Instant::now();
    let mut conflict_count: u64 = 0;
    let mut scanned: u64 = 0;
    let mut skip = 0usize;
    while scanned < doc_count {
        let batch = client.scan_batch(account, database, SCAN_BATCH, skip)?;
        if batch.rows.is_empty() {
            break;
        }
        for row in &batch.rows {
            if let Some(doc) = &row.doc {
                conflict_count += doc.conflicts.len() as u64;
            }
        }
        scanned += batch.rows.len() as u64;
        skip += batch.rows.len();
        bar.set_position(scanned.min(doc_count));
    }
    bar.finish_and_clear();

    println!(
        " {} conflicts found in {}",
        count_pretty(conflict_count),
        pretty_time(start.elapsed().as_secs_f64())
    );
    println!();
    Ok(())
}

/// Per-node table of shard ranges (keys truncated to the width that
/// disambiguates at this Q), sorted by numeric node id.
fn print_shard_section(
    client: &ApiClient,
    database: &str,
    shard_map: &ShardMap,
    legend: bool,
) -> Result<()> {
    let cluster = shard_map
        .values()
        .next()
        .and_then(|owners| owners.first())
        .map(|host| cluster_from_node(host))
        .transpose()?
        .context("shard map holds no nodes to derive the cluster from")?;

    println!(
        " Distribution of shards for database {} on cluster: {}",
        database, cluster
    );

    if legend {
        let table = ShardTable::build(shard_map)?;
        print_legend(&table);
        return Ok(());
    }

    let membership = client
        .membership(&cluster)
        .with_context(|| format!("cannot resolve members of cluster {}", cluster))?;
    let mut distribution: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    for full in &membership.cluster_nodes {
        distribution.insert(node_number(&strip_node_name(full, &cluster))?, Vec::new());
    }

    let trim = range_trim(shard_map.len());
    for (range, owners) in shard_map {
        for owner in owners {
            let number = node_number(&strip_node_name(owner, &cluster))?;
            match distribution.get_mut(&number) {
                Some(ranges) => ranges.push(range[..trim].to_string()),
                None => bail!("node status unavailable: db{}", number),
            }
        }
    }

    let rows: Vec<ShardRow> = distribution
        .into_iter()
        .map(|(number, mut ranges)| {
            ranges.sort_unstable();
            ShardRow {
                node: format!("db{}", number),
                shards: ranges.len(),
                ranges: ranges.join(","),
            }
        })
        .collect();
    render_table(rows);
    Ok(())
}
