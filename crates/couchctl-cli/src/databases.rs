use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};

use couchctl_api::{ApiClient, pool};
use couchctl_core::format::{count_pretty, data_size_pretty, pretty_time};
use couchctl_core::shard::ShardTable;

use crate::display::{DatabaseRow, SummaryRow, render_table};
use crate::ui;

/// Past this many databases the full table needs `--force-list`; the
/// default becomes a totals-only summary.
const MAX_DBS: usize = 40;

/// Account-wide database report.
pub fn cmd_databases(client: ApiClient, account: &str, force_list: bool) -> Result<()> {
    let dbs = client
        .all_dbs(account)
        .with_context(|| format!("cannot list databases of {}", account))?;
    let client = Arc::new(client);

    if dbs.len() > MAX_DBS {
        give_estimate(&client, account, &dbs, force_list)?;
        if force_list {
            detail_table(&client, account, dbs)
        } else {
            summary(&client, account, dbs)
        }
    } else {
        detail_table(&client, account, dbs)
    }
}

/// Everything one detail row needs, fetched off the worker pool.
struct DbDetail {
    db: String,
    shardcount: usize,
    nvalue: usize,
    active: u64,
    disk: u64,
    doc_count: u64,
    del_doc_count: u64,
}

fn fetch_detail(client: &ApiClient, account: &str, db: String) -> couchctl_core::Result<DbDetail> {
    let stats = client.db_stats(account, &db)?;
    let shards = client.shard_map(account, &db)?;
    let table = ShardTable::build(&shards)?;
    Ok(DbDetail {
        db,
        shardcount: table.unique_shards(),
        nvalue: table.replication_factor(),
        active: stats.sizes.effective_active(),
        disk: stats.sizes.file,
        doc_count: stats.doc_count,
        del_doc_count: stats.doc_del_count,
    })
}

/// Raw counters for the summary: docs, deleted docs, active, disk.
fn fetch_basic(
    client: &ApiClient,
    account: &str,
    db: String,
) -> couchctl_core::Result<(u64, u64, u64, u64)> {
    let stats = client.db_stats(account, &db)?;
    Ok((
        stats.doc_count,
        stats.doc_del_count,
        stats.sizes.effective_active(),
        stats.sizes.file,
    ))
}

/// Measure a sample batch, project the full runtime, and let the user
/// back out before the long haul.
fn give_estimate(
    client: &Arc<ApiClient>,
    account: &str,
    dbs: &[String],
    detail: bool,
) -> Result<()> {
    let sample: Vec<String> = dbs[..MAX_DBS].to_vec();
    let account_owned = account.to_string();
    let client_ref = Arc::clone(client);

    let start = Instant::now();
    if detail {
        pool::map_parallel(sample, pool::BATCH_DEADLINE, move |db| {
            fetch_detail(&client_ref, &account_owned, db)
        })?;
    } else {
        pool::map_parallel(sample, pool::BATCH_DEADLINE, move |db| {
            fetch_basic(&client_ref, &account_owned, db)
        })?;
    }
    let projected = start.elapsed().as_secs_f64() * (dbs.len() as f64 / MAX_DBS as f64);

    println!(
        " There are {} databases in the account.",
        count_pretty(dbs.len() as u64)
    );
    println!(" Estimated completion time: {}", pretty_time(projected));
    println!();
    if !ui::confirm("Continue?") {
        bail!("aborted");
    }
    Ok(())
}

fn detail_table(client: &Arc<ApiClient>, account: &str, dbs: Vec<String>) -> Result<()> {
    let account_owned = account.to_string();
    let client_ref = Arc::clone(client);
    let mut details = pool::map_parallel(dbs, pool::BATCH_DEADLINE, move |db| {
        fetch_detail(&client_ref, &account_owned, db)
    })?;
    details.sort_by(|a, b| a.db.cmp(&b.db));

    let mut totals = DbDetail {
        db: "Totals:".into(),
        shardcount: 0,
        nvalue: 0,
        active: 0,
        disk: 0,
        doc_count: 0,
        del_doc_count: 0,
    };
    let mut rows = Vec::with_capacity(details.len() + 1);
    for d in &details {
        totals.shardcount += d.shardcount;
        totals.active += d.active;
        totals.disk += d.disk;
        totals.doc_count += d.doc_count;
        totals.del_doc_count += d.del_doc_count;
        rows.push(DatabaseRow {
            database: d.db.clone(),
            q: d.shardcount.to_string(),
            n: d.nvalue.to_string(),
            active: data_size_pretty(d.active as f64),
            disk: data_size_pretty(d.disk as f64),
            docs: count_pretty(d.doc_count),
            deleted_docs: count_pretty(d.del_doc_count),
        });
    }
    // Totals sum raw counters; a summed replication factor means nothing
    rows.push(DatabaseRow {
        database: totals.db,
        q: totals.shardcount.to_string(),
        n: "N/A".into(),
        active: data_size_pretty(totals.active as f64),
        disk: data_size_pretty(totals.disk as f64),
        docs: count_pretty(totals.doc_count),
        deleted_docs: count_pretty(totals.del_doc_count),
    });
    render_table(rows);
    Ok(())
}

fn summary(client: &Arc<ApiClient>, account: &str, dbs: Vec<String>) -> Result<()> {
    let dbcount = dbs.len();
    let account_owned = account.to_string();
    let client_ref = Arc::clone(client);

    let start = Instant::now();
    let counters = pool::map_parallel(dbs, pool::BATCH_DEADLINE, move |db| {
        fetch_basic(&client_ref, &account_owned, db)
    })?;
    println!(
        " HTTP queries completed in: {}",
        pretty_time(start.elapsed().as_secs_f64())
    );

    let mut docs = 0u64;
    let mut deleted = 0u64;
    let mut active = 0u64;
    let mut disk = 0u64;
    for (d, dd, a, f) in counters {
        docs += d;
        deleted += dd;
        active += a;
        disk += f;
    }

    println!(" Account: {}", account);
    render_table(vec![
        SummaryRow {
            label: "Number of databases".into(),
            value: count_pretty(dbcount as u64),
        },
        SummaryRow {
            label: "Total docs".into(),
            value: count_pretty(docs),
        },
        SummaryRow {
            label: "Total deleted docs".into(),
            value: count_pretty(deleted),
        },
        SummaryRow {
            label: "Total active size".into(),
            value: data_size_pretty(active as f64),
        },
        SummaryRow {
            label: "Total disk size".into(),
            value: data_size_pretty(disk as f64),
        },
    ]);
    Ok(())
}
