use std::collections::BTreeMap;

use anyhow::{Context, Result};

use couchctl_api::ApiClient;
use couchctl_api::schema::TaskKind;

/// Pending-changes summary of the account's background tasks.
pub fn cmd_tasks(client: &ApiClient, account: &str, detail: bool) -> Result<()> {
    let tasks = client
        .active_tasks(account)
        .with_context(|| format!("cannot fetch active tasks for {}", account))?;

    println!(" Active tasks for account {}", account);
    let mut pending_by_kind: BTreeMap<TaskKind, i64> = BTreeMap::new();
    for task in &tasks {
        let pending = task.pending();
        if detail {
            println!(
                " Type: {} - Pending changes: {}{}",
                task.kind.label(),
                pending,
                task.database
                    .as_deref()
                    .map(|db| format!(" ({})", db))
                    .unwrap_or_default()
            );
        }
        *pending_by_kind.entry(task.kind).or_insert(0) += pending;
    }

    println!(" Total changes left:");
    for (kind, pending) in &pending_by_kind {
        if *pending > 0 {
            println!(" {}: {}", kind.label(), pending);
        }
    }
    Ok(())
}
