use anyhow::{Context, Result};

use couchctl_api::schema::ReplicationDoc;
use couchctl_api::{ApiClient, Credentials};

use crate::ui;

/// Replication documents created here are namespaced so `--terminate`
/// only ever deletes its own.
const DOC_PREFIX: &str = "alldbs-";

pub struct Options {
    pub continuous: bool,
    pub existing_only: bool,
    pub terminate: bool,
}

/// Replicate every user database from one account to another by inserting
/// documents into the source `_replicator` database. Credentials are
/// prompted per account and embedded in the source/target URLs.
pub fn cmd_replicate(
    domain: &str,
    source: &str,
    destination: &str,
    opts: Options,
) -> Result<()> {
    let source_pass = ui::password(&format!("Password for the '{}' account:", source))?;
    let client = ApiClient::new(domain, Credentials::basic(source, &source_pass))?;

    if opts.terminate {
        return terminate_tasks(&client, source);
    }

    let dest_pass = ui::password(&format!("Password for the '{}' account:", destination))?;

    let dbs = client
        .all_dbs(source)
        .with_context(|| format!("cannot list databases of {}", source))?;
    println!("Total databases in account: {}", dbs.len());

    let mut inserted = 0;
    for db in dbs.iter().filter(|db| is_user_db(db)) {
        let name = format!("{}{}", DOC_PREFIX, db);
        let doc = ReplicationDoc {
            _id: name.clone(),
            name,
            source: replication_url(source, &source_pass, domain, db),
            target: replication_url(destination, &dest_pass, domain, db),
            create_target: !opts.existing_only,
            continuous: opts.continuous,
        };
        client
            .insert_replication(source, &doc)
            .with_context(|| format!("cannot queue replication for {}", db))?;
        ui::info(&format!("queued replication for \"{}\"", db));
        inserted += 1;
    }

    println!(
        "{} replication documents inserted. Use 'couchctl tasks {}' to check status.",
        inserted, source
    );
    println!("To signal stop of the replications, run again with --terminate.");
    Ok(())
}

/// Reserved databases (leading underscore) never replicate.
fn is_user_db(db: &str) -> bool {
    !db.starts_with('_')
}

fn replication_url(account: &str, password: &str, domain: &str, db: &str) -> String {
    format!(
        "https://{}:{}@{}.{}/{}",
        account, password, account, domain, db
    )
}

/// Delete every replication document this command created.
fn terminate_tasks(client: &ApiClient, source: &str) -> Result<()> {
    let rows = client
        .replicator_rows(source)
        .context("cannot list _replicator documents")?;

    let mut deleted = 0;
    for row in rows.iter().filter(|row| row.id.starts_with(DOC_PREFIX)) {
        client.delete_replicator_doc(source, &row.id, &row.value.rev)?;
        println!("Deleted _replicator/{}", row.id);
        deleted += 1;
    }
    if deleted == 0 {
        ui::info("No replication documents to delete.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_databases_are_skipped() {
        assert!(is_user_db("orders"));
        assert!(!is_user_db("_replicator"));
        assert!(!is_user_db("_users"));
    }

    #[test]
    fn test_replication_url_embeds_credentials() {
        assert_eq!(
            replication_url("acme", "pw", "cloudant.com", "orders"),
            "https://acme:pw@acme.cloudant.com/orders"
        );
    }
}
