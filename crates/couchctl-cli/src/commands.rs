use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

use couchctl_api::client::DEFAULT_DOMAIN;
use couchctl_api::{ApiClient, Credentials};

use crate::logging;
use crate::{databases, dbinfo, disk, replicate, shards, tasks};

/// Environment override for the service domain.
const DOMAIN_ENV: &str = "COUCHCTL_DOMAIN";

#[derive(Parser)]
#[command(
    name = "couchctl",
    version,
    about = "Admin reporting CLI for hosted CouchDB-compatible database clusters"
)]
struct Cli {
    /// Service domain: API hosts are https://<name>.<domain>
    #[arg(long, global = true)]
    domain: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-node disk usage and growth across a cluster
    Disk {
        /// Account name (https://<account>.<domain>)
        #[arg(long, short = 'u')]
        account: String,
        /// Cluster to report on
        #[arg(long, short = 'c')]
        cluster: String,
    },

    /// Shard distribution balance for one database
    Shards {
        /// Account name
        #[arg(long, short = 'u')]
        account: String,
        /// Cluster hosting the database
        #[arg(long, short = 'c')]
        cluster: String,
        /// Database name
        #[arg(long, short = 'd')]
        database: String,
        /// Print the shard-range legend instead of the distribution
        #[arg(long, short = 'k')]
        legend: bool,
    },

    /// Status of background tasks running on an account
    Tasks {
        /// Account name
        account: String,
        /// One line per task on top of the per-type summary
        #[arg(long, short = 'd')]
        detail: bool,
    },

    /// Summary information about one database
    Dbinfo {
        /// Account name
        account: String,
        /// Database name
        database: String,
        /// Per-node shard distribution table (needs cluster admin)
        #[arg(long, short = 's')]
        shards: bool,
        /// Shard-range legend (with --shards)
        #[arg(long, short = 'k', requires = "shards")]
        legend: bool,
        /// Index (view, search, geo) sizes
        #[arg(long, short = 'i')]
        indexes: bool,
        /// Scan the database for conflicted documents (slow)
        #[arg(long, short = 'x')]
        conflicts: bool,
        /// List every view with its flavor
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Per-database table across a whole account
    Databases {
        /// Account name
        account: String,
        /// Full table even past the summary threshold
        #[arg(long, short = 'f')]
        force_list: bool,
    },

    /// Replicate every user database to another account
    Replicate {
        /// Source account name
        source: String,
        /// Destination account name
        destination: String,
        /// Make the replications continuous
        #[arg(long, short = 'c')]
        continuous: bool,
        /// Only replicate databases that already exist at the destination
        #[arg(long, short = 'e')]
        existing_only: bool,
        /// Delete every replication document this command created instead
        #[arg(long, short = 't')]
        terminate: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    let domain = cli
        .domain
        .or_else(|| std::env::var(DOMAIN_ENV).ok())
        .unwrap_or_else(|| DEFAULT_DOMAIN.to_string());
    tracing::debug!(domain = %domain, "resolved service domain");

    match cli.command {
        Commands::Disk { account, cluster } => {
            disk::cmd_disk(client(&domain)?, &account, &cluster)
        }
        Commands::Shards {
            account,
            cluster,
            database,
            legend,
        } => shards::cmd_shards(&client(&domain)?, &account, &cluster, &database, legend),
        Commands::Tasks { account, detail } => {
            tasks::cmd_tasks(&client(&domain)?, &account, detail)
        }
        Commands::Dbinfo {
            account,
            database,
            shards,
            legend,
            indexes,
            conflicts,
            verbose,
        } => dbinfo::cmd_dbinfo(
            &client(&domain)?,
            &account,
            &database,
            dbinfo::Sections {
                shards,
                legend,
                indexes,
                conflicts,
                verbose,
            },
        ),
        Commands::Databases {
            account,
            force_list,
        } => databases::cmd_databases(client(&domain)?, &account, force_list),
        Commands::Replicate {
            source,
            destination,
            continuous,
            existing_only,
            terminate,
        } => replicate::cmd_replicate(
            &domain,
            &source,
            &destination,
            replicate::Options {
                continuous,
                existing_only,
                terminate,
            },
        ),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

/// Resolve credentials and build the API client. Credentials come first:
/// a missing environment is fatal before any network call.
fn client(domain: &str) -> Result<ApiClient> {
    let credentials = Credentials::from_env()?;
    Ok(ApiClient::new(domain, credentials)?)
}

fn cmd_completions(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "couchctl", &mut std::io::stdout());
}
