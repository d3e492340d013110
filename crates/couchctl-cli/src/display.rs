use tabled::Tabled;

/// Display row for `databases` detail mode.
#[derive(Debug, Tabled)]
pub struct DatabaseRow {
    #[tabled(rename = "DATABASE")]
    pub database: String,
    #[tabled(rename = "Q")]
    pub q: String,
    #[tabled(rename = "N")]
    pub n: String,
    #[tabled(rename = "ACTIVE")]
    pub active: String,
    #[tabled(rename = "DISK")]
    pub disk: String,
    #[tabled(rename = "DOCS")]
    pub docs: String,
    #[tabled(rename = "DELETED DOCS")]
    pub deleted_docs: String,
}

/// Display row for `databases` summary mode and similar two-column
/// label/value reports.
#[derive(Debug, Tabled)]
pub struct SummaryRow {
    #[tabled(rename = "METRIC")]
    pub label: String,
    #[tabled(rename = "VALUE")]
    pub value: String,
}

/// Display row for the per-node shard table of `dbinfo --shards`.
#[derive(Debug, Tabled)]
pub struct ShardRow {
    #[tabled(rename = "NODE")]
    pub node: String,
    #[tabled(rename = "SHARDS")]
    pub shards: usize,
    #[tabled(rename = "RANGES")]
    pub ranges: String,
}

/// Render rows as a rounded table on stdout. Column widths follow the
/// longest cell, so arbitrarily long database names keep alignment.
pub fn render_table<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("(none)");
        return;
    }
    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);
}
