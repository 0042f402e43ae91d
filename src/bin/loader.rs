use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};

use fraud_dashboard::config;
use fraud_dashboard::loader::{load_records, read_records, strip_ids};
use fraud_dashboard::store::TableStore;

/// Upload a JSON array of fraud records into the hosted table.
#[derive(Parser)]
#[command(name = "loader")]
struct Args {
    /// Path to a JSON file containing a top-level array of records.
    file: PathBuf,

    /// Target table, overriding SUPABASE_TABLE.
    #[arg(long)]
    table: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    // Config and parse errors are fatal before any write is attempted.
    let mut config = config::load_config()?;
    if let Some(table) = args.table {
        config.table_name = table;
    }

    let mut records = read_records(&args.file)?;
    strip_ids(&mut records);
    info!(records = records.len(), file = %args.file.display(), "parsed input file");

    let store = TableStore::new(
        &config.supabase_url,
        &config.supabase_key,
        &config.table_name,
        &config.conflict_key,
    )?;
    // Row-level rejections are best-effort; an unreachable store aborts
    // with a nonzero exit.
    let report = load_records(&store, records).await?;

    if !report.failed.is_empty() {
        warn!(failed = report.failed.len(), "some records were rejected by the store");
    }
    info!(
        "Uploaded {} of {} records to table '{}'.",
        report.succeeded,
        report.total(),
        config.table_name
    );

    Ok(())
}
