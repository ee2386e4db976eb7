use std::{net::SocketAddr, process::exit, sync::Arc, time::Duration};

use clap::Parser;
use rusqlite::Connection;

use finance_ledger::{
    Error, ReportState, add_tracing_layer, build_report_router, serve, setup_logging,
    stores::sqlite::SQLiteIndexStore,
};

/// The report service: totals, the cached summary, and transaction listings.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DB_URL")]
    db_url: String,

    /// File path to the SQLite database used as the index store.
    #[arg(long, env = "CACHE_URL", default_value = "index.db")]
    cache_url: String,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// How many seconds a computed summary is served from the cache.
    #[arg(long, env = "SUMMARY_TTL", default_value_t = 60)]
    summary_ttl: u64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let state = open_stores(&args);
    let state = match state {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not open the stores: {error}");
            exit(1);
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let router = add_tracing_layer(build_report_router(state));

    if let Err(error) = serve(router, addr).await {
        tracing::error!("Server error: {error}");
        exit(1);
    }
}

fn open_stores(args: &Args) -> Result<ReportState, Error> {
    let db_connection = Connection::open(&args.db_url)?;
    let index_store = SQLiteIndexStore::new(Connection::open(&args.cache_url)?)?;

    ReportState::new(
        db_connection,
        Arc::new(index_store),
        Duration::from_secs(args.summary_ttl),
    )
}
