use std::{net::SocketAddr, process::exit, sync::Arc};

use clap::Parser;
use rusqlite::Connection;

use finance_ledger::{
    RegisterState, add_tracing_layer, build_register_router, serve, setup_logging,
    stores::sqlite::SQLiteIndexStore,
};

/// The register service: creates and updates transactions.
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
    #[arg(short, long, env = "PORT", default_value_t = 4000)]
    port: u16,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let state = Connection::open(&args.db_url)
        .map_err(finance_ledger::Error::from)
        .and_then(|db_connection| {
            let index_store = SQLiteIndexStore::new(Connection::open(&args.cache_url)?)?;
            RegisterState::new(db_connection, Arc::new(index_store))
        });

    let state = match state {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not open the stores: {error}");
            exit(1);
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let router = add_tracing_layer(build_register_router(state));

    if let Err(error) = serve(router, addr).await {
        tracing::error!("Server error: {error}");
        exit(1);
    }
}
