//! The report service: sums, the cached summary, and transaction listings.

mod category_total;
mod list;
mod summary;

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{Router, routing::get};
use rusqlite::Connection;

use crate::{Error, db::initialize, endpoints, stores::IndexStore};

pub use category_total::{CategoryTotal, get_category_total_endpoint};
pub use list::{ListQuery, get_transactions_endpoint};
pub use summary::{
    SUMMARY_CACHE_KEY, Summary, compute_summary, get_cached_summary, get_summary_endpoint,
};

/// How long a computed summary is served from the cache by default.
pub const DEFAULT_SUMMARY_TTL: Duration = Duration::from_secs(60);

/// The state shared by the report service's request handlers.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The connection to the relational store.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The store holding the cached summary.
    pub index_store: Arc<dyn IndexStore>,
    /// How long a computed summary stays in the cache.
    pub summary_ttl: Duration,
}

impl ReportState {
    /// Create a new [ReportState].
    ///
    /// This function will initialize the database by adding the tables for
    /// the domain models, so reports work before the first transaction is
    /// registered.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        index_store: Arc<dyn IndexStore>,
        summary_ttl: Duration,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            index_store,
            summary_ttl,
        })
    }
}

/// Return a router with all the report service's routes.
pub fn build_report_router(state: ReportState) -> Router {
    Router::new()
        .route(endpoints::SUMMARY, get(get_summary_endpoint))
        .route(endpoints::CATEGORY_TOTAL, get(get_category_total_endpoint))
        .route(endpoints::TRANSACTIONS, get(get_transactions_endpoint))
        .with_state(state)
}
