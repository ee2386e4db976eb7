//! The register service: creates and updates transactions and keeps the
//! secondary index store in sync with the relational store.

mod create_endpoint;
mod edit_endpoint;

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    routing::{post, put},
};
use rusqlite::Connection;

use crate::{Error, db::initialize, endpoints, stores::IndexStore};

pub use create_endpoint::create_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;

/// The state shared by the register service's request handlers.
#[derive(Debug, Clone)]
pub struct RegisterState {
    /// The connection to the relational store.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The secondary index store that mirrors the relational store.
    pub index_store: Arc<dyn IndexStore>,
}

impl RegisterState {
    /// Create a new [RegisterState].
    ///
    /// This function will initialize the database by adding the tables for
    /// the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, index_store: Arc<dyn IndexStore>) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            index_store,
        })
    }
}

/// Return a router with all the register service's routes.
pub fn build_register_router(state: RegisterState) -> Router {
    Router::new()
        .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint))
        .route(endpoints::TRANSACTION, put(edit_transaction_endpoint))
        .with_state(state)
}
