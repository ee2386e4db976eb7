//! Sets up the relational store.

use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{Error, transaction::create_transaction_table};

/// Create the tables for the domain models.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Acquire the shared database connection for the duration of the returned guard.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the lock has been poisoned.
pub fn lock_connection(
    connection: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}
