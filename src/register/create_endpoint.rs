//! Handler for creating transactions.

use axum::{Json, extract::State};

use crate::{
    Error,
    db::lock_connection,
    mirror::mirror_new_transaction,
    register::RegisterState,
    transaction::{Transaction, TransactionBuilder, TransactionForm, create_transaction},
};

/// A route handler for creating a new transaction.
///
/// The transaction is inserted into the relational store first and then
/// mirrored into the index store. If mirroring fails the row stays committed
/// and the client receives an internal server error.
pub async fn create_transaction_endpoint(
    State(state): State<RegisterState>,
    Json(form): Json<TransactionForm>,
) -> Result<Json<Transaction>, Error> {
    let builder = TransactionBuilder::try_from(form)?;

    let transaction = {
        let connection = lock_connection(&state.db_connection)?;
        create_transaction(builder, &connection)?
    };

    tracing::info!("Created transaction {}", transaction.id);

    mirror_new_transaction(state.index_store.as_ref(), &transaction)?;

    Ok(Json(transaction))
}
