use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    Error,
    database_id::TransactionId,
    db::lock_connection,
    mirror::mirror_updated_transaction,
    register::RegisterState,
    transaction::{
        Transaction, TransactionBuilder, TransactionForm, transaction_exists, update_transaction,
    },
};

/// A route handler for overwriting an existing transaction.
///
/// Responds with 404 and leaves both stores untouched when `transaction_id`
/// is unknown. Otherwise the relational update is committed before the index
/// store is rewritten in one batch.
pub async fn edit_transaction_endpoint(
    State(state): State<RegisterState>,
    Path(transaction_id): Path<TransactionId>,
    Json(form): Json<TransactionForm>,
) -> Result<Json<Transaction>, Error> {
    let builder = TransactionBuilder::try_from(form)?;

    let transaction = {
        let connection = lock_connection(&state.db_connection)?;

        if !transaction_exists(&transaction_id, &connection)? {
            tracing::info!("Could not update transaction {transaction_id}: not found");
            return Err(Error::NotFound);
        }

        update_transaction(&transaction_id, builder, &connection)?
    };

    tracing::info!("Updated transaction {transaction_id}");

    mirror_updated_transaction(state.index_store.as_ref(), &transaction)?;

    Ok(Json(transaction))
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use axum::{
        Json,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_test::TestServer;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        Error, endpoints,
        endpoints::format_endpoint,
        mirror::{DATE_INDEX_KEY, date_timestamp, mirror_new_transaction, transaction_key},
        register::{build_register_router, edit_transaction_endpoint},
        test_utils::must_create_register_state,
        transaction::{
            Category, Status, Transaction, TransactionForm, create_transaction, get_transaction,
        },
    };

    #[tokio::test]
    async fn can_update_transaction() {
        let state = must_create_register_state();
        let transaction = create_transaction(
            Transaction::build(dec!(1.23), Category::Gasto, date!(2025 - 10 - 27))
                .description("test"),
            &state.db_connection.lock().unwrap(),
        )
        .expect("could not create test transaction");
        let want_transaction = Transaction {
            id: transaction.id.clone(),
            amount: dec!(3.21),
            category: Category::Gasto,
            date: date!(2025 - 10 - 28),
            description: "foo".to_owned(),
            status: Status::Atrasado,
        };
        let form = TransactionForm {
            valor: want_transaction.amount,
            categoria: want_transaction.category,
            data: want_transaction.date,
            descricao: Some(want_transaction.description.clone()),
            status: want_transaction.status,
        };

        let Json(got_response) = edit_transaction_endpoint(
            State(state.clone()),
            Path(transaction.id.clone()),
            Json(form),
        )
        .await
        .expect("could not update transaction");

        assert_eq!(got_response, want_transaction);
        let got_transaction = get_transaction(
            &transaction.id,
            &state.db_connection.lock().expect("could not acquire lock"),
        )
        .expect("could not get test transaction");
        assert_eq!(want_transaction, got_transaction);
    }

    #[tokio::test]
    async fn update_moves_id_between_category_sets() {
        let state = must_create_register_state();
        let transaction = create_transaction(
            Transaction::build(dec!(50), Category::Gasto, date!(2025 - 01 - 15)),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        mirror_new_transaction(state.index_store.as_ref(), &transaction).unwrap();
        let server = TestServer::new(build_register_router(state.clone()))
            .expect("Could not create test server.");

        server
            .put(&format_endpoint(endpoints::TRANSACTION, &transaction.id))
            .json(&json!({
                "valor": 50.0,
                "categoria": "ganho",
                "data": "2025-02-20"
            }))
            .await
            .assert_status_ok();

        assert_eq!(
            state.index_store.set_members("idx:cat:gasto"),
            Ok(BTreeSet::new())
        );
        assert_eq!(
            state.index_store.set_members("idx:cat:ganho"),
            Ok(BTreeSet::from([transaction.id.clone()]))
        );
        assert_eq!(
            state
                .index_store
                .sorted_set_score(DATE_INDEX_KEY, &transaction.id),
            Ok(Some(date_timestamp(date!(2025 - 02 - 20))))
        );
        let fields = state
            .index_store
            .hash_fields(&transaction_key(&transaction.id))
            .unwrap();
        assert_eq!(fields.get("categoria").map(String::as_str), Some("ganho"));
    }

    #[tokio::test]
    async fn update_missing_transaction_is_not_found_and_mutates_nothing() {
        let state = must_create_register_state();

        let result = edit_transaction_endpoint(
            State(state.clone()),
            Path("does-not-exist".to_owned()),
            Json(TransactionForm {
                valor: dec!(10),
                categoria: Category::Ganho,
                data: date!(2025 - 01 - 01),
                descricao: None,
                status: Status::Pago,
            }),
        )
        .await;

        let error = result.expect_err("want not found error");
        assert_eq!(error, Error::NotFound);
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);

        let count: u32 = state
            .db_connection
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(
            state.index_store.hash_fields(&transaction_key("does-not-exist")),
            Ok(Default::default())
        );
        assert_eq!(
            state.index_store.sorted_set_score(DATE_INDEX_KEY, "does-not-exist"),
            Ok(None)
        );
        for category in Category::ALL {
            assert_eq!(
                state
                    .index_store
                    .set_members(&format!("idx:cat:{category}")),
                Ok(BTreeSet::new())
            );
        }
    }

    #[tokio::test]
    async fn update_over_http_returns_404_for_unknown_id() {
        let state = must_create_register_state();
        let server = TestServer::new(build_register_router(state))
            .expect("Could not create test server.");

        server
            .put(&format_endpoint(endpoints::TRANSACTION, "unknown"))
            .json(&json!({
                "valor": 1,
                "categoria": "gasto",
                "data": "2025-02-20"
            }))
            .await
            .assert_status_not_found();
    }
}
