//! The overall income, expense and balance summary and its cache.
//!
//! The cached summary is stored as JSON and decoded back into [Summary] with
//! `serde_json`. A cached value that does not decode is treated exactly like
//! a missing one.

use std::{sync::Mutex, time::Duration};

use axum::{Json, extract::State};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    db::lock_connection,
    report::ReportState,
    stores::IndexStore,
    transaction::{Category, sum_by_category},
};

/// The index store key the summary is cached under.
pub const SUMMARY_CACHE_KEY: &str = "report:geral";

/// Total income, total expenses and their difference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Summary {
    /// The sum of all income.
    pub ganhos: Decimal,
    /// The sum of all expenses.
    pub gastos: Decimal,
    /// Income minus expenses.
    pub saldo: Decimal,
}

/// Sum income and expenses straight from the relational store.
///
/// # Errors
/// Returns an [Error::SqlError] if either sum fails.
pub fn compute_summary(connection: &Connection) -> Result<Summary, Error> {
    let ganhos = sum_by_category(Category::Ganho.as_str(), connection)?;
    let gastos = sum_by_category(Category::Gasto.as_str(), connection)?;

    Ok(Summary {
        ganhos,
        gastos,
        saldo: ganhos - gastos,
    })
}

/// Get the summary from the cache, computing and caching it for `ttl` on a miss.
///
/// # Errors
/// Returns an error if the index store fails or the summary cannot be computed.
pub fn get_cached_summary(
    index_store: &dyn IndexStore,
    db_connection: &Mutex<Connection>,
    ttl: Duration,
) -> Result<Summary, Error> {
    if let Some(cached) = index_store.get(SUMMARY_CACHE_KEY)? {
        match serde_json::from_str::<Summary>(&cached) {
            Ok(summary) => return Ok(summary),
            Err(error) => {
                tracing::warn!("Ignoring undecodable cached summary: {error}");
            }
        }
    }

    let summary = {
        let connection = lock_connection(db_connection)?;
        compute_summary(&connection)?
    };

    let encoded = serde_json::to_string(&summary)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;
    index_store.set_with_expiry(SUMMARY_CACHE_KEY, &encoded, ttl)?;

    Ok(summary)
}

/// A route handler for the overall summary.
pub async fn get_summary_endpoint(
    State(state): State<ReportState>,
) -> Result<Json<Summary>, Error> {
    get_cached_summary(
        state.index_store.as_ref(),
        &state.db_connection,
        state.summary_ttl,
    )
    .map(Json)
}

#[cfg(test)]
mod summary_tests {
    use std::sync::{Arc, atomic::Ordering};

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        endpoints,
        report::{
            ReportState, SUMMARY_CACHE_KEY, Summary, build_report_router, get_cached_summary,
        },
        test_utils::{
            FailingIndexStore, must_create_report_state, must_create_report_state_with_clock,
        },
        transaction::{Category, Transaction, create_transaction},
    };

    fn insert(state: &ReportState, amount: Decimal, category: Category) {
        create_transaction(
            Transaction::build(amount, category, date!(2025 - 06 - 01)),
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test transaction");
    }

    #[tokio::test]
    async fn summary_sums_income_and_expenses() {
        let state = must_create_report_state();
        insert(&state, dec!(100), Category::Gasto);
        insert(&state, dec!(50), Category::Gasto);
        insert(&state, dec!(200), Category::Ganho);
        let server = TestServer::new(build_report_router(state))
            .expect("Could not create test server.");

        let response = server.get(endpoints::SUMMARY).await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Summary>(),
            Summary {
                ganhos: dec!(200),
                gastos: dec!(150),
                saldo: dec!(50),
            }
        );
    }

    #[tokio::test]
    async fn summary_sums_exact_decimals() {
        let state = must_create_report_state();
        insert(&state, dec!(0.1), Category::Ganho);
        insert(&state, dec!(0.2), Category::Ganho);
        insert(&state, dec!(0.1), Category::Gasto);
        let server = TestServer::new(build_report_router(state))
            .expect("Could not create test server.");

        let response = server.get(endpoints::SUMMARY).await;

        response.assert_status_ok();
        response.assert_json(&json!({ "ganhos": 0.3, "gastos": 0.1, "saldo": 0.2 }));
        let summary = response.json::<Summary>();
        assert_eq!(summary.ganhos, dec!(0.30));
        assert_eq!(summary.saldo, dec!(0.20));
    }

    #[tokio::test]
    async fn empty_store_summarises_to_zero() {
        let state = must_create_report_state();
        let server = TestServer::new(build_report_router(state))
            .expect("Could not create test server.");

        let summary = server.get(endpoints::SUMMARY).await.json::<Summary>();

        assert_eq!(
            summary,
            Summary {
                ganhos: Decimal::ZERO,
                gastos: Decimal::ZERO,
                saldo: Decimal::ZERO,
            }
        );
    }

    #[tokio::test]
    async fn summary_is_served_from_cache_until_ttl_expires() {
        let (state, now) = must_create_report_state_with_clock();
        insert(&state, dec!(10), Category::Ganho);
        let server = TestServer::new(build_report_router(state.clone()))
            .expect("Could not create test server.");

        let first = server.get(endpoints::SUMMARY).await.text();
        insert(&state, dec!(5), Category::Gasto);
        now.fetch_add(59, Ordering::SeqCst);
        let second = server.get(endpoints::SUMMARY).await.text();

        assert_eq!(first, second);

        now.fetch_add(1, Ordering::SeqCst);
        let third = server.get(endpoints::SUMMARY).await.json::<Summary>();

        assert_eq!(
            third,
            Summary {
                ganhos: dec!(10),
                gastos: dec!(5),
                saldo: dec!(5),
            }
        );
    }

    #[test]
    fn crafted_cache_value_is_never_evaluated() {
        let state = must_create_report_state();
        insert(&state, dec!(30), Category::Ganho);
        let crafted =
            "{'ganhos': __import__('os').system('touch /tmp/pwned'), 'gastos': 0, 'saldo': 0}";
        state
            .index_store
            .set_with_expiry(SUMMARY_CACHE_KEY, crafted, state.summary_ttl)
            .unwrap();

        let summary = get_cached_summary(
            state.index_store.as_ref(),
            &state.db_connection,
            state.summary_ttl,
        )
        .expect("Could not get summary");

        assert_eq!(
            summary,
            Summary {
                ganhos: dec!(30),
                gastos: Decimal::ZERO,
                saldo: dec!(30),
            }
        );
        let recached = state.index_store.get(SUMMARY_CACHE_KEY).unwrap().unwrap();
        assert_eq!(serde_json::from_str::<Summary>(&recached).unwrap(), summary);
    }

    #[test]
    fn cached_value_with_unexpected_fields_is_ignored() {
        let state = must_create_report_state();
        let crafted = r#"{"ganhos": 1, "gastos": 2, "saldo": -1, "__class__": "os.system"}"#;
        state
            .index_store
            .set_with_expiry(SUMMARY_CACHE_KEY, crafted, state.summary_ttl)
            .unwrap();

        let summary = get_cached_summary(
            state.index_store.as_ref(),
            &state.db_connection,
            state.summary_ttl,
        )
        .unwrap();

        assert_eq!(summary.saldo, Decimal::ZERO);
    }

    #[tokio::test]
    async fn index_store_failure_is_internal_error() {
        let mut state = must_create_report_state();
        state.index_store = Arc::new(FailingIndexStore);
        let server = TestServer::new(build_report_router(state))
            .expect("Could not create test server.");

        server
            .get(endpoints::SUMMARY)
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}
