//! Finance ledger is a pair of small HTTP services for recording and
//! summarizing financial transactions.
//!
//! - The register service creates and updates transactions in the relational
//!   store and mirrors each one into a secondary index store.
//! - The report service sums transactions, caching the overall summary in the
//!   index store for a short time.
//!
//! The two stores are written one after the other without any atomicity
//! between them, see [mirror] for the guarantees that remain.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::Router;
use axum_server::Handle;
use tokio::signal;

mod database_id;
mod db;
pub mod endpoints;
mod error;
mod logging;
pub mod mirror;
pub mod register;
pub mod report;
pub mod stores;
pub mod transaction;

#[cfg(test)]
mod test_utils;

pub use database_id::{TransactionId, new_transaction_id};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, add_tracing_layer, logging_middleware, setup_logging};
pub use register::{RegisterState, build_register_router};
pub use report::{DEFAULT_SUMMARY_TTL, ReportState, Summary, build_report_router};

/// Serve `router` on `addr` until a shutdown signal is received.
///
/// # Errors
/// Returns an error if the server cannot bind to `addr` or fails while serving.
pub async fn serve(router: Router, addr: SocketAddr) -> std::io::Result<()> {
    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
}

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
