//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Serialize;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the ID is
    /// correct and that the transaction has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error from the relational store.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// The secondary index store rejected or failed an operation.
    ///
    /// This error is never compensated: if it happens after a relational
    /// write, the two stores are left out of sync.
    #[error("the index store failed: {0}")]
    IndexStoreError(String),

    /// Could not acquire the lock on a store connection.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A string that is not one of the known transaction categories.
    #[error("\"{0}\" is not a valid category")]
    InvalidCategory(String),

    /// A string that is not one of the known transaction statuses.
    #[error("\"{0}\" is not a valid status")]
    InvalidStatus(String),

    /// Transaction amounts must be strictly positive and below 100,000,000.
    #[error("{0} is not a valid amount, expected a number from 0.01 to 99999999.99")]
    InvalidAmount(Decimal),

    /// A month outside of 1 to 12.
    #[error("{0} is not a valid month, expected a number from 1 to 12")]
    InvalidMonth(u32),

    /// A year before 2000.
    #[error("{0} is not a valid year, expected 2000 or later")]
    InvalidYear(i32),

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent with every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// A short, client safe description of what went wrong.
    pub detail: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status_code, detail) = match self {
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                "Transação não encontrada".to_owned(),
            ),
            Error::InvalidCategory(_)
            | Error::InvalidStatus(_)
            | Error::InvalidAmount(_)
            | Error::InvalidMonth(_)
            | Error::InvalidYear(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            Error::SqlError(error) => {
                tracing::error!("A database error occurred: {error}");
                (StatusCode::INTERNAL_SERVER_ERROR, "DB error".to_owned())
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_owned(),
                )
            }
        };

        (status_code, Json(ErrorBody { detail })).into_response()
    }
}
