//! The total of a single category.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Error, db::lock_connection, report::ReportState, transaction::sum_by_category};

/// The sum of all transactions in `categoria`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The category as given in the request.
    pub categoria: String,
    /// The sum of the amounts, zero when no transaction matches.
    pub total: Decimal,
}

/// A route handler for the total of a category.
///
/// The category is not checked against the known categories, unknown names
/// simply total zero. The total is always read from the relational store.
pub async fn get_category_total_endpoint(
    State(state): State<ReportState>,
    Path(category): Path<String>,
) -> Result<Json<CategoryTotal>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let total = sum_by_category(&category, &connection)?;

    Ok(Json(CategoryTotal {
        categoria: category,
        total,
    }))
}
