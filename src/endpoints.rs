//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/transacoes/{transaction_id}', use [format_endpoint].

/// The route to create transactions (register service) and to list them (report service).
pub const TRANSACTIONS: &str = "/transacoes";
/// The route to update a single transaction.
pub const TRANSACTION: &str = "/transacoes/{transaction_id}";
/// The route for the overall income, expense and balance summary.
pub const SUMMARY: &str = "/resumo-geral";
/// The route for the total of a single category.
pub const CATEGORY_TOTAL: &str = "/categoria/{category}";

/// Replace the first `{parameter}` in `endpoint_path` with `id`.
///
/// Returns `endpoint_path` unchanged when it has no parameter. A parameter
/// without a closing brace runs to the end of the path.
pub fn format_endpoint(endpoint_path: &str, id: &str) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| param_start + offset + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
