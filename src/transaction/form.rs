//! The request body accepted when creating or editing a transaction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    transaction::{Category, Status, Transaction, TransactionBuilder},
};

/// The JSON body for creating or updating a transaction.
///
/// `descricao` may be omitted or `null`, both of which mean an empty
/// description. `status` defaults to [Status::Pago].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionForm {
    /// The amount of money, must be greater than zero. Rounded to cents.
    pub valor: Decimal,
    /// Whether the money was earned or spent.
    pub categoria: Category,
    /// The date in the format `YYYY-MM-DD`.
    pub data: Date,
    /// An optional description.
    #[serde(default)]
    pub descricao: Option<String>,
    /// The payment status.
    #[serde(default)]
    pub status: Status,
}

impl TryFrom<TransactionForm> for TransactionBuilder {
    type Error = Error;

    fn try_from(form: TransactionForm) -> Result<Self, Self::Error> {
        Transaction::build(form.valor, form.categoria, form.data)
            .description(form.descricao.as_deref().unwrap_or_default())
            .status(form.status)
            .validate()
    }
}
