//! Transaction management for the ledger services.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model, its [Category] and [Status]
//! - The `TransactionBuilder` and the request body it is built from
//! - Database functions for storing, querying, and summing transactions

mod category;
mod core;
mod form;
mod status;

pub use category::Category;
pub use core::{
    AMOUNT_SCALE, Transaction, TransactionBuilder, create_transaction, create_transaction_table,
    get_transaction, get_transactions, map_transaction_row, round_amount, sum_by_category,
    transaction_exists, update_transaction,
};
pub use form::TransactionForm;
pub use status::Status;
