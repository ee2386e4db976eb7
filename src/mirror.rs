//! Mirrors transactions from the relational store into the secondary index store.
//!
//! Each transaction is mirrored as:
//! - a hash at `txn:<id>` holding its fields,
//! - an entry in the sorted set `idx:data` scored by the Unix timestamp of its date,
//! - membership in exactly one category set `idx:cat:<category>`.
//!
//! Mirroring always happens after the relational write has committed and is
//! never rolled back or retried, so a failure here leaves the stores out of
//! sync.

use time::Date;

use crate::{
    Error,
    stores::{IndexOp, IndexStore},
    transaction::{Category, Transaction},
};

/// The sorted set that orders transaction IDs by date.
pub const DATE_INDEX_KEY: &str = "idx:data";

/// The key of the hash holding the fields of the transaction `id`.
pub fn transaction_key(id: &str) -> String {
    format!("txn:{id}")
}

/// The key of the set holding the IDs of the transactions in `category`.
pub fn category_key(category: &str) -> String {
    format!("idx:cat:{category}")
}

/// The Unix timestamp, in seconds, of midnight UTC at the start of `date`.
pub fn date_timestamp(date: Date) -> i64 {
    date.midnight().assume_utc().unix_timestamp()
}

/// Write a newly created transaction into the index store.
///
/// The hash, date index and category set are written one after the other,
/// not as a batch.
///
/// # Errors
/// Returns the first error from the index store. Writes made before the
/// failure are kept.
pub fn mirror_new_transaction(
    store: &dyn IndexStore,
    transaction: &Transaction,
) -> Result<(), Error> {
    tracing::debug!("Mirroring new transaction {}", transaction.id);

    store.apply(&[hash_op(transaction)])?;
    store.apply(&[date_index_op(transaction)])?;
    store.apply(&[IndexOp::SetAdd {
        key: category_key(transaction.category.as_str()),
        member: transaction.id.clone(),
    }])?;

    Ok(())
}

/// Rewrite an updated transaction in the index store as a single batch.
///
/// The ID is removed from every category set before being added to the set
/// for its current category, so it ends up in exactly one of them whatever
/// its previous category was.
///
/// # Errors
/// Returns an error if the index store fails to apply the batch.
pub fn mirror_updated_transaction(
    store: &dyn IndexStore,
    transaction: &Transaction,
) -> Result<(), Error> {
    tracing::debug!("Mirroring updated transaction {}", transaction.id);

    let mut ops = vec![hash_op(transaction), date_index_op(transaction)];
    ops.extend(Category::ALL.iter().map(|category| IndexOp::SetRemove {
        key: category_key(category.as_str()),
        member: transaction.id.clone(),
    }));
    ops.push(IndexOp::SetAdd {
        key: category_key(transaction.category.as_str()),
        member: transaction.id.clone(),
    });

    store.apply(&ops)
}

fn hash_op(transaction: &Transaction) -> IndexOp {
    IndexOp::HashSet {
        key: transaction_key(&transaction.id),
        fields: vec![
            ("valor".to_owned(), transaction.amount.to_string()),
            ("categoria".to_owned(), transaction.category.to_string()),
            ("data".to_owned(), transaction.date.to_string()),
            ("descricao".to_owned(), transaction.description.clone()),
            ("status".to_owned(), transaction.status.to_string()),
        ],
    }
}

fn date_index_op(transaction: &Transaction) -> IndexOp {
    IndexOp::SortedSetAdd {
        key: DATE_INDEX_KEY.to_owned(),
        member: transaction.id.clone(),
        score: date_timestamp(transaction.date),
    }
}
