//! Defines the core data model and database queries for transactions.

use std::ops::RangeInclusive;

use rusqlite::{Connection, Row, params};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{TransactionId, new_transaction_id},
    transaction::{Category, Status},
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build] and
/// [create_transaction].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned in this transaction, to the cent.
    #[serde(rename = "valor")]
    pub amount: Decimal,
    /// Whether the money was earned or spent.
    #[serde(rename = "categoria")]
    pub category: Category,
    /// When the transaction happened.
    #[serde(rename = "data")]
    pub date: Date,
    /// A text description of what the transaction was for.
    #[serde(rename = "descricao")]
    pub description: String,
    /// Whether the transaction has been settled.
    pub status: Status,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability. `amount` is
    /// rounded to cents with [round_amount].
    pub fn build(amount: Decimal, category: Category, date: Date) -> TransactionBuilder {
        TransactionBuilder {
            amount: round_amount(amount),
            category,
            date,
            description: String::new(),
            status: Status::default(),
        }
    }
}

/// The mutable fields of a [Transaction].
///
/// Used both to insert new transactions and to overwrite existing ones.
/// `description` defaults to the empty string and `status` to [Status::Pago].
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The amount of money, greater than zero with two decimal places.
    ///
    /// Whether the money was earned or spent is given by `category`, not by
    /// the sign of the amount.
    pub amount: Decimal,

    /// Whether the money was earned or spent.
    pub category: Category,

    /// The calendar date when the transaction occurred.
    pub date: Date,

    /// A free text description, possibly empty.
    pub description: String,

    /// Whether the transaction has been settled.
    pub status: Status,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        description.clone_into(&mut self.description);
        self
    }

    /// Set the status for the transaction.
    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Check the fields that the type system does not already guarantee.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if the amount is not greater than zero
    /// or does not fit in eight integer digits.
    pub fn validate(self) -> Result<Self, Error> {
        if self.amount <= Decimal::ZERO || self.amount >= Decimal::from(MAX_AMOUNT_EXCLUSIVE) {
            return Err(Error::InvalidAmount(self.amount));
        }

        Ok(self)
    }

    /// Attach `id` to the fields to get the full transaction record.
    pub fn finalise(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            amount: self.amount,
            category: self.category,
            date: self.date,
            description: self.description,
            status: self.status,
        }
    }
}

/// The number of decimal places amounts are kept with.
pub const AMOUNT_SCALE: u32 = 2;

/// Amounts must be strictly less than this, i.e. at most 99,999,999.99.
const MAX_AMOUNT_EXCLUSIVE: i64 = 100_000_000;

/// Round `amount` half away from zero to exactly [AMOUNT_SCALE] decimal places.
pub fn round_amount(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(AMOUNT_SCALE);
    rounded
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database if it does not exist yet.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                amount TEXT NOT NULL CHECK (CAST(amount AS REAL) > 0),
                category TEXT NOT NULL CHECK (category IN ('ganho', 'gasto')),
                date TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'Pago' CHECK (status IN ('Pago', 'Pendente', 'Atrasado'))
                )",
        (),
    )?;

    // Used by the category totals and the monthly listing.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category);",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);",
        (),
    )?;

    Ok(())
}

/// Create a new transaction in the database from a builder.
///
/// A fresh ID is generated for the transaction and the transaction table is
/// created first if it is missing.
///
/// # Errors
/// This function will return a [Error::SqlError] if the insert fails.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    create_transaction_table(connection)?;

    let transaction = connection
        .prepare(
            "INSERT INTO transactions (id, amount, category, date, description, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, amount, category, date, description, status",
        )?
        .query_row(
            params![
                new_transaction_id(),
                builder.amount.to_string(),
                builder.category.as_str(),
                builder.date,
                builder.description,
                builder.status.as_str(),
            ],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Whether a transaction with `id` exists in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn transaction_exists(id: &str, connection: &Connection) -> Result<bool, Error> {
    let count: u32 = connection.query_row(
        "SELECT COUNT(*) FROM transactions WHERE id = ?1",
        (id,),
        |row| row.get(0),
    )?;

    Ok(count > 0)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: &str, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, amount, category, date, description, status FROM transactions WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Overwrite every mutable field of the transaction `id` inside a single
/// database transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if the update or commit fails.
pub fn update_transaction(
    id: &str,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let rows_affected = sql_transaction.execute(
        "UPDATE transactions
        SET \
            amount = ?1, \
            category = ?2, \
            date = ?3, \
            description = ?4, \
            status = ?5 \
        WHERE id = ?6;",
        params![
            builder.amount.to_string(),
            builder.category.as_str(),
            builder.date,
            builder.description,
            builder.status.as_str(),
            id,
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    sql_transaction.commit()?;

    Ok(builder.finalise(id.to_owned()))
}

/// Sum the amounts of every transaction whose category is `category`.
///
/// `category` is compared as plain text, so names outside of [Category]
/// simply match nothing and give zero. Amounts are stored as text and summed
/// as decimals, so the total is exact.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn sum_by_category(category: &str, connection: &Connection) -> Result<Decimal, Error> {
    let mut stmt = connection.prepare("SELECT amount FROM transactions WHERE category = ?1")?;
    let total = stmt
        .query_map((category,), |row| map_amount(row, 0))?
        .sum::<Result<Decimal, rusqlite::Error>>()?;

    Ok(round_amount(total))
}

/// Get transactions ordered by date, optionally limited to `date_range` (inclusive).
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions(
    date_range: Option<RangeInclusive<Date>>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let base_query = "SELECT id, amount, category, date, description, status FROM transactions";

    let transactions = match date_range {
        Some(range) => connection
            .prepare(&format!(
                "{base_query} WHERE date BETWEEN ?1 AND ?2 ORDER BY date ASC, id ASC"
            ))?
            .query_map((range.start(), range.end()), map_transaction_row)?
            .collect::<Result<Vec<_>, _>>()?,
        None => connection
            .prepare(&format!("{base_query} ORDER BY date ASC, id ASC"))?
            .query_map([], map_transaction_row)?
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(transactions)
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = map_amount(row, 1)?;
    let category = row.get::<usize, String>(2)?.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let date = row.get(3)?;
    let description = row.get(4)?;
    let status = row.get::<usize, String>(5)?.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Transaction {
        id,
        amount,
        category,
        date,
        description,
        status,
    })
}

fn map_amount(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    row.get::<usize, String>(index)?.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
    })
}

// ============================================================================
// TESTS
// ============================================================================
