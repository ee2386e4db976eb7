//! Listing transactions, optionally limited to one calendar month.

use std::ops::RangeInclusive;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{
    Error,
    db::lock_connection,
    report::ReportState,
    transaction::{Transaction, get_transactions},
};

/// The earliest year that can be used to filter transactions.
pub const MIN_YEAR: i32 = 2000;

/// The query string for listing transactions.
///
/// Both `mes` and `ano` must be given for the listing to be filtered. Each is
/// validated whenever it is present, even if the other one is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    /// The month, from 1 to 12.
    pub mes: Option<u32>,
    /// The year, 2000 or later.
    pub ano: Option<i32>,
}

impl ListQuery {
    /// The inclusive range of dates to list, or `None` to list everything.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] or [Error::InvalidYear] for values out of range.
    pub fn date_range(&self) -> Result<Option<RangeInclusive<Date>>, Error> {
        let month = self
            .mes
            .map(|mes| {
                u8::try_from(mes)
                    .ok()
                    .and_then(|mes| Month::try_from(mes).ok())
                    .ok_or(Error::InvalidMonth(mes))
            })
            .transpose()?;

        if let Some(year) = self.ano.filter(|year| *year < MIN_YEAR) {
            return Err(Error::InvalidYear(year));
        }

        let (Some(month), Some(year)) = (month, self.ano) else {
            return Ok(None);
        };

        let first_day =
            Date::from_calendar_date(year, month, 1).map_err(|_| Error::InvalidYear(year))?;
        let first_day_of_next_month = match month {
            Month::December => Date::from_calendar_date(year + 1, Month::January, 1),
            month => Date::from_calendar_date(year, month.next(), 1),
        }
        .map_err(|_| Error::InvalidYear(year))?;
        let last_day = first_day_of_next_month
            .previous_day()
            .ok_or(Error::InvalidYear(year))?;

        Ok(Some(first_day..=last_day))
    }
}

/// A route handler for listing transactions.
///
/// The query is validated before the database is touched.
pub async fn get_transactions_endpoint(
    State(state): State<ReportState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let date_range = query.date_range()?;

    let connection = lock_connection(&state.db_connection)?;
    let transactions = get_transactions(date_range, &connection)?;

    Ok(Json(transactions))
}
