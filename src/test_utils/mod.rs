#![allow(missing_docs)]

pub(crate) mod http;

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
    time::Duration,
};

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    Error,
    register::RegisterState,
    report::{DEFAULT_SUMMARY_TTL, ReportState},
    stores::{IndexOp, IndexStore, sqlite::SQLiteIndexStore},
};

pub(crate) use http::{assert_content_type, parse_json_body};

pub(crate) fn must_create_index_store() -> SQLiteIndexStore {
    SQLiteIndexStore::new(
        Connection::open_in_memory().expect("could not create in-memory SQLite database"),
    )
    .expect("could not create index store")
}

pub(crate) fn must_create_register_state() -> RegisterState {
    RegisterState::new(
        Connection::open_in_memory().expect("could not create in-memory SQLite database"),
        Arc::new(must_create_index_store()),
    )
    .expect("could not create register state")
}

pub(crate) fn must_create_report_state() -> ReportState {
    ReportState::new(
        Connection::open_in_memory().expect("could not create in-memory SQLite database"),
        Arc::new(must_create_index_store()),
        DEFAULT_SUMMARY_TTL,
    )
    .expect("could not create report state")
}

/// Create a report state whose index store reads the time, in Unix seconds,
/// from the returned counter.
pub(crate) fn must_create_report_state_with_clock() -> (ReportState, Arc<AtomicI64>) {
    let now = Arc::new(AtomicI64::new(1_750_000_000));
    let clock_now = now.clone();
    let index_store = SQLiteIndexStore::with_clock(
        Connection::open_in_memory().expect("could not create in-memory SQLite database"),
        Arc::new(move || {
            OffsetDateTime::from_unix_timestamp(clock_now.load(Ordering::SeqCst))
                .expect("test clock out of range")
        }),
    )
    .expect("could not create index store");

    let state = ReportState::new(
        Connection::open_in_memory().expect("could not create in-memory SQLite database"),
        Arc::new(index_store),
        DEFAULT_SUMMARY_TTL,
    )
    .expect("could not create report state");

    (state, now)
}

/// An index store that is unreachable: every operation fails.
#[derive(Debug)]
pub(crate) struct FailingIndexStore;

impl FailingIndexStore {
    fn fail<T>() -> Result<T, Error> {
        Err(Error::IndexStoreError("connection refused".to_owned()))
    }
}

impl IndexStore for FailingIndexStore {
    fn apply(&self, _ops: &[IndexOp]) -> Result<(), Error> {
        Self::fail()
    }

    fn hash_fields(&self, _key: &str) -> Result<BTreeMap<String, String>, Error> {
        Self::fail()
    }

    fn sorted_set_score(&self, _key: &str, _member: &str) -> Result<Option<i64>, Error> {
        Self::fail()
    }

    fn set_members(&self, _key: &str) -> Result<BTreeSet<String>, Error> {
        Self::fail()
    }

    fn get(&self, _key: &str) -> Result<Option<String>, Error> {
        Self::fail()
    }

    fn set_with_expiry(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), Error> {
        Self::fail()
    }
}
