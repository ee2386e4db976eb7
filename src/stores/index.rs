//! Defines the secondary index store trait.
//!
//! The secondary index store is a small key-value store used both as a cache
//! and as a denormalized index over transactions. It understands four kinds
//! of values: hashes (field to value maps), sorted sets (member to integer
//! score), plain sets, and plain string values with an optional expiry.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Debug,
    time::Duration,
};

use crate::Error;

/// A single write against the index store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOp {
    /// Set `fields` on the hash at `key`, keeping any other fields already there.
    HashSet {
        /// The key of the hash.
        key: String,
        /// The field names and values to set.
        fields: Vec<(String, String)>,
    },
    /// Add `member` to the sorted set at `key`, replacing its score if it is
    /// already a member.
    SortedSetAdd {
        /// The key of the sorted set.
        key: String,
        /// The member to add.
        member: String,
        /// The score to order the member by.
        score: i64,
    },
    /// Add `member` to the set at `key`.
    SetAdd {
        /// The key of the set.
        key: String,
        /// The member to add.
        member: String,
    },
    /// Remove `member` from the set at `key`. Removing a missing member is a no-op.
    SetRemove {
        /// The key of the set.
        key: String,
        /// The member to remove.
        member: String,
    },
}

/// Handles reads and writes against the secondary index store.
pub trait IndexStore: Debug + Send + Sync {
    /// Apply `ops` in order as a single batch.
    ///
    /// Implementers must apply either all of the operations or none of them.
    fn apply(&self, ops: &[IndexOp]) -> Result<(), Error>;

    /// Get every field of the hash at `key`. A missing hash is empty.
    fn hash_fields(&self, key: &str) -> Result<BTreeMap<String, String>, Error>;

    /// Get the score of `member` in the sorted set at `key`.
    fn sorted_set_score(&self, key: &str, member: &str) -> Result<Option<i64>, Error>;

    /// Get the members of the set at `key`. A missing set is empty.
    fn set_members(&self, key: &str) -> Result<BTreeSet<String>, Error>;

    /// Get the string value at `key`, or `None` if it is missing or has expired.
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Set the string value at `key` so that it expires after `ttl`.
    fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<(), Error>;
}
