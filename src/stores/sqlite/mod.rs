//! Contains the SQLite backed implementation of the [IndexStore](crate::stores::IndexStore).

pub mod index;

pub use index::{Clock, SQLiteIndexStore};
