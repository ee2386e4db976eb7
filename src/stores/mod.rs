//! Contains the secondary index store trait and its implementations.

mod index;

pub mod sqlite;

pub use index::{IndexOp, IndexStore};
