#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod bucket;
mod error;

/// A key-value map over the open-addressing table.
///
/// This module provides a `HashMap` that owns its hasher and manages growth,
/// shrinking, and tombstone cleanup of the underlying `HashTable`.
pub mod hash_map;

/// The raw open-addressing table, its bucket storage, and its iterators.
pub mod hash_table;

pub mod probe;

#[cfg(test)]
mod proptests;

pub use bucket::Bucket;
pub use error::TryReserveError;
pub use hash_map::DefaultHashBuilder;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_table::HashTable;
