#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// The singly linked list used as bucket storage.
///
/// Exposed for callers that want to build their own chained structures on the
/// same primitive.
pub mod bucket_list;

mod config;
mod error;

pub mod hash_table;

/// A hash set built on the chained `HashTable`.
///
/// This module provides a `Set` that stores its elements as table keys with
/// unit values and adds set algebra on top.
pub mod hash_set;

pub use config::Config;
pub use config::DEFAULT_INITIAL_BUCKETS;
pub use config::DEFAULT_MAX_LOAD_FACTOR;
pub use config::MIN_MAX_LOAD_FACTOR;
pub use error::ConfigError;
pub use error::Error;
pub use error::Result;
pub use hash_set::Set;
pub use hash_table::HashTable;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when none is specified.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when none is specified.
        pub type DefaultHashBuilder = std::collections::hash_map::RandomState;
    } else {
        /// Placeholder default hasher when neither `foldhash` nor `std` is
        /// enabled. It cannot be constructed; pass a hasher builder
        /// explicitly.
        #[derive(Clone, Copy, Debug)]
        pub enum DefaultHashBuilder {}
    }
}
