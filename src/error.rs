use thiserror::Error;

/// Errors returned by [`HashTable`](crate::HashTable) and [`Set`](crate::Set)
/// operations.
///
/// A call that returns one of these leaves the collection exactly as it was
/// before the call.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    /// No entry exists for the requested key.
    #[error("key not found")]
    KeyNotFound,
    /// The element is already a member of the set.
    #[error("element is already present in the set")]
    DuplicateElement,
    /// The table was constructed or resized with unusable parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
}

/// The reason a [`Config`](crate::Config) or resize request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// A table needs at least one bucket.
    #[error("bucket count must be at least 1")]
    ZeroBuckets,
    /// The maximum load factor must lie in `[MIN_MAX_LOAD_FACTOR, 1]`.
    ///
    /// [`MIN_MAX_LOAD_FACTOR`]: crate::MIN_MAX_LOAD_FACTOR
    #[error("max load factor {0} is outside [{min}, 1]", min = crate::config::MIN_MAX_LOAD_FACTOR)]
    LoadFactorOutOfRange(f64),
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
