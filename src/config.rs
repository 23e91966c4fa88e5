use crate::error::ConfigError;
use crate::error::Result;

/// Bucket count used when no configuration is supplied.
pub const DEFAULT_INITIAL_BUCKETS: usize = 8;

/// Load factor threshold used when no configuration is supplied.
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;

/// Smallest accepted maximum load factor: at most 1024 buckets per entry.
pub const MIN_MAX_LOAD_FACTOR: f64 = 1.0 / 1024.0;

/// Construction parameters for a [`HashTable`](crate::HashTable).
///
/// # Examples
///
/// ```rust
/// use chained_hash::Config;
///
/// let config = Config::default()
///     .with_initial_buckets(4)
///     .with_max_load_factor(0.5);
/// assert!(config.validate().is_ok());
///
/// assert!(Config::default().with_initial_buckets(0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Number of buckets allocated up front. Must be at least 1.
    pub initial_buckets: usize,
    /// Ratio of entries to buckets above which the table doubles. Must lie in
    /// `[MIN_MAX_LOAD_FACTOR, 1]`.
    pub max_load_factor: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_buckets: DEFAULT_INITIAL_BUCKETS,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }
}

impl Config {
    /// Sets the initial bucket count.
    pub fn with_initial_buckets(mut self, initial_buckets: usize) -> Self {
        self.initial_buckets = initial_buckets;
        self
    }

    /// Sets the maximum load factor.
    pub fn with_max_load_factor(mut self, max_load_factor: f64) -> Self {
        self.max_load_factor = max_load_factor;
        self
    }

    /// Checks both parameters, returning
    /// [`Error::InvalidConfiguration`](crate::Error::InvalidConfiguration) for
    /// the first one that is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.initial_buckets == 0 {
            return Err(ConfigError::ZeroBuckets.into());
        }
        // NaN fails both comparisons and is rejected here too.
        if !(self.max_load_factor >= MIN_MAX_LOAD_FACTOR && self.max_load_factor <= 1.0) {
            return Err(ConfigError::LoadFactorOutOfRange(self.max_load_factor).into());
        }
        Ok(())
    }
}
