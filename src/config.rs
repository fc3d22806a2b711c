//! Construction-time parameters for `StringHashMap`

use crate::TableError;

/// Number of buckets a table starts with unless told otherwise
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// Ratio of entries to buckets above which the table doubles
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Initial capacity and load factor of a [`StringHashMap`](crate::StringHashMap).
///
/// The capacity is taken as given. A zero capacity is accepted here and reported
/// by the first table operation that needs to hash a key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    /// Number of buckets allocated up front
    pub initial_capacity: usize,
    /// Resize threshold, a fraction in `(0, 1]`
    pub load_factor: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { initial_capacity: DEFAULT_INITIAL_CAPACITY, load_factor: DEFAULT_LOAD_FACTOR }
    }
}

impl TableConfig {
    /// Creates a configuration with the default capacity and load factor
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of buckets the table starts with
    #[must_use]
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets the resize threshold
    #[must_use]
    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Checks that the load factor lies in `(0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidLoadFactor`] for zero, negative, NaN or
    /// greater-than-one values.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.load_factor > 0.0 && self.load_factor <= 1.0 {
            Ok(())
        } else {
            Err(TableError::InvalidLoadFactor(self.load_factor))
        }
    }
}
