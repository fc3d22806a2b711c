//! Error type shared by every fallible table operation

use thiserror::Error;

/// Failures surfaced by [`StringHashMap`](crate::StringHashMap) and [`TableConfig`](crate::TableConfig).
///
/// A missing key is never an error; lookups report it through `Option` or `bool`.
/// Everything here means the table was misconfigured or an internal invariant broke.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    /// The table has no buckets to hash into
    #[error("cannot hash into a table with zero buckets")]
    ZeroCapacity,
    /// A computed bucket index fell outside the bucket array
    #[error("bucket index {index} is out of bounds for capacity {capacity}")]
    IndexOutOfBounds {
        /// The offending index
        index: usize,
        /// Number of buckets at the time of the lookup
        capacity: usize,
    },
    /// Doubling the bucket array would overflow `usize`
    #[error("cannot grow a table of {capacity} buckets any further")]
    CapacityOverflow {
        /// Capacity before the attempted resize
        capacity: usize,
    },
    /// The load factor is not a fraction in `(0, 1]`
    #[error("load factor {0} must be within (0, 1]")]
    InvalidLoadFactor(f64),
}
