//! # Chained Hash
//!
//! A string-keyed hash table built on separate chaining.
//!
//! `StringHashMap` hashes each key with a rolling polynomial hash taken modulo
//! the bucket count, keeps colliding entries together in per-bucket lists, and
//! doubles its bucket array as soon as the ratio of entries to buckets exceeds
//! the configured load factor. Every entry is rehashed on growth, so an entry
//! always sits in the bucket its key hashes to under the current capacity.
//!
//! ## Basic Usage
//!
//! ```rust
//! use chained_hash::{StringHashMap, TableSnapshot};
//!
//! # fn main() -> Result<(), chained_hash::TableError> {
//! // Create a new table with 16 buckets and a 0.75 load factor
//! let mut map = StringHashMap::new();
//!
//! // Insert values
//! map.set("apple", "red")?;
//! map.set("banana", "yellow")?;
//!
//! // Retrieve values
//! assert_eq!(map.get("apple")?, Some(&"red"));
//! assert_eq!(map.get("pear")?, None);
//!
//! // Update values
//! assert_eq!(map.set("apple", "green")?, Some("red"));
//!
//! // Remove values
//! assert!(map.remove("banana")?);
//! assert_eq!(map.keys(), vec!["apple".to_string()]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use chained_hash::{StringHashMap, TableConfig, TableError};
//!
//! let config = TableConfig::new().with_initial_capacity(4).with_load_factor(0.5);
//! let map: StringHashMap<u32> = StringHashMap::with_config(config)?;
//! assert_eq!(map.capacity(), 4);
//!
//! let invalid = TableConfig::new().with_load_factor(1.5);
//! assert!(StringHashMap::<u32>::with_config(invalid).is_err());
//! # Ok::<(), TableError>(())
//! ```

/// Construction-time parameters
mod config;
/// Error type for table operations
mod error;
/// Logger installation for binaries and tests
pub mod logger;
/// Module implementing the chained string hash table
mod string_hash_map;
/// Utility functions and traits for the hash table
pub mod utils;

pub use config::{DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR, TableConfig};
pub use error::TableError;
pub use string_hash_map::{Iter, StringHashMap};
pub use utils::TableSnapshot;
