//! Utility functions and traits for `StringHashMap`

use crate::{StringHashMap, TableError};

/// Extension trait producing owned snapshots of a table's contents.
///
/// Every call walks the buckets in index order and the entries of each bucket
/// in the order they were stored. The returned vectors are independent of the
/// table and do not reflect later mutations.
pub trait TableSnapshot<V> {
    /// Returns the keys of the table as a Vec
    fn keys(&self) -> Vec<String>;

    /// Returns the values of the table as a Vec
    fn values(&self) -> Vec<V>;

    /// Returns the key-value pairs of the table as a Vec
    fn entries(&self) -> Vec<(String, V)>;
}

impl<V: Clone> TableSnapshot<V> for StringHashMap<V> {
    fn keys(&self) -> Vec<String> {
        self.iter().map(|(k, _)| k.to_owned()).collect()
    }

    fn values(&self) -> Vec<V> {
        self.iter().map(|(_, v)| v.clone()).collect()
    }

    fn entries(&self) -> Vec<(String, V)> {
        self.iter().map(|(k, v)| (k.to_owned(), v.clone())).collect()
    }
}

/// Creates a `StringHashMap` with `capacity` buckets from an iterator of key-value pairs.
///
/// Unlike [`FromIterator`], a failure to place any pair is returned to the caller.
///
/// # Errors
///
/// Returns [`TableError`] from the first pair that could not be inserted.
pub fn from_iter<K, V, I>(capacity: usize, iter: I) -> Result<StringHashMap<V>, TableError>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    let mut map = StringHashMap::with_capacity(capacity);

    for (key, value) in iter {
        map.set(key, value)?;
    }

    Ok(map)
}
