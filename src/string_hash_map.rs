use std::{fmt, mem};

use log::{debug, error, trace};

use crate::{
    TableConfig, TableError,
    config::{DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR},
};

/// Multiplier of the rolling string hash
const HASH_MULTIPLIER: u128 = 31;

/// A key-value pair stored in a bucket
#[derive(Debug, Clone)]
struct Entry<V> {
    /// The key in the key-value pair
    key: String,
    /// The value associated with the key
    value: V,
}

/// Entries whose keys hash to the same index, kept in insertion order
type Bucket<V> = Vec<Entry<V>>;

/// A string-keyed hash table using separate chaining.
///
/// Every bucket holds the entries whose keys hash to its index. Once the ratio
/// of entries to buckets exceeds the configured load factor, the bucket array
/// doubles and every entry is rehashed before the inserting call returns.
///
/// Operations that hash a key return `Result`: a table built with zero buckets
/// cannot place anything, and reports that as [`TableError`] rather than
/// panicking. A missing key is reported through `Option` or `bool`.
///
/// Note: This implementation is not thread-safe. Wrap it in a lock to share it.
#[derive(Clone)]
pub struct StringHashMap<V> {
    /// The buckets storing the key-value pairs; its length is the capacity
    buckets: Vec<Bucket<V>>,
    /// Current number of entries across all buckets
    size: usize,
    /// Ratio of entries to buckets above which the table doubles
    load_factor: f64,
}

impl<V> Default for StringHashMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for StringHashMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> Extend<(String, V)> for StringHashMap<V> {
    fn extend<T: IntoIterator<Item = (String, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            if let Err(err) = self.set(key, value) {
                error!("dropping entry while extending table: {err}");
            }
        }
    }
}

impl<V> FromIterator<(String, V)> for StringHashMap<V> {
    fn from_iter<T: IntoIterator<Item = (String, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<V> StringHashMap<V> {
    /// Creates an empty table with 16 buckets and a load factor of 0.75
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_CAPACITY)
    }

    /// Creates an empty table with `capacity` buckets and the default load factor.
    ///
    /// The capacity is used as given. A zero capacity is accepted, but every
    /// operation that hashes a key will then fail with [`TableError::ZeroCapacity`].
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buckets: Self::empty_buckets(capacity), size: 0, load_factor: DEFAULT_LOAD_FACTOR }
    }

    /// Creates an empty table from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidLoadFactor`] if the load factor is outside `(0, 1]`.
    pub fn with_config(config: TableConfig) -> Result<Self, TableError> {
        config.validate()?;
        Ok(Self {
            buckets: Self::empty_buckets(config.initial_capacity),
            size: 0,
            load_factor: config.load_factor,
        })
    }

    /// Allocates `capacity` empty buckets
    fn empty_buckets(capacity: usize) -> Vec<Bucket<V>> {
        let mut buckets = Vec::with_capacity(capacity);
        buckets.resize_with(capacity, Vec::new);
        buckets
    }

    /// Computes the bucket index of `key` for the current capacity.
    ///
    /// Each UTF-16 code unit folds into the accumulator as
    /// `(acc * 31 + unit) % capacity`, so the same key lands elsewhere once the
    /// table has grown. Characters outside the Basic Multilingual Plane
    /// contribute both halves of their surrogate pair.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::ZeroCapacity`] when the table has no buckets.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn hash(&self, key: &str) -> Result<usize, TableError> {
        let capacity = self.capacity();
        if capacity == 0 {
            return Err(TableError::ZeroCapacity);
        }

        // acc < capacity <= usize::MAX, so acc * 31 + code always fits in u128
        let modulus = capacity as u128;
        let hash = key
            .encode_utf16()
            .fold(0_u128, |acc, unit| (acc * HASH_MULTIPLIER + u128::from(unit)) % modulus);

        Ok(usize::try_from(hash).unwrap_or(usize::MAX))
    }

    /// Returns the bucket `key` belongs to
    fn bucket(&self, key: &str) -> Result<&Bucket<V>, TableError> {
        let index = self.hash(key)?;
        let capacity = self.capacity();
        self.buckets.get(index).ok_or(TableError::IndexOutOfBounds { index, capacity })
    }

    /// Returns the bucket `key` belongs to, mutably
    fn bucket_mut(&mut self, key: &str) -> Result<&mut Bucket<V>, TableError> {
        let index = self.hash(key)?;
        let capacity = self.capacity();
        self.buckets.get_mut(index).ok_or(TableError::IndexOutOfBounds { index, capacity })
    }

    /// Inserts a key-value pair, replacing the value of an existing key.
    ///
    /// Returns the previous value if the key was already present. Adding a new
    /// key may double the bucket array before this call returns.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the key cannot be placed, which only happens on
    /// a table with zero buckets or one that cannot grow any further.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> Result<Option<V>, TableError> {
        self.insert_entry(Entry { key: key.into(), value })
    }

    /// Places `entry` in its bucket and grows the table if it is now over the load factor
    fn insert_entry(&mut self, entry: Entry<V>) -> Result<Option<V>, TableError> {
        let bucket = self.bucket_mut(&entry.key)?;

        if let Some(slot) = bucket.iter_mut().find(|stored| stored.key == entry.key) {
            let previous = mem::replace(slot, entry);
            return Ok(Some(previous.value));
        }

        bucket.push(entry);
        self.size = self.size.saturating_add(1);

        if self.current_load() > self.load_factor {
            self.resize()?;
        }

        Ok(None)
    }

    /// Returns the capacity a resize from `capacity` settles on once `size` entries
    /// are back in place: the first doubling that brings the load within `load_factor`.
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    fn growth_target(capacity: usize, size: usize, load_factor: f64) -> Result<usize, TableError> {
        let mut target = capacity;
        loop {
            target = target.checked_mul(2).ok_or(TableError::CapacityOverflow { capacity: target })?;
            if size as f64 / target as f64 <= load_factor {
                return Ok(target);
            }
        }
    }

    /// Doubles the bucket array and rehashes every entry into it.
    ///
    /// Reinsertion may double again before it finishes. Every capacity it passes
    /// through is at most the `growth_target`, which is checked before any entry
    /// moves, so an overflow leaves the table untouched.
    fn resize(&mut self) -> Result<(), TableError> {
        let old_capacity = self.capacity();
        Self::growth_target(old_capacity, self.size, self.load_factor)?;
        let new_capacity = old_capacity
            .checked_mul(2)
            .ok_or(TableError::CapacityOverflow { capacity: old_capacity })?;

        debug!(
            "resizing table from {old_capacity} to {new_capacity} buckets with {} entries",
            self.size
        );

        let old_buckets = mem::replace(&mut self.buckets, Self::empty_buckets(new_capacity));
        self.size = 0;

        // Reinsertion may trigger a further resize; the old buckets are owned here either way
        for entry in old_buckets.into_iter().flatten() {
            self.insert_entry(entry)?;
        }

        Ok(())
    }

    /// Retrieves the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the key cannot be hashed into the table.
    pub fn get(&self, key: &str) -> Result<Option<&V>, TableError> {
        Ok(self.bucket(key)?.iter().find(|entry| entry.key == key).map(|entry| &entry.value))
    }

    /// Returns true if `key` is present.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the key cannot be hashed into the table.
    pub fn has(&self, key: &str) -> Result<bool, TableError> {
        Ok(self.bucket(key)?.iter().any(|entry| entry.key == key))
    }

    /// Removes `key` and returns its value.
    ///
    /// Entries sharing the bucket keep their relative order. The table never
    /// shrinks.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the key cannot be hashed into the table.
    pub fn take(&mut self, key: &str) -> Result<Option<V>, TableError> {
        let bucket = self.bucket_mut(key)?;
        let Some(position) = bucket.iter().position(|entry| entry.key == key) else {
            return Ok(None);
        };

        let entry = bucket.remove(position);
        self.size = self.size.saturating_sub(1);
        Ok(Some(entry.value))
    }

    /// Removes `key`, returning whether it was present.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the key cannot be hashed into the table.
    pub fn remove(&mut self, key: &str) -> Result<bool, TableError> {
        Ok(self.take(key)?.is_some())
    }

    /// Returns the number of entries in the table
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the table holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Removes every entry, keeping the current number of buckets
    pub fn clear(&mut self) {
        trace!("clearing {} entries from {} buckets", self.size, self.capacity());
        self.buckets = Self::empty_buckets(self.capacity());
        self.size = 0;
    }

    /// Returns the number of buckets
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the configured resize threshold
    #[must_use]
    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Returns the current ratio of entries to buckets, or 0 for a table without buckets
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn current_load(&self) -> f64 {
        if self.buckets.is_empty() {
            0.0
        } else {
            self.size as f64 / self.buckets.len() as f64
        }
    }

    /// Returns the number of entries in each bucket, in bucket order
    pub fn chain_lengths(&self) -> impl Iterator<Item = usize> {
        self.buckets.iter().map(Vec::len)
    }

    /// Returns an iterator over the key-value pairs.
    ///
    /// Buckets are visited in index order and entries within a bucket in the
    /// order they were added, so the order is unrelated to insertion order once
    /// the table has resized.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, V> {
        Iter { buckets: &self.buckets, bucket: 0, position: 0 }
    }
}

impl<'a, V> IntoIterator for &'a StringHashMap<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the key-value pairs of a [`StringHashMap`]
#[derive(Debug)]
pub struct Iter<'a, V> {
    /// Buckets of the table being walked
    buckets: &'a [Bucket<V>],
    /// Index of the bucket currently being walked
    bucket: usize,
    /// Position of the next entry within that bucket
    position: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(bucket) = self.buckets.get(self.bucket) {
            if let Some(entry) = bucket.get(self.position) {
                self.position = self.position.saturating_add(1);
                return Some((entry.key.as_str(), &entry.value));
            }
            self.bucket = self.bucket.saturating_add(1);
            self.position = 0;
        }
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    /// Eight buckets that never resize below full occupancy
    fn dense_table() -> StringHashMap<i32> {
        StringHashMap::with_config(TableConfig::new().with_initial_capacity(8).with_load_factor(1.0))
            .unwrap()
    }

    #[test]
    fn test_hash_is_rolling_modulo() {
        let map: StringHashMap<()> = StringHashMap::new();
        assert_eq!(map.hash("").unwrap(), 0);
        assert_eq!(map.hash("a").unwrap(), 97 % 16);
        assert_eq!(map.hash("ab").unwrap(), ((97 % 16) * 31 + 98) % 16);
        assert_eq!(map.hash("apple").unwrap(), 10);
        assert_eq!(map.hash("lemon").unwrap(), 3);
    }

    #[test]
    fn test_hash_depends_on_capacity() {
        let small: StringHashMap<()> = StringHashMap::with_capacity(8);
        let large: StringHashMap<()> = StringHashMap::with_capacity(32);
        assert_eq!(small.hash("key5").unwrap(), 6);
        assert_eq!(large.hash("key5").unwrap(), 22);
    }

    #[test]
    fn test_hash_folds_utf16_code_units() {
        let map: StringHashMap<()> = StringHashMap::new();
        // 🔑 is the surrogate pair 0xD83D 0xDD11
        assert_eq!(map.hash("🔑").unwrap(), ((0xD83D % 16) * 31 + 0xDD11) % 16);
        assert_eq!(map.hash("🔑").unwrap(), 4);
        assert_eq!(map.hash("a🔑b").unwrap(), 13);
        assert_eq!(map.hash("é").unwrap(), 9);
        assert_eq!(map.hash("ключ").unwrap(), 10);

        let small: StringHashMap<()> = StringHashMap::with_capacity(7);
        assert_eq!(small.hash("a🔑b").unwrap(), 4);
    }

    #[test]
    fn test_astral_keys_round_trip() {
        let mut map = StringHashMap::new();
        map.set("🔑", 1).unwrap();
        map.set("a🔑b", 2).unwrap();

        assert_eq!(map.get("🔑").unwrap(), Some(&1));
        assert_eq!(map.get("a🔑b").unwrap(), Some(&2));
        assert_eq!(map.chain_lengths().nth(4), Some(1));
        assert_eq!(map.chain_lengths().nth(13), Some(1));
    }

    #[test]
    fn test_growth_target() {
        assert_eq!(StringHashMap::<()>::growth_target(16, 13, 0.75), Ok(32));
        // One entry in one bucket needs two doublings to get under a quarter
        assert_eq!(StringHashMap::<()>::growth_target(1, 1, 0.25), Ok(4));
        assert_eq!(
            StringHashMap::<()>::growth_target(usize::MAX / 2 + 1, 1, 0.75),
            Err(TableError::CapacityOverflow { capacity: usize::MAX / 2 + 1 })
        );
    }

    #[test]
    fn test_nested_resize_lands_on_growth_target() {
        let mut map = StringHashMap::with_config(
            TableConfig::new().with_initial_capacity(1).with_load_factor(0.25),
        )
        .unwrap();

        map.set("key1", 1).unwrap();

        assert_eq!(map.capacity(), 4);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("key1").unwrap(), Some(&1));
    }

    #[test]
    fn test_insert_and_get() {
        let mut map = StringHashMap::new();
        assert_eq!(map.set("key1", 1).unwrap(), None);
        assert_eq!(map.set("key2", 2).unwrap(), None);
        assert_eq!(map.set("key3", 3).unwrap(), None);

        assert_eq!(map.get("key1").unwrap(), Some(&1));
        assert_eq!(map.get("key2").unwrap(), Some(&2));
        assert_eq!(map.get("key3").unwrap(), Some(&3));
        assert_eq!(map.get("key4").unwrap(), None);
    }

    #[test]
    fn test_update() {
        let mut map = StringHashMap::new();
        assert_eq!(map.set("key1", 1).unwrap(), None);
        assert_eq!(map.set("key1", 10).unwrap(), Some(1));
        assert_eq!(map.get("key1").unwrap(), Some(&10));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_update_keeps_bucket_position() {
        let mut map = dense_table();
        map.set("b", 1).unwrap();
        map.set("apple", 2).unwrap();
        map.set("b", 3).unwrap();

        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, vec![("b", &3), ("apple", &2)]);
    }

    #[test]
    fn test_has() {
        let mut map = StringHashMap::new();
        map.set("key1", ()).unwrap();

        assert!(map.has("key1").unwrap());
        assert!(!map.has("key2").unwrap());
    }

    #[test]
    fn test_stored_unit_is_not_absent() {
        let mut map: StringHashMap<Option<i32>> = StringHashMap::new();
        map.set("nothing", None).unwrap();

        assert_eq!(map.get("nothing").unwrap(), Some(&None));
        assert_eq!(map.get("missing").unwrap(), None);
    }

    #[test]
    fn test_remove() {
        let mut map = StringHashMap::new();
        map.set("key1", 1).unwrap();
        map.set("key2", 2).unwrap();

        assert!(map.remove("key1").unwrap());
        assert_eq!(map.get("key1").unwrap(), None);
        assert_eq!(map.get("key2").unwrap(), Some(&2));
        assert!(!map.remove("key1").unwrap());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_take_returns_value() {
        let mut map = StringHashMap::new();
        map.set("key1", "one".to_string()).unwrap();

        assert_eq!(map.take("key1").unwrap(), Some("one".to_string()));
        assert_eq!(map.take("key1").unwrap(), None);
        assert!(map.is_empty());
    }

    #[test]
    fn test_remove_preserves_chain_order() {
        let mut map = dense_table();
        // All four keys land in bucket 2 of an eight bucket table
        for (value, key) in ["b", "j", "apple", "key1"].into_iter().enumerate() {
            map.set(key, i32::try_from(value).unwrap()).unwrap();
        }
        assert_eq!(map.chain_lengths().nth(2), Some(4));

        assert!(map.remove("j").unwrap());

        let keys: Vec<_> = map.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["b", "apple", "key1"]);
        assert_eq!(map.capacity(), 8);
    }

    #[test]
    fn test_resize() {
        let mut map = StringHashMap::with_config(
            TableConfig::new().with_initial_capacity(4).with_load_factor(0.5),
        )
        .unwrap();

        // 2 of 4 buckets sits exactly on the threshold, the third entry crosses it
        map.set("key1", 1).unwrap();
        map.set("key2", 2).unwrap();
        assert_eq!(map.capacity(), 4);
        map.set("key3", 3).unwrap();

        assert_eq!(map.get("key1").unwrap(), Some(&1));
        assert_eq!(map.get("key2").unwrap(), Some(&2));
        assert_eq!(map.get("key3").unwrap(), Some(&3));
        assert_eq!(map.capacity(), 8);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_resize_on_thirteenth_entry() {
        let mut map = StringHashMap::new();
        for i in 0..12 {
            map.set(format!("key{i}"), i).unwrap();
        }
        assert_eq!(map.capacity(), 16);

        map.set("key12", 12).unwrap();
        assert_eq!(map.capacity(), 32);
        assert!(map.current_load() <= map.load_factor());
    }

    #[test]
    fn test_resize_rehashes_every_entry() {
        let mut map = StringHashMap::with_capacity(2);
        for i in 0..100 {
            map.set(format!("key{i}"), i).unwrap();
        }

        assert_eq!(map.len(), 100);
        assert_eq!(map.chain_lengths().sum::<usize>(), 100);
        for (key, _) in &map {
            let home = map.hash(key).unwrap();
            assert!(map.buckets[home].iter().any(|entry| entry.key == key));
        }
    }

    #[test]
    fn test_len_and_is_empty() {
        let mut map = StringHashMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);

        map.set("key1", 1).unwrap();
        assert!(!map.is_empty());
        assert_eq!(map.len(), 1);

        map.set("key2", 2).unwrap();
        assert_eq!(map.len(), 2);

        map.remove("key1").unwrap();
        assert_eq!(map.len(), 1);

        map.remove("key2").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_iter() {
        let mut map = StringHashMap::new();
        map.set("key1", 1).unwrap();
        map.set("key2", 2).unwrap();
        map.set("key3", 3).unwrap();

        let mut count = 0;
        let mut sum = 0;
        for (_, &value) in map.iter() {
            count += 1;
            sum += value;
        }

        assert_eq!(count, 3);
        assert_eq!(sum, 6);
    }

    #[test]
    fn test_iter_follows_bucket_order() {
        let mut map = StringHashMap::new();
        map.set("apple", "red").unwrap();
        map.set("grape", "purple").unwrap();
        map.set("lemon", "yellow").unwrap();

        let keys: Vec<_> = map.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["lemon", "apple", "grape"]);
    }

    #[test]
    fn test_clear_keeps_grown_capacity() {
        let mut map = StringHashMap::with_capacity(4);
        for i in 0..10 {
            map.set(format!("key{i}"), i).unwrap();
        }
        let grown = map.capacity();
        assert!(grown > 4);

        map.clear();

        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
        assert_eq!(map.capacity(), grown);
        assert_eq!(map.get("key1").unwrap(), None);
        assert_eq!(map.iter().count(), 0);
    }

    #[test]
    fn test_zero_capacity_fails_loudly() {
        let mut map = StringHashMap::with_capacity(0);

        assert_eq!(map.set("key1", 1), Err(TableError::ZeroCapacity));
        assert_eq!(map.get("key1"), Err(TableError::ZeroCapacity));
        assert_eq!(map.has("key1"), Err(TableError::ZeroCapacity));
        assert_eq!(map.remove("key1"), Err(TableError::ZeroCapacity));
        assert!(map.is_empty());
        assert!((map.current_load() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_with_config_rejects_bad_load_factor() {
        let result: Result<StringHashMap<i32>, _> =
            StringHashMap::with_config(TableConfig::new().with_load_factor(2.0));
        assert_eq!(result.err(), Some(TableError::InvalidLoadFactor(2.0)));
    }

    #[test]
    fn test_with_high_load_factor() {
        let mut map = StringHashMap::with_config(
            TableConfig::new().with_initial_capacity(16).with_load_factor(0.9),
        )
        .unwrap();

        for i in 0..14 {
            map.set(i.to_string(), i).unwrap();
        }

        for i in 0..14 {
            assert_eq!(map.get(&i.to_string()).unwrap(), Some(&i));
        }

        // Check that the load is correctly reported
        assert_eq!(map.capacity(), 16);
        assert!((map.current_load() - 14.0 / 16.0).abs() < 0.01);
    }

    #[test]
    fn test_from_iterator_and_extend() {
        let mut map: StringHashMap<i32> =
            [("a".to_string(), 1), ("b".to_string(), 2)].into_iter().collect();
        map.extend([("b".to_string(), 20), ("c".to_string(), 3)]);

        assert_eq!(map.len(), 3);
        assert_eq!(map.get("b").unwrap(), Some(&20));
    }

    #[test]
    fn test_extend_on_zero_capacity_drops_entries() {
        let mut map = StringHashMap::with_capacity(0);
        map.extend([("a".to_string(), 1)]);
        assert!(map.is_empty());
    }

    #[test]
    fn test_debug_renders_as_map() {
        let mut map = StringHashMap::new();
        map.set("apple", 1).unwrap();
        assert_eq!(format!("{map:?}"), r#"{"apple": 1}"#);
    }
}
