//! A separate-chaining hash table with load-factor driven resizing.
//!
//! Every key lives in the bucket at `hash(key) % bucket_count`, where each
//! bucket is a [`BucketList`]. After an insertion the table doubles its bucket
//! count until `len / bucket_count <= max_load_factor` holds again, rehashing
//! every entry into a freshly allocated bucket array.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use log::debug;
use log::trace;

use crate::DefaultHashBuilder;
use crate::bucket_list;
use crate::bucket_list::BucketList;
use crate::config::Config;
use crate::error::ConfigError;
use crate::error::Error;
use crate::error::Result;

#[inline(always)]
fn ratio(len: usize, bucket_count: usize) -> f64 {
    if len == 0 {
        0.0
    } else {
        len as f64 / bucket_count as f64
    }
}

#[inline(always)]
fn index_for(hash: u64, bucket_count: usize) -> usize {
    (hash % bucket_count as u64) as usize
}

/// Smallest `bucket_count * 2^n` that keeps `len` entries within the bound.
fn grown_bucket_count(len: usize, mut bucket_count: usize, max_load_factor: f64) -> usize {
    while ratio(len, bucket_count) > max_load_factor {
        bucket_count = bucket_count
            .checked_mul(2)
            .expect("bucket count overflow");
    }
    bucket_count
}

fn empty_buckets<K, V>(bucket_count: usize) -> Vec<BucketList<K, V>> {
    (0..bucket_count).map(|_| BucketList::new()).collect()
}

/// Bucket chain statistics for a [`HashTable`].
#[cfg(feature = "stats")]
#[derive(Debug, Clone, PartialEq)]
pub struct TableStats {
    /// Number of entries in the table
    pub len: usize,
    /// Number of buckets allocated
    pub bucket_count: usize,
    /// Number of buckets holding no entries
    pub empty_buckets: usize,
    /// Length of the longest bucket chain
    pub longest_chain: usize,
    /// Load factor (len / bucket_count)
    pub load_factor: f64,
}

#[cfg(feature = "stats")]
impl TableStats {
    /// Pretty-print the statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Chain Statistics ===");
        println!(
            "Population: {} entries in {} buckets ({:.2}% load factor)",
            self.len,
            self.bucket_count,
            self.load_factor * 100.0
        );
        println!(
            "Empty buckets: {}/{} ({:.2}%)",
            self.empty_buckets,
            self.bucket_count,
            (self.empty_buckets as f64 / self.bucket_count as f64) * 100.0
        );
        println!("Longest chain: {}", self.longest_chain);
    }
}

/// A hash table mapping keys of type `K` to values of type `V`, resolving
/// collisions by chaining.
///
/// Keys are hashed with the [`BuildHasher`] `S`. The table keeps
/// `len / bucket_count <= max_load_factor` after every [`set`] by doubling
/// the bucket array and rehashing all entries.
///
/// [`set`]: HashTable::set
///
/// # Examples
///
/// ```rust
/// use chained_hash::HashTable;
///
/// let mut table: HashTable<&str, i32> = HashTable::with_buckets(4).unwrap();
/// table.set("I", 1);
/// table.set("V", 5);
/// assert_eq!(table.load_factor(), 0.5);
///
/// table.set("X", 10);
/// table.set("L", 50);
/// assert_eq!(table.bucket_count(), 8);
/// assert_eq!(table.get(&"L"), Ok(&50));
///
/// assert_eq!(table.delete(&"I"), Ok(1));
/// assert!(!table.contains(&"I"));
/// ```
#[derive(Clone)]
pub struct HashTable<K, V, S = DefaultHashBuilder> {
    buckets: Vec<BucketList<K, V>>,
    len: usize,
    max_load_factor: f64,
    hash_builder: S,
}

impl<K, V, S> Debug for HashTable<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> HashTable<K, V, S> {
    pub(crate) fn from_validated(config: Config, hash_builder: S) -> Self {
        debug_assert!(config.validate().is_ok());
        Self {
            buckets: empty_buckets(config.initial_buckets),
            len: 0,
            max_load_factor: config.max_load_factor,
            hash_builder,
        }
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of buckets currently allocated.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `len / bucket_count`, or `0.0` for an empty table.
    pub fn load_factor(&self) -> f64 {
        ratio(self.len, self.buckets.len())
    }

    /// Returns the load factor above which the table grows.
    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// Returns a reference to the table's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns an iterator over all `(key, value)` pairs.
    ///
    /// Buckets are visited in index order and each bucket front to back. The
    /// order depends on the bucket count and hash values and is not stable
    /// across resizes.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            current: None,
            remaining: self.len,
        }
    }

    /// Alias for [`iter`](Self::iter).
    pub fn items(&self) -> Iter<'_, K, V> {
        self.iter()
    }

    /// Returns an iterator over all keys, in [`iter`](Self::iter) order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over all values, in [`iter`](Self::iter) order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Removes every entry, keeping the current bucket count.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Counts buckets by chain length: `hist[n]` is the number of buckets
    /// holding exactly `n` entries.
    #[cfg(feature = "stats")]
    pub fn chain_length_histogram(&self) -> Vec<usize> {
        let longest = self.buckets.iter().map(BucketList::len).max().unwrap_or(0);
        let mut hist = alloc::vec![0usize; longest + 1];
        for bucket in &self.buckets {
            hist[bucket.len()] += 1;
        }
        hist
    }

    /// Returns a snapshot of bucket chain statistics.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> TableStats {
        TableStats {
            len: self.len,
            bucket_count: self.buckets.len(),
            empty_buckets: self.buckets.iter().filter(|b| b.is_empty()).count(),
            longest_chain: self.buckets.iter().map(BucketList::len).max().unwrap_or(0),
            load_factor: self.load_factor(),
        }
    }

    /// Pretty-prints the chain-length histogram horizontally using stdout.
    #[cfg(all(feature = "stats", feature = "std"))]
    pub fn print_chain_length_histogram(&self) {
        let hist = self.chain_length_histogram();
        let max = hist.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("chain length histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!(
            "chain length histogram ({} entries, {} buckets):",
            self.len,
            self.buckets.len()
        );
        for (length, &count) in hist.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", length, "█".repeat(width), count);
        }
    }
}

impl<K, V, S> HashTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty table with the default configuration (8 buckets, max
    /// load factor 0.75) and the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::from_validated(Config::default(), hash_builder)
    }

    /// Creates an empty table from `config` and the given hasher builder.
    ///
    /// Returns [`Error::InvalidConfiguration`] if the bucket count is zero or
    /// the load factor lies outside `[MIN_MAX_LOAD_FACTOR, 1]`.
    ///
    /// [`MIN_MAX_LOAD_FACTOR`]: crate::MIN_MAX_LOAD_FACTOR
    pub fn with_config_and_hasher(config: Config, hash_builder: S) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config, hash_builder))
    }

    /// Returns the index of the bucket `key` belongs in under the current
    /// bucket count.
    pub fn bucket_index(&self, key: &K) -> usize {
        index_for(self.hash_builder.hash_one(key), self.buckets.len())
    }

    /// Returns `true` if the table holds an entry for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chained_hash::HashTable;
    ///
    /// let mut table: HashTable<u32, &str> = HashTable::new();
    /// table.set(1, "one");
    /// assert!(table.contains(&1));
    /// assert!(!table.contains(&2));
    /// ```
    pub fn contains(&self, key: &K) -> bool {
        let index = self.bucket_index(key);
        self.buckets[index].get(|k| k == key).is_some()
    }

    /// Returns the value stored for `key`, or [`Error::KeyNotFound`].
    pub fn get(&self, key: &K) -> Result<&V> {
        let index = self.bucket_index(key);
        self.buckets[index]
            .get(|k| k == key)
            .map(|(_, value)| value)
            .ok_or(Error::KeyNotFound)
    }

    /// Returns a mutable reference to the value stored for `key`, or
    /// [`Error::KeyNotFound`].
    pub fn get_mut(&mut self, key: &K) -> Result<&mut V> {
        let index = self.bucket_index(key);
        self.buckets[index]
            .find(|k| k == key)
            .map(bucket_list::Cursor::into_value_mut)
            .ok_or(Error::KeyNotFound)
    }

    /// Inserts `value` under `key`, returning the value it replaced.
    ///
    /// An existing entry is unlinked and a new one prepended to the same
    /// bucket, so the length is unchanged; otherwise the length grows by one.
    /// Either way the load factor bound holds when this returns, doubling the
    /// bucket count as many times as needed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chained_hash::HashTable;
    ///
    /// let mut table: HashTable<&str, i32> = HashTable::new();
    /// assert_eq!(table.set("a", 1), None);
    /// assert_eq!(table.set("a", 2), Some(1));
    /// assert_eq!(table.len(), 1);
    /// assert_eq!(table.get(&"a"), Ok(&2));
    /// ```
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let index = self.bucket_index(&key);
        let bucket = &mut self.buckets[index];

        let replaced = bucket.find(|k| *k == key).map(|cursor| cursor.remove().1);
        bucket.prepend(key, value);
        if replaced.is_none() {
            self.len += 1;
        }

        let target = grown_bucket_count(self.len, self.buckets.len(), self.max_load_factor);
        if target != self.buckets.len() {
            trace!(
                "load factor {:.3} exceeds {:.3}, growing to {} buckets",
                self.load_factor(),
                self.max_load_factor,
                target
            );
            self.rehash(target);
        }

        replaced
    }

    /// Removes the entry for `key`, returning its value, or
    /// [`Error::KeyNotFound`] with the table unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chained_hash::Error;
    /// use chained_hash::HashTable;
    ///
    /// let mut table: HashTable<u32, u32> = HashTable::new();
    /// table.set(7, 49);
    /// assert_eq!(table.delete(&7), Ok(49));
    /// assert_eq!(table.delete(&7), Err(Error::KeyNotFound));
    /// assert!(table.is_empty());
    /// ```
    pub fn delete(&mut self, key: &K) -> Result<V> {
        let index = self.bucket_index(key);
        let (_, value) = self.buckets[index]
            .delete(|k| k == key)
            .ok_or(Error::KeyNotFound)?;
        self.len -= 1;
        Ok(value)
    }

    /// Reallocates the table with `new_bucket_count` buckets and rehashes
    /// every entry into it.
    ///
    /// This does not consult the load factor; a table resized below the bound
    /// is grown again by the next [`set`](Self::set). Use [`grow`](Self::grow)
    /// to double the current count instead. Returns
    /// [`Error::InvalidConfiguration`] for a zero bucket count.
    pub fn resize(&mut self, new_bucket_count: usize) -> Result<()> {
        if new_bucket_count == 0 {
            return Err(ConfigError::ZeroBuckets.into());
        }
        self.rehash(new_bucket_count);
        Ok(())
    }

    /// Doubles the bucket count and rehashes every entry.
    ///
    /// [`set`](Self::set) does this on its own whenever the load factor bound
    /// is exceeded; calling it directly grows ahead of time.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chained_hash::HashTable;
    ///
    /// let mut table: HashTable<u32, u32> = HashTable::with_buckets(4).unwrap();
    /// table.set(1, 10);
    /// table.grow();
    /// assert_eq!(table.bucket_count(), 8);
    /// assert_eq!(table.get(&1), Ok(&10));
    /// ```
    pub fn grow(&mut self) {
        // A live bucket array is at most `isize::MAX` bytes, so doubling its
        // length cannot overflow `usize`.
        self.rehash(self.buckets.len() * 2);
    }

    /// Halves the bucket count for as long as the halved table still
    /// satisfies the load factor bound. An empty table shrinks to a single
    /// bucket.
    ///
    /// Shrinking only ever happens through this call.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chained_hash::HashTable;
    ///
    /// let mut table: HashTable<u32, u32> = HashTable::new();
    /// for i in 0..100 {
    ///     table.set(i, i);
    /// }
    /// for i in 0..95 {
    ///     table.delete(&i).unwrap();
    /// }
    /// let before = table.bucket_count();
    ///
    /// table.shrink_to_fit();
    /// assert!(table.bucket_count() < before);
    /// assert!(table.load_factor() <= table.max_load_factor());
    /// ```
    pub fn shrink_to_fit(&mut self) {
        let mut target = self.buckets.len();
        while target > 1 && ratio(self.len, target / 2) <= self.max_load_factor {
            target /= 2;
        }

        if target < self.buckets.len() {
            debug!(
                "shrinking from {} to {} buckets for {} entries",
                self.buckets.len(),
                target,
                self.len
            );
            self.rehash(target);
        }
    }

    /// Grows the table so that `additional` more entries can be inserted
    /// without another resize.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chained_hash::HashTable;
    ///
    /// let mut table: HashTable<u32, ()> = HashTable::new();
    /// table.reserve(100);
    /// let buckets = table.bucket_count();
    /// for i in 0..100 {
    ///     table.set(i, ());
    /// }
    /// assert_eq!(table.bucket_count(), buckets);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        let required = self.len.saturating_add(additional);
        let target = grown_bucket_count(required, self.buckets.len(), self.max_load_factor);
        if target != self.buckets.len() {
            self.rehash(target);
        }
    }

    /// Allocates a new bucket array, migrates every entry into it, then swaps
    /// it in. `len` is unchanged.
    fn rehash(&mut self, new_bucket_count: usize) {
        debug!(
            "rehashing {} entries from {} to {} buckets",
            self.len,
            self.buckets.len(),
            new_bucket_count
        );

        let mut buckets = empty_buckets(new_bucket_count);
        for bucket in self.buckets.drain(..) {
            for (key, value) in bucket {
                let index = index_for(self.hash_builder.hash_one(&key), new_bucket_count);
                buckets[index].prepend(key, value);
            }
        }
        self.buckets = buckets;
    }
}

impl<K, V, S> HashTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty table with 8 buckets, a max load factor of 0.75 and
    /// the default hasher builder.
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty table from `config` using the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chained_hash::Config;
    /// use chained_hash::HashTable;
    ///
    /// let config = Config::default()
    ///     .with_initial_buckets(16)
    ///     .with_max_load_factor(0.5);
    /// let table: HashTable<u64, u64> = HashTable::with_config(config).unwrap();
    /// assert_eq!(table.bucket_count(), 16);
    /// assert_eq!(table.max_load_factor(), 0.5);
    ///
    /// assert!(HashTable::<u64, u64>::with_config(config.with_max_load_factor(0.0)).is_err());
    /// ```
    pub fn with_config(config: Config) -> Result<Self> {
        Self::with_config_and_hasher(config, S::default())
    }

    /// Creates an empty table with `bucket_count` buckets and the default max
    /// load factor.
    pub fn with_buckets(bucket_count: usize) -> Result<Self> {
        Self::with_config(Config::default().with_initial_buckets(bucket_count))
    }
}

impl<K, V, S> Default for HashTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> PartialEq for HashTable<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter()
            .all(|(key, value)| other.get(key).is_ok_and(|v| v == value))
    }
}

impl<K, V, S> Eq for HashTable<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> Extend<(K, V)> for HashTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = HashTable::new();
        table.extend(iter);
        table
    }
}

impl<K, V, S> IntoIterator for HashTable<K, V, S> {
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.len,
            buckets: self.buckets.into_iter(),
            current: None,
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashTable<K, V, S> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the entries of a [`HashTable`].
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, BucketList<K, V>>,
    current: Option<bucket_list::Iter<'a, K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some(item);
            }
            self.current = Some(self.buckets.next()?.iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// An iterator over the keys of a [`HashTable`].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of a [`HashTable`].
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// A consuming iterator over the entries of a [`HashTable`].
pub struct IntoIter<K, V> {
    buckets: alloc::vec::IntoIter<BucketList<K, V>>,
    current: Option<bucket_list::IntoIter<K, V>>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some(item);
            }
            self.current = Some(self.buckets.next()?.into_iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k0: u64,
        k1: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k0, self.k1)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            Self {
                k0: OsRng.try_next_u64().unwrap_or(0),
                k1: OsRng.try_next_u64().unwrap_or(0),
            }
        }
    }

    /// Sends every key to the same bucket.
    #[derive(Clone, Default)]
    struct CollidingState;

    struct CollidingHasher;

    impl Hasher for CollidingHasher {
        fn finish(&self) -> u64 {
            0
        }

        fn write(&mut self, _bytes: &[u8]) {}
    }

    impl BuildHasher for CollidingState {
        type Hasher = CollidingHasher;

        fn build_hasher(&self) -> Self::Hasher {
            CollidingHasher
        }
    }

    fn sorted_items<S>(table: &HashTable<u64, u64, S>) -> Vec<(u64, u64)> {
        let mut items: Vec<_> = table.iter().map(|(k, v)| (*k, *v)).collect();
        items.sort_unstable();
        items
    }

    fn assert_placement<K, V, S>(table: &HashTable<K, V, S>)
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        for (index, bucket) in table.buckets.iter().enumerate() {
            for (key, _) in bucket {
                assert_eq!(table.bucket_index(key), index);
            }
        }
        let counted: usize = table.buckets.iter().map(BucketList::len).sum();
        assert_eq!(counted, table.len());
    }

    #[test_log::test]
    fn test_roman_numeral_walkthrough() {
        let mut table: HashTable<&str, i32, SipHashBuilder> =
            HashTable::with_config_and_hasher(
                Config::default().with_initial_buckets(4),
                SipHashBuilder::default(),
            )
            .unwrap();
        assert_eq!(table.len(), 0);
        assert_eq!(table.load_factor(), 0.0);

        table.set("I", 1);
        table.set("V", 5);
        assert_eq!(table.len(), 2);
        assert_eq!(table.bucket_count(), 4);
        assert_eq!(table.load_factor(), 0.5);

        table.set("X", 10);
        assert_eq!(table.bucket_count(), 4);
        table.set("L", 50);
        assert_eq!(table.len(), 4);
        assert_eq!(table.bucket_count(), 8);
        assert_eq!(table.load_factor(), 0.5);

        assert_eq!(table.get(&"I"), Ok(&1));
        assert_eq!(table.get(&"V"), Ok(&5));
        assert_eq!(table.get(&"X"), Ok(&10));
        assert_eq!(table.get(&"L"), Ok(&50));
        assert!(table.contains(&"X"));
        assert!(!table.contains(&"Z"));

        assert_eq!(table.delete(&"I"), Ok(1));
        assert_eq!(table.len(), 3);
        assert!(!table.contains(&"I"));

        for key in ["V", "X", "L"] {
            table.delete(&key).unwrap();
        }
        assert!(table.is_empty());
        assert_eq!(table.load_factor(), 0.0);
        assert_eq!(table.bucket_count(), 8);
        assert_placement(&table);
    }

    #[test]
    fn test_rejects_invalid_configuration() {
        assert_eq!(
            HashTable::<u64, u64, SipHashBuilder>::with_buckets(0).err(),
            Some(Error::InvalidConfiguration(ConfigError::ZeroBuckets))
        );

        let bad = Config::default().with_max_load_factor(1.25);
        assert_eq!(
            HashTable::<u64, u64, _>::with_config_and_hasher(bad, SipHashBuilder::default())
                .err(),
            Some(Error::InvalidConfiguration(
                ConfigError::LoadFactorOutOfRange(1.25)
            ))
        );
    }

    #[test]
    fn test_set_replaces_existing_value() {
        let mut table = HashTable::with_hasher(SipHashBuilder::default());
        assert_eq!(table.set(1u64, "one".to_string()), None);
        assert_eq!(table.set(1u64, "uno".to_string()), Some("one".to_string()));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&1), Ok(&"uno".to_string()));
        assert_placement(&table);
    }

    #[test]
    fn test_get_and_delete_missing_key() {
        let mut table: HashTable<u64, u64, _> = HashTable::with_hasher(SipHashBuilder::default());
        assert_eq!(table.get(&3), Err(Error::KeyNotFound));
        assert_eq!(table.delete(&3), Err(Error::KeyNotFound));
        assert_eq!(table.get_mut(&3), Err(Error::KeyNotFound));

        table.set(1, 1);
        table.set(2, 2);
        let before = sorted_items(&table);
        let buckets = table.bucket_count();

        assert_eq!(table.delete(&3), Err(Error::KeyNotFound));
        assert_eq!(table.len(), 2);
        assert_eq!(table.bucket_count(), buckets);
        assert_eq!(sorted_items(&table), before);
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut table = HashTable::with_hasher(SipHashBuilder::default());
        table.set("counter", 0u32);
        for _ in 0..5 {
            *table.get_mut(&"counter").unwrap() += 1;
        }
        assert_eq!(table.get(&"counter"), Ok(&5));
        assert_eq!(table.len(), 1);
    }

    #[test_log::test]
    fn test_growth_keeps_load_factor_bound() {
        let mut table = HashTable::with_config_and_hasher(
            Config::default().with_initial_buckets(1),
            SipHashBuilder::default(),
        )
        .unwrap();

        for i in 0..1000u64 {
            table.set(i, i * 3);
            assert!(table.load_factor() <= table.max_load_factor());
            assert_eq!(table.len(), i as usize + 1);
        }
        assert!(table.bucket_count().is_power_of_two());
        for i in 0..1000u64 {
            assert_eq!(table.get(&i), Ok(&(i * 3)));
        }
        assert_placement(&table);
    }

    #[test]
    fn test_low_threshold_grows_more_than_once() {
        let mut table = HashTable::with_config_and_hasher(
            Config::default()
                .with_initial_buckets(1)
                .with_max_load_factor(0.3),
            SipHashBuilder::default(),
        )
        .unwrap();

        table.set(1u64, ());
        // 1/2 is still above 0.3, so one doubling is not enough.
        assert_eq!(table.bucket_count(), 4);
        assert!(table.load_factor() <= 0.3);
    }

    #[test]
    fn test_replacement_does_not_grow() {
        let mut table = HashTable::with_config_and_hasher(
            Config::default().with_initial_buckets(4),
            SipHashBuilder::default(),
        )
        .unwrap();
        for i in 0..3u64 {
            table.set(i, 0u64);
        }
        assert_eq!(table.bucket_count(), 4);
        for round in 1..10 {
            for i in 0..3u64 {
                table.set(i, round);
            }
        }
        assert_eq!(table.bucket_count(), 4);
        assert_eq!(table.len(), 3);
        assert_eq!(sorted_items(&table), [(0, 9), (1, 9), (2, 9)]);
    }

    #[test]
    fn test_explicit_resize_preserves_contents() {
        let mut table = HashTable::with_hasher(SipHashBuilder::default());
        for i in 0..50u64 {
            table.set(i, i + 100);
        }
        let before = sorted_items(&table);

        table.resize(512).unwrap();
        assert_eq!(table.bucket_count(), 512);
        assert_eq!(table.len(), 50);
        assert_eq!(sorted_items(&table), before);
        assert_placement(&table);

        table.resize(3).unwrap();
        assert_eq!(table.bucket_count(), 3);
        assert_eq!(sorted_items(&table), before);
        assert_placement(&table);

        assert_eq!(
            table.resize(0),
            Err(Error::InvalidConfiguration(ConfigError::ZeroBuckets))
        );
        assert_eq!(table.bucket_count(), 3);

        // The next insertion restores the bound.
        table.set(1000, 0);
        assert!(table.load_factor() <= table.max_load_factor());
        assert_placement(&table);
    }

    #[test]
    fn test_grow_doubles_bucket_count() {
        let mut table = HashTable::with_config_and_hasher(
            Config::default().with_initial_buckets(3),
            SipHashBuilder::default(),
        )
        .unwrap();
        table.set(1u64, 1u64);
        table.set(2, 2);
        let before = sorted_items(&table);

        table.grow();
        assert_eq!(table.bucket_count(), 6);
        table.grow();
        assert_eq!(table.bucket_count(), 12);
        assert_eq!(table.len(), 2);
        assert_eq!(sorted_items(&table), before);
        assert_placement(&table);
    }

    #[test]
    fn test_vanishing_load_factor_is_rejected() {
        let config = Config::default()
            .with_initial_buckets(1)
            .with_max_load_factor(1e-30);
        assert!(matches!(
            HashTable::<u64, u64, _>::with_config_and_hasher(config, SipHashBuilder::default()),
            Err(Error::InvalidConfiguration(
                ConfigError::LoadFactorOutOfRange(_)
            ))
        ));

        // The smallest accepted factor still grows without overflow.
        let mut table = HashTable::with_config_and_hasher(
            config.with_max_load_factor(crate::MIN_MAX_LOAD_FACTOR),
            SipHashBuilder::default(),
        )
        .unwrap();
        table.set(1u64, 1u64);
        assert_eq!(table.bucket_count(), 1024);
        assert!(table.load_factor() <= table.max_load_factor());
    }

    #[test]
    fn test_shrink_to_fit_is_explicit() {
        let mut table = HashTable::with_hasher(SipHashBuilder::default());
        for i in 0..64u64 {
            table.set(i, i);
        }
        let grown = table.bucket_count();
        for i in 0..60u64 {
            table.delete(&i).unwrap();
        }
        // Deletion never shrinks.
        assert_eq!(table.bucket_count(), grown);

        table.shrink_to_fit();
        assert!(table.bucket_count() < grown);
        assert!(table.load_factor() <= table.max_load_factor());
        assert_eq!(sorted_items(&table), [(60, 60), (61, 61), (62, 62), (63, 63)]);
        assert_placement(&table);

        // Halving again would exceed the bound.
        let fitted = table.bucket_count();
        table.shrink_to_fit();
        assert_eq!(table.bucket_count(), fitted);
        assert!(ratio(table.len(), fitted / 2) > table.max_load_factor());
    }

    #[test]
    fn test_shrink_empty_table_to_one_bucket() {
        let mut table: HashTable<u64, u64, _> = HashTable::with_hasher(SipHashBuilder::default());
        table.shrink_to_fit();
        assert_eq!(table.bucket_count(), 1);

        table.set(1, 1);
        assert!(table.load_factor() <= table.max_load_factor());
        assert_eq!(table.get(&1), Ok(&1));
    }

    #[test]
    fn test_reserve_avoids_growth() {
        let mut table = HashTable::with_hasher(SipHashBuilder::default());
        table.reserve(300);
        let buckets = table.bucket_count();
        assert!(ratio(300, buckets) <= table.max_load_factor());

        for i in 0..300u64 {
            table.set(i, ());
        }
        assert_eq!(table.bucket_count(), buckets);

        // Already large enough.
        table.reserve(0);
        assert_eq!(table.bucket_count(), buckets);
    }

    #[test]
    fn test_colliding_keys_share_one_bucket() {
        let mut table = HashTable::with_config_and_hasher(
            Config::default().with_initial_buckets(2),
            CollidingState,
        )
        .unwrap();

        for i in 0..100u64 {
            table.set(i, i * 2);
        }
        assert_eq!(table.len(), 100);
        assert!(table.bucket_count() >= 134);
        assert_eq!(table.buckets[0].len(), 100);
        assert!(table.buckets[1..].iter().all(BucketList::is_empty));

        for i in (0..100u64).step_by(2) {
            assert_eq!(table.delete(&i), Ok(i * 2));
        }
        for i in 0..100u64 {
            assert_eq!(table.contains(&i), i % 2 == 1);
        }
        assert_eq!(table.len(), 50);
    }

    #[test]
    fn test_keys_values_items_agree() {
        let mut table = HashTable::with_hasher(SipHashBuilder::default());
        for i in 0..20u64 {
            table.set(i, i * i);
        }

        let mut keys: Vec<u64> = table.keys().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..20).collect::<Vec<_>>());

        let mut values: Vec<u64> = table.values().copied().collect();
        values.sort_unstable();
        assert_eq!(values, (0..20).map(|i| i * i).collect::<Vec<_>>());

        assert_eq!(table.items().len(), 20);
        assert_eq!(table.keys().len(), 20);
        assert_eq!(sorted_items(&table).len(), 20);
    }

    #[test]
    fn test_iteration_follows_bucket_order() {
        let mut table = HashTable::with_hasher(SipHashBuilder::default());
        for i in 0..40u64 {
            table.set(i, ());
        }
        let indices: Vec<usize> = table.keys().map(|k| table.bucket_index(k)).collect();
        assert!(indices.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_into_iter_yields_everything() {
        let mut table = HashTable::with_hasher(SipHashBuilder::default());
        for i in 0..30u64 {
            table.set(i, i.to_string());
        }

        let mut owned: Vec<(u64, String)> = table.into_iter().collect();
        owned.sort_unstable();
        assert_eq!(owned.len(), 30);
        assert_eq!(owned[7], (7, "7".to_string()));
    }

    #[test]
    fn test_clear_keeps_bucket_count() {
        let mut table = HashTable::with_hasher(SipHashBuilder::default());
        for i in 0..30u64 {
            table.set(i, i);
        }
        let buckets = table.bucket_count();
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.bucket_count(), buckets);
        assert_eq!(table.iter().count(), 0);
        assert!(!table.contains(&3));
    }

    #[test]
    fn test_clone_and_eq() {
        let mut table = HashTable::with_hasher(SipHashBuilder::default());
        for i in 0..25u64 {
            table.set(i, i + 1);
        }

        let mut copy = table.clone();
        assert_eq!(copy, table);

        copy.set(0, 0);
        assert_ne!(copy, table);

        copy.set(0, 1);
        copy.resize(97).unwrap();
        assert_eq!(copy, table);

        copy.delete(&24).unwrap();
        assert_ne!(copy, table);
    }

    #[test]
    fn test_collect_and_extend() {
        let mut table: HashTable<u64, u64, SipHashBuilder> =
            (0..10u64).map(|i| (i, i)).collect();
        table.extend((5..15u64).map(|i| (i, i * 10)));

        assert_eq!(table.len(), 15);
        assert_eq!(table.get(&4), Ok(&4));
        assert_eq!(table.get(&5), Ok(&50));
        assert_eq!(table.get(&14), Ok(&140));
    }

    #[test]
    fn test_debug_formats_as_map() {
        let mut table = HashTable::with_hasher(SipHashBuilder::default());
        table.set(1u8, 'a');
        assert_eq!(alloc::format!("{:?}", table), "{1: 'a'}");
    }

    #[cfg(feature = "stats")]
    #[test]
    fn test_chain_statistics() {
        let mut table = HashTable::with_config_and_hasher(
            Config::default().with_initial_buckets(8),
            CollidingState,
        )
        .unwrap();
        for i in 0..5u64 {
            table.set(i, ());
        }

        let hist = table.chain_length_histogram();
        assert_eq!(hist.len(), 6);
        assert_eq!(hist[5], 1);
        assert_eq!(hist[0], table.bucket_count() - 1);

        let stats = table.stats();
        assert_eq!(stats.len, 5);
        assert_eq!(stats.longest_chain, 5);
        assert_eq!(stats.empty_buckets, table.bucket_count() - 1);
        assert_eq!(stats.load_factor, table.load_factor());

        #[cfg(feature = "std")]
        {
            stats.print();
            table.print_chain_length_histogram();
        }
    }

    #[cfg(feature = "std")]
    mod properties {
        use std::collections::HashMap as ReferenceMap;

        use proptest::prelude::*;

        use super::*;

        #[derive(Debug, Clone)]
        enum Op {
            Set(u16, u32),
            Delete(u16),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                3 => (0u16..256, any::<u32>()).prop_map(|(k, v)| Op::Set(k, v)),
                1 => (0u16..256).prop_map(Op::Delete),
            ]
        }

        proptest! {
            #[test]
            fn matches_reference_model(
                initial_buckets in 1usize..16,
                max_load_factor in 0.05f64..=1.0,
                ops in proptest::collection::vec(op(), 0..400),
            ) {
                let config = Config::default()
                    .with_initial_buckets(initial_buckets)
                    .with_max_load_factor(max_load_factor);
                let mut table = HashTable::with_config_and_hasher(config, SipHashBuilder::default())
                    .unwrap();
                let mut reference = ReferenceMap::new();

                for op in ops {
                    match op {
                        Op::Set(k, v) => {
                            prop_assert_eq!(table.set(k, v), reference.insert(k, v));
                            prop_assert!(table.load_factor() <= table.max_load_factor());
                            prop_assert_eq!(table.get(&k), Ok(&v));
                        }
                        Op::Delete(k) => {
                            let before = table.len();
                            match reference.remove(&k) {
                                Some(v) => prop_assert_eq!(table.delete(&k), Ok(v)),
                                None => {
                                    prop_assert_eq!(table.delete(&k), Err(Error::KeyNotFound));
                                    prop_assert_eq!(table.len(), before);
                                }
                            }
                            prop_assert!(!table.contains(&k));
                        }
                    }
                    prop_assert_eq!(table.len(), reference.len());
                    prop_assert_eq!(
                        table.load_factor(),
                        ratio(table.len(), table.bucket_count())
                    );
                }

                let mut items: Vec<(u16, u32)> = table.iter().map(|(k, v)| (*k, *v)).collect();
                items.sort_unstable();
                let mut expected: Vec<(u16, u32)> = reference.into_iter().collect();
                expected.sort_unstable();
                prop_assert_eq!(items, expected);
                assert_placement(&table);
            }
        }
    }
}
