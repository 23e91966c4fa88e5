use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::ops::BitAnd;
use core::ops::BitOr;
use core::ops::BitXor;
use core::ops::Sub;

use crate::DefaultHashBuilder;
use crate::config::Config;
use crate::config::DEFAULT_INITIAL_BUCKETS;
use crate::error::Error;
use crate::error::Result;
use crate::hash_table;
use crate::hash_table::HashTable;

/// Upper bound on the buckets `try_from_iter` allocates from a size hint.
/// Larger inputs grow through the usual doubling.
const MAX_PRESIZED_BUCKETS: usize = 1 << 16;

/// A hash set implemented using the chained [`HashTable`] as the underlying
/// storage, with every element stored as a key mapped to `()`.
///
/// Unlike a table overwrite, [`add`] rejects an element that is already
/// present with [`Error::DuplicateElement`].
///
/// [`add`]: Set::add
///
/// # Examples
///
/// ```rust
/// use chained_hash::Set;
///
/// let a: Set<&str> = Set::try_from_iter(["hello", "there", "ikey"]).unwrap();
/// let b: Set<&str> = Set::try_from_iter(["other", "my", "hello", "there"]).unwrap();
///
/// let common = &a & &b;
/// assert_eq!(common.len(), 2);
/// assert!(common.contains(&"hello"));
/// assert!(common.contains(&"there"));
/// assert!(!common.contains(&"ikey"));
/// ```
#[derive(Clone)]
pub struct Set<T, S = DefaultHashBuilder> {
    table: HashTable<T, (), S>,
}

impl<T, S> PartialEq for Set<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for Set<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T, S> Debug for Set<T, S>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> Set<T, S> {
    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of buckets in the underlying table.
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Returns the load factor of the underlying table.
    pub fn load_factor(&self) -> f64 {
        self.table.load_factor()
    }

    /// Returns a reference to the set's hasher builder.
    pub fn hasher(&self) -> &S {
        self.table.hasher()
    }

    /// Returns an iterator over the elements, each exactly once, in
    /// unspecified order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.keys(),
        }
    }

    /// Alias for [`iter`](Self::iter).
    pub fn keys(&self) -> Iter<'_, T> {
        self.iter()
    }

    /// Removes all elements, keeping the bucket count.
    pub fn clear(&mut self) {
        self.table.clear();
    }
}

impl<T, S> Set<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty set with the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::with_hasher(hash_builder),
        }
    }

    /// Creates an empty set from `config` and the given hasher builder.
    ///
    /// Returns [`Error::InvalidConfiguration`] for an unusable `config`.
    pub fn with_config_and_hasher(config: Config, hash_builder: S) -> Result<Self> {
        Ok(Self {
            table: HashTable::with_config_and_hasher(config, hash_builder)?,
        })
    }

    /// Adds `item` to the set, or returns [`Error::DuplicateElement`] with the
    /// set unchanged if it is already a member.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chained_hash::Error;
    /// use chained_hash::Set;
    ///
    /// let mut set: Set<&str> = Set::new();
    /// assert_eq!(set.add("yooo"), Ok(()));
    /// assert_eq!(set.add("yooo"), Err(Error::DuplicateElement));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn add(&mut self, item: T) -> Result<()> {
        if self.table.contains(&item) {
            return Err(Error::DuplicateElement);
        }
        self.table.set(item, ());
        Ok(())
    }

    /// Returns `true` if `item` is a member of the set.
    pub fn contains(&self, item: &T) -> bool {
        self.table.contains(item)
    }

    /// Removes `item` from the set, or returns [`Error::KeyNotFound`] if it is
    /// not a member.
    pub fn delete(&mut self, item: &T) -> Result<()> {
        self.table.delete(item)
    }

    /// Halves the bucket count while the load factor bound still holds.
    pub fn shrink_to_fit(&mut self) {
        self.table.shrink_to_fit();
    }

    /// Returns `true` if `self` has no elements in common with `other`.
    pub fn is_disjoint(&self, other: &Set<T, S>) -> bool {
        if self.len() <= other.len() {
            self.iter().all(|v| !other.contains(v))
        } else {
            other.iter().all(|v| !self.contains(v))
        }
    }

    /// Returns `true` if every element of `self` is also in `other`.
    pub fn is_subset(&self, other: &Set<T, S>) -> bool {
        if self.len() > other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if every element of `other` is also in `self`.
    pub fn is_superset(&self, other: &Set<T, S>) -> bool {
        other.is_subset(self)
    }

    fn insert_unique(&mut self, item: T) {
        debug_assert!(!self.table.contains(&item));
        self.table.set(item, ());
    }
}

impl<T, S> Set<T, S>
where
    T: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    fn empty_sized_for(&self, expected: usize) -> Self {
        let config = Config {
            initial_buckets: expected.saturating_mul(2).max(1),
            max_load_factor: self.table.max_load_factor(),
        };
        Self {
            table: HashTable::from_validated(config, self.hasher().clone()),
        }
    }

    /// Returns a new set holding every element that is in `self`, `other`, or
    /// both. Neither operand is modified.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chained_hash::Set;
    ///
    /// let a: Set<i32> = Set::try_from_iter([1, 2, 3]).unwrap();
    /// let b: Set<i32> = Set::try_from_iter([3, 4]).unwrap();
    ///
    /// let union = a.union(&b);
    /// assert_eq!(union.len(), 4);
    /// assert_eq!(&a | &b, union);
    /// ```
    pub fn union(&self, other: &Set<T, S>) -> Set<T, S> {
        let mut result = self.empty_sized_for(self.len() + other.len());
        for item in self.iter() {
            result.insert_unique(item.clone());
        }
        for item in other.iter() {
            if !self.contains(item) {
                result.insert_unique(item.clone());
            }
        }
        result
    }

    /// Returns a new set holding the elements present in both `self` and
    /// `other`.
    pub fn intersection(&self, other: &Set<T, S>) -> Set<T, S> {
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };

        let mut result = self.empty_sized_for(smaller.len());
        for item in smaller.iter() {
            if larger.contains(item) {
                result.insert_unique(item.clone());
            }
        }
        result
    }

    /// Returns a new set holding the elements of `self` that are not in
    /// `other`. `a.difference(&b)` and `b.difference(&a)` differ in general.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chained_hash::Set;
    ///
    /// let a: Set<i32> = Set::try_from_iter([1, 2, 3]).unwrap();
    /// let b: Set<i32> = Set::try_from_iter([2, 3, 4]).unwrap();
    ///
    /// assert_eq!(a.difference(&b), Set::try_from_iter([1]).unwrap());
    /// assert_eq!(&b - &a, Set::try_from_iter([4]).unwrap());
    /// ```
    pub fn difference(&self, other: &Set<T, S>) -> Set<T, S> {
        let mut result = self.empty_sized_for(self.len());
        for item in self.iter() {
            if !other.contains(item) {
                result.insert_unique(item.clone());
            }
        }
        result
    }

    /// Returns a new set holding the elements in exactly one of `self` and
    /// `other`.
    pub fn symmetric_difference(&self, other: &Set<T, S>) -> Set<T, S> {
        let mut result = self.difference(other);
        for item in other.iter() {
            if !self.contains(item) {
                result.insert_unique(item.clone());
            }
        }
        result
    }
}

impl<T, S> Set<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty set with 8 buckets using the default hasher builder.
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty set from `config` using the default hasher builder.
    pub fn with_config(config: Config) -> Result<Self> {
        Self::with_config_and_hasher(config, S::default())
    }

    /// Builds a set from `iter`, sized at twice the iterator's lower size
    /// hint (8 buckets when the hint is zero, at most 65536 up front).
    ///
    /// Returns [`Error::DuplicateElement`] if `iter` yields the same element
    /// twice. Use [`collect`](Iterator::collect) to drop repeats instead.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chained_hash::Error;
    /// use chained_hash::Set;
    ///
    /// let set: Set<&str> = Set::try_from_iter(["a", "b", "c"]).unwrap();
    /// assert_eq!(set.len(), 3);
    /// assert_eq!(set.bucket_count(), 6);
    ///
    /// let repeated: Result<Set<&str>, _> = Set::try_from_iter(["a", "a"]);
    /// assert_eq!(repeated.err(), Some(Error::DuplicateElement));
    /// ```
    pub fn try_from_iter<I: IntoIterator<Item = T>>(iter: I) -> Result<Self> {
        let iter = iter.into_iter();
        let initial_buckets = match iter.size_hint().0 {
            0 => DEFAULT_INITIAL_BUCKETS,
            n => n.saturating_mul(2).min(MAX_PRESIZED_BUCKETS),
        };

        let mut set = Self::with_config(Config::default().with_initial_buckets(initial_buckets))?;
        for item in iter {
            set.add(item)?;
        }
        Ok(set)
    }
}

impl<T, S> Default for Set<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// An iterator over the elements of a [`Set`].
pub struct Iter<'a, T> {
    inner: hash_table::Keys<'a, T, ()>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// A consuming iterator over the elements of a [`Set`].
pub struct IntoIter<T> {
    inner: hash_table::IntoIter<T, ()>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(item, ())| item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T, S> IntoIterator for Set<T, S> {
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a Set<T, S> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S> FromIterator<T> for Set<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Set::new();
        set.extend(iter);
        set
    }
}

impl<T, S> Extend<T> for Set<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Adds every element of `iter`, skipping ones already present.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            if !self.contains(&item) {
                self.insert_unique(item);
            }
        }
    }
}

impl<T, S> BitOr<&Set<T, S>> for &Set<T, S>
where
    T: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    type Output = Set<T, S>;

    fn bitor(self, rhs: &Set<T, S>) -> Set<T, S> {
        self.union(rhs)
    }
}

impl<T, S> BitAnd<&Set<T, S>> for &Set<T, S>
where
    T: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    type Output = Set<T, S>;

    fn bitand(self, rhs: &Set<T, S>) -> Set<T, S> {
        self.intersection(rhs)
    }
}

impl<T, S> Sub<&Set<T, S>> for &Set<T, S>
where
    T: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    type Output = Set<T, S>;

    fn sub(self, rhs: &Set<T, S>) -> Set<T, S> {
        self.difference(rhs)
    }
}

impl<T, S> BitXor<&Set<T, S>> for &Set<T, S>
where
    T: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    type Output = Set<T, S>;

    fn bitxor(self, rhs: &Set<T, S>) -> Set<T, S> {
        self.symmetric_difference(rhs)
    }
}
