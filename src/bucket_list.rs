use alloc::boxed::Box;
use core::fmt::Debug;

type Link<K, V> = Option<Box<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    next: Link<K, V>,
}

/// A singly linked list of key-value entries, used as one bucket of a
/// [`HashTable`](crate::HashTable).
///
/// Entries are pushed to the front, so iteration yields them in reverse
/// insertion order. The list does not enforce key uniqueness; the table does.
///
/// # Examples
///
/// ```rust
/// use chained_hash::bucket_list::BucketList;
///
/// let mut bucket = BucketList::new();
/// bucket.prepend("a", 1);
/// bucket.prepend("b", 2);
///
/// let items: Vec<_> = bucket.iter().collect();
/// assert_eq!(items, vec![(&"b", &2), (&"a", &1)]);
///
/// let cursor = bucket.find(|k| *k == "a").unwrap();
/// assert_eq!(cursor.remove(), ("a", 1));
/// assert_eq!(bucket.len(), 1);
/// ```
pub struct BucketList<K, V> {
    head: Link<K, V>,
    len: usize,
}

impl<K, V> BucketList<K, V> {
    /// Creates an empty list.
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Returns the number of entries in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no entries.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Inserts an entry at the front of the list in O(1).
    pub fn prepend(&mut self, key: K, value: V) {
        let next = self.head.take();
        self.head = Some(Box::new(Node { key, value, next }));
        self.len += 1;
    }

    /// Removes and returns the front entry in O(1).
    pub fn pop_front(&mut self) -> Option<(K, V)> {
        self.head.take().map(|node| {
            let node = *node;
            self.head = node.next;
            self.len -= 1;
            (node.key, node.value)
        })
    }

    /// Returns the first entry, scanning front to back, whose key satisfies
    /// `pred`.
    pub fn get(&self, pred: impl Fn(&K) -> bool) -> Option<(&K, &V)> {
        self.iter().find(|(key, _)| pred(key))
    }

    /// Returns a cursor positioned at the first entry whose key satisfies
    /// `pred`, or `None` if no entry matches.
    ///
    /// The cursor holds the list's mutable borrow, so it cannot be used after
    /// any other mutation of the list.
    pub fn find(&mut self, pred: impl Fn(&K) -> bool) -> Option<Cursor<'_, K, V>> {
        let mut link = &mut self.head;
        while link.as_ref().is_some_and(|node| !pred(&node.key)) {
            if let Some(node) = link {
                link = &mut node.next;
            }
        }

        if link.is_some() {
            Some(Cursor {
                link,
                len: &mut self.len,
            })
        } else {
            None
        }
    }

    /// Removes the first entry whose key satisfies `pred`, returning it, or
    /// `None` if no entry matches.
    pub fn delete(&mut self, pred: impl Fn(&K) -> bool) -> Option<(K, V)> {
        self.find(pred).map(Cursor::remove)
    }

    /// Returns an iterator over the entries, front to back.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            next: self.head.as_deref(),
            remaining: self.len,
        }
    }

    /// Alias for [`iter`](Self::iter).
    pub fn items(&self) -> Iter<'_, K, V> {
        self.iter()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        let mut link = self.head.take();
        while let Some(mut node) = link {
            link = node.next.take();
        }
        self.len = 0;
    }
}

impl<K, V> Default for BucketList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for BucketList<K, V> {
    fn drop(&mut self) {
        // Unlink iteratively; the default recursive drop can overflow the
        // stack on a long chain.
        self.clear();
    }
}

impl<K, V> Clone for BucketList<K, V>
where
    K: Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        let mut list = Self::new();
        let mut tail = &mut list.head;
        for (key, value) in self.iter() {
            let node = tail.insert(Box::new(Node {
                key: key.clone(),
                value: value.clone(),
                next: None,
            }));
            tail = &mut node.next;
        }
        list.len = self.len;
        list
    }
}

impl<K, V> Debug for BucketList<K, V>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// A handle to one entry of a [`BucketList`], returned by
/// [`BucketList::find`].
pub struct Cursor<'a, K, V> {
    // Always `Some`: `find` only builds a cursor on an occupied link.
    link: &'a mut Link<K, V>,
    len: &'a mut usize,
}

impl<'a, K, V> Cursor<'a, K, V> {
    fn node(&self) -> &Node<K, V> {
        match self.link.as_deref() {
            Some(node) => node,
            None => unreachable!("cursor points at an empty link"),
        }
    }

    /// Returns the key of the entry under the cursor.
    pub fn key(&self) -> &K {
        &self.node().key
    }

    /// Returns the value of the entry under the cursor.
    pub fn value(&self) -> &V {
        &self.node().value
    }

    /// Returns a mutable reference to the value of the entry under the cursor.
    pub fn value_mut(&mut self) -> &mut V {
        match self.link.as_deref_mut() {
            Some(node) => &mut node.value,
            None => unreachable!("cursor points at an empty link"),
        }
    }

    /// Returns a mutable reference to the value, bound to the list's borrow.
    pub fn into_value_mut(self) -> &'a mut V {
        let Cursor { link, .. } = self;
        match link {
            Some(node) => &mut node.value,
            None => unreachable!("cursor points at an empty link"),
        }
    }

    /// Unlinks the entry under the cursor in O(1) and returns it.
    pub fn remove(self) -> (K, V) {
        match self.link.take() {
            Some(node) => {
                let node = *node;
                *self.link = node.next;
                *self.len -= 1;
                (node.key, node.value)
            }
            None => unreachable!("cursor points at an empty link"),
        }
    }
}

/// An iterator over the entries of a [`BucketList`], front to back.
pub struct Iter<'a, K, V> {
    next: Option<&'a Node<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            self.remaining -= 1;
            (&node.key, &node.value)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// A consuming iterator over the entries of a [`BucketList`], front to back.
pub struct IntoIter<K, V> {
    list: BucketList<K, V>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len, Some(self.list.len))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> IntoIterator for BucketList<K, V> {
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

impl<'a, K, V> IntoIterator for &'a BucketList<K, V> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
