use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;

use crate::error::Fallibility;
use crate::error::TryReserveError;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;
use crate::probe::Linear;
use crate::probe::Probing;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used by [`HashMap`] when none is specified.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used by [`HashMap`] when none is specified.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Stand-in for the default hasher when neither the `foldhash` nor the
        /// `std` feature is enabled. It cannot be constructed, so maps must be
        /// given a hasher explicitly.
        pub enum DefaultHashBuilder {}
    }
}

/// Smallest non-zero bucket count of a map.
const MIN_BUCKETS: usize = 16;

/// Largest number of in-use buckets (elements plus tombstones) allowed in an
/// array of `buckets` buckets, about 4/7 of it.
#[inline(always)]
fn max_load(buckets: usize) -> usize {
    buckets - 3 * (buckets / 7)
}

/// Smallest bucket count whose load limit admits `needed` elements.
fn buckets_for(needed: usize) -> Option<usize> {
    let mut buckets = MIN_BUCKETS;
    while max_load(buckets) < needed {
        buckets = buckets.checked_mul(2)?;
    }
    Some(buckets)
}

fn equivalent_key<Q, K, V>(key: &Q) -> impl Fn(&(K, V)) -> bool
where
    Q: Eq + ?Sized,
    K: Borrow<Q>,
{
    move |(k, _)| key == <K as Borrow<Q>>::borrow(k)
}

/// A hash map built on the open-addressing [`HashTable`].
///
/// `HashMap<K, V, S, P>` stores key-value pairs where keys implement
/// `Hash + Eq`, hashes them with the hasher builder `S`, and resolves
/// collisions with the probing strategy `P` ([`Linear`] by default).
///
/// The map starts without an allocation. Before an insertion would push the
/// number of in-use buckets (elements plus tombstones) past about 4/7 of the
/// bucket count, the map rehashes into a new array: at the same size when
/// tombstones outnumber elements, otherwise at twice the size. Removals halve
/// the array once the map is a quarter full.
///
/// Growth is all-or-nothing. The new bucket array is allocated before any
/// element moves, so the `try_*` methods leave the map untouched when they
/// return an error.
///
/// # Performance Characteristics
///
/// - **Memory**: one bucket per slot, holding the element, its `u64` hash,
///   and the bucket state.
#[derive(Clone)]
pub struct HashMap<K, V, S = DefaultHashBuilder, P = Linear> {
    table: HashTable<(K, V), P>,
    hash_builder: S,
}

impl<K, V, S, P> Debug for HashMap<K, V, S, P>
where
    K: Debug,
    V: Debug,
    P: Probing,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a new hash map with the given hasher builder.
    ///
    /// No memory is allocated until the first insertion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use open_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_hasher(SimpleHasher);
    /// assert!(map.is_empty());
    /// assert_eq!(map.bucket_count(), 0);
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_probing(hash_builder, Linear)
    }

    /// Creates a new hash map that can hold at least `capacity` elements
    /// without rehashing, using the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use open_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_capacity_and_hasher(100, SimpleHasher);
    /// assert!(map.capacity() >= 100);
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self::with_capacity_and_probing(capacity, hash_builder, Linear)
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a new hash map using the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use open_hash::HashMap;
    /// #
    /// let mut map: HashMap<&str, u32> = HashMap::new();
    /// map.insert("one", 1);
    /// assert_eq!(map.get("one"), Some(&1));
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates a new hash map with the specified capacity using the default
    /// hasher builder.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<K, V, S, P> HashMap<K, V, S, P>
where
    P: Probing,
{
    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of elements the map can hold before it rehashes,
    /// assuming no tombstones.
    pub fn capacity(&self) -> usize {
        max_load(self.table.bucket_count())
    }

    /// Returns the number of buckets in the underlying array.
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Returns the number of tombstones in the underlying array.
    pub fn tombstones(&self) -> usize {
        self.table.tombstones()
    }

    /// Returns the number of in-use buckets, elements plus tombstones.
    pub fn load(&self) -> usize {
        self.table.load()
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the underlying table, for inspecting the bucket layout.
    pub fn table(&self) -> &HashTable<(K, V), P> {
        &self.table
    }

    /// Removes all elements, keeping the bucket array.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use open_hash::HashMap;
    /// #
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// map.insert(1, "a");
    /// let buckets = map.bucket_count();
    ///
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.bucket_count(), buckets);
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// An iterator visiting all key-value pairs in bucket order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// An iterator visiting all key-value pairs in bucket order, with mutable
    /// references to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// An iterator visiting all keys in bucket order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// An iterator visiting all values in bucket order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// An iterator visiting all values mutably in bucket order.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Clears the map, returning all key-value pairs as an iterator. The
    /// bucket array is kept.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }
}

impl<K, V, S, P> HashMap<K, V, S, P>
where
    K: Hash + Eq,
    S: BuildHasher,
    P: Probing,
{
    /// Creates a new hash map with the given hasher builder and probing
    /// strategy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use open_hash::HashMap;
    /// # use open_hash::probe::Quadratic;
    /// # use std::hash::RandomState;
    /// #
    /// let mut map = HashMap::with_probing(RandomState::new(), Quadratic);
    /// map.insert("key", 1);
    /// assert_eq!(map.get("key"), Some(&1));
    /// ```
    pub fn with_probing(hash_builder: S, _probing: P) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Creates a new hash map with room for `capacity` elements, the given
    /// hasher builder, and probing strategy.
    pub fn with_capacity_and_probing(capacity: usize, hash_builder: S, probing: P) -> Self {
        let mut map = Self::with_probing(hash_builder, probing);
        map.reserve(capacity);
        map
    }

    #[inline]
    fn make_hash<Q>(&self, key: &Q) -> u64
    where
        Q: Hash + ?Sized,
    {
        self.hash_builder.hash_one(key)
    }

    /// Reserves room for at least `additional` more elements.
    ///
    /// # Panics
    ///
    /// Panics if the new bucket count overflows `usize`.
    pub fn reserve(&mut self, additional: usize) {
        if let Err(err) = self.reserve_inner(additional, Fallibility::Infallible) {
            unreachable!("infallible reserve returned {err:?}");
        }
    }

    /// Tries to reserve room for at least `additional` more elements.
    ///
    /// On error the map is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use open_hash::HashMap;
    /// # use open_hash::TryReserveError;
    /// #
    /// let mut map: HashMap<u64, u64> = HashMap::new();
    /// map.insert(1, 1);
    ///
    /// assert_eq!(map.try_reserve(usize::MAX), Err(TryReserveError::CapacityOverflow));
    /// assert_eq!(map.get(&1), Some(&1));
    ///
    /// map.try_reserve(100).expect("small reservation");
    /// assert!(map.capacity() >= 101);
    /// ```
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.reserve_inner(additional, Fallibility::Fallible)
    }

    fn reserve_inner(
        &mut self,
        additional: usize,
        fallibility: Fallibility,
    ) -> Result<(), TryReserveError> {
        let buckets = self.table.bucket_count();
        if self.table.load().saturating_add(additional) <= max_load(buckets) {
            return Ok(());
        }

        let needed = self
            .table
            .len()
            .checked_add(additional)
            .ok_or_else(|| fallibility.capacity_overflow())?;
        let target = buckets_for(needed).ok_or_else(|| fallibility.capacity_overflow())?;
        self.rehash(target.max(buckets), fallibility)
    }

    /// Makes room for one more element: rehashes in place when tombstones
    /// dominate, otherwise doubles the bucket count.
    fn reserve_one(&mut self, fallibility: Fallibility) -> Result<(), TryReserveError> {
        let buckets = self.table.bucket_count();
        if self.table.load() < max_load(buckets) {
            return Ok(());
        }

        let target = if buckets == 0 {
            MIN_BUCKETS
        } else if self.table.tombstones() > self.table.len() {
            buckets
        } else {
            buckets
                .checked_mul(2)
                .ok_or_else(|| fallibility.capacity_overflow())?
        };
        self.rehash(target, fallibility)
    }

    fn rehash(
        &mut self,
        bucket_count: usize,
        fallibility: Fallibility,
    ) -> Result<(), TryReserveError> {
        #[cfg(feature = "tracing")]
        let (from, swept) = (self.table.bucket_count(), self.table.tombstones());

        self.table.resize(bucket_count, fallibility)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            from,
            to = bucket_count,
            len = self.table.len(),
            swept,
            "rehashed hash map"
        );

        Ok(())
    }

    /// Halves the bucket array once the map is a quarter full. Allocation
    /// failure leaves the larger array in place.
    fn maybe_shrink(&mut self) {
        let buckets = self.table.bucket_count();
        if buckets > MIN_BUCKETS && self.table.len() <= max_load(buckets) / 4 {
            let _ = self.rehash(buckets / 2, Fallibility::Fallible);
        }
    }

    /// Shrinks the bucket array as much as possible and sweeps out all
    /// tombstones. An empty map releases its array entirely.
    pub fn shrink_to_fit(&mut self) {
        if self.table.is_empty() {
            self.table = HashTable::new();
            return;
        }

        if let Some(target) = buckets_for(self.table.len()) {
            if target < self.table.bucket_count() || self.table.tombstones() > 0 {
                let _ = self.rehash(target, Fallibility::Fallible);
            }
        }
    }

    /// Inserts a key-value pair, returning the previous value for the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use open_hash::HashMap;
    /// #
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.entry(key) {
            Entry::Occupied(mut entry) => Some(entry.insert(value)),
            Entry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Fallible version of [`insert`](HashMap::insert). On error the map is
    /// unchanged and the pair is dropped.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>, TryReserveError> {
        Ok(match self.try_entry(key)? {
            Entry::Occupied(mut entry) => Some(entry.insert(value)),
            Entry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        })
    }

    /// Gets the entry for `key`, growing the map first if an insertion could
    /// push it past its load limit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use open_hash::HashMap;
    /// #
    /// let mut counts: HashMap<char, u32> = HashMap::new();
    /// for c in "hello".chars() {
    ///     *counts.entry(c).or_insert(0) += 1;
    /// }
    /// assert_eq!(counts.get(&'l'), Some(&2));
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, P> {
        match self.entry_inner(key, Fallibility::Infallible) {
            Ok(entry) => entry,
            Err(err) => unreachable!("infallible entry returned {err:?}"),
        }
    }

    /// Fallible version of [`entry`](HashMap::entry).
    pub fn try_entry(&mut self, key: K) -> Result<Entry<'_, K, V, P>, TryReserveError> {
        self.entry_inner(key, Fallibility::Fallible)
    }

    fn entry_inner(
        &mut self,
        key: K,
        fallibility: Fallibility,
    ) -> Result<Entry<'_, K, V, P>, TryReserveError> {
        self.reserve_one(fallibility)?;

        let hash = self.make_hash(&key);
        Ok(match self.table.entry(hash, equivalent_key(&key)) {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        })
    }

    /// Returns a reference to the value for `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and a reference to the value for `key`.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.make_hash(key);
        self.table
            .find(hash, equivalent_key(key))
            .map(|(k, v)| (k, v))
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.make_hash(key);
        self.table
            .find_mut(hash, equivalent_key(key))
            .map(|(_, v)| v)
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.make_hash(key);
        self.table.contains(hash, equivalent_key(key))
    }

    /// Removes `key` from the map, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes `key` from the map, returning the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.make_hash(key);
        let removed = self.table.take(hash, equivalent_key(key))?;
        self.maybe_shrink();
        Some(removed)
    }

    /// Keeps only the pairs for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&K, &mut V) -> bool) {
        self.table.retain(|(k, v)| f(k, v));
        self.maybe_shrink();
    }
}

impl<K, V, S, P> Default for HashMap<K, V, S, P>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
    P: Probing + Default,
{
    fn default() -> Self {
        Self::with_probing(S::default(), P::default())
    }
}

impl<K, V, S, P> PartialEq for HashMap<K, V, S, P>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
    P: Probing,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter()
            .all(|(k, v)| other.get(k).is_some_and(|other_v| v == other_v))
    }
}

impl<K, V, S, P> Eq for HashMap<K, V, S, P>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
    P: Probing,
{
}

impl<K, V, S, P> Extend<(K, V)> for HashMap<K, V, S, P>
where
    K: Hash + Eq,
    S: BuildHasher,
    P: Probing,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let reserve = if self.is_empty() {
            iter.size_hint().0
        } else {
            iter.size_hint().0.div_ceil(2)
        };
        self.reserve(reserve);
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S, P> FromIterator<(K, V)> for HashMap<K, V, S, P>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
    P: Probing + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S, P: Probing> IntoIterator for &'a HashMap<K, V, S, P> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S, P: Probing> IntoIterator for &'a mut HashMap<K, V, S, P> {
    type IntoIter = IterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S, P: Probing> IntoIterator for HashMap<K, V, S, P> {
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V, P = Linear> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V, P>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V, P>),
}

impl<'a, K, V, P: Probing> Entry<'a, K, V, P> {
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }

    /// Index of the bucket this entry refers to.
    pub fn index(&self) -> usize {
        match self {
            Entry::Occupied(entry) => entry.entry.index(),
            Entry::Vacant(entry) => entry.entry.index(),
        }
    }
}

impl<'a, K, V, P> Entry<'a, K, V, P>
where
    V: Default,
    P: Probing,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V, P = Linear> {
    entry: crate::hash_table::VacantEntry<'a, (K, V), P>,
    key: K,
}

impl<'a, K, V, P: Probing> VacantEntry<'a, K, V, P> {
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V, P = Linear> {
    entry: crate::hash_table::OccupiedEntry<'a, (K, V), P>,
}

impl<'a, K, V, P: Probing> OccupiedEntry<'a, K, V, P> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.entry.get().0
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Inserts a value into the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(&mut self.entry.get_mut().1, value)
    }

    /// Removes the entry from the map and returns the value.
    ///
    /// Unlike [`HashMap::remove`], this never shrinks the bucket array.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove()
    }
}

/// An iterator over the key-value pairs of a `HashMap`.
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A mutable iterator over the key-value pairs of a `HashMap`.
pub struct IterMut<'a, K, V> {
    inner: crate::hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a `HashMap`.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

/// A draining iterator over the key-value pairs of a `HashMap`.
pub struct Drain<'a, K, V> {
    inner: crate::hash_table::Drain<'a, (K, V)>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}

/// An owning iterator over the key-value pairs of a `HashMap`.
pub struct IntoIter<K, V> {
    inner: crate::hash_table::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
