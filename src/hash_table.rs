use alloc::boxed::Box;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::marker::PhantomData;

use crate::bucket::Bucket;
use crate::error::Fallibility;
use crate::error::TryReserveError;
use crate::probe::Linear;
use crate::probe::ProbeSeq;
use crate::probe::Probing;
use crate::probe::home;

/// Backing storage for a [`HashTable`]: anything that can be viewed as a
/// mutable slice of buckets.
///
/// Implemented for owned storage (`Box<[Bucket<V>]>`, `Vec<Bucket<V>>`,
/// `[Bucket<V>; N]`) and for caller-owned storage (`&mut [Bucket<V>]`).
pub trait BucketStorage<V>: AsRef<[Bucket<V>]> + AsMut<[Bucket<V>]> {}

impl<V, T> BucketStorage<V> for T where T: AsRef<[Bucket<V>]> + AsMut<[Bucket<V>]> + ?Sized {}

/// Allocates `count` empty buckets, reporting failure according to
/// `fallibility`.
fn alloc_buckets<V>(
    count: usize,
    fallibility: Fallibility,
) -> Result<Box<[Bucket<V>]>, TryReserveError> {
    let layout =
        Layout::array::<Bucket<V>>(count).map_err(|_| fallibility.capacity_overflow())?;

    let mut buckets = Vec::new();
    buckets
        .try_reserve_exact(count)
        .map_err(|_| fallibility.alloc_err(layout))?;
    buckets.resize_with(count, || Bucket::Empty);

    Ok(buckets.into_boxed_slice())
}

/// Places `value` in the first free bucket of its probe sequence.
///
/// `buckets` must contain no tombstones and at least one empty bucket.
#[inline]
fn place<V, P: Probing>(buckets: &mut [Bucket<V>], hash: u64, value: V) {
    let mut seq = ProbeSeq::<P>::new(hash, buckets.len() - 1);
    while !buckets[seq.index()].is_free() {
        seq.advance();
    }
    buckets[seq.index()] = Bucket::Occupied { hash, value };
}

/// Back-shift deletion for linear probing without tombstones.
///
/// `vacancy` has just been emptied. Walk forward through the cluster and pull
/// every element whose probe path from home passes through the vacancy back
/// into it; the vacancy then moves to the bucket that element left. Stops at
/// the first empty bucket.
fn shift_back<V>(buckets: &mut [Bucket<V>], vacancy: usize, mask: usize) {
    let mut vacancy = vacancy;
    let mut pos = (vacancy + 1) & mask;

    while let Some(hash) = buckets[pos].hash() {
        let home = home(hash, mask);
        if vacancy.wrapping_sub(home) & mask < pos.wrapping_sub(home) & mask {
            buckets.swap(vacancy, pos);
            vacancy = pos;
        }
        pos = (pos + 1) & mask;
    }
}

/// Turns the run of tombstones ending just before `index` back into empty
/// buckets, returning how many were cleared. `index` must be empty.
fn collapse_tombstones<V>(buckets: &mut [Bucket<V>], index: usize, mask: usize) -> usize {
    let mut collapsed = 0;
    let mut pos = index.wrapping_sub(1) & mask;
    while buckets[pos].is_tombstone() {
        buckets[pos] = Bucket::Empty;
        collapsed += 1;
        pos = pos.wrapping_sub(1) & mask;
    }
    collapsed
}

/// Debug statistics for a [`HashTable`].
///
/// Available in tests or with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Probing strategy name
    pub probing: &'static str,
    /// Number of elements currently in the table
    pub populated: usize,
    /// Number of tombstones currently in the table
    pub tombstones: usize,
    /// Total number of buckets allocated
    pub total_buckets: usize,
    /// Load factor ((populated + tombstones) / total_buckets)
    pub load_factor: f64,
    /// Longest probe distance of any element from its home bucket
    pub max_probe: usize,
    /// Mean probe distance of the elements
    pub mean_probe: f64,
    /// Total memory in bytes used by the bucket array
    pub total_bytes: usize,
    /// Memory in bytes held by buckets without an element
    pub wasted_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ({}) ===", self.probing);
        println!(
            "Population: {} elements, {} tombstones in {} buckets ({:.2}% load factor)",
            self.populated,
            self.tombstones,
            self.total_buckets,
            self.load_factor * 100.0
        );
        println!(
            "Probe distance: max {}, mean {:.3}",
            self.max_probe, self.mean_probe
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

/// A fixed-capacity open-addressing hash table.
///
/// `HashTable<V, P, A>` stores values of type `V` in a power-of-two sized
/// array of [`Bucket`]s. Collisions are resolved inside the array using the
/// probing strategy `P` (see [`crate::probe`]). The table never grows on its
/// own; [`HashMap`](crate::HashMap) wraps it with a growth policy.
///
/// Like other raw tables, every operation takes the element's hash and an
/// equality predicate instead of requiring `V: Hash + Eq`.
///
/// The bucket array `A` is owned (`Box<[Bucket<V>]>` by default) or supplied
/// by the caller through [`from_buckets`](HashTable::from_buckets).
///
/// Inserting into a table with no free bucket is a contract violation and
/// panics.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use open_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table: HashTable<Person> = HashTable::with_capacity(64);
/// let hash = hash_id(123);
///
/// match table.entry(hash, |p: &Person| p.id == 123) {
///     open_hash::hash_table::Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     open_hash::hash_table::Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
/// assert_eq!(table.find(hash, |p| p.id == 123).map(|p| p.name.as_str()), Some("Alice"));
/// ```
pub struct HashTable<V, P = Linear, A = Box<[Bucket<V>]>> {
    buckets: A,
    len: usize,
    tombstones: usize,
    _marker: PhantomData<(fn() -> V, fn() -> P)>,
}

impl<V, P, A> Debug for HashTable<V, P, A>
where
    P: Probing,
    A: BucketStorage<V>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;
        use alloc::string::ToString;

        f.debug_struct("HashTable")
            .field("probing", &P::NAME)
            .field(
                "buckets",
                &self
                    .buckets
                    .as_ref()
                    .chunks(16)
                    .map(|w| {
                        w.iter()
                            .map(|b| match b {
                                Bucket::Empty => "..".to_string(),
                                Bucket::Tombstone => "xx".to_string(),
                                Bucket::Occupied { hash, .. } => format!("{:02x}", hash >> 56),
                            })
                            .collect::<Vec<String>>()
                            .join(", ")
                    })
                    .collect::<Vec<_>>(),
            )
            .field("len", &self.len)
            .field("tombstones", &self.tombstones)
            .field("bucket_count", &self.bucket_count())
            .finish()
    }
}

impl<V, P, A> Clone for HashTable<V, P, A>
where
    V: Clone,
    A: Clone,
{
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            len: self.len,
            tombstones: self.tombstones,
            _marker: PhantomData,
        }
    }
}

impl<V, P: Probing> Default for HashTable<V, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, P: Probing> HashTable<V, P> {
    /// Creates a table without any buckets. Lookups on it always miss and it
    /// cannot accept elements.
    pub fn new() -> Self {
        Self::from_buckets(Box::default())
    }

    /// Creates a table that holds up to `capacity` elements.
    ///
    /// The bucket count is `capacity` rounded up to a power of two (at least
    /// one bucket).
    ///
    /// # Panics
    ///
    /// Panics if the bucket count overflows. Aborts through
    /// [`handle_alloc_error`](alloc::alloc::handle_alloc_error) if the
    /// allocation fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use open_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_capacity(100);
    /// assert_eq!(table.bucket_count(), 128);
    /// assert!(table.is_empty());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::fallible_with_capacity(capacity, Fallibility::Infallible) {
            Ok(table) => table,
            Err(_) => unreachable!("infallible allocation returned an error"),
        }
    }

    /// Fallible version of [`with_capacity`](HashTable::with_capacity).
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Self::fallible_with_capacity(capacity, Fallibility::Fallible)
    }

    fn fallible_with_capacity(
        capacity: usize,
        fallibility: Fallibility,
    ) -> Result<Self, TryReserveError> {
        let count = capacity
            .checked_next_power_of_two()
            .ok_or_else(|| fallibility.capacity_overflow())?;
        Ok(Self::from_buckets(alloc_buckets(count, fallibility)?))
    }

    /// Replaces the bucket array with a new one of `bucket_count` buckets and
    /// reinserts every element into it, dropping all tombstones.
    ///
    /// The new array is allocated before anything moves, so on error the
    /// table is untouched.
    pub(crate) fn resize(
        &mut self,
        bucket_count: usize,
        fallibility: Fallibility,
    ) -> Result<(), TryReserveError> {
        debug_assert!(bucket_count == 0 || bucket_count.is_power_of_two());
        debug_assert!(bucket_count > self.len || (bucket_count == 0 && self.len == 0));

        let mut new_buckets = alloc_buckets::<V>(bucket_count, fallibility)?;
        if self.len > 0 {
            for bucket in self.buckets.iter_mut() {
                if let Some((hash, value)) = bucket.take(Bucket::Empty) {
                    place::<V, P>(&mut new_buckets, hash, value);
                }
            }
        }

        self.buckets = new_buckets;
        self.tombstones = 0;
        Ok(())
    }
}

impl<V, P, A> HashTable<V, P, A>
where
    P: Probing,
    A: BucketStorage<V>,
{
    /// Creates a table over the given bucket array.
    ///
    /// The array is normally all [`Bucket::Empty`]; an array previously
    /// returned by [`into_buckets`](HashTable::into_buckets) is also accepted
    /// and its elements remain reachable.
    ///
    /// # Panics
    ///
    /// Panics if the array length is neither zero nor a power of two, or if
    /// it contains tombstones and `P` is [`Linear`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use open_hash::Bucket;
    /// # use open_hash::hash_table::HashTable;
    /// # use open_hash::probe::Linear;
    /// #
    /// let mut storage: [Bucket<u32>; 8] = [const { Bucket::Empty }; 8];
    /// let mut table: HashTable<u32, Linear, _> = HashTable::from_buckets(&mut storage[..]);
    /// table.insert(5, 42, |&v| v == 42);
    /// drop(table);
    ///
    /// assert_eq!(storage[5].value(), Some(&42));
    /// ```
    pub fn from_buckets(buckets: A) -> Self {
        let slice = buckets.as_ref();
        assert!(
            slice.is_empty() || slice.len().is_power_of_two(),
            "bucket array length must be a power of two, got {}",
            slice.len()
        );

        let len = slice.iter().filter(|b| b.is_occupied()).count();
        let tombstones = slice.iter().filter(|b| b.is_tombstone()).count();
        assert!(
            P::TOMBSTONES || tombstones == 0,
            "{} probing does not support tombstones",
            P::NAME
        );

        Self {
            buckets,
            len,
            tombstones,
            _marker: PhantomData,
        }
    }

    /// Consumes the table, returning its bucket array.
    pub fn into_buckets(self) -> A {
        self.buckets
    }

    /// A read-only view of the bucket array.
    pub fn buckets(&self) -> &[Bucket<V>] {
        self.buckets.as_ref()
    }

    #[inline(always)]
    fn mask(&self) -> usize {
        self.bucket_count().wrapping_sub(1)
    }

    /// Returns the number of buckets.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.as_ref().len()
    }

    /// Returns the maximum number of elements the table can hold, which is
    /// its bucket count.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bucket_count()
    }

    /// Returns the number of elements in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of tombstones in the table.
    #[inline]
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Returns the number of buckets in use, occupied or tombstone.
    #[inline]
    pub fn load(&self) -> usize {
        self.len + self.tombstones
    }

    /// Returns the bucket index of the element matching `hash` and `eq`.
    ///
    /// The search stops at the first empty bucket and never inspects more
    /// than [`bucket_count`](HashTable::bucket_count) buckets.
    pub fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        if self.len == 0 {
            return None;
        }

        let buckets = self.buckets.as_ref();
        let mut seq = ProbeSeq::<P>::new(hash, self.mask());
        for _ in 0..buckets.len() {
            match &buckets[seq.index()] {
                Bucket::Empty => return None,
                Bucket::Occupied {
                    hash: stored,
                    value,
                } if *stored == hash && eq(value) => return Some(seq.index()),
                _ => {}
            }
            seq.advance();
        }

        None
    }

    /// Finds the element matching `hash` and `eq`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use open_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table: HashTable<u64> = HashTable::with_capacity(16);
    /// table.insert(hash_u64(7), 7, |&n| n == 7);
    ///
    /// assert_eq!(table.find(hash_u64(7), |&n| n == 7), Some(&7));
    /// assert_eq!(table.find(hash_u64(8), |&n| n == 8), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let index = self.find_index(hash, eq)?;
        self.buckets.as_ref()[index].value()
    }

    /// Finds the element matching `hash` and `eq`, returning a mutable
    /// reference.
    ///
    /// The part of the element that `eq` inspects must not be changed through
    /// the returned reference.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let index = self.find_index(hash, eq)?;
        self.buckets.as_mut()[index].value_mut()
    }

    /// Returns `true` if an element matches `hash` and `eq`.
    pub fn contains(&self, hash: u64, eq: impl Fn(&V) -> bool) -> bool {
        self.find_index(hash, eq).is_some()
    }

    /// Probes for `hash`, returning `Ok(index)` of a matching element or
    /// `Err(index)` of the bucket an insertion should claim: the first
    /// tombstone on the probe path, or else the empty bucket that ended it.
    fn find_or_find_insert_slot(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Result<usize, usize> {
        let buckets = self.buckets.as_ref();
        let mut first_tombstone = None;

        if !buckets.is_empty() {
            let mut seq = ProbeSeq::<P>::new(hash, self.mask());
            for _ in 0..buckets.len() {
                let index = seq.index();
                match &buckets[index] {
                    Bucket::Empty => return Err(first_tombstone.unwrap_or(index)),
                    Bucket::Tombstone => {
                        first_tombstone.get_or_insert(index);
                    }
                    Bucket::Occupied {
                        hash: stored,
                        value,
                    } => {
                        if *stored == hash && eq(value) {
                            return Ok(index);
                        }
                    }
                }
                seq.advance();
            }
        }

        match first_tombstone {
            Some(index) => Err(index),
            None => panic!(
                "hash table is full: {} elements in {} buckets",
                self.len,
                buckets.len()
            ),
        }
    }

    /// Gets the entry for the given hash and equality predicate.
    ///
    /// An [`Entry::Occupied`] refers to the existing matching element. An
    /// [`Entry::Vacant`] refers to the bucket the element would be placed in;
    /// nothing is inserted until [`VacantEntry::insert`] is called.
    ///
    /// # Panics
    ///
    /// Panics if no element matches and the table has no free bucket.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use open_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table: HashTable<String> = HashTable::with_capacity(16);
    /// let hash = hash_str("hello");
    ///
    /// match table.entry(hash, |s: &String| s == "hello") {
    ///     open_hash::hash_table::Entry::Vacant(entry) => {
    ///         entry.insert("hello".to_string());
    ///     }
    ///     open_hash::hash_table::Entry::Occupied(_) => unreachable!(),
    /// }
    ///
    /// let first = table.entry(hash, |s: &String| s == "hello").index();
    /// let again = table.entry(hash, |s: &String| s == "hello").index();
    /// assert_eq!(first, again);
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V, P, A> {
        match self.find_or_find_insert_slot(hash, eq) {
            Ok(index) => Entry::Occupied(OccupiedEntry { table: self, index }),
            Err(index) => Entry::Vacant(VacantEntry {
                table: self,
                index,
                hash,
            }),
        }
    }

    /// Inserts `value`, replacing and returning an existing element that
    /// matches `hash` and `eq`.
    ///
    /// # Panics
    ///
    /// Panics if no element matches and the table has no free bucket.
    pub fn insert(&mut self, hash: u64, value: V, eq: impl Fn(&V) -> bool) -> Option<V> {
        match self.entry(hash, eq) {
            Entry::Occupied(mut entry) => Some(core::mem::replace(entry.get_mut(), value)),
            Entry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Vacates the occupied bucket at `index`, handing its element to the
    /// caller.
    ///
    /// With [`Linear`] probing later elements of the cluster shift back to
    /// fill the gap. Otherwise the bucket becomes a tombstone, except that
    /// [`LinearTombstones`](crate::probe::LinearTombstones) empties it (along
    /// with the tombstones directly before it) when the next bucket is empty.
    ///
    /// # Panics
    ///
    /// Panics if the bucket at `index` holds no element.
    pub fn displace(&mut self, index: usize) -> V {
        let mask = self.mask();
        let buckets = self.buckets.as_mut();
        assert!(
            buckets.get(index).is_some_and(Bucket::is_occupied),
            "no element in bucket {index}"
        );

        let Some((_, value)) = buckets[index].take(Bucket::Empty) else {
            unreachable!("bucket {index} checked occupied")
        };
        self.len -= 1;

        if !P::TOMBSTONES {
            shift_back(buckets, index, mask);
        } else if P::LINEAR && buckets[(index + 1) & mask].is_empty() {
            self.tombstones -= collapse_tombstones(buckets, index, mask);
        } else {
            buckets[index] = Bucket::Tombstone;
            self.tombstones += 1;
        }

        value
    }

    /// Drops the element in the occupied bucket at `index`, then vacates the
    /// bucket as [`displace`](HashTable::displace) does.
    ///
    /// # Panics
    ///
    /// Panics if the bucket at `index` holds no element.
    pub fn remove(&mut self, index: usize) {
        drop(self.displace(index));
    }

    /// Removes the element matching `hash` and `eq` and returns it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use open_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table: HashTable<u64> = HashTable::with_capacity(10);
    /// table.entry(hash_u64(42), |&n| n == 42).or_insert(42);
    ///
    /// assert_eq!(table.take(hash_u64(42), |&n| n == 42), Some(42));
    /// assert!(table.is_empty());
    /// assert_eq!(table.take(hash_u64(99), |&n| n == 99), None);
    /// ```
    pub fn take(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let index = self.find_index(hash, eq)?;
        Some(self.displace(index))
    }

    /// Drops the element matching `hash` and `eq`. Returns `true` if an
    /// element was removed.
    pub fn remove_key(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> bool {
        match self.find_index(hash, eq) {
            Some(index) => {
                self.remove(index);
                true
            }
            None => false,
        }
    }

    /// Keeps only the elements for which `f` returns `true`. `f` is called
    /// exactly once per element.
    pub fn retain(&mut self, mut f: impl FnMut(&mut V) -> bool) {
        if self.len == 0 {
            return;
        }

        let count = self.bucket_count();
        let mask = self.mask();

        // Starting just after an empty bucket keeps back-shifted elements
        // inside the part of the array not yet visited.
        let start = match self.buckets.as_ref().iter().position(Bucket::is_empty) {
            Some(empty) => (empty + 1) & mask,
            None if P::TOMBSTONES => 0,
            None => return self.retain_full(f),
        };

        let mut index = start;
        let mut visited = 0;
        while visited < count {
            let keep = match self.buckets.as_mut()[index].value_mut() {
                Some(value) => f(value),
                None => true,
            };

            if keep {
                index = (index + 1) & mask;
                visited += 1;
            } else {
                self.remove(index);
            }
        }
    }

    /// `retain` for a linear table with every bucket occupied, where no
    /// visiting order is safe against back-shifting.
    #[cold]
    fn retain_full(&mut self, mut f: impl FnMut(&mut V) -> bool) {
        let mut kept = Vec::with_capacity(self.len);
        for bucket in self.buckets.as_mut() {
            if let Some((hash, mut value)) = bucket.take(Bucket::Empty) {
                if f(&mut value) {
                    kept.push((hash, value));
                }
            }
        }

        self.len = kept.len();
        let buckets = self.buckets.as_mut();
        for (hash, value) in kept {
            place::<V, P>(buckets, hash, value);
        }
    }

    /// Drops every element and empties every bucket, keeping the bucket
    /// array.
    ///
    /// Afterwards the table is indistinguishable from a freshly created one
    /// with the same bucket count.
    pub fn clear(&mut self) {
        if self.len == 0 && self.tombstones == 0 {
            return;
        }

        for bucket in self.buckets.as_mut() {
            *bucket = Bucket::Empty;
        }
        self.len = 0;
        self.tombstones = 0;
    }

    /// Moves every element out of the table, leaving it as a freshly created
    /// table with the same bucket count.
    ///
    /// Elements not consumed by the iterator are dropped when it is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use open_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table: HashTable<String> = HashTable::with_capacity(10);
    /// table
    ///     .entry(hash_str("a"), |s: &String| s == "a")
    ///     .or_insert("a".to_string());
    /// table
    ///     .entry(hash_str("b"), |s: &String| s == "b")
    ///     .or_insert("b".to_string());
    ///
    /// let values: Vec<String> = table.drain().collect();
    /// assert!(table.is_empty());
    /// assert_eq!(values.len(), 2);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V> {
        let mut values = Vec::with_capacity(self.len);
        for bucket in self.buckets.as_mut() {
            if let Some((_, value)) = bucket.take(Bucket::Empty) {
                values.push(value);
            }
        }
        self.len = 0;
        self.tombstones = 0;
        Drain {
            inner: values.into_iter(),
            _table: PhantomData,
        }
    }

    /// An iterator over the elements in bucket order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.buckets.as_ref().iter(),
            remaining: self.len,
        }
    }

    /// A mutable iterator over the elements in bucket order.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            inner: self.buckets.as_mut().iter_mut(),
            remaining: self.len,
        }
    }

    /// Index of the first occupied bucket.
    pub fn first(&self) -> Option<usize> {
        self.buckets.as_ref().iter().position(Bucket::is_occupied)
    }

    /// Index of the last occupied bucket.
    pub fn last(&self) -> Option<usize> {
        self.buckets.as_ref().iter().rposition(Bucket::is_occupied)
    }

    /// Index of the first occupied bucket after `index`.
    pub fn next_index(&self, index: usize) -> Option<usize> {
        let start = index.checked_add(1)?;
        self.buckets
            .as_ref()
            .get(start..)?
            .iter()
            .position(Bucket::is_occupied)
            .map(|offset| start + offset)
    }

    /// Index of the last occupied bucket before `index`.
    pub fn previous_index(&self, index: usize) -> Option<usize> {
        let buckets = self.buckets.as_ref();
        buckets[..index.min(buckets.len())]
            .iter()
            .rposition(Bucket::is_occupied)
    }

    /// The element in bucket `index`, if it is occupied.
    pub fn get(&self, index: usize) -> Option<&V> {
        self.buckets.as_ref().get(index).and_then(Bucket::value)
    }

    /// The element in bucket `index`, if it is occupied.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut V> {
        self.buckets
            .as_mut()
            .get_mut(index)
            .and_then(Bucket::value_mut)
    }

    /// Number of advances from the home bucket of the element in bucket
    /// `index` to `index` itself.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_distance(&self, index: usize) -> Option<usize> {
        let hash = self.buckets.as_ref().get(index)?.hash()?;
        let mut seq = ProbeSeq::<P>::new(hash, self.mask());
        while seq.index() != index {
            seq.advance();
        }
        Some(seq.probe())
    }

    /// Computes a histogram of probe distances for the current table state.
    ///
    /// Entry `i` of the result counts elements stored `i` advances away from
    /// their home bucket. The histogram is empty for an empty table.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> Vec<usize> {
        let mut hist = Vec::new();
        for index in 0..self.bucket_count() {
            if let Some(distance) = self.probe_distance(index) {
                if hist.len() <= distance {
                    hist.resize(distance + 1, 0);
                }
                hist[distance] += 1;
            }
        }
        hist
    }

    /// Returns detailed utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let hist = self.probe_histogram();
        let total_probe: usize = hist.iter().enumerate().map(|(d, n)| d * n).sum();
        let total_buckets = self.bucket_count();
        let bucket_size = core::mem::size_of::<Bucket<V>>();

        DebugStats {
            probing: P::NAME,
            populated: self.len,
            tombstones: self.tombstones,
            total_buckets,
            load_factor: if total_buckets == 0 {
                0.0
            } else {
                self.load() as f64 / total_buckets as f64
            },
            max_probe: hist.len().saturating_sub(1),
            mean_probe: if self.len == 0 {
                0.0
            } else {
                total_probe as f64 / self.len as f64
            },
            total_bytes: total_buckets * bucket_size,
            wasted_bytes: (total_buckets - self.len) * bucket_size,
        }
    }

    /// Pretty-prints the probe-distance histogram horizontally using stdout.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_probe_histogram(&self) {
        let hist = self.probe_histogram();
        let max = hist.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries, {}):", self.len, P::NAME);

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            match units % 8 {
                0 => {}
                1 => bar.push('▏'),
                2 => bar.push('▎'),
                3 => bar.push('▍'),
                4 => bar.push('▌'),
                5 => bar.push('▋'),
                6 => bar.push('▊'),
                _ => bar.push('▉'),
            }
            bar
        };

        for (distance, &count) in hist.iter().enumerate() {
            println!("{:>3} | {} ({})", distance, make_bar(count), count);
        }
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
///
/// # Examples
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use open_hash::hash_table::Entry;
/// # use open_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # fn hash_str(s: &str) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     s.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table: HashTable<String> = HashTable::with_capacity(10);
/// let hash = hash_str("key");
///
/// match table.entry(hash, |s: &String| s == "key") {
///     Entry::Vacant(entry) => {
///         entry.insert("value".to_string());
///     }
///     Entry::Occupied(entry) => {
///         println!("Key already exists with value: {}", entry.get());
///     }
/// }
/// ```
pub enum Entry<'a, V, P = Linear, A = Box<[Bucket<V>]>> {
    /// A vacant entry - no element matches
    Vacant(VacantEntry<'a, V, P, A>),
    /// An occupied entry - a matching element is present
    Occupied(OccupiedEntry<'a, V, P, A>),
}

impl<'a, V, P, A> Entry<'a, V, P, A>
where
    P: Probing,
    A: BucketStorage<V>,
{
    /// Index of the bucket this entry refers to.
    pub fn index(&self) -> usize {
        match self {
            Entry::Vacant(entry) => entry.index,
            Entry::Occupied(entry) => entry.index,
        }
    }

    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the element.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the element.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Modifies the element in place if the entry is occupied.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            vacant => vacant,
        }
    }
}

impl<'a, V, P, A> Entry<'a, V, P, A>
where
    V: Default,
    P: Probing,
    A: BucketStorage<V>,
{
    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference to the element.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(V::default)
    }
}

/// A view into a vacant entry in a [`HashTable`].
///
/// Refers to the bucket an insertion will claim: the first tombstone on the
/// probe path, or the empty bucket that ended it.
pub struct VacantEntry<'a, V, P = Linear, A = Box<[Bucket<V>]>> {
    table: &'a mut HashTable<V, P, A>,
    index: usize,
    hash: u64,
}

impl<'a, V, P, A> VacantEntry<'a, V, P, A>
where
    P: Probing,
    A: BucketStorage<V>,
{
    /// Index of the bucket the element will be placed in.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The hash the element will be stored with.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Inserts `value` into the entry's bucket and returns a mutable
    /// reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        let table = self.table;
        let bucket = &mut table.buckets.as_mut()[self.index];
        if bucket.is_tombstone() {
            table.tombstones -= 1;
        }
        table.len += 1;

        *bucket = Bucket::Occupied {
            hash: self.hash,
            value,
        };
        match bucket.value_mut() {
            Some(value) => value,
            None => unreachable!("bucket was just filled"),
        }
    }
}

/// A view into an occupied entry in a [`HashTable`].
pub struct OccupiedEntry<'a, V, P = Linear, A = Box<[Bucket<V>]>> {
    table: &'a mut HashTable<V, P, A>,
    index: usize,
}

impl<'a, V, P, A> OccupiedEntry<'a, V, P, A>
where
    P: Probing,
    A: BucketStorage<V>,
{
    /// Index of the bucket holding the element.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Gets a reference to the element.
    pub fn get(&self) -> &V {
        match self.table.buckets.as_ref()[self.index].value() {
            Some(value) => value,
            None => unreachable!("occupied entry refers to a free bucket"),
        }
    }

    /// Gets a mutable reference to the element.
    pub fn get_mut(&mut self) -> &mut V {
        match self.table.buckets.as_mut()[self.index].value_mut() {
            Some(value) => value,
            None => unreachable!("occupied entry refers to a free bucket"),
        }
    }

    /// Converts the entry into a mutable reference to the element.
    pub fn into_mut(self) -> &'a mut V {
        let table = self.table;
        match table.buckets.as_mut()[self.index].value_mut() {
            Some(value) => value,
            None => unreachable!("occupied entry refers to a free bucket"),
        }
    }

    /// Removes the element from the table and returns it.
    pub fn remove(self) -> V {
        self.table.displace(self.index)
    }
}

/// An iterator over the elements of a [`HashTable`] in bucket order.
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, V> {
    inner: core::slice::Iter<'a, Bucket<V>>,
    remaining: usize,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.inner.by_ref().find_map(Bucket::value)?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.inner.by_ref().rev().find_map(Bucket::value)?;
        self.remaining -= 1;
        Some(value)
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> FusedIterator for Iter<'_, V> {}

/// A mutable iterator over the elements of a [`HashTable`] in bucket order.
pub struct IterMut<'a, V> {
    inner: core::slice::IterMut<'a, Bucket<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.inner.by_ref().find_map(Bucket::value_mut)?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for IterMut<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.inner.by_ref().rev().find_map(Bucket::value_mut)?;
        self.remaining -= 1;
        Some(value)
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}
impl<V> FusedIterator for IterMut<'_, V> {}

/// A draining iterator over the elements of a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`]. The table
/// is already empty when it is handed out; elements the iterator does not
/// yield are dropped with it.
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, V> {
    inner: alloc::vec::IntoIter<V>,
    _table: PhantomData<&'a mut V>,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}
impl<V> FusedIterator for Drain<'_, V> {}

/// An owning iterator over the elements of a [`HashTable`].
pub struct IntoIter<V> {
    inner: alloc::vec::IntoIter<Bucket<V>>,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let (_, value) = self
            .inner
            .by_ref()
            .find_map(|mut bucket| bucket.take(Bucket::Empty))?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}
impl<V> FusedIterator for IntoIter<V> {}

impl<V, P: Probing> IntoIterator for HashTable<V, P> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.len,
            inner: self.buckets.into_vec().into_iter(),
        }
    }
}

impl<'a, V, P, A> IntoIterator for &'a HashTable<V, P, A>
where
    P: Probing,
    A: BucketStorage<V>,
{
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
