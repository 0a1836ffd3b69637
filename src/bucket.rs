/// A single bucket of an open-addressing table.
///
/// Buckets move from `Empty` to `Occupied` on insertion and from `Occupied`
/// to either `Tombstone` or `Empty` on removal, depending on the probing
/// strategy. A tombstone keeps probe chains that pass through a removed
/// element intact; it counts toward the table's load but holds no element.
///
/// The full hash supplied at insertion is kept next to the element so the
/// table can relocate elements (back-shifting, rehashing) without calling
/// back into user hashing.
///
/// Caller-supplied storage for [`HashTable::from_buckets`] is normally
/// created with every bucket `Empty`:
///
/// ```rust
/// use open_hash::Bucket;
///
/// let buckets: [Bucket<u32>; 8] = [const { Bucket::Empty }; 8];
/// assert!(buckets.iter().all(Bucket::is_empty));
/// ```
///
/// [`HashTable::from_buckets`]: crate::HashTable::from_buckets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Bucket<V> {
    /// Never used since the last clear.
    #[default]
    Empty,
    /// Held an element that has since been removed.
    Tombstone,
    /// Holds an element.
    Occupied {
        /// The hash the element was inserted with.
        hash: u64,
        /// The element.
        value: V,
    },
}

impl<V> Bucket<V> {
    /// Returns `true` if the bucket has never held an element since the last
    /// clear.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        matches!(self, Bucket::Empty)
    }

    /// Returns `true` if the bucket is a tombstone.
    #[inline(always)]
    pub fn is_tombstone(&self) -> bool {
        matches!(self, Bucket::Tombstone)
    }

    /// Returns `true` if the bucket holds an element.
    #[inline(always)]
    pub fn is_occupied(&self) -> bool {
        matches!(self, Bucket::Occupied { .. })
    }

    /// Returns `true` if the bucket is occupied or a tombstone.
    #[inline(always)]
    pub fn is_in_use(&self) -> bool {
        !self.is_empty()
    }

    /// Returns `true` if an insertion may claim this bucket.
    #[inline(always)]
    pub(crate) fn is_free(&self) -> bool {
        !self.is_occupied()
    }

    /// The stored hash, if occupied.
    #[inline(always)]
    pub fn hash(&self) -> Option<u64> {
        match self {
            Bucket::Occupied { hash, .. } => Some(*hash),
            _ => None,
        }
    }

    /// A reference to the element, if occupied.
    #[inline(always)]
    pub fn value(&self) -> Option<&V> {
        match self {
            Bucket::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    /// A mutable reference to the element, if occupied.
    #[inline(always)]
    pub fn value_mut(&mut self) -> Option<&mut V> {
        match self {
            Bucket::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Replaces the bucket with `replacement`, returning the element it held
    /// along with its hash.
    #[inline(always)]
    pub(crate) fn take(&mut self, replacement: Bucket<V>) -> Option<(u64, V)> {
        match core::mem::replace(self, replacement) {
            Bucket::Occupied { hash, value } => Some((hash, value)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let empty: Bucket<u8> = Bucket::Empty;
        let tomb: Bucket<u8> = Bucket::Tombstone;
        let full = Bucket::Occupied { hash: 7, value: 1u8 };

        assert!(empty.is_empty() && !empty.is_in_use() && !empty.is_occupied());
        assert!(tomb.is_tombstone() && tomb.is_in_use() && !tomb.is_occupied());
        assert!(full.is_occupied() && full.is_in_use() && !full.is_tombstone());

        assert!(empty.is_free() && tomb.is_free() && !full.is_free());
    }

    #[test]
    fn accessors() {
        let mut bucket = Bucket::Occupied {
            hash: 0xABCD,
            value: 5i32,
        };
        assert_eq!(bucket.hash(), Some(0xABCD));
        assert_eq!(bucket.value(), Some(&5));
        *bucket.value_mut().unwrap() += 1;

        assert_eq!(bucket.take(Bucket::Tombstone), Some((0xABCD, 6)));
        assert!(bucket.is_tombstone());
        assert_eq!(bucket.hash(), None);
        assert_eq!(bucket.take(Bucket::Empty), None);
        assert!(bucket.is_empty());
    }

    #[test]
    fn default_is_empty() {
        assert!(Bucket::<u64>::default().is_empty());
    }
}
