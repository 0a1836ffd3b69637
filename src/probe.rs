//! Probe sequences for open addressing.
//!
//! A probing strategy maps `(hash, probe count, bucket count)` to the next
//! bucket to inspect. Every strategy here visits each bucket of a
//! power-of-two sized array exactly once within the first `bucket_count`
//! positions of its sequence, so a lookup bounded to that many probes always
//! terminates and an insertion finds a free bucket whenever one exists.
//!
//! Strategies are zero-sized marker types chosen through a type parameter on
//! [`HashTable`](crate::HashTable) and [`HashMap`](crate::HashMap).

use core::marker::PhantomData;

mod sealed {
    pub trait Sealed {}
}

/// A probing strategy. Implemented by [`Linear`], [`LinearTombstones`],
/// [`Quadratic`] and [`DoubleHashing`].
///
/// The trait is sealed: back-shift deletion is only correct for a unit step,
/// and the remaining strategies must cover every bucket of a power-of-two
/// array, so only the combinations below exist.
pub trait Probing: sealed::Sealed + Copy + Default + Send + Sync + 'static {
    /// `true` if the sequence advances one bucket at a time.
    const LINEAR: bool;

    /// `true` if removal leaves tombstones behind instead of shifting later
    /// elements back.
    const TOMBSTONES: bool;

    /// Human-readable name, used by statistics output.
    const NAME: &'static str;

    /// Distance from the current bucket to the next one on the `probe`th
    /// advance, where the first advance away from the home bucket is probe
    /// `1`. The result is reduced modulo the bucket count by the caller.
    fn step(hash: u64, probe: usize) -> usize;
}

/// Linear probing with back-shift deletion. Tables using this strategy never
/// contain tombstones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Linear;

/// Linear probing with tombstone deletion. Runs of tombstones that end at an
/// empty bucket are collapsed back into empty buckets on removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinearTombstones;

/// Quadratic probing using triangular offsets from the home bucket
/// (`+1, +3, +6, +10, ...`), which covers every bucket of a power-of-two
/// array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quadratic;

/// Double hashing. The stride is taken from the upper half of the hash and
/// forced odd, which makes it coprime with every power-of-two bucket count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoubleHashing;

impl sealed::Sealed for Linear {}
impl sealed::Sealed for LinearTombstones {}
impl sealed::Sealed for Quadratic {}
impl sealed::Sealed for DoubleHashing {}

impl Probing for Linear {
    const LINEAR: bool = true;
    const TOMBSTONES: bool = false;
    const NAME: &'static str = "linear";

    #[inline(always)]
    fn step(_hash: u64, _probe: usize) -> usize {
        1
    }
}

impl Probing for LinearTombstones {
    const LINEAR: bool = true;
    const TOMBSTONES: bool = true;
    const NAME: &'static str = "linear-tombstones";

    #[inline(always)]
    fn step(_hash: u64, _probe: usize) -> usize {
        1
    }
}

impl Probing for Quadratic {
    const LINEAR: bool = false;
    const TOMBSTONES: bool = true;
    const NAME: &'static str = "quadratic";

    #[inline(always)]
    fn step(_hash: u64, probe: usize) -> usize {
        probe
    }
}

impl Probing for DoubleHashing {
    const LINEAR: bool = false;
    const TOMBSTONES: bool = true;
    const NAME: &'static str = "double-hashing";

    #[inline(always)]
    fn step(hash: u64, _probe: usize) -> usize {
        ((hash >> 32) as usize) | 1
    }
}

/// Home bucket of `hash` in an array of `mask + 1` buckets.
#[inline(always)]
pub(crate) fn home(hash: u64, mask: usize) -> usize {
    hash as usize & mask
}

/// A cursor over the probe sequence of a single hash.
///
/// ```rust
/// use open_hash::probe::ProbeSeq;
/// use open_hash::probe::Quadratic;
///
/// let mut seq = ProbeSeq::<Quadratic>::new(2, 7);
/// assert_eq!(seq.index(), 2);
/// seq.advance();
/// assert_eq!(seq.index(), 3);
/// seq.advance();
/// assert_eq!(seq.index(), 5);
/// seq.advance();
/// assert_eq!(seq.index(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct ProbeSeq<P> {
    hash: u64,
    index: usize,
    probe: usize,
    mask: usize,
    _probing: PhantomData<P>,
}

impl<P: Probing> ProbeSeq<P> {
    /// Starts the sequence at the home bucket of `hash` in an array of
    /// `mask + 1` buckets.
    #[inline(always)]
    pub fn new(hash: u64, mask: usize) -> Self {
        Self {
            hash,
            index: home(hash, mask),
            probe: 0,
            mask,
            _probing: PhantomData,
        }
    }

    /// The bucket the cursor currently points at.
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of advances made since the home bucket.
    #[inline(always)]
    pub fn probe(&self) -> usize {
        self.probe
    }

    /// Moves to the next bucket of the sequence.
    #[inline(always)]
    pub fn advance(&mut self) {
        self.probe += 1;
        self.index = self.index.wrapping_add(P::step(self.hash, self.probe)) & self.mask;
    }
}
