use core::alloc::Layout;
use core::fmt;

use alloc::alloc::handle_alloc_error;

/// The error type for `try_reserve` and the other fallible growth methods of
/// [`HashMap`](crate::HashMap) and [`HashTable`](crate::HashTable).
///
/// When one of these methods returns an error the collection is left exactly
/// as it was before the call.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TryReserveError {
    /// The requested bucket count does not fit in a `usize`, or the bucket
    /// array layout would exceed `isize::MAX` bytes.
    CapacityOverflow,

    /// The memory allocator returned an error.
    AllocError {
        /// The layout of the allocation request that failed.
        layout: Layout,
    },
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryReserveError::CapacityOverflow => {
                f.write_str("capacity overflow while reserving hash table buckets")
            }
            TryReserveError::AllocError { layout } => write!(
                f,
                "memory allocation of {} bytes failed while reserving hash table buckets",
                layout.size()
            ),
        }
    }
}

impl core::error::Error for TryReserveError {}

/// Whether a growth failure should be reported to the caller or treated as
/// fatal.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Fallibility {
    Fallible,
    Infallible,
}

impl Fallibility {
    /// Error to return on capacity overflow.
    #[inline]
    pub(crate) fn capacity_overflow(self) -> TryReserveError {
        match self {
            Fallibility::Fallible => TryReserveError::CapacityOverflow,
            Fallibility::Infallible => panic!("hash table capacity overflow"),
        }
    }

    /// Error to return on allocation error.
    #[inline]
    pub(crate) fn alloc_err(self, layout: Layout) -> TryReserveError {
        match self {
            Fallibility::Fallible => TryReserveError::AllocError { layout },
            Fallibility::Infallible => handle_alloc_error(layout),
        }
    }
}
