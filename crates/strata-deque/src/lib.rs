//! Block-indexed double-ended sequence for Strata.
//!
//! [`ChunkedDeque`] keeps values in a directory of fixed-capacity raw
//! blocks and never relocates a value once it is constructed. Positions
//! are [`BlockCursor`]s: (block, offset) pairs whose arithmetic crosses
//! block boundaries transparently, so they behave like flat pointers for
//! offsetting, comparison and distance.
//!
//! ```
//! use strata_deque::{chunked_deque, ChunkedDeque};
//!
//! let mut d: ChunkedDeque<i32> = chunked_deque![7; 2000];
//! assert_eq!(d.block_capacity(), 128);
//! assert_eq!(d.map_size(), 16);
//! assert_eq!(*d.at(1500).unwrap(), 7);
//!
//! d.push_back(8).unwrap();
//! let last = d.end() - 1;
//! assert_eq!(d[last], 8);
//! assert_eq!(d.end() - d.begin(), 2001);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod cursor;
pub mod deque;
mod directory;
pub mod iter;

pub use cursor::BlockCursor;
pub use deque::ChunkedDeque;
pub use iter::{IntoIter, Iter, IterMut};

#[doc(hidden)]
pub use strata_raw::alloc_failed as __alloc_failed;

/// Build a [`ChunkedDeque`] from a literal sequence.
///
/// `chunked_deque![a, b, c]` holds the listed values in order;
/// `chunked_deque![value; n]` holds `n` clones of `value`. Either way the
/// directory is sized for the element count up front.
#[macro_export]
macro_rules! chunked_deque {
    () => {
        $crate::ChunkedDeque::new()
    };
    ($value:expr; $count:expr) => {
        $crate::ChunkedDeque::from_elem($count, &$value)
            .unwrap_or_else(|err| $crate::__alloc_failed(err))
    };
    ($($value:expr),+ $(,)?) => {
        $crate::ChunkedDeque::from([$($value),+])
    };
}
