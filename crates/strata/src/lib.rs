//! Strata: sequence containers over manually managed raw memory.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Strata sub-crates. For most users, adding `strata` as a single
//! dependency is sufficient.
//!
//! Two storage strategies are offered:
//!
//! - [`DynArray`](prelude::DynArray): one contiguous buffer, grown by
//!   relocation, addressed with a flat [`Cursor`](prelude::Cursor).
//! - [`ChunkedDeque`](prelude::ChunkedDeque): a directory of
//!   fixed-capacity blocks that never relocates values, addressed with a
//!   (block, offset) [`BlockCursor`](prelude::BlockCursor).
//!
//! # Quick start
//!
//! ```rust
//! use strata::prelude::*;
//!
//! let mut a: DynArray<i32> = dyn_array![1, 2, 3];
//! a.insert(a.begin() + 1, 99)?;
//! assert_eq!(a.as_slice(), &[1, 99, 2, 3]);
//!
//! let d = ChunkedDeque::from_elem(2000, &7)?;
//! assert_eq!(d.map_size(), 16);
//! assert_eq!(*d.at(1500)?, 7);
//! assert!(matches!(d.at(2000), Err(ContainerError::OutOfRange { .. })));
//! # Ok::<(), ContainerError>(())
//! ```
//!
//! # Observing lifecycle events
//!
//! Every container takes an optional [`Observer`](prelude::Observer).
//! [`LogObserver`](prelude::LogObserver) forwards events to the `log`
//! facade; the default [`NoopObserver`](prelude::NoopObserver) compiles
//! away.
//!
//! ```rust
//! use strata::prelude::*;
//!
//! let mut a = DynArray::new_in(LogObserver::default());
//! a.push_back("traced")?;
//! # Ok::<(), ContainerError>(())
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strata-core` | Errors, observer hook, deque configuration |
//! | [`raw`] | `strata-raw` | Uninitialised typed buffers |
//! | [`array`] | `strata-array` | Contiguous dynamic array and its cursor |
//! | [`deque`] | `strata-deque` | Chunked deque, block cursor, iterators |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Errors, the observer hook, and deque configuration (`strata-core`).
pub use strata_core as types;

/// Uninitialised typed buffers (`strata-raw`).
///
/// Only needed when building new containers on the same substrate.
pub use strata_raw as raw;

/// The contiguous dynamic array (`strata-array`).
pub use strata_array as array;

/// The block-indexed chunked deque (`strata-deque`).
///
/// Includes the deque's [`deque::Iter`], [`deque::IterMut`] and
/// [`deque::IntoIter`] iterators.
pub use strata_deque as deque;

pub use strata_array::dyn_array;
pub use strata_deque::chunked_deque;

/// Common imports for typical Strata usage.
///
/// ```rust
/// use strata::prelude::*;
/// ```
pub mod prelude {
    // Containers and their cursors
    pub use strata_array::{Cursor, DynArray};
    pub use strata_deque::{BlockCursor, ChunkedDeque};

    // Literal constructors
    pub use strata_array::dyn_array;
    pub use strata_deque::chunked_deque;

    // Errors and configuration
    pub use strata_core::{ConfigError, ContainerError, DequeConfig};

    // Observation
    pub use strata_core::{Event, EventKind, LogObserver, NoopObserver, Observer};
}
