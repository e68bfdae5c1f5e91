//! Raw memory substrate for Strata containers.
//!
//! Provides [`RawBuf`], a typed but uninitialised buffer. Both the dynamic
//! array and the chunked deque place values into `RawBuf` slots by hand
//! and track which slots are live themselves. This crate is the only one
//! in the workspace that calls the global allocator directly.
//!
//! # Layering
//!
//! ```text
//! DynArray<T>            ChunkedDeque<T>
//! └── RawBuf<T>          ├── directory: Vec<RawBuf<T>>
//!                        └── start/end BlockCursor
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod raw;

pub use raw::{alloc_failed, RawBuf};
