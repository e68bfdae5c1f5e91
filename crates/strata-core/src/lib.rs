//! Core types for the Strata container library.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! pieces shared by both containers: the error taxonomy, the lifecycle
//! observer hook, and the chunked deque's block configuration.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod observe;

// Public re-exports for the primary API surface.
pub use config::DequeConfig;
pub use error::{ConfigError, ContainerError};
pub use observe::{ContainerKind, Event, EventKind, LogObserver, NoopObserver, Observer};
