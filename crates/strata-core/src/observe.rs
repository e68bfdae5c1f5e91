//! Lifecycle instrumentation hook.
//!
//! Every container is generic over an [`Observer`] that is told about
//! container-level lifecycle events: creation, copies, moves, buffer
//! reallocation, block traffic and destruction. The default
//! [`NoopObserver`] is zero-sized and compiles away. Observers see events;
//! they never influence container behaviour.

use std::fmt;

/// Which container emitted an [`Event`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// The contiguous dynamic array.
    DynArray,
    /// The block-indexed chunked deque.
    ChunkedDeque,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DynArray => write!(f, "dyn_array"),
            Self::ChunkedDeque => write!(f, "chunked_deque"),
        }
    }
}

/// Discriminant of an [`Event`], usable as a map key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// See [`Event::Created`].
    Created,
    /// See [`Event::Cloned`].
    Cloned,
    /// See [`Event::Taken`].
    Taken,
    /// See [`Event::CloneAssigned`].
    CloneAssigned,
    /// See [`Event::MoveAssigned`].
    MoveAssigned,
    /// See [`Event::Dropped`].
    Dropped,
    /// See [`Event::Reallocated`].
    Reallocated,
    /// See [`Event::BlockAllocated`].
    BlockAllocated,
    /// See [`Event::BlockReleased`].
    BlockReleased,
    /// See [`Event::DirectoryResized`].
    DirectoryResized,
    /// See [`Event::Inserted`].
    Inserted,
}

/// A container lifecycle event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// A container was constructed holding `len` elements.
    Created {
        /// Emitting container.
        container: ContainerKind,
        /// Initial element count.
        len: usize,
    },
    /// A container was produced by copying another.
    Cloned {
        /// Emitting container.
        container: ContainerKind,
        /// Element count of the copy.
        len: usize,
    },
    /// A container took ownership of another's storage, leaving it empty.
    Taken {
        /// Emitting container.
        container: ContainerKind,
        /// Element count transferred.
        len: usize,
    },
    /// Contents were replaced by an element-wise copy of another container.
    CloneAssigned {
        /// Emitting container.
        container: ContainerKind,
        /// Element count after assignment.
        len: usize,
    },
    /// Contents were replaced by another container's storage.
    MoveAssigned {
        /// Emitting container.
        container: ContainerKind,
        /// Element count after assignment.
        len: usize,
    },
    /// A container released its storage.
    Dropped {
        /// Emitting container.
        container: ContainerKind,
        /// Live elements destroyed with it.
        len: usize,
    },
    /// The contiguous buffer moved to a new allocation.
    Reallocated {
        /// Emitting container.
        container: ContainerKind,
        /// Capacity before.
        from: usize,
        /// Capacity after.
        to: usize,
    },
    /// A deque block was allocated for directory slot `slot`.
    BlockAllocated {
        /// Directory slot receiving the block.
        slot: usize,
    },
    /// The deque block in directory slot `slot` was released.
    BlockReleased {
        /// Directory slot that held the block.
        slot: usize,
    },
    /// The deque directory was rebuilt with a different slot count.
    DirectoryResized {
        /// Slot count before.
        from: usize,
        /// Slot count after.
        to: usize,
    },
    /// `count` elements were inserted before `position`.
    Inserted {
        /// Emitting container.
        container: ContainerKind,
        /// Index of the first inserted element.
        position: usize,
        /// Number of inserted elements.
        count: usize,
    },
}

impl Event {
    /// The discriminant of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Created { .. } => EventKind::Created,
            Self::Cloned { .. } => EventKind::Cloned,
            Self::Taken { .. } => EventKind::Taken,
            Self::CloneAssigned { .. } => EventKind::CloneAssigned,
            Self::MoveAssigned { .. } => EventKind::MoveAssigned,
            Self::Dropped { .. } => EventKind::Dropped,
            Self::Reallocated { .. } => EventKind::Reallocated,
            Self::BlockAllocated { .. } => EventKind::BlockAllocated,
            Self::BlockReleased { .. } => EventKind::BlockReleased,
            Self::DirectoryResized { .. } => EventKind::DirectoryResized,
            Self::Inserted { .. } => EventKind::Inserted,
        }
    }

    /// The container that emitted this event.
    pub fn container(&self) -> ContainerKind {
        match self {
            Self::Created { container, .. }
            | Self::Cloned { container, .. }
            | Self::Taken { container, .. }
            | Self::CloneAssigned { container, .. }
            | Self::MoveAssigned { container, .. }
            | Self::Dropped { container, .. }
            | Self::Reallocated { container, .. }
            | Self::Inserted { container, .. } => *container,
            Self::BlockAllocated { .. }
            | Self::BlockReleased { .. }
            | Self::DirectoryResized { .. } => ContainerKind::ChunkedDeque,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let container = self.container();
        match self {
            Self::Created { len, .. } => write!(f, "{container}: created (len={len})"),
            Self::Cloned { len, .. } => write!(f, "{container}: cloned (len={len})"),
            Self::Taken { len, .. } => write!(f, "{container}: taken (len={len})"),
            Self::CloneAssigned { len, .. } => {
                write!(f, "{container}: clone-assigned (len={len})")
            }
            Self::MoveAssigned { len, .. } => {
                write!(f, "{container}: move-assigned (len={len})")
            }
            Self::Dropped { len, .. } => write!(f, "{container}: dropped (len={len})"),
            Self::Reallocated { from, to, .. } => {
                write!(f, "{container}: reallocated capacity {from} -> {to}")
            }
            Self::BlockAllocated { slot } => write!(f, "{container}: block allocated at slot {slot}"),
            Self::BlockReleased { slot } => write!(f, "{container}: block released at slot {slot}"),
            Self::DirectoryResized { from, to } => {
                write!(f, "{container}: directory resized {from} -> {to} slots")
            }
            Self::Inserted {
                position, count, ..
            } => write!(f, "{container}: inserted {count} at {position}"),
        }
    }
}

/// Receives container lifecycle events.
///
/// Implementations must not assume they are called a particular number of
/// times per operation; only the event stream's contents are meaningful.
pub trait Observer {
    /// Called once per lifecycle event.
    fn observe(&self, event: Event);
}

impl<O: Observer + ?Sized> Observer for &O {
    fn observe(&self, event: Event) {
        (**self).observe(event);
    }
}

/// Observer that ignores every event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    #[inline(always)]
    fn observe(&self, _event: Event) {}
}

/// Observer that forwards every event to the `log` facade.
///
/// Events are emitted under the `strata` target at the configured level
/// (default [`log::Level::Trace`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogObserver {
    level: log::Level,
}

impl LogObserver {
    /// Log target used for every event.
    pub const TARGET: &'static str = "strata";

    /// Create an observer logging at `level`.
    pub fn new(level: log::Level) -> Self {
        Self { level }
    }

    /// The level events are logged at.
    pub fn level(&self) -> log::Level {
        self.level
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new(log::Level::Trace)
    }
}

impl Observer for LogObserver {
    fn observe(&self, event: Event) {
        log::log!(target: Self::TARGET, self.level, "{event}");
    }
}
