//! The block directory: an ordered table of equally sized raw blocks.
//!
//! The directory owns memory only. Which slots hold live values is the
//! deque's business, so every operation that could release a block
//! requires the caller to have emptied it first.

use std::collections::TryReserveError;
use std::mem;

use strata_core::{ContainerError, Event, Observer};
use strata_raw::RawBuf;

use crate::cursor::BlockCursor;

/// Directory of blocks, each holding `block_capacity` slots.
///
/// Every entry refers to an allocated block; there are no holes.
pub(crate) struct Directory<T> {
    blocks: Vec<RawBuf<T>>,
    block_capacity: usize,
}

impl<T> Directory<T> {
    /// An empty directory. Does not allocate.
    pub(crate) fn new(block_capacity: usize) -> Self {
        debug_assert!(block_capacity > 0);
        Self {
            blocks: Vec::new(),
            block_capacity,
        }
    }

    /// A directory with `slots` freshly allocated blocks.
    pub(crate) fn with_blocks(
        slots: usize,
        block_capacity: usize,
        observer: &impl Observer,
    ) -> Result<Self, ContainerError> {
        let mut directory = Self::new(block_capacity);
        directory.grow_to(slots, observer)?;
        Ok(directory)
    }

    pub(crate) fn block_capacity(&self) -> usize {
        self.block_capacity
    }

    /// Number of directory slots, all of which hold a block.
    pub(crate) fn len(&self) -> usize {
        self.blocks.len()
    }

    pub(crate) fn blocks(&self) -> &[RawBuf<T>] {
        &self.blocks
    }

    pub(crate) fn block_mut(&mut self, slot: usize) -> &mut RawBuf<T> {
        &mut self.blocks[slot]
    }

    /// Raw pointer to the slot a cursor addresses.
    ///
    /// # Panics
    ///
    /// Panics if the cursor's block is not in the directory.
    pub(crate) fn slot_ptr(&self, cursor: BlockCursor) -> *mut T {
        self.blocks[cursor.block()].slot(cursor.offset())
    }

    /// Bytes held by blocks, excluding the directory table itself.
    pub(crate) fn memory_bytes(&self) -> usize {
        self.blocks.iter().map(RawBuf::memory_bytes).sum()
    }

    /// Append one block, growing the table geometrically.
    pub(crate) fn push_block(&mut self, observer: &impl Observer) -> Result<(), ContainerError> {
        self.blocks
            .try_reserve(1)
            .map_err(|err| table_error::<T>(self.blocks.len() + 1, err))?;
        let block = RawBuf::allocate(self.block_capacity)?;
        self.blocks.push(block);
        observer.observe(Event::BlockAllocated {
            slot: self.blocks.len() - 1,
        });
        Ok(())
    }

    /// Move the first `count` blocks to the end of the table, shifting
    /// every other block `count` slots toward the front. Blocks keep their
    /// contents; no allocation happens.
    pub(crate) fn rotate_front(&mut self, count: usize) {
        self.blocks.rotate_left(count);
    }

    /// Grow to exactly `slots` blocks. Existing blocks keep their slots
    /// and contents.
    ///
    /// Every allocation (new blocks and the rebuilt table) happens before
    /// the directory is modified, so on failure it is unchanged.
    pub(crate) fn grow_to(&mut self, slots: usize, observer: &impl Observer) -> Result<(), ContainerError> {
        let old = self.blocks.len();
        if slots <= old {
            return Ok(());
        }
        let mut table = Vec::new();
        table
            .try_reserve_exact(slots)
            .map_err(|err| table_error::<T>(slots, err))?;
        let mut fresh = Vec::new();
        fresh
            .try_reserve_exact(slots - old)
            .map_err(|err| table_error::<T>(slots - old, err))?;
        for _ in old..slots {
            fresh.push(RawBuf::allocate(self.block_capacity)?);
        }

        table.append(&mut self.blocks);
        table.append(&mut fresh);
        self.blocks = table;
        for slot in old..slots {
            observer.observe(Event::BlockAllocated { slot });
        }
        if old > 0 {
            observer.observe(Event::DirectoryResized { from: old, to: slots });
        }
        Ok(())
    }

    /// Shrink to exactly `slots` blocks, releasing the ones past the end.
    ///
    /// The released blocks must hold no live values.
    pub(crate) fn shrink_to(&mut self, slots: usize, observer: &impl Observer) {
        let old = self.blocks.len();
        if slots >= old {
            return;
        }
        for slot in (slots..old).rev() {
            if let Some(block) = self.blocks.pop() {
                block.deallocate();
                observer.observe(Event::BlockReleased { slot });
            }
        }
        self.blocks.shrink_to_fit();
        observer.observe(Event::DirectoryResized { from: old, to: slots });
    }

    /// Release every block and the table. Every block must be empty.
    pub(crate) fn release_all(&mut self, observer: &impl Observer) {
        let blocks = mem::take(&mut self.blocks);
        for (slot, block) in blocks.into_iter().enumerate().rev() {
            block.deallocate();
            observer.observe(Event::BlockReleased { slot });
        }
    }

    /// Replace this directory with `other`'s blocks, leaving `other` empty.
    /// This directory's blocks must be empty.
    pub(crate) fn adopt(&mut self, other: &mut Directory<T>, observer: &impl Observer) {
        self.release_all(observer);
        self.blocks = mem::take(&mut other.blocks);
        self.block_capacity = other.block_capacity;
    }
}

fn table_error<T>(slots: usize, _err: TryReserveError) -> ContainerError {
    ContainerError::AllocationFailure {
        bytes: slots.saturating_mul(mem::size_of::<RawBuf<T>>()),
        align: mem::align_of::<RawBuf<T>>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use strata_core::NoopObserver;

    #[derive(Default)]
    struct Trail(RefCell<Vec<Event>>);

    impl Observer for Trail {
        fn observe(&self, event: Event) {
            self.0.borrow_mut().push(event);
        }
    }

    #[test]
    fn with_blocks_allocates_every_slot() {
        let dir = Directory::<u32>::with_blocks(3, 16, &NoopObserver).unwrap();
        assert_eq!(dir.len(), 3);
        assert!(dir.blocks().iter().all(|b| b.capacity() == 16));
        assert_eq!(dir.memory_bytes(), 3 * 16 * 4);
    }

    #[test]
    fn grow_keeps_existing_blocks_in_place() {
        let mut dir = Directory::<u64>::with_blocks(2, 4, &NoopObserver).unwrap();
        let first = dir.blocks()[0].as_ptr();
        let second = dir.blocks()[1].as_ptr();
        let trail = Trail::default();
        dir.grow_to(5, &trail).unwrap();
        assert_eq!(dir.len(), 5);
        assert_eq!(dir.blocks()[0].as_ptr(), first);
        assert_eq!(dir.blocks()[1].as_ptr(), second);
        assert_eq!(
            *trail.0.borrow(),
            vec![
                Event::BlockAllocated { slot: 2 },
                Event::BlockAllocated { slot: 3 },
                Event::BlockAllocated { slot: 4 },
                Event::DirectoryResized { from: 2, to: 5 },
            ]
        );
    }

    #[test]
    fn shrink_releases_trailing_blocks() {
        let mut dir = Directory::<u8>::with_blocks(4, 8, &NoopObserver).unwrap();
        let trail = Trail::default();
        dir.shrink_to(1, &trail);
        assert_eq!(dir.len(), 1);
        assert_eq!(
            *trail.0.borrow(),
            vec![
                Event::BlockReleased { slot: 3 },
                Event::BlockReleased { slot: 2 },
                Event::BlockReleased { slot: 1 },
                Event::DirectoryResized { from: 4, to: 1 },
            ]
        );
    }

    #[test]
    fn push_block_appends_one_slot() {
        let mut dir = Directory::<u8>::new(8);
        dir.push_block(&NoopObserver).unwrap();
        dir.push_block(&NoopObserver).unwrap();
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn rotate_front_moves_leading_blocks_to_the_tail() {
        let mut dir = Directory::<u8>::with_blocks(3, 4, &NoopObserver).unwrap();
        let first = dir.blocks()[0].as_ptr();
        let second = dir.blocks()[1].as_ptr();
        dir.rotate_front(1);
        assert_eq!(dir.len(), 3);
        assert_eq!(dir.blocks()[0].as_ptr(), second);
        assert_eq!(dir.blocks()[2].as_ptr(), first);
    }

    #[test]
    fn adopt_takes_blocks_and_capacity() {
        let mut dir = Directory::<u8>::with_blocks(1, 8, &NoopObserver).unwrap();
        let mut other = Directory::<u8>::with_blocks(3, 2, &NoopObserver).unwrap();
        dir.adopt(&mut other, &NoopObserver);
        assert_eq!(dir.len(), 3);
        assert_eq!(dir.block_capacity(), 2);
        assert_eq!(other.len(), 0);
    }
}
