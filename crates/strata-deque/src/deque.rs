//! The block-indexed double-ended sequence.
//!
//! A [`ChunkedDeque`] stores values in a directory of equally sized raw
//! blocks. The live values form one contiguous window `[start, end)` in
//! (block, offset) space, so a value never moves once constructed: growth
//! appends a block instead of relocating anything.
//!
//! Sizing follows two rules. Each block holds
//! [`DequeConfig::block_capacity`] slots, and a directory built for `n`
//! values has `n / block_capacity + 1` blocks, all allocated up front.

use std::fmt;
use std::iter;
use std::mem;
use std::ops::{Index, IndexMut};
use std::ptr;

use strata_core::{ContainerError, ContainerKind, DequeConfig, Event, NoopObserver, Observer};
use strata_raw::alloc_failed;

use crate::cursor::BlockCursor;
use crate::directory::Directory;
use crate::iter::{IntoIter, Iter, IterMut};

/// A double-ended sequence stored in fixed-capacity blocks.
///
/// # Invariants
///
/// - `start <= end`, and both address blocks that are in the directory
///   (an empty deque with no blocks keeps both at the origin).
/// - Exactly the slots in `[start, end)` hold live values.
/// - `len() == end - start`, computed by segmented distance.
///
/// Cursors stay valid across pops that do not remove the addressed value,
/// and across [`push_back`](Self::push_back) as long as the window starts
/// in block 0. A push that has to recycle the vacant blocks in front of
/// the window rebases it and invalidates every cursor, as do
/// [`clear`](Self::clear), a pop that empties the deque, and any
/// assignment.
pub struct ChunkedDeque<T, O: Observer = NoopObserver> {
    map: Directory<T>,
    start: BlockCursor,
    end: BlockCursor,
    config: DequeConfig,
    observer: O,
}

impl<T> ChunkedDeque<T> {
    /// An empty deque with the default block budget. Does not allocate.
    pub fn new() -> Self {
        Self::new_in(NoopObserver)
    }

    /// An empty deque using `config`'s block budget. Does not allocate.
    pub fn with_config(config: DequeConfig) -> Self {
        Self::with_config_in(config, NoopObserver)
    }

    /// `count` default-constructed values.
    pub fn with_len(count: usize) -> Result<Self, ContainerError>
    where
        T: Default,
    {
        Self::with_len_in(count, DequeConfig::default(), NoopObserver)
    }

    /// `count` copies of `value`.
    pub fn from_elem(count: usize, value: &T) -> Result<Self, ContainerError>
    where
        T: Clone,
    {
        Self::from_elem_in(count, value, DequeConfig::default(), NoopObserver)
    }

    /// A copy of each value in `values`, in order.
    pub fn from_slice(values: &[T]) -> Result<Self, ContainerError>
    where
        T: Clone,
    {
        Self::from_slice_in(values, DequeConfig::default(), NoopObserver)
    }
}

impl<T, O: Observer> ChunkedDeque<T, O> {
    fn emit(&self, event: Event) {
        self.observer.observe(event);
    }

    fn empty_with(map: Directory<T>, config: DequeConfig, observer: O) -> Self {
        let origin = BlockCursor::origin(map.block_capacity());
        Self {
            map,
            start: origin,
            end: origin,
            config,
            observer,
        }
    }

    /// An empty deque whose directory already has room for `count` values.
    fn sized_in(count: usize, config: DequeConfig, observer: O) -> Result<Self, ContainerError> {
        let capacity = config.block_capacity::<T>();
        let map = Directory::with_blocks(count / capacity + 1, capacity, &observer)?;
        Ok(Self::empty_with(map, config, observer))
    }

    /// An empty deque with the default block budget, reporting to `observer`.
    pub fn new_in(observer: O) -> Self {
        Self::with_config_in(DequeConfig::default(), observer)
    }

    /// An empty deque using `config`, reporting to `observer`.
    pub fn with_config_in(config: DequeConfig, observer: O) -> Self {
        let capacity = config.block_capacity::<T>();
        let deque = Self::empty_with(Directory::new(capacity), config, observer);
        deque.emit(Event::Created {
            container: ContainerKind::ChunkedDeque,
            len: 0,
        });
        deque
    }

    /// `count` default-constructed values.
    pub fn with_len_in(count: usize, config: DequeConfig, observer: O) -> Result<Self, ContainerError>
    where
        T: Default,
    {
        let mut deque = Self::sized_in(count, config, observer)?;
        deque.fill_from(iter::repeat_with(T::default).take(count));
        deque.emit(Event::Created {
            container: ContainerKind::ChunkedDeque,
            len: count,
        });
        Ok(deque)
    }

    /// `count` copies of `value`.
    pub fn from_elem_in(count: usize, value: &T, config: DequeConfig, observer: O) -> Result<Self, ContainerError>
    where
        T: Clone,
    {
        let mut deque = Self::sized_in(count, config, observer)?;
        deque.fill_from(iter::repeat_with(|| value.clone()).take(count));
        deque.emit(Event::Created {
            container: ContainerKind::ChunkedDeque,
            len: count,
        });
        Ok(deque)
    }

    /// A copy of each value in `values`, in order.
    pub fn from_slice_in(values: &[T], config: DequeConfig, observer: O) -> Result<Self, ContainerError>
    where
        T: Clone,
    {
        let mut deque = Self::sized_in(values.len(), config, observer)?;
        deque.fill_from(values.iter().cloned());
        deque.emit(Event::Created {
            container: ContainerKind::ChunkedDeque,
            len: values.len(),
        });
        Ok(deque)
    }

    /// Construct values at `end` until `values` is exhausted.
    ///
    /// The directory must already hold the block every write lands in.
    /// `end` advances after each write, so a panicking producer leaves a
    /// valid deque holding the values built so far.
    fn fill_from(&mut self, values: impl Iterator<Item = T>) {
        for value in values {
            // SAFETY: the caller sized the directory for these writes and
            // slot `end` is vacant.
            unsafe { self.write_at_end(value) };
        }
    }

    /// # Safety
    ///
    /// Both `end`'s block and the block after stepping it must be in the
    /// directory, and slot `end` must be vacant.
    unsafe fn write_at_end(&mut self, value: T) {
        // SAFETY: upheld by the caller.
        unsafe { ptr::write(self.map.slot_ptr(self.end), value) };
        self.end.step_forward();
    }

    /// The observer this deque reports to.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// The configuration this deque was built with.
    pub fn config(&self) -> DequeConfig {
        self.config
    }

    /// Slots per block.
    pub fn block_capacity(&self) -> usize {
        self.map.block_capacity()
    }

    /// Number of blocks in the directory.
    pub fn map_size(&self) -> usize {
        self.map.len()
    }

    /// Bytes held by blocks.
    pub fn memory_bytes(&self) -> usize {
        self.map.memory_bytes()
    }

    /// Number of live values: the segmented distance from `begin` to `end`.
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    /// Whether the deque holds no values.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Cursor at the first value.
    pub fn begin(&self) -> BlockCursor {
        self.start
    }

    /// Cursor one past the last value.
    pub fn end(&self) -> BlockCursor {
        self.end
    }

    fn holds(&self, cursor: BlockCursor) -> bool {
        self.start <= cursor && cursor < self.end
    }

    fn cursor_for(&self, index: usize) -> Option<BlockCursor> {
        (index < self.len()).then(|| self.start + index)
    }

    /// The value a cursor addresses, if it is live.
    pub fn get_at(&self, cursor: BlockCursor) -> Option<&T> {
        if !self.holds(cursor) {
            return None;
        }
        // SAFETY: cursor is inside the live window.
        Some(unsafe { &*self.map.slot_ptr(cursor) })
    }

    /// The value a cursor addresses, mutably, if it is live.
    pub fn get_at_mut(&mut self, cursor: BlockCursor) -> Option<&mut T> {
        if !self.holds(cursor) {
            return None;
        }
        // SAFETY: cursor is inside the live window; &mut self is exclusive.
        Some(unsafe { &mut *self.map.slot_ptr(cursor) })
    }

    /// The value at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.cursor_for(index).and_then(|cursor| self.get_at(cursor))
    }

    /// The value at `index` mutably, or `None` past the end.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let cursor = self.cursor_for(index)?;
        self.get_at_mut(cursor)
    }

    /// Checked access.
    pub fn at(&self, index: usize) -> Result<&T, ContainerError> {
        let len = self.len();
        self.get(index).ok_or(ContainerError::OutOfRange { index, len })
    }

    /// Checked mutable access.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, ContainerError> {
        let len = self.len();
        self.get_mut(index).ok_or(ContainerError::OutOfRange { index, len })
    }

    /// First value.
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Last value.
    pub fn back(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|last| self.get(last))
    }

    /// First value, mutably.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    /// Last value, mutably.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        let last = self.len().checked_sub(1)?;
        self.get_mut(last)
    }

    /// Borrowing iterator, front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.map.blocks(), self.start, self.end)
    }

    /// Mutably borrowing iterator, front to back.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.map.blocks(), self.start, self.end)
    }

    /// Make sure the block `end` will step into exists.
    ///
    /// Blocks wholly before `start` are vacant. They are rotated to the
    /// tail and reused before any new block is allocated.
    fn reserve_tail(&mut self) -> Result<(), ContainerError> {
        let last_slot = self.end.offset() + 1 == self.block_capacity();
        let mut needed = self.end.block() + if last_slot { 2 } else { 1 };
        if self.map.len() < needed && self.start.block() > 0 {
            needed -= self.recycle_leading_blocks();
        }
        while self.map.len() < needed {
            self.map.push_block(&self.observer)?;
        }
        Ok(())
    }

    /// Rotate the vacant blocks before `start` to the tail of the
    /// directory and rebase the window onto block 0. Returns the number of
    /// blocks moved.
    fn recycle_leading_blocks(&mut self) -> usize {
        let vacant = self.start.block();
        let capacity = self.block_capacity();
        self.map.rotate_front(vacant);
        self.start = BlockCursor::new(0, self.start.offset(), capacity);
        self.end = BlockCursor::new(self.end.block() - vacant, self.end.offset(), capacity);
        vacant
    }

    /// Append a value.
    ///
    /// When the window's end would leave the last block, vacant blocks in
    /// front of the window are recycled first and one more block is
    /// allocated only if none are left; on failure the deque is unchanged.
    pub fn push_back(&mut self, value: T) -> Result<(), ContainerError> {
        self.reserve_tail()?;
        // SAFETY: reserve_tail made both blocks exist; slot `end` is
        // outside the window and therefore vacant.
        unsafe { self.write_at_end(value) };
        Ok(())
    }

    /// Remove and return the last value. `None` on an empty deque.
    ///
    /// Blocks are never released.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        self.end.step_back();
        // SAFETY: the slot was the last live one and is now outside the window.
        let value = unsafe { ptr::read(self.map.slot_ptr(self.end)) };
        self.rewind_if_empty();
        Some(value)
    }

    /// Remove and return the first value. `None` on an empty deque.
    ///
    /// Blocks are never released; a block the window leaves behind is
    /// reused by a later [`push_back`](Self::push_back).
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: start < end, so the slot is live; it leaves the window below.
        let value = unsafe { ptr::read(self.map.slot_ptr(self.start)) };
        self.start.step_forward();
        self.rewind_if_empty();
        Some(value)
    }

    fn rewind(&mut self) {
        let origin = BlockCursor::origin(self.block_capacity());
        self.start = origin;
        self.end = origin;
    }

    fn rewind_if_empty(&mut self) {
        if self.is_empty() {
            self.rewind();
        }
    }

    /// Drop every live value and collapse the window onto `start`.
    ///
    /// The window is emptied before any destructor runs, so a panicking
    /// destructor leaks the values after it instead of dropping anything
    /// twice.
    fn destroy_window(&mut self) {
        let (mut cursor, end) = (self.start, self.end);
        self.end = self.start;
        let capacity = self.block_capacity();
        while cursor != end {
            let block = self.map.block_mut(cursor.block());
            if cursor.block() == end.block() {
                // SAFETY: [cursor, end) within one block was live.
                unsafe { block.drop_range(cursor.offset(), end.offset()) };
                break;
            }
            // SAFETY: the rest of this block was live.
            unsafe { block.drop_range(cursor.offset(), capacity) };
            cursor = BlockCursor::new(cursor.block() + 1, 0, capacity);
        }
    }

    /// Destroy every value and rewind the window to the first block.
    ///
    /// Blocks stay allocated.
    pub fn clear(&mut self) {
        self.destroy_window();
        self.rewind();
    }

    /// Move the contents out, leaving `self` empty with no blocks.
    ///
    /// The returned deque reports to a clone of this deque's observer.
    pub fn take(&mut self) -> Self
    where
        O: Clone,
    {
        let capacity = self.block_capacity();
        let taken = Self {
            map: mem::replace(&mut self.map, Directory::new(capacity)),
            start: self.start,
            end: self.end,
            config: self.config,
            observer: self.observer.clone(),
        };
        self.rewind();
        taken.emit(Event::Taken {
            container: ContainerKind::ChunkedDeque,
            len: taken.len(),
        });
        taken
    }

    /// Replace the contents with `other`'s directory and blocks, leaving
    /// `other` empty with no blocks. Returns `self`.
    pub fn move_assign(&mut self, other: &mut Self) -> &mut Self {
        self.destroy_window();
        self.map.adopt(&mut other.map, &self.observer);
        self.start = other.start;
        self.end = other.end;
        self.config = other.config;
        other.rewind();
        self.emit(Event::MoveAssigned {
            container: ContainerKind::ChunkedDeque,
            len: self.len(),
        });
        self
    }

    /// Independent copy with its own directory and blocks.
    pub fn try_clone(&self) -> Result<Self, ContainerError>
    where
        T: Clone,
        O: Clone,
    {
        let mut copy = Self::sized_in(self.len(), self.config, self.observer.clone())?;
        copy.fill_from(self.iter().cloned());
        copy.emit(Event::Cloned {
            container: ContainerKind::ChunkedDeque,
            len: copy.len(),
        });
        Ok(copy)
    }

    /// Replace the contents with copies of `source`'s values.
    ///
    /// The directory is resized to `source.len() / block_capacity + 1`
    /// blocks: blocks in overlapping slots are reused, missing ones are
    /// allocated and surplus ones released. New blocks are allocated
    /// before any value is destroyed, so an allocation failure leaves the
    /// deque unchanged. If the two deques use different block capacities,
    /// every block is replaced and `source`'s configuration is adopted.
    pub fn try_clone_from(&mut self, source: &Self) -> Result<&mut Self, ContainerError>
    where
        T: Clone,
    {
        let capacity = source.block_capacity();
        let slots = source.len() / capacity + 1;
        if capacity != self.block_capacity() {
            let mut fresh = Directory::with_blocks(slots, capacity, &self.observer)?;
            let from = self.map.len();
            self.destroy_window();
            self.map.adopt(&mut fresh, &self.observer);
            self.config = source.config;
            self.emit(Event::DirectoryResized { from, to: slots });
        } else if slots > self.map.len() {
            self.map.grow_to(slots, &self.observer)?;
            self.destroy_window();
        } else {
            self.destroy_window();
            self.map.shrink_to(slots, &self.observer);
        }
        self.rewind();
        self.fill_from(source.iter().cloned());
        self.emit(Event::CloneAssigned {
            container: ContainerKind::ChunkedDeque,
            len: self.len(),
        });
        Ok(self)
    }
}

impl<T, O: Observer> Drop for ChunkedDeque<T, O> {
    fn drop(&mut self) {
        self.emit(Event::Dropped {
            container: ContainerKind::ChunkedDeque,
            len: self.len(),
        });
        self.destroy_window();
        self.map.release_all(&self.observer);
    }
}

impl<T: Clone, O: Observer + Clone> Clone for ChunkedDeque<T, O> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|err| alloc_failed(err))
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(err) = self.try_clone_from(source) {
            alloc_failed(err);
        }
    }
}

impl<T, O: Observer + Default> Default for ChunkedDeque<T, O> {
    fn default() -> Self {
        Self::new_in(O::default())
    }
}

impl<T, O: Observer> Index<usize> for ChunkedDeque<T, O> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!("index {index} out of range for deque of length {}", self.len()),
        }
    }
}

impl<T, O: Observer> IndexMut<usize> for ChunkedDeque<T, O> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("index {index} out of range for deque of length {len}"),
        }
    }
}

impl<T, O: Observer> Index<BlockCursor> for ChunkedDeque<T, O> {
    type Output = T;

    fn index(&self, cursor: BlockCursor) -> &T {
        match self.get_at(cursor) {
            Some(value) => value,
            None => panic!("cursor {cursor} outside live window {}..{}", self.start, self.end),
        }
    }
}

impl<T, O: Observer> IndexMut<BlockCursor> for ChunkedDeque<T, O> {
    fn index_mut(&mut self, cursor: BlockCursor) -> &mut T {
        let (start, end) = (self.start, self.end);
        match self.get_at_mut(cursor) {
            Some(value) => value,
            None => panic!("cursor {cursor} outside live window {start}..{end}"),
        }
    }
}

impl<T: fmt::Debug, O: Observer> fmt::Debug for ChunkedDeque<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, O: Observer> Extend<T> for ChunkedDeque<T, O> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            if let Err(err) = self.push_back(value) {
                alloc_failed(err);
            }
        }
    }
}

impl<'a, T: Clone + 'a, O: Observer> Extend<&'a T> for ChunkedDeque<T, O> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().cloned());
    }
}

impl<T> FromIterator<T> for ChunkedDeque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Self::new();
        deque.extend(iter);
        deque
    }
}

impl<T, const N: usize> From<[T; N]> for ChunkedDeque<T> {
    fn from(values: [T; N]) -> Self {
        let mut deque =
            Self::sized_in(N, DequeConfig::default(), NoopObserver).unwrap_or_else(|err| alloc_failed(err));
        deque.fill_from(values.into_iter());
        deque.emit(Event::Created {
            container: ContainerKind::ChunkedDeque,
            len: N,
        });
        deque
    }
}

impl<T, O: Observer> IntoIterator for ChunkedDeque<T, O> {
    type Item = T;
    type IntoIter = IntoIter<T, O>;

    fn into_iter(self) -> IntoIter<T, O> {
        IntoIter::new(self)
    }
}

impl<'a, T, O: Observer> IntoIterator for &'a ChunkedDeque<T, O> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T, O: Observer> IntoIterator for &'a mut ChunkedDeque<T, O> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}
