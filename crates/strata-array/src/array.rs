//! The contiguous growable array.
//!
//! [`DynArray`] owns one [`RawBuf`] of `capacity` slots of which the first
//! `len` are live. Growth happens by relocation: a fresh buffer is
//! allocated first, live values are moved across bitwise, and the old
//! allocation is released without running destructors (its values now
//! live in the new buffer). Because the allocation is always requested
//! before any value moves, an allocation failure leaves the array
//! untouched.

use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::ptr;
use std::slice;

use smallvec::{CollectionAllocErr, SmallVec};
use strata_core::{ContainerError, ContainerKind, Event, NoopObserver, Observer};
use strata_raw::{alloc_failed, RawBuf};

use crate::cursor::Cursor;
use crate::iter::IntoIter;

/// Values inserted in one call are staged inline up to this count before
/// being moved into the array.
const STAGE_INLINE: usize = 8;

type Staged<T> = SmallVec<[T; STAGE_INLINE]>;

/// A contiguous growable array over raw, manually managed storage.
///
/// Slots `[0, len)` hold live values; slots `[len, capacity)` are
/// allocated but uninitialised. All operations that may allocate return
/// `Result` and report [`ContainerError::AllocationFailure`] instead of
/// aborting.
///
/// # Invalidation
///
/// A relocation (growth, [`reserve`](Self::reserve),
/// [`shrink_to_fit`](Self::shrink_to_fit)) invalidates every reference
/// into the array. An insertion that fits in the current capacity shifts
/// the elements at and after the insertion point, so cursors there now
/// address different elements.
pub struct DynArray<T, O: Observer = NoopObserver> {
    buf: RawBuf<T>,
    len: usize,
    observer: O,
}

impl<T> DynArray<T> {
    /// An empty array. Does not allocate.
    pub fn new() -> Self {
        Self::new_in(NoopObserver)
    }

    /// An empty array with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Result<Self, ContainerError> {
        Self::with_capacity_in(capacity, NoopObserver)
    }

    /// `count` default-constructed values.
    pub fn with_len(count: usize) -> Result<Self, ContainerError>
    where
        T: Default,
    {
        Self::with_len_in(count, NoopObserver)
    }

    /// `count` copies of `value`.
    pub fn from_elem(count: usize, value: &T) -> Result<Self, ContainerError>
    where
        T: Clone,
    {
        Self::from_elem_in(count, value, NoopObserver)
    }

    /// A copy of each value in `values`, in order.
    pub fn from_slice(values: &[T]) -> Result<Self, ContainerError>
    where
        T: Clone,
    {
        Self::from_slice_in(values, NoopObserver)
    }
}

impl<T, O: Observer> DynArray<T, O> {
    fn from_parts(buf: RawBuf<T>, observer: O) -> Self {
        Self {
            buf,
            len: 0,
            observer,
        }
    }

    fn emit(&self, event: Event) {
        self.observer.observe(event);
    }

    /// An empty array reporting to `observer`. Does not allocate.
    pub fn new_in(observer: O) -> Self {
        let array = Self::from_parts(RawBuf::empty(), observer);
        array.emit(Event::Created {
            container: ContainerKind::DynArray,
            len: 0,
        });
        array
    }

    /// An empty array with room for `capacity` values, reporting to `observer`.
    pub fn with_capacity_in(capacity: usize, observer: O) -> Result<Self, ContainerError> {
        let array = Self::from_parts(RawBuf::allocate(capacity)?, observer);
        array.emit(Event::Created {
            container: ContainerKind::DynArray,
            len: 0,
        });
        Ok(array)
    }

    /// `count` default-constructed values, reporting to `observer`.
    pub fn with_len_in(count: usize, observer: O) -> Result<Self, ContainerError>
    where
        T: Default,
    {
        let mut array = Self::from_parts(RawBuf::allocate(count)?, observer);
        array.fill_with(count, T::default);
        array.emit(Event::Created {
            container: ContainerKind::DynArray,
            len: count,
        });
        Ok(array)
    }

    /// `count` copies of `value`, reporting to `observer`.
    pub fn from_elem_in(count: usize, value: &T, observer: O) -> Result<Self, ContainerError>
    where
        T: Clone,
    {
        let mut array = Self::from_parts(RawBuf::allocate(count)?, observer);
        array.fill_with(count, || value.clone());
        array.emit(Event::Created {
            container: ContainerKind::DynArray,
            len: count,
        });
        Ok(array)
    }

    /// A copy of each value in `values`, reporting to `observer`.
    pub fn from_slice_in(values: &[T], observer: O) -> Result<Self, ContainerError>
    where
        T: Clone,
    {
        let mut array = Self::from_parts(RawBuf::allocate(values.len())?, observer);
        array.extend_cloned_within_capacity(values);
        array.emit(Event::Created {
            container: ContainerKind::DynArray,
            len: values.len(),
        });
        Ok(array)
    }

    /// Construct values at the end until `len == target`.
    ///
    /// `len` is bumped after every write, so a panicking constructor
    /// leaves a valid array holding the values built so far.
    fn fill_with(&mut self, target: usize, mut make: impl FnMut() -> T) {
        debug_assert!(target <= self.capacity());
        while self.len < target {
            // SAFETY: len < target <= capacity and slot len is vacant.
            unsafe { self.buf.write(self.len, make()) };
            self.len += 1;
        }
    }

    fn extend_cloned_within_capacity(&mut self, values: &[T])
    where
        T: Clone,
    {
        debug_assert!(self.len + values.len() <= self.capacity());
        for value in values {
            // SAFETY: the caller reserved room; slot len is vacant.
            unsafe { self.buf.write(self.len, value.clone()) };
            self.len += 1;
        }
    }

    /// The observer this array reports to.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of allocated slots.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Whether the array holds no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The live values as a slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots [0, len) are live; the pointer is aligned and non-null
        // even when nothing is allocated.
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    /// The live values as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as for as_slice; &mut self gives exclusive access.
        unsafe { slice::from_raw_parts_mut(self.buf.as_mut_ptr(), self.len) }
    }

    /// Cursor at the first slot.
    pub fn begin(&self) -> Cursor {
        Cursor::at(0)
    }

    /// Cursor one past the last live value.
    pub fn end(&self) -> Cursor {
        Cursor::at(self.len)
    }

    /// Checked access.
    pub fn at(&self, index: usize) -> Result<&T, ContainerError> {
        let len = self.len;
        self.as_slice()
            .get(index)
            .ok_or(ContainerError::OutOfRange { index, len })
    }

    /// Checked mutable access.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, ContainerError> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(ContainerError::OutOfRange { index, len })
    }

    /// The value a cursor addresses, if it is live.
    pub fn get_at(&self, cursor: Cursor) -> Option<&T> {
        self.as_slice().get(cursor.index())
    }

    /// First value.
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// Last value.
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// First value, mutably.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    /// Last value, mutably.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Move every live value into a fresh buffer of `new_capacity` slots.
    fn relocate(&mut self, new_capacity: usize) -> Result<(), ContainerError> {
        debug_assert!(new_capacity >= self.len);
        let mut fresh = RawBuf::allocate(new_capacity)?;
        // SAFETY: [0, len) is live in the old buffer and fits in the new one;
        // after the move the old slots are vacant and the buffer is released
        // without dropping them.
        unsafe { fresh.move_from(0, &self.buf, 0, self.len) };
        let old = mem::replace(&mut self.buf, fresh);
        let from = old.capacity();
        old.deallocate();
        self.emit(Event::Reallocated {
            container: ContainerKind::DynArray,
            from,
            to: new_capacity,
        });
        Ok(())
    }

    /// Grow the buffer to at least `new_capacity` slots.
    ///
    /// No-op when the capacity is already large enough. `len` is unchanged.
    pub fn reserve(&mut self, new_capacity: usize) -> Result<(), ContainerError> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        self.relocate(new_capacity)
    }

    /// Shrink the buffer to exactly `len` slots.
    pub fn shrink_to_fit(&mut self) -> Result<(), ContainerError> {
        if self.capacity() == self.len {
            return Ok(());
        }
        self.relocate(self.len)
    }

    /// Destroy every live value. The capacity is unchanged.
    pub fn clear(&mut self) {
        let len = mem::replace(&mut self.len, 0);
        // SAFETY: [0, len) was live; len is already 0 so a panicking
        // destructor cannot cause a double drop.
        unsafe { self.buf.drop_range(0, len) };
    }

    /// Destroy values past `len`. No-op if the array is not longer than that.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let old = mem::replace(&mut self.len, len);
        // SAFETY: [len, old) was live and is now outside the window.
        unsafe { self.buf.drop_range(len, old) };
    }

    /// Append a value, doubling the capacity (minimum 1) when full.
    pub fn push_back(&mut self, value: T) -> Result<(), ContainerError> {
        if self.len == self.capacity() {
            let grown = match self.capacity() {
                0 => 1,
                cap => cap
                    .checked_mul(2)
                    .ok_or_else(|| ContainerError::capacity_overflow(mem::align_of::<T>()))?,
            };
            self.relocate(grown)?;
        }
        // SAFETY: len < capacity and slot len is vacant.
        unsafe { self.buf.write(self.len, value) };
        self.len += 1;
        Ok(())
    }

    /// Remove and return the last value. `None` on an empty array.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot len was live and is now outside the window.
        Some(unsafe { self.buf.read(self.len) })
    }

    fn check_position(&self, position: Cursor) -> Result<usize, ContainerError> {
        let index = position.index();
        if index > self.len {
            return Err(ContainerError::InvalidArgument {
                position: index,
                len: self.len,
            });
        }
        Ok(index)
    }

    /// Insert `value` before `position`.
    ///
    /// Returns a cursor to the inserted value. Fails with
    /// [`ContainerError::InvalidArgument`] if `position` is past
    /// [`end`](Self::end). When the array is full, the buffer is
    /// reallocated to exactly the new length.
    pub fn insert(&mut self, position: Cursor, value: T) -> Result<Cursor, ContainerError> {
        self.check_position(position)?;
        let mut staged = Staged::new();
        staged.push(value);
        self.insert_staged(position, staged)
    }

    /// Insert `count` copies of `value` before `position`.
    ///
    /// The copies are made before any element moves, so a panicking
    /// `clone` leaves the array unchanged.
    pub fn insert_n(&mut self, position: Cursor, count: usize, value: &T) -> Result<Cursor, ContainerError>
    where
        T: Clone,
    {
        self.check_position(position)?;
        let mut staged = Staged::new();
        staged.try_reserve(count).map_err(stage_error::<T>)?;
        staged.extend((0..count).map(|_| value.clone()));
        self.insert_staged(position, staged)
    }

    /// Insert a copy of each value in `values` before `position`, keeping
    /// their order.
    pub fn insert_slice(&mut self, position: Cursor, values: &[T]) -> Result<Cursor, ContainerError>
    where
        T: Clone,
    {
        self.check_position(position)?;
        let mut staged = Staged::new();
        staged.try_reserve(values.len()).map_err(stage_error::<T>)?;
        staged.extend(values.iter().cloned());
        self.insert_staged(position, staged)
    }

    /// Insert every value yielded by `values` before `position`, keeping
    /// their order.
    ///
    /// The iterator is drained completely before the array is touched.
    pub fn insert_iter<I>(&mut self, position: Cursor, values: I) -> Result<Cursor, ContainerError>
    where
        I: IntoIterator<Item = T>,
    {
        self.check_position(position)?;
        let values = values.into_iter();
        let mut staged = Staged::new();
        staged.try_reserve(values.size_hint().0).map_err(stage_error::<T>)?;
        for value in values {
            staged.try_reserve(1).map_err(stage_error::<T>)?;
            staged.push(value);
        }
        self.insert_staged(position, staged)
    }

    /// Construct a value from `args` and insert it before `position`.
    ///
    /// Same ordering and growth behaviour as [`insert`](Self::insert).
    pub fn emplace<A>(&mut self, position: Cursor, args: A) -> Result<Cursor, ContainerError>
    where
        A: Into<T>,
    {
        self.emplace_with(position, || args.into())
    }

    /// Construct a value with `make` and insert it before `position`.
    ///
    /// `make` is not called if `position` is invalid.
    pub fn emplace_with<F>(&mut self, position: Cursor, make: F) -> Result<Cursor, ContainerError>
    where
        F: FnOnce() -> T,
    {
        self.check_position(position)?;
        let value = make();
        self.insert(position, value)
    }

    /// Move the staged values into the array before `position`.
    ///
    /// Either path only moves values bitwise, so nothing here can panic
    /// once the (possible) allocation has succeeded.
    fn insert_staged(&mut self, position: Cursor, mut staged: Staged<T>) -> Result<Cursor, ContainerError> {
        let index = self.check_position(position)?;
        let count = staged.len();
        if count == 0 {
            return Ok(position);
        }
        let new_len = self
            .len
            .checked_add(count)
            .ok_or_else(|| ContainerError::capacity_overflow(mem::align_of::<T>()))?;
        let tail = self.len - index;

        if new_len > self.capacity() {
            let mut fresh = RawBuf::allocate(new_len)?;
            // SAFETY: fresh has new_len vacant slots. The prefix [0, index) and
            // suffix [index, len) of the old buffer are live and land at
            // [0, index) and [index + count, new_len); the staged values fill
            // [index, index + count). Staged's length is zeroed so it does not
            // drop the moved values, and the old buffer is released without
            // dropping its (now moved-out) slots.
            unsafe {
                fresh.move_from(0, &self.buf, 0, index);
                ptr::copy_nonoverlapping(staged.as_ptr(), fresh.slot(index), count);
                staged.set_len(0);
                fresh.move_from(index + count, &self.buf, index, tail);
            }
            let old = mem::replace(&mut self.buf, fresh);
            let from = old.capacity();
            old.deallocate();
            self.emit(Event::Reallocated {
                container: ContainerKind::DynArray,
                from,
                to: new_len,
            });
        } else {
            // SAFETY: new_len <= capacity. The tail [index, len) is shifted to
            // [index + count, new_len), whose slots beyond len were vacant; the
            // gap [index, index + count) is then filled from staged.
            unsafe {
                self.buf.shift(index, index + count, tail);
                ptr::copy_nonoverlapping(staged.as_ptr(), self.buf.slot(index), count);
                staged.set_len(0);
            }
        }
        self.len = new_len;
        self.emit(Event::Inserted {
            container: ContainerKind::DynArray,
            position: index,
            count,
        });
        Ok(Cursor::at(index))
    }

    /// Move the contents out, leaving `self` empty with no buffer.
    ///
    /// The returned array reports to a clone of this array's observer.
    pub fn take(&mut self) -> Self
    where
        O: Clone,
    {
        let buf = mem::replace(&mut self.buf, RawBuf::empty());
        let len = mem::replace(&mut self.len, 0);
        let taken = Self {
            buf,
            len,
            observer: self.observer.clone(),
        };
        taken.emit(Event::Taken {
            container: ContainerKind::DynArray,
            len,
        });
        taken
    }

    /// Replace the contents with `other`'s storage, leaving `other` empty
    /// with no buffer. Returns `self`.
    pub fn move_assign(&mut self, other: &mut Self) -> &mut Self {
        self.clear();
        let buf = mem::replace(&mut other.buf, RawBuf::empty());
        self.len = mem::replace(&mut other.len, 0);
        // Every slot of the old buffer is vacant after clear().
        mem::replace(&mut self.buf, buf).deallocate();
        self.emit(Event::MoveAssigned {
            container: ContainerKind::DynArray,
            len: self.len,
        });
        self
    }

    /// Independent copy with its own buffer of the same capacity.
    pub fn try_clone(&self) -> Result<Self, ContainerError>
    where
        T: Clone,
        O: Clone,
    {
        let mut copy = Self::from_parts(RawBuf::allocate(self.capacity())?, self.observer.clone());
        copy.extend_cloned_within_capacity(self.as_slice());
        copy.emit(Event::Cloned {
            container: ContainerKind::DynArray,
            len: copy.len,
        });
        Ok(copy)
    }

    /// Replace the contents with copies of `source`'s values.
    ///
    /// When this array's capacity already covers `source.len()`, existing
    /// values are assigned in place with [`Clone::clone_from`], surplus
    /// values are destroyed, and missing ones are constructed. Otherwise
    /// the copies are built in a fresh buffer of `source`'s capacity first,
    /// so an allocation failure or a panicking `clone` leaves `self`
    /// unchanged.
    pub fn try_clone_from(&mut self, source: &Self) -> Result<&mut Self, ContainerError>
    where
        T: Clone,
    {
        if self.capacity() >= source.len {
            let shared = self.len.min(source.len);
            for (dst, src) in self.as_mut_slice()[..shared].iter_mut().zip(&source.as_slice()[..shared]) {
                dst.clone_from(src);
            }
            self.truncate(source.len);
            self.extend_cloned_within_capacity(&source.as_slice()[shared..]);
        } else {
            let mut staged = DynArray::from_parts(RawBuf::allocate(source.capacity())?, NoopObserver);
            staged.extend_cloned_within_capacity(source.as_slice());
            self.clear();
            let buf = mem::replace(&mut staged.buf, RawBuf::empty());
            self.len = mem::replace(&mut staged.len, 0);
            mem::replace(&mut self.buf, buf).deallocate();
        }
        self.emit(Event::CloneAssigned {
            container: ContainerKind::DynArray,
            len: self.len,
        });
        Ok(self)
    }

    /// Split into the raw buffer and live length, leaving `self` empty.
    pub(crate) fn take_storage(&mut self) -> (RawBuf<T>, usize) {
        let buf = mem::replace(&mut self.buf, RawBuf::empty());
        (buf, mem::replace(&mut self.len, 0))
    }
}

fn stage_error<T>(err: CollectionAllocErr) -> ContainerError {
    match err {
        CollectionAllocErr::CapacityOverflow => ContainerError::capacity_overflow(mem::align_of::<T>()),
        CollectionAllocErr::AllocErr { layout } => ContainerError::AllocationFailure {
            bytes: layout.size(),
            align: layout.align(),
        },
    }
}

impl<T, O: Observer> Drop for DynArray<T, O> {
    fn drop(&mut self) {
        self.emit(Event::Dropped {
            container: ContainerKind::DynArray,
            len: self.len,
        });
        let len = mem::replace(&mut self.len, 0);
        // SAFETY: [0, len) is live. The buffer itself is released when the
        // field is dropped.
        unsafe { self.buf.drop_range(0, len) };
    }
}

impl<T: Clone, O: Observer + Clone> Clone for DynArray<T, O> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|err| alloc_failed(err))
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(err) = self.try_clone_from(source) {
            alloc_failed(err);
        }
    }
}

impl<T, O: Observer + Default> Default for DynArray<T, O> {
    fn default() -> Self {
        Self::new_in(O::default())
    }
}

impl<T, O: Observer> Deref for DynArray<T, O> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, O: Observer> DerefMut for DynArray<T, O> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, O: Observer> Index<usize> for DynArray<T, O> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T, O: Observer> IndexMut<usize> for DynArray<T, O> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

impl<T, O: Observer> Index<Cursor> for DynArray<T, O> {
    type Output = T;

    fn index(&self, cursor: Cursor) -> &T {
        &self.as_slice()[cursor.index()]
    }
}

impl<T, O: Observer> IndexMut<Cursor> for DynArray<T, O> {
    fn index_mut(&mut self, cursor: Cursor) -> &mut T {
        &mut self.as_mut_slice()[cursor.index()]
    }
}

impl<T: fmt::Debug, O: Observer> fmt::Debug for DynArray<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T, O: Observer> Extend<T> for DynArray<T, O> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let wanted = self.len.saturating_add(iter.size_hint().0);
        if let Err(err) = self.reserve(wanted) {
            alloc_failed(err);
        }
        for value in iter {
            if let Err(err) = self.push_back(value) {
                alloc_failed(err);
            }
        }
    }
}

impl<'a, T: Clone + 'a, O: Observer> Extend<&'a T> for DynArray<T, O> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().cloned());
    }
}

impl<T> FromIterator<T> for DynArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<T, const N: usize> From<[T; N]> for DynArray<T> {
    fn from(values: [T; N]) -> Self {
        let mut array = Self::with_capacity(N).unwrap_or_else(|err| alloc_failed(err));
        array.extend(values);
        array
    }
}

impl<T, O: Observer> IntoIterator for DynArray<T, O> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(mut self) -> IntoIter<T> {
        let (buf, len) = self.take_storage();
        IntoIter::new(buf, len)
    }
}

impl<'a, T, O: Observer> IntoIterator for &'a DynArray<T, O> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> slice::Iter<'a, T> {
        self.as_slice().iter()
    }
}

impl<'a, T, O: Observer> IntoIterator for &'a mut DynArray<T, O> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> slice::IterMut<'a, T> {
        self.as_mut_slice().iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Log(Rc<RefCell<Vec<Event>>>);

    impl Observer for Log {
        fn observe(&self, event: Event) {
            self.0.borrow_mut().push(event);
        }
    }

    impl Log {
        fn kinds(&self) -> Vec<strata_core::EventKind> {
            self.0.borrow().iter().map(Event::kind).collect()
        }
    }

    #[test]
    fn push_back_appends_in_order() {
        let mut a = DynArray::new();
        a.push_back(1).unwrap();
        a.push_back(2).unwrap();
        a.push_back(3).unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(a.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn push_back_doubles_capacity_from_one() {
        let mut a = DynArray::new();
        let mut seen = Vec::new();
        for i in 0..9 {
            a.push_back(i).unwrap();
            seen.push(a.capacity());
        }
        assert_eq!(seen, vec![1, 2, 4, 4, 8, 8, 8, 8, 16]);
    }

    #[test]
    fn at_reports_out_of_range() {
        let a = DynArray::from([10, 20]);
        assert_eq!(*a.at(1).unwrap(), 20);
        assert_eq!(a.at(2), Err(ContainerError::OutOfRange { index: 2, len: 2 }));
        let empty = DynArray::<u8>::new();
        assert_eq!(empty.at(0), Err(ContainerError::OutOfRange { index: 0, len: 0 }));
    }

    #[test]
    fn insert_before_second_element() {
        let mut a = DynArray::from([1, 2, 3]);
        let at = a.insert(a.begin() + 1, 99).unwrap();
        assert_eq!(at, Cursor::at(1));
        assert_eq!(a.as_slice(), &[1, 99, 2, 3]);
    }

    #[test]
    fn insert_with_room_does_not_reallocate() {
        let mut a = DynArray::with_capacity(8).unwrap();
        a.extend([1, 2, 3]);
        let before = a.as_ptr();
        a.insert(a.begin(), 0).unwrap();
        assert_eq!(a.as_ptr(), before);
        assert_eq!(a.capacity(), 8);
        assert_eq!(a.as_slice(), &[0, 1, 2, 3]);
    }

    #[test]
    fn insert_when_full_grows_to_exact_length() {
        let mut a = DynArray::from([1, 2, 3]);
        assert_eq!(a.capacity(), 3);
        a.insert_n(a.begin() + 2, 3, &7).unwrap();
        assert_eq!(a.capacity(), 6);
        assert_eq!(a.as_slice(), &[1, 2, 7, 7, 7, 3]);
    }

    #[test]
    fn insert_at_end_is_append() {
        let mut a = DynArray::from([1, 2]);
        a.insert(a.end(), 3).unwrap();
        assert_eq!(a.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn insert_past_end_is_invalid_argument() {
        let mut a = DynArray::from([1, 2]);
        let err = a.insert(a.end() + 1, 3).unwrap_err();
        assert_eq!(err, ContainerError::InvalidArgument { position: 3, len: 2 });
        assert_eq!(a.as_slice(), &[1, 2]);
    }

    #[test]
    fn insert_slice_and_iter_keep_order() {
        let mut a = DynArray::from([1, 5]);
        a.insert_slice(a.begin() + 1, &[2, 3]).unwrap();
        a.insert_iter(a.begin() + 3, vec![4]).unwrap();
        assert_eq!(a.as_slice(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn insert_iter_beyond_inline_stage() {
        let mut a = DynArray::from([0, 100]);
        a.insert_iter(a.begin() + 1, 1..50).unwrap();
        assert_eq!(a.len(), 51);
        assert!(a.iter().copied().eq((0..50).chain([100])));
    }

    #[test]
    fn insert_empty_is_noop() {
        let mut a = DynArray::from([1]);
        let at = a.insert_slice(a.begin(), &[]).unwrap();
        assert_eq!(at, a.begin());
        assert_eq!(a.as_slice(), &[1]);
    }

    #[test]
    fn emplace_constructs_from_args() {
        let mut a: DynArray<String> = DynArray::new();
        a.emplace(a.end(), "b").unwrap();
        a.emplace(a.begin(), "a").unwrap();
        a.emplace_with(a.end(), || "c".repeat(2)).unwrap();
        assert_eq!(a.as_slice(), &["a", "b", "cc"]);
    }

    #[test]
    fn emplace_within_capacity_shifts_in_place() {
        let mut a: DynArray<i64> = DynArray::with_capacity(8).unwrap();
        a.extend([1i64, 2, 3]);
        let before = a.as_ptr();
        let at = a.emplace(a.begin() + 1, 99i32).unwrap();
        assert_eq!(at, Cursor::at(1));
        assert_eq!(at.to_string(), "@1");
        assert_eq!(a.as_slice(), &[1, 99, 2, 3]);
        assert_eq!(a.as_ptr(), before);
        assert_eq!(a.capacity(), 8);

        let at = a.emplace_with(a.begin() + 3, || -7).unwrap();
        assert_eq!(at, Cursor::at(3));
        assert_eq!(a.as_slice(), &[1, 99, 2, -7, 3]);
        assert_eq!(a.as_ptr(), before);
    }

    #[test]
    fn emplace_with_skips_construction_on_bad_position() {
        let mut a = DynArray::<i32>::new();
        let mut called = false;
        let err = a.emplace_with(Cursor::at(1), || {
            called = true;
            0
        });
        assert!(err.is_err());
        assert!(!called);
    }

    #[test]
    fn reserve_and_shrink() {
        let mut a = DynArray::from([1, 2]);
        a.reserve(10).unwrap();
        assert_eq!(a.capacity(), 10);
        a.reserve(4).unwrap();
        assert_eq!(a.capacity(), 10);
        a.shrink_to_fit().unwrap();
        assert_eq!(a.capacity(), 2);
        assert_eq!(a.as_slice(), &[1, 2]);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut a = DynArray::from_elem(5, &"x".to_string()).unwrap();
        a.clear();
        assert!(a.is_empty());
        assert_eq!(a.capacity(), 5);
    }

    #[test]
    fn pop_back_on_empty_is_none() {
        let mut a = DynArray::from([1]);
        assert_eq!(a.pop_back(), Some(1));
        assert_eq!(a.pop_back(), None);
        assert_eq!(a.len(), 0);
    }

    #[test]
    fn with_len_default_constructs() {
        let a = DynArray::<u32>::with_len(4).unwrap();
        assert_eq!(a.as_slice(), &[0, 0, 0, 0]);
        assert_eq!(a.capacity(), 4);
    }

    #[test]
    fn take_leaves_source_without_buffer() {
        let mut a = DynArray::from([1, 2, 3]);
        let b = a.take();
        assert_eq!(b.as_slice(), &[1, 2, 3]);
        assert_eq!(a.len(), 0);
        assert_eq!(a.capacity(), 0);
    }

    #[test]
    fn move_assign_returns_target() {
        let mut a = DynArray::from([9]);
        let mut b = DynArray::from([1, 2]);
        let len = a.move_assign(&mut b).len();
        assert_eq!(len, 2);
        assert_eq!(a.as_slice(), &[1, 2]);
        assert_eq!(b.capacity(), 0);
    }

    #[test]
    fn clone_is_independent() {
        let a = DynArray::from([1, 2, 3]);
        let mut b = a.clone();
        b[0] = 100;
        b.push_back(4).unwrap();
        assert_eq!(a.as_slice(), &[1, 2, 3]);
        assert_eq!(b.as_slice(), &[100, 2, 3, 4]);
    }

    #[test]
    fn clone_from_reuses_buffer_when_large_enough() {
        let mut target = DynArray::from([0; 8]);
        let before = target.as_ptr();
        let source = DynArray::from([1, 2, 3]);
        target.clone_from(&source);
        assert_eq!(target.as_ptr(), before);
        assert_eq!(target.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn clone_from_reallocates_when_too_small() {
        let mut target = DynArray::from([0]);
        let source = DynArray::from([1, 2, 3, 4]);
        target.clone_from(&source);
        assert_eq!(target.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(target.capacity(), source.capacity());
    }

    #[test]
    fn cursor_indexing() {
        let mut a = DynArray::from([5, 6, 7]);
        let c = a.end() - 1;
        assert_eq!(a[c], 7);
        a[c] = 8;
        assert_eq!(a.get_at(c), Some(&8));
        assert_eq!(a.get_at(a.end()), None);
        assert_eq!(a.end() - a.begin(), 3);
    }

    #[test]
    fn observer_sees_lifecycle() {
        let log = Log::default();
        {
            let mut a = DynArray::new_in(log.clone());
            a.push_back(1).unwrap();
            a.insert(a.begin(), 0).unwrap();
            let _copy = a.clone();
        }
        use strata_core::EventKind::*;
        assert_eq!(
            log.kinds(),
            vec![Created, Reallocated, Reallocated, Inserted, Cloned, Dropped, Dropped]
        );
    }

    #[test]
    fn into_iter_yields_both_ends() {
        let a = DynArray::from(["a".to_string(), "b".into(), "c".into()]);
        let mut it = a.into_iter();
        assert_eq!(it.len(), 3);
        assert_eq!(it.next_back().as_deref(), Some("c"));
        assert_eq!(it.next().as_deref(), Some("a"));
        // "b" is dropped with the iterator.
    }

    #[test]
    fn debug_lists_elements() {
        let a = DynArray::from([1, 2]);
        assert_eq!(format!("{a:?}"), "[1, 2]");
    }

    #[test]
    fn zero_sized_elements() {
        let mut a = DynArray::new();
        for _ in 0..100 {
            a.push_back(()).unwrap();
        }
        a.insert(a.begin() + 50, ()).unwrap();
        assert_eq!(a.len(), 101);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn push_sequence_preserves_count_and_order(
                values in proptest::collection::vec(any::<i64>(), 0..200),
            ) {
                let mut a = DynArray::new();
                for &v in &values {
                    a.push_back(v).unwrap();
                }
                prop_assert_eq!(a.len(), values.len());
                prop_assert_eq!(a.as_slice(), values.as_slice());
                prop_assert!(a.capacity() >= a.len());
            }

            #[test]
            fn insert_matches_vec_insert(
                initial in proptest::collection::vec(any::<u16>(), 0..40),
                extra_capacity in 0usize..8,
                raw_pos in any::<usize>(),
                inserted in proptest::collection::vec(any::<u16>(), 0..12),
            ) {
                let mut a = DynArray::with_capacity(initial.len() + extra_capacity).unwrap();
                a.extend(initial.iter().copied());
                let pos = raw_pos % (initial.len() + 1);

                let at = a.insert_slice(Cursor::at(pos), &inserted).unwrap();

                let mut expected = initial.clone();
                expected.splice(pos..pos, inserted.iter().copied());
                prop_assert_eq!(at.index(), pos);
                prop_assert_eq!(a.as_slice(), expected.as_slice());
            }
        }
    }
}
