//! Uninitialised, typed backing buffers.
//!
//! A [`RawBuf`] owns memory for `capacity` values of `T` but never
//! constructs or destroys them. Which slots are live is the owner's
//! business; dropping the buffer releases the memory and runs no element
//! destructors.

use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::{self, NonNull};

use strata_core::ContainerError;

/// Memory for `capacity` values of `T`, all slots uninitialised.
///
/// Zero-capacity buffers and buffers of zero-sized `T` never touch the
/// allocator; their pointer is dangling but well aligned.
pub struct RawBuf<T> {
    ptr: NonNull<T>,
    capacity: usize,
    _owns: PhantomData<T>,
}

// SAFETY: RawBuf is a uniquely owned allocation, like Box<[MaybeUninit<T>]>.
unsafe impl<T: Send> Send for RawBuf<T> {}
// SAFETY: shared access hands out only raw pointers; reads go through the owner.
unsafe impl<T: Sync> Sync for RawBuf<T> {}

impl<T> RawBuf<T> {
    /// A buffer with no slots. Does not allocate.
    pub const fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            capacity: 0,
            _owns: PhantomData,
        }
    }

    /// Allocate uninitialised memory for `capacity` values.
    ///
    /// Fails with [`ContainerError::AllocationFailure`] when the request
    /// overflows `isize::MAX` bytes or the global allocator returns null.
    pub fn allocate(capacity: usize) -> Result<Self, ContainerError> {
        let layout = Self::layout_for(capacity)?;
        if layout.size() == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                capacity,
                _owns: PhantomData,
            });
        }
        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        let ptr = NonNull::new(raw.cast::<T>()).ok_or(ContainerError::AllocationFailure {
            bytes: layout.size(),
            align: layout.align(),
        })?;
        Ok(Self {
            ptr,
            capacity,
            _owns: PhantomData,
        })
    }

    /// Release the memory. Equivalent to dropping the buffer.
    ///
    /// Live values still in the buffer are leaked, not destroyed.
    pub fn deallocate(self) {
        drop(self);
    }

    fn layout_for(capacity: usize) -> Result<Layout, ContainerError> {
        Layout::array::<T>(capacity).map_err(|_| ContainerError::capacity_overflow(mem::align_of::<T>()))
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes requested from the allocator for this buffer.
    pub fn memory_bytes(&self) -> usize {
        self.capacity * mem::size_of::<T>()
    }

    /// Pointer to slot 0.
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Mutable pointer to slot 0.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Pointer to slot `index`; `index == capacity` yields the one-past-end
    /// pointer.
    ///
    /// The pointer is derived from the owned allocation, not from `&self`,
    /// so writing through it is allowed while the caller has exclusive
    /// access to the slot.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `index > capacity`.
    #[inline]
    pub fn slot(&self, index: usize) -> *mut T {
        debug_assert!(index <= self.capacity, "slot {index} past capacity {}", self.capacity);
        // SAFETY: index <= capacity keeps the offset within (or one past) the allocation.
        unsafe { self.ptr.as_ptr().add(index) }
    }

    /// Construct a value in slot `index`.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot must not hold a live value (it would
    /// be overwritten without being dropped).
    #[inline]
    pub unsafe fn write(&mut self, index: usize, value: T) {
        // SAFETY: caller guarantees index is in bounds and the slot is vacant.
        unsafe { ptr::write(self.slot(index), value) }
    }

    /// Move the value out of slot `index`, leaving the slot vacant.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot must hold a live value. The caller
    /// must treat the slot as vacant afterwards.
    #[inline]
    pub unsafe fn read(&self, index: usize) -> T {
        // SAFETY: caller guarantees the slot is live and gives up ownership of it.
        unsafe { ptr::read(self.slot(index)) }
    }

    /// Shared reference to the value in slot `index`.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot must hold a live value.
    #[inline]
    pub unsafe fn get(&self, index: usize) -> &T {
        // SAFETY: caller guarantees the slot is live.
        unsafe { &*self.slot(index) }
    }

    /// Mutable reference to the value in slot `index`.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot must hold a live value.
    #[inline]
    pub unsafe fn get_mut(&mut self, index: usize) -> &mut T {
        // SAFETY: caller guarantees the slot is live; &mut self makes it exclusive.
        unsafe { &mut *self.slot(index) }
    }

    /// Drop the values in slots `start..end` in place.
    ///
    /// # Safety
    ///
    /// `start <= end <= capacity` and every slot in the range must hold a
    /// live value. The slots are vacant afterwards.
    pub unsafe fn drop_range(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end && end <= self.capacity);
        // SAFETY: caller guarantees the range is live and in bounds.
        unsafe {
            let live = ptr::slice_from_raw_parts_mut(self.slot(start), end - start);
            ptr::drop_in_place(live);
        }
    }

    /// Move `count` values within this buffer from `src..src+count` to
    /// `dst..dst+count`. The ranges may overlap.
    ///
    /// # Safety
    ///
    /// Both ranges must lie within `capacity`. Source slots must be live.
    /// Destination slots that are not part of the source range must be
    /// vacant. Afterwards, source slots outside the destination range are
    /// vacant.
    pub unsafe fn shift(&mut self, src: usize, dst: usize, count: usize) {
        debug_assert!(src + count <= self.capacity && dst + count <= self.capacity);
        // SAFETY: caller guarantees bounds and liveness; ptr::copy handles overlap.
        unsafe { ptr::copy(self.slot(src), self.slot(dst), count) }
    }

    /// Move `count` values from `src[src_index..]` into `self[dst_index..]`.
    ///
    /// # Safety
    ///
    /// Both ranges must be in bounds, source slots live, destination slots
    /// vacant. The source slots are vacant afterwards.
    pub unsafe fn move_from(&mut self, dst_index: usize, src: &RawBuf<T>, src_index: usize, count: usize) {
        debug_assert!(dst_index + count <= self.capacity && src_index + count <= src.capacity);
        // SAFETY: distinct allocations never overlap; caller guarantees the rest.
        unsafe { ptr::copy_nonoverlapping(src.slot(src_index), self.slot(dst_index), count) }
    }
}

impl<T> Drop for RawBuf<T> {
    fn drop(&mut self) {
        if self.capacity == 0 || mem::size_of::<T>() == 0 {
            return;
        }
        // This layout was valid when the buffer was allocated.
        if let Ok(layout) = Layout::array::<T>(self.capacity) {
            // SAFETY: ptr came from alloc::alloc with this exact layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout) }
        }
    }
}

impl<T> Default for RawBuf<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> fmt::Debug for RawBuf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBuf")
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Divert an allocation error to the global allocation-error handler.
///
/// Used by infallible trait impls (`Clone`, `FromIterator`, ...) that
/// cannot return a `Result`, matching the standard collections: a failed
/// allocation aborts via [`alloc::handle_alloc_error`], an overflowing
/// size request panics with "capacity overflow".
#[cold]
pub fn alloc_failed(err: ContainerError) -> ! {
    match err {
        ContainerError::AllocationFailure { bytes, align } if bytes != usize::MAX => {
            match Layout::from_size_align(bytes, align) {
                Ok(layout) => alloc::handle_alloc_error(layout),
                Err(_) => panic!("capacity overflow"),
            }
        }
        ContainerError::AllocationFailure { .. } => panic!("capacity overflow"),
        other => panic!("{other}"),
    }
}
