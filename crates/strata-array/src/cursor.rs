//! Random-access positions into a dynamic array.
//!
//! A [`Cursor`] addresses one slot of a [`DynArray`](crate::DynArray)'s
//! buffer. It does not borrow the array, so it can be handed back to
//! mutating operations such as [`insert`](crate::DynArray::insert). A
//! cursor is only meaningful while the array it came from is not
//! reallocated or shortened past it; using a stale cursor is memory safe
//! but may address a different element or be rejected.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A position in a contiguous buffer.
///
/// Behaves like a flat pointer: it can be stepped, offset by a signed
/// amount, compared, and subtracted to yield a signed distance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor {
    index: usize,
}

impl Cursor {
    /// Cursor addressing slot `index`.
    pub const fn at(index: usize) -> Self {
        Self { index }
    }

    /// The slot this cursor addresses.
    pub const fn index(self) -> usize {
        self.index
    }

    /// Advance by one slot.
    pub fn step_forward(&mut self) {
        self.index += 1;
    }

    /// Retreat by one slot.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at slot 0.
    pub fn step_back(&mut self) {
        *self = *self - 1;
    }

    /// Offset by a signed amount, or `None` if the result would fall
    /// before slot 0 or overflow.
    pub fn checked_offset(self, n: isize) -> Option<Self> {
        self.index.checked_add_signed(n).map(Self::at)
    }

    /// Offset by a signed amount.
    ///
    /// # Panics
    ///
    /// Panics if the result would fall before slot 0.
    pub fn offset(self, n: isize) -> Self {
        match self.checked_offset(n) {
            Some(cursor) => cursor,
            None => panic!("cursor offset {n} from slot {} leaves the buffer", self.index),
        }
    }

    /// Signed number of slots from `origin` to `self`.
    pub fn distance_from(self, origin: Cursor) -> isize {
        if self.index >= origin.index {
            (self.index - origin.index) as isize
        } else {
            -((origin.index - self.index) as isize)
        }
    }
}

impl Add<usize> for Cursor {
    type Output = Cursor;

    fn add(self, n: usize) -> Cursor {
        Cursor::at(self.index + n)
    }
}

impl Sub<usize> for Cursor {
    type Output = Cursor;

    fn sub(self, n: usize) -> Cursor {
        match self.index.checked_sub(n) {
            Some(index) => Cursor::at(index),
            None => panic!("cursor moved {n} slots before slot {}", self.index),
        }
    }
}

impl AddAssign<usize> for Cursor {
    fn add_assign(&mut self, n: usize) {
        *self = *self + n;
    }
}

impl SubAssign<usize> for Cursor {
    fn sub_assign(&mut self, n: usize) {
        *self = *self - n;
    }
}

impl Sub<Cursor> for Cursor {
    type Output = isize;

    fn sub(self, origin: Cursor) -> isize {
        self.distance_from(origin)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.index)
    }
}
