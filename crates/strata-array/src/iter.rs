//! Owning iterator over a dynamic array's values.

use std::fmt;
use std::iter::FusedIterator;
use std::slice;

use strata_raw::RawBuf;

/// Iterator that moves values out of a [`DynArray`](crate::DynArray).
///
/// Values not yielded are dropped with the iterator.
pub struct IntoIter<T> {
    buf: RawBuf<T>,
    /// First live slot.
    front: usize,
    /// One past the last live slot.
    back: usize,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(buf: RawBuf<T>, len: usize) -> Self {
        Self {
            buf,
            front: 0,
            back: len,
        }
    }

    /// The values not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots [front, back) are live.
        unsafe { slice::from_raw_parts(self.buf.slot(self.front), self.back - self.front) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        let index = self.front;
        self.front += 1;
        // SAFETY: slot index was live and is now outside [front, back).
        Some(unsafe { self.buf.read(index) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: slot back was live and is now outside [front, back).
        Some(unsafe { self.buf.read(self.back) })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let (front, back) = (self.front, self.back);
        self.front = back;
        // SAFETY: [front, back) holds the values not yet yielded.
        unsafe { self.buf.drop_range(front, back) };
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::DynArray;
    use std::rc::Rc;

    #[test]
    fn unyielded_values_are_dropped() {
        let marker = Rc::new(());
        let array = DynArray::from_elem(4, &Rc::clone(&marker)).unwrap();
        assert_eq!(Rc::strong_count(&marker), 5);
        let mut it = array.into_iter();
        drop(it.next());
        assert_eq!(Rc::strong_count(&marker), 4);
        drop(it);
        assert_eq!(Rc::strong_count(&marker), 1);
    }

    #[test]
    fn as_slice_tracks_progress() {
        let mut it = DynArray::from([1, 2, 3, 4]).into_iter();
        it.next();
        it.next_back();
        assert_eq!(it.as_slice(), &[2, 3]);
        assert_eq!(format!("{it:?}"), "IntoIter([2, 3])");
    }

    #[test]
    fn collects_in_order() {
        let v: Vec<_> = DynArray::from([3, 1, 2]).into_iter().collect();
        assert_eq!(v, vec![3, 1, 2]);
        let rev: Vec<_> = DynArray::from([3, 1, 2]).into_iter().rev().collect();
        assert_eq!(rev, vec![2, 1, 3]);
    }
}
