//! Iterators over a chunked deque.
//!
//! The borrowing iterators walk a `[front, back)` cursor window over the
//! block directory, so `nth` and the exact length both use cursor
//! arithmetic instead of stepping.

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use strata_core::Observer;
use strata_raw::RawBuf;

use crate::cursor::BlockCursor;
use crate::deque::ChunkedDeque;

/// Borrowing iterator over a [`ChunkedDeque`].
pub struct Iter<'a, T> {
    blocks: &'a [RawBuf<T>],
    front: BlockCursor,
    back: BlockCursor,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(blocks: &'a [RawBuf<T>], front: BlockCursor, back: BlockCursor) -> Self {
        Self { blocks, front, back }
    }

    fn remaining(&self) -> usize {
        (self.back - self.front) as usize
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        let slot = self.blocks[self.front.block()].slot(self.front.offset());
        self.front.step_forward();
        // SAFETY: the slot was inside the live window, which the shared
        // borrow of the deque keeps alive and unaliased by writers.
        Some(unsafe { &*slot })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<&'a T> {
        if n >= self.remaining() {
            self.front = self.back;
            return None;
        }
        self.front += n;
        self.next()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back.step_back();
        let slot = self.blocks[self.back.block()].slot(self.back.offset());
        // SAFETY: as in next().
        Some(unsafe { &*slot })
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            blocks: self.blocks,
            front: self.front,
            back: self.back,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.clone().collect::<Vec<_>>()).finish()
    }
}

/// Mutably borrowing iterator over a [`ChunkedDeque`].
pub struct IterMut<'a, T> {
    blocks: &'a [RawBuf<T>],
    front: BlockCursor,
    back: BlockCursor,
    _values: PhantomData<&'a mut T>,
}

// SAFETY: an IterMut hands out disjoint `&mut T` and never reads through
// the shared block table concurrently, so it is as sendable as `&mut T`.
unsafe impl<T: Send> Send for IterMut<'_, T> {}

impl<'a, T> IterMut<'a, T> {
    /// `blocks` must come from an exclusive borrow of the deque.
    pub(crate) fn new(blocks: &'a [RawBuf<T>], front: BlockCursor, back: BlockCursor) -> Self {
        Self {
            blocks,
            front,
            back,
            _values: PhantomData,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        if self.front == self.back {
            return None;
        }
        let slot = self.blocks[self.front.block()].slot(self.front.offset());
        self.front.step_forward();
        // SAFETY: the slot is live, the deque is exclusively borrowed for
        // 'a, and each slot is yielded at most once.
        Some(unsafe { &mut *slot })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.back - self.front) as usize;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<&'a mut T> {
        if n >= self.len() {
            self.front = self.back;
            return None;
        }
        self.front += n;
        self.next()
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back.step_back();
        let slot = self.blocks[self.back.block()].slot(self.back.offset());
        // SAFETY: as in next().
        Some(unsafe { &mut *slot })
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

/// Iterator that moves values out of a [`ChunkedDeque`].
///
/// Values not yielded are dropped with the iterator, along with the
/// deque's blocks.
pub struct IntoIter<T, O: Observer> {
    deque: ChunkedDeque<T, O>,
}

impl<T, O: Observer> IntoIter<T, O> {
    pub(crate) fn new(deque: ChunkedDeque<T, O>) -> Self {
        Self { deque }
    }
}

impl<T, O: Observer> Iterator for IntoIter<T, O> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.deque.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.deque.len();
        (remaining, Some(remaining))
    }
}

impl<T, O: Observer> DoubleEndedIterator for IntoIter<T, O> {
    fn next_back(&mut self) -> Option<T> {
        self.deque.pop_back()
    }
}

impl<T, O: Observer> ExactSizeIterator for IntoIter<T, O> {}

impl<T, O: Observer> FusedIterator for IntoIter<T, O> {}

impl<T: fmt::Debug, O: Observer> fmt::Debug for IntoIter<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.deque).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{ChunkedDeque, IterMut};
    use std::cell::Cell;
    use std::rc::Rc;
    use std::thread;
    use strata_core::{DequeConfig, NoopObserver};

    fn deque(values: impl IntoIterator<Item = u32>, slots: usize) -> ChunkedDeque<u32> {
        let values: Vec<u32> = values.into_iter().collect();
        ChunkedDeque::from_slice_in(&values, DequeConfig::new(slots * 4), NoopObserver).unwrap()
    }

    #[test]
    fn iterates_across_blocks_in_order() {
        let d = deque(0..10, 3);
        assert!(d.iter().copied().eq(0..10));
        assert!(d.iter().rev().copied().eq((0..10).rev()));
    }

    #[test]
    fn meets_in_the_middle() {
        let d = deque(0..7, 2);
        let mut it = d.iter();
        assert_eq!(it.next(), Some(&0));
        assert_eq!(it.next_back(), Some(&6));
        assert_eq!(it.len(), 5);
        let rest: Vec<_> = it.copied().collect();
        assert_eq!(rest, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn nth_jumps_across_blocks() {
        let d = deque(0..20, 4);
        let mut it = d.iter();
        assert_eq!(it.nth(9), Some(&9));
        assert_eq!(it.nth(0), Some(&10));
        assert_eq!(it.len(), 9);
        assert_eq!(it.nth(9), None);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn iter_mut_updates_in_place() {
        let mut d = deque(0..9, 2);
        for v in d.iter_mut() {
            *v *= 10;
        }
        for v in &mut d {
            *v += 1;
        }
        assert!(d.iter().copied().eq((0..9).map(|v| v * 10 + 1)));
        let mut it = d.iter_mut();
        assert_eq!(it.nth(7).map(|v| *v), Some(71));
    }

    #[test]
    fn into_iter_drops_unyielded_values() {
        let marker = Rc::new(());
        let d = ChunkedDeque::from_elem_in(5, &Rc::clone(&marker), DequeConfig::new(16), NoopObserver).unwrap();
        let mut it = d.into_iter();
        drop(it.next());
        drop(it.next_back());
        assert_eq!(it.len(), 3);
        assert_eq!(Rc::strong_count(&marker), 4);
        drop(it);
        assert_eq!(Rc::strong_count(&marker), 1);
    }

    #[test]
    fn debug_formats() {
        let d = deque(1..4, 2);
        assert_eq!(format!("{:?}", d.iter()), "Iter([1, 2, 3])");
        assert_eq!(format!("{:?}", d.into_iter()), "IntoIter([1, 2, 3])");
    }

    #[test]
    fn iter_mut_is_send_for_send_values() {
        fn assert_send<S: Send>() {}
        assert_send::<IterMut<'_, Cell<u32>>>();

        let mut d: ChunkedDeque<Cell<u32>> = (0..10).map(Cell::new).collect();
        thread::scope(|s| {
            let values = d.iter_mut();
            s.spawn(move || {
                for v in values {
                    v.set(v.get() * 2);
                }
            });
        });
        assert!(d.iter().map(Cell::get).eq((0..10).map(|v| v * 2)));
    }
}
