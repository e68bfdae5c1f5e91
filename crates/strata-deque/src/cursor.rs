//! Random-access positions in a two-level (block, offset) address space.
//!
//! A [`BlockCursor`] names a slot by directory index and offset within
//! that block. Stepping and offsetting cross block boundaries
//! transparently, and subtracting two cursors yields the number of slots
//! between them, so the cursor behaves like a flat pointer even though
//! the storage is segmented.
//!
//! The cursor never touches memory. Resolving it to an element is the
//! deque's job, which is what keeps cursors free of aliasing concerns.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A position in a chunked deque: directory slot plus in-block offset.
///
/// The offset is always normalised into `[0, block_capacity)`; a position
/// at the end of one block is represented as offset 0 of the next.
#[derive(Clone, Copy, Debug)]
pub struct BlockCursor {
    block: usize,
    offset: usize,
    block_capacity: usize,
}

impl BlockCursor {
    /// Cursor at `offset` within directory slot `block`.
    ///
    /// # Panics
    ///
    /// Panics if `block_capacity` is zero or `offset >= block_capacity`.
    pub fn new(block: usize, offset: usize, block_capacity: usize) -> Self {
        assert!(block_capacity > 0, "block capacity must be non-zero");
        assert!(
            offset < block_capacity,
            "offset {offset} outside block of capacity {block_capacity}"
        );
        Self {
            block,
            offset,
            block_capacity,
        }
    }

    /// Cursor at slot 0 of block 0.
    pub fn origin(block_capacity: usize) -> Self {
        Self::new(0, 0, block_capacity)
    }

    /// Directory slot of the addressed block.
    pub fn block(&self) -> usize {
        self.block
    }

    /// Offset within the addressed block.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Slots per block.
    pub fn block_capacity(&self) -> usize {
        self.block_capacity
    }

    /// Advance one slot, moving to the start of the next block when the
    /// current one is exhausted.
    pub fn step_forward(&mut self) {
        self.offset += 1;
        if self.offset == self.block_capacity {
            self.block += 1;
            self.offset = 0;
        }
    }

    /// Retreat one slot, moving to the end of the previous block when at
    /// the start of the current one.
    ///
    /// # Panics
    ///
    /// Panics when called on the origin.
    pub fn step_back(&mut self) {
        if self.offset == 0 {
            self.block = match self.block.checked_sub(1) {
                Some(block) => block,
                None => panic!("block cursor stepped back past the origin"),
            };
            self.offset = self.block_capacity;
        }
        self.offset -= 1;
    }

    /// Offset by `n` slots in either direction, or `None` if the result
    /// would precede the origin or overflow.
    ///
    /// When the target stays inside the current block only the offset
    /// moves. Otherwise the block delta is the floor of
    /// `(offset + n) / block_capacity`; truncating division would land
    /// negative targets one block too late.
    pub fn checked_advance(self, n: isize) -> Option<Self> {
        let capacity = isize::try_from(self.block_capacity).ok()?;
        let target = isize::try_from(self.offset).ok()?.checked_add(n)?;
        if (0..capacity).contains(&target) {
            return Some(Self {
                offset: target as usize,
                ..self
            });
        }
        let delta = if target >= 0 {
            target / capacity
        } else {
            -((-(target + 1)) / capacity) - 1
        };
        let block = self.block.checked_add_signed(delta)?;
        let offset = target - delta * capacity;
        debug_assert!((0..capacity).contains(&offset));
        Some(Self {
            block,
            offset: offset as usize,
            block_capacity: self.block_capacity,
        })
    }

    /// Offset by `n` slots in either direction.
    ///
    /// # Panics
    ///
    /// Panics if the result would precede the origin.
    pub fn advance(self, n: isize) -> Self {
        match self.checked_advance(n) {
            Some(cursor) => cursor,
            None => panic!("block cursor advanced by {n} from {self} leaves the directory"),
        }
    }

    /// Signed number of slots from `origin` to `self`.
    ///
    /// Within one block this is the offset difference. Across blocks it is
    /// the remainder of `origin`'s block, plus every whole block strictly
    /// between the two, plus `self`'s offset into its own block.
    pub fn distance_from(self, origin: BlockCursor) -> isize {
        debug_assert_eq!(self.block_capacity, origin.block_capacity);
        match self.block.cmp(&origin.block) {
            Ordering::Equal => self.offset as isize - origin.offset as isize,
            Ordering::Greater => {
                let whole_blocks = self.block - origin.block - 1;
                let slots = (self.block_capacity - origin.offset)
                    + whole_blocks * self.block_capacity
                    + self.offset;
                slots as isize
            }
            Ordering::Less => -origin.distance_from(self),
        }
    }

    /// Position as a flat slot number, counting from the origin.
    pub fn linear(&self) -> usize {
        self.block * self.block_capacity + self.offset
    }
}

impl PartialEq for BlockCursor {
    fn eq(&self, other: &Self) -> bool {
        self.block == other.block && self.offset == other.offset
    }
}

impl Eq for BlockCursor {}

impl PartialOrd for BlockCursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BlockCursor {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.block, self.offset).cmp(&(other.block, other.offset))
    }
}

impl Hash for BlockCursor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.block.hash(state);
        self.offset.hash(state);
    }
}

fn signed(n: usize) -> isize {
    match isize::try_from(n) {
        Ok(n) => n,
        Err(_) => panic!("block cursor offset {n} exceeds isize::MAX"),
    }
}

impl Add<usize> for BlockCursor {
    type Output = BlockCursor;

    fn add(self, n: usize) -> BlockCursor {
        self.advance(signed(n))
    }
}

impl Sub<usize> for BlockCursor {
    type Output = BlockCursor;

    fn sub(self, n: usize) -> BlockCursor {
        self.advance(-signed(n))
    }
}

impl AddAssign<usize> for BlockCursor {
    fn add_assign(&mut self, n: usize) {
        *self = *self + n;
    }
}

impl SubAssign<usize> for BlockCursor {
    fn sub_assign(&mut self, n: usize) {
        *self = *self - n;
    }
}

impl Sub<BlockCursor> for BlockCursor {
    type Output = isize;

    fn sub(self, origin: BlockCursor) -> isize {
        self.distance_from(origin)
    }
}

impl fmt::Display for BlockCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}:{}", self.block, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stepped(mut cursor: BlockCursor, n: usize) -> BlockCursor {
        for _ in 0..n {
            cursor.step_forward();
        }
        cursor
    }

    #[test]
    fn step_forward_crosses_block_end() {
        let mut c = BlockCursor::new(0, 2, 3);
        c.step_forward();
        assert_eq!((c.block(), c.offset()), (1, 0));
    }

    #[test]
    fn step_back_crosses_block_start() {
        let mut c = BlockCursor::new(2, 0, 4);
        c.step_back();
        assert_eq!((c.block(), c.offset()), (1, 3));
    }

    #[test]
    #[should_panic(expected = "past the origin")]
    fn step_back_from_origin_panics() {
        BlockCursor::origin(8).step_back();
    }

    #[test]
    fn advance_across_one_boundary_matches_stepping() {
        let origin = BlockCursor::origin(128);
        for n in [127usize, 128, 129, 255, 256] {
            assert_eq!(origin + n, stepped(origin, n), "n = {n}");
        }
    }

    #[test]
    fn negative_advance_uses_floor_division() {
        // offset 1 - 2 = -1 must land in the previous block's last slot,
        // not in the current block.
        let c = BlockCursor::new(3, 1, 4);
        let back = c.advance(-2);
        assert_eq!((back.block(), back.offset()), (2, 3));

        // exactly one block back
        let back = c.advance(-4);
        assert_eq!((back.block(), back.offset()), (2, 1));

        // -5 from offset 1 = -4: one whole block back, offset 0
        let back = c.advance(-5);
        assert_eq!((back.block(), back.offset()), (2, 0));

        let back = c.advance(-6);
        assert_eq!((back.block(), back.offset()), (1, 3));
    }

    #[test]
    fn advance_before_origin_is_none() {
        assert_eq!(BlockCursor::new(0, 3, 4).checked_advance(-4), None);
        assert_eq!(
            BlockCursor::new(0, 3, 4).checked_advance(-3),
            Some(BlockCursor::origin(4))
        );
    }

    #[test]
    fn distance_same_block() {
        let a = BlockCursor::new(2, 1, 8);
        let b = BlockCursor::new(2, 6, 8);
        assert_eq!(b - a, 5);
        assert_eq!(a - b, -5);
        assert_eq!(a - a, 0);
    }

    #[test]
    fn distance_adjacent_blocks() {
        let a = BlockCursor::new(0, 5, 8);
        let b = BlockCursor::new(1, 2, 8);
        // 3 left in block 0, 0 whole blocks, 2 into block 1.
        assert_eq!(b - a, 5);
    }

    #[test]
    fn distance_counts_whole_blocks_between() {
        let a = BlockCursor::new(1, 7, 8);
        let b = BlockCursor::new(4, 0, 8);
        // 1 left in block 1, blocks 2 and 3 whole, 0 into block 4.
        assert_eq!(b - a, 1 + 16);
        assert_eq!(a - b, -17);
    }

    #[test]
    fn equality_and_order_ignore_nothing_but_position() {
        let a = BlockCursor::new(1, 3, 8);
        let b = BlockCursor::new(2, 0, 8);
        assert!(a < b);
        assert_eq!(a + 5, b);
        assert_eq!(b.linear(), 16);
        assert_eq!(a.to_string(), "@1:3");
    }

    #[test]
    #[should_panic(expected = "outside block")]
    fn new_rejects_unnormalised_offset() {
        BlockCursor::new(0, 8, 8);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn advance_agrees_with_flat_arithmetic(
                capacity in 1usize..300,
                start in 0usize..5_000,
                n in -5_000isize..5_000,
            ) {
                let origin = BlockCursor::origin(capacity);
                let from = origin + start;
                let flat = start as isize + n;
                match from.checked_advance(n) {
                    Some(to) => {
                        prop_assert!(flat >= 0);
                        prop_assert_eq!(to.linear() as isize, flat);
                        prop_assert!(to.offset() < capacity);
                        prop_assert_eq!(to - from, n);
                    }
                    None => prop_assert!(flat < 0),
                }
            }

            #[test]
            fn advance_matches_single_steps(
                capacity in 1usize..64,
                start in 0usize..256,
                n in 0usize..512,
            ) {
                let from = BlockCursor::origin(capacity) + start;
                let mut walked = from;
                for _ in 0..n {
                    walked.step_forward();
                }
                prop_assert_eq!(from + n, walked);
                let mut back = walked;
                for _ in 0..n {
                    back.step_back();
                }
                prop_assert_eq!(back, from);
                prop_assert_eq!(walked - n, from);
            }

            #[test]
            fn distance_matches_materialised_walk(
                capacity in 1usize..40,
                start in 0usize..200,
                len in 0usize..400,
            ) {
                let from = BlockCursor::origin(capacity) + start;
                let to = from + len;
                let mut walked = 0usize;
                let mut c = from;
                while c != to {
                    c.step_forward();
                    walked += 1;
                }
                prop_assert_eq!(to - from, walked as isize);
                prop_assert_eq!(from - to, -(walked as isize));
            }
        }
    }
}
