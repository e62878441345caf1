use bitvec::vec::BitVec;
use log::warn;

use crate::error::FsError;
use crate::layout::block::BlockNumber;

/// Tracks the allocation status of blocks.
/// A value of `true` represents "occupied".
#[derive(Clone, Debug)]
pub struct BlockBitmap {
    bits: BitVec,
}

impl BlockBitmap {
    /// Constructs a bitmap with every one of `num_blocks` blocks free.
    pub fn new(num_blocks: usize) -> Self {
        Self {
            bits: BitVec::repeat(false, num_blocks),
        }
    }

    /// Assigns the first `n` free blocks, in ascending order.
    ///
    /// Either all `n` blocks are assigned or, if fewer than `n` are free, none are.
    pub fn allocate(&mut self, n: usize) -> Result<Vec<BlockNumber>, FsError> {
        let assigned = self.bits.iter_zeros().take(n).collect::<Vec<_>>();

        if assigned.len() < n {
            return Err(FsError::OutOfSpace {
                requested: n,
                available: assigned.len(),
            });
        }

        for &block_number in &assigned {
            self.bits.set(block_number, true);
        }

        Ok(assigned)
    }

    /// Marks the given blocks as free.
    pub fn free(&mut self, blocks: &[BlockNumber]) {
        for &block_number in blocks {
            if !self.bits.replace(block_number, false) {
                warn!("freeing block {block_number}, which is already free");
            }
        }
    }

    pub fn is_allocated(&self, block_number: BlockNumber) -> bool {
        self.bits.get(block_number).is_some_and(|bit| *bit)
    }

    pub fn num_free(&self) -> usize {
        self.bits.count_zeros()
    }

    pub fn num_allocated(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Allocated block numbers, in ascending order.
    pub fn allocated(&self) -> impl Iterator<Item = BlockNumber> + '_ {
        self.bits.iter_ones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_fit() {
        let mut bitmap = BlockBitmap::new(8);

        assert_eq!(bitmap.allocate(3).unwrap(), [0, 1, 2]);
        assert_eq!(bitmap.allocate(2).unwrap(), [3, 4]);
        assert_eq!(bitmap.num_allocated(), 5);
        assert_eq!(bitmap.num_free(), 3);
    }

    #[test]
    fn test_reuses_freed_holes() {
        let mut bitmap = BlockBitmap::new(8);
        bitmap.allocate(6).unwrap();
        bitmap.free(&[1, 4]);

        assert_eq!(bitmap.allocate(3).unwrap(), [1, 4, 6]);
    }

    #[test]
    fn test_allocate_zero() {
        let mut bitmap = BlockBitmap::new(2);

        assert!(bitmap.allocate(0).unwrap().is_empty());
        assert_eq!(bitmap.num_free(), 2);
    }

    #[test]
    fn test_out_of_space_is_atomic() {
        let mut bitmap = BlockBitmap::new(4);
        bitmap.allocate(2).unwrap();

        let err = bitmap.allocate(3).unwrap_err();
        assert!(matches!(
            err,
            FsError::OutOfSpace {
                requested: 3,
                available: 2
            }
        ));

        // the two blocks that were found must not stay marked
        assert_eq!(bitmap.num_allocated(), 2);
        assert!(!bitmap.is_allocated(2));
        assert!(!bitmap.is_allocated(3));
        assert_eq!(bitmap.allocate(2).unwrap(), [2, 3]);
    }

    #[test]
    fn test_free() {
        let mut bitmap = BlockBitmap::new(4);
        let blocks = bitmap.allocate(4).unwrap();
        bitmap.free(&blocks[1..3]);

        assert!(bitmap.is_allocated(0));
        assert!(!bitmap.is_allocated(1));
        assert!(!bitmap.is_allocated(2));
        assert!(bitmap.is_allocated(3));
        assert_eq!(bitmap.allocated().collect::<Vec<_>>(), [0, 3]);
    }

    #[test]
    fn test_double_free_is_harmless() {
        let mut bitmap = BlockBitmap::new(4);
        bitmap.allocate(1).unwrap();
        bitmap.free(&[0]);
        bitmap.free(&[0]);

        assert_eq!(bitmap.num_free(), 4);
    }

    #[test]
    fn test_is_allocated_out_of_range() {
        let bitmap = BlockBitmap::new(4);

        assert!(!bitmap.is_allocated(4));
        assert_eq!(bitmap.len(), 4);
    }
}
