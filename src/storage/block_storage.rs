use crate::layout::block::BlockNumber;

/// A fixed-size array of fixed-size blocks, addressed by block number.
///
/// Block numbers outside `0..num_blocks()` are a bug in the caller, and implementations panic
/// on them rather than returning an error.
pub trait BlockStorage {
    fn block_size(&self) -> usize;

    fn num_blocks(&self) -> usize;

    /// Returns the full contents of a block (always `block_size()` bytes).
    fn read_block(&self, block_number: BlockNumber) -> &[u8];

    /// Writes `data` at the start of the block and zero-fills the rest of it.
    fn write_block(&mut self, block_number: BlockNumber, data: &[u8]);
}
