use crate::layout::block::{BlockNumber, Geometry};

use super::block_storage::BlockStorage;

/// Storage backed by an arena of heap-allocated blocks.
pub struct MemoryDisk {
    block_size: usize,
    blocks: Vec<Box<[u8]>>,
}

impl MemoryDisk {
    /// Constructs a zeroed [`MemoryDisk`] with the given geometry.
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        let blocks = (0..geometry.num_blocks)
            .map(|_| vec![0; geometry.block_size].into_boxed_slice())
            .collect();

        Self {
            block_size: geometry.block_size,
            blocks,
        }
    }
}

impl BlockStorage for MemoryDisk {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    fn read_block(&self, block_number: BlockNumber) -> &[u8] {
        assert!(
            block_number < self.blocks.len(),
            "block number out of bounds: {block_number}"
        );

        &self.blocks[block_number]
    }

    fn write_block(&mut self, block_number: BlockNumber, data: &[u8]) {
        assert!(
            block_number < self.blocks.len(),
            "block number out of bounds: {block_number}"
        );
        assert!(
            data.len() <= self.block_size,
            "{} bytes do not fit in a {}-byte block",
            data.len(),
            self.block_size
        );

        let block = &mut self.blocks[block_number];
        block[..data.len()].copy_from_slice(data);
        block[data.len()..].fill(0);
    }
}
