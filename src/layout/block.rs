use anyhow::{ensure, Result};

/// default size of a block in bytes
pub const BLOCK_SIZE: usize = 4096;

/// default number of blocks on the virtual disk
pub const NUM_BLOCKS: usize = 1024;

const_assert!(BLOCK_SIZE > 0);
const_assert!(NUM_BLOCKS > 0);

// block numbers index straight into the device, so they are plain `usize`s
pub type BlockNumber = usize;

/// The shape of a virtual disk. Fixed for the lifetime of a filesystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    /// The number of bytes in every block.
    pub block_size: usize,
    /// The number of blocks on the disk.
    pub num_blocks: usize,
}

impl Geometry {
    /// Constructs a new [`Geometry`], rejecting empty disks and zero-sized blocks.
    pub fn new(block_size: usize, num_blocks: usize) -> Result<Self> {
        ensure!(block_size > 0, "invalid block size: {block_size}");
        ensure!(num_blocks > 0, "invalid number of blocks: {num_blocks}");

        Ok(Self {
            block_size,
            num_blocks,
        })
    }

    /// The number of blocks needed to hold `len` bytes.
    pub fn blocks_for(&self, len: usize) -> usize {
        len.div_ceil(self.block_size)
    }

    /// Total capacity of the disk in bytes.
    pub fn capacity(&self) -> usize {
        self.block_size * self.num_blocks
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            block_size: BLOCK_SIZE,
            num_blocks: NUM_BLOCKS,
        }
    }
}
