use std::time::SystemTime;

use serde::Serialize;

use crate::layout::inode::{InodeKind, InodeNumber};

/// What [`crate::fs::FileSystem::stat`] reports about one file or directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub inum: InodeNumber,
    pub kind: InodeKind,
    /// Size in bytes. Always zero for directories.
    pub size: usize,
    /// Number of blocks owned.
    pub blocks: usize,
    pub created: SystemTime,
    pub modified: SystemTime,
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.kind == InodeKind::Directory
    }
}

/// Filesystem-wide usage, as reported by [`crate::fs::FileSystem::statfs`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub block_size: usize,
    pub total_blocks: usize,
    pub free_blocks: usize,
    pub used_blocks: usize,
    /// Number of live inodes, including the root.
    pub inodes: usize,
}
