use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use super::block::BlockNumber;

// inode numbers are handed out sequentially and never reused, so a `u64` never runs out
pub type InodeNumber = u64;

/// The inode number of the root directory.
pub const ROOT_INODE: InodeNumber = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InodeKind {
    /// This inode describes a directory.
    Directory,
    /// This inode describes a regular data file.
    Regular,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inode {
    /// file type (directory or regular)
    pub kind: InodeKind,
    /// block numbers holding the file contents, in file order
    pub blocks: Vec<BlockNumber>,
    /// file size in bytes
    pub size: usize,
    /// creation time
    pub created: SystemTime,
    /// last modification time
    pub modified: SystemTime,
}

impl Inode {
    /// Constructs an empty inode of the given kind, stamped with the current time.
    pub fn new(kind: InodeKind) -> Self {
        let now = SystemTime::now();

        Self {
            kind,
            blocks: vec![],
            size: 0,
            created: now,
            modified: now,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == InodeKind::Directory
    }
}
