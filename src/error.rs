use thiserror::Error;

/// Every way a filesystem operation can fail.
#[derive(Debug, Error)]
pub enum FsError {
    /// The path, or a directory it needs, does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The target name is already taken in its parent directory.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// A directory was required but a regular file was found.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// File contents were requested from a directory.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// The bitmap cannot satisfy a block allocation.
    #[error("out of space: {requested} blocks requested, {available} free")]
    OutOfSpace { requested: usize, available: usize },

    /// An inode's size, blocks or contents are inconsistent.
    #[error("corrupted: {0}")]
    Corrupted(String),

    /// The journal sink could not be written.
    #[error("journal I/O error: {0}")]
    Journal(#[from] std::io::Error),
}

impl FsError {
    /// The POSIX errno equivalent of this error.
    pub fn errno(&self) -> i32 {
        match self {
            FsError::NotFound(_) => libc::ENOENT,
            FsError::AlreadyExists(_) => libc::EEXIST,
            FsError::NotADirectory(_) => libc::ENOTDIR,
            FsError::IsADirectory(_) => libc::EISDIR,
            FsError::OutOfSpace { .. } => libc::ENOSPC,
            FsError::Corrupted(_) => libc::EIO,
            FsError::Journal(_) => libc::EIO,
        }
    }
}
