/// Perform a const assertion.
macro_rules! const_assert {
    ($($tt:tt)*) => {
        const _: () = assert!($($tt)*);
    }
}

/// Blocks and disk geometry.
pub mod block;
/// Directories and directory entries.
pub mod directory;
/// Inodes.
pub mod inode;
