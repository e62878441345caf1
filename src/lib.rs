//! An in-memory block filesystem: a fixed-size virtual disk, a free-block bitmap, inode and
//! directory tables, and an intent/commit journal, all behind path-based operations on
//! [`FileSystem`].

pub mod bitmap;
pub mod error;
pub mod fs;
pub mod journal;
pub mod layout;
pub mod metadata;
pub mod path;
pub mod shell;
pub mod storage;

pub use error::FsError;
pub use fs::FileSystem;
pub use journal::{Journal, JournalRecord, RecordType};
pub use layout::block::{BlockNumber, Geometry, BLOCK_SIZE, NUM_BLOCKS};
pub use layout::inode::{InodeKind, InodeNumber, ROOT_INODE};
pub use metadata::{Metadata, Usage};
